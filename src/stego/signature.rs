//! In-stream markers
//!
//! Each LSB width has its own start/end signature. A decoder that reads the
//! carrier at the wrong width sees a differently grouped bit stream, so the
//! eight patterns are pairwise distinct, aperiodic 32-bit words: a match at
//! the wrong width is as unlikely as a match in plain audio noise.
//!
//! The start signature is followed by a width marker: the ASCII digit of the
//! width as 8 bits, which the decoder cross-checks against the width it tried.

use super::bits::bytes_to_bits;

/// Signature length in bits
pub const SIGNATURE_BITS: usize = 32;

/// Width marker length in bits
pub const MARKER_BITS: usize = 8;

/// (start, end) per width, index = width - 1.
/// Start words have no border: no proper prefix equals a suffix.
const SIGNATURES: [(u32, u32); 4] = [
    (0x27D4_EB2F, 0x9E37_79B9),
    (0x1B56_C4E9, 0x7F4A_7C15),
    (0x1B87_3593, 0xC2B2_AE35),
    (0xE654_6B64, 0x1656_67B1),
];

fn pair(width: u8) -> (u32, u32) {
    SIGNATURES[usize::from(width.clamp(1, 4)) - 1]
}

/// Start signature bits for a width (1..=4)
pub fn start(width: u8) -> Vec<u8> {
    bytes_to_bits(&pair(width).0.to_be_bytes())
}

/// End signature bits for a width (1..=4)
pub fn end(width: u8) -> Vec<u8> {
    bytes_to_bits(&pair(width).1.to_be_bytes())
}

/// Width marker: the ASCII digit of `width` as 8 bits
pub fn width_marker(width: u8) -> Vec<u8> {
    bytes_to_bits(&[b'0' + width])
}

/// Interpret 8 marker bits as an ASCII digit
pub fn read_width_marker(bits: &[u8]) -> Option<u8> {
    if bits.len() != MARKER_BITS {
        return None;
    }
    let byte = bits.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1));
    if byte.is_ascii_digit() {
        Some(byte - b'0')
    } else {
        None
    }
}

/// Position of the first exact occurrence of `needle` in `haystack`
pub fn find(needle: &[u8], haystack: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
