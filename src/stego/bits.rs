//! Bit channel over a flat carrier buffer
//!
//! Hidden bits live in the low `width` bits of carrier bytes. Which bytes, and
//! in what sequence, is decided by an order: either the identity or a
//! Fisher-Yates shuffle seeded from the key. Bits are kept one per `u8`
//! (0 or 1) so that signatures can be searched for at any bit offset.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Hidden-data capacity in whole bytes: `floor(carrier_len * width / 8)`
pub fn capacity(carrier_len: usize, width: u8) -> usize {
    carrier_len * usize::from(width) / 8
}

/// PRNG seed for a key: the first 8 bytes of SHA-256(key), little-endian
fn seed_from_key(key: &[u8]) -> u64 {
    let digest = Sha256::digest(key);
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed)
}

/// Key-derived permutation of `0..n`.
///
/// Pure function of `(key, n)`. The shuffle draws `u64` ranges so the result
/// does not depend on the platform's `usize` width.
pub fn derive_permutation(key: &[u8], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha20Rng::seed_from_u64(seed_from_key(key));
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i as u64) as usize;
        order.swap(i, j);
    }
    order
}

/// Byte visiting order for a carrier: shuffled when `random`, identity otherwise
pub fn carrier_order(key: &[u8], n: usize, random: bool) -> Vec<usize> {
    if random {
        derive_permutation(key, n)
    } else {
        (0..n).collect()
    }
}

fn mask(width: u8) -> u8 {
    (1u8 << width) - 1
}

/// Write `bits` into the low `width` bits of `carrier[order[t]]`, `width` bits
/// per byte, most significant first. The high bits of every byte are kept.
///
/// A final group shorter than `width` carries its bits in the high positions
/// of the group with zeros below.
///
/// # Panics
///
/// If `order` has fewer than `ceil(bits.len() / width)` entries or points
/// outside `carrier`.
pub fn pack_bits(carrier: &mut [u8], order: &[usize], width: u8, bits: &[u8]) {
    let w = usize::from(width);
    let mask = mask(width);
    for (chunk, &pos) in bits.chunks(w).zip(order) {
        let mut group = chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1));
        group <<= w - chunk.len();
        carrier[pos] = (carrier[pos] & !mask) | (group & mask);
    }
    debug_assert!(bits.len().div_ceil(w) <= order.len(), "order too short for bitstream");
}

/// Read up to `count` bits from the low `width` bits of `carrier[order[t]]`,
/// most significant first.
pub fn unpack_bits(carrier: &[u8], order: &[usize], width: u8, count: usize) -> Vec<u8> {
    let mask = mask(width);
    let mut bits = Vec::with_capacity(count.min(order.len() * usize::from(width)));
    'outer: for &pos in order {
        let v = carrier[pos] & mask;
        for i in (0..width).rev() {
            if bits.len() == count {
                break 'outer;
            }
            bits.push((v >> i) & 1);
        }
    }
    bits
}

/// Expand bytes to bits, MSB first
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for i in (0..8).rev() {
            bits.push((b >> i) & 1);
        }
    }
    bits
}

/// Pack bits (MSB first) into bytes; a trailing partial byte is dropped
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1)))
        .collect()
}
