//! Blind recovery of an embedded bitstream
//!
//! The decoder knows only the key. Width and byte order are found by trying
//! every combination in a fixed order:
//!
//! ```text
//! width 1: hint, !hint
//! width 2: hint, !hint
//! width 3: hint, !hint
//! width 4: hint, !hint
//! ```
//!
//! A trial expands the whole carrier into its low-`width`-bit stream (the
//! payload length is unknown until the header is read), looks for the start
//! signature, checks the width marker after it and unpacks the header. The
//! first trial that yields a complete payload wins, even if a later trial
//! would also succeed.

use super::bits::{self, bits_to_bytes};
use super::header::MetadataHeader;
use super::signature::{self, MARKER_BITS, SIGNATURE_BITS};
use super::StegoError;
use tracing::{debug, trace};

/// Widths in the order they are tried
pub const WIDTHS: [u8; 4] = [1, 2, 3, 4];

#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverOptions {
    /// Order flag to try first at each width; the other value is tried second
    pub random_hint: bool,
    /// Log per-trial diagnostics at debug level instead of trace
    pub debug: bool,
}

/// A successfully located bitstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub header: MetadataHeader,
    /// Payload exactly as stored; still obfuscated if `header.is_encrypted()`
    pub payload: Vec<u8>,
    /// Width of the trial that matched
    pub width: u8,
    /// Order flag of the trial that matched
    pub random_order: bool,
}

/// Search `carrier` for an embedded bitstream using only `key`.
pub fn recover(carrier: &[u8], key: &[u8], opts: RecoverOptions) -> Result<Recovered, StegoError> {
    if key.is_empty() {
        return Err(StegoError::EmptyKey);
    }
    if carrier.is_empty() {
        return Err(StegoError::NoCarrierBytes);
    }

    let hinted = bits::carrier_order(key, carrier.len(), opts.random_hint);
    let other = bits::carrier_order(key, carrier.len(), !opts.random_hint);

    for width in WIDTHS {
        for (random, order) in [(opts.random_hint, &hinted), (!opts.random_hint, &other)] {
            if let Some(found) = try_trial(carrier, order, width, random, opts.debug) {
                debug!(width, random_order = random, size = found.payload.len(), "bitstream located");
                return Ok(found);
            }
        }
    }

    Err(StegoError::SignatureNotFound)
}

fn try_trial(carrier: &[u8], order: &[usize], width: u8, random: bool, verbose: bool) -> Option<Recovered> {
    let stream = bits::unpack_bits(carrier, order, width, carrier.len() * usize::from(width));
    let start = signature::start(width);

    if verbose {
        debug!(
            width,
            random,
            first_bits = %bit_string(&stream[..stream.len().min(48)]),
            first_positions = ?&order[..order.len().min(10)],
            signature = %bit_string(&start),
            "trial"
        );
    } else {
        trace!(width, random, stream_bits = stream.len(), "trial");
    }

    let p = signature::find(&start, &stream)?;
    let marker_at = p + SIGNATURE_BITS;
    let body_at = marker_at + MARKER_BITS;
    if body_at > stream.len() {
        return None;
    }

    let marker = signature::read_width_marker(&stream[marker_at..body_at]);
    if marker != Some(width) {
        trace!(width, random, ?marker, "width marker mismatch");
        return None;
    }

    let bytes = bits_to_bytes(&stream[body_at..]);
    let (header, header_len) = match MetadataHeader::unpack_prefix(&bytes) {
        Ok(h) => h,
        Err(e) => {
            trace!(width, random, error = %e, "header rejected");
            return None;
        }
    };

    let size = usize::try_from(header.size).ok()?;
    let end = header_len.checked_add(size)?;
    if end > bytes.len() {
        trace!(width, random, size, available = bytes.len() - header_len, "declared size overruns carrier");
        return None;
    }

    Some(Recovered {
        payload: bytes[header_len..end].to_vec(),
        header,
        width,
        random_order: random,
    })
}

fn bit_string(bits: &[u8]) -> String {
    bits.iter().map(|&b| char::from(b'0' + b)).collect()
}
