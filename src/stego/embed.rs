//! Writing the self-describing bitstream into a carrier
//!
//! Layout, in carrier order:
//!
//! ```text
//! start signature(32) | width marker(8) | header | payload | end signature(32)
//! ```
//!
//! Everything a decoder needs besides the key (width, order, encryption flag,
//! payload length and file name) travels inside the stream.

use super::bits::{self, bytes_to_bits};
use super::cipher;
use super::header::{MetadataHeader, FLAG_ENCRYPTED, FLAG_RANDOM_START, VERSION};
use super::signature;
use super::StegoError;
use tracing::debug;

/// Parameters for a single embed
#[derive(Debug, Clone, Copy)]
pub struct EmbedParams<'a> {
    pub key: &'a [u8],
    /// LSBs used per carrier byte (1..=4)
    pub width: u8,
    pub encrypt: bool,
    pub random_order: bool,
    /// Original file name of the payload
    pub name: &'a str,
    /// Extension including the leading dot, or empty
    pub ext: &'a str,
}

/// What an embed wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedStats {
    pub header: MetadataHeader,
    pub bits_written: usize,
    pub capacity_bits: usize,
}

pub fn validate_width(width: u8) -> Result<(), StegoError> {
    if (1..=4).contains(&width) {
        Ok(())
    } else {
        Err(StegoError::InvalidWidth(width))
    }
}

/// Assemble the full bitstream for an already packed header and payload
pub fn build_bitstream(width: u8, header: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut stream = Vec::with_capacity(
        signature::SIGNATURE_BITS * 2 + signature::MARKER_BITS + (header.len() + payload.len()) * 8,
    );
    stream.extend(signature::start(width));
    stream.extend(signature::width_marker(width));
    stream.extend(bytes_to_bits(header));
    stream.extend(bytes_to_bits(payload));
    stream.extend(signature::end(width));
    stream
}

/// Embed `payload` into `carrier` in place.
///
/// Nothing is written unless every check passes.
pub fn embed(carrier: &mut [u8], payload: &[u8], params: &EmbedParams<'_>) -> Result<EmbedStats, StegoError> {
    validate_width(params.width)?;
    if params.key.is_empty() {
        return Err(StegoError::EmptyKey);
    }
    if payload.is_empty() {
        return Err(StegoError::EmptyPayload);
    }
    if carrier.is_empty() {
        return Err(StegoError::NoCarrierBytes);
    }

    let body = if params.encrypt {
        cipher::encrypt(payload, params.key)
    } else {
        payload.to_vec()
    };

    let mut flags = 0;
    if params.encrypt {
        flags |= FLAG_ENCRYPTED;
    }
    if params.random_order {
        flags |= FLAG_RANDOM_START;
    }

    let header = MetadataHeader {
        version: VERSION,
        flags,
        lsb_width: params.width,
        name: params.name.to_string(),
        ext: params.ext.to_string(),
        size: body.len() as u64,
    };
    let packed = header.pack()?;
    let stream = build_bitstream(params.width, &packed, &body);

    let capacity_bits = bits::capacity(carrier.len(), params.width) * 8;
    if stream.len() > capacity_bits {
        return Err(StegoError::InsufficientCapacity {
            required_bits: stream.len(),
            available_bits: capacity_bits,
        });
    }

    let order = bits::carrier_order(params.key, carrier.len(), params.random_order);
    bits::pack_bits(carrier, &order, params.width, &stream);

    debug!(
        width = params.width,
        random_order = params.random_order,
        encrypted = params.encrypt,
        bits = stream.len(),
        capacity_bits,
        "embedded bitstream"
    );

    Ok(EmbedStats {
        header,
        bits_written: stream.len(),
        capacity_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(width: u8) -> EmbedParams<'static> {
        EmbedParams {
            key: b"k",
            width,
            encrypt: false,
            random_order: false,
            name: "",
            ext: "",
        }
    }

    #[test]
    fn test_bitstream_layout() {
        let stream = build_bitstream(2, &[0xAB], &[0xCD]);
        assert_eq!(stream.len(), 32 + 8 + 8 + 8 + 32);
        assert_eq!(&stream[..32], &signature::start(2)[..]);
        assert_eq!(&stream[32..40], &signature::width_marker(2)[..]);
        assert_eq!(&stream[40..48], &bytes_to_bits(&[0xAB])[..]);
        assert_eq!(&stream[48..56], &bytes_to_bits(&[0xCD])[..]);
        assert_eq!(&stream[56..], &signature::end(2)[..]);
    }

    #[test]
    fn test_sequential_embed_writes_stream_in_place() {
        let mut carrier = vec![0u8; 300];
        let stats = embed(&mut carrier, b"hi", &params(1)).expect("Should embed");
        let expected = build_bitstream(1, &stats.header.pack().expect("Should pack"), b"hi");
        let written: Vec<u8> = carrier[..expected.len()].to_vec();
        assert_eq!(written, expected);
        assert!(carrier[expected.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_header_records_parameters() {
        let mut carrier = vec![0x55u8; 4000];
        let p = EmbedParams {
            encrypt: true,
            random_order: true,
            name: "a.bin",
            ext: ".bin",
            ..params(3)
        };
        let stats = embed(&mut carrier, b"secret", &p).expect("Should embed");
        assert_eq!(stats.header.lsb_width, 3);
        assert!(stats.header.is_encrypted());
        assert!(stats.header.is_random_start());
        assert_eq!(stats.header.size, 6);
        assert_eq!(stats.header.name, "a.bin");
        assert_eq!(stats.bits_written, 32 + 8 + (17 + 5 + 4 + 6) * 8 + 32);
        assert_eq!(stats.capacity_bits, 1500 * 8);
    }

    #[test]
    fn test_config_errors() {
        let mut carrier = vec![0u8; 100];
        assert_eq!(embed(&mut carrier, b"x", &params(0)), Err(StegoError::InvalidWidth(0)));
        assert_eq!(embed(&mut carrier, b"x", &params(5)), Err(StegoError::InvalidWidth(5)));
        assert_eq!(
            embed(&mut carrier, b"x", &EmbedParams { key: b"", ..params(1) }),
            Err(StegoError::EmptyKey)
        );
        assert_eq!(
            embed(&mut carrier, b"x", &EmbedParams { key: b"", encrypt: true, ..params(1) }),
            Err(StegoError::EmptyKey)
        );
        assert_eq!(embed(&mut carrier, b"", &params(1)), Err(StegoError::EmptyPayload));
        assert_eq!(embed(&mut [], b"x", &params(1)), Err(StegoError::NoCarrierBytes));
    }

    // ==========================================================================
    // CAPACITY BOUNDARY
    // ==========================================================================
    //
    // Required bytes = 4 (start) + 1 (marker) + 17 (empty-name header)
    //                + payload + 4 (end) = payload + 26
    // Capacity(1000, 1) = 125 bytes -> payload of 99 fits exactly.
    // Capacity(1000, 3) = 375 bytes -> payload of 349 fits exactly.
    // ==========================================================================

    #[test]
    fn test_capacity_boundary() {
        for (width, fits) in [(1u8, 99usize), (3, 349)] {
            let mut carrier = vec![0u8; 1000];
            let stats = embed(&mut carrier, &vec![0x42; fits], &params(width)).expect("Exact fit");
            assert_eq!(stats.bits_written, stats.capacity_bits);

            let mut carrier = vec![0u8; 1000];
            let err = embed(&mut carrier, &vec![0x42; fits + 1], &params(width)).unwrap_err();
            assert_eq!(
                err,
                StegoError::InsufficientCapacity {
                    required_bits: stats.capacity_bits + 8,
                    available_bits: stats.capacity_bits,
                }
            );
            assert!(carrier.iter().all(|&b| b == 0), "Failed embed must not touch the carrier");
        }
    }

    #[test]
    fn test_name_too_long() {
        let mut carrier = vec![0u8; 10_000];
        let long = "n".repeat(300);
        let p = EmbedParams { name: &long, ..params(4) };
        assert!(matches!(embed(&mut carrier, b"x", &p), Err(StegoError::Header(_))));
    }
}
