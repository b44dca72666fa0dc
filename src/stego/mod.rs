pub mod bits;
pub mod cipher;
pub mod embed;
pub mod header;
pub mod recover;
pub mod signature;

pub use embed::{EmbedParams, EmbedStats};
pub use header::{HeaderError, MetadataHeader};
pub use recover::{RecoverOptions, Recovered};

use crate::config::Config;
use crate::error::Result;
use crate::mp3::Mp3File;
use crate::quality::{self, QualityLabel};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    #[error("LSB width must be 1, 2, 3 or 4, got {0}")]
    InvalidWidth(u8),

    #[error("key must not be empty")]
    EmptyKey,

    #[error("secret payload is empty")]
    EmptyPayload,

    #[error("no audio bytes found")]
    NoCarrierBytes,

    #[error("capacity too small: need {required_bits} bits, have {available_bits}")]
    InsufficientCapacity { required_bits: usize, available_bits: usize },

    #[error("metadata header: {0}")]
    Header(#[from] HeaderError),

    #[error("signature not found - no hidden data detected")]
    SignatureNotFound,
}

/// Split a path into the file name and extension (with leading dot) that the
/// metadata header records
pub fn file_name_parts(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = Path::new(&name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (name, ext)
}

/// Result of hiding a payload in an MP3 file
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    /// The stego MP3, byte-identical to the input outside frame payload LSBs
    pub mp3: Vec<u8>,
    pub stats: EmbedStats,
    /// PSNR of the carrier in dB; `None` if it could not be computed
    pub psnr: Option<f64>,
    pub quality: Option<QualityLabel>,
}

/// Hides files in MP3 frame payloads
#[derive(Debug, Clone)]
pub struct Encoder {
    pub key: Vec<u8>,
    /// LSBs per carrier byte (default: 1)
    pub width: u8,
    /// Obfuscate the payload with the key stream (default: false)
    pub encrypt: bool,
    /// Visit carrier bytes in key-derived order (default: true)
    pub random_order: bool,
}

impl Encoder {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            width: 1,
            encrypt: false,
            random_order: true,
        }
    }

    /// Build from configuration; the key must be present
    pub fn from_config(config: &Config) -> std::result::Result<Self, StegoError> {
        let key = config.key.clone().ok_or(StegoError::EmptyKey)?;
        Ok(Self::new(key)
            .with_width(config.width)
            .with_encryption(config.encrypt)
            .with_random_order(config.random_order))
    }

    pub fn with_width(mut self, width: u8) -> Self {
        self.width = width;
        self
    }

    pub fn with_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    pub fn with_random_order(mut self, random_order: bool) -> Self {
        self.random_order = random_order;
        self
    }

    /// Hide `secret` inside `mp3`, recording `name` and `ext` in the header
    pub fn encode(&self, mp3: &[u8], secret: &[u8], name: &str, ext: &str) -> Result<EncodeOutcome> {
        embed::validate_width(self.width)?;
        if self.key.is_empty() {
            return Err(StegoError::EmptyKey.into());
        }

        let mut file = Mp3File::parse(mp3)?;
        let original = file.carrier();
        let mut carrier = original.clone();

        let params = EmbedParams {
            key: &self.key,
            width: self.width,
            encrypt: self.encrypt,
            random_order: self.random_order,
            name,
            ext,
        };
        let stats = embed::embed(&mut carrier, secret, &params)?;
        file.splice_carrier(&carrier)?;

        let psnr = match quality::psnr(&original, &carrier) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "failed to calculate PSNR");
                None
            }
        };
        let quality = psnr.map(QualityLabel::from_psnr);

        info!(
            frames = file.frames.len(),
            width = self.width,
            bits = stats.bits_written,
            capacity_bits = stats.capacity_bits,
            psnr = %psnr.map(quality::format_psnr).unwrap_or_else(|| "n/a".to_string()),
            "encoded payload"
        );

        let mp3 = file.serialize();
        check_reparse(&file, &mp3)?;

        Ok(EncodeOutcome {
            mp3,
            stats,
            psnr,
            quality,
        })
    }
}

/// The stego output must split into the same frames as the cover. Flipped
/// low bits can forge a trailing "TAG" block on a cover without ID3v1, which
/// would swallow the end of the last frame.
fn check_reparse(file: &Mp3File, mp3: &[u8]) -> Result<()> {
    let (frames_after, carrier_after) = match Mp3File::parse(mp3) {
        Ok(reparsed) => (reparsed.frames.len(), reparsed.carrier_len()),
        Err(_) => (0, 0),
    };
    let frames_before = file.frames.len();
    let carrier_before = file.carrier_len();
    if frames_after != frames_before || carrier_after != carrier_before {
        return Err(crate::Error::ContainerChanged {
            frames_before,
            carrier_before,
            frames_after,
            carrier_after,
        });
    }
    Ok(())
}

/// Result of extracting a payload from an MP3 file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Payload with obfuscation removed
    pub payload: Vec<u8>,
    pub header: MetadataHeader,
    pub width: u8,
    pub random_order: bool,
}

/// Recovers hidden files from MP3 frame payloads using only the key
#[derive(Debug, Clone)]
pub struct Decoder {
    pub key: Vec<u8>,
    /// Order flag tried first at each width (default: true)
    pub random_hint: bool,
    /// Verbose per-trial diagnostics
    pub debug: bool,
}

impl Decoder {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            random_hint: true,
            debug: false,
        }
    }

    pub fn from_config(config: &Config) -> std::result::Result<Self, StegoError> {
        let key = config.key.clone().ok_or(StegoError::EmptyKey)?;
        Ok(Self::new(key)
            .with_random_hint(config.random_order)
            .with_debug(config.debug))
    }

    pub fn with_random_hint(mut self, hint: bool) -> Self {
        self.random_hint = hint;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn decode(&self, mp3: &[u8]) -> Result<DecodeOutcome> {
        let file = Mp3File::parse(mp3)?;
        let carrier = file.carrier();

        let opts = RecoverOptions {
            random_hint: self.random_hint,
            debug: self.debug,
        };
        let found = recover::recover(&carrier, &self.key, opts)?;

        let payload = if found.header.is_encrypted() {
            cipher::decrypt(&found.payload, &self.key)
        } else {
            found.payload
        };

        info!(
            width = found.width,
            random_order = found.random_order,
            bytes = payload.len(),
            name = %found.header.name,
            "decoded payload"
        );

        Ok(DecodeOutcome {
            payload,
            header: found.header,
            width: found.width,
            random_order: found.random_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mp3::container::fixtures;

    #[test]
    fn test_file_name_parts() {
        assert_eq!(
            file_name_parts(Path::new("/tmp/dir/secret.txt")),
            ("secret.txt".to_string(), ".txt".to_string())
        );
        assert_eq!(file_name_parts(Path::new("README")), ("README".to_string(), String::new()));
        assert_eq!(
            file_name_parts(Path::new("archive.tar.gz")),
            ("archive.tar.gz".to_string(), ".gz".to_string())
        );
    }

    #[test]
    fn test_encode_decode_tagged_file() {
        let cover = fixtures::tagged(20);
        let secret = b"meet me at the usual place".to_vec();

        let encoder = Encoder::new("STEGANO").with_width(2).with_encryption(true);
        let out = encoder
            .encode(&cover, &secret, "note.txt", ".txt")
            .expect("Should encode");

        assert_eq!(out.mp3.len(), cover.len());
        let psnr = out.psnr.expect("PSNR for equal-length carriers");
        assert!(psnr.is_finite() && psnr > 0.0);
        assert!(out.quality.is_some());

        // Tags and frame headers are untouched
        let before = Mp3File::parse(&cover).expect("Should parse cover");
        let after = Mp3File::parse(&out.mp3).expect("Should parse stego");
        assert_eq!(before.id3v2, after.id3v2);
        assert_eq!(before.id3v1, after.id3v1);
        assert_eq!(before.frames.len(), after.frames.len());

        let decoded = Decoder::new("STEGANO")
            .with_random_hint(false)
            .decode(&out.mp3)
            .expect("Should decode");
        assert_eq!(decoded.payload, secret);
        assert_eq!(decoded.header.name, "note.txt");
        assert_eq!(decoded.header.ext, ".txt");
        assert_eq!(decoded.width, 2);
        assert!(decoded.random_order);
    }

    #[test]
    fn test_decode_with_wrong_key_does_not_reveal_payload() {
        let cover = fixtures::frames(10);
        let out = Encoder::new("right")
            .encode(&cover, b"hidden", "h.bin", ".bin")
            .expect("Should encode");
        let err = Decoder::new("wrong").decode(&out.mp3).unwrap_err();
        assert!(matches!(err, Error::Stego(StegoError::SignatureNotFound)));
    }

    #[test]
    fn test_encode_errors() {
        let cover = fixtures::frames(1);
        let err = Encoder::new("k").with_width(7).encode(&cover, b"x", "", "").unwrap_err();
        assert!(matches!(err, Error::Stego(StegoError::InvalidWidth(7))));

        let err = Encoder::new("").encode(&cover, b"x", "", "").unwrap_err();
        assert!(matches!(err, Error::Stego(StegoError::EmptyKey)));

        let err = Encoder::new("k").encode(&[0u8; 64], b"x", "", "").unwrap_err();
        assert!(matches!(err, Error::Parse(crate::mp3::ParseError::NoFramesFound)));

        // 413 carrier bytes at width 1 hold 51 bytes, 26 of which are framing
        let err = Encoder::new("k").encode(&cover, &[7u8; 26], "", "").unwrap_err();
        assert!(matches!(err, Error::Stego(StegoError::InsufficientCapacity { .. })));
        assert!(Encoder::new("k").encode(&cover, &[7u8; 25], "", "").is_ok());
    }

    #[test]
    fn test_encode_refuses_output_with_forged_id3v1_trailer() {
        // One 417-byte frame: its last 128 bytes start at carrier offset 285.
        // High nibbles 5, 4, 4 there plus low nibbles 4, 1, 7 from the stream
        // spell "TAG" once written at width 4.
        let mut cover = fixtures::frames(1);
        cover[4 + 285] = 0x50;
        cover[4 + 286] = 0x40;
        cover[4 + 287] = 0x40;

        // Stream byte 142 is payload[120] (4 sig + 1 marker + 17 header bytes)
        let mut secret = vec![0u8; 180];
        secret[120] = 0x14;
        secret[121] = 0x17;

        let err = Encoder::new("k")
            .with_width(4)
            .with_random_order(false)
            .encode(&cover, &secret, "", "")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ContainerChanged {
                frames_before: 1,
                carrier_before: 413,
                ..
            }
        ));

        // A different final payload nibble leaves the trailer alone
        secret[121] = 0x18;
        let out = Encoder::new("k")
            .with_width(4)
            .with_random_order(false)
            .encode(&cover, &secret, "", "")
            .expect("Should encode");
        let decoded = Decoder::new("k").decode(&out.mp3).expect("Should decode");
        assert_eq!(decoded.payload, secret);
    }

    #[test]
    fn test_builders_from_config() {
        let config = Config {
            key: Some("cfg".to_string()),
            width: 3,
            encrypt: true,
            random_order: false,
            debug: true,
        };
        let encoder = Encoder::from_config(&config).expect("Key present");
        assert_eq!(encoder.key, b"cfg");
        assert_eq!(encoder.width, 3);
        assert!(encoder.encrypt);
        assert!(!encoder.random_order);

        let decoder = Decoder::from_config(&config).expect("Key present");
        assert!(!decoder.random_hint);
        assert!(decoder.debug);

        let keyless = Config::default();
        assert_eq!(Encoder::from_config(&keyless).unwrap_err(), StegoError::EmptyKey);
    }
}
