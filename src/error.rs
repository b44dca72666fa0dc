use crate::mp3::ParseError;
use crate::quality::QualityError;
use crate::stego::StegoError;
use thiserror::Error;

/// Errors surfaced by the whole-file encode/decode operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("MP3 parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Stego(#[from] StegoError),

    #[error("quality metric error: {0}")]
    Quality(#[from] QualityError),

    #[error("carrier length mismatch: expected {expected} bytes, got {actual}")]
    CarrierLength { expected: usize, actual: usize },

    #[error(
        "stego output no longer parses as the cover's frames: \
         {frames_before} frames ({carrier_before} carrier bytes) became \
         {frames_after} frames ({carrier_after} carrier bytes)"
    )]
    ContainerChanged {
        frames_before: usize,
        carrier_before: usize,
        frames_after: usize,
        carrier_after: usize,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
