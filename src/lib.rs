//! Hide files inside MP3 audio.
//!
//! The secret is written into the low bits of frame payload bytes. Frame
//! headers, frame boundaries and ID3 tags are left byte-identical, so the
//! output is still a structurally valid MP3.
//!
//! The embedded stream describes itself (signature, width marker, metadata
//! header), which lets [`Decoder`] recover it with nothing but the key:
//!
//! ```no_run
//! use mp3stego::{Decoder, Encoder};
//!
//! # fn main() -> mp3stego::Result<()> {
//! let cover = std::fs::read("cover.mp3")?;
//! let out = Encoder::new("STEGANO")
//!     .with_width(2)
//!     .encode(&cover, b"attack at dawn", "orders.txt", ".txt")?;
//!
//! let found = Decoder::new("STEGANO").decode(&out.mp3)?;
//! assert_eq!(found.payload, b"attack at dawn");
//! # Ok(())
//! # }
//! ```
//!
//! The optional cipher is a reversible additive key stream. It hides the
//! payload from casual inspection and nothing more.

pub mod config;
pub mod error;
pub mod mp3;
pub mod quality;
pub mod report;
pub mod stego;

pub use config::Config;
pub use error::{Error, Result};
pub use mp3::Mp3File;
pub use quality::QualityLabel;
pub use stego::{DecodeOutcome, Decoder, EncodeOutcome, Encoder, MetadataHeader, StegoError};
