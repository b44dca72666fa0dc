//! MP3 container parsing and serialization
//!
//! A container is an optional ID3v2 block, a run of audio frames, and an
//! optional 128-byte ID3v1 trailer. Both tag blocks are captured verbatim and
//! never interpreted, so `serialize(parse(x)) == x` for any input whose bytes
//! are all accounted for by tags and frames.
//!
//! ID3v2 header: "ID3" (3) + version (2) + flags (1) + size (4) = 10 bytes.
//! The size is a synchsafe integer: 7 significant bits per byte.

use super::frame::{Frame, FrameHeader, HEADER_LEN};
use thiserror::Error;

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_LEN: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input too short to hold an MP3 frame: {len} bytes")]
    TooShort { len: usize },

    #[error("no MP3 frames found")]
    NoFramesFound,
}

/// A parsed MP3 file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp3File {
    /// Complete ID3v2 block, 10-byte header included
    pub id3v2: Option<Vec<u8>>,
    pub frames: Vec<Frame>,
    /// 128-byte ID3v1 trailer
    pub id3v1: Option<Vec<u8>>,
}

/// Decode a 4-byte synchsafe integer
pub fn synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |size, &b| (size << 7) | u32::from(b & 0x7F))
}

impl Mp3File {
    /// Parse an MP3 buffer.
    ///
    /// Frame sync is noisy: any `0xFF 0xE?` pair may be a false positive, so a
    /// candidate header is only accepted when its computed length keeps the
    /// frame inside the audio region. Otherwise the scan moves on by one byte.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < HEADER_LEN {
            return Err(ParseError::TooShort { len: data.len() });
        }

        let mut pos = 0;
        let mut id3v2 = None;
        if data.len() >= ID3V2_HEADER_LEN && &data[..3] == b"ID3" {
            let size = synchsafe([data[6], data[7], data[8], data[9]]) as usize;
            let end = ID3V2_HEADER_LEN + size;
            // A tag that claims more bytes than exist is ignored
            if end <= data.len() {
                id3v2 = Some(data[..end].to_vec());
                pos = end;
            }
        }

        let mut end = data.len();
        let mut id3v1 = None;
        if data.len() >= ID3V1_LEN && &data[data.len() - ID3V1_LEN..data.len() - ID3V1_LEN + 3] == b"TAG" {
            id3v1 = Some(data[data.len() - ID3V1_LEN..].to_vec());
            end -= ID3V1_LEN;
        }

        let mut frames = Vec::new();
        while pos + HEADER_LEN <= end {
            let raw_header = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
            let header = match FrameHeader::parse(raw_header) {
                Some(h) => h,
                None => {
                    pos += 1;
                    continue;
                }
            };

            let frame_len = header.frame_size as usize;
            if frame_len < HEADER_LEN || pos + frame_len > end {
                pos += 1;
                continue;
            }

            frames.push(Frame {
                header,
                raw_header,
                payload: data[pos + HEADER_LEN..pos + frame_len].to_vec(),
            });
            pos += frame_len;
        }

        if frames.is_empty() {
            return Err(ParseError::NoFramesFound);
        }

        Ok(Mp3File { id3v2, frames, id3v1 })
    }

    /// Serialize back to bytes: ID3v2, then each frame (header + payload), then ID3v1
    pub fn serialize(&self) -> Vec<u8> {
        let total = self.id3v2.as_ref().map_or(0, Vec::len)
            + self.frames.iter().map(Frame::serialized_len).sum::<usize>()
            + self.id3v1.as_ref().map_or(0, Vec::len);

        let mut out = Vec::with_capacity(total);
        if let Some(tag) = &self.id3v2 {
            out.extend_from_slice(tag);
        }
        for frame in &self.frames {
            out.extend_from_slice(&frame.raw_header);
            out.extend_from_slice(&frame.payload);
        }
        if let Some(tag) = &self.id3v1 {
            out.extend_from_slice(tag);
        }
        out
    }

    /// Total number of payload bytes across all frames
    pub fn carrier_len(&self) -> usize {
        self.frames.iter().map(|f| f.payload.len()).sum()
    }

    /// Concatenate every frame payload in frame order
    pub fn carrier(&self) -> Vec<u8> {
        let mut carrier = Vec::with_capacity(self.carrier_len());
        for frame in &self.frames {
            carrier.extend_from_slice(&frame.payload);
        }
        carrier
    }

    /// Split a (mutated) carrier back into the frame payloads it came from.
    ///
    /// The carrier must have exactly `carrier_len()` bytes.
    pub fn splice_carrier(&mut self, carrier: &[u8]) -> crate::Result<()> {
        let expected = self.carrier_len();
        if carrier.len() != expected {
            return Err(crate::Error::CarrierLength {
                expected,
                actual: carrier.len(),
            });
        }

        let mut offset = 0;
        for frame in &mut self.frames {
            let len = frame.payload.len();
            frame.payload.copy_from_slice(&carrier[offset..offset + len]);
            offset += len;
        }
        Ok(())
    }

    /// Hidden-data capacity in bytes at the given LSB width
    pub fn capacity(&self, width: u8) -> usize {
        crate::stego::bits::capacity(self.carrier_len(), width)
    }
}
