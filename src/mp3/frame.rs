//! MP3 frame header parsing
//!
//! MP3 frames start with a sync word (11 bits of 1s) followed by header info.
//! Frame header structure (4 bytes):
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!
//! A = sync (11 bits)
//! B = MPEG version (2 bits): 00=2.5, 01=reserved, 10=2, 11=1
//! C = Layer (2 bits): 00=reserved, 01=III, 10=II, 11=I
//! D = Protection bit (CRC)
//! E = Bitrate index (4 bits)
//! F = Sample rate index (2 bits)
//! G = Padding bit
//! H = Private bit
//! I = Channel mode (2 bits)
//! J = Mode extension (2 bits)
//! K = Copyright
//! L = Original
//! M = Emphasis (2 bits)
//!
//! Only the header is interpreted. Everything after the 4 header bytes is
//! opaque payload as far as this crate is concerned.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Layer1,
    Layer2,
    Layer3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub layer: Layer,
    pub bitrate_index: u8,
    pub sample_rate_index: u8,
    /// Bitrate in kbps
    pub bitrate: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub padding: bool,
    pub channel_mode: ChannelMode,
    /// Total frame length in bytes, header included
    pub frame_size: u32,
}

// Bitrate lookup tables (kbps)
// Index 0 = free, 15 = bad
const BITRATES_V1_L3: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];
const BITRATES_V1_L2: [u32; 16] = [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0];
const BITRATES_V1_L1: [u32; 16] = [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0];
const BITRATES_V2_L3: [u32; 16] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0];
const BITRATES_V2_L2: [u32; 16] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0];
const BITRATES_V2_L1: [u32; 16] = [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256, 0];

// Sample rate lookup tables (Hz)
const SAMPLE_RATES_V1: [u32; 4] = [44100, 48000, 32000, 0];
const SAMPLE_RATES_V2: [u32; 4] = [22050, 24000, 16000, 0];
const SAMPLE_RATES_V25: [u32; 4] = [11025, 12000, 8000, 0];

/// Size of the fixed frame header in bytes
pub const HEADER_LEN: usize = 4;

impl FrameHeader {
    /// Parse a 4-byte MP3 frame header
    pub fn parse(header: [u8; 4]) -> Option<Self> {
        // Check sync word (11 bits of 1s)
        if header[0] != 0xFF || (header[1] & 0xE0) != 0xE0 {
            return None;
        }

        // MPEG version (bits 4-3 of byte 1)
        let version = match (header[1] >> 3) & 0x03 {
            0 => MpegVersion::Mpeg25,
            2 => MpegVersion::Mpeg2,
            3 => MpegVersion::Mpeg1,
            _ => return None, // Reserved
        };

        // Layer (bits 2-1 of byte 1)
        let layer = match (header[1] >> 1) & 0x03 {
            1 => Layer::Layer3,
            2 => Layer::Layer2,
            3 => Layer::Layer1,
            _ => return None, // Reserved
        };

        // Bitrate index (bits 7-4 of byte 2)
        let bitrate_index = (header[2] >> 4) & 0x0F;
        let table = match (version, layer) {
            (MpegVersion::Mpeg1, Layer::Layer1) => &BITRATES_V1_L1,
            (MpegVersion::Mpeg1, Layer::Layer2) => &BITRATES_V1_L2,
            (MpegVersion::Mpeg1, Layer::Layer3) => &BITRATES_V1_L3,
            (_, Layer::Layer1) => &BITRATES_V2_L1,
            (_, Layer::Layer2) => &BITRATES_V2_L2,
            (_, Layer::Layer3) => &BITRATES_V2_L3,
        };
        let bitrate = table[bitrate_index as usize];

        if bitrate == 0 {
            return None; // Free or bad bitrate
        }

        // Sample rate index (bits 3-2 of byte 2)
        let sample_rate_index = (header[2] >> 2) & 0x03;
        let sample_rate = match version {
            MpegVersion::Mpeg1 => SAMPLE_RATES_V1[sample_rate_index as usize],
            MpegVersion::Mpeg2 => SAMPLE_RATES_V2[sample_rate_index as usize],
            MpegVersion::Mpeg25 => SAMPLE_RATES_V25[sample_rate_index as usize],
        };

        if sample_rate == 0 {
            return None;
        }

        // Padding (bit 1 of byte 2)
        let padding = (header[2] & 0x02) != 0;

        // Channel mode (bits 7-6 of byte 3)
        let channel_mode = match (header[3] >> 6) & 0x03 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        };

        Some(FrameHeader {
            version,
            layer,
            bitrate_index,
            sample_rate_index,
            bitrate,
            sample_rate,
            padding,
            channel_mode,
            frame_size: frame_length(layer, bitrate, sample_rate, padding),
        })
    }

    /// Number of payload bytes that follow the 4 header bytes
    pub fn payload_len(&self) -> usize {
        (self.frame_size as usize).saturating_sub(HEADER_LEN)
    }
}

/// Frame length in bytes.
///
/// Layer II/III: `144 * bitrate / sample_rate + padding`
/// Layer I: `(12 * bitrate / sample_rate + padding) * 4` (padding is one 4-byte slot)
fn frame_length(layer: Layer, bitrate_kbps: u32, sample_rate: u32, padding: bool) -> u32 {
    let pad = u32::from(padding);
    let bitrate = bitrate_kbps * 1000;
    match layer {
        Layer::Layer1 => (12 * bitrate / sample_rate + pad) * 4,
        _ => 144 * bitrate / sample_rate + pad,
    }
}

/// A single audio frame: decoded header, the raw header bytes it came from,
/// and the payload that follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub raw_header: [u8; 4],
    pub payload: Vec<u8>,
}

impl Frame {
    /// Total serialized length (header + payload)
    pub fn serialized_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }
}
