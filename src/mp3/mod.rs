pub mod container;
pub mod frame;

pub use container::{Mp3File, ParseError};
pub use frame::{ChannelMode, Frame, FrameHeader, Layer, MpegVersion};
