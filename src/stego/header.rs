//! Metadata header describing the hidden payload
//!
//! Wire format (big-endian):
//!
//! ```text
//! magic(4) | version(1) | flags(1) | width(1) | name_len(1) name | ext_len(1) ext | size(8)
//! ```
//!
//! The magic is `0x6D703373` ("mp3s").

use thiserror::Error;

pub const MAGIC: u32 = 0x6D70_3373;
pub const VERSION: u8 = 1;

/// Smallest possible header: both strings empty
pub const MIN_LEN: usize = 4 + 1 + 1 + 1 + 1 + 1 + 8;

/// Payload was obfuscated with the additive cipher before embedding
pub const FLAG_ENCRYPTED: u8 = 1 << 0;
/// Carrier bytes were visited in key-derived order
pub const FLAG_RANDOM_START: u8 = 1 << 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header too short: {len} bytes")]
    TooShort { len: usize },

    #[error("bad header magic: 0x{0:08X}")]
    BadMagic(u32),

    #[error("header truncated in {field}")]
    Truncated { field: &'static str },

    #[error("{field} is {len} bytes, at most 255 allowed")]
    FieldTooLong { field: &'static str, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHeader {
    pub version: u8,
    pub flags: u8,
    pub lsb_width: u8,
    pub name: String,
    pub ext: String,
    pub size: u64,
}

impl MetadataHeader {
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    pub fn is_random_start(&self) -> bool {
        self.flags & FLAG_RANDOM_START != 0
    }

    /// Packed length in bytes
    pub fn packed_len(&self) -> usize {
        MIN_LEN + self.name.len() + self.ext.len()
    }

    pub fn pack(&self) -> Result<Vec<u8>, HeaderError> {
        let name = length_prefix("name", &self.name)?;
        let ext = length_prefix("ext", &self.ext)?;

        let mut out = Vec::with_capacity(self.packed_len());
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.push(self.version);
        out.push(self.flags);
        out.push(self.lsb_width);
        out.push(name);
        out.extend_from_slice(self.name.as_bytes());
        out.push(ext);
        out.extend_from_slice(self.ext.as_bytes());
        out.extend_from_slice(&self.size.to_be_bytes());
        Ok(out)
    }

    /// Unpack a header from the front of `bytes`; trailing bytes are ignored.
    ///
    /// `size` is taken as declared. Strings that are not valid UTF-8 are
    /// decoded lossily.
    pub fn unpack(bytes: &[u8]) -> Result<Self, HeaderError> {
        Self::unpack_prefix(bytes).map(|(header, _)| header)
    }

    /// Like [`unpack`](Self::unpack), also returning how many bytes the header
    /// occupied on the wire.
    pub fn unpack_prefix(bytes: &[u8]) -> Result<(Self, usize), HeaderError> {
        if bytes.len() < MIN_LEN {
            return Err(HeaderError::TooShort { len: bytes.len() });
        }

        let mut r = Reader { bytes, pos: 0 };
        let magic = u32::from_be_bytes(r.array("magic")?);
        if magic != MAGIC {
            return Err(HeaderError::BadMagic(magic));
        }

        let version = r.byte("version")?;
        let flags = r.byte("flags")?;
        let lsb_width = r.byte("width")?;
        let name = r.string("name")?;
        let ext = r.string("ext")?;
        let size = u64::from_be_bytes(r.array("size")?);

        let header = MetadataHeader {
            version,
            flags,
            lsb_width,
            name,
            ext,
            size,
        };
        Ok((header, r.pos))
    }
}

fn length_prefix(field: &'static str, value: &str) -> Result<u8, HeaderError> {
    u8::try_from(value.len()).map_err(|_| HeaderError::FieldTooLong {
        field,
        len: value.len(),
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], HeaderError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(HeaderError::Truncated { field });
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self, field: &'static str) -> Result<u8, HeaderError> {
        Ok(self.take(field, 1)?[0])
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], HeaderError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    fn string(&mut self, field: &'static str) -> Result<String, HeaderError> {
        let len = usize::from(self.byte(field)?);
        Ok(String::from_utf8_lossy(self.take(field, len)?).into_owned())
    }
}
