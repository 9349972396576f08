//! Persistence Codec Module
//!
//! Converts a whole [`Store`](crate::Store) to a single file and back.
//!
//! ## Responsibilities
//! - Encode the full Store (filename, entries, compression settings)
//! - Route the encoded bytes through zlib when compression is enabled
//! - Record the compression mode up front so a load knows how to read
//! - Detect truncated, corrupt or inconsistent files
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                              │
//! │   Magic: "SMOL" (4) | Version: u16 (2) | Flags (1) | Level (1)│
//! ├───────────────────────────────────────────────────────────────┤
//! │ Body (variable)                                               │
//! │   bincode(Store)           when Flags & COMPRESSED == 0       │
//! │   zlib(bincode(Store))     when Flags & COMPRESSED != 0       │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Trailer (4 bytes)                                             │
//! │   CRC32 of the uncompressed bincode body (u32 LE)             │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! bincode writes the variant index of every `Value`, which is what lets a
//! load restore each value's dynamic type.

mod checksum;
mod reader;
mod writer;

use bincode::Options;

use crate::config::{Compression, MAX_COMPRESSION_LEVEL};
use crate::error::{Result, SmolError};

pub use reader::{decode_from, load, read_header};
pub use writer::{encode_to, save, save_to};

// =============================================================================
// Shared Constants (used by writer and reader)
// =============================================================================

/// Magic bytes identifying a SmolDB file
pub const MAGIC: &[u8; 4] = b"SMOL";

/// Current file format version
pub const FORMAT_VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Flags (1) + Level (1) = 8 bytes
pub const HEADER_SIZE: usize = 8;

/// Trailer size: CRC32 (4)
pub const TRAILER_SIZE: usize = 4;

/// Header flag: body is a zlib stream
pub const FLAG_COMPRESSED: u8 = 0x01;

/// Largest encoded body accepted in either direction (1 GiB)
pub const MAX_PAYLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// bincode settings shared by both directions
pub(crate) fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_PAYLOAD_SIZE)
}

// =============================================================================
// File Header
// =============================================================================

/// Fixed-size header at the start of every file
///
/// Decoded before the body so the reader knows whether to decompress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version the file was written with
    version: u16,

    /// Compression mode of the body; level is 0-9 when enabled
    compression: Compression,
}

impl FileHeader {
    /// Header for a body written with `compression`
    ///
    /// Fails if the level cannot configure the compressor.
    pub fn new(compression: Compression) -> Result<Self> {
        compression.validate()?;
        let compression = if compression.enabled {
            compression
        } else {
            Compression::disabled()
        };
        Ok(Self {
            version: FORMAT_VERSION,
            compression,
        })
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn is_compressed(&self) -> bool {
        self.compression.enabled
    }

    /// Serialize to the on-disk layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        if self.compression.enabled {
            buf[6] = FLAG_COMPRESSED;
            // Only new() and decode() build a header, both cap the level at 9
            buf[7] = u8::try_from(self.compression.level).unwrap_or(u8::MAX);
        }
        buf
    }

    /// Parse and validate the on-disk layout
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        let [m0, m1, m2, m3, v0, v1, flags, level] = *buf;

        if &[m0, m1, m2, m3] != MAGIC {
            return Err(SmolError::Decoding(format!(
                "invalid magic: expected SMOL, got {:?}",
                [m0, m1, m2, m3]
            )));
        }

        let version = u16::from_le_bytes([v0, v1]);
        if version != FORMAT_VERSION {
            return Err(SmolError::Decoding(format!(
                "unsupported format version: {}",
                version
            )));
        }

        if flags & !FLAG_COMPRESSED != 0 {
            return Err(SmolError::Decoding(format!(
                "unknown header flags: {:#04x}",
                flags
            )));
        }

        let compression = if flags & FLAG_COMPRESSED != 0 {
            if u32::from(level) > MAX_COMPRESSION_LEVEL {
                return Err(SmolError::Decoding(format!(
                    "invalid compression level in header: {}",
                    level
                )));
            }
            Compression::with_level(u32::from(level))
        } else {
            if level != 0 {
                return Err(SmolError::Decoding(format!(
                    "level {} set on an uncompressed file",
                    level
                )));
            }
            Compression::disabled()
        };

        Ok(Self {
            version,
            compression,
        })
    }

    /// Whether a decoded store's settings agree with this header
    pub(crate) fn matches(&self, compression: Compression) -> bool {
        if self.compression.enabled {
            compression == self.compression
        } else {
            !compression.enabled
        }
    }
}
