//! Codec Writer
//!
//! Encodes a Store into a file or any other byte sink.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use bincode::Options;
use flate2::write::ZlibEncoder;

use crate::error::{Result, SmolError};
use crate::store::Store;

use super::checksum::ChecksumWriter;
use super::{bincode_options, FileHeader};

/// Write the whole store to `store.filename()`
pub fn save(store: &Store) -> Result<()> {
    save_to(store, store.filename())
}

/// Write the whole store to `path`
///
/// The encoded filename is still `store.filename()`; only the destination
/// differs.
///
/// Steps:
/// 1. Create or truncate the file
/// 2. Header, body (zlib-wrapped if enabled), trailer
/// 3. Flush and sync
///
/// A failure part-way leaves whatever was written; there is no
/// write-to-temp-and-rename.
pub fn save_to(store: &Store, path: &Path) -> Result<()> {
    // Reject a bad level before truncating anything
    FileHeader::new(store.compression())?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let writer = encode_to(store, BufWriter::new(file))?;

    let file = writer
        .into_inner()
        .map_err(|e| SmolError::Io(e.into_error()))?;
    file.sync_all()?;
    let file_size = file.metadata()?.len();

    tracing::debug!(
        path = %path.display(),
        entries = store.len(),
        file_size,
        "store saved"
    );

    Ok(())
}

/// Encode the whole store into `writer` and hand the writer back
///
/// The writer is not flushed.
pub fn encode_to<W: Write>(store: &Store, mut writer: W) -> Result<W> {
    let header = FileHeader::new(store.compression())?;
    writer.write_all(&header.encode())?;

    let (crc, body_len) = if header.is_compressed() {
        let level = flate2::Compression::new(header.compression().level);
        let mut sink = ChecksumWriter::new(ZlibEncoder::new(&mut writer, level));
        encode_body(&mut sink, store)?;
        let body_len = sink.bytes_written();
        let (encoder, crc) = sink.finish();
        // Flushes the final deflate block and the zlib footer
        encoder.finish()?;
        (crc, body_len)
    } else {
        let mut sink = ChecksumWriter::new(&mut writer);
        encode_body(&mut sink, store)?;
        let body_len = sink.bytes_written();
        (sink.finish().1, body_len)
    };

    writer.write_all(&crc.to_le_bytes())?;

    tracing::trace!(
        compressed = header.is_compressed(),
        level = header.compression().level,
        body_len,
        crc,
        "store encoded"
    );

    Ok(writer)
}

fn encode_body<W: Write>(sink: &mut W, store: &Store) -> Result<()> {
    bincode_options()
        .serialize_into(sink, store)
        .map_err(|e| match *e {
            bincode::ErrorKind::Io(io) => SmolError::Io(io),
            other => SmolError::Encoding(other.to_string()),
        })
}
