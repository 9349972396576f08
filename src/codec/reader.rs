//! Codec Reader
//!
//! Decodes a Store from a file or any other buffered byte source.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use bincode::Options;
use flate2::bufread::ZlibDecoder;

use crate::error::{Result, SmolError};
use crate::store::Store;

use super::checksum::ChecksumReader;
use super::{bincode_options, FileHeader, HEADER_SIZE, TRAILER_SIZE};

/// Read a store written by [`save`](super::save)
pub fn load(path: &Path) -> Result<Store> {
    let file = File::open(path)?;
    let store = decode_from(BufReader::new(file))?;

    tracing::debug!(
        path = %path.display(),
        entries = store.len(),
        compressed = store.compression().enabled,
        "store loaded"
    );

    Ok(store)
}

/// Read and validate only the header of a store file
pub fn read_header(path: &Path) -> Result<FileHeader> {
    let mut file = File::open(path)?;
    read_header_from(&mut file)
}

/// Decode a whole store from `reader`
///
/// The header is parsed first and decides whether the body goes through
/// a zlib decoder. After the body, the trailer checksum must match and
/// nothing may follow it.
pub fn decode_from<R: BufRead>(mut reader: R) -> Result<Store> {
    let header = read_header_from(&mut reader)?;

    let (store, crc, body_len) = if header.is_compressed() {
        let mut source = ChecksumReader::new(ZlibDecoder::new(&mut reader));
        let store = decode_body(&mut source)?;

        // Run the decoder to the end of the zlib stream so the trailer is
        // the next thing in `reader`
        let extra = io::copy(&mut source, &mut io::sink()).map_err(SmolError::from_read)?;
        if extra != 0 {
            return Err(SmolError::Decoding(format!(
                "{} unexpected bytes after compressed body",
                extra
            )));
        }
        let body_len = source.bytes_read();
        (store, source.finish(), body_len)
    } else {
        let mut source = ChecksumReader::new(&mut reader);
        let store = decode_body(&mut source)?;
        let body_len = source.bytes_read();
        (store, source.finish(), body_len)
    };

    let mut trailer = [0u8; TRAILER_SIZE];
    reader
        .read_exact(&mut trailer)
        .map_err(SmolError::from_read)?;
    let expected = u32::from_le_bytes(trailer);
    if crc != expected {
        return Err(SmolError::Decoding(format!(
            "checksum mismatch: expected {:#010x}, computed {:#010x}",
            expected, crc
        )));
    }

    if !reader.fill_buf()?.is_empty() {
        return Err(SmolError::Decoding(
            "unexpected bytes after trailer".to_string(),
        ));
    }

    if !header.matches(store.compression()) {
        return Err(SmolError::Decoding(format!(
            "header compression {:?} disagrees with stored settings {:?}",
            header.compression(),
            store.compression()
        )));
    }

    if let Some(key) = store.find_duplicate_key() {
        return Err(SmolError::Decoding(format!("duplicate key in file: {}", key)));
    }

    tracing::trace!(
        compressed = header.is_compressed(),
        entries = store.len(),
        body_len,
        crc,
        "store decoded"
    );

    Ok(store)
}

fn read_header_from<R: Read>(reader: &mut R) -> Result<FileHeader> {
    let mut buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut buf).map_err(SmolError::from_read)?;
    FileHeader::decode(&buf)
}

fn decode_body<R: Read>(source: &mut R) -> Result<Store> {
    bincode_options()
        .deserialize_from(source)
        .map_err(|e| match *e {
            bincode::ErrorKind::Io(io) => SmolError::from_read(io),
            other => SmolError::Decoding(other.to_string()),
        })
}
