//! Transparent compression for file readers and writers.
//!
//! Detection is extension-first for performance, falling back to magic
//! bytes on the read path so a misnamed gzip file still decompresses. With
//! no compression feature enabled both helpers degrade to plain buffered
//! pass-throughs.
//!
//! Compressed streams don't support seeking, so partitioning always happens
//! after decompression, on lines already in memory.

use anyhow::Result;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "compression-gzip")]
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[cfg(feature = "compression-gzip")]
fn is_gzip_path(path: &Path) -> bool {
    let path = path.to_string_lossy().to_lowercase();
    path.ends_with(".gz") || path.ends_with(".gzip")
}

/// Wrap a reader with decompression when the path hint or the stream's
/// leading bytes identify a known compressed format.
///
/// # Errors
/// Returns an error if the stream cannot be peeked for magic bytes.
#[cfg(feature = "compression-gzip")]
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    use flate2::read::GzDecoder;
    use std::io::BufRead;

    if is_gzip_path(path_hint.as_ref()) {
        return Ok(Box::new(GzDecoder::new(reader)));
    }
    let mut buffered = BufReader::new(reader);
    if buffered.fill_buf()?.starts_with(&GZIP_MAGIC) {
        return Ok(Box::new(GzDecoder::new(buffered)));
    }
    Ok(Box::new(buffered))
}

/// Pass-through variant used when no compression feature is enabled.
#[cfg(not(feature = "compression-gzip"))]
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    _path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    Ok(Box::new(BufReader::new(reader)))
}

/// Wrap a writer with compression when the path hint identifies a known
/// compressed format. Write-side detection is extension-only; there is no
/// content to sniff yet.
///
/// # Errors
/// Currently infallible; the signature matches the read path.
#[cfg(feature = "compression-gzip")]
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Write>> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    if is_gzip_path(path_hint.as_ref()) {
        return Ok(Box::new(GzEncoder::new(writer, Compression::default())));
    }
    Ok(Box::new(BufWriter::new(writer)))
}

/// Pass-through variant used when no compression feature is enabled.
#[cfg(not(feature = "compression-gzip"))]
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    _path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Write>> {
    Ok(Box::new(BufWriter::new(writer)))
}
