//! Raw byte-stream carrier with a fixed-size opaque header.

use std::io::{self, BufReader, BufWriter, Read, Write};

use crate::carrier::{UnitSink, UnitSource};
use crate::error::{Result, StegoError};

/// Size of the BMP file header plus the BITMAPINFOHEADER.
pub const BMP_HEADER_LEN: usize = 54;

/// Units available for embedding in a stream of `total_len` bytes.
///
/// # Arguments
/// - `total_len`: Length of the whole stream, header included
/// - `header_len`: Bytes copied verbatim and never used as units
///
/// # Returns
/// `total_len - header_len`, or 0 if the stream is shorter than the header.
pub fn usable_units(total_len: u64, header_len: usize) -> u64 {
    total_len.saturating_sub(header_len as u64)
}

fn read_header<R: Read>(reader: &mut R, header_len: usize) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(header_len);
    reader.by_ref().take(header_len as u64).read_to_end(&mut header)?;
    if header.len() < header_len {
        return Err(StegoError::HeaderTruncated {
            expected: header_len,
            actual: header.len(),
        });
    }
    Ok(header)
}

fn read_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Reads units after skipping the header.
///
/// # Example
/// ```ignore
/// let mut reader = RawReader::new(File::open("encode.bmp")?, BMP_HEADER_LEN)?;
/// while let Some(unit) = reader.next_unit()? { /* ... */ }
/// ```
pub struct RawReader<R: Read> {
    inner: BufReader<R>,
}

impl<R: Read> RawReader<R> {
    /// Wraps `reader` and consumes its first `header_len` bytes.
    ///
    /// # Errors
    /// - [`StegoError::HeaderTruncated`] if the stream ends inside the header
    /// - I/O errors from `reader`
    pub fn new(reader: R, header_len: usize) -> Result<Self> {
        let mut inner = BufReader::new(reader);
        read_header(&mut inner, header_len)?;
        Ok(Self { inner })
    }
}

impl<R: Read> UnitSource for RawReader<R> {
    fn next_unit(&mut self) -> Result<Option<u8>> {
        Ok(read_byte(&mut self.inner)?)
    }
}

/// Copies a source stream into `out`, letting the caller replace units on
/// the way through.
///
/// The header is written as soon as the writer is created. Every unit pulled
/// with `next_unit` is written exactly once: either the replacement given to
/// `set_unit`, or the original if the caller moves on without replacing it.
pub struct RawWriter<R: Read, W: Write> {
    source: BufReader<R>,
    out: BufWriter<W>,
    pending: Option<u8>,
    units_rewritten: usize,
}

impl<R: Read, W: Write> RawWriter<R, W> {
    /// Reads the header from `source` and writes it to `out` unchanged.
    ///
    /// # Arguments
    /// - `source`: Original carrier stream
    /// - `out`: Destination for the rewritten carrier
    /// - `header_len`: Bytes to copy before the first unit
    ///
    /// # Errors
    /// - [`StegoError::HeaderTruncated`] if `source` ends inside the header;
    ///   nothing has been written to `out` in that case
    /// - I/O errors from either stream
    pub fn new(source: R, out: W, header_len: usize) -> Result<Self> {
        let mut source = BufReader::new(source);
        let header = read_header(&mut source, header_len)?;
        let mut out = BufWriter::new(out);
        out.write_all(&header)?;
        Ok(Self {
            source,
            out,
            pending: None,
            units_rewritten: 0,
        })
    }

    pub fn units_rewritten(&self) -> usize {
        self.units_rewritten
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        if let Some(original) = self.pending.take() {
            self.out.write_all(&[original])?;
        }
        Ok(())
    }

    /// Copies the untouched remainder of the source and returns the
    /// underlying writer.
    ///
    /// # Returns
    /// `out`, flushed, holding exactly as many bytes as the source.
    ///
    /// # Errors
    /// - Reading the source or flushing `out` fails
    pub fn finish(mut self) -> Result<W> {
        self.flush_pending()?;
        io::copy(&mut self.source, &mut self.out)?;
        let out = self.out.into_inner().map_err(|e| e.into_error())?;
        Ok(out)
    }
}

impl<R: Read, W: Write> UnitSource for RawWriter<R, W> {
    fn next_unit(&mut self) -> Result<Option<u8>> {
        self.flush_pending()?;
        let unit = read_byte(&mut self.source)?;
        self.pending = unit;
        Ok(unit)
    }
}

impl<R: Read, W: Write> UnitSink for RawWriter<R, W> {
    fn set_unit(&mut self, value: u8) -> Result<()> {
        if self.pending.take().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "set_unit called without a pending unit",
            )
            .into());
        }
        self.out.write_all(&[value])?;
        self.units_rewritten += 1;
        Ok(())
    }
}
