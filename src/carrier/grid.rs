//! Pixel-grid carrier.
//!
//! Units are the R, G, B channel values of an [`RgbImage`], visited row-major
//! (y outer, x inner). The grid has no header and is addressed by
//! coordinate, so the writer keeps the source image and a full clone and
//! overwrites only the channels it is handed back.

use image::RgbImage;
use std::io;

use crate::carrier::{UnitSink, UnitSource};
use crate::error::Result;

/// Channels per pixel used for embedding. Alpha is never touched.
pub const CHANNELS: usize = 3;

/// Units available for embedding: one per channel per pixel.
///
/// # Returns
/// `width * height * 3`. A grid has no header.
pub fn usable_units(image: &RgbImage) -> u64 {
    let (width, height) = image.dimensions();
    u64::from(width) * u64::from(height) * CHANNELS as u64
}

/// Position of the next unit: pixel coordinate plus channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCursor {
    x: u32,
    y: u32,
    channel: usize,
}

impl GridCursor {
    /// Current position if it lies inside a `width` x `height` grid.
    fn current(&self, width: u32, height: u32) -> Option<(u32, u32, usize)> {
        if width == 0 || self.y >= height {
            return None;
        }
        Some((self.x, self.y, self.channel))
    }

    fn advance(&mut self, width: u32) {
        self.channel += 1;
        if self.channel == CHANNELS {
            self.channel = 0;
            self.x += 1;
            if self.x == width {
                self.x = 0;
                self.y += 1;
            }
        }
    }

    /// Returns the current position and moves past it.
    fn take(&mut self, image: &RgbImage) -> Option<(u32, u32, usize)> {
        let (width, height) = image.dimensions();
        let pos = self.current(width, height)?;
        self.advance(width);
        Some(pos)
    }
}

/// Reads channel values of a borrowed image in embedding order.
pub struct GridReader<'a> {
    image: &'a RgbImage,
    cursor: GridCursor,
}

impl<'a> GridReader<'a> {
    /// Starts at the top-left pixel, red channel.
    pub fn new(image: &'a RgbImage) -> Self {
        Self {
            image,
            cursor: GridCursor::default(),
        }
    }
}

impl UnitSource for GridReader<'_> {
    fn next_unit(&mut self) -> Result<Option<u8>> {
        Ok(self
            .cursor
            .take(self.image)
            .map(|(x, y, c)| self.image.get_pixel(x, y).0[c]))
    }
}

/// Reads units from a source image and writes replacements into a clone.
///
/// Channels that are pulled but not replaced keep their original value, so
/// the clone differs from the source only where `set_unit` was called.
///
/// # Example
/// ```ignore
/// let mut writer = GridWriter::new(&image);
/// if let Some(unit) = writer.next_unit()? {
///     writer.set_unit(unit & 0xFE)?;
/// }
/// let encoded = writer.finish();
/// ```
pub struct GridWriter<'a> {
    source: &'a RgbImage,
    output: RgbImage,
    cursor: GridCursor,
    last: Option<(u32, u32, usize)>,
    units_rewritten: usize,
}

impl<'a> GridWriter<'a> {
    /// Clones `source` up front; the clone is what [`GridWriter::finish`]
    /// returns.
    pub fn new(source: &'a RgbImage) -> Self {
        Self {
            source,
            output: source.clone(),
            cursor: GridCursor::default(),
            last: None,
            units_rewritten: 0,
        }
    }

    pub fn units_rewritten(&self) -> usize {
        self.units_rewritten
    }

    /// The output image: the source with every replaced channel applied.
    pub fn finish(self) -> RgbImage {
        self.output
    }
}

impl UnitSource for GridWriter<'_> {
    fn next_unit(&mut self) -> Result<Option<u8>> {
        self.last = self.cursor.take(self.source);
        Ok(self
            .last
            .map(|(x, y, c)| self.source.get_pixel(x, y).0[c]))
    }
}

impl UnitSink for GridWriter<'_> {
    fn set_unit(&mut self, value: u8) -> Result<()> {
        let (x, y, c) = self.last.take().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "set_unit called without a pending unit",
            )
        })?;
        self.output.get_pixel_mut(x, y).0[c] = value;
        self.units_rewritten += 1;
        Ok(())
    }
}
