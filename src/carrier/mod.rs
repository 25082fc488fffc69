//! # Carriers
//!
//! A carrier is seen by the codec as a flat sequence of single-byte units.
//! Two physical shapes are supported:
//!
//! - [`raw`]: a byte stream whose first bytes are an opaque header (54 bytes
//!   for BMP), copied through untouched
//! - [`grid`]: an RGB pixel grid, visited row by row, channel R, G, B per
//!   pixel
//!
//! Both expose the same cursor operations so the encoder and decoder never
//! know which one they are driving. Visiting order is part of the protocol:
//! a message can only be recovered by reading units in the order they were
//! written.

use crate::error::Result;

pub mod grid;
pub mod raw;

pub use grid::{GridReader, GridWriter};
pub use raw::{RawReader, RawWriter, BMP_HEADER_LEN};

/// Sequential read access to carrier units.
pub trait UnitSource {
    /// Next unit in protocol order, or `None` once the carrier is exhausted.
    fn next_unit(&mut self) -> Result<Option<u8>>;
}

/// Read-modify-write access to carrier units.
pub trait UnitSink: UnitSource {
    /// Replaces the unit most recently returned by [`UnitSource::next_unit`].
    fn set_unit(&mut self, value: u8) -> Result<()>;
}
