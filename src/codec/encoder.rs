//! # Encoder
//!
//! Embeds a preprocessed message into a carrier, `degree` bits per unit,
//! most significant bits first.
//!
//! ## Encoding Process
//! 1. Reject reserved characters, insert script markers, append the terminator
//! 2. Check capacity against the carrier's usable units
//! 3. For every embedded byte, take `8 / degree` units: clear their low bits
//!    and OR in the next `degree` bits of the byte
//! 4. Finish the carrier (raw: copy the remainder, grid: return the clone)
//!
//! Nothing is written before step 2 succeeds.

use image::RgbImage;
use log::{debug, info};
use std::io::{Read, Write};

use crate::carrier::{grid, raw, GridWriter, RawWriter, UnitSink};
use crate::codec::capacity;
use crate::codec::mask::{BitMaskPair, Degree};
use crate::codec::script::{self, EncodedMessage};
use crate::error::{Result, StegoError};

/// Packs one message byte into the next `units_per_byte` carrier units.
fn embed_byte<S: UnitSink>(
    sink: &mut S,
    byte: u8,
    degree: Degree,
    masks: BitMaskPair,
) -> Result<bool> {
    let d = u32::from(degree.bits());
    let mut value = u16::from(byte);
    for _ in 0..degree.units_per_byte() {
        let Some(unit) = sink.next_unit()? else {
            return Ok(false);
        };
        let bits = ((value & u16::from(masks.message_mask)) >> (8 - d)) as u8;
        sink.set_unit((unit & masks.carrier_mask) | bits)?;
        value = (value << d) & 0xFF;
    }
    Ok(true)
}

/// Stateless message embedder for a fixed degree.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    degree: Degree,
    masks: BitMaskPair,
}

impl Encoder {
    /// # Arguments
    /// - `degree`: Bits of the message stored in each carrier unit
    pub fn new(degree: Degree) -> Self {
        Self {
            degree,
            masks: degree.masks(),
        }
    }

    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Validates and preprocesses `message`, then checks it fits in
    /// `usable_units`.
    ///
    /// # Errors
    /// - [`StegoError::ReservedCharacter`] or [`StegoError::CollidingCharacter`]
    ///   if the message would corrupt the markers
    /// - [`StegoError::CapacityExceeded`] if it does not fit
    pub fn prepare(&self, message: &str, usable_units: u64) -> Result<EncodedMessage> {
        script::check_reserved(message)?;
        let encoded = script::preprocess(message);
        capacity::ensure_fits(usable_units, self.degree, encoded.byte_len())?;
        Ok(encoded)
    }

    /// Writes every byte of `encoded` into `sink`. Returns the number of
    /// message bytes embedded.
    ///
    /// The caller is expected to have checked capacity; running out of units
    /// here is reported as an exhausted carrier.
    pub fn embed<S: UnitSink>(&self, encoded: &EncodedMessage, sink: &mut S) -> Result<usize> {
        let mut embedded = 0;
        for byte in encoded.embedded_bytes() {
            if !embed_byte(sink, byte, self.degree, self.masks)? {
                return Err(StegoError::CarrierExhausted {
                    processed_bytes: embedded,
                });
            }
            embedded += 1;
        }
        debug!(
            "Embedded {} bytes into {} units at degree {}",
            embedded,
            embedded * self.degree.units_per_byte(),
            self.degree
        );
        Ok(embedded)
    }

    /// Embeds an already prepared message into a raw stream, copying the
    /// header and the untouched remainder to `out`.
    pub fn write_raw<R: Read, W: Write>(
        &self,
        encoded: &EncodedMessage,
        source: R,
        out: W,
        header_len: usize,
    ) -> Result<W> {
        let mut writer = RawWriter::new(source, out, header_len)?;
        self.embed(encoded, &mut writer)?;
        let units = writer.units_rewritten();
        let out = writer.finish()?;
        info!("Encoded message into raw carrier ({} units rewritten)", units);
        Ok(out)
    }

    /// Embeds an already prepared message into a copy of `image`.
    pub fn write_grid(&self, encoded: &EncodedMessage, image: &RgbImage) -> Result<RgbImage> {
        let mut writer = GridWriter::new(image);
        self.embed(encoded, &mut writer)?;
        info!(
            "Encoded message into {}x{} image ({} channels rewritten)",
            image.width(),
            image.height(),
            writer.units_rewritten()
        );
        Ok(writer.finish())
    }

    /// Encodes into a raw carrier of `source_len` bytes read from `source`,
    /// writing the result to `out`.
    ///
    /// `out` receives nothing if the message is rejected.
    pub fn encode_raw<R: Read, W: Write>(
        &self,
        message: &str,
        source: R,
        source_len: u64,
        header_len: usize,
        out: W,
    ) -> Result<W> {
        let encoded = self.prepare(message, raw::usable_units(source_len, header_len))?;
        self.write_raw(&encoded, source, out, header_len)
    }

    /// In-memory convenience over [`Encoder::encode_raw`].
    pub fn encode_raw_bytes(
        &self,
        message: &str,
        carrier: &[u8],
        header_len: usize,
    ) -> Result<Vec<u8>> {
        self.encode_raw(
            message,
            carrier,
            carrier.len() as u64,
            header_len,
            Vec::with_capacity(carrier.len()),
        )
    }

    /// Encodes into a copy of `image`; the source is left untouched.
    pub fn encode_grid(&self, message: &str, image: &RgbImage) -> Result<RgbImage> {
        let encoded = self.prepare(message, grid::usable_units(image))?;
        self.write_grid(&encoded, image)
    }
}
