//! # Decoder
//!
//! Reads carrier units in the same order the encoder wrote them, rebuilds
//! one message byte per `8 / degree` units and feeds it to the script
//! decoder until the terminator shows up.

use image::RgbImage;
use log::{debug, info};
use std::io::Read;

use crate::carrier::{GridReader, RawReader, UnitSource};
use crate::codec::mask::Degree;
use crate::codec::script::{ScriptDecoder, Step};
use crate::error::{Result, StegoError};

/// Message extractor for a fixed degree.
///
/// Must be built with the degree the message was encoded with; any other
/// degree yields garbage or [`StegoError::CarrierExhausted`].
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    degree: Degree,
    payload_mask: u8,
}

impl Decoder {
    /// # Arguments
    /// - `degree`: Bits per unit used when the message was embedded
    pub fn new(degree: Degree) -> Self {
        Self {
            degree,
            payload_mask: degree.masks().payload_mask(),
        }
    }

    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Accumulates the next message byte, or `None` if the carrier ends
    /// first.
    fn next_byte<S: UnitSource>(&self, source: &mut S) -> Result<Option<u8>> {
        let d = u32::from(self.degree.bits());
        let mut acc: u16 = 0;
        for _ in 0..self.degree.units_per_byte() {
            let Some(unit) = source.next_unit()? else {
                return Ok(None);
            };
            acc = (acc << d) | u16::from(unit & self.payload_mask);
        }
        Ok(Some(acc as u8))
    }

    /// Extracts the message from `source`.
    ///
    /// # Returns
    /// The message with markers and terminator removed and foreign runs
    /// transliterated back.
    ///
    /// # Errors
    /// - [`StegoError::CarrierExhausted`] if the carrier ends before the
    ///   terminator
    /// - Errors from `source`
    pub fn extract<S: UnitSource>(&self, source: &mut S) -> Result<String> {
        let mut script = ScriptDecoder::new();
        let mut processed = 0;
        loop {
            let byte = self.next_byte(source)?.ok_or(StegoError::CarrierExhausted {
                processed_bytes: processed,
            })?;
            processed += 1;
            // Bytes are Latin-1 codepoints.
            if script.push(char::from(byte)) == Step::Done {
                break;
            }
        }
        debug!("Extracted {} bytes at degree {}", processed, self.degree);
        Ok(script.into_message())
    }

    /// Decodes a raw carrier stream.
    ///
    /// # Arguments
    /// - `reader`: The whole carrier, header included
    /// - `header_len`: Bytes skipped before the first unit
    ///
    /// # Errors
    /// - [`StegoError::HeaderTruncated`] if `reader` ends inside the header
    /// - [`StegoError::CarrierExhausted`] if no terminator is found
    /// - I/O errors from `reader`
    pub fn decode_raw<R: Read>(&self, reader: R, header_len: usize) -> Result<String> {
        let mut source = RawReader::new(reader, header_len)?;
        let message = self.extract(&mut source)?;
        info!("Decoded {} characters from raw carrier", message.chars().count());
        Ok(message)
    }

    /// [`Decoder::decode_raw`] over an in-memory carrier.
    pub fn decode_raw_bytes(&self, carrier: &[u8], header_len: usize) -> Result<String> {
        self.decode_raw(carrier, header_len)
    }

    /// Decodes a pixel grid, channels visited row-major.
    ///
    /// # Errors
    /// - [`StegoError::CarrierExhausted`] if no terminator is found
    pub fn decode_grid(&self, image: &RgbImage) -> Result<String> {
        let message = self.extract(&mut GridReader::new(image))?;
        info!(
            "Decoded {} characters from {}x{} image",
            message.chars().count(),
            image.width(),
            image.height()
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::BMP_HEADER_LEN;
    use crate::codec::encoder::Encoder;
    use image::{ImageBuffer, Rgb};

    fn raw_carrier(units: usize) -> Vec<u8> {
        let mut carrier = vec![0xFF; BMP_HEADER_LEN];
        carrier.extend((0..units).map(|i| (i * 37 % 256) as u8));
        carrier
    }

    #[test]
    fn test_hi_degree_two() {
        let mut carrier = vec![0xFF; BMP_HEADER_LEN];
        carrier.extend(vec![0u8; 100 - BMP_HEADER_LEN]);
        let degree = Degree::new(2).unwrap();

        let out = Encoder::new(degree)
            .encode_raw_bytes("hi", &carrier, BMP_HEADER_LEN)
            .unwrap();
        assert!(out[..BMP_HEADER_LEN].iter().all(|&b| b == 0xFF));

        let message = Decoder::new(degree)
            .decode_raw_bytes(&out, BMP_HEADER_LEN)
            .unwrap();
        assert_eq!(message, "hi");
    }

    #[test]
    fn test_mixed_script_degree_four() {
        let degree = Degree::new(4).unwrap();
        let carrier = raw_carrier(200);
        let out = Encoder::new(degree)
            .encode_raw_bytes("cat кот", &carrier, BMP_HEADER_LEN)
            .unwrap();
        let message = Decoder::new(degree)
            .decode_raw_bytes(&out, BMP_HEADER_LEN)
            .unwrap();
        assert_eq!(message, "cat кот");
    }

    #[test]
    fn test_all_degrees_raw() {
        let message =
            "Съешь же ещё этих мягких французских булок, да выпей чаю. The quick brown fox!";
        for degree in Degree::ALL {
            let out = Encoder::new(degree)
                .encode_raw_bytes(message, &raw_carrier(2000), BMP_HEADER_LEN)
                .unwrap();
            let decoded = Decoder::new(degree)
                .decode_raw_bytes(&out, BMP_HEADER_LEN)
                .unwrap();
            assert_eq!(decoded, message, "degree {}", degree);
        }
    }

    #[test]
    fn test_all_degrees_grid() {
        let image: RgbImage = ImageBuffer::from_fn(40, 30, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, ((x + y) * 3) as u8])
        });
        let message = "Hello Мир again";
        for degree in Degree::ALL {
            let out = Encoder::new(degree).encode_grid(message, &image).unwrap();
            assert_eq!(out.dimensions(), image.dimensions());
            let decoded = Decoder::new(degree).decode_grid(&out).unwrap();
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_missing_terminator() {
        let carrier = vec![0u8; BMP_HEADER_LEN + 64];
        let result =
            Decoder::new(Degree::new(2).unwrap()).decode_raw_bytes(&carrier, BMP_HEADER_LEN);
        assert!(matches!(
            result,
            Err(StegoError::CarrierExhausted { processed_bytes: 16 })
        ));
    }

    #[test]
    fn test_wrong_degree_does_not_return_original() {
        let carrier = raw_carrier(400);
        let out = Encoder::new(Degree::new(4).unwrap())
            .encode_raw_bytes("secret", &carrier, BMP_HEADER_LEN)
            .unwrap();
        let result = Decoder::new(Degree::new(2).unwrap()).decode_raw_bytes(&out, BMP_HEADER_LEN);
        assert!(!matches!(result, Ok(ref m) if m == "secret"));
    }
}
