//! # File-Level Steganography
//!
//! Opens carrier files, runs the codec and writes the result. This is the
//! layer the command line talks to.
//!
//! ## Carrier Formats
//! - **Raw** (`.bmp` by default): the file is a byte stream. The first
//!   `header_len` bytes are copied verbatim, the rest are carrier units.
//!   Capacity is computed from file metadata, so an oversized message is
//!   rejected before the output file exists.
//! - **Grid**: the file is decoded into an RGB image (alpha dropped) and
//!   units are channel values. The output is saved in the format implied by
//!   its extension and must be lossless.
//!
//! ### Capacity
//! `(units - header) * degree` bits must hold `utf8_len(encoded) * 8` bits,
//! where the encoded message includes script markers and the terminator.

use image::RgbImage;
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::carrier::{grid, raw};
use crate::codec::{CapacityReport, Decoder, Degree, Encoder};
use crate::common::config::CarrierFormat;
use crate::error::Result;

/// Outcome of a successful [`encode_file`].
#[derive(Debug, Clone, Serialize)]
pub struct EncodeReport {
    pub format: CarrierFormat,
    pub degree: u8,
    pub output: PathBuf,
    /// Characters embedded, markers and terminator included.
    pub embedded_chars: usize,
    pub units_rewritten: usize,
}

fn load_grid(path: &Path) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

fn is_lossy(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "webp"))
}

/// Picks the output path for an encode whose `--output` was not given.
///
/// The configured default is kept when `Auto` reads it back as the same
/// format the input is encoded as. Otherwise its extension is replaced:
/// `bmp` for a raw carrier, `png` for a grid.
///
/// # Arguments
/// - `input`: Carrier being encoded
/// - `configured`: Default output path from the configuration
/// - `format`: Requested carrier format, possibly `Auto`
///
/// # Returns
/// A path that `decode_file` with [`CarrierFormat::Auto`] reads back in the
/// format it was written in.
pub fn output_path_for(input: &Path, configured: &Path, format: CarrierFormat) -> PathBuf {
    let written = format.resolve(input);
    if CarrierFormat::Auto.resolve(configured) == written {
        return configured.to_path_buf();
    }
    let extension = match written {
        CarrierFormat::Raw => "bmp",
        _ => "png",
    };
    let path = configured.with_extension(extension);
    info!(
        "{} carrier will be written to {} instead of {}",
        written,
        path.display(),
        configured.display()
    );
    path
}

/// Hides `message` in the carrier at `input` and writes the result to
/// `output`.
///
/// # Errors
/// - Message contains a reserved character or does not fit: no output file
///   is created
/// - Carrier cannot be read, or the output cannot be written
pub fn encode_file(
    message: &str,
    degree: Degree,
    input: &Path,
    output: &Path,
    format: CarrierFormat,
    header_len: usize,
) -> Result<EncodeReport> {
    let format = format.resolve(input);
    let encoder = Encoder::new(degree);

    let encoded = match format {
        CarrierFormat::Grid => {
            let image = load_grid(input)?;
            let encoded = encoder.prepare(message, grid::usable_units(&image))?;
            if CarrierFormat::Auto.resolve(output) != CarrierFormat::Grid {
                warn!(
                    "{} will be read back as a raw carrier, decode it with --format grid",
                    output.display()
                );
            }
            if is_lossy(output) {
                warn!(
                    "{} uses a lossy format, the hidden message will not survive",
                    output.display()
                );
            }
            encoder.write_grid(&encoded, &image)?.save(output)?;
            encoded
        }
        _ => {
            let total_len = fs::metadata(input)?.len();
            let encoded = encoder.prepare(message, raw::usable_units(total_len, header_len))?;
            let source = File::open(input)?;
            let out = File::create(output)?;
            encoder.write_raw(&encoded, source, out, header_len)?;
            encoded
        }
    };

    let embedded_chars = encoded.as_str().chars().count();
    info!(
        "Hid {} characters in {} ({} carrier, degree {})",
        embedded_chars,
        output.display(),
        format,
        degree
    );
    Ok(EncodeReport {
        format,
        degree: degree.bits(),
        output: output.to_path_buf(),
        embedded_chars,
        units_rewritten: embedded_chars * degree.units_per_byte(),
    })
}

/// Recovers the message hidden in the carrier at `input`.
pub fn decode_file(
    degree: Degree,
    input: &Path,
    format: CarrierFormat,
    header_len: usize,
) -> Result<String> {
    let decoder = Decoder::new(degree);
    match format.resolve(input) {
        CarrierFormat::Grid => decoder.decode_grid(&load_grid(input)?),
        _ => decoder.decode_raw(File::open(input)?, header_len),
    }
}

/// Reports how much the carrier at `input` can hold at `degree`.
pub fn capacity_report(
    degree: Degree,
    input: &Path,
    format: CarrierFormat,
    header_len: usize,
) -> Result<CapacityReport> {
    let format = format.resolve(input);
    let usable_units = match format {
        CarrierFormat::Grid => {
            let (width, height) = image::image_dimensions(input)?;
            u64::from(width) * u64::from(height) * grid::CHANNELS as u64
        }
        _ => raw::usable_units(fs::metadata(input)?.len(), header_len),
    };
    Ok(CapacityReport::new(format.to_string(), usable_units, degree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_follows_carrier_format() {
        let configured = Path::new("encode.bmp");
        assert_eq!(
            output_path_for(Path::new("cover.png"), configured, CarrierFormat::Auto),
            PathBuf::from("encode.png")
        );
        assert_eq!(
            output_path_for(Path::new("vangog.bmp"), configured, CarrierFormat::Auto),
            PathBuf::from("encode.bmp")
        );
        assert_eq!(
            output_path_for(Path::new("cover.bmp"), configured, CarrierFormat::Grid),
            PathBuf::from("encode.png")
        );
        assert_eq!(
            output_path_for(Path::new("cover.png"), Path::new("out/hidden.tiff"), CarrierFormat::Auto),
            PathBuf::from("out/hidden.tiff")
        );
        assert_eq!(
            output_path_for(Path::new("cover.bin"), Path::new("hidden.png"), CarrierFormat::Raw),
            PathBuf::from("hidden.bmp")
        );
    }
}
