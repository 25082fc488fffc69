//! # Configuration
//!
//! TOML configuration for the codec and its output. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.
//!
//! # Example TOML
//!
//! ```toml
//! [codec]
//! degree = 2
//! header_len = 54
//!
//! [output]
//! path = "encode.bmp"
//! format = "auto"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::carrier::BMP_HEADER_LEN;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: SpycatsConfig = load_config("spycats.toml")?;
/// ```
pub fn load_config<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: T = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// How a carrier file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CarrierFormat {
    /// `.bmp` files are raw streams, everything else is a pixel grid.
    #[default]
    Auto,
    /// Byte stream with an opaque fixed-size header.
    Raw,
    /// Decoded RGB image.
    Grid,
}

impl CarrierFormat {
    /// Replaces `Auto` with the concrete format implied by `path`.
    pub fn resolve(self, path: &Path) -> CarrierFormat {
        match self {
            CarrierFormat::Auto => {
                let is_bmp = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("bmp"));
                if is_bmp {
                    CarrierFormat::Raw
                } else {
                    CarrierFormat::Grid
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for CarrierFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CarrierFormat::Auto => "auto",
            CarrierFormat::Raw => "raw",
            CarrierFormat::Grid => "grid",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpycatsConfig {
    pub codec: CodecConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Message bits per carrier unit (1, 2, 4 or 8). Validated when used.
    pub degree: u8,
    /// Opaque header length of raw carriers, in bytes.
    pub header_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            degree: 2,
            header_len: BMP_HEADER_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where `encode` writes the carrier when no output is given.
    pub path: String,
    pub format: CarrierFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "encode.bmp".to_string(),
            format: CarrierFormat::Auto,
        }
    }
}

impl SpycatsConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SpycatsConfig = toml::from_str("").unwrap();
        assert_eq!(config, SpycatsConfig::default());
        assert_eq!(config.codec.degree, 2);
        assert_eq!(config.codec.header_len, 54);
        assert_eq!(config.output.path, "encode.bmp");
    }

    #[test]
    fn test_partial_config() {
        let config: SpycatsConfig = toml::from_str(
            r#"
            [codec]
            degree = 4

            [output]
            format = "grid"
            "#,
        )
        .unwrap();
        assert_eq!(config.codec.degree, 4);
        assert_eq!(config.codec.header_len, 54);
        assert_eq!(config.output.format, CarrierFormat::Grid);
        assert_eq!(config.output.path, "encode.bmp");
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(CarrierFormat::Auto.resolve(Path::new("a.BMP")), CarrierFormat::Raw);
        assert_eq!(CarrierFormat::Auto.resolve(Path::new("a.png")), CarrierFormat::Grid);
        assert_eq!(CarrierFormat::Auto.resolve(Path::new("noext")), CarrierFormat::Grid);
        assert_eq!(CarrierFormat::Grid.resolve(Path::new("a.bmp")), CarrierFormat::Grid);
    }
}
