//! # spycats
//!
//! Hides Unicode text in the least significant bits of an image and
//! recovers it exactly.
//!
//! - [`codec`]: degree masks, script-switch markers, encoder and decoder
//! - [`carrier`]: raw byte-stream and pixel-grid carriers
//! - [`processing`]: file-level operations used by the command line
//! - [`common`]: configuration and logging

pub mod carrier;
pub mod codec;
pub mod common;
pub mod error;
pub mod processing;

pub use codec::{Decoder, Degree, Encoder};
pub use common::config::{CarrierFormat, SpycatsConfig};
pub use error::StegoError;
pub use processing::{
    capacity_report, decode_file, encode_file, output_path_for, EncodeReport,
};
