//! # Carrier File Processing
//!
//! File-level encode, decode and capacity operations over both carrier
//! formats.

pub mod steganography;

pub use steganography::{
    capacity_report, decode_file, encode_file, output_path_for, EncodeReport,
};
