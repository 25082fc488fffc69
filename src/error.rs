//! # Codec Errors
//!
//! Every failure the codec can surface to its caller. Binaries wrap these in
//! `anyhow` with context; the library itself never retries.

use thiserror::Error;

/// Errors that can occur while embedding or extracting a message.
#[derive(Error, Debug)]
pub enum StegoError {
    /// Degree must be 1, 2, 4 or 8.
    #[error("invalid degree {0}: must be one of 1, 2, 4, 8")]
    InvalidDegree(u8),

    #[error("message too large for carrier: need {required_bits} bits, have {usable_bits}")]
    CapacityExceeded { required_bits: u64, usable_bits: u64 },

    /// Carrier ran out before the terminator was found. Usually a wrong
    /// degree or a carrier that holds no message.
    #[error("carrier exhausted after {processed_bytes} message bytes")]
    CarrierExhausted { processed_bytes: usize },

    #[error("message contains reserved character {ch:?} at position {index}")]
    ReservedCharacter { ch: char, index: usize },

    /// A character outside both alphabets whose low byte, the only part
    /// that is embedded, equals a marker or the terminator.
    #[error("character {ch:?} at position {index} would embed as reserved byte {byte:#04x}")]
    CollidingCharacter { ch: char, index: usize, byte: u8 },

    #[error("carrier is shorter than its header: expected {expected} bytes, got {actual}")]
    HeaderTruncated { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, StegoError>;
