//! # Codec
//!
//! The steganographic core, leaf to root:
//!
//! - [`mask`]: degree validation and bit masks
//! - [`script`]: script-switch markers and the transliteration table
//! - [`capacity`]: does the message fit
//! - [`encoder`] / [`decoder`]: drive a carrier cursor unit by unit

pub mod capacity;
pub mod decoder;
pub mod encoder;
pub mod mask;
pub mod script;

pub use capacity::CapacityReport;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use mask::{BitMaskPair, Degree};
pub use script::{postprocess, preprocess, EncodedMessage, ScriptState, TransliterationTable};
