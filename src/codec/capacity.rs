//! # Capacity Check
//!
//! `usable_bits = usable_units * degree` must cover
//! `required_bits = utf8_len(encoded_message) * 8`. The check runs before any
//! carrier byte is touched, so a rejected encode leaves nothing behind.

use log::warn;
use serde::Serialize;

use crate::codec::mask::Degree;
use crate::error::{Result, StegoError};

pub fn usable_bits(usable_units: u64, degree: Degree) -> u64 {
    usable_units * u64::from(degree.bits())
}

pub fn required_bits(encoded_len: usize) -> u64 {
    encoded_len as u64 * 8
}

pub fn fits(usable_units: u64, degree: Degree, encoded_len: usize) -> bool {
    usable_bits(usable_units, degree) >= required_bits(encoded_len)
}

pub fn ensure_fits(usable_units: u64, degree: Degree, encoded_len: usize) -> Result<()> {
    let usable = usable_bits(usable_units, degree);
    let required = required_bits(encoded_len);
    if usable < required {
        warn!(
            "Message too big for carrier at degree {}: need {} bits, have {}",
            degree, required, usable
        );
        return Err(StegoError::CapacityExceeded {
            required_bits: required,
            usable_bits: usable,
        });
    }
    Ok(())
}

/// Summary of what a carrier can hold at a given degree.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CapacityReport {
    pub format: String,
    pub degree: u8,
    pub usable_units: u64,
    pub usable_bits: u64,
    /// Largest encoded message (markers and terminator included) in UTF-8 bytes.
    pub max_encoded_bytes: u64,
}

impl CapacityReport {
    pub fn new(format: impl Into<String>, usable_units: u64, degree: Degree) -> Self {
        let bits = usable_bits(usable_units, degree);
        Self {
            format: format.into(),
            degree: degree.bits(),
            usable_units,
            usable_bits: bits,
            max_encoded_bytes: bits / 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary() {
        let degree = Degree::new(1).unwrap();
        // "hi×" is 4 UTF-8 bytes = 32 bits
        assert!(fits(32, degree, 4));
        assert!(!fits(31, degree, 4));
        assert!(ensure_fits(32, degree, 4).is_ok());
        assert!(matches!(
            ensure_fits(31, degree, 4),
            Err(StegoError::CapacityExceeded {
                required_bits: 32,
                usable_bits: 31
            })
        ));
    }

    #[test]
    fn test_degree_scales_capacity() {
        let degree = Degree::new(4).unwrap();
        assert_eq!(usable_bits(10, degree), 40);
        assert!(fits(10, degree, 5));
        assert!(!fits(10, degree, 6));
    }

    #[test]
    fn test_report() {
        let report = CapacityReport::new("raw", 46, Degree::new(2).unwrap());
        assert_eq!(report.usable_bits, 92);
        assert_eq!(report.max_encoded_bytes, 11);
    }
}
