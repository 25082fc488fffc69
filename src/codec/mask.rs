//! # Degree and Bit Masks
//!
//! The degree is the number of message bits packed into the low end of each
//! carrier unit. A message byte is split into `8 / degree` chunks, most
//! significant chunk first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StegoError};

/// Number of low-order bits per carrier unit that carry message content.
///
/// Only divisors of 8 are representable, so every message byte occupies a
/// whole number of carrier units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Degree(u8);

impl Degree {
    pub const ALL: [Degree; 4] = [Degree(1), Degree(2), Degree(4), Degree(8)];

    pub fn new(bits: u8) -> Result<Self> {
        if (1..=8).contains(&bits) && 8 % bits == 0 {
            Ok(Self(bits))
        } else {
            Err(StegoError::InvalidDegree(bits))
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Carrier units consumed per message byte.
    pub fn units_per_byte(self) -> usize {
        usize::from(8 / self.0)
    }

    pub fn masks(self) -> BitMaskPair {
        BitMaskPair::for_degree(self)
    }
}

impl TryFrom<u8> for Degree {
    type Error = StegoError;

    fn try_from(bits: u8) -> Result<Self> {
        Degree::new(bits)
    }
}

impl From<Degree> for u8 {
    fn from(degree: Degree) -> u8 {
        degree.0
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Masks derived from a [`Degree`].
///
/// `message_mask` selects the top `degree` bits of a message byte,
/// `carrier_mask` keeps everything but the low `degree` bits of a carrier
/// unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMaskPair {
    pub message_mask: u8,
    pub carrier_mask: u8,
}

impl BitMaskPair {
    pub fn for_degree(degree: Degree) -> Self {
        let d = u32::from(degree.bits());
        // Widened to u32 so that degree 8 does not overflow the shift.
        let message_mask = ((0xFFu32 << (8 - d)) & 0xFF) as u8;
        let carrier_mask = (((0xFFu32 >> d) << d) & 0xFF) as u8;
        Self {
            message_mask,
            carrier_mask,
        }
    }

    /// Mask used on extraction to keep only the payload bits of a unit.
    pub fn payload_mask(&self) -> u8 {
        !self.carrier_mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_divisors() {
        for bits in [0u8, 3, 5, 6, 7, 9, 16] {
            assert!(matches!(
                Degree::new(bits),
                Err(StegoError::InvalidDegree(b)) if b == bits
            ));
        }
    }

    #[test]
    fn test_known_masks() {
        let m = Degree::new(2).unwrap().masks();
        assert_eq!(m.message_mask, 0b1100_0000);
        assert_eq!(m.carrier_mask, 0b1111_1100);
        assert_eq!(m.payload_mask(), 0b0000_0011);

        let m = Degree::new(8).unwrap().masks();
        assert_eq!(m.message_mask, 0xFF);
        assert_eq!(m.carrier_mask, 0x00);
    }

    #[test]
    fn test_carrier_mask_clears_exactly_low_bits() {
        for degree in Degree::ALL {
            let masks = degree.masks();
            let d = degree.bits();
            for byte in 0..=255u8 {
                let cleared = byte & masks.carrier_mask;
                let low = ((1u16 << d) - 1) as u8;
                assert_eq!(cleared & low, 0);
                assert_eq!(cleared & !low, byte & !low);
            }
            assert_eq!(masks.message_mask.count_ones(), u32::from(d));
            assert_eq!(masks.message_mask.leading_ones(), u32::from(d));
        }
    }

    #[test]
    fn test_units_per_byte() {
        let units: Vec<usize> = Degree::ALL.iter().map(|d| d.units_per_byte()).collect();
        assert_eq!(units, vec![8, 4, 2, 1]);
    }
}
