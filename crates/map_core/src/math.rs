//! Fixed-point ground speeds.
//!
//! Speed multipliers are fixed-point so passability and speed comparisons
//! give the same answer on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for fractional rule values.
///
/// 32 integer bits, 32 fractional bits.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers written as percentages.
///
/// Data files express speed multipliers as whole percentages (`90` means
/// 0.9); in memory they are [`Fixed`] fractions.
pub mod percent_serde {
    use super::{percent, Fixed};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize as a rounded whole percentage.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let scaled: Fixed = *value * Fixed::from_num(100);
        scaled.round().to_num::<u32>().serialize(serializer)
    }

    /// Deserialize from a whole percentage.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pct = u32::deserialize(deserializer)?;
        Ok(percent(pct))
    }
}

/// A whole percentage as a fixed-point fraction.
#[must_use]
pub fn percent(pct: u32) -> Fixed {
    Fixed::from_num(pct) / Fixed::from_num(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(100), Fixed::ONE);
        assert_eq!(percent(0), Fixed::ZERO);
        assert_eq!(percent(50), Fixed::from_num(0.5));
    }

    #[test]
    fn test_percent_serde_ron() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(with = "percent_serde")]
            value: Fixed,
        }

        let parsed: Wrapper = ron::from_str("(value: 60)").unwrap();
        assert_eq!(parsed.value, percent(60));
        let text = ron::to_string(&parsed).unwrap();
        assert_eq!(text, "(value:60)");
    }
}
