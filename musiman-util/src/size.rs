//! Human readable byte sizes such as `1KB`, `2 MiB` or `512`.

use std::str::FromStr;

use derive_more::{From, Into};
use displaydoc::Display;
use thiserror::Error;

/// Recognised units, decimal ones in powers of 1000 and binary ones in powers of 1024.
const UNITS: [(&str, u64); 7] = [
    ("B", 1),
    ("KB", 1_000),
    ("MB", 1_000_000),
    ("GB", 1_000_000_000),
    ("KIB", 1 << 10),
    ("MIB", 1 << 20),
    ("GIB", 1 << 30),
];

#[derive(Debug, Error, Display, PartialEq, Eq)]
pub enum SizeError {
    /// missing argument value
    MissingArgumentValue,
    /// missing numeric value in size {0:?}
    MissingNumericValue(String),
    /// invalid numeric value in size {0:?}
    InvalidNumericValue(String),
    /// unknown size unit {0:?}
    UnknownSizeUnit(String),
    /// size {0:?} does not fit in 64 bits
    Overflow(String),
}

/// A number of bytes parsed from an optional decimal numeral and an optional unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, From, Into)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

fn is_numeral_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ',' | '.' | '_' | ' ')
}

impl FromStr for ByteSize {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SizeError::MissingArgumentValue);
        }

        let (numeral, unit) = match s.find(|c: char| !is_numeral_char(c)) {
            Some(0) => return Err(SizeError::MissingNumericValue(s.to_string())),
            Some(idx) => s.split_at(idx),
            None => (s, ""),
        };

        let multiplier = if unit.is_empty() {
            1
        } else {
            let unit = unit.trim().to_ascii_uppercase();
            UNITS
                .iter()
                .find(|(name, _)| *name == unit)
                .map(|(_, multiplier)| *multiplier)
                .ok_or(SizeError::UnknownSizeUnit(unit))?
        };

        // Separators are accepted while locating the unit but never inside the value itself.
        let value: u64 = numeral
            .trim()
            .parse()
            .map_err(|_| SizeError::InvalidNumericValue(s.to_string()))?;

        value
            .checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| SizeError::Overflow(s.to_string()))
    }
}
