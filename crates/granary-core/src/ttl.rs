//! Time-to-live syntax
//!
//! A TTL is written as `<count><unit>`, e.g. `3m`, `4h`, `5d`, `6w`,
//! `7M`, `8y`. A bare count means minutes. Only the syntax lives here;
//! enforcement belongs to the needle store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtlUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TtlUnit {
    fn from_char(c: char) -> Option<TtlUnit> {
        match c {
            'm' => Some(TtlUnit::Minute),
            'h' => Some(TtlUnit::Hour),
            'd' => Some(TtlUnit::Day),
            'w' => Some(TtlUnit::Week),
            'M' => Some(TtlUnit::Month),
            'y' => Some(TtlUnit::Year),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            TtlUnit::Minute => 'm',
            TtlUnit::Hour => 'h',
            TtlUnit::Day => 'd',
            TtlUnit::Week => 'w',
            TtlUnit::Month => 'M',
            TtlUnit::Year => 'y',
        }
    }

    fn minutes(self) -> u32 {
        match self {
            TtlUnit::Minute => 1,
            TtlUnit::Hour => 60,
            TtlUnit::Day => 60 * 24,
            TtlUnit::Week => 60 * 24 * 7,
            TtlUnit::Month => 60 * 24 * 31,
            TtlUnit::Year => 60 * 24 * 365,
        }
    }
}

/// Structured time-to-live. The count fits in a byte so a TTL can be
/// stored inline in a needle header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ttl {
    pub count: u8,
    pub unit: TtlUnit,
}

impl Ttl {
    /// Parse TTL text. Empty input and a zero count both mean
    /// "no TTL" and yield `Ok(None)`; malformed counts and unknown unit
    /// letters are errors (callers that want best-effort semantics
    /// flatten the result).
    pub fn read(text: &str) -> Result<Option<Ttl>, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let (digits, unit) = match text.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => {
                let unit = TtlUnit::from_char(c).ok_or_else(|| {
                    AppError::InvalidInput(format!("unknown TTL unit in {text:?}"))
                })?;
                (&text[..text.len() - 1], unit)
            }
            _ => (text, TtlUnit::Minute),
        };
        let count: u8 = digits
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("invalid TTL count in {text:?}")))?;
        if count == 0 {
            return Ok(None);
        }
        Ok(Some(Ttl { count, unit }))
    }

    /// Total lifetime in minutes.
    pub fn minutes(&self) -> u32 {
        u32::from(self.count) * self.unit.minutes()
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.as_char())
    }
}
