//! Bitfield model and the free-text decoder for register table rows.
//!
//! A data row carries five cells: bit range, field name, access mode, reset
//! value, and description. The three sub-parses (bit range, reset value,
//! value meanings) are independent; only an unusable bit range or an empty
//! name fails the row, everything else degrades to a verbatim fallback.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("row has {0} cells, expected 5")]
    CellCount(usize),
    #[error("unusable bit range {0:?}")]
    BitRange(String),
    #[error("empty field name")]
    EmptyName,
}

/// Documented reset value of a bitfield. Unrecognized notations keep the
/// raw text so nothing from the datasheet is lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResetValue {
    Value(u32),
    Raw(String),
}

/// Whether an observed value deviates from the documented reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deviation {
    No,
    Yes,
    /// Reset value is non-numeric or undefined, so deviation cannot be
    /// determined. Distinct from `No` on purpose.
    Unknown,
}

/// Result of decoding a live register value against one bitfield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedField {
    pub value: u32,
    /// Enumerated meaning of the observed value, empty when undocumented.
    pub meaning: String,
    pub deviation: Deviation,
}

/// A contiguous sub-range of bits within a register.
///
/// `bit_start` is the low bit, `bit_stop` the high bit; the datasheet lists
/// ranges high-bit-first ("7-4"), so the token before the separator lands in
/// `bit_stop`. That convention is assumed from the source documents, not
/// independently verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitField {
    pub bit_start: u8,
    pub bit_stop: u8,
    pub name: String,
    /// Access mode token as printed (RW, RO, RW/SC, ...). Datasheets vary;
    /// not validated against a fixed set.
    pub access: String,
    pub reset_value: ResetValue,
    pub description: String,
    /// value -> meaning mapping extracted from the description text.
    pub value_meanings: BTreeMap<u32, String>,
}

impl BitField {
    /// Decode one data row. Cells: bit range, name, access, reset value,
    /// description.
    pub fn from_row(cells: &[String]) -> Result<Self, RowError> {
        if cells.len() != 5 {
            return Err(RowError::CellCount(cells.len()));
        }
        let (bit_start, bit_stop) = parse_bit_range(&cells[0])?;
        let name = cells[1].trim().to_string();
        if name.is_empty() {
            return Err(RowError::EmptyName);
        }
        let description = cells[4].replace("\n\n", "\n").trim().to_string();
        Ok(Self {
            bit_start,
            bit_stop,
            name,
            access: cells[2].trim().to_string(),
            reset_value: parse_reset_value(&cells[3]),
            value_meanings: extract_value_meanings(&description),
            description,
        })
    }

    /// Width of the field in bits. `from_row` guarantees
    /// `bit_start <= bit_stop <= 31`; a field built directly through the
    /// public fields may not, so an inverted range reads as width 1 rather
    /// than wrapping.
    pub fn bit_length(&self) -> u32 {
        u32::from(self.bit_stop.saturating_sub(self.bit_start)) + 1
    }

    /// Decode a live register value against this field: mask out the field
    /// bits, look up the enumerated meaning, and compare against reset.
    /// The mask is applied regardless of stray high bits in `live_value`,
    /// and regardless of what keys `value_meanings` happens to contain.
    /// Bit positions beyond 31 read as zero instead of overflowing the
    /// shift.
    pub fn decode(&self, live_value: u32) -> DecodedField {
        let shift = u32::from(self.bit_start).min(32);
        let mask = (1u64 << self.bit_length().min(32)) - 1;
        let value = ((u64::from(live_value) >> shift) & mask) as u32;
        let meaning = self
            .value_meanings
            .get(&value)
            .cloned()
            .unwrap_or_default();
        let deviation = match &self.reset_value {
            ResetValue::Value(reset) => {
                if value == *reset {
                    Deviation::No
                } else {
                    Deviation::Yes
                }
            }
            ResetValue::Raw(_) => Deviation::Unknown,
        };
        DecodedField {
            value,
            meaning,
            deviation,
        }
    }
}

/// Parse "7-4" (high bit first) or a single "3". A lone integer is a
/// one-bit field.
fn parse_bit_range(text: &str) -> Result<(u8, u8), RowError> {
    let text = text.trim();
    let bad = || RowError::BitRange(text.to_string());
    let (start, stop) = match text.split_once('-') {
        Some((high, low)) => {
            let stop: u8 = high.trim().parse().map_err(|_| bad())?;
            let start: u8 = low.trim().parse().map_err(|_| bad())?;
            (start, stop)
        }
        None => {
            let bit: u8 = text.parse().map_err(|_| bad())?;
            (bit, bit)
        }
    };
    if start > stop || stop > 31 {
        return Err(bad());
    }
    Ok((start, stop))
}

/// Parse a reset value cell: trailing 'b' marks binary, else decimal, else
/// the trimmed text is kept verbatim.
fn parse_reset_value(text: &str) -> ResetValue {
    let text = text.trim();
    if let Some(digits) = text.strip_suffix('b') {
        if let Ok(value) = u32::from_str_radix(digits, 2) {
            return ResetValue::Value(value);
        }
    }
    match text.parse::<u32>() {
        Ok(value) => ResetValue::Value(value),
        Err(_) => ResetValue::Raw(text.to_string()),
    }
}

/// One pattern of the value-meaning mini-grammar: a run of digits, an
/// optional marker letter, then `-` or `=` with optional single spaces,
/// then the meaning text.
struct MeaningPattern {
    radix: u32,
    is_digit: fn(char) -> bool,
    marker: Option<char>,
}

fn is_binary_digit(ch: char) -> bool {
    ch == '0' || ch == '1'
}

fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Ordered: the binary pattern is tried before the decimal one and the
/// first match wins. A line like "10 - Ten" therefore yields key 2, not 10.
/// This matches the source documents' dominant notation ("01b - Enable")
/// and is kept as-is; see the known-ambiguity test.
const MEANING_PATTERNS: [MeaningPattern; 2] = [
    MeaningPattern {
        radix: 2,
        is_digit: is_binary_digit,
        marker: Some('b'),
    },
    MeaningPattern {
        radix: 10,
        is_digit: is_decimal_digit,
        marker: None,
    },
];

fn match_meaning_line(line: &str, pattern: &MeaningPattern) -> Option<(u32, String)> {
    let end = line
        .find(|ch: char| !(pattern.is_digit)(ch))
        .unwrap_or(line.len());
    if end == 0 {
        return None;
    }
    let (digits, mut rest) = line.split_at(end);
    if let Some(marker) = pattern.marker {
        rest = rest.strip_prefix(marker).unwrap_or(rest);
    }
    rest = rest.strip_prefix(' ').unwrap_or(rest);
    rest = rest
        .strip_prefix('-')
        .or_else(|| rest.strip_prefix('='))?;
    let meaning = rest.strip_prefix(' ').unwrap_or(rest).trim();
    if meaning.is_empty() {
        return None;
    }
    let value = u32::from_str_radix(digits, pattern.radix).ok()?;
    Some((value, meaning.to_string()))
}

/// Extract the value -> meaning mapping from description text, line by
/// line. Non-matching lines contribute nothing but stay part of the
/// description.
fn extract_value_meanings(description: &str) -> BTreeMap<u32, String> {
    let mut meanings = BTreeMap::new();
    for line in description.lines() {
        let line = line.trim();
        for pattern in &MEANING_PATTERNS {
            if let Some((value, meaning)) = match_meaning_line(line, pattern) {
                meanings.insert(value, meaning);
                break;
            }
        }
    }
    meanings
}
