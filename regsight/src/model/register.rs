//! Register model and the title-phrase assembler.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::model::bitfield::BitField;

#[derive(Debug, Error)]
pub enum TitleError {
    #[error("title does not match the expected phrase shape: {0:?}")]
    Shape(String),
    #[error("unparseable register address {0:?}")]
    Address(String),
}

/// An addressable hardware register, assembled from one accepted table.
///
/// Bitfields are appended in document order and never reordered. The live
/// value is absent until a hardware read attaches one; each read overwrites
/// the previous.
#[derive(Debug, Clone, Serialize)]
pub struct Register {
    pub name: String,
    pub address: u32,
    /// Documented reset value of the whole register, `None` when absent or
    /// unparseable in the title.
    pub reset_value: Option<u32>,
    pub bitfields: Vec<BitField>,
    pub live_value: Option<u32>,
}

impl Register {
    /// Assemble a register from its section title phrase.
    ///
    /// The title is a fixed 9-token whitespace-separated phrase, e.g.
    /// `8.1.1 BMCR Register (Address = 0000h) (Reset = 2100h)`: a label,
    /// the name, three fillers, the address token, two fillers, the reset
    /// token. Address and reset each carry a two-character suffix to strip
    /// and are hexadecimal.
    ///
    /// A title that does not tokenize, or an unparseable address, rejects
    /// the whole register: a misparsed title would corrupt every downstream
    /// field with unrelated data. An unparseable reset value alone leaves
    /// `reset_value` undefined and keeps the register.
    pub fn from_title(title: &str) -> Result<Self, TitleError> {
        let tokens: Vec<&str> = title.split_whitespace().collect();
        let [_label, name, _, _, _, address, _, _, reset] = tokens.as_slice() else {
            return Err(TitleError::Shape(title.to_string()));
        };
        let address = u32::from_str_radix(strip_suffix_chars(address, 2), 16)
            .map_err(|_| TitleError::Address(address.to_string()))?;
        let reset_value = u32::from_str_radix(strip_suffix_chars(reset, 2), 16).ok();
        Ok(Self {
            name: name.to_string(),
            address,
            reset_value,
            bitfields: Vec::new(),
            live_value: None,
        })
    }

    /// Append a bitfield in document order. Overlapping bit ranges violate
    /// the model invariant; the violation is reported, not fatal, and the
    /// field is kept as documented.
    pub fn push_bitfield(&mut self, field: BitField) {
        if let Some(other) = self
            .bitfields
            .iter()
            .find(|f| f.bit_start <= field.bit_stop && field.bit_start <= f.bit_stop)
        {
            warn!(
                register = %self.name,
                field = %field.name,
                overlaps = %other.name,
                "overlapping bit ranges in register table"
            );
        }
        self.bitfields.push(field);
    }

    /// Attach a value read from hardware. Overwrites any previous read.
    pub fn set_live_value(&mut self, value: u32) {
        self.live_value = Some(value);
    }
}

/// Drop the last `n` characters of a token (the `h)`-style unit suffix).
fn strip_suffix_chars(token: &str, n: usize) -> &str {
    let mut chars = token.chars();
    for _ in 0..n {
        chars.next_back();
    }
    chars.as_str()
}
