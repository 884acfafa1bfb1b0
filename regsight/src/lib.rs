//! Regsight - PHY register datasheet extraction and annotation library
//!
//! This library turns a vendor HTML datasheet (register tables embedded in
//! prose markup) into a typed register/bitfield model, optionally annotates
//! that model with live values read from hardware over an MDIO adapter, and
//! renders the result back into an HTML report that highlights deviations
//! from the documented reset values.
//!
//! # Quick Start
//!
//! ```no_run
//! use regsight::extract_registers;
//! use std::path::Path;
//!
//! let result = extract_registers(Path::new("DP83TC813_registers.html")).unwrap();
//!
//! for reg in &result.registers {
//!     println!("{} @ {:#06x}", reg.name, reg.address);
//! }
//! println!("{}", regsight::render_report(&result.registers));
//! ```
//!
//! # Features
//!
//! - **Datasheet extraction**: heading-tagged table collection, register
//!   table classification, bitfield text decoding
//! - **Live annotation**: attach register values read through a
//!   [`transport::RegisterBus`] and decode per-field deviations
//! - **HTML reporting**: pure markup-tree renderer with deviation styling

pub mod core;
pub mod model;
pub mod parser;
pub mod report;
pub mod transport;

// Re-export main types
pub use crate::core::{
    extract_registers, extract_registers_from_str, render_report, ExtractError, ExtractionResult,
    ExtractionStats,
};
pub use model::bitfield::{BitField, DecodedField, Deviation, ResetValue};
pub use model::register::Register;
pub use parser::table::{RawTable, RejectedTable};
pub use transport::{RegisterBus, UsbMdio};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BitField, Deviation, ExtractError, ExtractionResult, Register, RegisterBus, ResetValue,
    };
}
