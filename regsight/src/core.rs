//! Extraction pipeline shared by library users and the CLI.
//!
//! A single linear pass with per-table failure isolation: a rejected table
//! or an unusable row is logged and skipped, only malformed markup nesting
//! aborts the run.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::model::bitfield::BitField;
use crate::model::register::Register;
use crate::parser::html::{collect_tables, ScanError};
use crate::report;
use crate::transport::{RegisterBus, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("markup error: {0}")]
    Scan(#[from] ScanError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counts for one extraction run. `tables_seen` counts tables, not
/// registers: datasheets sometimes split one logical table across
/// fragments under a single heading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    pub tables_seen: usize,
    pub tables_rejected: usize,
    pub registers_rejected: usize,
    pub rows_skipped: usize,
}

/// The extracted register set plus run statistics.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub registers: Vec<Register>,
    pub stats: ExtractionStats,
}

/// Extract registers from a datasheet file.
pub fn extract_registers(path: &Path) -> Result<ExtractionResult, ExtractError> {
    let html = std::fs::read_to_string(path)?;
    extract_registers_from_str(&html)
}

/// Extract registers from datasheet markup already in memory.
pub fn extract_registers_from_str(html: &str) -> Result<ExtractionResult, ExtractError> {
    let tables = collect_tables(html)?;
    let mut stats = ExtractionStats {
        tables_seen: tables.len(),
        ..Default::default()
    };
    let mut registers = Vec::new();

    for table in tables {
        let candidate = match table.classify() {
            Ok(candidate) => candidate,
            Err(_) => {
                stats.tables_rejected += 1;
                continue;
            }
        };

        let title = candidate.title.as_deref().unwrap_or("");
        let mut register = match Register::from_title(title) {
            Ok(register) => register,
            Err(e) => {
                warn!(title, error = %e, "unrecognized register title");
                stats.registers_rejected += 1;
                continue;
            }
        };

        for row in &candidate.rows {
            match BitField::from_row(row) {
                Ok(field) => register.push_bitfield(field),
                Err(e) => {
                    warn!(register = %register.name, error = %e, "skipped bitfield row");
                    stats.rows_skipped += 1;
                }
            }
        }
        registers.push(register);
    }

    Ok(ExtractionResult { registers, stats })
}

/// Read each register's current value through the bus and attach it to the
/// model. A register the device does not answer for keeps no live value.
pub fn annotate<B: RegisterBus>(
    registers: &mut [Register],
    bus: &mut B,
) -> Result<(), TransportError> {
    for register in registers.iter_mut() {
        if let Some(value) = bus.read_register(register.address)? {
            register.set_live_value(value);
        }
    }
    Ok(())
}

/// Render the full HTML report for a register set.
pub fn render_report(registers: &[Register]) -> String {
    report::document(registers).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bitfield::ResetValue;

    const DOC: &str = "\
        <h2>8.1.1 BMCR Register (Address = 0000h) (Reset = 2100h)</h2>\
        <table>\
        <tr><th>Bit</th><th>Field</th><th>Type</th><th>Reset</th><th>Description</th></tr>\
        <tr><td>15</td><td>RESET</td><td>RW</td><td>0b</td><td>1b = Reset in progress<span>0b = Normal operation</span></td></tr>\
        <tr><td>13-8</td><td>SPEED</td><td>RO</td><td>100001b</td><td>Speed selection</td></tr>\
        </table>\
        <h2>Pin Functions</h2>\
        <table>\
        <tr><th>Pin</th><th>Name</th></tr>\
        <tr><td>1</td><td>VDD</td></tr>\
        </table>";

    #[test]
    fn test_extracts_registers_and_counts_rejections() {
        let result = extract_registers_from_str(DOC).unwrap();
        assert_eq!(result.registers.len(), 1);
        assert_eq!(result.stats.tables_seen, 2);
        assert_eq!(result.stats.tables_rejected, 1);
        assert_eq!(result.stats.registers_rejected, 0);

        let reg = &result.registers[0];
        assert_eq!(reg.name, "BMCR");
        assert_eq!(reg.address, 0x0000);
        assert_eq!(reg.reset_value, Some(0x2100));
        assert_eq!(reg.bitfields.len(), 2);
        assert_eq!(reg.bitfields[0].value_meanings.len(), 2);
        assert_eq!(reg.bitfields[1].reset_value, ResetValue::Value(0b100001));
    }

    #[test]
    fn test_register_table_with_bad_title_is_dropped() {
        let doc = "<h2>Just Some Prose</h2>\
            <table>\
            <tr><th>Bit</th><th>Field</th><th>Type</th><th>Reset</th><th>Description</th></tr>\
            <tr><td>0</td><td>X</td><td>RO</td><td>0</td><td>d</td></tr>\
            </table>";
        let result = extract_registers_from_str(doc).unwrap();
        assert!(result.registers.is_empty());
        assert_eq!(result.stats.registers_rejected, 1);
    }

    #[test]
    fn test_structural_error_aborts() {
        assert!(matches!(
            extract_registers_from_str("</table>"),
            Err(ExtractError::Scan(ScanError::UnbalancedTable(_)))
        ));
    }

    struct FixedBus(Vec<(u32, u32)>);

    impl RegisterBus for FixedBus {
        fn read_register(&mut self, address: u32) -> Result<Option<u32>, TransportError> {
            Ok(self
                .0
                .iter()
                .find(|(a, _)| *a == address)
                .map(|(_, v)| *v))
        }

        fn write_register(&mut self, _address: u32, _value: u32) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[test]
    fn test_annotate_attaches_live_values() {
        let mut result = extract_registers_from_str(DOC).unwrap();
        let mut bus = FixedBus(vec![(0x0000, 0x2100)]);
        annotate(&mut result.registers, &mut bus).unwrap();
        assert_eq!(result.registers[0].live_value, Some(0x2100));
    }

    #[test]
    fn test_annotate_skips_unanswered_registers() {
        let mut result = extract_registers_from_str(DOC).unwrap();
        let mut bus = FixedBus(vec![]);
        annotate(&mut result.registers, &mut bus).unwrap();
        assert_eq!(result.registers[0].live_value, None);
    }
}
