//! Model-to-markup rendering.
//!
//! Pure functions from the register model to a [`Node`] tree; no I/O. The
//! tree degrades gracefully: the CurrentValue column only appears when a
//! live value was attached, undefined resets render as UNDEFINED, and
//! unknown deviations are called out instead of passing as "no deviation".

use crate::model::bitfield::{BitField, Deviation, ResetValue};
use crate::model::register::Register;
use crate::report::node::Node;

const STYLESHEET_HREF: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@1/css/pico.min.css";

/// Render a complete report document for a list of registers.
pub fn document(registers: &[Register]) -> Node {
    Node::Document {
        head: vec![Node::Stylesheet(STYLESHEET_HREF.to_string())],
        body: registers.iter().map(register_section).collect(),
    }
}

/// One register: a heading plus its bitfield table.
pub fn register_section(register: &Register) -> Node {
    Node::Container(vec![heading(register), field_table(register)])
}

fn heading(register: &Register) -> Node {
    let reset_text = match register.reset_value {
        Some(reset) => format!("0x{:X}", reset),
        None => "UNDEFINED".to_string(),
    };
    match register.live_value {
        Some(live) => Node::Heading {
            text: format!(
                "{}[0x{:X}] = 0x{:X} (reset {})",
                register.name, register.address, live, reset_text
            ),
            flagged: matches!(register.reset_value, Some(reset) if reset != live),
        },
        None => Node::Heading {
            text: format!(
                "{}[0x{:X}] (reset {})",
                register.name, register.address, reset_text
            ),
            flagged: false,
        },
    }
}

fn field_table(register: &Register) -> Node {
    let mut header = vec![
        Node::HeaderCell {
            text: "Bit".to_string(),
            width: Some("7%"),
        },
        Node::HeaderCell {
            text: "Field".to_string(),
            width: Some("20%"),
        },
        Node::HeaderCell {
            text: "Type".to_string(),
            width: Some("7%"),
        },
        Node::HeaderCell {
            text: "Reset".to_string(),
            width: Some("7%"),
        },
    ];
    if register.live_value.is_some() {
        header.push(Node::HeaderCell {
            text: "CurrentValue".to_string(),
            width: None,
        });
    }
    header.push(Node::HeaderCell {
        text: "Description".to_string(),
        width: None,
    });

    let mut rows = vec![Node::Row(header)];
    for field in &register.bitfields {
        rows.push(field_row(field, register.live_value));
    }
    Node::Table(rows)
}

fn field_row(field: &BitField, live_value: Option<u32>) -> Node {
    let bit_text = if field.bit_length() == 1 {
        format!("{}", field.bit_start)
    } else {
        format!("{}-{}", field.bit_stop, field.bit_start)
    };
    let reset_text = match &field.reset_value {
        ResetValue::Value(value) => value.to_string(),
        ResetValue::Raw(text) => text.clone(),
    };

    let mut cells = vec![
        plain_cell(bit_text),
        plain_cell(field.name.clone()),
        plain_cell(field.access.clone()),
        plain_cell(reset_text),
    ];
    if let Some(live) = live_value {
        cells.push(current_value_cell(field, live));
    }
    cells.push(Node::Cell {
        lines: field.description.lines().map(str::to_string).collect(),
        flagged: false,
    });
    Node::Row(cells)
}

fn current_value_cell(field: &BitField, live_value: u32) -> Node {
    let decoded = field.decode(live_value);
    let mut lines = vec![format!("0b{:b}", decoded.value)];
    if !decoded.meaning.is_empty() {
        lines.push(decoded.meaning);
    }
    if decoded.deviation == Deviation::Unknown {
        lines.push("deviation unknown".to_string());
    }
    Node::Cell {
        lines,
        flagged: decoded.deviation == Deviation::Yes,
    }
}

fn plain_cell(text: String) -> Node {
    Node::Cell {
        lines: vec![text],
        flagged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn register() -> Register {
        let mut reg =
            Register::from_title("8.1.1 BMCR Register (Address = 0000h) (Reset = 0002h)").unwrap();
        let mut meanings = BTreeMap::new();
        meanings.insert(1, "Enabled".to_string());
        meanings.insert(0, "Disabled".to_string());
        reg.push_bitfield(BitField {
            bit_start: 1,
            bit_stop: 1,
            name: "EN".to_string(),
            access: "RW".to_string(),
            reset_value: ResetValue::Value(1),
            description: "1b - Enabled\n0b - Disabled".to_string(),
            value_meanings: meanings,
        });
        reg
    }

    #[test]
    fn test_no_live_value_has_five_columns() {
        let html = register_section(&register()).to_string();
        assert!(!html.contains("CurrentValue"));
        assert_eq!(html.matches("<th").count(), 5);
        assert!(html.contains("(reset 0x2)"));
    }

    #[test]
    fn test_live_value_adds_current_column() {
        let mut reg = register();
        reg.set_live_value(0x0002);
        let html = register_section(&reg).to_string();
        assert!(html.contains("CurrentValue"));
        assert_eq!(html.matches("<th").count(), 6);
        // Live equals reset: nothing flagged.
        assert!(!html.contains("class=\"red\""));
        assert!(html.contains("0b1<br>Enabled"));
    }

    #[test]
    fn test_deviation_flags_cell_and_heading() {
        let mut reg = register();
        reg.set_live_value(0x0000);
        let html = register_section(&reg).to_string();
        assert!(html.contains("<h1 class=\"red\">"));
        assert!(html.contains("<td class=\"red\">0b0<br>Disabled</td>"));
    }

    #[test]
    fn test_undefined_reset_renders_and_deviation_unknown() {
        let mut reg =
            Register::from_title("8.1.2 BMSR Register (Address = 0001h) (Reset = XXXXh)").unwrap();
        reg.push_bitfield(BitField {
            bit_start: 0,
            bit_stop: 0,
            name: "LINK".to_string(),
            access: "RO".to_string(),
            reset_value: ResetValue::Raw("X".to_string()),
            description: String::new(),
            value_meanings: BTreeMap::new(),
        });
        reg.set_live_value(1);
        let html = register_section(&reg).to_string();
        assert!(html.contains("(reset UNDEFINED)"));
        assert!(html.contains("deviation unknown"));
        // Unknown is not a deviation; the heading must not be flagged.
        assert!(!html.contains("<h1 class=\"red\">"));
    }

    #[test]
    fn test_multibit_range_rendered_high_bit_first() {
        let mut reg = register();
        reg.bitfields[0].bit_start = 4;
        reg.bitfields[0].bit_stop = 7;
        let html = register_section(&reg).to_string();
        assert!(html.contains("<td>7-4</td>"));
    }

    #[test]
    fn test_document_shell() {
        let html = document(&[register()]).to_string();
        assert!(html.starts_with("<html><head><link rel=\"stylesheet\""));
        assert!(html.ends_with("</body></html>"));
    }
}
