//! Raw collected tables and the register table classifier.

use tracing::info;

/// The exact header row a register table must carry. Any other header, of
/// any length, marks the table as something else (pin lists, feature
/// matrices, ...) and it is dropped from extraction.
pub const REGISTER_HEADER: [&str; 5] = ["Bit", "Field", "Type", "Reset", "Description"];

/// A table as collected from the document: ordered rows of cell texts,
/// tagged with the nearest preceding section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub title: Option<String>,
    pub rows: Vec<Vec<String>>,
}

/// A table whose header matched [`REGISTER_HEADER`]; `rows` holds the data
/// rows only, header stripped.
#[derive(Debug, Clone)]
pub struct RegisterCandidate {
    pub title: Option<String>,
    pub rows: Vec<Vec<String>>,
}

/// A table the classifier dropped, with the observed header for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedTable {
    pub title: Option<String>,
    pub header: Vec<String>,
}

impl RawTable {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            rows: Vec::new(),
        }
    }

    /// Accept the table as a register candidate if the header row matches
    /// exactly (case- and whitespace-sensitive) and at least one data row
    /// follows. Rejections are informational; the run continues.
    pub fn classify(self) -> Result<RegisterCandidate, RejectedTable> {
        if self.rows.len() < 2 || self.rows[0] != REGISTER_HEADER {
            let header = self.rows.into_iter().next().unwrap_or_default();
            info!(
                title = self.title.as_deref().unwrap_or("<untitled>"),
                ?header,
                "dropped non-register table"
            );
            return Err(RejectedTable {
                title: self.title,
                header,
            });
        }
        let mut rows = self.rows;
        rows.remove(0);
        Ok(RegisterCandidate {
            title: self.title,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(title: Option<&str>, rows: &[&[&str]]) -> RawTable {
        RawTable {
            title: title.map(|t| t.to_string()),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_accepts_exact_register_header() {
        let t = table(
            Some("1.1 CTRL Register"),
            &[
                &["Bit", "Field", "Type", "Reset", "Description"],
                &["15", "RESET", "RW", "0b", "Software reset"],
            ],
        );
        let candidate = t.classify().unwrap();
        assert_eq!(candidate.rows.len(), 1);
        assert_eq!(candidate.rows[0][1], "RESET");
    }

    #[test]
    fn test_rejects_other_headers() {
        let t = table(Some("Pinout"), &[&["Pin", "Name"], &["1", "VDD"]]);
        let rejected = t.classify().unwrap_err();
        assert_eq!(rejected.header, vec!["Pin", "Name"]);
    }

    #[test]
    fn test_rejects_header_only_table() {
        let t = table(None, &[&["Bit", "Field", "Type", "Reset", "Description"]]);
        assert!(t.classify().is_err());
    }

    #[test]
    fn test_rejects_case_mismatch() {
        let t = table(
            None,
            &[
                &["bit", "field", "type", "reset", "description"],
                &["0", "X", "RO", "0", "d"],
            ],
        );
        assert!(t.classify().is_err());
    }

    #[test]
    fn test_rejects_empty_table() {
        assert!(RawTable::new(None).classify().is_err());
    }
}
