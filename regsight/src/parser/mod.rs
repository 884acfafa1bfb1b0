pub mod html;
pub mod table;

// Re-export for convenience
pub use html::{collect_tables, ScanError};
pub use table::{RawTable, RegisterCandidate, RejectedTable};
