pub mod bitfield;
pub mod register;

// Re-exports for convenience
pub use bitfield::{BitField, DecodedField, Deviation, ResetValue, RowError};
pub use register::{Register, TitleError};
