pub mod node;
pub mod render;

// Re-exports for convenience
pub use node::Node;
pub use render::{document, register_section};
