//! Workflow definition handling
//!
//! - `definition` - Opaque workflow document and model-response parsing
//! - `loader` - Load workflows from, and write them back to, the working tree

pub mod definition;
pub mod loader;

pub use definition::{DefinitionError, WorkflowDefinition};
pub use loader::{LoadError, WorkflowLoader};
