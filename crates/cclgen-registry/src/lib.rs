//! Registry of computational units and gridfunction declarations.
//!
//! Units and fields are registered once, in declaration order, and then read
//! by the manifest compilers. Nothing in this crate writes files.

mod error;
mod field;
mod registry;
mod unit;

pub use error::RegistryError;
pub use field::{FieldDecl, FieldGroup, FieldLists, RHS_SUFFIX};
pub use registry::Registry;
pub use unit::{FUNC_NAME_PLACEHOLDER, Placement, RegisteredUnit};

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
