//! Error types for registry construction.

use thiserror::Error;

use crate::field::FieldGroup;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unit '{0}' is already registered")]
    DuplicateUnit(String),

    #[error("field '{0}' is already registered")]
    DuplicateField(String),

    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    #[error("field '{name}' cannot be registered in the {group} group: it is derived from the evolved group")]
    DerivedGroup { name: String, group: FieldGroup },
}
