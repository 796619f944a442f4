//! Gridfunction declarations and their role-based grouping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix appended to an evolved field name to form its right-hand side.
pub const RHS_SUFFIX: &str = "_rhs";

/// Role of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Evolved,
    /// Right-hand sides of evolved fields; always derived, never registered
    Rhs,
    #[serde(rename = "auxevol")]
    AuxEvol,
    Aux,
}

impl FieldGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Evolved => "evolved",
            FieldGroup::Rhs => "rhs",
            FieldGroup::AuxEvol => "auxevol",
            FieldGroup::Aux => "aux",
        }
    }

    /// Groups that may be populated directly from declarations.
    pub fn is_declarable(&self) -> bool {
        !matches!(self, FieldGroup::Rhs)
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub group: FieldGroup,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, group: FieldGroup) -> Self {
        Self {
            name: name.into(),
            group,
        }
    }
}

/// Ordered field base-names per declarable group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldLists {
    pub evolved: Vec<String>,
    pub auxevol: Vec<String>,
    pub aux: Vec<String>,
}

impl FieldLists {
    /// Right-hand-side names, one per evolved name and in the same order.
    pub fn rhs(&self) -> Vec<String> {
        self.evolved
            .iter()
            .map(|name| format!("{name}{RHS_SUFFIX}"))
            .collect()
    }
}
