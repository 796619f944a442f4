//! Scheduled units and their bin placements.

use serde::{Deserialize, Serialize};

/// Token inside an entry template that is replaced by the unit name.
pub const FUNC_NAME_PLACEHOLDER: &str = "FUNC_NAME";

/// Assignment of a unit (or raw text) to a scheduling bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Scheduling bin name, matched case-insensitively
    pub bin: String,
    /// Entry text containing the unit-name placeholder
    pub entry: String,
}

impl Placement {
    pub fn new(bin: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            entry: entry.into(),
        }
    }

    /// Substitute `name` for every placeholder in the entry text.
    ///
    /// Plain string replacement: templates without the token come back unchanged.
    pub fn render(&self, name: &str) -> String {
        self.entry.replace(FUNC_NAME_PLACEHOLDER, name)
    }

    /// Whether the entry text carries the unit-name placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.entry.contains(FUNC_NAME_PLACEHOLDER)
    }
}

/// A registered computational routine with its scheduling metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUnit {
    pub name: String,
    /// Component (thorn) that owns this unit
    #[serde(alias = "component")]
    pub owning_component: String,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl RegisteredUnit {
    pub fn new(name: impl Into<String>, owning_component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owning_component: owning_component.into(),
            placements: Vec::new(),
        }
    }

    /// Append a placement; repeated bins are kept, in order.
    pub fn with_placement(mut self, bin: impl Into<String>, entry: impl Into<String>) -> Self {
        self.placements.push(Placement::new(bin, entry));
        self
    }

    pub fn has_schedule_info(&self) -> bool {
        !self.placements.is_empty()
    }
}
