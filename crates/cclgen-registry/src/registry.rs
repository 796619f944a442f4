//! The explicit registry object handed to the compilers.

use std::collections::{HashMap, HashSet};

use crate::Result;
use crate::error::RegistryError;
use crate::field::{FieldDecl, FieldGroup, FieldLists};
use crate::unit::RegisteredUnit;

/// Units and fields in registration order.
///
/// Compilers borrow the registry immutably; all mutation happens while it
/// is being built.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    units: Vec<RegisteredUnit>,
    unit_index: HashMap<String, usize>,
    fields: Vec<FieldDecl>,
    field_names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. Names are unique across all components.
    pub fn register_unit(&mut self, unit: RegisteredUnit) -> Result<()> {
        if unit.name.is_empty() {
            return Err(RegistryError::EmptyName { kind: "unit" });
        }
        if self.unit_index.contains_key(&unit.name) {
            return Err(RegistryError::DuplicateUnit(unit.name));
        }
        self.unit_index.insert(unit.name.clone(), self.units.len());
        self.units.push(unit);
        Ok(())
    }

    /// Declare a field in one of the declarable groups.
    pub fn register_field(&mut self, name: impl Into<String>, group: FieldGroup) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName { kind: "field" });
        }
        if !group.is_declarable() {
            return Err(RegistryError::DerivedGroup { name, group });
        }
        if !self.field_names.insert(name.clone()) {
            return Err(RegistryError::DuplicateField(name));
        }
        self.fields.push(FieldDecl::new(name, group));
        Ok(())
    }

    pub fn units(&self) -> impl Iterator<Item = &RegisteredUnit> {
        self.units.iter()
    }

    /// Units owned by `component`, in registration order.
    pub fn units_for<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a RegisteredUnit> {
        self.units
            .iter()
            .filter(move |unit| unit.owning_component == component)
    }

    /// Distinct owning components in first-seen order.
    pub fn components(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.units
            .iter()
            .map(|unit| unit.owning_component.as_str())
            .filter(|component| seen.insert(*component))
            .collect()
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Ordered field lists for the declarable groups.
    pub fn field_lists(&self) -> FieldLists {
        let mut lists = FieldLists::default();
        for field in &self.fields {
            let target = match field.group {
                FieldGroup::Evolved => &mut lists.evolved,
                FieldGroup::AuxEvol => &mut lists.auxevol,
                FieldGroup::Aux => &mut lists.aux,
                // rejected by register_field
                FieldGroup::Rhs => continue,
            };
            target.push(field.name.clone());
        }
        lists
    }

    /// Number of registered units, across all components.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}
