/// JSON project files describing a registry and the components to generate.

use std::path::{Path, PathBuf};

use cclgen_registry::{FieldDecl, RegisteredUnit, Registry};
use serde::{Deserialize, Serialize};

use crate::driver::ComponentSpec;
use crate::error::{CompileError, Result};

/// Keys accepted in a `components` entry.
const COMPONENT_KEYS: &[&str] = &[
    "name",
    "inherits",
    "required_includes",
    "is_evolution_component",
    "enable_extra_boundary_support",
    "storage",
    "extra_schedule_entries",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// Output root; relative paths resolve against the project file's directory
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
    #[serde(default)]
    pub units: Vec<RegisteredUnit>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

impl ProjectFile {
    /// Read and parse a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CompileError::project(path, format!("cannot read file: {e}")))?;
        let mut project =
            Self::parse(&source).map_err(|e| CompileError::project(path, e.to_string()))?;

        if let Some(dir) = project.project_dir.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            project.project_dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
        }
        for spec in &project.components {
            if spec.name().is_empty() {
                return Err(CompileError::project(path, "component with an empty name"));
            }
        }
        Ok(project)
    }

    pub fn parse(source: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        // ComponentSpec flattens its declaration, so serde cannot deny unknown keys there.
        if let Some(components) = value.get("components").and_then(|c| c.as_array()) {
            for (idx, component) in components.iter().enumerate() {
                let Some(object) = component.as_object() else {
                    continue;
                };
                let unknown = object.keys().find(|key| !COMPONENT_KEYS.contains(&key.as_str()));
                if let Some(key) = unknown {
                    return Err(serde::de::Error::custom(format!(
                        "unknown field `{key}` in components[{idx}], expected one of {}",
                        COMPONENT_KEYS.join(", ")
                    )));
                }
            }
        }
        serde_json::from_value(value)
    }

    /// Register all units and fields, in file order.
    pub fn build_registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        for unit in &self.units {
            registry.register_unit(unit.clone())?;
        }
        for field in &self.fields {
            registry.register_field(field.name.clone(), field.group)?;
        }
        Ok(registry)
    }

    /// Components matching `names`, or all components when `names` is empty.
    pub fn select_components(&self, names: &[String]) -> Result<Vec<&ComponentSpec>> {
        if names.is_empty() {
            return Ok(self.components.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.components
                    .iter()
                    .find(|spec| spec.name() == name)
                    .ok_or_else(|| CompileError::UnknownComponent(name.clone()))
            })
            .collect()
    }
}
