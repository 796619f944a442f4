/// Compiler driver that generates both manifests for one or more components

use std::path::PathBuf;

use cclgen_registry::{Placement, Registry};
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Diagnostic, Result};
use crate::interface::{ComponentDeclaration, INTERFACE_FILE_NAME, compile_interface};
use crate::persist::{WriteOutcome, WritePolicy, manifest_path, write_manifest};
use crate::schedule::{SCHEDULE_FILE_NAME, ScheduleCompiler, ScheduleRequest};

/// Options for generation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Root under which `<component>/` directories are created
    pub project_dir: PathBuf,
    /// Known-bin order override; `None` uses the default lifecycle order
    pub bin_order: Option<Vec<String>>,
    /// Generate text without touching the filesystem
    pub dry_run: bool,
}

impl CompileOptions {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            bin_order: None,
            dry_run: false,
        }
    }

    pub fn bin_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bin_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Everything needed to generate one component's manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(flatten)]
    pub declaration: ComponentDeclaration,
    /// STORAGE: lines for schedule.ccl
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub extra_schedule_entries: Vec<Placement>,
}

impl ComponentSpec {
    pub fn new(declaration: ComponentDeclaration) -> Self {
        Self {
            declaration,
            ..Default::default()
        }
    }

    pub fn storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = storage.into();
        self
    }

    pub fn extra_entry(mut self, bin: impl Into<String>, entry: impl Into<String>) -> Self {
        self.extra_schedule_entries.push(Placement::new(bin, entry));
        self
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }
}

/// One generated manifest.
#[derive(Debug, Clone)]
pub struct ManifestOutput {
    pub path: PathBuf,
    pub text: String,
    /// `None` in dry-run mode
    pub outcome: Option<WriteOutcome>,
}

/// Result of generating one component.
#[derive(Debug, Clone)]
pub struct ComponentReport {
    pub component: String,
    pub schedule: ManifestOutput,
    pub interface: ManifestOutput,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-component results of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<ComponentReport>,
    pub failures: Vec<(String, CompileError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse into a single result; failures become [`CompileError::Multiple`].
    pub fn into_result(self) -> Result<Vec<ComponentReport>> {
        if self.failures.is_empty() {
            Ok(self.reports)
        } else {
            Err(CompileError::Multiple(
                self.failures.into_iter().map(|(_, e)| e).collect(),
            ))
        }
    }
}

/// The manifest compiler
pub struct ManifestCompiler {
    options: CompileOptions,
    schedule: ScheduleCompiler,
}

impl ManifestCompiler {
    /// Create a new compiler with the given options
    pub fn new(options: CompileOptions) -> Self {
        let schedule = match &options.bin_order {
            Some(order) => ScheduleCompiler::with_bin_order(order.iter().cloned()),
            None => ScheduleCompiler::new(),
        };
        Self { options, schedule }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Generate and persist schedule.ccl, overwriting any existing file.
    pub fn generate_schedule(
        &self,
        registry: &Registry,
        spec: &ComponentSpec,
    ) -> Result<(ManifestOutput, Vec<Diagnostic>)> {
        let request = ScheduleRequest::new(spec.name(), &spec.storage)
            .extra_entries(&spec.extra_schedule_entries);
        let output = self.schedule.compile(registry, &request)?;
        let manifest = self.persist(
            spec.name(),
            SCHEDULE_FILE_NAME,
            output.text,
            WritePolicy::Overwrite,
        )?;
        Ok((manifest, output.diagnostics))
    }

    /// Generate interface.ccl, writing only when the contents changed.
    pub fn generate_interface(
        &self,
        registry: &Registry,
        declaration: &ComponentDeclaration,
    ) -> Result<ManifestOutput> {
        let text = compile_interface(declaration, &registry.field_lists())?;
        self.persist(&declaration.name, INTERFACE_FILE_NAME, text, WritePolicy::IfChanged)
    }

    /// Generate both manifests for one component
    pub fn generate_component(
        &self,
        registry: &Registry,
        spec: &ComponentSpec,
    ) -> Result<ComponentReport> {
        tracing::debug!(component = spec.name(), "generating manifests");

        // schedule.ccl is always rewritten; diagnostics ride along in the report
        let (schedule, diagnostics) = self.generate_schedule(registry, spec)?;

        // interface.ccl keeps its timestamp when nothing changed
        let interface = self.generate_interface(registry, &spec.declaration)?;

        Ok(ComponentReport {
            component: spec.name().to_string(),
            schedule,
            interface,
            diagnostics,
        })
    }

    /// Generate every component; a failure only aborts that component.
    pub fn generate_all<'a, I>(&self, registry: &Registry, specs: I) -> BatchReport
    where
        I: IntoIterator<Item = &'a ComponentSpec>,
    {
        let mut batch = BatchReport::default();
        // Keep going after a failure so the remaining components still get written
        for spec in specs {
            match self.generate_component(registry, spec) {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    tracing::error!(component = spec.name(), "generation failed: {}", e);
                    batch.failures.push((spec.name().to_string(), e));
                }
            }
        }
        batch
    }

    fn persist(
        &self,
        component: &str,
        file_name: &str,
        text: String,
        policy: WritePolicy,
    ) -> Result<ManifestOutput> {
        // Dry run: report where the file would go, touch nothing
        if self.options.dry_run {
            return Ok(ManifestOutput {
                path: manifest_path(&self.options.project_dir, component, file_name),
                text,
                outcome: None,
            });
        }
        let (path, outcome) =
            write_manifest(&self.options.project_dir, component, file_name, &text, policy)?;
        Ok(ManifestOutput {
            path,
            text,
            outcome: Some(outcome),
        })
    }
}
