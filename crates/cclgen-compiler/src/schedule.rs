/// schedule.ccl generation
///
/// Replays a fixed sequence of known scheduling bins over a component's
/// placements, emitting each placement exactly once: under the first known bin
/// it matches, or in a trailing catch-all section when its bin is unknown.

use std::fmt::Write as _;

use cclgen_registry::{Placement, Registry};

use crate::error::{CompileError, Diagnostic, Result};

/// File name of the scheduling manifest inside a component directory.
pub const SCHEDULE_FILE_NAME: &str = "schedule.ccl";

/// Lifecycle stages in the order their sections are emitted.
pub const DEFAULT_BIN_ORDER: [&str; 5] = [
    "STARTUP",
    "BASEGRID",
    "CCTK_INITIAL",
    "ODESolvers_RHS",
    "ODESolvers_PostStep",
];

const SECTION_RULE: &str = "##################################################";

const SCHEDULE_HEADER: &str = "# This schedule.ccl file was automatically generated by cclgen.
#   You are advised against modifying it directly; instead
#   modify the registry that generates it.
";

/// Inputs for one schedule.ccl generation call.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleRequest<'a> {
    /// Component whose units are scheduled
    pub component: &'a str,
    /// STORAGE: declarations, emitted verbatim
    pub storage: &'a str,
    /// Raw placements not tied to a registered unit
    pub extra_entries: &'a [Placement],
}

impl<'a> ScheduleRequest<'a> {
    pub fn new(component: &'a str, storage: &'a str) -> Self {
        Self {
            component,
            storage,
            extra_entries: &[],
        }
    }

    pub fn extra_entries(mut self, entries: &'a [Placement]) -> Self {
        self.extra_entries = entries;
        self
    }
}

/// Generated schedule text plus advisory diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutput {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Working record for one (unit, placement) pair; local to a single call.
#[derive(Debug)]
struct ScheduleEntry<'r> {
    /// Empty for extra entries
    unit_name: &'r str,
    placement: &'r Placement,
    emitted: bool,
}

impl ScheduleEntry<'_> {
    fn pending_in(&self, bin: &str) -> bool {
        !self.emitted && self.placement.bin.eq_ignore_ascii_case(bin)
    }

    fn render(&self) -> String {
        self.placement.render(self.unit_name)
    }
}

/// Numbered-section output buffer.
struct SectionWriter {
    output: String,
    step: usize,
}

impl SectionWriter {
    fn new(header: &str) -> Self {
        Self {
            output: header.to_string(),
            step: 0,
        }
    }

    fn open_section(&mut self, title: &str) -> Result<()> {
        write!(self.output, "\n{SECTION_RULE}\n# Step {}: {title}\n", self.step)?;
        self.step += 1;
        Ok(())
    }

    fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }
}

/// Compiler for schedule.ccl manifests.
#[derive(Debug, Clone)]
pub struct ScheduleCompiler {
    bin_order: Vec<String>,
}

impl Default for ScheduleCompiler {
    fn default() -> Self {
        Self::with_bin_order(DEFAULT_BIN_ORDER)
    }
}

impl ScheduleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom known-bin sequence instead of [`DEFAULT_BIN_ORDER`].
    pub fn with_bin_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bin_order: order.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bin_order(&self) -> &[String] {
        &self.bin_order
    }

    /// Generate the schedule.ccl text for `request.component`.
    pub fn compile(
        &self,
        registry: &Registry,
        request: &ScheduleRequest<'_>,
    ) -> Result<ScheduleOutput> {
        let (mut entries, diagnostics) = collect_entries(registry, request)?;

        // Step 0 always carries the storage declarations
        let mut writer = SectionWriter::new(SCHEDULE_HEADER);
        writer.open_section("Allocate memory for gridfunctions, using the STORAGE: keyword.")?;
        writer.push(request.storage);
        writer.push("\n");

        // Known bins in priority order; headers only for bins that receive entries
        for bin in &self.bin_order {
            let mut header_written = false;
            for entry in entries.iter_mut().filter(|entry| entry.pending_in(bin)) {
                if !header_written {
                    let title = format!("Schedule functions in the {bin} scheduling bin.");
                    writer.open_section(&title)?;
                    header_written = true;
                }
                writer.push(&entry.render());
                entry.emitted = true;
            }
        }

        // Whatever is left named a bin outside the known order
        let mut catch_all_open = false;
        for entry in entries.iter_mut().filter(|entry| !entry.emitted) {
            if !catch_all_open {
                writer.open_section("Schedule functions in the remaining scheduling bins.")?;
                catch_all_open = true;
            }
            tracing::debug!(
                bin = %entry.placement.bin,
                unit = entry.unit_name,
                "bin not in known order, emitting in catch-all section"
            );
            writer.push(&entry.render());
            entry.emitted = true;
        }

        debug_assert!(entries.iter().all(|entry| entry.emitted));
        tracing::debug!(
            component = request.component,
            entries = entries.len(),
            sections = writer.step,
            "generated schedule"
        );

        Ok(ScheduleOutput {
            text: writer.output,
            diagnostics,
        })
    }
}

/// Flatten the component's placements (then the extra entries) into working records.
fn collect_entries<'r>(
    registry: &'r Registry,
    request: &ScheduleRequest<'r>,
) -> Result<(Vec<ScheduleEntry<'r>>, Vec<Diagnostic>)> {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for unit in registry.units_for(request.component) {
        if !unit.has_schedule_info() {
            let diagnostic = Diagnostic::MissingScheduleInfo {
                unit: unit.name.clone(),
                component: unit.owning_component.clone(),
            };
            tracing::warn!("{diagnostic}");
            diagnostics.push(diagnostic);
            continue;
        }
        for placement in &unit.placements {
            check_bin(&format!("unit '{}'", unit.name), placement)?;
            entries.push(ScheduleEntry {
                unit_name: &unit.name,
                placement,
                emitted: false,
            });
        }
    }

    for (idx, placement) in request.extra_entries.iter().enumerate() {
        check_bin(&format!("extra entry #{idx}"), placement)?;
        // Extra entries have no unit; the placeholder collapses to nothing.
        if placement.has_placeholder() {
            let diagnostic = Diagnostic::UnnamedPlaceholder {
                bin: placement.bin.clone(),
                component: request.component.to_string(),
            };
            tracing::warn!("{diagnostic}");
            diagnostics.push(diagnostic);
        }
        entries.push(ScheduleEntry {
            unit_name: "",
            placement,
            emitted: false,
        });
    }

    Ok((entries, diagnostics))
}

/// A placement without a bin cannot be scheduled anywhere.
fn check_bin(owner: &str, placement: &Placement) -> Result<()> {
    if placement.bin.trim().is_empty() {
        return Err(CompileError::malformed_template(
            owner,
            &placement.bin,
            "placement names no scheduling bin",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cclgen_registry::RegisteredUnit;

    const CALL: &str = "CALL FUNC_NAME\n";

    fn compile(registry: &Registry) -> ScheduleOutput {
        let request = ScheduleRequest::new("T", "STORAGE: evol_variables[3]");
        ScheduleCompiler::new().compile(registry, &request).unwrap()
    }

    fn registry_of(units: Vec<RegisteredUnit>) -> Registry {
        let mut registry = Registry::new();
        for unit in units {
            registry.register_unit(unit).unwrap();
        }
        registry
    }

    fn position(text: &str, needle: &str) -> usize {
        text.find(needle).unwrap_or_else(|| panic!("missing {needle:?} in:\n{text}"))
    }

    #[test]
    fn test_known_bins_in_registration_order() {
        let registry = registry_of(vec![
            RegisteredUnit::new("U1", "T").with_placement("STARTUP", CALL),
            RegisteredUnit::new("U2", "T")
                .with_placement("BASEGRID", CALL)
                .with_placement("STARTUP", CALL),
        ]);
        let text = compile(&registry).text;

        let startup = position(&text, "# Step 1: Schedule functions in the STARTUP scheduling");
        let basegrid = position(&text, "# Step 2: Schedule functions in the BASEGRID scheduling");
        let u1 = position(&text, "CALL U1\n");
        assert!(startup < u1 && u1 < basegrid);

        let startup_body = &text[startup..basegrid];
        assert!(startup_body.find("CALL U1").unwrap() < startup_body.find("CALL U2").unwrap());
        assert_eq!(text[basegrid..].matches("CALL U2").count(), 1);
        assert_eq!(text.matches("CALL U2\n").count(), 2);
        assert!(!text.contains("remaining scheduling bins"));
    }

    #[test]
    fn test_unknown_bin_goes_to_catch_all_only() {
        let registry = registry_of(vec![
            RegisteredUnit::new("U0", "T").with_placement("STARTUP", CALL),
            RegisteredUnit::new("U3", "T").with_placement("WEIRD_BIN", CALL),
        ]);
        let text = compile(&registry).text;

        let catch_all = position(&text, "# Step 2: Schedule functions in the remaining");
        assert_eq!(text.matches("CALL U3").count(), 1);
        assert!(position(&text, "CALL U3") > catch_all);
        assert!(!text.contains("WEIRD_BIN scheduling bin"));
    }

    #[test]
    fn test_single_catch_all_header_for_many_unknown_bins() {
        let registry = registry_of(vec![
            RegisteredUnit::new("A", "T").with_placement("CCTK_ANALYSIS", CALL),
            RegisteredUnit::new("B", "T").with_placement("CCTK_POSTREGRID", CALL),
            RegisteredUnit::new("C", "T").with_placement("CCTK_ANALYSIS", CALL),
        ]);
        let text = compile(&registry).text;

        assert_eq!(text.matches("remaining scheduling bins").count(), 1);
        let a = position(&text, "CALL A");
        let b = position(&text, "CALL B");
        let c = position(&text, "CALL C");
        assert!(a < b && b < c);
    }

    #[test]
    fn test_bin_match_is_case_insensitive() {
        let registry = registry_of(vec![
            RegisteredUnit::new("lower", "T").with_placement("startup", CALL),
            RegisteredUnit::new("mixed", "T").with_placement("odesolvers_rhs", CALL),
        ]);
        let text = compile(&registry).text;

        assert!(text.contains("in the STARTUP scheduling bin.\nCALL lower\n"));
        assert!(text.contains("# Step 1: Schedule functions in the STARTUP"));
        assert!(text.contains("in the ODESolvers_RHS scheduling bin.\nCALL mixed\n"));
        assert!(text.contains("# Step 2: Schedule functions in the ODESolvers_RHS"));
        assert!(!text.contains("remaining scheduling bins"));
    }

    #[test]
    fn test_same_bin_twice_emits_both_under_one_header() {
        let registry = registry_of(vec![
            RegisteredUnit::new("twice", "T")
                .with_placement("CCTK_INITIAL", "first FUNC_NAME\n")
                .with_placement("CCTK_INITIAL", "second FUNC_NAME\n"),
        ]);
        let text = compile(&registry).text;

        assert_eq!(text.matches("CCTK_INITIAL scheduling bin").count(), 1);
        assert!(text.contains("CCTK_INITIAL scheduling bin.\nfirst twice\nsecond twice\n"));
    }

    #[test]
    fn test_headers_are_lazy_and_numbered_per_emitted_section() {
        let registry = registry_of(vec![
            RegisteredUnit::new("post", "T").with_placement("ODESolvers_PostStep", CALL),
            RegisteredUnit::new("init", "T").with_placement("CCTK_INITIAL", CALL),
        ]);
        let text = compile(&registry).text;

        assert!(text.contains(
            "# Step 0: Allocate memory for gridfunctions, using the STORAGE: keyword.\n\
             STORAGE: evol_variables[3]\n"
        ));
        assert!(text.contains("# Step 1: Schedule functions in the CCTK_INITIAL scheduling bin."));
        assert!(text.contains("# Step 2: Schedule functions in the ODESolvers_PostStep"));
        assert!(!text.contains("STARTUP"));
        assert!(!text.contains("BASEGRID"));
    }

    #[test]
    fn test_missing_placements_reported_not_emitted() {
        let registry = registry_of(vec![
            RegisteredUnit::new("orphan", "T"),
            RegisteredUnit::new("U1", "T").with_placement("STARTUP", CALL),
        ]);
        let output = compile(&registry);

        assert!(!output.text.contains("orphan"));
        assert_eq!(
            output.diagnostics,
            vec![Diagnostic::MissingScheduleInfo {
                unit: "orphan".into(),
                component: "T".into(),
            }]
        );
    }

    #[test]
    fn test_other_components_ignored() {
        let registry = registry_of(vec![
            RegisteredUnit::new("mine", "T").with_placement("STARTUP", CALL),
            RegisteredUnit::new("theirs", "Other").with_placement("STARTUP", CALL),
            RegisteredUnit::new("their_orphan", "Other"),
        ]);
        let output = compile(&registry);

        assert!(output.text.contains("CALL mine"));
        assert!(!output.text.contains("theirs"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_extra_entries_follow_unit_entries() {
        let registry = registry_of(vec![
            RegisteredUnit::new("U1", "T").with_placement("BASEGRID", CALL),
        ]);
        let extras = vec![
            Placement::new("BASEGRID", "schedule GROUP ApplyBCs\n"),
            Placement::new("MoL_Register", "schedule register_vars\n"),
        ];
        let request = ScheduleRequest::new("T", "").extra_entries(&extras);
        let text = ScheduleCompiler::new().compile(&registry, &request).unwrap().text;

        let u1 = position(&text, "CALL U1");
        let bcs = position(&text, "schedule GROUP ApplyBCs");
        let catch_all = position(&text, "remaining scheduling bins");
        assert!(u1 < bcs && bcs < catch_all);
        assert!(position(&text, "schedule register_vars") > catch_all);
    }

    #[test]
    fn test_extra_entries_without_registered_units() {
        let registry = Registry::new();
        let extras = vec![Placement::new("STARTUP", "schedule banner\n")];
        let request = ScheduleRequest::new("Empty", "STORAGE: none").extra_entries(&extras);
        let text = ScheduleCompiler::new().compile(&registry, &request).unwrap().text;

        assert!(text.starts_with(SCHEDULE_HEADER));
        assert!(text.contains("STARTUP scheduling bin.\nschedule banner\n"));
    }

    #[test]
    fn test_whitespace_extra_entry_emitted_verbatim() {
        let registry =
            registry_of(vec![RegisteredUnit::new("U1", "T").with_placement("STARTUP", CALL)]);
        let extras = vec![Placement::new("STARTUP", "\n")];
        let request = ScheduleRequest::new("T", "").extra_entries(&extras);
        let output = ScheduleCompiler::new().compile(&registry, &request).unwrap();

        assert!(output.text.contains("STARTUP scheduling bin.\nCALL U1\n\n"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_whitespace_unit_template_emitted_verbatim() {
        let registry = registry_of(vec![
            RegisteredUnit::new("U1", "T").with_placement("STARTUP", "  \n"),
        ]);
        let output = compile(&registry);
        assert!(output.text.ends_with("STARTUP scheduling bin.\n  \n"));
    }

    #[test]
    fn test_extra_entry_placeholder_substitutes_empty_name() {
        let registry = Registry::new();
        let extras = vec![Placement::new("STARTUP", "schedule FUNC_NAME_helper\n")];
        let request = ScheduleRequest::new("T", "").extra_entries(&extras);
        let output = ScheduleCompiler::new().compile(&registry, &request).unwrap();

        assert!(output.text.contains("STARTUP scheduling bin.\nschedule _helper\n"));
        assert!(!output.text.contains("FUNC_NAME"));
        assert_eq!(
            output.diagnostics,
            vec![Diagnostic::UnnamedPlaceholder {
                bin: "STARTUP".into(),
                component: "T".into(),
            }]
        );
    }

    #[test]
    fn test_placement_without_bin_is_malformed() {
        let registry = registry_of(vec![RegisteredUnit::new("U1", "T").with_placement(" ", CALL)]);
        let request = ScheduleRequest::new("T", "");
        let err = ScheduleCompiler::new().compile(&registry, &request).unwrap_err();

        assert!(matches!(err, CompileError::MalformedTemplate { .. }));
        assert!(err.to_string().contains("unit 'U1'"));
    }

    #[test]
    fn test_custom_bin_order() {
        let registry = registry_of(vec![
            RegisteredUnit::new("a", "T").with_placement("STARTUP", CALL),
            RegisteredUnit::new("b", "T").with_placement("CCTK_ANALYSIS", CALL),
        ]);
        let compiler = ScheduleCompiler::with_bin_order(["CCTK_ANALYSIS", "STARTUP"]);
        let text = compiler.compile(&registry, &ScheduleRequest::new("T", "")).unwrap().text;

        assert!(position(&text, "CALL b") < position(&text, "CALL a"));
        assert!(text.contains("# Step 1: Schedule functions in the CCTK_ANALYSIS scheduling bin."));
    }

    #[test]
    fn test_output_is_deterministic() {
        let registry = registry_of(vec![
            RegisteredUnit::new("U1", "T").with_placement("WEIRD", CALL),
            RegisteredUnit::new("U2", "T").with_placement("STARTUP", CALL),
        ]);
        assert_eq!(compile(&registry), compile(&registry));
    }
}
