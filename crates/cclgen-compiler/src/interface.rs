/// interface.ccl generation
///
/// Declares what a component implements and inherits, the aliased functions
/// it needs, and the public gridfunction groups derived from the field lists.

use std::fmt::Write as _;

use cclgen_registry::FieldLists;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the interface manifest inside a component directory.
pub const INTERFACE_FILE_NAME: &str = "interface.ccl";

/// Suffix appended to every declared gridfunction name.
const GF_SUFFIX: &str = "GF";

const NO_PROLONGATION_TAGS: &str =
    r#"TAGS='InterpNumTimelevels=1 prolongation="none" checkpoint="no"'"#;

const EVOLUTION_FUNCTIONS: &str = "
# Needed Method of Lines function
CCTK_INT FUNCTION MoLRegisterEvolvedGroup(CCTK_INT IN EvolvedIndex, CCTK_INT IN RHSIndex)
REQUIRES FUNCTION MoLRegisterEvolvedGroup

# Needed Boundary Conditions function
CCTK_INT FUNCTION GetBoundarySpecification(CCTK_INT IN size, CCTK_INT OUT ARRAY nboundaryzones, CCTK_INT OUT ARRAY is_internal, CCTK_INT OUT ARRAY is_staggered, CCTK_INT OUT ARRAY shiftout)
USES FUNCTION GetBoundarySpecification

CCTK_INT FUNCTION SymmetryTableHandleForGrid(CCTK_POINTER_TO_CONST IN cctkGH)
USES FUNCTION SymmetryTableHandleForGrid

CCTK_INT FUNCTION Boundary_SelectVarForBC(CCTK_POINTER_TO_CONST IN GH, CCTK_INT IN faces, CCTK_INT IN boundary_width, CCTK_INT IN table_handle, CCTK_STRING IN var_name, CCTK_STRING IN bc_name)
USES FUNCTION Boundary_SelectVarForBC

CCTK_INT FUNCTION Driver_SelectVarForBC(CCTK_POINTER_TO_CONST IN GH, CCTK_INT IN faces, CCTK_INT IN boundary_width, CCTK_INT IN table_handle, CCTK_STRING IN group_name, CCTK_STRING IN bc_name)
USES FUNCTION Driver_SelectVarForBC
";

const BOUNDARY_SUPPORT_FUNCTIONS: &str = r"
# Needed to convert ADM initial data into BSSN initial data (Gamma extrapolation)
CCTK_INT FUNCTION ExtrapolateGammas(CCTK_POINTER_TO_CONST IN cctkGH, CCTK_REAL ARRAY INOUT var)
REQUIRES FUNCTION ExtrapolateGammas

# Needed for EinsteinEvolve/NewRad outer boundary condition driver:
CCTK_INT FUNCTION                         \
    NewRad_Apply                          \
        (CCTK_POINTER_TO_CONST IN cctkGH, \
         CCTK_REAL ARRAY IN var,          \
         CCTK_REAL ARRAY INOUT rhs,       \
         CCTK_REAL IN var0,               \
         CCTK_REAL IN v0,                 \
         CCTK_INT IN radpower)
REQUIRES FUNCTION NewRad_Apply
";

const PUBLIC_PREAMBLE: &str = "
# Symmetry conditions are not declared here; see
#    https://einsteintoolkit.org/thornguide/CactusBase/SymBase/documentation.html

# Tell the Toolkit that we want all gridfunctions
#    to be visible to other thorns by using
#    the keyword \"public\". Note that declaring these
#    gridfunctions *does not* allocate memory for them;
#    that is done by the schedule.ccl file.

public:
";

/// Per-invocation description of the component being generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentDeclaration {
    pub name: String,
    /// Space-separated list of inherited components
    pub inherits: String,
    /// `USES INCLUDE` / function lines, emitted verbatim
    pub required_includes: String,
    pub is_evolution_component: bool,
    /// Emit the Gamma-extrapolation and NewRad function requirements
    pub enable_extra_boundary_support: bool,
}

impl ComponentDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn inherits(mut self, inherits: impl Into<String>) -> Self {
        self.inherits = inherits.into();
        self
    }

    pub fn required_includes(mut self, text: impl Into<String>) -> Self {
        self.required_includes = text.into();
        self
    }

    pub fn evolution(mut self, is_evolution_component: bool) -> Self {
        self.is_evolution_component = is_evolution_component;
        self
    }

    pub fn extra_boundary_support(mut self, enabled: bool) -> Self {
        self.enable_extra_boundary_support = enabled;
        self
    }
}

/// Timelevel storage and tagging for one declaration block.
struct GroupBlock<'a> {
    group_name: &'a str,
    timelevels: u8,
    tags: Option<&'a str>,
    description: &'a str,
}

/// Generate the interface.ccl text for `decl` and the registered field lists.
pub fn compile_interface(decl: &ComponentDeclaration, fields: &FieldLists) -> Result<String> {
    let mut output = String::new();
    write!(
        output,
        "
# This interface.ccl file was automatically generated by cclgen.
#   You are advised against modifying it directly; instead
#   modify the registry that generates it.

# With \"implements\", we give our thorn its unique name.
implements: {name}

# By \"inheriting\" other thorns, we tell the Toolkit that we
#   will rely on variables/function that exist within those
#   functions.
inherits: {inherits}

# Needed functions and #include's:
{includes}
",
        name = decl.name,
        inherits = decl.inherits,
        includes = decl.required_includes,
    )?;

    if decl.is_evolution_component {
        output.push_str(EVOLUTION_FUNCTIONS);
    }
    if decl.enable_extra_boundary_support {
        output.push_str(BOUNDARY_SUPPORT_FUNCTIONS);
    }
    output.push_str(PUBLIC_PREAMBLE);

    // AuxEvol storage only exists alongside evolved fields.
    if decl.is_evolution_component && !fields.evolved.is_empty() {
        write_block(
            &mut output,
            &GroupBlock {
                group_name: "evol_variables",
                timelevels: 3,
                tags: None,
                description: "Evolved gridfunctions.",
            },
            &fields.evolved,
        )?;
        write_block(
            &mut output,
            &GroupBlock {
                group_name: "evol_variables_rhs",
                timelevels: 1,
                tags: Some(NO_PROLONGATION_TAGS),
                description: "Right-hand-side gridfunctions.",
            },
            &fields.rhs(),
        )?;
        if !fields.auxevol.is_empty() {
            write_block(
                &mut output,
                &GroupBlock {
                    group_name: "auxevol_variables",
                    timelevels: 1,
                    tags: Some(NO_PROLONGATION_TAGS),
                    description: "Auxiliary gridfunctions needed for evaluating the RHSs.",
                },
                &fields.auxevol,
            )?;
        }
    } else if !fields.auxevol.is_empty() {
        tracing::debug!(
            component = %decl.name,
            "skipping auxevol gridfunctions: component has no evolved gridfunctions"
        );
    }

    if !fields.aux.is_empty() {
        write_block(
            &mut output,
            &GroupBlock {
                group_name: "aux_variables",
                timelevels: 3,
                tags: None,
                description: "Auxiliary gridfunctions for e.g., diagnostics.",
            },
            &fields.aux,
        )?;
    }

    Ok(output)
}

fn write_block(output: &mut String, block: &GroupBlock<'_>, names: &[String]) -> Result<()> {
    write!(
        output,
        "CCTK_REAL {} type = GF Timelevels={}",
        block.group_name, block.timelevels
    )?;
    if let Some(tags) = block.tags {
        write!(output, " {tags}")?;
    }
    writeln!(output, "\n{{\n  {}\n}} \"{}\"\n", gf_list(names), block.description)?;
    Ok(())
}

/// Comma-joined, GF-suffixed names in input order.
fn gf_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("{name}{GF_SUFFIX}"))
        .collect::<Vec<_>>()
        .join(", ")
}
