/// Manifest compiler
///
/// Turns a registry of scheduled units and declared gridfunctions into the
/// `schedule.ccl` and `interface.ccl` files of a simulation component.

pub mod driver;
pub mod error;
pub mod interface;
pub mod persist;
pub mod project;
pub mod schedule;

pub use driver::{
    BatchReport, CompileOptions, ComponentReport, ComponentSpec, ManifestCompiler, ManifestOutput,
};
pub use error::{CompileError, Diagnostic, Result};
pub use interface::{ComponentDeclaration, INTERFACE_FILE_NAME, compile_interface};
pub use persist::{WriteOutcome, WritePolicy, manifest_path, write_manifest};
pub use project::ProjectFile;
pub use schedule::{
    DEFAULT_BIN_ORDER, SCHEDULE_FILE_NAME, ScheduleCompiler, ScheduleOutput, ScheduleRequest,
};
