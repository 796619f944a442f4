/// Manifest compiler CLI

use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use cclgen_compiler::{CompileOptions, ManifestCompiler, ProjectFile, WriteOutcome};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cclgenc")]
#[command(about = "Generates schedule.ccl and interface.ccl files from a project description")]
#[command(version)]
struct Args {
    /// Project file (JSON) with units, fields and components
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Output root; overrides `project_dir` from the project file
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Only generate the named component (repeatable)
    #[arg(short = 'c', long = "component", value_name = "NAME")]
    components: Vec<String>,

    /// Generate without writing, printing the manifests to stdout
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Generation failed: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let project = ProjectFile::load(&args.project)?;
    let registry = project
        .build_registry()
        .with_context(|| format!("invalid registry in {}", args.project.display()))?;
    let specs = project.select_components(&args.components)?;

    let project_dir = args
        .output
        .clone()
        .or_else(|| project.project_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let compiler = ManifestCompiler::new(CompileOptions::new(project_dir).dry_run(args.dry_run));

    for component in registry.components() {
        if !project.components.iter().any(|spec| spec.name() == component) {
            tracing::warn!(
                component,
                "units registered for a component with no entry in the project file"
            );
        }
    }

    // Generate every selected component, collecting failures per component
    tracing::info!(
        units = registry.unit_count(),
        fields = registry.fields().len(),
        components = specs.len(),
        "generating manifests"
    );
    let batch = compiler.generate_all(&registry, specs);

    for report in &batch.reports {
        for diagnostic in &report.diagnostics {
            eprintln!("warning: {}", diagnostic);
        }
        for manifest in [&report.schedule, &report.interface] {
            match manifest.outcome {
                Some(WriteOutcome::Written) => println!("wrote     {}", manifest.path.display()),
                Some(WriteOutcome::Unchanged) => println!("unchanged {}", manifest.path.display()),
                None => {
                    println!("=== {} ===", manifest.path.display());
                    println!("{}", manifest.text);
                }
            }
        }
    }

    if !batch.is_success() {
        for (component, e) in &batch.failures {
            eprintln!("error: {}: {}", component, e);
        }
        let total = batch.failures.len() + batch.reports.len();
        bail!("{} of {} components failed", batch.failures.len(), total);
    }
    Ok(())
}
