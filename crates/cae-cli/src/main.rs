//! cae - import geometry decks and displacement reports from the terminal.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cae_io::{
    GeometryImport, GeometryImporter, ImportError, PartGeometry, ProgressSink, ReportFormat,
    ReportImporter, ReportModel, VtkWriter, save_json, write_part_assets,
};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cae")]
#[command(about = "Geometry deck and displacement report importer", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a geometry deck and list its parts
    Geometry {
        /// Input deck (.inp)
        input: PathBuf,
        /// Write one `<part>.json` asset per part into this directory
        #[arg(long)]
        json_dir: Option<PathBuf>,
        /// Write one part as a legacy VTK file
        #[arg(long)]
        vtk: Option<PathBuf>,
        /// Part written with `--vtk` (default: first part by name)
        #[arg(long)]
        part: Option<String>,
    },
    /// Import a displacement report against one part of a deck
    Report {
        /// Input deck (.inp)
        input: PathBuf,
        /// Part the report refers to
        part: String,
        /// Report file
        report: PathBuf,
        /// Report format description (JSON); the standard format otherwise
        #[arg(long)]
        format: Option<PathBuf>,
        /// Write the assembled report model as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the part with one snapshot as a legacy VTK file
        #[arg(long)]
        vtk: Option<PathBuf>,
        /// Snapshot written with `--vtk`
        #[arg(long, default_value_t = 0, requires = "vtk")]
        step: usize,
    },
}

/// Progress sink drawing on an `indicatif` bar (stderr).
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{msg:32} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn report(&mut self, current: u64, total: u64, unit: &str, caption: &str) {
        self.bar.set_length(total);
        self.bar.set_position(current);
        self.bar.set_message(format!("{caption} ({unit})"));
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn import_geometry(input: &Path) -> Result<GeometryImport, String> {
    let mut progress = BarProgress::new();
    let result = GeometryImporter::import_file(input, Some(&mut progress));
    progress.finish();
    result.map_err(|err| format!("{}: {err}", input.display()))
}

fn print_part(part: &PartGeometry) {
    println!(
        "{}: nodes={} elements={} edges={} faces={}",
        part.name(),
        part.node_count(),
        part.elements().iter().filter(|t| !t.is_degenerate()).count(),
        part.edges().len(),
        part.faces().len()
    );
}

fn print_report(model: &ReportModel) {
    println!("part: {}", model.part_name());
    println!("time_steps: {}", model.times().len());
    println!("nodes: {}", model.node_count());
    println!("max_displacement: {}", model.max_magnitude());
    println!("diagnostics: {}", model.diagnostics().len());
    for diagnostic in model.diagnostics() {
        println!("  {diagnostic}");
    }
}

fn run_geometry(
    input: &Path,
    json_dir: Option<&Path>,
    vtk: Option<&Path>,
    part: Option<&str>,
) -> Result<(), String> {
    let import = import_geometry(input)?;
    for part in import.parts() {
        print_part(part);
    }

    if let Some(dir) = json_dir {
        let written = write_part_assets(dir, &import)
            .map_err(|err| format!("{}: {err}", dir.display()))?;
        info!(count = written.len(), dir = %dir.display(), "part assets written");
    }

    if let Some(path) = vtk {
        let selected = match part {
            Some(name) => import.part(name).ok_or_else(|| format!("no part named `{name}`"))?,
            None => import.parts().next().ok_or_else(|| "deck has no parts".to_string())?,
        };
        VtkWriter::new(selected)
            .write_vtk(path)
            .map_err(|err| format!("{}: {err}", path.display()))?;
        debug!(part = selected.name(), path = %path.display(), "vtk written");
    }
    Ok(())
}

struct ReportArgs<'a> {
    input: &'a Path,
    part: &'a str,
    report: &'a Path,
    format: Option<&'a Path>,
    json: Option<&'a Path>,
    vtk: Option<&'a Path>,
    step: usize,
}

fn run_report(args: ReportArgs<'_>) -> Result<(), String> {
    let format = match args.format {
        Some(path) => ReportFormat::from_json_file(path)
            .map_err(|err| format!("{}: {err}", path.display()))?,
        None => ReportFormat::standard(),
    };

    let import = import_geometry(args.input)?;
    let part = import
        .part(args.part)
        .ok_or_else(|| ImportError::UnknownPart(args.part.to_string()).to_string())?;

    let mut progress = BarProgress::new();
    let result = ReportImporter::new(format).import_file(args.report, part, Some(&mut progress));
    progress.finish();
    let model = result.map_err(|err| format!("{}: {err}", args.report.display()))?;
    print_report(&model);

    if let Some(path) = args.json {
        save_json(path, &model).map_err(|err| format!("{}: {err}", path.display()))?;
    }

    if let Some(path) = args.vtk {
        let snapshot = model
            .snapshots()
            .get(args.step)
            .ok_or_else(|| {
                format!("step {} out of range 0..{}", args.step, model.snapshots().len())
            })?;
        VtkWriter::new(part)
            .with_snapshot(snapshot)
            .write_vtk(path)
            .map_err(|err| format!("{}: {err}", path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Geometry {
            input,
            json_dir,
            vtk,
            part,
        } => run_geometry(input, json_dir.as_deref(), vtk.as_deref(), part.as_deref()),
        Commands::Report {
            input,
            part,
            report,
            format,
            json,
            vtk,
            step,
        } => run_report(ReportArgs {
            input,
            part,
            report,
            format: format.as_deref(),
            json: json.as_deref(),
            vtk: vtk.as_deref(),
            step: *step,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_subcommand_parses_options() {
        let cli = Cli::try_parse_from([
            "cae", "-vv", "report", "coil.inp", "Coil", "coil.rpt", "--vtk", "out.vtk", "--step",
            "3",
        ])
        .expect("arguments parse");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Report { part, step, vtk, .. } => {
                assert_eq!(part, "Coil");
                assert_eq!(step, 3);
                assert_eq!(vtk, Some(PathBuf::from("out.vtk")));
            }
            Commands::Geometry { .. } => panic!("expected report subcommand"),
        }
    }

    #[test]
    fn step_needs_vtk() {
        let args = ["cae", "report", "a.inp", "P", "a.rpt", "--step", "1"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
