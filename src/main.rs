use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dep_hunter::export::export;
use dep_hunter::{run_analysis_with_progress, AnalyzeConfig};
use log::debug;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dep-hunter")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(
    about = "Find the dependencies that cost the most for how little they are used",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze dependency usage and footprint of a Node.js project
    Analyze(AnalyzeConfig),
    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    match cli.command {
        Some(Commands::Analyze(config)) => analyze(&config, &mut stdout)?,
        Some(Commands::Version) => {
            writeln!(stdout, "dep-hunter v{}", env!("CARGO_PKG_VERSION"))?;
        }
        None => {
            writeln!(stdout, "dep-hunter - Dependency footprint analyzer")?;
            writeln!(stdout, "Run 'dep-hunter analyze <path>' to analyze a project")?;
            writeln!(stdout, "Run 'dep-hunter --help' for more information")?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn analyze<W: Write>(config: &AnalyzeConfig, stdout: &mut W) -> Result<()> {
    let start = Instant::now();
    let format = config.output_format();

    // Progress goes to stderr so machine-readable output on stdout stays clean
    eprintln!(
        "\n{}\n",
        format!("Analyzing dependencies in {}...", config.path.display()).blue()
    );
    let report = run_analysis_with_progress(config, |step| eprintln!("{}", step.dimmed()))?;

    if !report.has_dependencies() {
        eprintln!("{}", "No dependencies found in package.json".yellow());
        return Ok(());
    }

    export(format, &report.export_data(), stdout)?;

    debug!(
        "Analyzed {} roots over {} packages in {}ms",
        report.roots.len(),
        report.graph.package_count(),
        start.elapsed().as_millis()
    );
    Ok(())
}
