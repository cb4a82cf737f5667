use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use facultygrid::PipelineConfig;
use serde::Serialize;

mod logger;

#[derive(Parser)]
#[command(name = "facultygrid")]
#[command(version)]
#[command(about = "Turns faculty timetable workbooks into per-division curriculum schedules.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print the institution / department / semester / division hierarchy.
    Schedule(RunArgs),
    /// Print each faculty member's weekly schedule, merged across sheets.
    Faculty(RunArgs),
    /// Print every division's timetable with lab sessions merged.
    Divisions(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Workbook to read (.xlsx, .xlsm or a JSON workbook).
    file: PathBuf,

    /// JSON file with pipeline settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Institution key; overrides the config file.
    #[arg(long)]
    institution: Option<String>,

    /// Department key; overrides the config file.
    #[arg(long)]
    department: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(short, long)]
    pretty: bool,
}

impl RunArgs {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(institution) = &self.institution {
            config = config.with_institution(institution.as_str());
        }
        if let Some(department) = &self.department {
            config = config.with_department(department.as_str());
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut out = std::io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}

fn run(args: &RunArgs) -> Result<facultygrid::PipelineOutput> {
    let config = args.pipeline_config()?;
    facultygrid::process_file_detailed(&args.file, &config)
        .with_context(|| format!("process {}", args.file.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match &cli.command {
        Command::Schedule(args) => emit(&run(args)?.schedule, args.pretty),
        Command::Faculty(args) => emit(&run(args)?.faculty, args.pretty),
        Command::Divisions(args) => emit(&run(args)?.divisions, args.pretty),
    }
}
