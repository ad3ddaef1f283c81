//! Data governance analysis tool.
//!
//! This binary loads a comma- or pipe-delimited file, runs one analysis over
//! it and writes the resulting table as CSV, TSV or JSON.
//!
//! # Guarantees
//! - The input file is never modified
//! - No network access
//! - Analysis output goes to stdout or the `--output` file; logs go to stderr

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sidecar_core::{
    AnalysisKind, Analyzer, ExportFormat, IngestOptions, LogFormat, QualityRules, Settings,
    Table, export_to_path, init_logging_with_format, load_table, read_table,
    settings::DEFAULT_SETTINGS_FILE, write_result,
};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "sidecar")]
#[command(about = "Data profiling, quality scoring and anomaly detection")]
#[command(version)]
#[command(long_about = "
Sidecar - Data governance analysis for delimited files

Each analysis reads a table whose first line is the header and writes a
result table:
- profile     per-column counts, completeness and statistics
- quality     completeness, uniqueness, validity and quality score
- catalog     friendly names, descriptions and inferred types
- compliance  aggregate scores against an SLA
- anomalies   row-level findings with recommendations

EXAMPLES:
  sidecar profile customers.csv
  sidecar quality --rules rules.json -o quality.json customers.csv
  cat orders.txt | sidecar anomalies --delimiter '|' -
  sidecar settings init
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all logs except errors")]
    pub quiet: bool,

    /// Log line format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogStyle::Text,
        help = "Log format on stderr"
    )]
    pub log_format: LogStyle,

    /// Settings file
    #[arg(
        long,
        global = true,
        env = "SIDECAR_SETTINGS",
        default_value = DEFAULT_SETTINGS_FILE,
        help = "Settings file (defaults are used when it does not exist)"
    )]
    pub settings: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Profile every column
    Profile(InputArgs),
    /// Score completeness, uniqueness and validity
    Quality(QualityArgs),
    /// Generate a data catalog
    Catalog(InputArgs),
    /// Report aggregate scores against an SLA
    Compliance(ComplianceArgs),
    /// Detect row-level anomalies
    Anomalies(InputArgs),
    /// Manage the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

/// Input and output options shared by every analysis.
#[derive(Args)]
pub struct InputArgs {
    /// Input file, or `-` for stdin
    #[arg(help = "Delimited input file, or - to read stdin")]
    pub input: PathBuf,

    /// Output format
    #[arg(
        short,
        long,
        value_enum,
        help = "Output format (inferred from --output, otherwise csv)"
    )]
    pub format: Option<OutputFormat>,

    /// Output file path
    #[arg(short, long, help = "Output file path (stdout when absent)")]
    pub output: Option<PathBuf>,

    /// Field delimiter
    #[arg(long, help = "Field delimiter (sniffed from the header when absent)")]
    pub delimiter: Option<char>,
}

#[derive(Args)]
pub struct QualityArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Rule file
    #[arg(
        long,
        help = "JSON file of field validity patterns, merged over the settings rules"
    )]
    pub rules: Option<PathBuf>,
}

#[derive(Args)]
pub struct ComplianceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Application name
    #[arg(long)]
    pub application: Option<String>,

    /// Storage layer name
    #[arg(long)]
    pub layer: Option<String>,

    /// Table name
    #[arg(long)]
    pub table: Option<String>,

    /// Minimum acceptable score
    #[arg(long, value_parser = parse_sla, help = "SLA percentage (0-100)")]
    pub sla: Option<f64>,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Write the default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings as JSON
    Show,
}

/// Available output formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON object with headers and rows
    Json,
}

/// Available log formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogStyle {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogStyle> for LogFormat {
    fn from(style: LogStyle) -> Self {
        match style {
            LogStyle::Text => LogFormat::Text,
            LogStyle::Json => LogFormat::Json,
        }
    }
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Tsv => ExportFormat::Tsv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

fn parse_sla(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("SLA must be between 0 and 100, got {}", value))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging_with_format(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format.into(),
    )?;

    let settings_path = cli.global.settings.as_path();
    match &cli.command {
        Some(Command::Profile(args)) => {
            let settings = Settings::load(settings_path)?;
            run_analysis(AnalysisKind::Profile, args, &settings.analyzer()?, &settings)
        }
        Some(Command::Quality(args)) => {
            let settings = Settings::load(settings_path)?;
            let mut analyzer = settings.analyzer()?;
            if let Some(path) = &args.rules {
                merge_rules(&mut analyzer, path)?;
            }
            run_analysis(AnalysisKind::Quality, &args.input, &analyzer, &settings)
        }
        Some(Command::Catalog(args)) => {
            let settings = Settings::load(settings_path)?;
            run_analysis(AnalysisKind::Catalog, args, &settings.analyzer()?, &settings)
        }
        Some(Command::Compliance(args)) => {
            let settings = Settings::load(settings_path)?;
            let analyzer = compliance_analyzer(args, &settings)?;
            run_analysis(AnalysisKind::Compliance, &args.input, &analyzer, &settings)
        }
        Some(Command::Anomalies(args)) => {
            let settings = Settings::load(settings_path)?;
            run_analysis(AnalysisKind::Anomalies, args, &settings.analyzer()?, &settings)
        }
        Some(Command::Settings { action }) => match action {
            SettingsCommand::Init { force } => init_settings(settings_path, *force),
            SettingsCommand::Show => show_settings(&Settings::load(settings_path)?),
        },
        None => {
            println!("sidecar v{}", env!("CARGO_PKG_VERSION"));
            println!("Data governance analysis for delimited files");
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

/// Loads the input table, runs one analysis and writes the result.
fn run_analysis(
    kind: AnalysisKind,
    args: &InputArgs,
    analyzer: &Analyzer,
    settings: &Settings,
) -> Result<()> {
    let mut options = settings.ingest.clone();
    if let Some(delimiter) = args.delimiter {
        options = options.with_delimiter(delimiter);
    }

    let table = load_input(&args.input, &options)?;
    let result = analyzer
        .run(kind, &table)
        .with_context(|| format!("{} analysis failed", kind.name()))?;

    let format = resolve_format(args.format, args.output.as_deref());
    match &args.output {
        Some(path) => export_to_path(&result, path, format)?,
        None => write_result(&result, io::stdout().lock(), format)?,
    }

    info!("{} analysis produced {} rows", kind.name(), result.len());
    Ok(())
}

fn load_input(input: &Path, options: &IngestOptions) -> Result<Table> {
    if input == Path::new("-") {
        debug!("Reading table from stdin");
        return read_table(io::stdin().lock(), options).context("Failed to load table from stdin");
    }
    load_table(input, options).with_context(|| format!("Failed to load {}", input.display()))
}

/// An explicit `--format` wins; otherwise the output extension decides.
fn resolve_format(format: Option<OutputFormat>, output: Option<&Path>) -> ExportFormat {
    match (format, output) {
        (Some(format), _) => format.into(),
        (None, Some(path)) => ExportFormat::from_path(path),
        (None, None) => ExportFormat::Csv,
    }
}

fn merge_rules(analyzer: &mut Analyzer, path: &Path) -> Result<()> {
    let rules = QualityRules::load(path)?;
    for (field, pattern) in rules.patterns() {
        analyzer.rules_mut().assign(field, &pattern)?;
    }
    debug!(
        "Merged {} rules from {}, {} in effect",
        rules.len(),
        path.display(),
        analyzer.rules().len()
    );
    Ok(())
}

fn compliance_analyzer(args: &ComplianceArgs, settings: &Settings) -> Result<Analyzer> {
    let mut target = settings.compliance.clone();
    if let Some(application) = &args.application {
        target.application.clone_from(application);
    }
    if let Some(layer) = &args.layer {
        target.layer.clone_from(layer);
    }
    if let Some(table) = &args.table {
        target.table.clone_from(table);
    }
    if let Some(sla) = args.sla {
        target.sla_percent = sla;
    }
    Ok(settings.analyzer()?.with_target(target))
}

fn init_settings(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }
    Settings::default().save(path)?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

fn show_settings(settings: &Settings) -> Result<()> {
    let json =
        serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    println!("{}", json);
    Ok(())
}
