mod load;
mod output;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::{error, info, warn, LevelFilter};
use shifty_ds::{Severity, ValidationConfig, ValidationMode, ValidationReport, Validator};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the base log level (use -v / -q to adjust relative to this level)
    #[arg(
        long,
        value_enum,
        default_value_t = LogLevel::Info,
        global = true,
        help = "error | warn | info | debug | trace"
    )]
    log_level: LogLevel,

    /// Increase logging verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

const LEVELS: [LevelFilter; 5] = [
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Position in [`LEVELS`] after applying `-v` / `-q` counts to `base`.
fn level_index(base: LogLevel, verbose: u8, quiet: u8) -> usize {
    let base_idx = LEVELS
        .iter()
        .position(|lvl| *lvl == base.to_filter())
        .unwrap_or(2); // default to Info
    (base_idx + usize::from(verbose))
        .saturating_sub(usize::from(quiet))
        .min(LEVELS.len() - 1)
}

fn init_logging(base: LogLevel, verbose: u8, quiet: u8) {
    env_logger::Builder::from_default_env()
        .format_target(false)
        .filter_level(LEVELS[level_index(base, verbose, quiet)])
        .init();
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum ModeArg {
    /// SHACL-DS when the shapes file is a dataset, SHACL otherwise
    #[default]
    Auto,
    Shacl,
    #[value(name = "shaclds")]
    ShaclDs,
}

impl ModeArg {
    fn forced(self) -> Option<ValidationMode> {
        match self {
            ModeArg::Auto => None,
            ModeArg::Shacl => Some(ValidationMode::Classic),
            ModeArg::ShaclDs => Some(ValidationMode::Dataset),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum OutputFormat {
    #[default]
    Ttl,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SeverityArg {
    Info,
    Warning,
    Violation,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Violation => Severity::Violation,
        }
    }
}

/// Knobs shared by every command that runs a validation.
#[derive(Args, Debug)]
struct ValidationArgs {
    /// Drop results below this severity from the report
    #[arg(long, value_enum, default_value_t = SeverityArg::Info)]
    min_severity: SeverityArg,

    /// Stop evaluating a shape at its first failing constraint
    #[arg(long)]
    stop_on_first_violation: bool,

    /// Maximum nesting depth of shape references [default: 256]. A deeper chain,
    /// even an acyclic one, is reported as an evaluation error result; raise
    /// this for data with long sh:node chains
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Validate data graphs one after another instead of in parallel
    #[arg(long)]
    no_parallel: bool,
}

impl ValidationArgs {
    fn config(&self) -> ValidationConfig {
        let mut config = ValidationConfig::default()
            .with_min_severity(self.min_severity.into())
            .with_stop_on_first_violation(self.stop_on_first_violation)
            .with_parallel(!self.no_parallel);
        if let Some(depth) = self.max_depth {
            config = config.with_max_recursion_depth(Some(depth));
        }
        config
    }
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Data graph or dataset (.ttl, .nt, .rdf, .owl, .n3, .trig, .nq, .nquads)
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Shapes graph or dataset
    #[arg(long, value_name = "FILE")]
    shapes: PathBuf,

    /// Write the report to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Ttl)]
    output_format: OutputFormat,

    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    mode: ModeArg,

    /// Print recursion trace events as JSON lines on stderr
    #[arg(long)]
    trace: bool,

    #[command(flatten)]
    validation: ValidationArgs,
}

#[derive(Args, Debug)]
struct SuiteArgs {
    /// Directory whose subdirectories each hold data.trig and shapes.trig
    dir: PathBuf,

    #[command(flatten)]
    validation: ValidationArgs,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// First report
    left: PathBuf,
    /// Second report
    right: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a data graph or dataset against shapes
    Validate(ValidateArgs),
    /// Run SHACL-DS validation over a directory of test cases, writing report.ttl in each
    Suite(SuiteArgs),
    /// Compare two reports by result content, ignoring messages and blank node labels
    Compare(CompareArgs),
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn run_validation(
    data: &Path,
    shapes: &Path,
    mode: ValidationMode,
    config: ValidationConfig,
    trace: bool,
) -> CliResult<ValidationReport> {
    let data_store = load::load_store(data)?;
    let shapes_store = load::load_store(shapes)?;
    let mut builder = Validator::builder()
        .with_shapes_store(shapes_store)
        .with_data_store(data_store)
        .with_mode(mode)
        .with_config(config);
    if trace {
        builder = builder.with_trace_sink(Arc::new(output::StderrTraceSink));
    }
    let validator = builder.build()?;
    Ok(validator.validate()?)
}

fn render(report: &ValidationReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Ttl => output::report_to_turtle(report),
        OutputFormat::Json => output::report_to_json(report),
    }
}

fn write_file(path: &Path, contents: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e).into())
}

fn validate(args: ValidateArgs) -> CliResult<ExitCode> {
    let mode = load::resolve_mode(args.mode.forced(), &args.shapes)?;
    info!("Resolved validation mode: {}", mode);
    let report = run_validation(
        &args.data,
        &args.shapes,
        mode,
        args.validation.config(),
        args.trace,
    )?;
    let rendered = render(&report, args.output_format)?;
    match &args.report {
        Some(path) => {
            write_file(path, &rendered)?;
            let status = if report.conforms() {
                "Conforms"
            } else {
                "Non-conformant"
            };
            let location = fs::canonicalize(path).unwrap_or_else(|_| path.clone());
            println!(
                "{} ({} result(s)), report: {}",
                status,
                report.results().len(),
                location.display()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(if report.conforms() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn suite(args: SuiteArgs) -> CliResult<ExitCode> {
    let mut cases: Vec<PathBuf> = fs::read_dir(&args.dir)
        .map_err(|e| format!("Failed to read {}: {}", args.dir.display(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.join("data.trig").is_file() && path.join("shapes.trig").is_file())
        .collect();
    cases.sort();
    if cases.is_empty() {
        warn!("No test cases with data.trig and shapes.trig under {}", args.dir.display());
    }

    let mut failures = 0usize;
    for case in &cases {
        let name = case
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = run_validation(
            &case.join("data.trig"),
            &case.join("shapes.trig"),
            ValidationMode::Dataset,
            args.validation.config(),
            false,
        )
        .and_then(|report| {
            write_file(&case.join("report.ttl"), &output::report_to_turtle(&report)?)?;
            Ok(report)
        });
        match outcome {
            Ok(report) => {
                let status = if report.conforms() { "conforms" } else { "non-conformant" };
                println!("{}: {} ({} result(s))", name, status, report.results().len());
            }
            Err(err) => {
                failures += 1;
                error!("{}: {}", name, err);
                println!("{}: error", name);
            }
        }
    }
    println!("{} case(s), {} error(s)", cases.len(), failures);
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn compare(args: CompareArgs) -> CliResult<ExitCode> {
    let left = load::load_graph(&args.left)?;
    let right = load::load_graph(&args.right)?;
    let diff = output::compare_reports(&left, &right);
    if diff.is_empty() {
        println!("Equivalent");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Different");
    for key in &diff.only_left {
        println!("  only in {}: {}", args.left.display(), key);
    }
    for key in &diff.only_right {
        println!("  only in {}: {}", args.right.display(), key);
    }
    Ok(ExitCode::from(1))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.verbose, cli.quiet);

    let outcome = match cli.command {
        Commands::Validate(args) => validate(args),
        Commands::Suite(args) => suite(args),
        Commands::Compare(args) => compare(args),
    };
    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_counts_saturate() {
        assert_eq!(LEVELS[level_index(LogLevel::Info, 0, 0)], LevelFilter::Info);
        assert_eq!(LEVELS[level_index(LogLevel::Info, 1, 0)], LevelFilter::Debug);
        assert_eq!(LEVELS[level_index(LogLevel::Warn, 0, 1)], LevelFilter::Error);
        assert_eq!(LEVELS[level_index(LogLevel::Info, 255, 0)], LevelFilter::Trace);
        assert_eq!(LEVELS[level_index(LogLevel::Trace, 0, 255)], LevelFilter::Error);
        assert_eq!(LEVELS[level_index(LogLevel::Error, 200, 199)], LevelFilter::Warn);
    }

    #[test]
    fn max_depth_overrides_the_default() {
        let cli = Cli::parse_from(["shifty-ds", "suite", "cases"]);
        let Commands::Suite(args) = cli.command else {
            panic!("expected the suite command");
        };
        assert_eq!(
            args.validation.config().max_recursion_depth,
            ValidationConfig::default().max_recursion_depth
        );

        let cli = Cli::parse_from(["shifty-ds", "suite", "cases", "--max-depth", "4"]);
        let Commands::Suite(args) = cli.command else {
            panic!("expected the suite command");
        };
        assert_eq!(args.validation.config().max_recursion_depth, Some(4));
    }
}
