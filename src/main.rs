//! seqanalyzer - Nucleotide Sequence Analyzer
//!
//! Computes composition, GC content, skew, codon counts and derived
//! sequences for a single DNA or RNA sequence.
//!
//! ## Usage
//!
//! ```bash
//! seqanalyzer ACGTACGTACGT                  # sequence as argument
//! seqanalyzer -i gene.fasta -f json         # first FASTA record, JSON output
//! seqanalyzer -i gene.fa --export-dir out/  # also save derived sequences
//! echo acgtacgtac | seqanalyzer -           # sequence from stdin
//! ```
//!
//! ## Exit codes
//!
//! - `0`: success
//! - `1`: I/O or other failure
//! - `2`: invalid input (empty, too short, non-IUPAC characters)

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgGroup, Parser, ValueEnum};
use log::{debug, info, LevelFilter};

use seqanalyzer::analysis::{analyze_with_progress, AnalysisError};
use seqanalyzer::export::{export_all_derived, export_derived, export_report, DerivedSequence};
use seqanalyzer::formats::{load_sequence_file, InputFormat};
use seqanalyzer::normalize::{prepare_input, InputError, DEFAULT_MIN_LENGTH};
use seqanalyzer::report::{Report, ReportFormat};

/// Width used when wrapping long error messages.
const ERROR_WRAP_WIDTH: usize = 100;

/// Output format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    /// Human-readable report
    Text,
    /// One key<TAB>value line per field
    Tsv,
    /// Full result as JSON
    Json,
}

impl From<OutputArg> for ReportFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => ReportFormat::Text,
            OutputArg::Tsv => ReportFormat::Tsv,
            OutputArg::Json => ReportFormat::Json,
        }
    }
}

/// Input file format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormatArg {
    /// FASTA format (first record only)
    Fasta,
    /// Plain sequence text
    Raw,
    /// Auto-detect from extension and content
    Auto,
}

impl From<InputFormatArg> for Option<InputFormat> {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Fasta => Some(InputFormat::Fasta),
            InputFormatArg::Raw => Some(InputFormat::Raw),
            InputFormatArg::Auto => None,
        }
    }
}

/// seqanalyzer - statistics and transformations for a DNA or RNA sequence
///
/// Reports length, type, GC content, AT/GC skew, nucleotide composition,
/// codon counts and N content, and derives the complement, reverse
/// complement and transcription.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["sequence", "input"])))]
struct Args {
    /// Sequence to analyze. Use "-" to read it from stdin.
    sequence: Option<String>,

    /// Sequence file (FASTA or raw text)
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Force the input file format (overrides auto-detection)
    #[arg(long = "input-format", value_enum, default_value = "auto")]
    input_format: InputFormatArg,

    /// Minimum accepted sequence length
    #[arg(short = 'm', long = "min-length", default_value_t = DEFAULT_MIN_LENGTH)]
    min_length: usize,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    format: OutputArg,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// Save the complement as FASTA
    #[arg(long = "save-complement")]
    save_complement: Option<PathBuf>,

    /// Save the reverse complement as FASTA
    #[arg(long = "save-reverse-complement")]
    save_reverse_complement: Option<PathBuf>,

    /// Save the RNA transcription as FASTA
    #[arg(long = "save-transcription")]
    save_transcription: Option<PathBuf>,

    /// Save all derived sequences into this directory under timestamped names
    #[arg(long = "export-dir")]
    export_dir: Option<PathBuf>,

    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Reads the raw sequence text from the argument, stdin or a file.
fn read_raw_sequence(args: &Args) -> Result<String> {
    if let Some(path) = &args.input {
        let loaded = load_sequence_file(path, args.input_format.into())
            .with_context(|| format!("Cannot read sequence from {}", path.display()))?;
        info!(
            "Loaded '{}' from {} ({})",
            loaded.label,
            path.display(),
            loaded.format
        );
        if let Some(description) = &loaded.description {
            debug!("Header description: {}", description);
        }
        return Ok(loaded.raw);
    }

    match args.sequence.as_deref() {
        Some("-") => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Cannot read sequence from stdin")?;
            Ok(raw)
        }
        Some(raw) => Ok(raw.to_string()),
        // clap enforces the "source" group
        None => anyhow::bail!("No sequence given"),
    }
}

/// Runs the analysis and writes every requested output.
fn run(args: &Args) -> Result<()> {
    let raw = read_raw_sequence(args)?;
    let sequence = prepare_input(&raw, args.min_length)?;

    let result = analyze_with_progress(&sequence, |step| {
        debug!("{}% - {}", step.checkpoint(), step);
    })?;
    info!(
        "Analyzed {} sequence of {} bases",
        result.sequence_type, result.length
    );

    let report = Report::new(&result);
    let format: ReportFormat = args.format.into();

    // Write output
    if args.output == "-" {
        let rendered = report.render(format).context("Cannot render report")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(rendered.as_bytes())?;
        handle.flush()?;
    } else {
        export_report(&args.output, &report, format)?;
        eprintln!("Wrote report to {}", args.output);
    }

    let requested = [
        (&args.save_complement, DerivedSequence::Complement),
        (&args.save_reverse_complement, DerivedSequence::ReverseComplement),
        (&args.save_transcription, DerivedSequence::Transcription),
    ];
    for (path, which) in requested {
        if let Some(path) = path {
            export_derived(path, &result, which)?;
            eprintln!("Wrote {} to {}", which.label(), path.display());
        }
    }

    if let Some(dir) = &args.export_dir {
        for path in export_all_derived(dir, &result, Local::now())? {
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Input and validation problems exit with 2, everything else with 1.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let is_user_error = err.chain().any(|cause| {
        cause.downcast_ref::<InputError>().is_some()
            || cause.downcast_ref::<AnalysisError>().is_some()
    });
    if is_user_error {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Prints `err` to stderr. Validation failures list one invalid
/// character per line.
fn print_error(err: &anyhow::Error) {
    let invalid = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<AnalysisError>())
        .map(AnalysisError::invalid_positions)
        .unwrap_or_default();

    if invalid.is_empty() {
        let message = format!("Error: {:#}", err);
        eprintln!("{}", textwrap::fill(&message, ERROR_WRAP_WIDTH));
        return;
    }

    eprintln!("Error: {} invalid character(s) in sequence:", invalid.len());
    for position in invalid {
        eprintln!("  {}", position);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            print_error(&err);
            exit_code_for(&err)
        }
    }
}
