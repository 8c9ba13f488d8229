//! Writing derived sequences and reports to disk.
//!
//! Output is rendered completely in memory and written with a single call,
//! so a failure never leaves a half-rendered file behind. Failures are
//! reported as [`ExportError`], never swallowed.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use thiserror::Error;

use crate::formats::fasta::format_fasta;
use crate::model::AnalysisResult;
use crate::report::{Report, ReportFormat};

/// Timestamp layout used in default file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Errors that can occur while exporting.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// The derived sequences that can be saved as FASTA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedSequence {
    Transcription,
    Complement,
    ReverseComplement,
}

impl DerivedSequence {
    pub const ALL: [DerivedSequence; 3] = [
        DerivedSequence::Transcription,
        DerivedSequence::Complement,
        DerivedSequence::ReverseComplement,
    ];

    /// FASTA header label and default file name prefix.
    pub fn label(self) -> &'static str {
        match self {
            DerivedSequence::Transcription => "RNA_transcription",
            DerivedSequence::Complement => "complement",
            DerivedSequence::ReverseComplement => "reverse_complement",
        }
    }

    /// The sequence taken from an analysis result.
    pub fn select(self, result: &AnalysisResult) -> &str {
        match self {
            DerivedSequence::Transcription => &result.transcription,
            DerivedSequence::Complement => &result.complement,
            DerivedSequence::ReverseComplement => &result.reverse_complement,
        }
    }
}

/// `<label>_<YYYY-MM-DD_HH-MM-SS>.fasta`
pub fn default_fasta_name(label: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.fasta", label, at.format(FILE_TIMESTAMP_FORMAT))
}

/// `DNA_Analysis_<YYYY-MM-DD_HH-MM-SS>.<ext>`
pub fn default_report_name(format: ReportFormat, at: DateTime<Local>) -> String {
    format!(
        "DNA_Analysis_{}.{}",
        at.format(FILE_TIMESTAMP_FORMAT),
        format.extension()
    )
}

fn write_all_at_once(path: &Path, contents: &str) -> ExportResult<()> {
    fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one FASTA record to `path`.
pub fn export_fasta<P: AsRef<Path>>(path: P, label: &str, sequence: &str) -> ExportResult<()> {
    let path = path.as_ref();
    write_all_at_once(path, &format_fasta(label, sequence))?;
    info!("Saved {} ({} bases) to {}", label, sequence.chars().count(), path.display());
    Ok(())
}

/// Writes one of the derived sequences of `result` to `path`.
pub fn export_derived<P: AsRef<Path>>(
    path: P,
    result: &AnalysisResult,
    which: DerivedSequence,
) -> ExportResult<()> {
    export_fasta(path, which.label(), which.select(result))
}

/// Writes every derived sequence into `dir` under its default name.
///
/// Returns the paths written, in [`DerivedSequence::ALL`] order.
pub fn export_all_derived<P: AsRef<Path>>(
    dir: P,
    result: &AnalysisResult,
    at: DateTime<Local>,
) -> ExportResult<Vec<PathBuf>> {
    DerivedSequence::ALL
        .iter()
        .map(|&which| {
            let path = dir.as_ref().join(default_fasta_name(which.label(), at));
            export_derived(&path, result, which).map(|()| path)
        })
        .collect()
}

/// Renders `report` and writes it to `path`.
pub fn export_report<P: AsRef<Path>>(
    path: P,
    report: &Report<'_>,
    format: ReportFormat,
) -> ExportResult<()> {
    let path = path.as_ref();
    let rendered = report.render(format)?;
    write_all_at_once(path, &rendered)?;
    info!("Saved analysis report to {}", path.display());
    Ok(())
}
