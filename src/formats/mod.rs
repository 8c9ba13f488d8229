//! Sequence input files.
//!
//! A sequence file is either:
//! - FASTA (.fasta, .fa, .fna, .fas, ...): the first record is used
//! - raw text (.txt, .seq, .raw): the whole file is the sequence
//!
//! Format detection priority:
//! 1. Explicit format specification (--input-format option)
//! 2. File extension
//! 3. Content-based detection

pub mod fasta;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use log::debug;
use thiserror::Error;

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Fasta,
    Raw,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Fasta => write!(f, "FASTA"),
            InputFormat::Raw => write!(f, "raw text"),
        }
    }
}

/// Errors that can occur while loading an input file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Raw sequence text loaded from a file, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSequence {
    /// FASTA record id, or the file stem for raw text
    pub label: String,
    /// Rest of the FASTA header line
    pub description: Option<String>,
    /// Sequence text as found in the file
    pub raw: String,
    /// Format the file was read as
    pub format: InputFormat,
}

/// Detects format from file extension.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<InputFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "fa" | "fas" | "fasta" | "fna" | "ffn" | "frn" => Some(InputFormat::Fasta),
        "txt" | "seq" | "raw" => Some(InputFormat::Raw),
        _ => None,
    }
}

/// Detects the format by examining the first non-empty line.
///
/// A leading `>` means FASTA; anything else is read as raw text.
pub fn detect_format_from_content(content: &str) -> Option<InputFormat> {
    let first = content.lines().map(str::trim).find(|line| !line.is_empty())?;
    if first.starts_with('>') {
        Some(InputFormat::Fasta)
    } else {
        Some(InputFormat::Raw)
    }
}

/// Parses already loaded content with a specific format.
fn parse_content(content: &str, format: InputFormat, path: &Path) -> ParseResult<LoadedSequence> {
    match format {
        InputFormat::Fasta => {
            let record = fasta::read_first_record_str(content)?;
            Ok(LoadedSequence {
                label: record.id,
                description: record.description,
                raw: record.sequence,
                format,
            })
        }
        InputFormat::Raw => Ok(LoadedSequence {
            label: path
                .file_stem()
                .and_then(OsStr::to_str)
                .unwrap_or("sequence")
                .to_string(),
            description: None,
            raw: content.to_string(),
            format,
        }),
    }
}

/// Loads a sequence file with optional format specification.
///
/// Detection priority:
/// 1. Explicit format (if provided)
/// 2. File extension
/// 3. Content-based detection
///
/// A recognized extension is binding: a `.fasta` file without a parsable
/// record is an error, never re-read as raw text.
pub fn load_sequence_file<P: AsRef<Path>>(
    path: P,
    forced_format: Option<InputFormat>,
) -> ParseResult<LoadedSequence> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    // 1. Use explicit format if provided
    if let Some(format) = forced_format {
        return parse_content(&content, format, path);
    }

    // 2. Detect from extension
    if let Some(format) = detect_format_from_extension(path) {
        debug!("Reading {} as {} (extension)", path.display(), format);
        return parse_content(&content, format, path);
    }

    // 3. Content-based detection
    let format = detect_format_from_content(&content).ok_or(ParseError::EmptyFile)?;
    debug!("Reading {} as {}", path.display(), format);
    parse_content(&content, format, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_fasta() {
        let content = ">seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(InputFormat::Fasta));
    }

    #[test]
    fn test_detect_raw() {
        assert_eq!(detect_format_from_content("acgt acgt\n"), Some(InputFormat::Raw));
    }

    #[test]
    fn test_detect_with_leading_empty_lines() {
        let content = "\n\n  \n>seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(InputFormat::Fasta));
    }

    #[test]
    fn test_detect_blank() {
        assert_eq!(detect_format_from_content(" \n\n"), None);
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("test.fa"), Some(InputFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.FASTA"), Some(InputFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.fna"), Some(InputFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.txt"), Some(InputFormat::Raw));
        assert_eq!(detect_format_from_extension("test.seq"), Some(InputFormat::Raw));
        assert_eq!(detect_format_from_extension("test.nex"), None);
        assert_eq!(detect_format_from_extension("test"), None);
    }

    #[test]
    fn test_load_fasta_file() {
        let mut file = NamedTempFile::with_suffix(".fasta").unwrap();
        write!(file, ">chr1 test\nacgtacgt\nNNAC\n>chr2\nTTTT\n").unwrap();

        let loaded = load_sequence_file(file.path(), None).unwrap();
        assert_eq!(loaded.format, InputFormat::Fasta);
        assert_eq!(loaded.label, "chr1");
        assert_eq!(loaded.description.as_deref(), Some("test"));
        assert_eq!(loaded.raw, "acgtacgtNNAC");
    }

    #[test]
    fn test_load_raw_file_by_content() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ACGT ACGT\nACGT\n").unwrap();

        let loaded = load_sequence_file(file.path(), None).unwrap();
        assert_eq!(loaded.format, InputFormat::Raw);
        assert_eq!(loaded.description, None);
        assert_eq!(loaded.raw, "ACGT ACGT\nACGT\n");
    }

    #[test]
    fn test_fasta_extension_without_header_is_an_error() {
        let mut file = NamedTempFile::with_suffix(".fasta").unwrap();
        write!(file, "ACGTACGTACGT\n").unwrap();

        let result = load_sequence_file(file.path(), None);
        assert!(matches!(
            result,
            Err(ParseError::FastaError(fasta::FastaError::SequenceWithoutHeader(1)))
        ));
    }

    #[test]
    fn test_fasta_extension_with_header_only_is_an_error() {
        let mut file = NamedTempFile::with_suffix(".fa").unwrap();
        write!(file, ">empty\n\n").unwrap();

        let result = load_sequence_file(file.path(), None);
        assert!(matches!(
            result,
            Err(ParseError::FastaError(fasta::FastaError::EmptyRecord(ref id))) if id == "empty"
        ));
    }

    #[test]
    fn test_forced_fasta_reports_fasta_error() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        write!(file, "ACGTACGTAC\n").unwrap();

        let result = load_sequence_file(file.path(), Some(InputFormat::Fasta));
        assert!(matches!(
            result,
            Err(ParseError::FastaError(fasta::FastaError::SequenceWithoutHeader(1)))
        ));
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            load_sequence_file(file.path(), None),
            Err(ParseError::EmptyFile)
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_sequence_file("/nonexistent/dir/input.fasta", None);
        assert!(matches!(result, Err(ParseError::IoError(_))));
    }
}
