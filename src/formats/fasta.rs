//! FASTA reading and writing.
//!
//! Only the first record of a file is read; any later records are ignored.
//! Written records wrap the sequence at [`FASTA_LINE_WIDTH`] characters.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! ACGTAC
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::warn;
use thiserror::Error;

/// Characters per sequence line in written FASTA.
pub const FASTA_LINE_WIDTH: usize = 80;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to read FASTA input: {0}")]
    IoError(#[from] io::Error),

    #[error("No FASTA record found")]
    NoRecord,

    #[error("FASTA record '{0}' has no sequence")]
    EmptyRecord(String),

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// One FASTA record, with the sequence exactly as found (case preserved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First word of the header, without '>'
    pub id: String,
    /// Rest of the header line, if any
    pub description: Option<String>,
    /// Concatenated sequence lines, whitespace removed
    pub sequence: String,
}

/// Reads the first record of a FASTA file.
///
/// # Examples
///
/// ```no_run
/// use seqanalyzer::formats::fasta::read_first_record_file;
///
/// let record = read_first_record_file("gene.fasta").unwrap();
/// println!("{}: {} bases", record.id, record.sequence.len());
/// ```
pub fn read_first_record_file<P: AsRef<Path>>(path: P) -> FastaResult<FastaRecord> {
    let file = File::open(path)?;
    read_first_record(BufReader::new(file))
}

/// Reads the first record from a reader.
///
/// Handles both single-line and multi-line sequences. Reading stops at the
/// second header.
pub fn read_first_record<R: BufRead>(reader: R) -> FastaResult<FastaRecord> {
    let mut record: Option<FastaRecord> = None;
    let mut line_number = 0;

    for line_result in reader.lines() {
        line_number += 1;
        let line = line_result?;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if record.is_some() {
                warn!(
                    "Only the first FASTA record is analyzed; ignoring records from line {}",
                    line_number
                );
                break;
            }

            let mut parts = header.trim_start().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or_default();
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }
            let description = parts
                .next()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);

            record = Some(FastaRecord {
                id: id.to_string(),
                description,
                sequence: String::new(),
            });
        } else {
            // Sequence line
            let Some(current) = record.as_mut() else {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            };

            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                current.sequence.push_str(line);
            } else {
                current
                    .sequence
                    .extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        }
    }

    match record {
        None => Err(FastaError::NoRecord),
        Some(record) if record.sequence.is_empty() => Err(FastaError::EmptyRecord(record.id)),
        Some(record) => Ok(record),
    }
}

/// Reads the first record from an in-memory string.
pub fn read_first_record_str(content: &str) -> FastaResult<FastaRecord> {
    read_first_record(content.as_bytes())
}

/// Formats one record: `>label`, then the sequence in lines of 80 characters.
/// Every line, the last included, ends with a newline.
pub fn format_fasta(label: &str, sequence: &str) -> String {
    let lines = sequence.len() / FASTA_LINE_WIDTH + 1;
    let mut out = String::with_capacity(label.len() + sequence.len() + lines + 2);
    out.push('>');
    out.push_str(label);
    out.push('\n');

    let chars: Vec<char> = sequence.chars().collect();
    for line in chars.chunks(FASTA_LINE_WIDTH) {
        out.extend(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_single_record() {
        let record = read_first_record_str(">seq1\nACGT\n").unwrap();
        assert_eq!(record.id, "seq1");
        assert_eq!(record.description, None);
        assert_eq!(record.sequence, "ACGT");
    }

    #[test]
    fn test_read_multiline_sequence() {
        let record = read_first_record_str(">seq1\nACGT\nTGCA\nAAAA\n").unwrap();
        assert_eq!(record.sequence, "ACGTTGCAAAAA");
    }

    #[test]
    fn test_read_with_description() {
        let record = read_first_record_str(">seq1 Homo sapiens chr1\nACGT\n").unwrap();
        assert_eq!(record.id, "seq1");
        assert_eq!(record.description.as_deref(), Some("Homo sapiens chr1"));
    }

    #[test]
    fn test_only_first_record_is_used() {
        let record = read_first_record_str(">seq1\nACGT\n\n>seq2\n\nTGCA\n").unwrap();
        assert_eq!(record.id, "seq1");
        assert_eq!(record.sequence, "ACGT");
    }

    #[test]
    fn test_case_preserved_and_inner_whitespace_removed() {
        let record = read_first_record_str(">seq1\nac gt\r\nNN\tNN\n").unwrap();
        assert_eq!(record.sequence, "acgtNNNN");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(read_first_record_str(""), Err(FastaError::NoRecord)));
        assert!(matches!(read_first_record_str("\n  \n"), Err(FastaError::NoRecord)));
    }

    #[test]
    fn test_header_without_sequence() {
        let result = read_first_record_str(">lonely\n");
        assert!(matches!(result, Err(FastaError::EmptyRecord(id)) if id == "lonely"));
    }

    #[test]
    fn test_sequence_without_header() {
        let result = read_first_record_str("ACGT\n>seq1\nTGCA\n");
        assert!(matches!(result, Err(FastaError::SequenceWithoutHeader(1))));
    }

    #[test]
    fn test_empty_identifier() {
        let result = read_first_record_str(">\nACGT\n");
        assert!(matches!(result, Err(FastaError::InvalidFormat(_))));
    }

    #[test]
    fn test_format_wraps_at_80() {
        let sequence = "A".repeat(90);
        let text = format_fasta("complement", &sequence);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ">complement");
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2].len(), 10);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_format_exact_multiple_has_no_blank_line() {
        let text = format_fasta("x", &"C".repeat(160));
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_format_empty_sequence_is_header_only() {
        assert_eq!(format_fasta("empty", ""), ">empty\n");
    }

    #[test]
    fn test_written_record_reads_back() {
        let text = format_fasta("RNA_transcription", &"ACGU".repeat(30));

        let record = read_first_record(text.as_bytes()).unwrap();
        assert_eq!(record.id, "RNA_transcription");
        assert_eq!(record.sequence, "ACGU".repeat(30));
    }
}
