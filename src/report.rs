//! Analysis reports.
//!
//! A [`Report`] pairs an [`AnalysisResult`] with the time it was generated
//! and renders it in one of three forms:
//! - `Text`: the human-readable summary (statistics, composition, legend,
//!   skew, top codons, sequence previews)
//! - `Tsv`: one `key<TAB>value` line per field, every field included
//! - `Json`: the full record as a JSON object, map order preserved

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::iupac::IUPAC_CODES;
use crate::model::AnalysisResult;

/// Timestamp layout used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Number of codons listed in the text report.
pub const TOP_CODONS: usize = 5;
/// Characters shown in each sequence preview.
pub const PREVIEW_LENGTH: usize = 50;
/// Preview block size.
pub const PREVIEW_BLOCK: usize = 10;

/// Output rendering of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Tsv,
    Json,
}

impl ReportFormat {
    /// File extension for exported reports.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Json => "json",
        }
    }
}

/// A rendered view of one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    #[serde(serialize_with = "serialize_timestamp")]
    pub generated_at: DateTime<Local>,
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
}

fn serialize_timestamp<S: Serializer>(
    at: &DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&at.format(TIMESTAMP_FORMAT))
}

impl<'a> Report<'a> {
    /// Report stamped with the current local time.
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self::at(result, Local::now())
    }

    pub fn at(result: &'a AnalysisResult, generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            result,
        }
    }

    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Tsv => Ok(self.to_tsv()),
            ReportFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary.
    pub fn to_text(&self) -> String {
        TextReport(self).to_string()
    }

    /// Every field as `key<TAB>value`, one per line.
    pub fn to_tsv(&self) -> String {
        TsvReport(self).to_string()
    }
}

struct TextReport<'r, 'a>(&'r Report<'a>);

impl fmt::Display for TextReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0.result;

        writeln!(f, "{} Sequence Analysis Report", r.sequence_type)?;
        writeln!(f, "Generated on: {}", self.0.generated_at.format(TIMESTAMP_FORMAT))?;

        section(f, "Basic Statistics")?;
        writeln!(f, "  Sequence Type:     {}", r.sequence_type)?;
        writeln!(f, "  Sequence Length:   {} bases", group_thousands(r.length))?;
        writeln!(f, "  GC Content:        {:.2}%", r.gc_content)?;
        writeln!(
            f,
            "  Missing Bases (N): {} positions ({:.2}%)",
            group_thousands(r.n_count),
            r.n_percentage()
        )?;

        section(f, "Nucleotide Analysis")?;
        for (&nt, count) in r.nucleotide_counts.iter() {
            let pct = r.percentage_of(nt).unwrap_or_default();
            writeln!(f, "  {}: {} ({:.2}%)", nt, group_thousands(count), pct)?;
        }

        section(f, "Nucleotide Codes")?;
        for code in &IUPAC_CODES {
            writeln!(f, "  {}", code.legend())?;
        }

        section(f, "Sequence Bias Analysis")?;
        writeln!(f, "  AT Skew: {:.4}", r.at_skew)?;
        writeln!(f, "  GC Skew: {:.4}", r.gc_skew)?;

        section(f, "Codon Analysis")?;
        writeln!(
            f,
            "  {} codons, {} distinct",
            group_thousands(r.codon_total()),
            group_thousands(r.codon_counts.len())
        )?;
        for (codon, count) in r.most_common_codons(TOP_CODONS) {
            writeln!(f, "  {}: {} times", codon, group_thousands(count))?;
        }

        section(f, "Sequence Preview")?;
        let sequence = r.sequence.as_str();
        let previews = [
            ("First 50 Bases (N's removed)", preview_head(&r.filtered_sequence)),
            ("Last 50 Bases (N's removed)", preview_tail(&r.filtered_sequence)),
            ("Original Sequence (First 50)", preview_head(sequence)),
            ("Original Sequence (Last 50)", preview_tail(sequence)),
            ("Complement (First 50)", preview_head(&r.complement)),
            ("Reverse Complement (First 50)", preview_head(&r.reverse_complement)),
            ("Transcription (First 50)", preview_head(&r.transcription)),
        ];
        for (title, preview) in previews {
            writeln!(f, "  {}:", title)?;
            writeln!(f, "{}", textwrap::indent(&preview, "    "))?;
        }

        writeln!(f)?;
        writeln!(f, "Generated by seqanalyzer")
    }
}

struct TsvReport<'r, 'a>(&'r Report<'a>);

impl fmt::Display for TsvReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0.result;

        writeln!(f, "generated_at\t{}", self.0.generated_at.format(TIMESTAMP_FORMAT))?;
        writeln!(f, "length\t{}", r.length)?;
        writeln!(f, "sequence_type\t{}", r.sequence_type)?;
        writeln!(f, "gc_content\t{}", r.gc_content)?;
        writeln!(f, "at_skew\t{}", r.at_skew)?;
        writeln!(f, "gc_skew\t{}", r.gc_skew)?;
        writeln!(f, "n_count\t{}", r.n_count)?;
        for (nt, count) in r.nucleotide_counts.iter() {
            writeln!(f, "count.{}\t{}", nt, count)?;
        }
        for (nt, pct) in &r.nucleotide_percentages {
            writeln!(f, "percent.{}\t{}", nt, pct)?;
        }
        for (codon, count) in r.codon_counts.iter() {
            writeln!(f, "codon.{}\t{}", codon, count)?;
        }
        writeln!(f, "sequence\t{}", r.sequence)?;
        writeln!(f, "filtered_sequence\t{}", r.filtered_sequence)?;
        writeln!(f, "complement\t{}", r.complement)?;
        writeln!(f, "reverse_complement\t{}", r.reverse_complement)?;
        writeln!(f, "transcription\t{}", r.transcription)
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)
}

/// Formats an integer with comma thousands separators: `1234567` → `1,234,567`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(d);
    }
    out
}

/// Splits `s` into space-separated blocks of [`PREVIEW_BLOCK`] characters.
pub fn blocks(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(PREVIEW_BLOCK)
        .map(|block| block.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

fn preview_head(s: &str) -> String {
    blocks(&s.chars().take(PREVIEW_LENGTH).collect::<String>())
}

fn preview_tail(s: &str) -> String {
    let len = s.chars().count();
    blocks(&s.chars().skip(len.saturating_sub(PREVIEW_LENGTH)).collect::<String>())
}
