//! # seqanalyzer - Nucleotide Sequence Analyzer
//!
//! Descriptive statistics and derived sequences for one DNA or RNA sequence,
//! given as raw text or as the first record of a FASTA file.
//!
//! ## Architecture
//!
//! - `iupac`: the static IUPAC nucleotide code table
//! - `model`: sequences, validation results and the analysis record
//! - `normalize`: whitespace stripping, upper-casing, alphabet validation
//! - `analysis`: the engine computing every statistic in one call
//! - `formats`: FASTA and raw-text input, FASTA output
//! - `report`: text, TSV and JSON renderings of a result
//! - `export`: writing derived sequences and reports to files
//!
//! ## Example
//!
//! ```
//! use seqanalyzer::analysis::analyze;
//! use seqanalyzer::normalize::prepare_input;
//!
//! let sequence = prepare_input("aaaa aaaa aa", 10).unwrap();
//! let result = analyze(&sequence).unwrap();
//! assert_eq!(result.gc_skew, 0.0);
//! assert!(result.at_skew > 0.9999999 && result.at_skew < 1.0);
//! ```

pub mod analysis;
pub mod export;
pub mod formats;
pub mod iupac;
pub mod model;
pub mod normalize;
pub mod report;
