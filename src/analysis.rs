//! Sequence analysis engine.
//!
//! [`analyze`] turns one normalized sequence into an [`AnalysisResult`]:
//! composition, GC content, AT/GC skew, codon tally, `N` filtering,
//! complement, reverse complement and transcription. The sequence is
//! validated first and nothing is computed for an invalid sequence.
//!
//! The engine is a pure function of its input. Hosts that must stay
//! responsive can run it with [`spawn_analysis`] and pick the result up from
//! a channel, or follow the nine computation steps through
//! [`analyze_with_progress`].

use std::fmt;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use log::{debug, info};
use thiserror::Error;

use crate::model::{AnalysisResult, InvalidChar, Sequence, SequenceType, Tally};
use crate::normalize::validate;

/// Stabilizer added to skew denominators.
///
/// A sequence made of a single base has a skew that approaches but never
/// reaches ±1, and a sequence without A/T (or G/C) has a skew of 0.
pub const SKEW_EPSILON: f64 = 1e-6;

/// Errors returned by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid characters in sequence: {}", list_positions(.0))]
    Validation(Vec<InvalidChar>),

    #[error("Cannot analyze an empty sequence")]
    EmptySequence,
}

impl AnalysisError {
    /// The offending characters of a validation failure.
    pub fn invalid_positions(&self) -> &[InvalidChar] {
        match self {
            AnalysisError::Validation(positions) => positions,
            AnalysisError::EmptySequence => &[],
        }
    }
}

fn list_positions(positions: &[InvalidChar]) -> String {
    positions
        .iter()
        .map(InvalidChar::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for engine operations.
pub type AnalysisOutcome<T> = Result<T, AnalysisError>;

/// The semantic steps of an analysis, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStep {
    Classify,
    GcContent,
    Composition,
    Codons,
    Skew,
    FilterN,
    Complement,
    ReverseComplement,
    Transcription,
}

impl AnalysisStep {
    /// All steps, in the order the engine runs them.
    pub const ALL: [AnalysisStep; 9] = [
        AnalysisStep::Classify,
        AnalysisStep::GcContent,
        AnalysisStep::Composition,
        AnalysisStep::Codons,
        AnalysisStep::Skew,
        AnalysisStep::FilterN,
        AnalysisStep::Complement,
        AnalysisStep::ReverseComplement,
        AnalysisStep::Transcription,
    ];

    /// Progress percentage reached once this step is done.
    pub fn checkpoint(self) -> u8 {
        match self {
            AnalysisStep::Classify => 10,
            AnalysisStep::GcContent => 20,
            AnalysisStep::Composition => 30,
            AnalysisStep::Codons => 50,
            AnalysisStep::Skew => 70,
            AnalysisStep::FilterN => 80,
            AnalysisStep::Complement => 90,
            AnalysisStep::ReverseComplement => 95,
            AnalysisStep::Transcription => 100,
        }
    }
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisStep::Classify => "sequence type",
            AnalysisStep::GcContent => "GC content",
            AnalysisStep::Composition => "nucleotide composition",
            AnalysisStep::Codons => "codon counts",
            AnalysisStep::Skew => "AT/GC skew",
            AnalysisStep::FilterN => "N filtering",
            AnalysisStep::Complement => "complement",
            AnalysisStep::ReverseComplement => "reverse complement",
            AnalysisStep::Transcription => "transcription",
        };
        f.write_str(label)
    }
}

/// Analyzes a normalized sequence.
///
/// # Examples
///
/// ```
/// use seqanalyzer::analysis::analyze;
/// use seqanalyzer::model::Sequence;
///
/// let result = analyze(&Sequence::from("ACGTACGTAC")).unwrap();
/// assert_eq!(result.length, 10);
/// assert_eq!(result.gc_content, 40.0);
/// assert_eq!(result.codon_counts.get("ACG"), 1);
/// ```
pub fn analyze(sequence: &Sequence) -> AnalysisOutcome<AnalysisResult> {
    analyze_with_progress(sequence, |_| {})
}

/// Analyzes a normalized sequence, calling `on_step` after each step.
///
/// `on_step` is never called when validation fails.
pub fn analyze_with_progress<F>(
    sequence: &Sequence,
    mut on_step: F,
) -> AnalysisOutcome<AnalysisResult>
where
    F: FnMut(AnalysisStep),
{
    let validation = validate(sequence);
    if !validation.is_valid {
        info!(
            "Rejected sequence with {} invalid character(s)",
            validation.invalid_positions.len()
        );
        return Err(AnalysisError::Validation(validation.invalid_positions));
    }

    let chars: Vec<char> = sequence.chars().collect();
    let length = chars.len();
    if length == 0 {
        return Err(AnalysisError::EmptySequence);
    }

    let mut step = |done: AnalysisStep| {
        debug!("Computed {} ({}%)", done, done.checkpoint());
        on_step(done);
    };

    let sequence_type = sequence.sequence_type();
    step(AnalysisStep::Classify);

    let nucleotide_counts: Tally<char> = chars.iter().copied().collect();
    let count = |base: char| nucleotide_counts.get(&base) as f64;
    let gc_content = (count('G') + count('C')) / length as f64 * 100.0;
    step(AnalysisStep::GcContent);

    let nucleotide_percentages = nucleotide_counts
        .iter()
        .map(|(&nt, n)| (nt, n as f64 / length as f64 * 100.0))
        .collect();
    step(AnalysisStep::Composition);

    let codon_counts = count_codons(&chars);
    step(AnalysisStep::Codons);

    let at_skew = skew(count('A'), count('T'));
    let gc_skew = skew(count('G'), count('C'));
    step(AnalysisStep::Skew);

    let n_count = nucleotide_counts.get(&'N');
    let filtered_sequence: String = chars.iter().filter(|&&c| c != 'N').collect();
    step(AnalysisStep::FilterN);

    let complement = complement(sequence.as_str(), sequence_type);
    step(AnalysisStep::Complement);

    let reverse_complement: String = complement.chars().rev().collect();
    step(AnalysisStep::ReverseComplement);

    let transcription = transcribe(sequence.as_str(), sequence_type);
    step(AnalysisStep::Transcription);

    Ok(AnalysisResult {
        sequence: sequence.clone(),
        length,
        sequence_type,
        gc_content,
        at_skew,
        gc_skew,
        nucleotide_counts,
        nucleotide_percentages,
        codon_counts,
        n_count,
        filtered_sequence,
        complement,
        reverse_complement,
        transcription,
    })
}

/// Runs [`analyze`] on a worker thread.
///
/// The receiver yields exactly one message: the outcome of the analysis.
pub fn spawn_analysis(sequence: Sequence) -> Receiver<AnalysisOutcome<AnalysisResult>> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let outcome = analyze(&sequence);
        if tx.send(outcome).is_err() {
            debug!("Analysis finished after its receiver was dropped");
        }
    });
    rx
}

/// Tallies non-overlapping triplets starting at index 0.
///
/// A trailing fragment of one or two characters is ignored.
fn count_codons(chars: &[char]) -> Tally<String> {
    chars
        .chunks_exact(3)
        .map(|codon| codon.iter().collect::<String>())
        .collect()
}

#[inline]
fn skew(a: f64, b: f64) -> f64 {
    (a - b) / (a + b + SKEW_EPSILON)
}

/// Base-pairing partner of `c`.
///
/// DNA pairs A/T and G/C, RNA pairs A/U and G/C. Anything outside the
/// table of the sequence's type is returned unchanged: ambiguity codes
/// (N, R, Y, ...) and a `T` inside RNA.
#[inline]
pub fn complement_base(c: char, sequence_type: SequenceType) -> char {
    match (c, sequence_type) {
        ('A', SequenceType::Dna) => 'T',
        ('A', SequenceType::Rna) => 'U',
        ('T', SequenceType::Dna) | ('U', SequenceType::Rna) => 'A',
        ('G', _) => 'C',
        ('C', _) => 'G',
        (other, _) => other,
    }
}

/// Complements `sequence` base by base, keeping order and length.
pub fn complement(sequence: &str, sequence_type: SequenceType) -> String {
    sequence
        .chars()
        .map(|c| complement_base(c, sequence_type))
        .collect()
}

/// Complement read end to end.
pub fn reverse_complement(sequence: &str, sequence_type: SequenceType) -> String {
    sequence
        .chars()
        .rev()
        .map(|c| complement_base(c, sequence_type))
        .collect()
}

/// Replaces T with U for DNA; RNA is returned as is.
pub fn transcribe(sequence: &str, sequence_type: SequenceType) -> String {
    match sequence_type {
        SequenceType::Dna => sequence.replace('T', "U"),
        SequenceType::Rna => sequence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(raw: &str) -> AnalysisResult {
        analyze(&Sequence::from(raw)).unwrap()
    }

    #[test]
    fn test_basic_dna_statistics() {
        let result = run("ACGTACGTAC");

        assert_eq!(result.length, 10);
        assert_eq!(result.sequence_type, SequenceType::Dna);
        assert_eq!(result.gc_content, 40.0);
        assert_eq!(result.n_count, 0);
        assert_eq!(result.filtered_sequence, "ACGTACGTAC");
    }

    #[test]
    fn test_codons_drop_trailing_fragment() {
        let result = run("ACGTACGTAC");

        let codons: Vec<(&String, usize)> = result.codon_counts.iter().collect();
        assert_eq!(
            codons,
            vec![
                (&"ACG".to_string(), 1),
                (&"TAC".to_string(), 1),
                (&"GTA".to_string(), 1),
            ]
        );
        assert_eq!(result.codon_total(), 3);
    }

    #[test]
    fn test_composition_order_and_percentages() {
        let result = run("TTGACCCAAN");

        let keys: Vec<char> = result.nucleotide_counts.keys().copied().collect();
        assert_eq!(keys, vec!['T', 'G', 'A', 'C', 'N']);
        let pct_keys: Vec<char> = result.nucleotide_percentages.iter().map(|(c, _)| *c).collect();
        assert_eq!(pct_keys, keys);
        assert_eq!(result.nucleotide_counts.get(&'C'), 3);
        assert!((result.percentage_of('C').unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(result.percentage_of('U'), None);
    }

    #[test]
    fn test_skew_with_single_base() {
        let result = run("AAAAAAAAAA");

        let expected = 10.0 / (10.0 + SKEW_EPSILON);
        assert!((result.at_skew - expected).abs() < 1e-12);
        assert!(result.at_skew < 1.0);
        assert!(result.at_skew > 0.9999999);
        assert_eq!(result.gc_skew, 0.0);
    }

    #[test]
    fn test_skew_sign() {
        let result = run("TTTTTAGGGC");
        assert!(result.at_skew < 0.0);
        assert!(result.gc_skew > 0.0);
        assert!((result.gc_skew - 2.0 / (4.0 + SKEW_EPSILON)).abs() < 1e-12);
    }

    #[test]
    fn test_all_n_sequence() {
        let result = run("NNNNNNNNNN");

        assert_eq!(result.filtered_sequence, "");
        assert_eq!(result.n_count, 10);
        assert_eq!(result.gc_content, 0.0);
        assert_eq!(result.n_percentage(), 100.0);
        assert_eq!(result.complement, "NNNNNNNNNN");
    }

    #[test]
    fn test_dna_transformations() {
        let result = run("AATGCCGTAN");

        assert_eq!(result.complement, "TTACGGCATN");
        assert_eq!(result.reverse_complement, "NTACGGCATT");
        assert_eq!(result.transcription, "AAUGCCGUAN");
    }

    #[test]
    fn test_rna_transformations() {
        let result = run("AUGGCCUAAG");

        assert_eq!(result.sequence_type, SequenceType::Rna);
        assert_eq!(result.complement, "UACCGGAUUC");
        assert_eq!(result.reverse_complement, "CUUAGGCCAU");
        assert_eq!(result.transcription, "AUGGCCUAAG");
    }

    #[test]
    fn test_mixed_rna_keeps_thymine_and_round_trips() {
        let result = run("ATUGCATUGC");

        assert_eq!(result.sequence_type, SequenceType::Rna);
        assert_eq!(result.complement, "UTACGUTACG");
        assert_eq!(result.reverse_complement, "GCATUGCATU");
        assert_eq!(
            reverse_complement(&result.reverse_complement, SequenceType::Rna),
            "ATUGCATUGC"
        );
    }

    #[test]
    fn test_ambiguity_codes_pass_through_complement() {
        let result = run("ARYSWKMBDHVN");
        assert_eq!(result.complement, "TRYSWKMBDHVN");
        assert_eq!(result.reverse_complement, "NVHDBMKWSYRT");
    }

    #[test]
    fn test_validation_failure_carries_all_positions() {
        let err = analyze(&Sequence::from("ACGTXACGTZ")).unwrap_err();

        assert_eq!(
            err,
            AnalysisError::Validation(vec![InvalidChar::new('X', 4), InvalidChar::new('Z', 9)])
        );
        assert_eq!(err.invalid_positions().len(), 2);
        assert_eq!(
            err.to_string(),
            "Invalid characters in sequence: 'X' at position 4, 'Z' at position 9"
        );
    }

    #[test]
    fn test_empty_sequence_is_computation_error() {
        assert_eq!(analyze(&Sequence::from("")), Err(AnalysisError::EmptySequence));
    }

    #[test]
    fn test_progress_visits_every_step_in_order() {
        let mut seen = Vec::new();
        analyze_with_progress(&Sequence::from("ACGTACGTAC"), |s| seen.push(s)).unwrap();

        assert_eq!(seen, AnalysisStep::ALL.to_vec());
        let checkpoints: Vec<u8> = seen.iter().map(|s| s.checkpoint()).collect();
        assert!(checkpoints.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(checkpoints.last(), Some(&100));
    }

    #[test]
    fn test_no_progress_on_invalid_input() {
        let mut calls = 0;
        let outcome = analyze_with_progress(&Sequence::from("ACGT!"), |_| calls += 1);
        assert!(outcome.is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_spawn_analysis_delivers_one_result() {
        let rx = spawn_analysis(Sequence::from("ACGTACGTAC"));
        let result = rx.recv().unwrap().unwrap();
        assert_eq!(result.length, 10);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_reverse_complement_helper_matches_engine() {
        let result = run("GATTACAGATTACA");
        assert_eq!(
            reverse_complement("GATTACAGATTACA", SequenceType::Dna),
            result.reverse_complement
        );
    }

    fn dna() -> impl Strategy<Value = String> {
        "[ACGTN]{1,200}"
    }

    fn rna() -> impl Strategy<Value = String> {
        "[ACGTUN]{0,199}U"
    }

    fn iupac() -> impl Strategy<Value = String> {
        "[ATCGUNSKYWRMBDHV]{1,200}"
    }

    proptest! {
        #[test]
        fn prop_transformations_keep_length(s in iupac()) {
            let result = run(&s);
            prop_assert_eq!(result.complement.chars().count(), result.length);
            prop_assert_eq!(result.reverse_complement.chars().count(), result.length);
        }

        #[test]
        fn prop_dna_reverse_complement_round_trips(s in dna()) {
            let rc = reverse_complement(&s, SequenceType::Dna);
            prop_assert_eq!(reverse_complement(&rc, SequenceType::Dna), s);
        }

        #[test]
        fn prop_rna_reverse_complement_round_trips(s in rna()) {
            let rc = reverse_complement(&s, SequenceType::Rna);
            prop_assert_eq!(reverse_complement(&rc, SequenceType::Rna), s);
        }

        #[test]
        fn prop_counts_sum_to_length(s in iupac()) {
            let result = run(&s);
            prop_assert_eq!(result.nucleotide_counts.total(), result.length);
        }

        #[test]
        fn prop_gc_content_is_a_percentage(s in iupac()) {
            let result = run(&s);
            prop_assert!((0.0..=100.0).contains(&result.gc_content));
        }

        #[test]
        fn prop_skews_stay_inside_unit_interval(s in iupac()) {
            let result = run(&s);
            prop_assert!(result.at_skew > -1.0 && result.at_skew < 1.0);
            prop_assert!(result.gc_skew > -1.0 && result.gc_skew < 1.0);
        }

        #[test]
        fn prop_dna_transcription_has_no_thymine(s in dna()) {
            let result = run(&s);
            prop_assert!(!result.transcription.contains('T'));
        }

        #[test]
        fn prop_rna_transcription_is_identity(s in rna()) {
            let result = run(&s);
            prop_assert_eq!(result.transcription, s);
        }

        #[test]
        fn prop_codon_total_is_floor_of_thirds(s in iupac()) {
            let result = run(&s);
            prop_assert_eq!(result.codon_total(), result.length / 3);
        }
    }
}
