//! Data model for sequence analysis.
//!
//! This module contains the value types shared by the normalizer, the
//! analysis engine and the renderers:
//! - `Sequence`: a normalized nucleotide sequence
//! - `ValidationResult`: the outcome of an IUPAC alphabet scan
//! - `Tally`: insertion-ordered occurrence counts
//! - `AnalysisResult`: the immutable record produced by the engine
//!
//! None of these types hold shared state; every analysis builds fresh values.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A normalized nucleotide sequence: uppercase, without whitespace.
///
/// Build one with [`crate::normalize::normalize`] (or `Sequence::from`),
/// which strips whitespace and upper-cases. The characters are not
/// guaranteed to be IUPAC codes; that is what validation checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sequence {
    data: String,
}

impl Sequence {
    /// Wraps data that is already normalized.
    pub(crate) fn from_normalized(data: String) -> Self {
        Self { data }
    }

    /// Returns the length of the sequence in characters.
    pub fn len(&self) -> usize {
        self.data.chars().count()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sequence as a string slice.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Iterates over the characters of the sequence.
    pub fn chars(&self) -> std::str::Chars<'_> {
        self.data.chars()
    }

    /// Classifies the sequence: RNA if it holds at least one `U`, DNA otherwise.
    ///
    /// Mixed `U`/`T` content is not an error.
    pub fn sequence_type(&self) -> SequenceType {
        if self.data.contains('U') {
            SequenceType::Rna
        } else {
            SequenceType::Dna
        }
    }
}

impl From<&str> for Sequence {
    fn from(raw: &str) -> Self {
        crate::normalize::normalize(raw)
    }
}

impl From<String> for Sequence {
    fn from(raw: String) -> Self {
        crate::normalize::normalize(&raw)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

/// Nucleic acid type of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SequenceType {
    #[serde(rename = "DNA")]
    Dna,
    #[serde(rename = "RNA")]
    Rna,
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceType::Dna => write!(f, "DNA"),
            SequenceType::Rna => write!(f, "RNA"),
        }
    }
}

/// A character outside the IUPAC alphabet, with its zero-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvalidChar {
    pub character: char,
    pub position: usize,
}

impl InvalidChar {
    pub fn new(character: char, position: usize) -> Self {
        Self {
            character,
            position,
        }
    }
}

impl fmt::Display for InvalidChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at position {}", self.character, self.position)
    }
}

/// Outcome of scanning a sequence against the IUPAC alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True iff `invalid_positions` is empty
    pub is_valid: bool,
    /// Every offending character, in left-to-right order
    pub invalid_positions: Vec<InvalidChar>,
}

impl ValidationResult {
    pub fn new(invalid_positions: Vec<InvalidChar>) -> Self {
        Self {
            is_valid: invalid_positions.is_empty(),
            invalid_positions,
        }
    }
}

/// Occurrence counts that remember the order in which keys were first seen.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> Tally<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Counts one occurrence of `key`.
    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// Returns the count for `key`, zero if never seen.
    pub fn get<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterates `(key, count)` in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    /// The `k` highest counts, descending; ties keep first-occurrence order.
    pub fn most_common(&self, k: usize) -> Vec<(&K, usize)> {
        let mut ranked: Vec<(&K, usize)> = self.iter().collect();
        // stable sort keeps first-occurrence order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

impl<K: Clone + Eq + Hash> Default for Tally<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

impl<K: PartialEq> PartialEq for Tally<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Serialize> Serialize for Tally<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Serializes `(nucleotide, percentage)` pairs as a map, keeping their order.
fn ordered_pairs<S: Serializer>(pairs: &[(char, f64)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Everything computed for one sequence.
///
/// Produced whole by [`crate::analysis::analyze`]; a failed analysis never
/// yields a partially filled record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// The analysed sequence
    pub sequence: Sequence,
    pub length: usize,
    pub sequence_type: SequenceType,
    /// Percentage of G and C among all characters
    pub gc_content: f64,
    /// (A - T) / (A + T + ε)
    pub at_skew: f64,
    /// (G - C) / (G + C + ε)
    pub gc_skew: f64,
    pub nucleotide_counts: Tally<char>,
    /// Same keys and order as `nucleotide_counts`
    #[serde(serialize_with = "ordered_pairs")]
    pub nucleotide_percentages: Vec<(char, f64)>,
    /// Non-overlapping triplets from index 0
    pub codon_counts: Tally<String>,
    pub n_count: usize,
    /// The sequence with every `N` removed
    pub filtered_sequence: String,
    pub complement: String,
    pub reverse_complement: String,
    pub transcription: String,
}

impl AnalysisResult {
    /// Share of `N` characters, as a percentage of the length.
    pub fn n_percentage(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        self.n_count as f64 / self.length as f64 * 100.0
    }

    /// Percentage for one character, if it occurs.
    pub fn percentage_of(&self, nucleotide: char) -> Option<f64> {
        self.nucleotide_percentages
            .iter()
            .find(|(c, _)| *c == nucleotide)
            .map(|(_, pct)| *pct)
    }

    /// Number of whole codons counted.
    pub fn codon_total(&self) -> usize {
        self.codon_counts.total()
    }

    /// The `k` most frequent codons.
    pub fn most_common_codons(&self, k: usize) -> Vec<(&str, usize)> {
        self.codon_counts
            .most_common(k)
            .into_iter()
            .map(|(codon, count)| (codon.as_str(), count))
            .collect()
    }
}
