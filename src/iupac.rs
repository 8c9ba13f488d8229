//! IUPAC nucleotide codes.
//!
//! The table is static data: the sixteen single-letter codes accepted in a
//! sequence, each with the bases it stands for. It is also the source of the
//! legend printed in reports.

/// One entry of the IUPAC nucleotide alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IupacCode {
    /// Uppercase code letter
    pub code: char,
    /// Biological meaning, e.g. "Purine"
    pub meaning: &'static str,
    /// Bases covered by the code, e.g. "A/G"
    pub bases: &'static str,
}

impl IupacCode {
    const fn new(code: char, meaning: &'static str, bases: &'static str) -> Self {
        Self {
            code,
            meaning,
            bases,
        }
    }

    /// Legend line as shown in reports, e.g. `R = Purine (A/G)`.
    pub fn legend(&self) -> String {
        if self.bases.is_empty() {
            format!("{} = {}", self.code, self.meaning)
        } else {
            format!("{} = {} ({})", self.code, self.meaning, self.bases)
        }
    }
}

/// The full table, in legend order.
pub static IUPAC_CODES: [IupacCode; 16] = [
    IupacCode::new('A', "Adenine", ""),
    IupacCode::new('C', "Cytosine", ""),
    IupacCode::new('G', "Guanine", ""),
    IupacCode::new('T', "Thymine", ""),
    IupacCode::new('U', "Uracil (RNA only)", ""),
    IupacCode::new('N', "Any nucleotide", "A/C/G/T"),
    IupacCode::new('R', "Purine", "A/G"),
    IupacCode::new('Y', "Pyrimidine", "C/T"),
    IupacCode::new('S', "Strong bonds", "G/C"),
    IupacCode::new('W', "Weak bonds", "A/T"),
    IupacCode::new('K', "Keto", "G/T"),
    IupacCode::new('M', "Amino", "A/C"),
    IupacCode::new('B', "Not A", "C/G/T"),
    IupacCode::new('D', "Not C", "A/G/T"),
    IupacCode::new('H', "Not G", "A/C/T"),
    IupacCode::new('V', "Not T", "A/C/G"),
];

/// Looks up a code letter. Lowercase letters are not codes; normalize first.
pub fn lookup(c: char) -> Option<&'static IupacCode> {
    IUPAC_CODES.iter().find(|entry| entry.code == c)
}

/// Returns true if `c` is an uppercase IUPAC nucleotide code.
#[inline]
pub fn is_iupac(c: char) -> bool {
    lookup(c).is_some()
}
