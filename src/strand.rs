/// Strand inference and subject coordinate canonicalization
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// `+` when the raw subject start precedes the raw end, `-` otherwise
    pub fn from_subject_coords(subject_start: u64, subject_end: u64) -> Self {
        if subject_start < subject_end {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(format!("Invalid strand '{s}', expected '+' or '-'")),
        }
    }
}

/// Put reverse-strand coordinates in low-to-high order
///
/// The strand must have been computed from the raw coordinates beforehand;
/// it is not re-derived here.
pub fn canonical_coords(strand: Strand, subject_start: u64, subject_end: u64) -> (u64, u64) {
    match strand {
        Strand::Forward => (subject_start, subject_end),
        Strand::Reverse => (subject_end, subject_start),
    }
}
