use std::fmt;

/// Decoding a persisted log can fail only at the top level; individual
/// malformed entries are skipped, not reported.
#[derive(PartialEq)]
pub enum CalcError {
    InvalidLogRoot,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::InvalidLogRoot => write!(f, "Persisted log is not an index-keyed collection"),
        }
    }
}

impl fmt::Debug for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::InvalidLogRoot => write!(f, "Persisted log is not an index-keyed collection"),
        }
    }
}
