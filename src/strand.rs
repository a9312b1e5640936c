use std::fmt;

use crate::reader::{ReaderError, ReaderResult};

/// Represents the strand of a gene on a reference sequence.
///
/// Variants are declared in render order, so sorted strand sets list `+`
/// before `-` and `.` last.
///
/// # Example
///
/// ```
/// use geneinfo::strand::Strand;
///
/// let strand = Strand::Forward;
/// assert!(strand < Strand::Reverse);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    /// The forward (`+`) orientation.
    Forward,
    /// The reverse (`-`) orientation.
    Reverse,
    /// An undetermined orientation, written `.` or `?` in dumps.
    Unknown,
}

impl Strand {
    /// Parses a strand symbol taken from a reference dump.
    ///
    /// # Errors
    ///
    /// Fails when the symbol is none of `+`, `-`, `.`, or `?`.
    pub(crate) fn parse(raw: &str, line: usize) -> ReaderResult<Self> {
        match raw {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." | "?" => Ok(Strand::Unknown),
            other => Err(ReaderError::invalid_field(
                line,
                "strand",
                format!("ERROR: expected '+', '-', '.', or '?', got '{other}' in {line}:strand"),
            )),
        }
    }

    /// Single-character form used in annotated cells.
    #[inline]
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => f.write_str("+"),
            Strand::Reverse => f.write_str("-"),
            Strand::Unknown => f.write_str("."),
        }
    }
}
