use thiserror::Error;

use crate::prelude::{Constellation, SV};

/// Errors surfaced by streams, codec, models and store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Clean end of the underlying source. Expected terminal condition.
    #[error("end of input")]
    EndOfInput,
    /// Malformed content: oversized line, wrong field count,
    /// unparsable number or badly formatted header.
    #[error("line {line}: {reason}")]
    Format { reason: String, line: usize },
    /// Conversion between two distinct constellations was attempted.
    #[error("type mismatch: expected {expected} got {found}")]
    TypeMismatch {
        expected: Constellation,
        found: Constellation,
    },
    /// No ephemeris covers the requested satellite and instant.
    #[error("no ephemeris found for {0}")]
    NotFound(SV),
    /// Attribute accessed on an incompletely constructed model.
    #[error("{0} not loaded")]
    DataNotLoaded(&'static str),
    /// The underlying source could not be opened, read or written.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl Error {
    /// Wraps a field level [ParsingError] at given line number
    pub(crate) fn format(e: ParsingError, line: usize) -> Self {
        Self::Format {
            reason: e.to_string(),
            line,
        }
    }
    /// True for the clean end of input condition
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }
}

/// Field level parsing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParsingError {
    #[error("line exceeds {0} characters")]
    LineTooLong(usize),
    #[error("failed to parse float from \"{0}\"")]
    FloatField(String),
    #[error("more than 4 fields in \"{0}\"")]
    TooManyFields(String),
    #[error("badly formatted epoch line")]
    BadEpochLine,
    #[error("failed to parse {0} field")]
    EpochField(&'static str),
    #[error("invalid calendar date")]
    InvalidDate,
    #[error("invalid satellite \"{0}\"")]
    SvField(String),
    #[error("{0} is not supported")]
    UnsupportedConstellation(Constellation),
    #[error("undetermined constellation")]
    NoConstellation,
    #[error("line is a comment")]
    CommentLine,
    #[error("missing continuation line")]
    MissingLine,
    #[error("non supported version \"{0}\"")]
    Version(String),
    #[error("not a navigation file")]
    NotNavigation,
    #[error("missing END OF HEADER")]
    MissingEndOfHeader,
}
