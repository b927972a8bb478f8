use std::path::PathBuf;

use thiserror::Error;

/// Conditions that prevent a chart from being played at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read chart file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart source is empty")]
    Empty,

    #[error("chart contains no playable notes")]
    NoNotes,
}

/// Recoverable problems found while parsing. The offending line or slice is
/// skipped (or repaired, for hold structure) and parsing continues.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseWarning {
    #[error("line {line}: malformed directive `{text}`")]
    MalformedDirective { line: usize, text: String },

    #[error("line {line}: invalid number `{value}` for {field}")]
    InvalidNumber {
        line: usize,
        field: String,
        value: String,
    },

    #[error("line {line}: unrecognized header `{header}`")]
    UnrecognizedHeader { line: usize, header: String },

    #[error("line {line}: invalid base-36 character in `{text}`")]
    InvalidBase36 { line: usize, text: String },

    #[error("line {line}: tempo id `{id}` is already defined")]
    DuplicateTempoId { line: usize, id: String },

    #[error("line {line}: tempo id `{id}` is not defined")]
    UnknownTempoId { line: usize, id: String },

    #[error("line {line}: lane marker `{marker}` is outside the playfield")]
    LaneOutOfRange { line: usize, marker: char },

    #[error("line {line}: slice `{slice}` has zero width")]
    ZeroWidth { line: usize, slice: String },

    #[error("line {line}: unsupported note type {code} in slice `{slice}`")]
    UnsupportedNoteType {
        line: usize,
        code: u32,
        slice: String,
    },

    #[error("line {line}: hold start on lane {lane} replaces an unclosed hold")]
    HoldOverwritten { line: usize, lane: usize },

    #[error("line {line}: hold end on lane {lane} has no open start")]
    OrphanHoldEnd { line: usize, lane: usize },

    #[error("hold {id} on lane {lane} was never closed; end placed at {time:.3}s")]
    UnclosedHold { id: u32, lane: usize, time: f64 },
}

impl ParseWarning {
    /// True for warnings about hold structure that the parser repaired.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ParseWarning::HoldOverwritten { .. }
                | ParseWarning::OrphanHoldEnd { .. }
                | ParseWarning::UnclosedHold { .. }
        )
    }
}
