use thiserror::Error;

// ---------------------------------------------------------------------------
// NormError – everything the core can reject
// ---------------------------------------------------------------------------

/// Failures surfaced by the parsing layer and the grid constructors.
///
/// Degenerate modes and zero-width interpolation brackets are not errors;
/// they are resolved inside the pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormError {
    /// A token or row could not be interpreted.
    #[error("line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// Nothing to read.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// The spectrum table is not rectangular. `row` is 1-based.
    #[error("ragged table: row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// An axis does not match the matrix dimension it labels.
    #[error("{axis} axis has {found} samples but the spectrum has {expected}")]
    AxisMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    /// An axis is not strictly increasing (or holds a non-finite value).
    #[error("{axis} axis is not strictly increasing at index {index}")]
    NonIncreasingAxis { axis: &'static str, index: usize },

    /// Rejected normalization parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl NormError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NormError>;
