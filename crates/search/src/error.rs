use crate::sort::Ordering;
use crate::value::ValueKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RankError>;

/// Ranking misconfiguration. These indicate a wiring bug in the caller, never bad input data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("Ordering {ordering} is not valid for {kind} values")]
    InvalidOrdering { ordering: Ordering, kind: ValueKind },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Mixed value kinds: expected {expected}, found {found} at item {position}")]
    KindMismatch {
        expected: ValueKind,
        found: ValueKind,
        position: usize,
    },

    #[error("Cannot sort by {0} values")]
    Unsortable(ValueKind),
}
