use thiserror::Error;

/// Misuse of a ref composer by its host.
///
/// Both variants are programmer errors; nothing in this crate retries them.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// The number of slots passed to `apply` changed between cycles.
    #[error("args length mismatch: old length: {old}, new length: {new}")]
    ArityMismatch { old: usize, new: usize },

    /// A dynamic slot resolved to something that is neither a ref callback,
    /// a ref cell, nor empty.
    #[error("{}", invalid_slot_message(.position))]
    InvalidSlot { position: Option<usize> },
}

const EXPECTED: &str = "expected a ref callback, a ref cell or empty";

fn invalid_slot_message(position: &Option<usize>) -> String {
    match position {
        Some(i) => format!("slot {i} is not a valid ref: {EXPECTED}"),
        None => format!("slot is not a valid ref: {EXPECTED}"),
    }
}

impl RefError {
    pub(crate) fn at(self, index: usize) -> Self {
        match self {
            RefError::InvalidSlot { position: None } => RefError::InvalidSlot {
                position: Some(index),
            },
            other => other,
        }
    }
}
