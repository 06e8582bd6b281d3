//! Precondition failures surfaced to the user as an alert

use thiserror::Error;

/// Reasons an action refuses to run. A failed action leaves the demo untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Select at least one ion before firing a laser pulse")]
    EmptySelection,

    #[error("Select exactly two ions to entangle (currently {got} selected)")]
    WrongSelectionCount { got: usize },

    #[error("Unknown pulse type: {0}")]
    UnknownPulse(String),
}
