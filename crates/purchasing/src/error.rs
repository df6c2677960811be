//! Flow-internal error model.

use thiserror::Error;

use procurebot_core::FailureReason;
use procurebot_navigation::BridgeError;

pub type FlowResult<T> = Result<T, FlowError>;

/// Why a stage stopped the flow.
///
/// Collapsed into a [`FailureReason`] at the flow boundary; callers only ever
/// see the outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A classified business failure.
    #[error(transparent)]
    Failed(#[from] FailureReason),

    /// The bridge failed or a mandatory element was missing.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl FlowError {
    pub fn into_reason(self) -> FailureReason {
        match self {
            FlowError::Failed(reason) => reason,
            FlowError::Bridge(e) => FailureReason::UnclassifiedException(e.to_string()),
        }
    }
}
