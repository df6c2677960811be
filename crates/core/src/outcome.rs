//! Result of one order creation run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::OrderNumber;

/// Why an order creation run did not produce an order.
///
/// Callers write [`FailureReason::code`] back to the source record, so the
/// codes are stable.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// No scripting session could be attached, or the server disabled scripting.
    #[error("no remote session available")]
    SessionUnavailable,

    /// The session is still processing a previous request.
    #[error("remote session is busy")]
    SessionBusy,

    /// The session runs in low-speed mode, which drops the controls the flow needs.
    #[error("remote session uses a low-bandwidth connection")]
    LowBandwidthSession,

    /// The requisition selection returned no data.
    #[error("no requisition data matches the selection")]
    NoRequisitionData,

    /// At least one line could not be bound to exactly one row.
    #[error("order line data is incomplete")]
    IncompleteLineData,

    /// The supplier has no master record in the remote application.
    #[error("supplier not found")]
    SupplierNotFound,

    /// Saving hit the budget check.
    #[error("budget exceeded")]
    BudgetExceeded,

    /// Saving raised a message list that is not a budget overrun.
    #[error("save rejected: {0}")]
    SaveRejected(String),

    /// The document still has errors and cannot be saved.
    #[error("document still has errors")]
    DocumentStillInvalid,

    /// The commit ran but no order number could be read back.
    #[error("order write could not be confirmed")]
    UnknownWriteFailure,

    /// Anything unexpected (bridge failure, missing mandatory element).
    #[error("unclassified failure: {0}")]
    UnclassifiedException(String),
}

impl FailureReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::SessionUnavailable => "session_unavailable",
            FailureReason::SessionBusy => "session_busy",
            FailureReason::LowBandwidthSession => "low_bandwidth_session",
            FailureReason::NoRequisitionData => "no_requisition_data",
            FailureReason::IncompleteLineData => "incomplete_line_data",
            FailureReason::SupplierNotFound => "supplier_not_found",
            FailureReason::BudgetExceeded => "budget_exceeded",
            FailureReason::SaveRejected(_) => "save_rejected",
            FailureReason::DocumentStillInvalid => "document_still_invalid",
            FailureReason::UnknownWriteFailure => "unknown_write_failure",
            FailureReason::UnclassifiedException(_) => "unclassified_exception",
        }
    }

    /// Precondition failures happen before the flow touches the remote UI.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FailureReason::SessionUnavailable
                | FailureReason::SessionBusy
                | FailureReason::LowBandwidthSession
        )
    }
}

/// Exactly one of these is produced per flow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { order_number: OrderNumber },
    Failure { reason: FailureReason },
}

impl Outcome {
    pub fn success(order_number: impl Into<OrderNumber>) -> Self {
        Self::Success {
            order_number: order_number.into(),
        }
    }

    pub fn failure(reason: FailureReason) -> Self {
        Self::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn order_number(&self) -> Option<OrderNumber> {
        match self {
            Outcome::Success { order_number } => Some(*order_number),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { reason } => Some(reason),
        }
    }
}

impl From<FailureReason> for Outcome {
    fn from(reason: FailureReason) -> Self {
        Outcome::failure(reason)
    }
}
