//! What the remote application said after the save click.
//!
//! The save can raise a message list, a confirmation popup, both, or nothing.
//! The message list is looked at first: a budget overrun there outranks
//! whatever popup follows it.

use serde::Serialize;
use tracing::{info, warn};

use procurebot_core::FailureReason;
use procurebot_navigation::NavigationClient;

use crate::config::ScreenMarkers;
use crate::error::FlowResult;
use crate::screen;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// Message list naming a budget overrun.
    Budget,
    /// Popup reporting that the document still has errors.
    UnresolvedErrors,
    /// Popup reporting that a system message was issued; saving goes on.
    Informational,
    /// Message list with any other text.
    Unrecognized,
    /// Nothing popped up.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogEvent {
    pub kind: DialogKind,
    pub text: String,
}

impl DialogEvent {
    pub fn none() -> Self {
        Self {
            kind: DialogKind::None,
            text: String::new(),
        }
    }

    /// The failure this dialog ends the run with, if any.
    pub fn failure(&self) -> Option<FailureReason> {
        match self.kind {
            DialogKind::Budget => Some(FailureReason::BudgetExceeded),
            DialogKind::UnresolvedErrors => Some(FailureReason::DocumentStillInvalid),
            DialogKind::Unrecognized => Some(FailureReason::SaveRejected(self.text.clone())),
            DialogKind::Informational | DialogKind::None => None,
        }
    }
}

pub struct ErrorClassifier<'a> {
    markers: &'a ScreenMarkers,
}

impl<'a> ErrorClassifier<'a> {
    pub fn new(markers: &'a ScreenMarkers) -> Self {
        Self { markers }
    }

    /// Inspect and dismiss whatever the save raised.
    pub fn inspect<C: NavigationClient + ?Sized>(&self, client: &C) -> FlowResult<DialogEvent> {
        if let Some(text) = client.probe_dialog(screen::MESSAGE_LIST_TEXT)? {
            if let Some(ok) = client.resolve_address(screen::POPUP_OK)? {
                client.press(&ok)?;
            }
            let kind = if text.contains(&self.markers.budget_exceeded) {
                DialogKind::Budget
            } else {
                DialogKind::Unrecognized
            };
            warn!(?kind, text = %text, "save raised a message list");
            return Ok(DialogEvent {
                kind,
                text: text.trim().to_string(),
            });
        }

        if let Some(text) = client.probe_dialog(screen::POPUP_TEXT)? {
            if text.contains(&self.markers.document_has_errors) {
                if let Some(cancel) = client.resolve_address(screen::POPUP_CANCEL)? {
                    client.press(&cancel)?;
                }
                warn!(text = %text, "document still has errors");
                return Ok(DialogEvent {
                    kind: DialogKind::UnresolvedErrors,
                    text: text.trim().to_string(),
                });
            }
            if text.contains(&self.markers.message_issued) {
                info!(text = %text, "system message issued; continuing");
                return Ok(DialogEvent {
                    kind: DialogKind::Informational,
                    text: text.trim().to_string(),
                });
            }
            // Any other confirmation is answered by the final commit.
            info!(text = %text, "save popup; continuing");
        }

        Ok(DialogEvent::none())
    }
}
