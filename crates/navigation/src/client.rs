//! Scripting bridge capability.
//!
//! The remote client exposes its UI as a tree of elements addressed by
//! hierarchical ids such as `wnd[0]/usr/ctxtSP$00026-LOW`. Looking up an id
//! that is not on screen is an everyday event (optional fields, dialogs that
//! may or may not have popped up), so lookups return `Option`. Only failures
//! of the bridge itself are errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge-level failure. Every variant is fatal for the current flow run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The connection to the remote client was lost.
    #[error("bridge disconnected: {0}")]
    Disconnected(String),

    /// An element resolved earlier is no longer on screen.
    #[error("element vanished: {0}")]
    Stale(String),

    /// A mandatory element is not on screen.
    #[error("element not found: {0}")]
    NotFound(String),

    /// The remote client refused the operation (read-only field, wrong type).
    #[error("operation rejected on {path}: {reason}")]
    Rejected { path: String, reason: String },
}

impl BridgeError {
    pub fn rejected(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Proof that an element existed at `path` when it was looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    path: String,
}

impl ElementRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl core::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path)
    }
}

/// One node of a tree control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub key: String,
    pub label: String,
}

impl TreeNode {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Session-level flags checked before a run starts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub disabled_by_server: bool,
    pub busy: bool,
    pub low_speed_connection: bool,
}

/// Virtual key codes understood by the remote client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VKey {
    /// Validates the current input.
    Enter,
    /// Picks the focused entry of a list dialog.
    F2,
    Other(u8),
}

impl VKey {
    pub fn code(self) -> u8 {
        match self {
            VKey::Enter => 0,
            VKey::F2 => 2,
            VKey::Other(code) => code,
        }
    }
}

/// Scripting bridge to one remote UI session.
///
/// Implementations are synchronous and blocking. Every mutating call changes
/// state in the remote application.
pub trait NavigationClient {
    /// Look up an element by its full address.
    fn resolve_address(&self, path: &str) -> BridgeResult<Option<ElementRef>>;

    fn read_text(&self, element: &ElementRef) -> BridgeResult<String>;

    fn write_text(&self, element: &ElementRef, value: &str) -> BridgeResult<()>;

    fn set_focus(&self, element: &ElementRef) -> BridgeResult<()>;

    fn set_caret(&self, element: &ElementRef, position: usize) -> BridgeResult<()>;

    /// Send a virtual key to a window (`wnd[0]`, `wnd[1]`, ...).
    fn send_key(&self, window: &str, key: VKey) -> BridgeResult<()>;

    fn press(&self, element: &ElementRef) -> BridgeResult<()>;

    /// Select a tab.
    fn select(&self, element: &ElementRef) -> BridgeResult<()>;

    fn double_click(&self, element: &ElementRef) -> BridgeResult<()>;

    /// Names of the immediate children of a container element.
    fn child_names(&self, element: &ElementRef) -> BridgeResult<Vec<String>>;

    fn enumerate_tree_nodes(&self, tree: &ElementRef) -> BridgeResult<Vec<TreeNode>>;

    fn select_tree_node(&self, tree: &ElementRef, key: &str) -> BridgeResult<()>;

    fn double_click_tree_node(&self, tree: &ElementRef, key: &str) -> BridgeResult<()>;

    /// `None` when no session is attached.
    fn session_status(&self) -> BridgeResult<Option<SessionStatus>>;

    /// Toggle the client's input history recording.
    fn set_history_enabled(&self, enabled: bool) -> BridgeResult<()>;

    /// Drop every bridge object held for this session.
    fn release(&self);

    /// Text of a dialog element, or `None` when the dialog is not up.
    fn probe_dialog(&self, path: &str) -> BridgeResult<Option<String>> {
        match self.resolve_address(path)? {
            Some(element) => self.read_text(&element).map(Some),
            None => Ok(None),
        }
    }

    /// Look up an element the current screen must contain.
    fn require_address(&self, path: &str) -> BridgeResult<ElementRef> {
        self.resolve_address(path)?
            .ok_or_else(|| BridgeError::NotFound(path.to_string()))
    }
}
