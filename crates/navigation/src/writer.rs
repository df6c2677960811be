//! Two-phase field writes.
//!
//! The remote client keeps typed text pending until the field is validated,
//! so every write is followed by focusing the field and sending Enter to the
//! owning window.

use tracing::debug;

use crate::client::{BridgeResult, ElementRef, NavigationClient, VKey};

pub const MAIN_WINDOW: &str = "wnd[0]";

pub struct FieldWriter<'a, C: NavigationClient + ?Sized> {
    client: &'a C,
    window: &'a str,
}

impl<'a, C: NavigationClient + ?Sized> FieldWriter<'a, C> {
    /// Writer confirming against the main window.
    pub fn new(client: &'a C) -> Self {
        Self::for_window(client, MAIN_WINDOW)
    }

    pub fn for_window(client: &'a C, window: &'a str) -> Self {
        Self { client, window }
    }

    /// Write `value`, focus the field, validate with Enter.
    pub fn set_and_confirm(&self, element: &ElementRef, value: &str) -> BridgeResult<()> {
        debug!(path = element.path(), value, "set and confirm");
        self.client.write_text(element, value)?;
        self.client.set_focus(element)?;
        self.confirm()
    }

    /// Same as [`FieldWriter::set_and_confirm`] with the caret placed first.
    ///
    /// Some search fields only trigger their lookup with the caret inside the text.
    pub fn set_and_confirm_at(
        &self,
        element: &ElementRef,
        value: &str,
        caret: usize,
    ) -> BridgeResult<()> {
        debug!(path = element.path(), value, caret, "set and confirm");
        self.client.write_text(element, value)?;
        self.client.set_focus(element)?;
        self.client.set_caret(element, caret)?;
        self.confirm()
    }

    /// Send Enter to the owning window.
    pub fn confirm(&self) -> BridgeResult<()> {
        self.client.send_key(self.window, VKey::Enter)
    }
}
