//! Addresses whose container segment is assigned at runtime.
//!
//! The order screen lives in a subscreen container directly below
//! `wnd[0]/usr`, named like `SUB0:SAPLMEGUI:0013`. The numeric suffix changes
//! on every tab switch and whenever the document is reopened, so the container
//! is looked up again right before each deep address is used. A
//! [`NavigationAddress`] is built, resolved and dropped; it is never stored.

use tracing::trace;

use crate::client::{BridgeError, BridgeResult, ElementRef, NavigationClient};

/// User area of the main window.
pub const USER_AREA: &str = "wnd[0]/usr";

/// Substring identifying the order screen's container.
pub const DEFAULT_CONTAINER_MARKER: &str = "SUB0:SAPLMEGUI";

/// Finds the current name of the dynamic container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerResolver {
    marker: String,
}

impl Default for ContainerResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_MARKER)
    }
}

impl ContainerResolver {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// First child of the user area whose name contains the marker.
    pub fn resolve<C: NavigationClient + ?Sized>(&self, client: &C) -> BridgeResult<Option<String>> {
        let Some(user_area) = client.resolve_address(USER_AREA)? else {
            return Ok(None);
        };
        let name = client
            .child_names(&user_area)?
            .into_iter()
            .find(|name| name.contains(&self.marker));
        trace!(container = ?name, "resolved dynamic container");
        Ok(name)
    }

    /// Build an address below the container, resolving the container now.
    pub fn address<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        sub_path: &str,
    ) -> BridgeResult<NavigationAddress> {
        let container = self.resolve(client)?.ok_or_else(|| {
            BridgeError::NotFound(format!("{USER_AREA}/sub*{}*", self.marker))
        })?;
        Ok(NavigationAddress::new(container, sub_path))
    }

    /// Resolve an element below the container.
    pub fn locate<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        sub_path: &str,
    ) -> BridgeResult<Option<ElementRef>> {
        self.address(client, sub_path)?.resolve(client)
    }

    /// Resolve one cell of a table below the container.
    pub fn locate_cell<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        sub_path: &str,
        column: usize,
        row: usize,
    ) -> BridgeResult<Option<ElementRef>> {
        self.address(client, sub_path)?
            .cell(column, row)
            .resolve(client)
    }

    /// Like [`ContainerResolver::locate`], for elements the screen must contain.
    pub fn require<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        sub_path: &str,
    ) -> BridgeResult<ElementRef> {
        let address = self.address(client, sub_path)?;
        address
            .resolve(client)?
            .ok_or_else(|| BridgeError::NotFound(address.path()))
    }

    /// Like [`ContainerResolver::locate_cell`], for cells the table must contain.
    pub fn require_cell<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        sub_path: &str,
        column: usize,
        row: usize,
    ) -> BridgeResult<ElementRef> {
        let address = self.address(client, sub_path)?.cell(column, row);
        address
            .resolve(client)?
            .ok_or_else(|| BridgeError::NotFound(address.path()))
    }
}

/// Address of one element below the dynamic container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAddress {
    container: String,
    sub_path: String,
    row: Option<usize>,
    column: Option<usize>,
}

impl NavigationAddress {
    pub fn new(container: impl Into<String>, sub_path: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            sub_path: sub_path.into(),
            row: None,
            column: None,
        }
    }

    /// Point at a table cell (`[column,row]`).
    pub fn cell(mut self, column: usize, row: usize) -> Self {
        self.column = Some(column);
        self.row = Some(row);
        self
    }

    pub fn path(&self) -> String {
        let base = format!("{USER_AREA}/sub{}/{}", self.container, self.sub_path);
        match (self.column, self.row) {
            (Some(column), Some(row)) => format!("{base}[{column},{row}]"),
            _ => base,
        }
    }

    pub fn resolve<C: NavigationClient + ?Sized>(&self, client: &C) -> BridgeResult<Option<ElementRef>> {
        client.resolve_address(&self.path())
    }
}
