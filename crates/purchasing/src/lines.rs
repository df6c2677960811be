//! Requisition lines and item table rows.

use tracing::{debug, info, warn};

use procurebot_core::{FailureReason, RequisitionLine};
use procurebot_navigation::{ContainerResolver, FieldWriter, NavigationClient};

use crate::config::HeaderDefaults;
use crate::error::FlowResult;
use crate::request::OrderLine;
use crate::screen;

/// Picks the requested lines in the requisition tree.
pub struct RequisitionLineSelector;

impl RequisitionLineSelector {
    /// Select every tree node labelled with one of `lines`.
    ///
    /// Returns the number of selected nodes. A line number with no node is
    /// [`FailureReason::IncompleteLineData`].
    pub fn select<'l, C, I>(client: &C, lines: I) -> FlowResult<usize>
    where
        C: NavigationClient + ?Sized,
        I: IntoIterator<Item = &'l RequisitionLine>,
    {
        let mut wanted: Vec<&str> = Vec::new();
        for line in lines {
            if !wanted.contains(&line.as_str()) {
                wanted.push(line.as_str());
            }
        }

        let tree = client.require_address(screen::REQUISITION_TREE)?;
        let mut selected = 0;
        for node in client.enumerate_tree_nodes(&tree)? {
            if wanted.is_empty() {
                break;
            }
            if let Some(pos) = wanted.iter().position(|w| *w == node.label.trim()) {
                debug!(key = %node.key, line = wanted[pos], "selecting requisition line");
                client.select_tree_node(&tree, &node.key)?;
                wanted.swap_remove(pos);
                selected += 1;
            }
        }

        if !wanted.is_empty() {
            warn!(missing = ?wanted, "requisition lines not offered for selection");
            return Err(FailureReason::IncompleteLineData.into());
        }
        Ok(selected)
    }
}

/// An order line bound to its item table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBinding<'l> {
    pub line: &'l OrderLine,
    pub row: usize,
}

/// Binds order lines to item table rows by material code.
pub struct LineMatcher<'a> {
    containers: &'a ContainerResolver,
    max_rows: usize,
}

impl<'a> LineMatcher<'a> {
    pub fn new(containers: &'a ContainerResolver, max_rows: usize) -> Self {
        Self { containers, max_rows }
    }

    /// Bind every line before anything is written.
    ///
    /// A line binds only when exactly one row carries its material code.
    /// Unmatched and ambiguous lines are logged together and reported as one
    /// [`FailureReason::IncompleteLineData`].
    pub fn bind<'l, C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        lines: &'l [OrderLine],
    ) -> FlowResult<Vec<LineBinding<'l>>> {
        let codes = self.material_column(client)?;
        debug!(rows = codes.len(), "item table read");

        let mut bindings = Vec::with_capacity(lines.len());
        let mut unbound = Vec::new();
        for line in lines {
            let mut rows = codes
                .iter()
                .enumerate()
                .filter(|(_, code)| code.as_str() == line.material_code.as_str())
                .map(|(row, _)| row);
            match (rows.next(), rows.next()) {
                (Some(row), None) => bindings.push(LineBinding { line, row }),
                (None, _) => unbound.push((line.material_code.as_str(), "absent")),
                (Some(_), Some(_)) => unbound.push((line.material_code.as_str(), "ambiguous")),
            }
        }

        if !unbound.is_empty() {
            warn!(lines = ?unbound, "order lines without a unique item row");
            return Err(FailureReason::IncompleteLineData.into());
        }
        info!(lines = bindings.len(), "order lines bound to item rows");
        Ok(bindings)
    }

    fn material_column<C: NavigationClient + ?Sized>(&self, client: &C) -> FlowResult<Vec<String>> {
        let mut codes = Vec::new();
        for row in 0..self.max_rows {
            let Some(cell) = self.containers.locate_cell(
                client,
                screen::ITEM_MATERIAL,
                screen::ITEM_MATERIAL_COLUMN,
                row,
            )?
            else {
                break;
            };
            codes.push(client.read_text(&cell)?.trim().to_string());
        }
        Ok(codes)
    }
}

/// Writes price, currency and price unit of one bound row.
pub struct PriceWriter<'a> {
    containers: &'a ContainerResolver,
    header: &'a HeaderDefaults,
}

impl<'a> PriceWriter<'a> {
    pub fn new(containers: &'a ContainerResolver, header: &'a HeaderDefaults) -> Self {
        Self { containers, header }
    }

    pub fn write<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        binding: &LineBinding<'_>,
        tax_exempt: bool,
    ) -> FlowResult<()> {
        let writer = FieldWriter::new(client);
        let row = binding.row;
        let price = binding.line.price(tax_exempt);

        let net_price =
            self.containers
                .require_cell(client, screen::ITEM_NET_PRICE, screen::ITEM_NET_PRICE_COLUMN, row)?;
        writer.set_and_confirm(&net_price, price.as_str())?;

        // Only shown for some material types.
        match self
            .containers
            .locate_cell(client, screen::ITEM_CURRENCY, screen::ITEM_CURRENCY_COLUMN, row)?
        {
            Some(currency) => writer.set_and_confirm(&currency, &self.header.currency)?,
            None => debug!(row, "no currency cell"),
        }

        let price_unit =
            self.containers
                .require_cell(client, screen::ITEM_PRICE_UNIT, screen::ITEM_PRICE_UNIT_COLUMN, row)?;
        writer.set_and_confirm(&price_unit, &self.header.price_unit)?;

        debug!(row, material = %binding.line.material_code, price = %price, "price written");
        Ok(())
    }
}
