//! Tax rate and tax code per item.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use procurebot_core::ValueObject;
use procurebot_navigation::{ContainerResolver, FieldWriter, NavigationClient};

use crate::error::FlowResult;
use crate::request::ProjectType;
use crate::screen;

/// Binary tax policy on the project category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxPolicy {
    /// The one tax-exempt project category.
    pub exempt_category: String,
    pub exempt_rate: String,
    pub exempt_code: String,
    pub standard_rate: String,
    pub standard_code: String,
    /// Walk the items backwards a second time and re-apply rate and code.
    pub reapply_backward: bool,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            exempt_category: "新住配完善".to_string(),
            exempt_rate: "0".to_string(),
            exempt_code: "J0".to_string(),
            standard_rate: "13".to_string(),
            standard_code: "U2".to_string(),
            reapply_backward: true,
        }
    }
}

/// Rate and code written to every item of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxAssignment {
    pub rate: String,
    pub code: String,
    pub exempt: bool,
}

impl ValueObject for TaxAssignment {}

impl TaxPolicy {
    pub fn is_exempt(&self, project_type: &ProjectType) -> bool {
        project_type.as_str() == self.exempt_category.trim()
    }

    pub fn assignment(&self, project_type: &ProjectType) -> TaxAssignment {
        if self.is_exempt(project_type) {
            TaxAssignment {
                rate: self.exempt_rate.clone(),
                code: self.exempt_code.clone(),
                exempt: true,
            }
        } else {
            TaxAssignment {
                rate: self.standard_rate.clone(),
                code: self.standard_code.clone(),
                exempt: false,
            }
        }
    }
}

/// Writes a [`TaxAssignment`] into the item detail area.
pub struct TaxAssigner<'a> {
    containers: &'a ContainerResolver,
    rate_label: &'a str,
    condition_rows: usize,
}

impl<'a> TaxAssigner<'a> {
    pub fn new(containers: &'a ContainerResolver, rate_label: &'a str, condition_rows: usize) -> Self {
        Self {
            containers,
            rate_label,
            condition_rows,
        }
    }

    /// Apply to `items` items, forward, then optionally backward again.
    pub fn apply_all<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        assignment: &TaxAssignment,
        items: usize,
        reapply_backward: bool,
    ) -> FlowResult<()> {
        for item in 0..items {
            debug!(item, "assigning tax");
            self.apply_to_current_item(client, assignment)?;
            self.step(client, screen::NEXT_ITEM_BUTTON)?;
        }
        if reapply_backward {
            for item in (0..items).rev() {
                debug!(item, "re-applying tax");
                self.apply_to_current_item(client, assignment)?;
                self.step(client, screen::PREVIOUS_ITEM_BUTTON)?;
            }
        }
        Ok(())
    }

    /// Rate on the conditions tab, code on the invoice tab.
    ///
    /// Returns whether the rate row was found. Condition rows are not in a
    /// stable order, so the row is located by its label.
    pub fn apply_to_current_item<C: NavigationClient + ?Sized>(
        &self,
        client: &C,
        assignment: &TaxAssignment,
    ) -> FlowResult<bool> {
        let writer = FieldWriter::new(client);

        let conditions = self.containers.require(client, screen::ITEM_CONDITIONS_TAB)?;
        client.select(&conditions)?;

        let rate_row = self.find_rate_row(client)?;
        match rate_row {
            Some(row) => {
                let amount = self.containers.require_cell(
                    client,
                    screen::CONDITION_AMOUNT,
                    screen::CONDITION_AMOUNT_COLUMN,
                    row,
                )?;
                writer.set_and_confirm(&amount, &assignment.rate)?;
            }
            None => warn!(label = self.rate_label, "tax rate condition not listed; rate left unchanged"),
        }

        let invoice = self.containers.require(client, screen::ITEM_INVOICE_TAB)?;
        client.select(&invoice)?;
        let code = self.containers.require(client, screen::ITEM_TAX_CODE_FIELD)?;
        writer.set_and_confirm(&code, &assignment.code)?;

        Ok(rate_row.is_some())
    }

    fn find_rate_row<C: NavigationClient + ?Sized>(&self, client: &C) -> FlowResult<Option<usize>> {
        for row in 0..self.condition_rows {
            let Some(label) = self.containers.locate_cell(
                client,
                screen::CONDITION_LABEL,
                screen::CONDITION_LABEL_COLUMN,
                row,
            )?
            else {
                continue;
            };
            if client.read_text(&label)?.trim() == self.rate_label {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn step<C: NavigationClient + ?Sized>(&self, client: &C, button: &str) -> FlowResult<()> {
        let button = self.containers.require(client, button)?;
        client.press(&button)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procurebot_navigation::InMemorySession;

    const CONTAINER: &str = "wnd[0]/usr/subSUB0:SAPLMEGUI:0013";
    const RATE_LABEL: &str = "进项税率";

    fn at(sub: &str) -> String {
        format!("{CONTAINER}/{sub}")
    }

    fn cell(sub: &str, column: usize, row: usize) -> String {
        format!("{CONTAINER}/{sub}[{column},{row}]")
    }

    fn item_detail(labels: &[&str]) -> InMemorySession {
        let session = InMemorySession::new();
        session.put(at(screen::ITEM_CONDITIONS_TAB), "");
        for (row, label) in labels.iter().enumerate() {
            session.put(cell(screen::CONDITION_LABEL, 2, row), *label);
            session.put(cell(screen::CONDITION_AMOUNT, 3, row), "");
        }
        session.put(at(screen::ITEM_INVOICE_TAB), "");
        session.put(at(screen::ITEM_TAX_CODE_FIELD), "");
        session.put(at(screen::NEXT_ITEM_BUTTON), "");
        session.put(at(screen::PREVIOUS_ITEM_BUTTON), "");
        session
    }

    #[test]
    fn exempt_category_gets_zero_rate_and_exempt_code() {
        let policy = TaxPolicy::default();
        let assignment = policy.assignment(&ProjectType::new("新住配完善"));
        assert_eq!(assignment.rate, "0");
        assert_eq!(assignment.code, "J0");
        assert!(assignment.exempt);
    }

    #[test]
    fn other_categories_get_standard_rate_and_code() {
        let policy = TaxPolicy::default();
        for category in ["upgrade", "new build", ""] {
            let assignment = policy.assignment(&ProjectType::new(category));
            assert_eq!(assignment.rate, "13");
            assert_eq!(assignment.code, "U2");
            assert!(!assignment.exempt);
        }
    }

    #[test]
    fn rate_is_written_to_the_row_labelled_input_tax() {
        let session = item_detail(&["Gross price", "Freight", RATE_LABEL, "Discount"]);
        let containers = ContainerResolver::default();
        let assigner = TaxAssigner::new(&containers, RATE_LABEL, 10);
        let assignment = TaxPolicy::default().assignment(&ProjectType::new("upgrade"));

        let found = assigner.apply_to_current_item(&session, &assignment).unwrap();

        assert!(found);
        assert_eq!(
            session.writes_to("KOMV-KBETR"),
            vec![(cell(screen::CONDITION_AMOUNT, 3, 2), "13".to_string())]
        );
        assert_eq!(
            session.writes_to("MEPO1317-MWSKZ"),
            vec![(at(screen::ITEM_TAX_CODE_FIELD), "U2".to_string())]
        );
    }

    #[test]
    fn missing_rate_row_still_writes_tax_code() {
        let session = item_detail(&["Gross price", "Freight"]);
        let containers = ContainerResolver::default();
        let assigner = TaxAssigner::new(&containers, RATE_LABEL, 10);
        let assignment = TaxPolicy::default().assignment(&ProjectType::new("新住配完善"));

        let found = assigner.apply_to_current_item(&session, &assignment).unwrap();

        assert!(!found);
        assert!(session.writes_to("KOMV-KBETR").is_empty());
        assert_eq!(session.writes_to("MEPO1317-MWSKZ").len(), 1);
    }

    #[test]
    fn every_item_is_visited_forward_and_back() {
        let session = item_detail(&[RATE_LABEL]);
        let containers = ContainerResolver::default();
        let assigner = TaxAssigner::new(&containers, RATE_LABEL, 10);
        let assignment = TaxPolicy::default().assignment(&ProjectType::new("upgrade"));

        assigner.apply_all(&session, &assignment, 3, true).unwrap();

        assert_eq!(session.writes_to("KOMV-KBETR").len(), 6);
        assert_eq!(
            session.count(&procurebot_navigation::Action::Press(at(screen::NEXT_ITEM_BUTTON))),
            3
        );
        assert_eq!(
            session.count(&procurebot_navigation::Action::Press(at(screen::PREVIOUS_ITEM_BUTTON))),
            3
        );
    }
}
