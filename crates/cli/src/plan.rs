//! Offline preview of what a run would type.

use serde::Serialize;

use procurebot_core::{MaterialCode, RequisitionLine, RequisitionNumber, SupplierCode};
use procurebot_purchasing::{FlowConfig, OrderRequest, Price, ProjectType, SupplierAliases, TaxAssignment};

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierLookup {
    /// Known name; the code is typed directly.
    Alias,
    /// Unknown name; the remote search hit list decides.
    Search,
}

#[derive(Debug, Serialize)]
pub struct SupplierPlan<'a> {
    pub name: &'a str,
    pub lookup: SupplierLookup,
    pub code: Option<&'a SupplierCode>,
}

#[derive(Debug, Serialize)]
pub struct LinePlan<'a> {
    pub material_code: &'a MaterialCode,
    pub requisition_line: &'a RequisitionLine,
    pub price: &'a Price,
}

#[derive(Debug, Serialize)]
pub struct OrderPlan<'a> {
    pub requisition_number: &'a RequisitionNumber,
    pub supplier: SupplierPlan<'a>,
    pub project_type: &'a ProjectType,
    pub purchasing_org: &'a str,
    pub payment_terms: &'a str,
    pub tax: TaxAssignment,
    pub lines: Vec<LinePlan<'a>>,
}

impl<'a> OrderPlan<'a> {
    pub fn build(request: &'a OrderRequest, config: &'a FlowConfig, aliases: &'a SupplierAliases) -> Self {
        let tax = config.tax.assignment(request.project_type());
        let code = aliases.lookup(request.supplier());
        let lines = request
            .lines()
            .iter()
            .map(|line| LinePlan {
                material_code: &line.material_code,
                requisition_line: &line.requisition_line,
                price: line.price(tax.exempt),
            })
            .collect();

        Self {
            requisition_number: request.requisition_number(),
            supplier: SupplierPlan {
                name: request.supplier(),
                lookup: if code.is_some() {
                    SupplierLookup::Alias
                } else {
                    SupplierLookup::Search
                },
                code,
            },
            project_type: request.project_type(),
            purchasing_org: &config.header.purchasing_org,
            payment_terms: &config.header.payment_terms,
            tax,
            lines,
        }
    }
}
