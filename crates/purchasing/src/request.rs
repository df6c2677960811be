//! Flow input: one requisition's lines for one supplier.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use procurebot_core::{DomainError, DomainResult, MaterialCode, RequisitionLine, RequisitionNumber, ValueObject};

/// Unit price as the remote application expects it typed.
///
/// Spreadsheet exports deliver prices as numbers or as text; both are accepted
/// and normalized to a plain decimal string (`"12.5"`, `"300"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriceInput", into = "String")]
pub struct Price(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
    Number(f64),
    Text(String),
}

impl TryFrom<PriceInput> for Price {
    type Error = DomainError;

    fn try_from(value: PriceInput) -> Result<Self, Self::Error> {
        match value {
            PriceInput::Number(n) => Price::from_f64(n),
            PriceInput::Text(s) => Price::new(s),
        }
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl Price {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let text = value.as_ref().trim();
        let mut parts = text.splitn(2, '.');
        let whole = parts.next().unwrap_or_default();
        let fraction = parts.next();
        let digits_only = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        let valid = digits_only(whole) && fraction.is_none_or(digits_only);
        if !valid {
            return Err(DomainError::validation(format!("price '{text}' is not a decimal")));
        }
        Ok(Self(text.to_string()))
    }

    pub fn from_f64(value: f64) -> DomainResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::validation(format!("price {value} is not a valid amount")));
        }
        Self::new(format!("{value}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for Price {}

/// Project category; one category is tax exempt (see [`crate::tax::TaxPolicy`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectType(String);

impl ProjectType {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One requested order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub material_code: MaterialCode,
    /// Net (tax-exclusive) unit price.
    pub unit_price: Price,
    /// Tax-inclusive unit price, used for tax-exempt projects.
    #[serde(default)]
    pub gross_unit_price: Option<Price>,
    pub requisition_line: RequisitionLine,
}

impl ValueObject for OrderLine {}

impl OrderLine {
    pub fn new(material_code: MaterialCode, unit_price: Price, requisition_line: RequisitionLine) -> Self {
        Self {
            material_code,
            unit_price,
            gross_unit_price: None,
            requisition_line,
        }
    }

    pub fn with_gross_price(mut self, price: Price) -> Self {
        self.gross_unit_price = Some(price);
        self
    }

    /// Price to type for this line.
    pub fn price(&self, tax_exempt: bool) -> &Price {
        match (&self.gross_unit_price, tax_exempt) {
            (Some(gross), true) => gross,
            _ => &self.unit_price,
        }
    }
}

#[derive(Deserialize)]
struct RawOrderRequest {
    requisition_number: RequisitionNumber,
    supplier: String,
    project_name: String,
    project_type: ProjectType,
    lines: Vec<OrderLine>,
}

/// Input to one flow run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOrderRequest")]
pub struct OrderRequest {
    requisition_number: RequisitionNumber,
    supplier: String,
    project_name: String,
    project_type: ProjectType,
    lines: Vec<OrderLine>,
}

impl TryFrom<RawOrderRequest> for OrderRequest {
    type Error = DomainError;

    fn try_from(raw: RawOrderRequest) -> Result<Self, Self::Error> {
        OrderRequest::new(
            raw.requisition_number,
            raw.supplier,
            raw.project_name,
            raw.project_type,
            raw.lines,
        )
    }
}

impl OrderRequest {
    pub fn new(
        requisition_number: RequisitionNumber,
        supplier: impl Into<String>,
        project_name: impl Into<String>,
        project_type: ProjectType,
        lines: Vec<OrderLine>,
    ) -> DomainResult<Self> {
        let supplier = supplier.into().trim().to_string();
        if supplier.is_empty() {
            return Err(DomainError::validation("supplier must not be empty"));
        }
        if lines.is_empty() {
            return Err(DomainError::validation("order request has no lines"));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = lines.iter().find(|l| !seen.insert(&l.material_code)) {
            return Err(DomainError::invariant(format!(
                "material code {} appears more than once",
                dup.material_code
            )));
        }

        Ok(Self {
            requisition_number,
            supplier,
            project_name: project_name.into(),
            project_type,
            lines,
        })
    }

    pub fn requisition_number(&self) -> &RequisitionNumber {
        &self.requisition_number
    }

    /// Supplier as written in the source data (trimmed).
    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn project_type(&self) -> &ProjectType {
        &self.project_type
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }
}
