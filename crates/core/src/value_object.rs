//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Request inputs (order lines, prices, tax assignments) are immutable for the
/// duration of one flow run and are compared by their attribute values. Two
/// order lines with the same material code, price and requisition line are the
/// same line.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
