//! `procurebot-core`: shared building blocks for the order automation crates.
//!
//! This crate contains **pure** primitives (no UI bridge, no IO): identifiers,
//! the input-validation error model and the flow outcome taxonomy.

pub mod error;
pub mod id;
pub mod outcome;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{MaterialCode, OrderNumber, RequisitionLine, RequisitionNumber, SupplierCode};
pub use outcome::{FailureReason, Outcome};
pub use value_object::ValueObject;
