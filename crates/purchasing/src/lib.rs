//! Purchase order creation against the remote desktop client.
//!
//! [`OrderCreationFlow`] turns one [`OrderRequest`] (a requisition's lines for
//! one supplier) into a saved purchase order and reports exactly one
//! [`Outcome`](procurebot_core::Outcome). The remote UI is reached only through
//! the [`procurebot_navigation`] traits, so every stage runs unchanged against
//! the in-memory session.

pub mod config;
pub mod dialogs;
pub mod emit;
pub mod error;
pub mod flow;
pub mod lines;
pub mod request;
pub mod screen;
pub mod session;
pub mod supplier;
pub mod tax;

pub use config::{ConfigError, FlowConfig, FlowTiming, HeaderDefaults, ScanLimits, ScreenMarkers, TemplateSet};
pub use dialogs::{DialogEvent, DialogKind, ErrorClassifier};
pub use emit::{extract_order_number, OutcomeEmitter};
pub use error::{FlowError, FlowResult};
pub use flow::{FlowReport, FlowStage, OrderCreationFlow};
pub use lines::{LineBinding, LineMatcher, PriceWriter, RequisitionLineSelector};
pub use request::{OrderLine, OrderRequest, Price, ProjectType};
pub use session::SessionLease;
pub use supplier::{SupplierAliases, SupplierResolver};
pub use tax::{TaxAssigner, TaxAssignment, TaxPolicy};
