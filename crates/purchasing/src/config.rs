//! Flow configuration.
//!
//! Every field has a default matching the production client, so a config file
//! only needs the values that differ. Files are JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use procurebot_navigation::{DEFAULT_CONTAINER_MARKER, LocatorSettings};

use crate::tax::TaxPolicy;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PROCUREBOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub timing: FlowTiming,
    pub image: LocatorSettings,
    pub templates: TemplateSet,
    pub markers: ScreenMarkers,
    pub header: HeaderDefaults,
    pub tax: TaxPolicy,
    pub scan: ScanLimits,
}

impl FlowConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: FlowConfig = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `PROCUREBOT_CONFIG`, or use defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => {
                tracing::debug!("{CONFIG_ENV} not set; using default flow configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.image.confidence) {
            return Err(ConfigError::Invalid(format!(
                "image.confidence {} outside 0.0..=1.0",
                self.image.confidence
            )));
        }
        if self.scan.supplier_first_row >= self.scan.supplier_end_row {
            return Err(ConfigError::Invalid(
                "scan.supplier_first_row must be below scan.supplier_end_row".into(),
            ));
        }
        if self.markers.container.trim().is_empty() {
            return Err(ConfigError::Invalid("markers.container must not be empty".into()));
        }
        if self.tax.exempt_category.trim().is_empty() {
            return Err(ConfigError::Invalid("tax.exempt_category must not be empty".into()));
        }
        Ok(())
    }
}

/// Fixed waits for the remote client to redraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTiming {
    /// Before the first action, so an operator can bring the client to front.
    pub startup_delay_ms: u64,
    /// After actions that redraw a screen.
    pub settle_ms: u64,
    /// After opening the requisition selection, which loads slowly.
    pub selection_settle_ms: u64,
}

impl Default for FlowTiming {
    fn default() -> Self {
        Self {
            startup_delay_ms: 5_000,
            settle_ms: 1_000,
            selection_settle_ms: 1_500,
        }
    }
}

impl FlowTiming {
    /// No waits at all; for in-memory sessions.
    pub fn none() -> Self {
        Self {
            startup_delay_ms: 0,
            settle_ms: 0,
            selection_settle_ms: 0,
        }
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn selection_settle(&self) -> Duration {
        Duration::from_millis(self.selection_settle_ms)
    }
}

/// Screen templates for controls without a scripting address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSet {
    pub directory: PathBuf,
    pub create_order: String,
    pub requisition_selection: String,
    pub open: String,
    pub accept: String,
    pub execute: String,
    pub requisition_items: String,
    pub adopt: String,
    pub expand_header: String,
    pub collapse_header: String,
    pub save: String,
    pub confirm_save: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("image"),
            create_order: "create_order.png".into(),
            requisition_selection: "cg_order.png".into(),
            open: "open.png".into(),
            accept: "accept.png".into(),
            execute: "execute.png".into(),
            requisition_items: "open_order_info.png".into(),
            adopt: "cy.PNG".into(),
            expand_header: "title_open.png".into(),
            collapse_header: "title.png".into(),
            save: "save.png".into(),
            confirm_save: "save1.png".into(),
        }
    }
}

impl TemplateSet {
    pub fn path(&self, file: &str) -> PathBuf {
        self.directory.join(file)
    }
}

/// Texts the remote client shows; matched by substring unless noted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenMarkers {
    /// Part of the order screen's container name.
    pub container: String,
    pub budget_exceeded: String,
    pub document_has_errors: String,
    pub message_issued: String,
    /// Exact label of the input tax condition row.
    pub input_tax_label: String,
    /// Exact status bar text; `{name}` is replaced by the searched supplier.
    pub supplier_missing: String,
}

impl Default for ScreenMarkers {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER_MARKER.to_string(),
            budget_exceeded: "超出预算".to_string(),
            document_has_errors: "凭证仍有错".to_string(),
            message_issued: "系统消息已发出".to_string(),
            input_tax_label: "进项税率".to_string(),
            supplier_missing: "供应商{name}不存在主记录".to_string(),
        }
    }
}

impl ScreenMarkers {
    pub fn supplier_missing_for(&self, name: &str) -> String {
        self.supplier_missing.replace("{name}", name)
    }
}

/// Fixed header values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderDefaults {
    /// Easy-access tree node of the create-order transaction.
    pub transaction_node: String,
    pub purchasing_org: String,
    pub payment_terms: String,
    pub currency: String,
    pub price_unit: String,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            transaction_node: "F00080".to_string(),
            purchasing_org: "15A0".to_string(),
            payment_terms: "TA01".to_string(),
            currency: "RMB".to_string(),
            price_unit: "1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Upper bound on item table rows read while matching lines.
    pub max_item_rows: usize,
    /// First row of the supplier hit list.
    pub supplier_first_row: usize,
    /// One past the last row of the supplier hit list.
    pub supplier_end_row: usize,
    /// Condition rows searched for the input tax label.
    pub condition_rows: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_item_rows: 200,
            supplier_first_row: 3,
            supplier_end_row: 70,
            condition_rows: 10,
        }
    }
}
