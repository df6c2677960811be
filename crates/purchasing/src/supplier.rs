//! Supplier entry on the order header.
//!
//! Source data names suppliers by their registered company name, which the
//! remote search does not always resolve unambiguously. Known names are mapped
//! to account codes up front; anything else goes through the search hit list.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use procurebot_core::{FailureReason, SupplierCode};
use procurebot_navigation::{ContainerResolver, FieldWriter, NavigationClient, VKey};

use crate::config::{read_json, ConfigError, ScreenMarkers};
use crate::error::FlowResult;
use crate::screen;

/// Company name to supplier account code. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, SupplierCode>", into = "BTreeMap<String, SupplierCode>")]
pub struct SupplierAliases {
    entries: BTreeMap<String, SupplierCode>,
}

impl From<BTreeMap<String, SupplierCode>> for SupplierAliases {
    fn from(entries: BTreeMap<String, SupplierCode>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<SupplierAliases> for BTreeMap<String, SupplierCode> {
    fn from(aliases: SupplierAliases) -> Self {
        aliases.entries
    }
}

impl FromIterator<(String, SupplierCode)> for SupplierAliases {
    fn from_iter<I: IntoIterator<Item = (String, SupplierCode)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, code)| (name.trim().to_string(), code))
                .collect(),
        }
    }
}

impl SupplierAliases {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Exact match on the trimmed name.
    pub fn lookup(&self, name: &str) -> Option<&SupplierCode> {
        self.entries.get(name.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SupplierCode)> {
        self.entries.iter().map(|(name, code)| (name.as_str(), code))
    }
}

pub struct SupplierResolver<'a> {
    aliases: &'a SupplierAliases,
    containers: &'a ContainerResolver,
    markers: &'a ScreenMarkers,
    hit_rows: Range<usize>,
}

impl<'a> SupplierResolver<'a> {
    pub fn new(
        aliases: &'a SupplierAliases,
        containers: &'a ContainerResolver,
        markers: &'a ScreenMarkers,
        hit_rows: Range<usize>,
    ) -> Self {
        Self {
            aliases,
            containers,
            markers,
            hit_rows,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a SupplierCode> {
        self.aliases.lookup(name)
    }

    /// Enter the supplier into the header and return what the field settled on.
    pub fn resolve<C: NavigationClient + ?Sized>(&self, client: &C, name: &str) -> FlowResult<SupplierCode> {
        let writer = FieldWriter::new(client);
        let field = self.containers.require(client, screen::SUPPLIER_FIELD)?;

        let written = match self.lookup(name) {
            Some(code) => {
                debug!(supplier = name, code = %code, "supplier alias hit");
                writer.set_and_confirm_at(&field, code.as_str(), screen::SUPERFIELD_CARET)?;
                code.as_str().to_string()
            }
            None => {
                let name = name.trim();
                writer.set_and_confirm_at(&field, name, screen::SUPERFIELD_CARET)?;
                self.pick_from_hit_list(client, name)?;
                name.to_string()
            }
        };

        let status = client.probe_dialog(screen::STATUS_BAR)?.unwrap_or_default();
        if status.trim() == self.markers.supplier_missing_for(&written) {
            warn!(supplier = %written, "supplier has no master record");
            return Err(FailureReason::SupplierNotFound.into());
        }

        // The search may have swapped the screen; look the field up again.
        let field = self.containers.require(client, screen::SUPPLIER_FIELD)?;
        let settled = client.read_text(&field)?;
        match SupplierCode::new(&settled) {
            Ok(code) => {
                info!(supplier = %written, code = %code, "supplier resolved");
                Ok(code)
            }
            Err(_) => {
                warn!(supplier = %written, "supplier field empty after search");
                Err(FailureReason::SupplierNotFound.into())
            }
        }
    }

    /// Pick the first hit-list row whose text is exactly `name`.
    ///
    /// No hit list, or no matching row, is not an error here; the status bar
    /// and the field content decide afterwards.
    fn pick_from_hit_list<C: NavigationClient + ?Sized>(&self, client: &C, name: &str) -> FlowResult<bool> {
        for row in self.hit_rows.clone() {
            let Some(hit) = client.resolve_address(&screen::supplier_hit(row))? else {
                continue;
            };
            if client.read_text(&hit)?.trim() == name {
                debug!(row, "picking supplier from hit list");
                client.set_focus(&hit)?;
                client.send_key(screen::POPUP_WINDOW, VKey::F2)?;
                return Ok(true);
            }
        }
        debug!(supplier = name, "supplier not in hit list");
        Ok(false)
    }
}
