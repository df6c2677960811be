//! Exclusive lease on one remote session.

use tracing::{debug, warn};

use procurebot_core::FailureReason;
use procurebot_navigation::NavigationClient;

use crate::error::FlowResult;

/// Held for the whole flow run.
///
/// Acquiring switches the client's input history off and checks that the
/// session can take scripted input. Dropping switches history back on and
/// releases the bridge handle; this happens exactly once whichever way the run
/// ends, including a failed acquisition.
pub struct SessionLease<'a, C: NavigationClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: NavigationClient + ?Sized> SessionLease<'a, C> {
    pub fn acquire(client: &'a C) -> FlowResult<Self> {
        // Built first so an early return still restores and releases.
        let lease = Self { client };

        client.set_history_enabled(false)?;

        let Some(status) = client.session_status()? else {
            return Err(FailureReason::SessionUnavailable.into());
        };
        if status.disabled_by_server {
            return Err(FailureReason::SessionUnavailable.into());
        }
        if status.busy {
            return Err(FailureReason::SessionBusy.into());
        }
        if status.low_speed_connection {
            return Err(FailureReason::LowBandwidthSession.into());
        }

        debug!("session lease acquired");
        Ok(lease)
    }

    pub fn client(&self) -> &'a C {
        self.client
    }
}

impl<C: NavigationClient + ?Sized> Drop for SessionLease<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.client.set_history_enabled(true) {
            warn!(error = %e, "could not restore input history");
        }
        self.client.release();
        debug!("session lease released");
    }
}
