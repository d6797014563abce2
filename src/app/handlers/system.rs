// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Results of the one-shot asynchronous operations: camera permission,
//! store read, store write and system URL open. Failures are logged, never
//! surfaced as errors.

use crate::app::state::{AppModel, Effect};
use crate::config::{ActivityIndex, Configuration};
use crate::errors::StoreError;
use tracing::{error, info, warn};

impl AppModel {
    pub(crate) fn handle_permission_resolved(&mut self, granted: bool) -> Vec<Effect> {
        self.scanner.resolve_permission(granted);
        Vec::new()
    }

    pub(crate) fn handle_config_loaded(&mut self, config: Option<Configuration>) -> Vec<Effect> {
        if self.config_scanned {
            info!("Ignoring stored configuration, a newer one was scanned");
            return Vec::new();
        }

        self.config = config.unwrap_or_default();
        self.selected = ActivityIndex::FIRST;
        info!(activities = self.config.activities().len(), "Configuration ready");
        Vec::new()
    }

    pub(crate) fn handle_config_saved(&mut self, result: Result<(), StoreError>) -> Vec<Effect> {
        if let Err(e) = result {
            // Still active for this session, lost on restart
            error!(error = %e, "Could not persist configuration");
            self.last_status = Some("Configuration not saved".to_string());
        }
        Vec::new()
    }

    pub(crate) fn handle_external_opened(&mut self, result: Result<(), String>) -> Vec<Effect> {
        if let Err(e) = result {
            warn!(error = %e, "System URL handler failed");
        }
        Vec::new()
    }
}
