// SPDX-License-Identifier: GPL-3.0-only

//! Scanner controller state: camera permission and scan debounce

use crate::app::state::PermissionState;
use crate::constants::scan::DEBOUNCE_WINDOW;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct ScannerController {
    permission: PermissionState,
    last_detection: Option<Instant>,
}

impl ScannerController {
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Apply the result of the startup permission request.
    ///
    /// Only the first resolution counts.
    pub fn resolve_permission(&mut self, granted: bool) {
        if self.permission != PermissionState::Unknown {
            warn!(current = ?self.permission, granted, "Permission already resolved");
            return;
        }
        self.permission = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        info!(permission = ?self.permission, "Camera permission resolved");
    }

    /// Whether a scan at `now` is outside the debounce window
    pub fn accepts(&self, now: Instant) -> bool {
        match self.last_detection {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= DEBOUNCE_WINDOW,
        }
    }

    /// Time left in the debounce window
    pub fn remaining_window(&self, now: Instant) -> Duration {
        self.last_detection
            .map(|last| DEBOUNCE_WINDOW.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or_default()
    }

    /// Start a new debounce window at `now`
    pub fn record_detection(&mut self, now: Instant) {
        self.last_detection = Some(now);
    }

    pub fn last_detection(&self) -> Option<Instant> {
        self.last_detection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundaries() {
        let start = Instant::now();
        let mut scanner = ScannerController::default();
        assert!(scanner.accepts(start));

        scanner.record_detection(start);
        assert!(!scanner.accepts(start + Duration::from_millis(4999)));
        assert!(scanner.accepts(start + Duration::from_millis(5000)));
        assert_eq!(
            scanner.remaining_window(start + Duration::from_millis(1000)),
            Duration::from_millis(4000)
        );
    }

    #[test]
    fn test_permission_resolves_once() {
        let mut scanner = ScannerController::default();
        scanner.resolve_permission(false);
        scanner.resolve_permission(true);
        assert_eq!(scanner.permission(), PermissionState::Denied);
    }
}
