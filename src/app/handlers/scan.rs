// SPDX-License-Identifier: GPL-3.0-only

//! Scan handlers
//!
//! Classifies every scanned payload. Configuration payloads replace the
//! active configuration; everything else is matched against the selected
//! activity's pattern and dispatched.
//!
//! Both an accepted configuration and a matched payload start a new debounce
//! window. A pattern mismatch does not, so a wrong code never blocks the
//! next attempt.

use crate::app::dispatch::{self, Dispatch};
use crate::app::frame_processor::QrDetection;
use crate::app::state::{AppModel, EmbeddedPage, Effect, PageState};
use crate::config::{ActivityIndex, Configuration};
use crate::constants::scan::{CONFIG_PULSE, MATCH_PULSE};
use std::time::Instant;
use tracing::{debug, info, trace};

impl AppModel {
    pub(crate) fn handle_qr_detections_updated(
        &mut self,
        detections: Vec<QrDetection>,
        at: Instant,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        for detection in detections {
            effects.extend(self.handle_scanned(&detection.content, at));
        }
        effects
    }

    pub(crate) fn handle_scanned(&mut self, data: &str, now: Instant) -> Vec<Effect> {
        if self.embedded.is_some() {
            trace!("Embedded view is showing, scanner inactive");
            return Vec::new();
        }

        if !self.scanner.accepts(now) {
            trace!(
                remaining_ms = self.scanner.remaining_window(now).as_millis(),
                "Inside debounce window, ignoring scan"
            );
            return Vec::new();
        }

        if let Some(config) = Configuration::from_scan(data) {
            return self.accept_configuration(config, now);
        }

        self.match_and_dispatch(data, now)
    }

    fn accept_configuration(&mut self, config: Configuration, now: Instant) -> Vec<Effect> {
        info!(activities = config.activities().len(), "Configuration scanned");

        self.scanner.record_detection(now);
        self.config = config.clone();
        self.selected = ActivityIndex::FIRST;
        self.config_scanned = true;
        self.last_status = Some(format!(
            "Configuration loaded: {} activities",
            config.activities().len()
        ));

        vec![Effect::Vibrate(CONFIG_PULSE), Effect::PersistConfig(config)]
    }

    fn match_and_dispatch(&mut self, data: &str, now: Instant) -> Vec<Effect> {
        let Some(activity) = self.config.activity(self.selected) else {
            debug!("No configuration loaded, dropping scan");
            return Vec::new();
        };

        match activity.pattern.test(data) {
            None => {
                debug!(activity = %activity.name, "Activity has no usable pattern, dropping scan");
                return Vec::new();
            }
            Some(false) => {
                info!(data = %data, activity = %activity.name, "Scan does not match activity format");
                self.last_status = Some(format!("Not a {} code", activity.name));
                return Vec::new();
            }
            Some(true) => {}
        }

        self.scanner.record_detection(now);
        info!(data = %data, activity = %activity.name, "Launching for scan");

        let mut effects = vec![Effect::Vibrate(MATCH_PULSE)];
        match dispatch::plan(activity, data) {
            Some(Dispatch::Embedded(url)) => {
                self.embedded = Some(EmbeddedPage {
                    payload: data.to_string(),
                    url: url.clone(),
                    page: PageState::Loading,
                });
                effects.push(Effect::LoadPage(url));
            }
            Some(Dispatch::External(url)) => {
                self.last_status = Some(format!("Opened {}", url));
                effects.push(Effect::OpenExternal(url));
            }
            None => debug!(activity = %activity.name, "No destination URL, nothing to dispatch"),
        }
        effects
    }
}
