// SPDX-License-Identifier: GPL-3.0-only

//! UI navigation handlers
//!
//! Back navigation and the activity selector.

use crate::app::selector;
use crate::app::state::{AppModel, Effect};
use crate::config::ActivityIndex;
use tracing::{info, warn};

impl AppModel {
    pub(crate) fn handle_back(&mut self) -> Vec<Effect> {
        if self.embedded.take().is_some() {
            info!("Back: closing embedded view");
            Vec::new()
        } else {
            info!("Back: exiting");
            vec![Effect::Exit]
        }
    }

    pub(crate) fn handle_select_activity(&mut self, index: ActivityIndex) -> Vec<Effect> {
        match self.config.activity(index) {
            Some(activity) => {
                info!(index = index.get(), activity = %activity.name, "Activity selected");
                self.selected = index;
            }
            None => warn!(index = index.get(), "Selected activity is not in the configuration"),
        }
        Vec::new()
    }

    pub(crate) fn handle_select_next_activity(&mut self) -> Vec<Effect> {
        match selector::next(&self.config, self.selected) {
            Some(index) => self.handle_select_activity(index),
            None => Vec::new(),
        }
    }

    pub(crate) fn handle_select_previous_activity(&mut self) -> Vec<Effect> {
        match selector::previous(&self.config, self.selected) {
            Some(index) => self.handle_select_activity(index),
            None => Vec::new(),
        }
    }
}
