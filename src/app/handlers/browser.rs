// SPDX-License-Identifier: GPL-3.0-only

//! Embedded view handlers
//!
//! The view closes when it lands on a URL containing the close-command
//! marker. Messages posted by the hosted page are only logged.

use crate::app::state::{AppModel, Effect, PageState};
use crate::browser::PageContent;
use crate::constants::CLOSE_COMMAND_MARKER;
use tracing::{debug, info, warn};
use url::Url;

impl AppModel {
    pub(crate) fn handle_browser_navigated(&mut self, view: Url, url: Url) -> Vec<Effect> {
        debug!(view = %view, url = %url, "Navigation change");

        if !self.embedded.as_ref().is_some_and(|e| e.url == view) {
            debug!(url = %url, "Navigation from a view that is no longer showing");
            return Vec::new();
        }
        if url.as_str().contains(CLOSE_COMMAND_MARKER) {
            info!(url = %url, "Closing embedded view due to URL");
            self.embedded = None;
        }
        Vec::new()
    }

    pub(crate) fn handle_browser_message(&mut self, message: String) -> Vec<Effect> {
        // Observed only: pages close the view through the URL marker
        info!(message = %message, "Message from hosted page");
        Vec::new()
    }

    pub(crate) fn handle_page_loaded(
        &mut self,
        url: Url,
        result: Result<PageContent, String>,
    ) -> Vec<Effect> {
        let Some(embedded) = self.embedded.as_mut().filter(|e| e.url == url) else {
            debug!(url = %url, "Page result for a view that is no longer showing");
            return Vec::new();
        };

        embedded.page = match result {
            Ok(content) => {
                info!(url = %content.final_url, status = content.status, "Embedded page ready");
                PageState::Loaded(content)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Embedded page failed to load");
                PageState::Failed(e)
            }
        };
        Vec::new()
    }

    pub(crate) fn handle_reload_page(&mut self) -> Vec<Effect> {
        match self.embedded.as_mut() {
            Some(embedded) => {
                embedded.page = PageState::Loading;
                vec![Effect::LoadPage(embedded.url.clone())]
            }
            None => Vec::new(),
        }
    }

    pub(crate) fn handle_open_page_externally(&mut self) -> Vec<Effect> {
        let Some(embedded) = &self.embedded else {
            return Vec::new();
        };
        let url = match &embedded.page {
            PageState::Loaded(content) => content.final_url.clone(),
            _ => embedded.url.clone(),
        };
        vec![Effect::OpenExternal(url)]
    }
}
