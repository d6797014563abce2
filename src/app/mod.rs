// SPDX-License-Identifier: MPL-2.0

//! Main application module
//!
//! This module contains the application state, message handling and the
//! scan/dispatch logic. Rendering lives in the front-end (`terminal`), which
//! feeds [`Message`]s into [`AppModel::update`] and performs the returned
//! [`Effect`]s.
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, Effect, etc.)
//! - `scanner`: Camera permission and scan debounce
//! - `dispatch`: Destination URL construction and routing
//! - `selector`: Activity selector options
//! - `frame_processor`: QR detection over camera frames
//! - `update`: Message handling

pub mod dispatch;
pub mod frame_processor;
mod handlers;
pub mod scanner;
pub mod selector;
mod state;
mod update;

pub use state::{AppModel, EmbeddedPage, Effect, Message, PageState, PermissionState, Screen};

use crate::config::{Activity, ActivityIndex, Configuration};
use selector::SelectorOption;
use std::time::Instant;

impl AppModel {
    /// Model holding a configuration read at startup
    pub fn with_configuration(config: Option<Configuration>) -> Self {
        let mut model = Self::default();
        model.update(Message::ConfigLoaded(config));
        model
    }

    /// The screen to render
    pub fn screen(&self) -> Screen {
        match self.scanner.permission() {
            PermissionState::Unknown => Screen::RequestingPermission,
            PermissionState::Denied => Screen::NoCameraAccess,
            PermissionState::Granted if self.embedded.is_some() => Screen::EmbeddedView,
            PermissionState::Granted => Screen::Scanner,
        }
    }

    pub fn permission(&self) -> PermissionState {
        self.scanner.permission()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn selected(&self) -> ActivityIndex {
        self.selected
    }

    pub fn active_activity(&self) -> Option<&Activity> {
        self.config.activity(self.selected)
    }

    pub fn selector_options(&self) -> Vec<SelectorOption> {
        selector::options(&self.config)
    }

    pub fn embedded(&self) -> Option<&EmbeddedPage> {
        self.embedded.as_ref()
    }

    /// Instant of the last accepted detection
    pub fn last_detection(&self) -> Option<Instant> {
        self.scanner.last_detection()
    }

    /// Outcome of the last scan worth telling the user about
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }
}
