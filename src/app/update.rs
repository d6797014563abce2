// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! This module handles all application messages by routing them to focused handler methods.
//! The main `update()` function acts as a dispatcher, while specific handlers are implemented
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::scan`: payload classification, matching and dispatch
//! - `handlers::browser`: embedded view navigation, messages, page loads
//! - `handlers::ui`: back navigation, activity selector
//! - `handlers::system`: permission, store and URL-open results

use crate::app::state::{AppModel, Effect, Message};

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    ///
    /// Returns the side effects the front-end has to perform.
    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            // ===== Scanning =====
            Message::QrDetectionsUpdated { detections, at } => {
                self.handle_qr_detections_updated(detections, at)
            }
            Message::Scanned { data, at } => self.handle_scanned(&data, at),

            // ===== Selector and navigation =====
            Message::SelectActivity(index) => self.handle_select_activity(index),
            Message::SelectNextActivity => self.handle_select_next_activity(),
            Message::SelectPreviousActivity => self.handle_select_previous_activity(),
            Message::Back => self.handle_back(),

            // ===== Embedded view =====
            Message::BrowserNavigated { view, url } => self.handle_browser_navigated(view, url),
            Message::BrowserMessage(message) => self.handle_browser_message(message),
            Message::PageLoaded { url, result } => self.handle_page_loaded(url, result),
            Message::ReloadPage => self.handle_reload_page(),
            Message::OpenPageExternally => self.handle_open_page_externally(),

            // ===== Async results =====
            Message::PermissionResolved { granted } => self.handle_permission_resolved(granted),
            Message::ConfigLoaded(config) => self.handle_config_loaded(config),
            Message::ConfigSaved(result) => self.handle_config_saved(result),
            Message::ExternalOpened(result) => self.handle_external_opened(result),
        }
    }
}
