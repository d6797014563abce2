// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::frame_processor::QrDetection;
use crate::app::scanner::ScannerController;
use crate::browser::PageContent;
use crate::config::{ActivityIndex, Configuration};
use crate::errors::StoreError;
use std::time::{Duration, Instant};
use url::Url;

/// Camera permission lifecycle
///
/// Requested once at startup. `Denied` is terminal for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    /// Request in flight
    #[default]
    Unknown,
    /// Camera is streaming
    Granted,
    /// Camera could not be opened
    Denied,
}

/// Load state of the embedded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageState {
    #[default]
    Loading,
    Loaded(PageContent),
    Failed(String),
}

/// The embedded view currently shown over the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPage {
    /// Raw scanned payload that opened the view
    pub payload: String,
    /// Destination computed at dispatch time
    pub url: Url,
    pub page: PageState,
}

/// Which top-level screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    RequestingPermission,
    NoCameraAccess,
    Scanner,
    EmbeddedView,
}

/// Side effects requested by [`AppModel::update`](super::AppModel::update)
///
/// The front-end performs them and reports results back as messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Haptic pulse
    Vibrate(Duration),
    /// Write the configuration to the store
    PersistConfig(Configuration),
    /// Hand a URL to the system handler
    OpenExternal(Url),
    /// Fetch a page for the embedded view
    LoadPage(Url),
    /// Terminate the application
    Exit,
}

/// Every event the application reacts to
#[derive(Debug, Clone)]
pub enum Message {
    /// Outcome of the startup camera request
    PermissionResolved { granted: bool },
    /// Outcome of the startup store read
    ConfigLoaded(Option<Configuration>),
    /// Outcome of a store write
    ConfigSaved(Result<(), StoreError>),
    /// QR codes found in one frame
    QrDetectionsUpdated {
        detections: Vec<QrDetection>,
        at: Instant,
    },
    /// A single scanned payload
    Scanned { data: String, at: Instant },
    /// Activity chosen in the selector
    SelectActivity(ActivityIndex),
    SelectNextActivity,
    SelectPreviousActivity,
    /// The view opened at `view` landed on `url`
    BrowserNavigated { view: Url, url: Url },
    /// Message posted by the hosted page
    BrowserMessage(String),
    /// Embedded page fetch finished
    PageLoaded {
        url: Url,
        result: Result<PageContent, String>,
    },
    ReloadPage,
    OpenPageExternally,
    /// Outcome of a system URL open
    ExternalOpened(Result<(), String>),
    /// Back navigation (Esc / Backspace)
    Back,
}

/// The application model
///
/// All mutation happens in `update`, one message at a time.
#[derive(Debug, Default)]
pub struct AppModel {
    pub(crate) scanner: ScannerController,
    pub(crate) config: Configuration,
    pub(crate) selected: ActivityIndex,
    pub(crate) embedded: Option<EmbeddedPage>,
    /// Set once a configuration was scanned, so a late store read
    /// does not clobber it
    pub(crate) config_scanned: bool,
    /// Last scan outcome, for the status line
    pub(crate) last_status: Option<String>,
}
