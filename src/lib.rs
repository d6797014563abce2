// SPDX-License-Identifier: MPL-2.0

//! barcodetoweb - scan QR codes and hand matching payloads to a web page
//!
//! A configuration QR code carries a list of activities. Each activity says
//! which payloads it accepts (a pattern) and where they go (a base URL plus a
//! query parameter, shown in an embedded page view or the system browser).
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application state, scan classification and dispatch
//! - [`backends`]: Camera enumeration and capture
//! - [`browser`]: Embedded page fetching
//! - [`config`]: Activity configuration model
//! - [`storage`]: Persistent configuration store
//! - [`haptics`]: Vibration feedback
//! - [`terminal`]: Terminal front-end

pub mod app;
pub mod backends;
pub mod browser;
pub mod config;
pub mod constants;
pub mod errors;
pub mod haptics;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::frame_processor::QrDetection;
pub use app::{AppModel, Effect, Message, Screen};
pub use config::{Activity, ActivityIndex, Configuration, LaunchTarget};
