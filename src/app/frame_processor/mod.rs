// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for async frame analysis
//!
//! This module samples camera frames at intervals and runs QR code
//! detection on them. Decoded payloads are fed to the scan handlers.

pub mod tasks;
pub mod types;

pub use tasks::qr_detector;
pub use types::{FrameRegion, QrDetection};
