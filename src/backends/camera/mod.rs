// SPDX-License-Identifier: MPL-2.0

//! Camera backend
//!
//! Discovers cameras and streams RGBA frames from them through GStreamer.
//!
//! ```text
//! ┌──────────────┐   frames   ┌────────────────┐   detections   ┌──────────┐
//! │CameraPipeline│ ─────────▶ │ frame_processor│ ─────────────▶ │ AppModel │
//! └──────────────┘   (mpsc)   └────────────────┘   (Message)    └──────────┘
//! ```
//!
//! There is no separate permission API on Linux: camera access counts as
//! granted once a pipeline reaches PLAYING.

pub mod enumeration;
pub mod pipeline;
pub mod types;

pub use enumeration::enumerate_cameras;
pub use pipeline::CameraPipeline;
pub use types::*;

use crate::errors::CameraError;
use tracing::{info, warn};

/// Pick the device to open
///
/// `preferred` matches a device path exactly or a name case-insensitively.
/// Without a match every device is a candidate, in enumeration order.
pub fn candidates(devices: Vec<CameraDevice>, preferred: Option<&str>) -> Vec<CameraDevice> {
    let Some(wanted) = preferred else {
        return devices;
    };
    let wanted_lower = wanted.to_lowercase();
    let (matching, rest): (Vec<_>, Vec<_>) = devices
        .into_iter()
        .partition(|d| d.path == wanted || d.name.to_lowercase().contains(&wanted_lower));
    if matching.is_empty() {
        warn!(camera = wanted, "Requested camera not found, trying all");
    }
    matching.into_iter().chain(rest).collect()
}

/// Request camera access by opening the first device that starts streaming
///
/// Blocks for up to the start timeout per device; call from a blocking task.
pub fn request_camera_access(
    preferred: Option<&str>,
    frame_sender: FrameSender,
) -> Result<CameraPipeline, CameraError> {
    let devices = candidates(enumerate_cameras(), preferred);
    if devices.is_empty() {
        return Err(CameraError::NoCameraFound);
    }

    let mut last_error = CameraError::NoCameraFound;
    for device in &devices {
        match CameraPipeline::start(device, frame_sender.clone()) {
            Ok(pipeline) => {
                info!(device = %device, "Camera access granted");
                return Ok(pipeline);
            }
            Err(e) => {
                warn!(device = %device, error = %e, "Camera failed to start");
                last_error = e;
            }
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, path: &str) -> CameraDevice {
        CameraDevice {
            name: name.to_string(),
            path: path.to_string(),
            source: CameraSource::V4l2,
        }
    }

    #[test]
    fn test_candidates_put_preferred_first() {
        let devices = vec![device("Front", "/dev/video0"), device("Rear Camera", "/dev/video2")];

        let picked = candidates(devices.clone(), Some("rear"));
        assert_eq!(picked[0].path, "/dev/video2");
        assert_eq!(picked.len(), 2);

        let picked = candidates(devices.clone(), Some("/dev/video0"));
        assert_eq!(picked[0].name, "Front");

        assert_eq!(candidates(devices.clone(), Some("missing")), devices);
        assert_eq!(candidates(devices.clone(), None), devices);
    }
}
