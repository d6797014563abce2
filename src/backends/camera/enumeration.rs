// SPDX-License-Identifier: GPL-3.0-only

//! Camera enumeration
//!
//! Cameras are discovered through PipeWire (`pw-cli`) first. Without PipeWire
//! the V4L2 nodes listed in sysfs are used directly.

use super::types::{CameraDevice, CameraSource};
use crate::constants::app_info;
use std::path::Path;
use tracing::{debug, info, warn};

/// Enumerate the cameras usable for scanning
///
/// Falls back to PipeWire's default camera when PipeWire is present but
/// listing nodes fails. Returns an empty list when no source is usable.
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    if let Err(e) = gstreamer::init() {
        warn!(error = %e, "GStreamer init failed");
        return Vec::new();
    }

    if element_available("pipewiresrc") {
        // pw-cli is not part of the Flatpak runtime
        if !app_info::is_flatpak()
            && let Some(cameras) = try_enumerate_with_pw_cli()
        {
            return cameras;
        }
        info!("Using PipeWire auto-selection (default camera)");
        return vec![CameraDevice::pipewire_default()];
    }

    if element_available("v4l2src") {
        let cameras = enumerate_v4l2_nodes(Path::new("/sys/class/video4linux"));
        debug!(count = cameras.len(), "Enumerated V4L2 nodes");
        return cameras;
    }

    warn!("Neither pipewiresrc nor v4l2src is available");
    Vec::new()
}

fn element_available(name: &str) -> bool {
    gstreamer::ElementFactory::find(name).is_some()
}

/// Try to enumerate cameras using pw-cli command
fn try_enumerate_with_pw_cli() -> Option<Vec<CameraDevice>> {
    debug!("Trying pw-cli for camera enumeration");

    let output = std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli command failed");
        return None;
    }

    let cameras = parse_pw_cli_nodes(&String::from_utf8_lossy(&output.stdout));
    if cameras.is_empty() {
        debug!("No cameras found via pw-cli");
        None
    } else {
        debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
        Some(cameras)
    }
}

/// Node being collected while walking `pw-cli ls Node` output
#[derive(Default)]
struct PendingNode {
    id: Option<String>,
    serial: Option<String>,
    name: Option<String>,
    is_video_source: bool,
}

impl PendingNode {
    fn into_device(self) -> Option<CameraDevice> {
        if !self.is_video_source {
            return None;
        }
        let (id, name) = (self.id?, self.name?);

        // Prefer object.serial for target-object, fall back to node ID
        let path = match self.serial {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", id),
        };
        debug!(id = %id, name = %name, path = %path, "Found video camera");

        Some(CameraDevice {
            name,
            path,
            source: CameraSource::PipeWire,
        })
    }
}

/// Parse the video sources out of `pw-cli ls Node` output
fn parse_pw_cli_nodes(stdout: &str) -> Vec<CameraDevice> {
    let mut cameras = Vec::new();
    let mut current = PendingNode::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Node header: "id 76, type PipeWire:Interface:Node/3"
        if let Some(rest) = trimmed.strip_prefix("id ")
            && trimmed.contains("type PipeWire:Interface:Node")
        {
            cameras.extend(std::mem::take(&mut current).into_device());
            current.id = rest.split(',').next().map(|id| id.trim().to_string());
            continue;
        }

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            current.is_video_source = true;
        } else if trimmed.contains("object.serial") {
            current.serial = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.description") {
            current.name = extract_quoted_value(trimmed);
        }
    }
    cameras.extend(current.into_device());

    cameras
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// V4L2 capture nodes listed under a sysfs `video4linux` class directory
fn enumerate_v4l2_nodes(class_dir: &Path) -> Vec<CameraDevice> {
    let Ok(entries) = std::fs::read_dir(class_dir) else {
        debug!(path = %class_dir.display(), "Cannot read V4L2 class directory");
        return Vec::new();
    };

    let mut cameras: Vec<CameraDevice> = entries
        .flatten()
        .filter_map(|entry| {
            let node = entry.file_name().to_str()?.to_string();
            if !node.starts_with("video") {
                return None;
            }
            let name = std::fs::read_to_string(entry.path().join("name"))
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|_| node.clone());
            Some(CameraDevice {
                name,
                path: format!("/dev/{}", node),
                source: CameraSource::V4l2,
            })
        })
        .collect();

    cameras.sort_by(|a, b| a.path.cmp(&b.path));
    cameras
}

#[cfg(test)]
mod tests {
    use super::*;

    const PW_CLI_OUTPUT: &str = r#"	id 31, type PipeWire:Interface:Node/3
 		object.serial = "31"
 		node.description = "Built-in Audio"
 		media.class = "Audio/Sink"
	id 76, type PipeWire:Interface:Node/3
 		object.serial = "2146"
 		node.description = "Laptop Webcam Module (V4L2)"
 		media.class = "Video/Source"
	id 80, type PipeWire:Interface:Node/3
 		node.description = "USB Camera"
 		media.class = "Video/Source"
"#;

    #[test]
    fn test_parse_pw_cli_nodes_keeps_video_sources() {
        let cameras = parse_pw_cli_nodes(PW_CLI_OUTPUT);
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].name, "Laptop Webcam Module (V4L2)");
        assert_eq!(cameras[0].path, "pipewire-serial-2146");
        assert_eq!(cameras[1].name, "USB Camera");
        assert_eq!(cameras[1].path, "pipewire-80");
        assert!(cameras.iter().all(|c| c.source == CameraSource::PipeWire));
    }

    #[test]
    fn test_extract_quoted_value() {
        assert_eq!(
            extract_quoted_value(r#"node.nick = "Webcam""#),
            Some("Webcam".to_string())
        );
        assert_eq!(extract_quoted_value("no quotes"), None);
    }

    #[test]
    fn test_enumerate_v4l2_nodes() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (node, name) in [("video2", "Second"), ("video0", "First")] {
            let path = dir.path().join(node);
            std::fs::create_dir(&path).expect("mkdir");
            std::fs::write(path.join("name"), format!("{}\n", name)).expect("write");
        }
        std::fs::create_dir(dir.path().join("v4l-subdev0")).expect("mkdir");

        let cameras = enumerate_v4l2_nodes(dir.path());
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].path, "/dev/video0");
        assert_eq!(cameras[0].name, "First");
        assert_eq!(cameras[1].source, CameraSource::V4l2);
    }
}
