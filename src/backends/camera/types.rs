// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Frame pixel data, shared between the pipeline callback and consumers
pub type FrameData = Arc<[u8]>;

/// Which GStreamer source element drives a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSource {
    /// `pipewiresrc`, the default on desktops and in Flatpak
    PipeWire,
    /// `v4l2src` on a `/dev/video*` node
    V4l2,
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSource::PipeWire => write!(f, "PipeWire"),
            CameraSource::V4l2 => write!(f, "V4L2"),
        }
    }
}

/// A camera device discovered on the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// PipeWire target (`pipewire-serial-N`, `pipewire-N`, empty for the
    /// default camera) or a V4L2 device node
    pub path: String,
    pub source: CameraSource,
}

impl CameraDevice {
    /// PipeWire's own pick of camera
    pub fn pipewire_default() -> Self {
        Self {
            name: "Default Camera (PipeWire)".to_string(),
            path: String::new(),
            source: CameraSource::PipeWire,
        }
    }
}

impl fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} [{}]", self.name, self.source)
        } else {
            write!(f, "{} [{} {}]", self.name, self.source, self.path)
        }
    }
}

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: FrameData,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap a decoded still image, used for scanning image files
    pub fn from_rgba_image(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw()),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }
}

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_rgba_image() {
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let frame = CameraFrame::from_rgba_image(image);
        assert_eq!((frame.width, frame.height, frame.stride), (3, 2, 12));
        assert_eq!(frame.data.len(), 24);
        assert_eq!(&frame.data[..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_device_display() {
        assert_eq!(
            CameraDevice::pipewire_default().to_string(),
            "Default Camera (PipeWire) [PipeWire]"
        );
        let device = CameraDevice {
            name: "USB Cam".to_string(),
            path: "/dev/video0".to_string(),
            source: CameraSource::V4l2,
        };
        assert_eq!(device.to_string(), "USB Cam [V4L2 /dev/video0]");
    }
}
