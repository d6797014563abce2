// SPDX-License-Identifier: MPL-2.0

//! GStreamer pipeline for camera capture
//!
//! Every source is decoded and converted to RGBA before it reaches the
//! appsink, so consumers only ever see one pixel layout.

use super::types::{CameraDevice, CameraFrame, CameraSource, FrameSender};
use crate::constants::{pipeline, timing};
use crate::errors::CameraError;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Running camera pipeline
///
/// Frames are pushed into the sender given to [`CameraPipeline::start`].
/// Dropping the pipeline releases the camera.
pub struct CameraPipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    device: CameraDevice,
}

impl CameraPipeline {
    /// Open `device` and start streaming
    ///
    /// Fails with [`CameraError::AccessDenied`] when the device does not
    /// reach PLAYING in time; this is how a refused camera shows up.
    pub fn start(device: &CameraDevice, frame_sender: FrameSender) -> Result<Self, CameraError> {
        info!(device = %device, "Creating camera pipeline");

        gstreamer::init()?;

        let description = pipeline_description(device);
        info!(pipeline = %description, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| CameraError::InitializationFailed("Not a pipeline".to_string()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| CameraError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| CameraError::InitializationFailed("Failed to cast appsink".to_string()))?;

        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
                    let frame = pull_frame(appsink, frame_num)?;

                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame) {
                        if e.is_disconnected() {
                            return Err(gstreamer::FlowError::Eos);
                        }
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(frame = frame_num, "Frame dropped (channel full)");
                        }
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        let camera = Self {
            pipeline,
            appsink,
            device: device.clone(),
        };

        camera
            .pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| CameraError::AccessDenied(format!("Failed to start pipeline: {}", e)))?;

        let (result, state, pending) = camera.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");

        if let Some(CameraError::PipelineError(message)) = camera.poll_error() {
            return Err(CameraError::AccessDenied(message));
        }
        match result {
            Ok(_) if state == gstreamer::State::Playing => {}
            Ok(gstreamer::StateChangeSuccess::Async) if pending == gstreamer::State::Playing => {
                // Live sources may still be prerolling, frames follow
                debug!("Pipeline still transitioning to PLAYING");
            }
            _ => {
                return Err(CameraError::AccessDenied(format!(
                    "Camera did not start (state {:?})",
                    state
                )));
            }
        }

        info!(device = %device.name, "Camera streaming");
        Ok(camera)
    }

    /// The device this pipeline streams from
    pub fn device(&self) -> &CameraDevice {
        &self.device
    }

    /// First pending error posted on the pipeline bus, if any
    pub fn poll_error(&self) -> Option<CameraError> {
        let bus = self.pipeline.bus()?;
        let message = bus.pop_filtered(&[gstreamer::MessageType::Error])?;
        match message.view() {
            gstreamer::MessageView::Error(err) => {
                let text = err.error().to_string();
                error!(error = %text, debug = ?err.debug(), "Pipeline error");
                Some(CameraError::PipelineError(text))
            }
            _ => None,
        }
    }

    /// Stop the pipeline and wait for the device to be released
    pub fn stop(self) {
        info!("Stopping camera pipeline");
        self.release();
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        if let Err(e) = result {
            debug!(error = ?e, state = ?state, "Pipeline state change had issues");
        }
    }

    fn release(&self) {
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to stop pipeline");
        }
    }
}

impl Drop for CameraPipeline {
    fn drop(&mut self) {
        self.release();
    }
}

/// Pull one sample from the appsink as an RGBA frame
fn pull_frame(appsink: &AppSink, frame_num: u64) -> Result<CameraFrame, gstreamer::FlowError> {
    let captured_at = Instant::now();
    let log_this = frame_num % timing::FRAME_LOG_INTERVAL == 0;

    let sample = appsink.pull_sample().map_err(|e| {
        if log_this {
            error!(frame = frame_num, error = ?e, "Failed to pull sample");
        }
        gstreamer::FlowError::Eos
    })?;

    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
        if log_this {
            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
        }
        return Err(gstreamer::FlowError::Error);
    }

    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
    let video_info = VideoInfo::from_caps(caps).map_err(|e| {
        if log_this {
            error!(frame = frame_num, error = ?e, "Failed to get video info");
        }
        gstreamer::FlowError::Error
    })?;

    let map = buffer
        .map_readable()
        .map_err(|_| gstreamer::FlowError::Error)?;

    if log_this {
        debug!(
            frame = frame_num,
            width = video_info.width(),
            height = video_info.height(),
            stride = video_info.stride()[0],
            latency_us = captured_at.elapsed().as_micros(),
            "Frame received"
        );
    }

    Ok(CameraFrame {
        width: video_info.width(),
        height: video_info.height(),
        data: Arc::from(map.as_slice()),
        stride: video_info.stride()[0].max(0) as u32,
        captured_at,
    })
}

/// `gst-launch` description for a device
fn pipeline_description(device: &CameraDevice) -> String {
    let source = match device.source {
        CameraSource::PipeWire => format!(
            "pipewiresrc {}do-timestamp=true",
            pipewire_target_property(&device.path)
        ),
        CameraSource::V4l2 => format!("v4l2src device={}", device.path),
    };

    format!(
        "{} ! decodebin ! videoconvert ! videoscale ! \
         video/x-raw,format={},width=(int)[1,{}],height=(int)[1,{}] ! \
         appsink name=sink",
        source,
        pipeline::OUTPUT_FORMAT,
        pipeline::CAPTURE_WIDTH,
        pipeline::CAPTURE_HEIGHT
    )
}

/// `pipewiresrc` property selecting the device, with trailing space
fn pipewire_target_property(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else if let Some(serial) = path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(node_id) = path.strip_prefix("pipewire-") {
        format!("target-object={} ", node_id)
    } else if path.starts_with("/dev/video") {
        format!("path=v4l2:{} ", path)
    } else {
        format!("path={} ", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipewire_target_property() {
        assert_eq!(pipewire_target_property(""), "");
        assert_eq!(
            pipewire_target_property("pipewire-serial-2146"),
            "target-object=2146 "
        );
        assert_eq!(pipewire_target_property("pipewire-76"), "target-object=76 ");
        assert_eq!(
            pipewire_target_property("/dev/video0"),
            "path=v4l2:/dev/video0 "
        );
    }

    #[test]
    fn test_pipeline_description_ends_in_rgba_appsink() {
        let device = CameraDevice {
            name: "USB".to_string(),
            path: "/dev/video2".to_string(),
            source: CameraSource::V4l2,
        };
        let description = pipeline_description(&device);
        assert!(description.starts_with("v4l2src device=/dev/video2 ! decodebin"));
        assert!(description.contains("format=RGBA"));
        assert!(description.ends_with("appsink name=sink"));

        let default = pipeline_description(&CameraDevice::pipewire_default());
        assert!(default.starts_with("pipewiresrc do-timestamp=true !"));
    }
}
