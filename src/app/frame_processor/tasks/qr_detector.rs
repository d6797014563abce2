// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate.
//! It converts camera frames to grayscale and searches for QR codes,
//! returning their positions and decoded content.

use crate::app::frame_processor::types::{FrameRegion, QrDetection};
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection::MAX_DIMENSION;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Analyzes camera frames to detect and decode QR codes.
/// Optimized for real-time processing with frame downscaling.
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Detect QR codes in a camera frame
    ///
    /// Runs the CPU-bound work on the blocking pool.
    pub async fn detect(&self, frame: Arc<CameraFrame>) -> Vec<QrDetection> {
        let max_dim = self.max_dimension;

        tokio::task::spawn_blocking(move || detect_sync(&frame, max_dim))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                Vec::new()
            })
    }

    /// Detect QR codes on the calling thread
    pub fn detect_blocking(&self, frame: &CameraFrame) -> Vec<QrDetection> {
        detect_sync(frame, self.max_dimension)
    }
}

/// Synchronous QR detection (runs in blocking task)
fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> Vec<QrDetection> {
    let start = std::time::Instant::now();

    let width = frame.width;
    let height = frame.height;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let (proc_width, proc_height, scale) = if width > max_dimension || height > max_dimension {
        let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
        (
            ((width as f32 / scale) as u32).max(1),
            ((height as f32 / scale) as u32).max(1),
            scale,
        )
    } else {
        (width, height, 1.0)
    };

    let luma = if scale > 1.0 {
        downscale_luma(frame, proc_width, proc_height)
    } else {
        rgba_to_luma(frame)
    };

    let conversion_time = start.elapsed();
    trace!(
        proc_width,
        proc_height,
        scale,
        conversion_ms = conversion_time.as_millis(),
        "Prepared grayscale image for processing"
    );

    let row = proc_width as usize;
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        proc_width as usize,
        proc_height as usize,
        |x, y| luma.get(y * row + x).copied().unwrap_or(0),
    );
    let grids = prepared.detect_grids();

    trace!(
        count = grids.len(),
        detection_ms = (start.elapsed() - conversion_time).as_millis(),
        "QR grid search complete"
    );

    let mut detections = Vec::with_capacity(grids.len());

    for grid in grids {
        let content = match grid.decode() {
            Ok((_meta, content)) => content,
            Err(e) => {
                debug!(error = %e, "Failed to decode QR code");
                continue;
            }
        };

        // Bounding box of the four grid corners
        let xs = grid.bounds.iter().map(|p| p.x);
        let ys = grid.bounds.iter().map(|p| p.y);
        let min_x = xs.clone().min().unwrap_or(0).max(0) as f32;
        let max_x = xs.max().unwrap_or(0).min(proc_width as i32) as f32;
        let min_y = ys.clone().min().unwrap_or(0).max(0) as f32;
        let max_y = ys.max().unwrap_or(0).min(proc_height as i32) as f32;

        // Scale back to original frame coordinates
        let region = FrameRegion::from_pixels(
            (min_x * scale) as u32,
            (min_y * scale) as u32,
            ((max_x - min_x).max(0.0) * scale) as u32,
            ((max_y - min_y).max(0.0) * scale) as u32,
            width,
            height,
        );

        debug!(
            content = %content,
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            "Detected QR code"
        );

        detections.push(QrDetection::new(region, content));
    }

    if !detections.is_empty() {
        debug!(
            count = detections.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found codes"
        );
    }

    detections
}

/// ITU-R BT.601 luma of one RGBA pixel
fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Grayscale copy of the frame without stride padding
fn rgba_to_luma(frame: &CameraFrame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;

    let mut result = Vec::with_capacity(width * height);

    for y in 0..height {
        let row_start = y * stride;
        let row_end = row_start + width * 4;
        let Some(row) = frame.data.get(row_start..row_end) else {
            break;
        };
        result.extend(
            row.chunks_exact(4)
                .map(|px| luma(px[0] as f32, px[1] as f32, px[2] as f32) as u8),
        );
    }

    result
}

/// Downscale the frame to grayscale using bilinear interpolation
fn downscale_luma(frame: &CameraFrame, dst_width: u32, dst_height: u32) -> Vec<u8> {
    let src_width = frame.width as usize;
    let src_height = frame.height as usize;
    let stride = frame.stride as usize;

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let get_luma = |px: usize, py: usize| -> f32 {
        let offset = py * stride + px * 4;
        match frame.data.get(offset..offset + 3) {
            Some(rgb) => luma(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32),
            None => 0.0,
        }
    };

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as usize;
            let y0 = src_y as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let value = get_luma(x0, y0) * (1.0 - x_frac) * (1.0 - y_frac)
                + get_luma(x1, y0) * x_frac * (1.0 - y_frac)
                + get_luma(x0, y1) * (1.0 - x_frac) * y_frac
                + get_luma(x1, y1) * x_frac * y_frac;

            result.push(value as u8);
        }
    }

    result
}
