// SPDX-License-Identifier: GPL-3.0-only

//! Terminal widgets
//!
//! The camera feed is drawn with Unicode half-block characters for twice the
//! vertical resolution of a character cell.

use crate::app::frame_processor::QrDetection;
use crate::app::selector::SelectorOption;
use crate::app::{EmbeddedPage, PageState};
use crate::backends::camera::types::CameraFrame;
use crate::config::ActivityIndex;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Widget, Wrap},
};

/// Widget that renders a camera frame using half-block characters
///
/// Detected QR codes are outlined on top of the image.
pub struct FrameWidget<'a> {
    pub frame: Option<&'a CameraFrame>,
    pub detections: &'a [QrDetection],
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame.filter(|f| f.width > 0 && f.height > 0) else {
            CenteredMessage {
                text: "Waiting for camera...",
                style: Style::default(),
            }
            .render(area, buf);
            return;
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Fit the frame into the area keeping its aspect ratio; each cell
        // holds two vertical pixels
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            ((h * frame_aspect) as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            (w as u16, (w / frame_aspect / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }

        let image = Rect::new(x_offset, y_offset, display_width, display_height);
        for detection in self.detections {
            outline(detection, image, buf);
        }
    }
}

/// Draw the bounding box of a detection over the image area
fn outline(detection: &QrDetection, image: Rect, buf: &mut Buffer) {
    let b = &detection.bounds;
    let left = image.x + (b.x * image.width as f32) as u16;
    let top = image.y + (b.y * image.height as f32) as u16;
    let right = image.x + ((b.x + b.width) * image.width as f32) as u16;
    let bottom = image.y + ((b.y + b.height) * image.height as f32) as u16;
    let right = right.min(image.right().saturating_sub(1));
    let bottom = bottom.min(image.bottom().saturating_sub(1));

    let style = Style::default().fg(Color::Yellow).bg(Color::Black);
    for x in left..=right {
        for y in [top, bottom] {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char('─').set_style(style);
            }
        }
    }
    for y in top..=bottom {
        for x in [left, right] {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char('│').set_style(style);
            }
        }
    }
}

fn sample_pixel(frame: &CameraFrame, x: u32, y: u32) -> Color {
    let x = x.min(frame.width - 1);
    let y = y.min(frame.height - 1);
    let idx = (y * frame.stride + x * 4) as usize;
    match frame.data.get(idx..idx + 3) {
        Some(rgb) => Color::Rgb(rgb[0], rgb[1], rgb[2]),
        None => Color::Black,
    }
}

/// One line of text centered in an area
pub struct CenteredMessage<'a> {
    pub text: &'a str,
    pub style: Style,
}

impl Widget for CenteredMessage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let width = self.text.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;
        buf.set_stringn(x, y, self.text, area.width as usize, self.style);
    }
}

/// Activity selector strip
///
/// Without activities it shows the prompt to scan a configuration code.
pub struct SelectorBar<'a> {
    pub options: &'a [SelectorOption],
    pub selected: ActivityIndex,
}

impl Widget for SelectorBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = if self.options.is_empty() {
            Line::from(Span::styled(
                "Please Scan a Config QR Code",
                Style::default().add_modifier(Modifier::BOLD),
            ))
        } else {
            let mut spans = vec![Span::raw("Activity: ")];
            for option in self.options {
                let label = format!(" {} {} ", option.index.get() + 1, option.label);
                let style = if option.index == self.selected {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                spans.push(Span::styled(label, style));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        };
        line.render(area, buf);
    }
}

/// The embedded page view
pub struct PageView<'a> {
    pub page: &'a EmbeddedPage,
    pub scroll: u16,
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![Line::from(vec![
            Span::styled("URL ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.page.url.to_string()),
        ])];

        let title = match &self.page.page {
            PageState::Loading => {
                lines.push(Line::from("Loading..."));
                self.page.payload.clone()
            }
            PageState::Failed(error) => {
                lines.push(Line::styled(
                    format!("Failed to load page: {}", error),
                    Style::default().fg(Color::Red),
                ));
                self.page.payload.clone()
            }
            PageState::Loaded(content) => {
                if content.final_url != self.page.url {
                    lines.push(Line::from(format!("  → {}", content.final_url)));
                }
                let status_style = if content.status < 400 {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                };
                lines.push(Line::styled(format!("HTTP {}", content.status), status_style));
                lines.push(Line::from(""));
                lines.extend(Text::raw(content.text.clone()).lines);
                content
                    .title
                    .clone()
                    .unwrap_or_else(|| self.page.payload.clone())
            }
        };

        Paragraph::new(lines)
            .block(Block::bordered().title(format!(" {} ", title)))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    pub message: &'a str,
    /// Highlighted, used as the visual scan cue
    pub highlight: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = if self.highlight {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        buf.set_style(area, style);
        buf.set_stringn(area.x, area.y, self.message, area.width as usize, style);
    }
}
