// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front-end
//!
//! Renders the scanner, the activity selector and the embedded page view in
//! the terminal. The loop turns key presses, camera frames and async results
//! into messages for [`AppModel`] and performs the effects it returns.

mod effects;
mod input;
mod widgets;

use crate::app::frame_processor::QrDetection;
use crate::app::frame_processor::qr_detector::QrDetector;
use crate::app::{AppModel, Effect, Message, Screen};
use crate::backends::camera::{self, CameraFrame, CameraPipeline};
use crate::constants::{detection, pipeline, timing};
use crate::errors::CameraError;
use crate::haptics::Haptics;
use crate::storage::ConfigStore;
use effects::{EffectOutcome, EffectRunner};
use input::Action;
use widgets::{CenteredMessage, FrameWidget, PageView, SelectorBar, StatusBar};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Style},
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How long a detection outline stays on screen
const OVERLAY_TTL: Duration = Duration::from_millis(600);

/// Options for the terminal front-end
pub struct TerminalOptions {
    /// Camera path or name to prefer
    pub camera: Option<String>,
    pub store: Arc<dyn ConfigStore>,
}

/// Events delivered to the front-end loop
pub(crate) enum LoopEvent {
    /// A message for the model
    App(Message),
    /// The startup camera request finished
    Camera(Result<CameraPipeline, CameraError>),
    /// A detection pass finished
    Detections(Vec<QrDetection>),
}

/// Front-end state that the model does not care about
#[derive(Default)]
struct ViewState {
    frame: Option<Arc<CameraFrame>>,
    overlay: Vec<QrDetection>,
    overlay_until: Option<Instant>,
    detection_in_flight: bool,
    last_sample: Option<Instant>,
    pulse_until: Option<Instant>,
    page_scroll: u16,
    camera_error: Option<String>,
}

impl ViewState {
    fn pulsing(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    fn overlay(&self, now: Instant) -> &[QrDetection] {
        match self.overlay_until {
            Some(until) if now < until => &self.overlay,
            _ => &[],
        }
    }

    fn sample_due(&self, now: Instant) -> bool {
        !self.detection_in_flight
            && self
                .last_sample
                .is_none_or(|last| now.duration_since(last) >= detection::SAMPLE_INTERVAL)
    }

    fn scroll(&mut self, delta: i32) {
        self.page_scroll = (self.page_scroll as i32 + delta).clamp(0, u16::MAX as i32) as u16;
    }
}

/// Run the terminal front-end until the user quits
pub fn run(options: TerminalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, options, &runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Pending page loads and store writes are one-shot; do not wait on them
    runtime.shutdown_timeout(Duration::from_secs(timing::STOP_TIMEOUT_SECS));

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    options: TerminalOptions,
    runtime: &tokio::runtime::Runtime,
) -> Result<(), Box<dyn std::error::Error>> {
    let (event_tx, mut event_rx) = mpsc::unbounded::<LoopEvent>();
    let (frame_tx, mut frame_rx) = mpsc::channel::<CameraFrame>(pipeline::FRAME_CHANNEL_CAPACITY);

    let haptics = Haptics::detect();
    let runner = EffectRunner::new(
        runtime.handle().clone(),
        event_tx.clone(),
        options.store,
        haptics,
    );
    let detector = Arc::new(QrDetector::new());

    let mut model = AppModel::default();
    let mut view = ViewState::default();
    let mut camera: Option<CameraPipeline> = None;

    // Startup: read the stored configuration and ask for the camera
    runner.load_configuration();
    let camera_tx = event_tx.clone();
    let preferred = options.camera;
    runtime.spawn_blocking(move || {
        let result = camera::request_camera_access(preferred.as_deref(), frame_tx);
        let _ = camera_tx.unbounded_send(LoopEvent::Camera(result));
    });

    loop {
        let now = Instant::now();

        // Drain all available frames to keep only the latest
        while let Ok(frame) = frame_rx.try_recv() {
            view.frame = Some(Arc::new(frame));
        }

        while let Ok(event) = event_rx.try_recv() {
            let message = match event {
                LoopEvent::App(message) => message,
                LoopEvent::Camera(result) => {
                    let granted = match result {
                        Ok(pipeline) => {
                            info!(device = %pipeline.device(), "Scanning with camera");
                            camera = Some(pipeline);
                            true
                        }
                        Err(e) => {
                            error!(error = %e, "No camera access");
                            view.camera_error = Some(e.to_string());
                            false
                        }
                    };
                    Message::PermissionResolved { granted }
                }
                LoopEvent::Detections(detections) => {
                    view.detection_in_flight = false;
                    if !detections.is_empty() {
                        view.overlay = detections.clone();
                        view.overlay_until = Some(Instant::now() + OVERLAY_TTL);
                    }
                    Message::QrDetectionsUpdated {
                        detections,
                        at: Instant::now(),
                    }
                }
            };
            if apply(&mut model, message, &runner, &mut view) {
                return shutdown(camera);
            }
        }

        if let Some(pipeline) = &camera
            && let Some(e) = pipeline.poll_error()
        {
            view.camera_error = Some(e.to_string());
        }

        // Sample a frame for detection while the scanner is showing
        if model.screen() == Screen::Scanner
            && view.sample_due(now)
            && let Some(frame) = view.frame.clone()
        {
            view.detection_in_flight = true;
            view.last_sample = Some(now);
            let detector = detector.clone();
            let tx = event_tx.clone();
            runtime.spawn(async move {
                let detections = detector.detect(frame).await;
                let _ = tx.unbounded_send(LoopEvent::Detections(detections));
            });
        }

        terminal.draw(|f| render(f, &model, &view))?;

        if event::poll(Duration::from_millis(timing::INPUT_POLL_MS))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match input::map_key(&model, key) {
                Some(Action::Quit) => break,
                Some(Action::App(message)) => {
                    if apply(&mut model, message, &runner, &mut view) {
                        break;
                    }
                }
                Some(Action::Scroll(delta)) => view.scroll(delta),
                None => {}
            }
        }
    }

    shutdown(camera)
}

/// Feed a message to the model and run its effects; `true` means exit
fn apply(model: &mut AppModel, message: Message, runner: &EffectRunner, view: &mut ViewState) -> bool {
    for effect in model.update(message) {
        if let Effect::LoadPage(_) = &effect {
            view.page_scroll = 0;
        }
        match runner.run(effect) {
            EffectOutcome::Done => {}
            EffectOutcome::VisualPulse(duration) => {
                view.pulse_until = Some(Instant::now() + duration);
            }
            EffectOutcome::Exit => return true,
        }
    }
    false
}

fn shutdown(camera: Option<CameraPipeline>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(pipeline) = camera {
        pipeline.stop();
    }
    debug!("Terminal front-end finished");
    Ok(())
}

fn render(f: &mut Frame, model: &AppModel, view: &ViewState) {
    let now = Instant::now();
    let [selector_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let screen = model.screen();
    match screen {
        Screen::RequestingPermission => {
            f.render_widget(
                CenteredMessage {
                    text: "REQUESTING CAMERA PERMISSIONS",
                    style: Style::default(),
                },
                main_area,
            );
        }
        Screen::NoCameraAccess => {
            f.render_widget(
                CenteredMessage {
                    text: "NO ACCESS TO CAMERA",
                    style: Style::default().fg(Color::Red),
                },
                main_area,
            );
        }
        Screen::Scanner => {
            f.render_widget(
                FrameWidget {
                    frame: view.frame.as_deref(),
                    detections: view.overlay(now),
                },
                main_area,
            );
        }
        Screen::EmbeddedView => {
            if let Some(page) = model.embedded() {
                f.render_widget(
                    PageView {
                        page,
                        scroll: view.page_scroll,
                    },
                    main_area,
                );
            }
        }
    }

    if matches!(screen, Screen::Scanner | Screen::EmbeddedView) {
        let options = model.selector_options();
        f.render_widget(
            SelectorBar {
                options: &options,
                selected: model.selected(),
            },
            selector_area,
        );
    }

    let message = status_message(model, view, screen);
    f.render_widget(
        StatusBar {
            message: &message,
            highlight: view.pulsing(now),
        },
        status_area,
    );
}

fn status_message(model: &AppModel, view: &ViewState, screen: Screen) -> String {
    let keys = match screen {
        Screen::EmbeddedView => "Esc back | o open in browser | r reload | ↑↓ scroll | q quit",
        Screen::Scanner if model.config().has_activities() => {
            "Tab/←→ or 1-9 activity | Esc/q quit"
        }
        _ => "Esc/q quit",
    };

    let detail = match screen {
        Screen::NoCameraAccess | Screen::Scanner => view
            .camera_error
            .as_deref()
            .or(model.last_status()),
        _ => model.last_status(),
    };

    match detail {
        Some(detail) => format!("{} | {}", detail, keys),
        None => keys.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_waits_for_interval_and_in_flight_detection() {
        let t0 = Instant::now();
        let mut view = ViewState::default();
        assert!(view.sample_due(t0));

        view.last_sample = Some(t0);
        assert!(!view.sample_due(t0 + Duration::from_millis(100)));
        assert!(view.sample_due(t0 + detection::SAMPLE_INTERVAL));

        view.detection_in_flight = true;
        assert!(!view.sample_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_scroll_saturates_at_top() {
        let mut view = ViewState::default();
        view.scroll(3);
        view.scroll(-10);
        assert_eq!(view.page_scroll, 0);
    }

    #[test]
    fn test_overlay_expires() {
        let t0 = Instant::now();
        let view = ViewState {
            overlay: vec![QrDetection::new(
                crate::app::frame_processor::FrameRegion::from_pixels(0, 0, 1, 1, 2, 2),
                "x".into(),
            )],
            overlay_until: Some(t0 + OVERLAY_TTL),
            ..Default::default()
        };
        assert_eq!(view.overlay(t0).len(), 1);
        assert!(view.overlay(t0 + OVERLAY_TTL).is_empty());
    }
}
