// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Showing the stored activity configuration
//! - Scanning QR codes from an image file

use barcodetoweb::app::frame_processor::qr_detector::QrDetector;
use barcodetoweb::app::{AppModel, Effect, Message, Screen};
use barcodetoweb::backends::camera::enumerate_cameras;
use barcodetoweb::backends::camera::types::CameraFrame;
use barcodetoweb::constants::detection::STILL_MAX_DIMENSION;
use barcodetoweb::constants::scan::DEBOUNCE_WINDOW;
use barcodetoweb::constants::CONFIG_STORE_KEY;
use barcodetoweb::storage::{self, ConfigStore, MemoryConfigStore};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Source: {}", camera.source);
        if !camera.path.is_empty() {
            println!("      Path:   {}", camera.path);
        }
    }

    Ok(())
}

/// Print the stored activity configuration
pub fn show_config(store: &dyn ConfigStore) -> Result<(), Box<dyn std::error::Error>> {
    let Some(config) = storage::load_configuration(store) else {
        println!("No configuration stored. Scan a configuration QR code first.");
        return Ok(());
    };

    if !config.has_activities() {
        println!("Stored configuration has no activities.");
        return Ok(());
    }

    println!("Activities:");
    println!();
    for (index, activity) in config.activities().iter().enumerate() {
        println!("  [{}] {}", index, activity.name);
        println!("      URL:     {}", activity.url);
        println!("      Param:   {}", activity.param_name);
        println!(
            "      Pattern: /{}/{}",
            activity.pattern.source(),
            activity.pattern.flags()
        );
        if let Some(reason) = activity.pattern.error() {
            println!("               unusable, scans are dropped: {}", reason);
            println!("               (lookaround and backreferences are not supported)");
        }
        println!("      Opens:   {}", activity.target.display_name());
    }

    Ok(())
}

/// Decode QR codes in an image and run each payload through the scanner
///
/// `activity` selects the activity to match against (0-based, as printed by
/// the `config` command). With `dry_run` nothing is written or opened.
pub fn scan_image(
    image_path: &Path,
    activity: Option<usize>,
    dry_run: bool,
    store: &dyn ConfigStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(image_path)?.to_rgba8();
    let frame = CameraFrame::from_rgba_image(image);
    let payloads: Vec<String> = QrDetector::with_max_dimension(STILL_MAX_DIMENSION)
        .detect_blocking(&frame)
        .into_iter()
        .map(|d| d.content)
        .collect();

    if payloads.is_empty() {
        println!("No QR codes found in {}", image_path.display());
        return Ok(());
    }
    info!(count = payloads.len(), image = %image_path.display(), "Decoded QR codes");

    // Dry runs work on a copy of the stored slot
    let scratch;
    let store: &dyn ConfigStore = if dry_run {
        scratch = match store.read(CONFIG_STORE_KEY) {
            Ok(Some(raw)) => MemoryConfigStore::with_slot(CONFIG_STORE_KEY, &raw),
            _ => MemoryConfigStore::new(),
        };
        &scratch
    } else {
        store
    };

    let mut model = AppModel::with_configuration(storage::load_configuration(store));
    model.update(Message::PermissionResolved { granted: true });

    if let Some(position) = activity {
        let index = model.config().activity_index(position).ok_or_else(|| {
            format!(
                "Activity {} out of range ({} configured)",
                position,
                model.config().activities().len()
            )
        })?;
        model.update(Message::SelectActivity(index));
    }

    for outcome in process_payloads(&mut model, &payloads, store) {
        match outcome {
            ScanOutcome::Dropped(data) => println!("{}: ignored", data),
            ScanOutcome::ConfigSaved(count) => {
                println!("Configuration with {} activities stored", count)
            }
            ScanOutcome::ConfigNotSaved(e) => println!("Configuration not stored: {}", e),
            ScanOutcome::Embedded(url) => println!("Embedded view: {}", url),
            ScanOutcome::External(url) if dry_run => println!("Would open: {}", url),
            ScanOutcome::External(url) => {
                println!("Opening: {}", url);
                if let Err(e) = open::that_detached(url.as_str()) {
                    warn!(url = %url, error = %e, "Failed to open URL");
                }
            }
        }
    }

    Ok(())
}

/// What scanning one payload led to
#[derive(Debug, Clone, PartialEq)]
enum ScanOutcome {
    Dropped(String),
    ConfigSaved(usize),
    ConfigNotSaved(String),
    Embedded(Url),
    External(Url),
}

/// Feed payloads to the model one debounce window apart
///
/// Each payload is judged on its own: the clock advances past the window
/// and an opened embedded view is closed before the next one.
fn process_payloads(
    model: &mut AppModel,
    payloads: &[String],
    store: &dyn ConfigStore,
) -> Vec<ScanOutcome> {
    let start = model
        .last_detection()
        .map_or_else(Instant::now, |last| last.max(Instant::now()));
    let mut outcomes = Vec::new();

    for (i, data) in payloads.iter().enumerate() {
        let at = start + DEBOUNCE_WINDOW * (i as u32 + 1);
        let effects = model.update(Message::Scanned {
            data: data.clone(),
            at,
        });

        let before = outcomes.len();
        for effect in effects {
            match effect {
                Effect::PersistConfig(config) => {
                    let result = storage::save_configuration(store, &config);
                    outcomes.push(match &result {
                        Ok(()) => ScanOutcome::ConfigSaved(config.activities().len()),
                        Err(e) => ScanOutcome::ConfigNotSaved(e.to_string()),
                    });
                    model.update(Message::ConfigSaved(result));
                }
                Effect::LoadPage(url) => outcomes.push(ScanOutcome::Embedded(url)),
                Effect::OpenExternal(url) => outcomes.push(ScanOutcome::External(url)),
                Effect::Vibrate(_) | Effect::Exit => {}
            }
        }
        if outcomes.len() == before {
            outcomes.push(ScanOutcome::Dropped(data.clone()));
        }

        if model.screen() == Screen::EmbeddedView {
            model.update(Message::Back);
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{"t":"_bc2w-conf","a":[
        {"n":"Inventory","u":"https://inv.example/scan","r":"^ABC\\d+$"},
        {"n":"Lookup","u":"https://lookup.example/q","p":"code","t":"n"}
    ]}"#;

    fn scanner() -> AppModel {
        let mut model = AppModel::default();
        model.update(Message::PermissionResolved { granted: true });
        model
    }

    #[test]
    fn test_config_then_data_in_one_image() {
        let store = MemoryConfigStore::new();
        let mut model = scanner();
        let payloads = vec![CONFIG.to_string(), "ABC1".to_string(), "nope".to_string()];

        let outcomes = process_payloads(&mut model, &payloads, &store);

        let expected = Url::parse("https://inv.example/scan?data=ABC1").expect("url");
        assert_eq!(
            outcomes,
            vec![
                ScanOutcome::ConfigSaved(2),
                ScanOutcome::Embedded(expected),
                ScanOutcome::Dropped("nope".to_string()),
            ]
        );
        assert!(storage::load_configuration(&store).is_some());
    }

    #[test]
    fn test_external_activity_reports_url() {
        let store = MemoryConfigStore::new();
        let mut model = scanner();
        process_payloads(&mut model, &[CONFIG.to_string()], &store);
        let lookup = model.config().activity_index(1).expect("index");
        model.update(Message::SelectActivity(lookup));

        let outcomes = process_payloads(&mut model, &["42".to_string()], &store);
        let expected = Url::parse("https://lookup.example/q?code=42").expect("url");
        assert_eq!(outcomes, vec![ScanOutcome::External(expected)]);
    }

    #[test]
    fn test_store_failure_is_reported() {
        let store = MemoryConfigStore::failing();
        let mut model = scanner();
        let outcomes = process_payloads(&mut model, &[CONFIG.to_string()], &store);
        assert!(matches!(outcomes[0], ScanOutcome::ConfigNotSaved(_)));
    }
}
