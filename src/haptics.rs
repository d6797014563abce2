// SPDX-License-Identifier: GPL-3.0-only

//! Vibration motor control via Linux sysfs
//!
//! Phones running mainline Linux expose the vibration motor as an LED class
//! device (`/sys/class/leds/vibrator`). A pulse of a given length is fired
//! through the `transient` trigger: `duration` in milliseconds, `state` 1 and
//! a write to `activate`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const LEDS_DIR: &str = "/sys/class/leds";

/// A vibration motor discovered via sysfs
#[derive(Debug, Clone)]
pub struct VibratorDevice {
    /// Sysfs path, e.g. `/sys/class/leds/vibrator`
    path: PathBuf,
    /// Directory basename
    name: String,
}

impl VibratorDevice {
    /// Scan a `leds` class directory for writable vibrator entries
    pub fn discover_in(leds_dir: &Path) -> Vec<VibratorDevice> {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            debug!(path = %leds_dir.display(), "Cannot read LED class directory, no vibrator");
            return Vec::new();
        };

        let mut devices = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };

            // Match "vibrator" and "vibrator:*" style names
            if !name_str.starts_with("vibrator") {
                continue;
            }

            let path = entry.path();
            match std::fs::OpenOptions::new()
                .write(true)
                .open(path.join("trigger"))
            {
                Ok(_) => {
                    info!(name = name_str, "Discovered vibration motor");
                    devices.push(VibratorDevice {
                        path,
                        name: name_str.to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Vibrator found but not writable, user may need to be in 'feedbackd' group"
                    );
                }
            }
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    /// Get the device name (e.g. "vibrator")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fire a single pulse of `duration`
    pub fn pulse(&self, duration: Duration) -> io::Result<()> {
        // Selecting the trigger creates the activate/duration/state files
        std::fs::write(self.path.join("trigger"), "transient")?;
        std::fs::write(
            self.path.join("duration"),
            duration.as_millis().to_string(),
        )?;
        std::fs::write(self.path.join("state"), "1")?;
        std::fs::write(self.path.join("activate"), "1")
    }
}

/// Haptic feedback for the scanner
///
/// Without a motor every pulse reports `false`, so the caller can show a
/// visual cue instead.
#[derive(Debug, Clone, Default)]
pub struct Haptics {
    device: Option<VibratorDevice>,
}

impl Haptics {
    /// Use the first vibrator found on the system
    pub fn detect() -> Self {
        Self::from_dir(Path::new(LEDS_DIR))
    }

    /// Use the first vibrator found under `leds_dir`
    pub fn from_dir(leds_dir: &Path) -> Self {
        Self {
            device: VibratorDevice::discover_in(leds_dir).into_iter().next(),
        }
    }

    /// Whether a motor is available
    pub fn available(&self) -> bool {
        self.device.is_some()
    }

    /// Vibrate for `duration`; returns whether the motor fired
    pub fn vibrate(&self, duration: Duration) -> bool {
        let Some(device) = &self.device else {
            debug!(ms = duration.as_millis(), "No vibration motor, skipping pulse");
            return false;
        };
        match device.pulse(duration) {
            Ok(()) => true,
            Err(e) => {
                warn!(device = %device.name, error = %e, "Failed to vibrate");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_leds() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["vibrator", "white:flash"] {
            let led = dir.path().join(name);
            std::fs::create_dir(&led).expect("mkdir");
            std::fs::write(led.join("trigger"), "none").expect("write");
        }
        dir
    }

    #[test]
    fn test_discover_only_vibrators() {
        let dir = fake_leds();
        let devices = VibratorDevice::discover_in(dir.path());
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name(), "vibrator");
    }

    #[test]
    fn test_pulse_writes_transient_trigger() {
        let dir = fake_leds();
        let haptics = Haptics::from_dir(dir.path());
        assert!(haptics.available());
        assert!(haptics.vibrate(Duration::from_millis(500)));

        let led = dir.path().join("vibrator");
        let read = |file: &str| std::fs::read_to_string(led.join(file)).expect("read");
        assert_eq!(read("trigger"), "transient");
        assert_eq!(read("duration"), "500");
        assert_eq!(read("state"), "1");
        assert_eq!(read("activate"), "1");
    }

    #[test]
    fn test_missing_motor_reports_no_pulse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let haptics = Haptics::from_dir(dir.path());
        assert!(!haptics.available());
        assert!(!haptics.vibrate(Duration::from_millis(100)));
    }
}
