// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Discriminator carried in the `t` field of a configuration QR payload
pub const CONFIG_TAG: &str = "_bc2w-conf";

/// Key of the persisted configuration slot
pub const CONFIG_STORE_KEY: &str = "config";

/// Substring that, found in a navigated URL, closes the embedded view
pub const CLOSE_COMMAND_MARKER: &str = "barcodetoweb_close_cmd";

/// Application identifier used for directory names
pub const APP_ID: &str = "barcodetoweb";

/// Scan matching defaults, applied when an activity omits a field
pub mod defaults {
    /// Query parameter name used when `p` is omitted
    pub const PARAM_NAME: &str = "data";

    /// Pattern used when `r` is omitted (matches anything)
    pub const PATTERN: &str = "^.*$";

    /// Flags used when `rf` is omitted
    pub const PATTERN_FLAGS: &str = "g";
}

/// Scan debounce and feedback timing
pub mod scan {
    use super::Duration;

    /// Successful detections inside this window after the previous
    /// accepted detection are ignored
    pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(5000);

    /// Vibration pulse for an accepted configuration
    pub const CONFIG_PULSE: Duration = Duration::from_millis(500);

    /// Vibration pulse for a matched data payload
    pub const MATCH_PULSE: Duration = Duration::from_millis(100);
}

/// Frame sampling for QR detection
pub mod detection {
    use super::Duration;

    /// Minimum interval between two QR detection passes
    pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(150);

    /// Frames are downscaled so their longest side is at most this
    pub const MAX_DIMENSION: u32 = 640;

    /// Limit for still images scanned from files
    pub const STILL_MAX_DIMENSION: u32 = 1600;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";

    /// Preferred capture width; scanning gains nothing from larger frames
    pub const CAPTURE_WIDTH: u32 = 1280;

    /// Preferred capture height
    pub const CAPTURE_HEIGHT: u32 = 720;

    /// Frame channel capacity between the pipeline and the front-end
    pub const FRAME_CHANNEL_CAPACITY: usize = 4;
}

/// Timing constants
pub mod timing {
    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Time the camera gets to reach PLAYING before access counts as denied
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Terminal input poll interval (~60 redraws per second)
    pub const INPUT_POLL_MS: u64 = 16;
}

/// Embedded page view limits
pub mod browser {
    /// Redirect hops followed before giving up
    pub const MAX_REDIRECTS: usize = 10;

    /// Characters of page text kept for display
    pub const MAX_TEXT_CHARS: usize = 16 * 1024;
}

/// Application information utilities
pub mod app_info {
    use std::path::Path;

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }
}
