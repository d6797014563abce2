// SPDX-License-Identifier: GPL-3.0-only

//! Scan configuration
//!
//! A configuration is a list of activities delivered as a JSON QR payload:
//!
//! ```text
//! { "t": "_bc2w-conf", "a": [ { "n": "Stock", "u": "https://x/y", "r": "^\\d+$", "t": "n" } ] }
//! ```
//!
//! The scanned JSON is kept as it was delivered, unknown keys included, and
//! written to the store unchanged. [`Activity`] values are resolved from it
//! leniently: a field of the wrong type counts as absent, numbers and
//! booleans are read as text, and an `a` that is not a list gives no
//! activities. A tagged payload is always a configuration.

pub mod pattern;

use crate::constants::{CONFIG_TAG, defaults};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub use pattern::{PatternFlags, ScanPattern};

/// Wire form of one activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActivityPayload {
    #[serde(rename = "n", deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "u", deserialize_with = "lenient_text")]
    pub url: String,
    #[serde(rename = "p", deserialize_with = "lenient_optional_text")]
    pub param_name: Option<String>,
    #[serde(rename = "r", deserialize_with = "lenient_optional_text")]
    pub regex: Option<String>,
    #[serde(rename = "rf", deserialize_with = "lenient_optional_text")]
    pub regex_flags: Option<String>,
    #[serde(rename = "t", deserialize_with = "lenient_optional_text")]
    pub target: Option<String>,
}

impl ActivityPayload {
    /// Read one entry of the `a` list. Entries that are not objects give an
    /// activity with every field absent, so indices stay aligned.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_optional_text(deserializer).map(Option::unwrap_or_default)
}

/// Where a matched payload is sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchTarget {
    /// In-app page view (`"wv"`)
    #[default]
    EmbeddedView,
    /// The system URL handler (`"n"`)
    External,
}

impl LaunchTarget {
    /// Resolve the wire code. Absent or empty means embedded view; any code
    /// other than `wv` goes to the system handler.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            None | Some("") | Some("wv") => Self::EmbeddedView,
            Some("n") => Self::External,
            Some(other) => {
                warn!(target_code = %other, "Unknown launch target, using external handler");
                Self::External
            }
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::EmbeddedView => "in-app",
            Self::External => "browser",
        }
    }
}

/// An activity with every default resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
    /// Base URL; empty when the payload gave none
    pub url: String,
    pub param_name: String,
    pub pattern: ScanPattern,
    pub target: LaunchTarget,
}

impl Activity {
    pub fn from_payload(payload: &ActivityPayload) -> Self {
        let param_name = non_empty(payload.param_name.as_deref()).unwrap_or(defaults::PARAM_NAME);
        let source = non_empty(payload.regex.as_deref()).unwrap_or(defaults::PATTERN);
        let flags = non_empty(payload.regex_flags.as_deref()).unwrap_or(defaults::PATTERN_FLAGS);

        Self {
            name: payload.name.clone(),
            url: payload.url.clone(),
            param_name: param_name.to_string(),
            pattern: ScanPattern::new(source, flags),
            target: LaunchTarget::from_code(payload.target.as_deref()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Index into the activity list of the configuration it was built from
///
/// Only [`Configuration::activity_index`] and [`ActivityIndex::FIRST`]
/// produce one, so a selection is always in range for a non-empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivityIndex(usize);

impl ActivityIndex {
    pub const FIRST: ActivityIndex = ActivityIndex(0);

    pub fn get(self) -> usize {
        self.0
    }
}

/// A loaded configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    /// The JSON as scanned or stored
    raw: Value,
    activities: Vec<Activity>,
}

impl Configuration {
    pub fn from_value(raw: Value) -> Self {
        let activities = match raw.get("a") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Activity::from_payload(&ActivityPayload::from_value(item)))
                .collect(),
            Some(other) => {
                warn!(value = %other, "Activity list is not a list, using no activities");
                Vec::new()
            }
            None => Vec::new(),
        };
        Self { raw, activities }
    }

    /// Decode a stored blob. The tag is not required here.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(json).map(Self::from_value)
    }

    /// The JSON this configuration was built from, unchanged
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.raw)
    }

    /// A configuration when `data` is JSON carrying the configuration tag
    pub fn from_scan(data: &str) -> Option<Self> {
        let value = serde_json::from_str::<Value>(data).ok()?;
        if value.get("t").and_then(Value::as_str) != Some(CONFIG_TAG) {
            return None;
        }
        Some(Self::from_value(value))
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn has_activities(&self) -> bool {
        !self.activities.is_empty()
    }

    /// Validate a raw index against this configuration
    pub fn activity_index(&self, index: usize) -> Option<ActivityIndex> {
        (index < self.activities.len()).then_some(ActivityIndex(index))
    }

    pub fn activity(&self, index: ActivityIndex) -> Option<&Activity> {
        self.activities.get(index.0)
    }
}
