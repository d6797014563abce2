// SPDX-License-Identifier: GPL-3.0-only

//! Scan payload matcher
//!
//! Activities carry a pattern plus single-letter flags in the style used by
//! web pages (`"gi"`, `"m"`, ...). The flags are translated once, when the
//! configuration is loaded, into [`regex::RegexBuilder`] options.

use regex::{Regex, RegexBuilder};
use std::fmt;
use tracing::warn;

/// Regex options derived from a flag string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
}

impl PatternFlags {
    /// Parse a flag string.
    ///
    /// `g`, `u`, `y` and `d` change iteration or indexing behaviour only and
    /// have no effect on a single match test, so they are accepted and
    /// ignored. Any other letter is rejected.
    pub fn parse(flags: &str) -> Result<Self, char> {
        let mut parsed = Self::default();
        for flag in flags.chars() {
            match flag {
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_matches_new_line = true,
                'g' | 'u' | 'y' | 'd' => {}
                other => return Err(other),
            }
        }
        Ok(parsed)
    }
}

/// Compiled matcher for one activity
///
/// A pattern that fails to compile is kept with the reason but has no
/// matcher; scans tested against it are dropped. Lookaround and
/// backreferences are not supported by the matcher and end up here.
#[derive(Clone)]
pub struct ScanPattern {
    source: String,
    flags: String,
    regex: Result<Regex, String>,
}

impl ScanPattern {
    pub fn new(source: &str, flags: &str) -> Self {
        let regex = compile(source, flags);
        if let Err(reason) = &regex {
            warn!(pattern = %source, flags = %flags, reason = %reason, "Unusable scan pattern");
        }

        Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Why the pattern has no matcher
    pub fn error(&self) -> Option<&str> {
        self.regex.as_ref().err().map(String::as_str)
    }

    /// Test a payload. `None` when there is no usable matcher.
    pub fn test(&self, data: &str) -> Option<bool> {
        self.regex.as_ref().ok().map(|regex| regex.is_match(data))
    }
}

fn compile(source: &str, flags: &str) -> Result<Regex, String> {
    let flags = PatternFlags::parse(flags).map_err(|flag| format!("unsupported flag '{}'", flag))?;

    RegexBuilder::new(source)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_matches_new_line)
        .build()
        .map_err(|e| e.to_string())
}

impl PartialEq for ScanPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Eq for ScanPattern {}

impl fmt::Debug for ScanPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)?;
        if let Err(reason) = &self.regex {
            write!(f, " (unusable: {})", reason)?;
        }
        Ok(())
    }
}
