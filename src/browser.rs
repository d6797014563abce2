// SPDX-License-Identifier: GPL-3.0-only

//! Embedded page view backend
//!
//! Fetches the destination page over HTTP and reduces it to something a
//! terminal can show: status, title and visible text. Every URL the view
//! lands on (the initial request, each redirect hop and the final response)
//! is reported as a navigation so the close-command marker works the same
//! way it does in a real web view.

use crate::constants::{APP_ID, CLOSE_COMMAND_MARKER, browser};
use crate::errors::AppResult;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};
use url::Url;

/// Callback receiving each navigated URL
pub type NavigationReporter = Arc<dyn Fn(&Url) + Send + Sync>;

/// A fetched page, reduced for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// URL after redirects
    pub final_url: Url,
    pub status: u16,
    pub title: Option<String>,
    /// Visible text with markup removed
    pub text: String,
}

/// Fetch a page, reporting navigations as they happen
pub async fn fetch_page(url: Url, report: NavigationReporter) -> AppResult<PageContent> {
    report(&url);

    let policy_report = report.clone();
    let policy = reqwest::redirect::Policy::custom(move |attempt| {
        policy_report(attempt.url());
        if attempt.url().as_str().contains(CLOSE_COMMAND_MARKER) {
            // The view is about to close; no need to load the target
            attempt.stop()
        } else if attempt.previous().len() >= browser::MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    });

    let client = reqwest::Client::builder()
        .redirect(policy)
        .user_agent(format!("{}/{}", APP_ID, crate::constants::app_info::version()))
        .build()?;

    info!(url = %url, "Loading page");
    let response = client.get(url.clone()).send().await?;
    let final_url = response.url().clone();
    let status = response.status().as_u16();
    if final_url != url {
        report(&final_url);
    }

    let body = response.text().await?;
    debug!(url = %final_url, status, bytes = body.len(), "Page loaded");

    Ok(PageContent {
        title: extract_title(&body),
        text: html_to_text(&body, browser::MAX_TEXT_CHARS),
        final_url,
        status,
    })
}

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("static regex")
});
static HIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|head|noscript)\b[^>]*>.*?</(script|style|head|noscript)>")
        .expect("static regex")
});
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(br|/p|/div|/li|/h[1-6]|/tr|/pre|hr)[^>]*>").expect("static regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));
static SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f]+").expect("static regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n+").expect("static regex"));

/// Page title, whitespace collapsed
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let title = SPACES_RE
        .replace_all(&decode_entities(raw).replace('\n', " "), " ")
        .trim()
        .to_string();
    (!title.is_empty()).then_some(title)
}

/// Visible text of an HTML document, at most `max_chars` characters
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let text = HIDDEN_RE.replace_all(html, "");
    let text = BLOCK_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = SPACES_RE.replace_all(&text, " ");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");

    let trimmed: String = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed,
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head><title>  Stock
   Entry &amp; Check </title><style>body { color: red }</style></head>
<body><h1>Item ABC123</h1><script>alert("x")</script>
<p>Quantity:&nbsp;4</p><div>Done</div></body></html>"#;

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(PAGE).as_deref(), Some("Stock Entry & Check"));
        assert_eq!(extract_title("<p>no title</p>"), None);
    }

    #[test]
    fn test_html_to_text_drops_hidden_blocks() {
        let text = html_to_text(PAGE, 1000);
        assert!(text.contains("Item ABC123"));
        assert!(text.contains("Quantity: 4"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_html_to_text_truncates() {
        let text = html_to_text("<p>abcdefghij</p>", 4);
        assert_eq!(text, "abcd…");
    }
}
