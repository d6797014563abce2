// SPDX-License-Identifier: GPL-3.0-only

//! Routing of matched payloads

use crate::config::{Activity, LaunchTarget};
use tracing::warn;
use url::Url;

/// Where a matched payload goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Show the page in the embedded view
    Embedded(Url),
    /// Hand the URL to the system handler
    External(Url),
}

/// Destination URL: the activity's base URL with `param_name=data`
/// appended. Existing query parameters are kept.
///
/// `None` when the activity has no base URL or it does not parse.
pub fn destination_url(activity: &Activity, data: &str) -> Option<Url> {
    if activity.url.is_empty() {
        return None;
    }

    let mut url = match Url::parse(&activity.url) {
        Ok(url) => url,
        Err(e) => {
            warn!(url = %activity.url, error = %e, "Activity URL does not parse");
            return None;
        }
    };
    url.query_pairs_mut().append_pair(&activity.param_name, data);
    Some(url)
}

/// Decide how to dispatch a payload for an activity
pub fn plan(activity: &Activity, data: &str) -> Option<Dispatch> {
    let url = destination_url(activity, data)?;
    Some(match activity.target {
        LaunchTarget::EmbeddedView => Dispatch::Embedded(url),
        LaunchTarget::External => Dispatch::External(url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActivityPayload;

    fn activity(url: &str, param: Option<&str>, target: Option<&str>) -> Activity {
        Activity::from_payload(&ActivityPayload {
            name: "Test".into(),
            url: url.into(),
            param_name: param.map(Into::into),
            target: target.map(Into::into),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_param_name() {
        let url = destination_url(&activity("https://scan.example/in", None, None), "ABC123");
        assert_eq!(
            url.map(String::from).as_deref(),
            Some("https://scan.example/in?data=ABC123")
        );
    }

    #[test]
    fn test_existing_query_is_preserved() {
        let url = destination_url(
            &activity("https://scan.example/in?lang=en", Some("code"), None),
            "ABC123",
        )
        .expect("destination");
        assert_eq!(url.as_str(), "https://scan.example/in?lang=en&code=ABC123");
    }

    #[test]
    fn test_payload_is_encoded() {
        let url = destination_url(&activity("https://scan.example/", None, None), "a b&c=d/é")
            .expect("destination");
        assert_eq!(url.query(), Some("data=a+b%26c%3Dd%2F%C3%A9"));

        let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(decoded, vec![("data".to_string(), "a b&c=d/é".to_string())]);
    }

    #[test]
    fn test_no_base_url_means_no_destination() {
        assert_eq!(destination_url(&activity("", None, None), "ABC"), None);
        assert_eq!(plan(&activity("not a url", None, None), "ABC"), None);
    }

    #[test]
    fn test_plan_follows_target() {
        assert!(matches!(
            plan(&activity("https://a.example", None, Some("wv")), "x"),
            Some(Dispatch::Embedded(_))
        ));
        assert!(matches!(
            plan(&activity("https://a.example", None, Some("n")), "x"),
            Some(Dispatch::External(_))
        ));
    }
}
