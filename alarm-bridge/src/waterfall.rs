//! Waterfall HTTP client
//!
//! Fetches per-build status JSON from the Buildbot waterfall using HTTP
//! basic auth. The feed is queried for the two most recent builds of each
//! builder (`select=-1&select=-2`); the newer slot that carries result
//! text determines the status.

use crate::types::{BuildStatus, Result};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;

/// Select slots checked for result text, newest first
const SELECT_SLOTS: &[&str] = &["-1", "-2"];

/// One build entry from the waterfall JSON
///
/// The feed returns many more fields per build; only the result text is
/// of interest here.
#[derive(Debug, Clone, Deserialize)]
struct BuildEntry {
    /// Result text, e.g. `["build", "successful"]` or `["failed", "compile"]`
    #[serde(default)]
    text: Option<Vec<String>>,
}

/// Waterfall response: build entries keyed by select index ("-1", "-2")
type WaterfallPayload = HashMap<String, BuildEntry>;

/// Extract the status string from a waterfall payload
///
/// Checks the "-1" slot first, then "-2"; the first slot carrying result
/// text wins. The status is the second text element. Returns `None` when
/// no slot has text, or the winning slot's text is too short.
fn extract_status(payload: &WaterfallPayload) -> Option<String> {
    for slot in SELECT_SLOTS {
        if let Some(text) = payload.get(*slot).and_then(|entry| entry.text.as_ref()) {
            return text.get(1).cloned();
        }
    }
    None
}

/// Blocking client for the waterfall status feed
pub struct WaterfallClient {
    http: reqwest::blocking::Client,
    base_url: String,
    username: String,
    password: String,
}

impl WaterfallClient {
    /// Create a client for the given waterfall
    ///
    /// # Arguments
    /// * `base_url` - waterfall root, e.g. "https://bb.example.org"
    /// * `username` / `password` - HTTP basic-auth credentials
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http: reqwest::blocking::Client::builder().build()?,
            base_url,
            username: username.into(),
            password: password.into(),
        })
    }

    /// Status feed URL for one named builder
    pub fn status_url(&self, build: &str) -> String {
        format!(
            "{}/json/builders/{}/builds?select=-1&select=-2&as_text=1",
            self.base_url, build
        )
    }

    /// Fetch the latest status of one named builder
    ///
    /// # Returns
    /// * `Ok(BuildStatus)` - status extracted from the feed (the status
    ///   field is `None` when the feed had no result text)
    /// * `Err` - on connection failure, HTTP error status, or a body that
    ///   is not the expected JSON shape
    pub fn fetch_status(&self, build: &str) -> Result<BuildStatus> {
        let url = self.status_url(build);
        log::debug!("GET {}", url);

        let payload: WaterfallPayload = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(BuildStatus {
            build: build.to_string(),
            status: extract_status(&payload),
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> WaterfallPayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_extract_status_prefers_newest_slot() {
        let p = payload(serde_json::json!({
            "-1": { "text": ["build", "successful"] },
            "-2": { "text": ["build", "failed"] },
        }));
        assert_eq!(extract_status(&p), Some("successful".to_string()));
    }

    #[test]
    fn test_extract_status_falls_back_to_previous_build() {
        // Newest build still running: no text yet
        let p = payload(serde_json::json!({
            "-1": {},
            "-2": { "text": ["build", "failed"] },
        }));
        assert_eq!(extract_status(&p), Some("failed".to_string()));
    }

    #[test]
    fn test_extract_status_missing_text_everywhere() {
        let p = payload(serde_json::json!({ "-1": {}, "-2": {} }));
        assert_eq!(extract_status(&p), None);

        let p = payload(serde_json::json!({}));
        assert_eq!(extract_status(&p), None);
    }

    #[test]
    fn test_extract_status_short_text_yields_none() {
        // A slot with text wins even when the text is too short to carry
        // a status; the older slot is not consulted.
        let p = payload(serde_json::json!({
            "-1": { "text": ["build"] },
            "-2": { "text": ["build", "successful"] },
        }));
        assert_eq!(extract_status(&p), None);
    }

    #[test]
    fn test_extract_status_ignores_extra_fields() {
        let p = payload(serde_json::json!({
            "-1": {
                "builderName": "full",
                "number": 1204,
                "text": ["build", "successful"],
                "times": [1.0, 2.0],
            },
        }));
        assert_eq!(extract_status(&p), Some("successful".to_string()));
    }

    #[test]
    fn test_status_url() {
        let client =
            WaterfallClient::new("https://bb.example.org/", "user", "secret").unwrap();
        assert_eq!(
            client.status_url("webapp-only"),
            "https://bb.example.org/json/builders/webapp-only/builds?select=-1&select=-2&as_text=1"
        );
    }
}
