//! Per-session client configuration.

use serde::{Deserialize, Serialize};

/// The web client version sent when the caller doesn't resolve a fresher one.
pub const DEFAULT_CLIENT_VERSION: &str = "2.20200214.04.00";

/// Value of the client name header for the desktop web client.
pub const DEFAULT_CLIENT_NAME: &str = "1";

/// How the extractor identifies itself to YouTube, resolved once per extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Sent as `X-YouTube-Client-Name`.
    pub client_name: String,
    /// Sent as `X-YouTube-Client-Version`.
    pub client_version: String,
    pub localization: Localization,
    pub refetch_policy: RefetchPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            localization: Localization::default(),
            refetch_policy: RefetchPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// The headers every request in the channel flow must carry.
    pub fn client_headers(&self) -> [(&'static str, &str); 2] {
        [
            ("X-YouTube-Client-Name", self.client_name.as_str()),
            ("X-YouTube-Client-Version", self.client_version.as_str()),
        ]
    }
}

/// Content language and region requested from YouTube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localization {
    /// ISO 639 language code, e.g. `en`.
    pub language: String,
    /// ISO 3166 country code, e.g. `US`.
    pub country: Option<String>,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            country: Some("US".to_string()),
        }
    }
}

impl Localization {
    /// The language tag, e.g. `en-US`, as used in `Accept-Language`.
    pub fn language_tag(&self) -> String {
        match &self.country {
            Some(country) => format!("{}-{}", self.language, country),
            None => self.language.clone(),
        }
    }
}

/// Whether continuation pages re-fetch the channel document first.
///
/// Continuation responses don't include the channel name or URL, which every item needs.
/// [`RefetchPolicy::Always`] reads them from a freshly fetched document each time at the cost
/// of one extra request per page; [`RefetchPolicy::ReuseDocument`] reads them from the
/// document already held, and only fetches when there is none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefetchPolicy {
    #[default]
    Always,
    ReuseDocument,
}
