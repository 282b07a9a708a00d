use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::PresentationDefaults;
use crate::expiry::{lenient_expiry, Expiry};

/// One entry of the remote license catalog.
///
/// Every field is optional and decoded leniently: a value of the wrong JSON
/// type is treated as absent rather than failing the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_expiry")]
    pub expires: Option<Expiry>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub webhook: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cta_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cta_text: Option<String>,
}

impl LicenseRecord {
    /// Only the exact status `"active"` counts.
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    /// Returns true if the record carries a readable expiry earlier than `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.expires.as_ref().and_then(Expiry::instant),
            Some(at) if at < now
        )
    }

    /// The domain restriction, if one is set.
    pub fn restricted_domain(&self) -> Option<&str> {
        non_empty(&self.domain)
    }

    /// Build the client configuration, filling blanks from `defaults`.
    pub fn to_config(&self, defaults: &PresentationDefaults) -> ClientConfig {
        ClientConfig {
            client: self.client.clone(),
            domain: self.domain.clone(),
            logo: non_empty(&self.logo).map(str::to_owned),
            primary_color: or_default(&self.primary_color, &defaults.primary_color),
            webhook: non_empty(&self.webhook).map(str::to_owned),
            cta_url: or_default(&self.cta_url, &defaults.cta_url),
            cta_text: or_default(&self.cta_text, &defaults.cta_text),
        }
    }
}

/// Presentation config returned to the client on a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub logo: Option<String>,
    pub primary_color: String,
    pub webhook: Option<String>,
    pub cta_url: String,
    pub cta_text: String,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn or_default(field: &Option<String>, fallback: &str) -> String {
    non_empty(field).unwrap_or(fallback).to_owned()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
