//! Parsing of the catalog's free-form `expires` field.
//!
//! Catalog files are edited by hand, so the field shows up in several
//! shapes. Anything that cannot be read as an instant yields `None`, and a
//! record with an unreadable expiry is never considered expired.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw `expires` value as it appeared in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Expiry {
    /// A textual date or timestamp.
    Text(String),
    /// Milliseconds since the Unix epoch.
    Millis(f64),
}

impl Expiry {
    /// The instant this expiry denotes, if it can be read.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiry::Text(s) => parse_instant(s),
            Expiry::Millis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            Expiry::Millis(_) => None,
        }
    }
}

/// Shapes produced by `Date.prototype.toString` and friends, with an offset.
const ZONED_FORMATS: &[&str] = &[
    "%a %b %d %Y %H:%M:%S GMT%z",
    "%b %d %Y %H:%M:%S GMT%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%a %b %d %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
];

/// Parse a textual timestamp. Zone-less values are read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = strip_zone_name(raw.trim());
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Drops a trailing `(Coordinated Universal Time)` style zone name.
fn strip_zone_name(s: &str) -> &str {
    match s.rfind(" (") {
        Some(i) if s.ends_with(')') => s[..i].trim_end(),
        _ => s,
    }
}

/// Accepts a string or a non-zero number; any other JSON value is treated as
/// absent. `0` and `""` mean "no expiry".
pub(crate) fn lenient_expiry<'de, D>(deserializer: D) -> Result<Option<Expiry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(Expiry::Text(s)),
        Value::Number(n) => n.as_f64().filter(|ms| *ms != 0.0).map(Expiry::Millis),
        _ => None,
    })
}
