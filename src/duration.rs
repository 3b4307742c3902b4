//! Serde support for `Duration` fields in configuration files.
//!
//! Use with `#[serde(with = "lodr::duration")]`. Values serialize as
//! `humantime` strings (`"15s"`, `"1h 30m"`) and deserialize from either such
//! a string or an integer count of nanoseconds.
//!
//! ```rust
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Db {
//!     #[serde(with = "lodr::duration")]
//!     timeout: Duration,
//! }
//!
//! let db: Db = serde_json::from_str(r#"{"timeout": "15s"}"#).unwrap();
//! assert_eq!(db.timeout, Duration::from_secs(15));
//! ```

use serde::{Deserializer, Serializer, de};
use std::{fmt, time::Duration};

pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DurationVisitor)
}

struct DurationVisitor;

impl de::Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a duration string (\"15s\", \"1h 30m\") or a number of nanoseconds")
    }

    fn visit_str<E>(self, value: &str) -> Result<Duration, E>
    where
        E: de::Error,
    {
        humantime::parse_duration(value.trim())
            .map_err(|e| de::Error::custom(format!("invalid duration '{value}': {e}")))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Duration, E>
    where
        E: de::Error,
    {
        Ok(Duration::from_nanos(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Duration, E>
    where
        E: de::Error,
    {
        u64::try_from(value)
            .map(Duration::from_nanos)
            .map_err(|_| de::Error::custom(format!("negative duration: {value}")))
    }
}
