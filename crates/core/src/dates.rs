//! Conversion between server date strings and `chrono` values.
//!
//! The backend sends instants as RFC 3339 strings (`2016-10-19T08:30:00Z`) and calendar
//! dates as `YYYY-MM-DD`. Older payloads carry instants without an offset; those are
//! read as UTC. A blank string is an absent value, not an error.
//!
//! Entity structs attach the serde adapters in [`date_time`] and [`local_date`] to their
//! date fields, so decoding a response converts every date-valued field in one pass.

use crate::{AdminError, AdminResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a server date-time string.
///
/// Returns `Ok(None)` for an empty or whitespace-only value.
pub fn convert_date_time_from_server(value: &str) -> AdminResult<Option<DateTime<Utc>>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(value, NAIVE_DATE_TIME_FORMAT)
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(|_| AdminError::InvalidDate(value.to_string()))
}

/// Format an instant the way the server expects it.
///
/// Sub-second digits are only written when present, so parsing the result gives back the
/// exact same instant.
pub fn convert_date_time_to_server(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a server `YYYY-MM-DD` string. Returns `Ok(None)` for a blank value.
pub fn convert_local_date_from_server(value: &str) -> AdminResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, LOCAL_DATE_FORMAT)
        .map(Some)
        .map_err(|_| AdminError::InvalidDate(value.to_string()))
}

pub fn convert_local_date_to_server(value: &NaiveDate) -> String {
    value.format(LOCAL_DATE_FORMAT).to_string()
}

/// Serde adapter for `Option<DateTime<Utc>>` fields.
pub mod date_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&super::convert_date_time_to_server(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::convert_date_time_from_server(&raw).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Serde adapter for `Option<NaiveDate>` fields.
pub mod local_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&super::convert_local_date_to_server(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::convert_local_date_from_server(&raw).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
