//! Serde helpers for `chrono::DateTime<Utc>` fields that live both in
//! MongoDB documents and in JSON responses.
//!
//! The MongoDB driver serializes through a non-human-readable BSON
//! serializer, while JSON responses go through serde_json. Branching on
//! that property stores native BSON datetimes (so `$gte`/`$lte` range
//! filters compare correctly) and renders RFC 3339 strings on the wire.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a client-supplied timestamp: RFC 3339 first, then a bare
/// datetime, then a plain `YYYY-MM-DD` day (taken as UTC midnight).
pub fn parse_client_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub mod datetime {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
        } else {
            mongodb::bson::DateTime::from_chrono(*value).serialize(serializer)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let raw = String::deserialize(deserializer)?;
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        } else {
            Ok(mongodb::bson::DateTime::deserialize(deserializer)?.to_chrono())
        }
    }
}

pub mod datetime_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct Wrap<'a>(&'a DateTime<Utc>);

    impl Serialize for Wrap<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            super::datetime::serialize(self.0, serializer)
        }
    }

    #[derive(Deserialize)]
    struct Unwrap(#[serde(with = "super::datetime")] DateTime<Utc>);

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&Wrap(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Unwrap>::deserialize(deserializer)?.map(|Unwrap(dt)| dt))
    }
}
