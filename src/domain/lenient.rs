//! Tolerant decoders for bill records written by other store clients.
//!
//! Browser clients of the bill store write timestamps as epoch-millisecond
//! strings, leave the date blank and write `null` where an amount could not
//! be computed. These decoders accept those shapes next to the canonical ones.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::domain::types::BillDate;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
}

fn from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|at| at.naive_utc())
}

/// Parses an ISO timestamp or epoch milliseconds given as a number or text.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    text.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| text.parse::<i64>().ok().and_then(from_millis))
}

/// `created_at`/`updated_at` in either ISO or epoch-millisecond form.
pub fn timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => from_millis(millis),
        RawTimestamp::Text(text) => parse_timestamp(&text),
    };
    parsed.ok_or_else(|| serde::de::Error::custom("invalid timestamp"))
}

/// A whole number where `null` reads as `0` and fractions are truncated.
pub fn number_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Int(value)) => value,
        Some(RawNumber::Float(value)) => value as i64,
        None => 0,
    })
}

/// A bill date where `null` or blank text means "not set".
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<BillDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => BillDate::parse(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(deserialize_with = "timestamp")]
        at: NaiveDateTime,
        #[serde(default, deserialize_with = "number_or_zero")]
        total: i64,
        #[serde(default, deserialize_with = "optional_date")]
        date: Option<BillDate>,
    }

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 29)
            .unwrap()
            .and_hms_milli_opt(16, 26, 40, 123)
            .unwrap()
    }

    #[test]
    fn timestamps_accept_iso_and_epoch_millis() {
        for raw in [
            r#"{"at":"2024-05-29T16:26:40.123"}"#,
            r#"{"at":"1717000000123"}"#,
            r#"{"at":1717000000123}"#,
        ] {
            let stamped: Stamped = serde_json::from_str(raw).unwrap();
            assert_eq!(stamped.at, expected());
        }
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }

    #[test]
    fn null_numbers_and_blank_dates_are_tolerated() {
        let stamped: Stamped =
            serde_json::from_str(r#"{"at":1717000000123,"total":null,"date":""}"#).unwrap();
        assert_eq!(stamped.total, 0);
        assert_eq!(stamped.date, None);

        let stamped: Stamped =
            serde_json::from_str(r#"{"at":1717000000123,"total":12.0,"date":"01/06/2024"}"#)
                .unwrap();
        assert_eq!(stamped.total, 12);
        assert_eq!(stamped.date.unwrap().to_string(), "01/06/2024");
    }
}
