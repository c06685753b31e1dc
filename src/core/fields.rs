//! Serde helpers for loosely typed stored fields
//!
//! Stored records may carry optional values as empty strings, numeric
//! values as either numbers or strings, and `null` where a form was saved
//! before a field was filled in. These helpers normalise all of those shapes.
//! Unparseable values become `None` (or empty text) instead of failing the
//! whole collection.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Str(String),
    Int(u64),
    Float(f64),
    Bool(bool),
    Other(IgnoredAny),
}

/// Whole number for a non-negative finite value, dropping any fraction
fn whole(f: f64) -> Option<String> {
    (f.is_finite() && f >= 0.0).then(|| format!("{}", f.trunc() as u64))
}

/// Deserialize `""`, `null`, or a missing field as `None`, anything else via `FromStr`
///
/// Fractional numbers such as `2.5` are truncated to whole numbers before
/// parsing.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<Loose>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(Loose::Str(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .and_then(whole)
                        .and_then(|n| n.parse().ok())
                })
            }
        }
        Some(Loose::Int(n)) => n.to_string().parse().ok(),
        Some(Loose::Float(f)) => whole(f).and_then(|n| n.parse().ok()),
        Some(Loose::Bool(_)) | Some(Loose::Other(_)) => None,
    })
}

/// Like [`empty_as_none`], falling back to `T::default()`
pub fn empty_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    empty_as_none(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize any scalar as text. `null`, lists and objects read as `""`.
pub fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Loose>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Loose::Str(s)) => s,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(f)) => f.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
        Some(Loose::Other(_)) | None => String::new(),
    })
}

/// Serialize an optional value as its `Display` form, or `""` when absent
pub fn display_or_empty<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_str(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::Serialize;

    #[derive(Debug, Deserialize, Serialize)]
    struct Row {
        #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
        weeks: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(default, deserialize_with = "loose_text")]
        name: String,
    }

    #[test]
    fn test_empty_string_is_none() {
        let row: Row = serde_json::from_str(r#"{"date": "", "weeks": ""}"#).unwrap();
        assert!(row.date.is_none());
        assert!(row.weeks.is_none());
    }

    #[test]
    fn test_missing_and_null_are_none() {
        let row: Row = serde_json::from_str(r#"{"weeks": null}"#).unwrap();
        assert!(row.date.is_none());
        assert!(row.weeks.is_none());
    }

    #[test]
    fn test_numbers_as_strings_or_numbers() {
        let row: Row = serde_json::from_str(r#"{"date": "2025-06-30", "weeks": "2"}"#).unwrap();
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(row.weeks, Some(2));

        let row: Row = serde_json::from_str(r#"{"weeks": 3}"#).unwrap();
        assert_eq!(row.weeks, Some(3));
    }

    #[test]
    fn test_garbage_is_none() {
        let row: Row = serde_json::from_str(r#"{"date": "soon", "weeks": "-4"}"#).unwrap();
        assert!(row.date.is_none());
        assert!(row.weeks.is_none());
    }

    #[test]
    fn test_fractional_weeks_truncate() {
        let row: Row = serde_json::from_str(r#"{"weeks": "2.5"}"#).unwrap();
        assert_eq!(row.weeks, Some(2));

        let row: Row = serde_json::from_str(r#"{"weeks": 2.5}"#).unwrap();
        assert_eq!(row.weeks, Some(2));

        let row: Row = serde_json::from_str(r#"{"weeks": -1.5}"#).unwrap();
        assert!(row.weeks.is_none());
    }

    #[test]
    fn test_booleans_and_structures_are_none() {
        let row: Row = serde_json::from_str(r#"{"date": true, "weeks": [1, 2]}"#).unwrap();
        assert!(row.date.is_none());
        assert!(row.weeks.is_none());
    }

    #[test]
    fn test_loose_text() {
        let read = |json: &str| serde_json::from_str::<Named>(json).unwrap().name;
        assert_eq!(read(r#"{"name": "Harbor"}"#), "Harbor");
        assert_eq!(read(r#"{"name": null}"#), "");
        assert_eq!(read(r#"{"name": 8410}"#), "8410");
        assert_eq!(read(r#"{"name": false}"#), "false");
        assert_eq!(read(r#"{"name": {"nested": 1}}"#), "");
    }

    #[test]
    fn test_serializes_empty_for_none() {
        let row = Row {
            date: None,
            weeks: Some(2),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"date":"","weeks":"2"}"#);
    }
}
