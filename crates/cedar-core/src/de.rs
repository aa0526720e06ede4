//! Lenient deserializers for backend rows.
//!
//! The hosted backend hands us JSON where any column may be `null`, a number
//! may arrive as a string and timestamps come in more than one layout.
//! These helpers turn all of that into defaults instead of errors.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` becomes `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer quantity from a number, a numeric string or `null` (=> 0).
pub(crate) fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let quantity = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    };
    Ok(quantity.unwrap_or(0))
}

/// Timestamp from RFC 3339 or `YYYY-MM-DD HH:MM:SS[.fff]` (taken as UTC).
/// Anything else becomes `None`.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_quantity")]
        quantity: i64,
        #[serde(default, deserialize_with = "lenient_timestamp")]
        created_at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
    }

    #[test]
    fn test_quantity_shapes() {
        let row: Row = serde_json::from_str(r#"{"quantity": 3}"#).unwrap();
        assert_eq!(row.quantity, 3);
        let row: Row = serde_json::from_str(r#"{"quantity": "2"}"#).unwrap();
        assert_eq!(row.quantity, 2);
        let row: Row = serde_json::from_str(r#"{"quantity": null, "name": null}"#).unwrap();
        assert_eq!(row.quantity, 0);
        assert_eq!(row.name, "");
    }

    #[test]
    fn test_timestamp_shapes() {
        let row: Row =
            serde_json::from_str(r#"{"created_at": "2024-03-01T14:05:00.123+00:00"}"#).unwrap();
        assert_eq!(row.created_at.unwrap().hour(), 14);

        let row: Row = serde_json::from_str(r#"{"created_at": "2024-03-01 09:30:00"}"#).unwrap();
        assert_eq!(row.created_at.unwrap().hour(), 9);

        let row: Row = serde_json::from_str(r#"{"created_at": "yesterday"}"#).unwrap();
        assert!(row.created_at.is_none());
    }
}
