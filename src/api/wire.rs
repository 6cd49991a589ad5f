//! Protobuf-JSON field conventions
//!
//! The API encodes 64-bit integers as JSON strings (and accepts numbers),
//! durations as `"<seconds>s"` and wrapper types as bare values. Messages
//! shared by several service families live here as well.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// CIDR block with an optional comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CidrBlock {
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Cluster access rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Access {
    pub ipv4_cidr_blocks: Vec<CidrBlock>,
    pub ipv6_cidr_blocks: Vec<CidrBlock>,
    pub data_services: Vec<String>,
}

/// `int64` fields: written as strings, read from either strings or numbers
pub mod int64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// Optional `int64` / `Int64Value` fields
pub mod opt_int64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::int64::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::int64")] i64);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|w| w.0))
    }
}

/// Encode a duration as `google.protobuf.Duration` JSON
pub fn duration_to_wire(duration: Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else {
        let frac = format!("{:09}", nanos);
        format!("{}.{}s", duration.as_secs(), frac.trim_end_matches('0'))
    }
}

/// Decode a `google.protobuf.Duration` JSON string
pub fn duration_from_wire(value: &str) -> Option<Duration> {
    let secs = value.strip_suffix('s')?;
    let (whole, frac) = match secs.split_once('.') {
        Some((w, f)) => (w, f),
        None => (secs, ""),
    };
    let whole: u64 = whole.parse().ok()?;
    if frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let nanos: u32 = if frac.is_empty() {
        0
    } else {
        format!("{:0<9}", frac).parse().ok()?
    };
    Some(Duration::new(whole, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Volume {
        #[serde(with = "int64")]
        size: i64,
        #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
    }

    #[test]
    fn test_int64_accepts_string_and_number() {
        let a: Volume = serde_json::from_str(r#"{"size":"34359738368"}"#).unwrap();
        let b: Volume = serde_json::from_str(r#"{"size":34359738368,"limit":"7"}"#).unwrap();
        assert_eq!(a.size, 34359738368);
        assert_eq!(b.limit, Some(7));
    }

    #[test]
    fn test_int64_written_as_string() {
        let json = serde_json::to_value(Volume { size: 10, limit: None }).unwrap();
        assert_eq!(json, serde_json::json!({"size": "10"}));
    }

    #[test]
    fn test_duration_wire_format() {
        assert_eq!(duration_to_wire(Duration::from_secs(3600)), "3600s");
        assert_eq!(duration_to_wire(Duration::from_millis(1500)), "1.5s");
        assert_eq!(duration_from_wire("3600s"), Some(Duration::from_secs(3600)));
        assert_eq!(duration_from_wire("0.25s"), Some(Duration::from_millis(250)));
        assert_eq!(duration_from_wire("1h"), None);
    }
}
