use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Typed value carried by a match.
///
/// A match keeps the variant it was created with; rules that need a
/// different representation create a new match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value (season, episode, year, ...).
    Int(i64),
    /// Date value, serialized as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Textual value (codec names, titles, ...).
    Str(String),
}

impl Value {
    /// Returns the integer payload, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the textual payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the date payload, if any.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// `true` for empty strings; numbers and dates are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Str(v) if v.is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// Media type of a guess, both as an option hint and as the `type` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Episode,
}

impl MediaType {
    /// Lowercase name used in output maps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Episode => "episode",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Int(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&Value::from("h264")).unwrap(),
            "\"h264\""
        );
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(
            serde_json::to_string(&Value::Date(date)).unwrap(),
            "\"2020-01-02\""
        );
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_str(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::from("").is_empty());
        assert!(!Value::Int(0).is_empty());
    }

    #[test]
    fn media_type_display() {
        assert_eq!(MediaType::Episode.to_string(), "episode");
        assert_eq!(
            serde_json::from_str::<MediaType>("\"movie\"").unwrap(),
            MediaType::Movie
        );
    }
}
