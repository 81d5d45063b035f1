//! Types for measure values stored in result crosstabs.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the different kinds of measure values an analyzer can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MetricValue {
    /// A floating-point measure (e.g., mean, variance).
    Double(#[serde(with = "float_repr")] f64),

    /// An integer measure (e.g., row count, null count).
    Long(i64),

    /// A string measure.
    String(String),

    /// A boolean measure.
    Boolean(bool),

    /// A calendar date (e.g., highest date).
    Date(NaiveDate),

    /// A time of day (e.g., lowest time).
    Time(NaiveTime),

    /// A point in time (e.g., mean timestamp).
    DateTime(NaiveDateTime),
}

impl MetricValue {
    /// Checks if the metric value is numeric (Double or Long).
    pub fn is_numeric(&self) -> bool {
        matches!(self, MetricValue::Double(_) | MetricValue::Long(_))
    }

    /// Attempts to get the numeric value as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Double(v) => Some(*v),
            MetricValue::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Attempts to get the value as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Long(v) => Some(*v),
            MetricValue::Double(v) => {
                if v.fract() == 0.0 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Attempts to get the value as a non-negative count.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// Attempts to get the value as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            MetricValue::Date(d) => Some(*d),
            MetricValue::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Attempts to get the value as a time of day.
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            MetricValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Attempts to get the value as a timestamp.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            MetricValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns a human-readable string representation of the metric value.
    pub fn to_string_pretty(&self) -> String {
        match self {
            MetricValue::Double(v) => {
                if v.fract() == 0.0 {
                    format!("{v:.0}")
                } else {
                    format!("{v:.4}")
                }
            }
            MetricValue::Long(v) => v.to_string(),
            MetricValue::String(s) => s.clone(),
            MetricValue::Boolean(b) => b.to_string(),
            MetricValue::Date(d) => d.to_string(),
            MetricValue::Time(t) => t.to_string(),
            MetricValue::DateTime(dt) => dt.to_string(),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_pretty())
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Double(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Long(value)
    }
}

/// Counts saturate at `i64::MAX`.
impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        MetricValue::Long(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        MetricValue::Boolean(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::String(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::String(value.to_string())
    }
}

impl From<NaiveDate> for MetricValue {
    fn from(value: NaiveDate) -> Self {
        MetricValue::Date(value)
    }
}

impl From<NaiveTime> for MetricValue {
    fn from(value: NaiveTime) -> Self {
        MetricValue::Time(value)
    }
}

impl From<NaiveDateTime> for MetricValue {
    fn from(value: NaiveDateTime) -> Self {
        MetricValue::DateTime(value)
    }
}

/// Serde representation for `f64` that also carries NaN and the infinities.
///
/// Finite values stay plain numbers; the rest are written as the strings
/// `"NaN"`, `"inf"` and `"-inf"`, which JSON numbers cannot express.
pub(crate) mod float_repr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "inf";
    const NEG_INFINITY: &str = "-inf";

    pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_sign_positive() {
            serializer.serialize_str(INFINITY)
        } else {
            serializer.serialize_str(NEG_INFINITY)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"a number, \"NaN\", \"inf\" or \"-inf\"",
                )),
            },
        }
    }
    /// The same representation for optional values; `None` stays `null`.
    pub(crate) mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub(crate) fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapped(#[serde(with = "super")] f64);

            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(value)| value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(MetricValue::Long(3).as_f64(), Some(3.0));
        assert_eq!(MetricValue::Double(3.0).as_i64(), Some(3));
        assert_eq!(MetricValue::Double(3.5).as_i64(), None);
        assert_eq!(MetricValue::Long(-1).as_u64(), None);
        assert_eq!(MetricValue::from(7u64), MetricValue::Long(7));
        assert!(!MetricValue::from("x").is_numeric());
    }

    #[test]
    fn test_pretty_printing() {
        assert_eq!(MetricValue::Double(2.0).to_string(), "2");
        assert_eq!(MetricValue::Double(2.5).to_string(), "2.5000");
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(MetricValue::Date(date).to_string(), "2024-01-15");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&MetricValue::Long(5)).unwrap();
        assert_eq!(json, r#"{"type":"Long","value":5}"#);
    }

    #[test]
    fn test_non_finite_doubles_survive_json() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let json = serde_json::to_string(&MetricValue::Double(value)).unwrap();
            let back: MetricValue = serde_json::from_str(&json).unwrap();
            let back = back.as_f64().unwrap();
            if value.is_nan() {
                assert!(back.is_nan());
            } else {
                assert_eq!(back, value);
            }
        }
        let json = serde_json::to_string(&MetricValue::Double(f64::NEG_INFINITY)).unwrap();
        assert_eq!(json, r#"{"type":"Double","value":"-inf"}"#);
        let finite = serde_json::to_string(&MetricValue::Double(1.5)).unwrap();
        assert_eq!(finite, r#"{"type":"Double","value":1.5}"#);
    }

    #[test]
    fn test_unknown_float_text_is_rejected() {
        let err = serde_json::from_str::<MetricValue>(r#"{"type":"Double","value":"huge"}"#);
        assert!(err.is_err());
    }
}
