//! Literal scalar values carried by query expressions
//!
//! `Scalar` is a tagged union over every primitive the wire format can
//! carry, plus an ordered list variant. Values are captured once when an
//! expression is built and consumed by the compiler's literal lowering,
//! which maps each variant onto exactly one wire payload kind.
//!
//! Temporal values convert to the string forms the execution agent expects:
//! ISO dates, wall-clock times with millisecond precision, and UTC
//! datetimes. Epoch timestamps stay numeric and are constructed explicitly
//! with [`Scalar::timestamp_millis`].

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Rendering of date literals
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rendering of wall-clock time literals, millisecond precision
const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Rendering of UTC datetime literals, millisecond precision
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

// ============================================================================
// Scalar
// ============================================================================

/// A single literal value, or an ordered list of literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    String(String),
    /// Milliseconds since the Unix epoch
    Timestamp(i64),
    /// Ordered list of scalar values
    List(Vec<Scalar>),
}

impl Scalar {
    /// Construct an epoch-timestamp scalar from milliseconds
    ///
    /// Timestamps share their machine representation with `I64`, so they
    /// get an explicit constructor instead of a `From` conversion.
    pub fn timestamp_millis(millis: i64) -> Self {
        Scalar::Timestamp(millis)
    }

    /// True when this scalar holds a list of values
    pub fn is_list(&self) -> bool {
        matches!(self, Scalar::List(_))
    }

    /// Short name of the payload kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::I32(_) => "i32",
            Scalar::I64(_) => "i64",
            Scalar::U32(_) => "u32",
            Scalar::U64(_) => "u64",
            Scalar::F32(_) => "f32",
            Scalar::F64(_) => "f64",
            Scalar::String(_) => "string",
            Scalar::Timestamp(_) => "timestamp",
            Scalar::List(_) => "list",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
            Scalar::String(v) => f.write_str(v),
            Scalar::Timestamp(v) => write!(f, "{v}"),
            Scalar::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Scalar {
    fn from(values: Vec<T>) -> Self {
        Scalar::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::String(value.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveTime> for Scalar {
    fn from(value: NaiveTime) -> Self {
        Scalar::String(value.format(TIME_FORMAT).to_string())
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::String(value.format(DATETIME_FORMAT).to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_primitive_conversions() {
        assert_eq!(Scalar::from(true), Scalar::Bool(true));
        assert_eq!(Scalar::from(42i32), Scalar::I32(42));
        assert_eq!(Scalar::from(42u64), Scalar::U64(42));
        assert_eq!(Scalar::from(1.5f64), Scalar::F64(1.5));
        assert_eq!(Scalar::from("abc"), Scalar::String("abc".to_string()));
    }

    #[test]
    fn test_timestamp_is_distinct_from_i64() {
        let ts = Scalar::timestamp_millis(1_675_285_273_000);
        assert_eq!(ts.kind(), "timestamp");
        assert_ne!(ts, Scalar::I64(1_675_285_273_000));
    }

    #[test]
    fn test_list_preserves_order() {
        let list = Scalar::from(vec!["foo", "bar", "baz"]);
        assert!(list.is_list());
        match list {
            Scalar::List(values) => {
                assert_eq!(values.len(), 3);
                assert_eq!(values[0], Scalar::String("foo".to_string()));
                assert_eq!(values[2], Scalar::String("baz".to_string()));
            }
            other => panic!("expected list scalar, got {other:?}"),
        }
    }

    #[test]
    fn test_date_renders_iso() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
        assert_eq!(Scalar::from(date), Scalar::String("2023-01-01".to_string()));
    }

    #[test]
    fn test_time_renders_with_milliseconds() {
        let time = NaiveTime::from_hms_opt(15, 2, 45).expect("valid time");
        assert_eq!(Scalar::from(time), Scalar::String("15:02:45.000".to_string()));

        let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time");
        assert_eq!(Scalar::from(end), Scalar::String("23:59:59.999".to_string()));
    }

    #[test]
    fn test_datetime_renders_utc_iso() {
        let at = Utc
            .with_ymd_and_hms(2023, 2, 1, 21, 1, 13)
            .single()
            .expect("valid datetime");
        assert_eq!(
            Scalar::from(at),
            Scalar::String("2023-02-01T21:01:13.000Z".to_string())
        );
    }

    #[test]
    fn test_display_is_bare() {
        assert_eq!(Scalar::from("pro").to_string(), "pro");
        assert_eq!(Scalar::from(10i64).to_string(), "10");
        assert_eq!(Scalar::from(vec![1i32, 2, 3]).to_string(), "[1, 2, 3]");
    }
}
