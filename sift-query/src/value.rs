//! Raw filter values and their wire encoding.
//!
//! Application code hands any supported Rust value to a comparison method;
//! it is converted into a [`Value`] and then routed through a
//! [`ValueEncoder`], which picks exactly one [`EncodedValue`] arm.
//!
//! | Raw value                 | Encoded arm     |
//! |---------------------------|-----------------|
//! | `&str`, `String`          | `Text`          |
//! | integers                  | `Int`           |
//! | `f32`, `f64`              | `Number`        |
//! | `bool`                    | `Bool`          |
//! | `Uuid`                    | `Text` (lowercase hyphenated) |
//! | `DateTime<Tz>`            | `Text` (RFC 3339, UTC) |
//! | `GeoRange`                | `Geo`           |
//! | sequences of the above    | `*Array`        |
//!
//! ```rust
//! use sift_query::{EncodedValue, Value, ValueEncoder};
//!
//! let encoder = ValueEncoder::default();
//! assert_eq!(encoder.encode(Value::from(42)).unwrap(), EncodedValue::Int(42));
//! assert_eq!(
//!     encoder.encode(Value::from(vec!["a", "b"])).unwrap(),
//!     EncodedValue::TextArray(vec!["a".into(), "b".into()]),
//! );
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FilterError, FilterResult};

/// A raw value supplied by the caller, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null. Has no encoding; use `is_null` to test for nulls.
    Null,
    /// Text value.
    Text(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Double(f64),
    /// Boolean value.
    Bool(bool),
    /// UUID value.
    Uuid(Uuid),
    /// Point in time, normalised to UTC.
    Date(DateTime<Utc>),
    /// Geo range constraint.
    Geo(GeoRange),
    /// Sequence of values.
    List(Vec<Value>),
}

/// The kind of a raw [`Value`], used for homogeneity checks and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Null`]
    Null,
    /// [`Value::Text`]
    Text,
    /// [`Value::Int`]
    Int,
    /// [`Value::Double`]
    Double,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Uuid`]
    Uuid,
    /// [`Value::Date`]
    Date,
    /// [`Value::Geo`]
    Geo,
    /// [`Value::List`]
    List,
}

impl ValueKind {
    /// Lowercase name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text => "text",
            Self::Int => "int",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Geo => "geo range",
            Self::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Get the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Text(_) => ValueKind::Text,
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
            Self::Uuid(_) => ValueKind::Uuid,
            Self::Date(_) => ValueKind::Date,
            Self::Geo(_) => ValueKind::Geo,
            Self::List(_) => ValueKind::List,
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this is a sequence value.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Self::Date(v.with_timezone(&Utc))
    }
}

impl From<GeoRange> for Value {
    fn from(v: GeoRange) -> Self {
        Self::Geo(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Self::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A geo range constraint: coordinates within `distance` meters of a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRange {
    /// Latitude of the center point.
    pub latitude: f32,
    /// Longitude of the center point.
    pub longitude: f32,
    /// Maximum distance from the center point, in meters.
    pub distance: f32,
}

impl GeoRange {
    /// Create a new geo range.
    pub fn new(latitude: f32, longitude: f32, distance: f32) -> Self {
        Self {
            latitude,
            longitude,
            distance,
        }
    }
}

/// An encoded value: exactly one wire value slot.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    /// Text value.
    Text(String),
    /// Text array.
    TextArray(Vec<String>),
    /// Integer value.
    Int(i64),
    /// Integer array.
    IntArray(Vec<i64>),
    /// Floating point value.
    Number(f64),
    /// Floating point array.
    NumberArray(Vec<f64>),
    /// Boolean value.
    Bool(bool),
    /// Boolean array.
    BoolArray(Vec<bool>),
    /// Geo range.
    Geo(GeoRange),
}

impl EncodedValue {
    /// Check if this is one of the array arms.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::TextArray(_) | Self::IntArray(_) | Self::NumberArray(_) | Self::BoolArray(_)
        )
    }

    /// Number of elements for array arms, `None` for scalars.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Self::TextArray(v) => Some(v.len()),
            Self::IntArray(v) => Some(v.len()),
            Self::NumberArray(v) => Some(v.len()),
            Self::BoolArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Name of the arm, as used in error messages.
    pub fn arm_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::TextArray(_) => "text array",
            Self::Int(_) => "int",
            Self::IntArray(_) => "int array",
            Self::Number(_) => "number",
            Self::NumberArray(_) => "number array",
            Self::Bool(_) => "bool",
            Self::BoolArray(_) => "bool array",
            Self::Geo(_) => "geo range",
        }
    }
}

impl fmt::Display for EncodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{:?}", v),
            Self::TextArray(v) => write!(f, "{:?}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::IntArray(v) => write!(f, "{:?}", v),
            Self::Number(v) => write!(f, "{}", v),
            Self::NumberArray(v) => write!(f, "{:?}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::BoolArray(v) => write!(f, "{:?}", v),
            Self::Geo(g) => write!(
                f,
                "{}m of ({}, {})",
                g.distance, g.latitude, g.longitude
            ),
        }
    }
}

/// Fractional-second precision of encoded timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    /// As many digits as needed (0, 3, 6, or 9).
    #[default]
    Auto,
    /// Whole seconds.
    Seconds,
    /// Milliseconds.
    Millis,
    /// Microseconds.
    Micros,
    /// Nanoseconds.
    Nanos,
}

impl TimestampPrecision {
    fn seconds_format(self) -> SecondsFormat {
        match self {
            Self::Auto => SecondsFormat::AutoSi,
            Self::Seconds => SecondsFormat::Secs,
            Self::Millis => SecondsFormat::Millis,
            Self::Micros => SecondsFormat::Micros,
            Self::Nanos => SecondsFormat::Nanos,
        }
    }
}

/// Converts raw values into encoded wire values.
///
/// The encoder is stateless apart from its timestamp precision and can be
/// shared freely between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueEncoder {
    precision: TimestampPrecision,
}

impl ValueEncoder {
    /// Create an encoder with the given timestamp precision.
    pub fn new(precision: TimestampPrecision) -> Self {
        Self { precision }
    }

    /// Get the timestamp precision.
    pub fn precision(&self) -> TimestampPrecision {
        self.precision
    }

    /// Encode a raw value into exactly one wire value arm.
    pub fn encode(&self, value: Value) -> FilterResult<EncodedValue> {
        match value {
            Value::Text(v) => Ok(EncodedValue::Text(v)),
            Value::Int(v) => Ok(EncodedValue::Int(v)),
            Value::Double(v) => finite(v).map(EncodedValue::Number),
            Value::Bool(v) => Ok(EncodedValue::Bool(v)),
            Value::Uuid(v) => Ok(EncodedValue::Text(encode_uuid(&v))),
            Value::Date(v) => Ok(EncodedValue::Text(self.encode_date(&v))),
            Value::Geo(v) => finite_geo(v).map(EncodedValue::Geo),
            Value::Null => Err(FilterError::unsupported_value(
                ValueKind::Null,
                "null has no encoding, use is_null to match missing values",
            )),
            Value::List(items) => self.encode_list(items),
        }
    }

    /// Encode a date as RFC 3339 text in UTC.
    pub fn encode_date(&self, date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(self.precision.seconds_format(), true)
    }

    fn encode_list(&self, items: Vec<Value>) -> FilterResult<EncodedValue> {
        let Some(first) = items.first().map(Value::kind) else {
            return Ok(EncodedValue::TextArray(Vec::new()));
        };

        if matches!(first, ValueKind::Null | ValueKind::Geo | ValueKind::List) {
            return Err(FilterError::unsupported_value(
                first,
                "cannot be used as an array element",
            ));
        }

        if let Some((index, found)) = items
            .iter()
            .map(Value::kind)
            .enumerate()
            .find(|(_, kind)| *kind != first)
        {
            return Err(FilterError::type_mismatch(first, found, index));
        }

        let encoded = match first {
            ValueKind::Int => EncodedValue::IntArray(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Int(i) => Some(i),
                        _ => None,
                    })
                    .collect(),
            ),
            ValueKind::Double => EncodedValue::NumberArray(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Double(d) => Some(finite(d)),
                        _ => None,
                    })
                    .collect::<FilterResult<_>>()?,
            ),
            ValueKind::Bool => EncodedValue::BoolArray(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Bool(b) => Some(b),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => EncodedValue::TextArray(
                items
                    .into_iter()
                    .filter_map(|v| self.text_form(v))
                    .collect(),
            ),
        };
        Ok(encoded)
    }

    fn text_form(&self, value: Value) -> Option<String> {
        match value {
            Value::Text(s) => Some(s),
            Value::Uuid(u) => Some(encode_uuid(&u)),
            Value::Date(d) => Some(self.encode_date(&d)),
            _ => None,
        }
    }
}

/// NaN and infinities have no JSON form.
fn finite(v: f64) -> FilterResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FilterError::unsupported_value(
            ValueKind::Double,
            "non-finite numbers have no wire encoding",
        ))
    }
}

fn finite_geo(range: GeoRange) -> FilterResult<GeoRange> {
    let fields = [range.latitude, range.longitude, range.distance];
    if fields.iter().all(|v| v.is_finite()) {
        Ok(range)
    } else {
        Err(FilterError::unsupported_value(
            ValueKind::Geo,
            "geo ranges need finite coordinates and distance",
        ))
    }
}

fn encode_uuid(id: &Uuid) -> String {
    id.hyphenated().to_string()
}
