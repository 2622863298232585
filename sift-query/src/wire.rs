//! The canonical wire message handed to the remote query engine.
//!
//! Field names serialize in camelCase and unset fields are omitted, so a
//! compiled leaf renders as:
//!
//! ```json
//! {
//!   "operator": "EQUAL",
//!   "target": { "singleTarget": { "on": "r1", "target": { "property": "p" } } },
//!   "valueText": "v"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::operator::Operator;
use crate::value::{EncodedValue, GeoRange};

/// Operator enumeration of the wire format.
///
/// Discriminants are the engine's enumeration values; `0` (unspecified) is
/// never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum WireOperator {
    Equal = 1,
    NotEqual = 2,
    GreaterThan = 3,
    GreaterThanEqual = 4,
    LessThan = 5,
    LessThanEqual = 6,
    And = 7,
    Or = 8,
    WithinGeoRange = 9,
    Like = 10,
    IsNull = 11,
    ContainsAny = 12,
    ContainsAll = 13,
    ContainsNone = 14,
    Not = 15,
}

impl WireOperator {
    /// Numeric enumeration value.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Look up an operator by its enumeration value.
    pub fn from_code(code: i32) -> Option<Self> {
        let op = match code {
            1 => Self::Equal,
            2 => Self::NotEqual,
            3 => Self::GreaterThan,
            4 => Self::GreaterThanEqual,
            5 => Self::LessThan,
            6 => Self::LessThanEqual,
            7 => Self::And,
            8 => Self::Or,
            9 => Self::WithinGeoRange,
            10 => Self::Like,
            11 => Self::IsNull,
            12 => Self::ContainsAny,
            13 => Self::ContainsAll,
            14 => Self::ContainsNone,
            15 => Self::Not,
            _ => return None,
        };
        Some(op)
    }
}

impl From<Operator> for WireOperator {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Equal => Self::Equal,
            Operator::NotEqual => Self::NotEqual,
            Operator::GreaterThan => Self::GreaterThan,
            Operator::GreaterThanOrEqual => Self::GreaterThanEqual,
            Operator::LessThan => Self::LessThan,
            Operator::LessThanOrEqual => Self::LessThanEqual,
            Operator::ContainsAny => Self::ContainsAny,
            Operator::ContainsAll => Self::ContainsAll,
            Operator::ContainsNone => Self::ContainsNone,
            Operator::And => Self::And,
            Operator::Or => Self::Or,
            Operator::Not => Self::Not,
            Operator::Like => Self::Like,
            Operator::IsNull => Self::IsNull,
            Operator::WithinGeoRange => Self::WithinGeoRange,
        }
    }
}

/// Nested target representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireTarget {
    /// A property by name.
    Property(String),
    /// A hop through a reference.
    SingleTarget(Box<SingleTarget>),
    /// A hop through a reference, restricted to one target collection.
    MultiTarget(Box<MultiTarget>),
    /// Reference count.
    Count(ReferenceCount),
}

/// Reference hop wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleTarget {
    /// Reference property name.
    pub on: String,
    /// Target behind the reference.
    pub target: WireTarget,
}

/// Reference hop wrapper with a target collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTarget {
    /// Reference property name.
    pub on: String,
    /// Target behind the reference.
    pub target: WireTarget,
    /// Collection the reference must point into.
    pub target_collection: String,
}

/// Reference count target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCount {
    /// Reference property name.
    pub on: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextArray {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntArray {
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberArray {
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanArray {
    pub values: Vec<bool>,
}

/// Geo range as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinatesFilter {
    pub latitude: f32,
    pub longitude: f32,
    pub distance: f32,
}

impl From<GeoRange> for GeoCoordinatesFilter {
    fn from(range: GeoRange) -> Self {
        Self {
            latitude: range.latitude,
            longitude: range.longitude,
            distance: range.distance,
        }
    }
}

/// One compiled filter node.
///
/// Leaves set `target` and exactly one `value_*` field; combinators set only
/// `filters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFilter {
    pub operator: WireOperator,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<WireTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<WireFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text_array: Option<TextArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int_array: Option<IntArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean_array: Option<BooleanArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number_array: Option<NumberArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_geo: Option<GeoCoordinatesFilter>,
}

impl WireFilter {
    /// Create a node with no target, value, or children.
    pub fn new(operator: WireOperator) -> Self {
        Self {
            operator,
            target: None,
            filters: Vec::new(),
            value_text: None,
            value_int: None,
            value_boolean: None,
            value_number: None,
            value_text_array: None,
            value_int_array: None,
            value_boolean_array: None,
            value_number_array: None,
            value_geo: None,
        }
    }

    /// Populate the value field matching the encoded arm.
    pub fn set_value(&mut self, value: EncodedValue) {
        match value {
            EncodedValue::Text(v) => self.value_text = Some(v),
            EncodedValue::TextArray(values) => self.value_text_array = Some(TextArray { values }),
            EncodedValue::Int(v) => self.value_int = Some(v),
            EncodedValue::IntArray(values) => self.value_int_array = Some(IntArray { values }),
            EncodedValue::Number(v) => self.value_number = Some(v),
            EncodedValue::NumberArray(values) => {
                self.value_number_array = Some(NumberArray { values })
            }
            EncodedValue::Bool(v) => self.value_boolean = Some(v),
            EncodedValue::BoolArray(values) => {
                self.value_boolean_array = Some(BooleanArray { values })
            }
            EncodedValue::Geo(range) => self.value_geo = Some(range.into()),
        }
    }

    /// Names of the populated value fields, in wire naming.
    pub fn value_fields(&self) -> Vec<&'static str> {
        [
            ("valueText", self.value_text.is_some()),
            ("valueInt", self.value_int.is_some()),
            ("valueBoolean", self.value_boolean.is_some()),
            ("valueNumber", self.value_number.is_some()),
            ("valueTextArray", self.value_text_array.is_some()),
            ("valueIntArray", self.value_int_array.is_some()),
            ("valueBooleanArray", self.value_boolean_array.is_some()),
            ("valueNumberArray", self.value_number_array.is_some()),
            ("valueGeo", self.value_geo.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Recover the encoded value from the populated field.
    pub fn value(&self) -> Option<EncodedValue> {
        if let Some(v) = &self.value_text {
            return Some(EncodedValue::Text(v.clone()));
        }
        if let Some(v) = self.value_int {
            return Some(EncodedValue::Int(v));
        }
        if let Some(v) = self.value_boolean {
            return Some(EncodedValue::Bool(v));
        }
        if let Some(v) = self.value_number {
            return Some(EncodedValue::Number(v));
        }
        if let Some(v) = &self.value_text_array {
            return Some(EncodedValue::TextArray(v.values.clone()));
        }
        if let Some(v) = &self.value_int_array {
            return Some(EncodedValue::IntArray(v.values.clone()));
        }
        if let Some(v) = &self.value_boolean_array {
            return Some(EncodedValue::BoolArray(v.values.clone()));
        }
        if let Some(v) = &self.value_number_array {
            return Some(EncodedValue::NumberArray(v.values.clone()));
        }
        self.value_geo
            .map(|g| EncodedValue::Geo(GeoRange::new(g.latitude, g.longitude, g.distance)))
    }

    /// Render as a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Render as a JSON value.
    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
