//! Bind values and parameter type tags.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dialect-neutral bind value.
///
/// Builders never inspect values beyond moving them into [`Query::params`](crate::Query);
/// conversion into a driver's own parameter type is up to the executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
}

impl Value {
    /// Check if this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The type tag a driver would infer for this value.
    pub fn natural_type(&self) -> ParamType {
        match self {
            Self::Null => ParamType::Null,
            Self::Bool(_) => ParamType::Boolean,
            Self::Int(_) | Self::UInt(_) => ParamType::Integer,
            Self::Float(_) => ParamType::Float,
            Self::Text(_) | Self::Uuid(_) => ParamType::String,
            Self::Bytes(_) => ParamType::Binary,
            Self::Json(_) => ParamType::Json,
            Self::Date(_) => ParamType::Date,
            Self::DateTime(_) | Self::Timestamp(_) => ParamType::DateTime,
            #[cfg(feature = "rust_decimal")]
            Self::Decimal(_) => ParamType::Decimal,
        }
    }
}

/// Declared binding type for a parameter position.
///
/// Positions without a tag are bound with the executor's default strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Null,
    Boolean,
    Integer,
    String,
    Binary,
    Json,
    Date,
    DateTime,
    Decimal,
    Float,
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => UInt,
    u16 => UInt,
    u32 => UInt,
    u64 => UInt,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
}

#[cfg(feature = "rust_decimal")]
impl_from_value! {
    rust_decimal::Decimal => Decimal,
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
