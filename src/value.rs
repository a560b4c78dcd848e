//! A dynamically-typed element for heterogeneous datasets.
//!
//! Most pipelines should use a concrete element type. `Value` exists for the cases
//! where a single dataset mixes integers, floats, strings and nested lists, and user
//! functions inspect the variant at run time. It is `Eq + Hash + Ord` (floats compare
//! through [`OrderedFloat`]), so a `Value` can also be used as a grouping key.
//!
//! ```
//! use ironspark::Value;
//!
//! let v = Value::from(21);
//! assert_eq!(v.try_int()? * 2, 42);
//! assert!(Value::from("x").try_int().is_err());
//! # anyhow::Result::<()>::Ok(())
//! ```

use anyhow::{Result, bail};
use ordered_float::OrderedFloat;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Tagged union over the primitive shapes a pipeline element can take.
///
/// Serializes untagged, so `Value::Int(4)` is the JSON number `4`. JSON has no NaN or
/// infinity, so serializing a non-finite `Float` is an error rather than a silent `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(serialize_with = "serialize_finite")] OrderedFloat<f64>),
    Str(String),
    List(Vec<Value>),
}

fn serialize_finite<S: Serializer>(
    x: &OrderedFloat<f64>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    if x.0.is_finite() {
        s.serialize_f64(x.0)
    } else {
        Err(S::Error::custom(format!("non-finite float {} has no JSON form", x.0)))
    }
}

impl Value {
    /// Name of the variant, used in type-mismatch errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Integer payload, or a type-mismatch error naming the actual variant.
    ///
    /// # Errors
    ///
    /// Fails when `self` is not [`Value::Int`].
    pub fn try_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => bail!("type mismatch: expected int, found {}", other.type_name()),
        }
    }

    /// Numeric payload widened to `f64`. Integers are accepted.
    ///
    /// # Errors
    ///
    /// Fails when `self` is neither [`Value::Int`] nor [`Value::Float`].
    #[allow(clippy::cast_precision_loss)]
    pub fn try_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(f.0),
            Value::Int(i) => Ok(*i as f64),
            other => bail!("type mismatch: expected float, found {}", other.type_name()),
        }
    }

    /// String payload, or a type-mismatch error.
    ///
    /// # Errors
    ///
    /// Fails when `self` is not [`Value::Str`].
    pub fn try_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => bail!("type mismatch: expected str, found {}", other.type_name()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
