//! Script argument values
//!
//! The embedding runtime hands over arguments that are already typed.
//! Polymorphic parameters (alpha, font modifiers) are resolved here.

use crate::{Result, WaahError};

/// An already-typed script value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
}

impl Value {
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Alpha channel argument
///
/// Integers are on the 0-255 scale, floats are already in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alpha {
    Int(i64),
    Float(f64),
}

impl Alpha {
    pub const OPAQUE: Alpha = Alpha::Float(1.0);

    /// Alpha on the [0, 1] scale
    pub fn normalized(self) -> f64 {
        match self {
            Alpha::Int(v) => v as f64 / 255.0,
            Alpha::Float(v) => v,
        }
    }
}

impl Default for Alpha {
    fn default() -> Self {
        Alpha::OPAQUE
    }
}

impl From<u8> for Alpha {
    fn from(v: u8) -> Self {
        Alpha::Int(v as i64)
    }
}

impl From<i32> for Alpha {
    fn from(v: i32) -> Self {
        Alpha::Int(v as i64)
    }
}

impl From<i64> for Alpha {
    fn from(v: i64) -> Self {
        Alpha::Int(v)
    }
}

impl From<f32> for Alpha {
    fn from(v: f32) -> Self {
        Alpha::Float(v as f64)
    }
}

impl From<f64> for Alpha {
    fn from(v: f64) -> Self {
        Alpha::Float(v)
    }
}

impl TryFrom<&Value> for Alpha {
    type Error = WaahError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(Alpha::Int(*v)),
            Value::Float(v) => Ok(Alpha::Float(*v)),
            _ => Err(WaahError::invalid("invalid alpha argument")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_normalization() {
        assert_eq!(Alpha::from(255).normalized(), 1.0);
        assert_eq!(Alpha::from(0).normalized(), 0.0);
        assert_eq!(Alpha::from(0.25).normalized(), 0.25);
        assert_eq!(Alpha::default().normalized(), 1.0);
    }

    #[test]
    fn test_alpha_from_value() {
        assert_eq!(Alpha::try_from(&Value::Int(51)).unwrap(), Alpha::Int(51));
        assert_eq!(Alpha::try_from(&Value::Float(0.5)).unwrap(), Alpha::Float(0.5));

        let err = Alpha::try_from(&Value::Str("half".into())).unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: invalid alpha argument");
        assert!(Alpha::try_from(&Value::Nil).is_err());
    }
}
