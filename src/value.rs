//! Values held in a request's binding table.

use std::fmt;
use std::sync::Arc;

use crate::allowlist::{Attribute, Callable};
use crate::library::{DomainObject, LibraryFault};

/// A bound value: a primitive or an opaque domain-library object.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Object(Arc<dyn DomainObject>),
}

impl Value {
    pub fn object(object: impl DomainObject + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Object(o) => o.type_name(),
        }
    }

    pub fn as_object(&self) -> Option<&dyn DomainObject> {
        match self {
            Value::Object(o) => Some(o.as_ref()),
            _ => None,
        }
    }

    /// Numeric view used by operations that accept either ints or floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Invoke an allowlisted operation with this value as the receiver.
    pub fn call(&self, callable: Callable, args: &[Value]) -> Result<Value, LibraryFault> {
        match self {
            Value::Object(o) => o.call(callable, args),
            _ => Err(self.missing_member(callable.name())),
        }
    }

    /// Read an allowlisted attribute off this value.
    pub fn attribute(&self, attribute: Attribute) -> Result<Value, LibraryFault> {
        match self {
            Value::Object(o) => o.attribute(attribute),
            _ => Err(self.missing_member(attribute.name())),
        }
    }

    /// Structured-document export (the `musicxml` return format).
    pub fn musicxml(&self) -> Result<String, LibraryFault> {
        match self {
            Value::Object(o) => o.musicxml(),
            _ => Err(self.missing_member("musicxml")),
        }
    }

    /// Canonical text rendering (the `reprtext` return format).
    pub fn repr_text(&self) -> Result<String, LibraryFault> {
        match self {
            Value::Object(o) => o.repr_text(),
            _ => Err(self.missing_member("_reprText")),
        }
    }

    fn missing_member(&self, member: &str) -> LibraryFault {
        // Dotted names resolve their first segment on the receiver.
        let head = member.split('.').next().unwrap_or(member);
        LibraryFault::new(format!(
            "'{}' object has no attribute '{head}'",
            self.type_name()
        ))
    }
}

impl fmt::Display for Value {
    /// Generic textual representation, used by the `str`/`string` return
    /// formats and as the fallback for every other format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => f.write_str(s),
            Value::Object(o) => f.write_str(&o.text()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Render a float so integral values keep a trailing `.0` (`2.0`, not `2`).
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        let text = if x > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}
