// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::kind::KindTag;

/// A converted option value.
///
/// Each built-in kind produces exactly one variant. Values produced by
/// custom kinds are stored type-erased in [Value::Custom].
#[derive(Clone)]
pub enum Value {
    /// Produced by the string kind.
    String(String),
    /// Produced by the integer kind.
    Integer(i64),
    /// Produced by the double kind.
    Double(f64),
    /// Produced by the boolean and flag kinds.
    Boolean(bool),
    /// Produced by the file path kind.
    Path(PathBuf),
    /// Produced by the URI kind.
    Uri(Url),
    /// Produced by the enumeration kind: one of its declared symbols.
    Symbol(String),
    /// Produced by a custom kind.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap an arbitrary value for a custom kind.
    pub fn custom<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Value::Custom(Arc::new(value))
    }

    /// Borrow the wrapped value of a custom kind as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Value::Double(d) => f.debug_tuple("Double").field(d).finish(),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Value::Uri(u) => f.debug_tuple("Uri").field(&u.as_str()).finish(),
            Value::Symbol(s) => f.debug_tuple("Symbol").field(s).finish(),
            Value::Custom(v) => write!(f, "Custom({:p})", Arc::as_ptr(v)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) | Value::Symbol(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::Uri(u) => write!(f, "{}", u),
            Value::Custom(_) => write!(f, "<custom>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Uri(a), Value::Uri(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            // Custom values are opaque: only the same allocation is equal.
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A Rust type that an option value can be extracted as.
///
/// Implemented for the types produced by the built-in kinds. To use a
/// custom kind with a typed handle, implement this trait for the custom
/// type, storing it with [Value::custom()]:
///
/// ```rust
/// use optgram::{OptValue, Value};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Level(u8);
///
/// impl OptValue for Level {
///     fn from_value(value: &Value) -> Option<Self> {
///         value.downcast_ref::<Level>().cloned()
///     }
///
///     fn into_value(self) -> Value {
///         Value::custom(self)
///     }
/// }
/// ```
pub trait OptValue: Clone + 'static {
    /// Extract `Self` from a stored value, if it holds the right variant.
    fn from_value(value: &Value) -> Option<Self>;

    /// Store `self` as a value.
    fn into_value(self) -> Value;

    /// The built-in kind a declarative table uses for this type.
    fn default_kind() -> Option<KindTag> {
        None
    }
}

impl OptValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn into_value(self) -> Value {
        self
    }
}

impl OptValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) | Value::Symbol(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn default_kind() -> Option<KindTag> {
        Some(KindTag::String)
    }
}

impl OptValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn default_kind() -> Option<KindTag> {
        Some(KindTag::Integer)
    }
}

impl OptValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn default_kind() -> Option<KindTag> {
        Some(KindTag::Double)
    }
}

impl OptValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn default_kind() -> Option<KindTag> {
        Some(KindTag::Flag)
    }
}

impl OptValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(p) => Some(p.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Path(self)
    }

    fn default_kind() -> Option<KindTag> {
        Some(KindTag::Path)
    }
}

impl OptValue for Url {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uri(u) => Some(u.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Uri(self)
    }

    fn default_kind() -> Option<KindTag> {
        Some(KindTag::Uri)
    }
}
