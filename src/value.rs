use crate::error::ValueError;
use std::{fmt, time::Duration};

/// The closed set of scalar kinds a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Integer,
    Float,
    Bool,
    Duration,
}

impl Kind {
    /// Parse a raw string into a value of this kind.
    ///
    /// Strings are taken verbatim. Integers, floats and booleans follow YAML
    /// scalar syntax, durations follow `humantime` syntax (`15s`, `1h 30m`).
    pub fn parse(self, raw: &str) -> Result<Value, ValueError> {
        let parse_err = |reason: String| ValueError::Parse {
            kind: self,
            input: raw.to_string(),
            reason,
        };

        match self {
            Kind::String => Ok(Value::String(raw.to_string())),
            Kind::Integer => serde_yaml::from_str::<i64>(raw)
                .map(Value::Integer)
                .map_err(|e| parse_err(e.to_string())),
            Kind::Float => serde_yaml::from_str::<f64>(raw)
                .map(Value::Float)
                .map_err(|e| parse_err(e.to_string())),
            Kind::Bool => serde_yaml::from_str::<bool>(raw)
                .map(Value::Bool)
                .map_err(|e| parse_err(e.to_string())),
            Kind::Duration => humantime::parse_duration(raw.trim())
                .map(Value::Duration)
                .map_err(|e| parse_err(e.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Duration => "duration",
        };
        f.write_str(name)
    }
}

/// A parsed scalar, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::Duration(_) => Kind::Duration,
        }
    }
}

// Output is accepted back by `Kind::parse` for every kind.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
        }
    }
}

fn mismatch(expected: Kind, found: &Value) -> ValueError {
    ValueError::KindMismatch {
        expected,
        found: found.kind(),
    }
}

/// A field type the loaders know how to read and write.
///
/// Implemented for `String`, every primitive integer, `f32`, `f64`, `bool`,
/// `Duration`, and `Option<T>` of any of those.
pub trait Scalar {
    fn kind(&self) -> Kind;

    /// Current value, `None` when there is nothing to report (an empty
    /// `Option`, or an unsigned integer beyond `i64::MAX`).
    fn value(&self) -> Option<Value>;

    /// Overwrite the field. Leaves it untouched on error.
    fn assign(&mut self, value: Value) -> Result<(), ValueError>;

    /// Parse `raw` according to [`Scalar::kind`] and assign the result.
    fn assign_str(&mut self, raw: &str) -> Result<(), ValueError> {
        let value = self.kind().parse(raw)?;
        self.assign(value)
    }
}

impl Scalar for String {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn value(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::String(s) => {
                *self = s;
                Ok(())
            }
            other => Err(mismatch(Kind::String, &other)),
        }
    }
}

macro_rules! integer_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl Scalar for $t {
            fn kind(&self) -> Kind {
                Kind::Integer
            }

            fn value(&self) -> Option<Value> {
                i64::try_from(*self).ok().map(Value::Integer)
            }

            fn assign(&mut self, value: Value) -> Result<(), ValueError> {
                match value {
                    Value::Integer(n) => {
                        *self = <$t>::try_from(n).map_err(|_| ValueError::OutOfRange {
                            value: n.to_string(),
                            target: stringify!($t),
                        })?;
                        Ok(())
                    }
                    other => Err(mismatch(Kind::Integer, &other)),
                }
            }
        }
    )*};
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Scalar for f64 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Float(*self))
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Float(x) => {
                *self = x;
                Ok(())
            }
            other => Err(mismatch(Kind::Float, &other)),
        }
    }
}

impl Scalar for f32 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Float(f64::from(*self)))
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Float(x) => {
                *self = x as f32;
                Ok(())
            }
            other => Err(mismatch(Kind::Float, &other)),
        }
    }
}

impl Scalar for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(mismatch(Kind::Bool, &other)),
        }
    }
}

impl Scalar for Duration {
    fn kind(&self) -> Kind {
        Kind::Duration
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Duration(*self))
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Duration(d) => {
                *self = d;
                Ok(())
            }
            other => Err(mismatch(Kind::Duration, &other)),
        }
    }
}

impl<T: Scalar + Default> Scalar for Option<T> {
    fn kind(&self) -> Kind {
        match self {
            Some(inner) => inner.kind(),
            None => T::default().kind(),
        }
    }

    fn value(&self) -> Option<Value> {
        self.as_ref().and_then(Scalar::value)
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }
}
