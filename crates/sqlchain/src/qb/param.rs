//! Bind parameter values.
//!
//! [`Value`] is the single argument type carried by expressions and compiled
//! statements. It is a plain owned enum so builders stay `Send + Sync`, compare
//! with `==` in tests, and clone cheaply when a fluent chain is forked.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A bind parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    Bool(bool),
    /// Integer value; narrowed to INT2/INT4 when the target column asks for it.
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    /// JSON/JSONB document.
    Json(serde_json::Value),
}

impl Value {
    /// Create a binary value.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(value.into())
    }

    /// Create a JSON value.
    pub fn json(value: serde_json::Value) -> Self {
        Value::Json(value)
    }

    /// Check if this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn encode(
        &self,
        ty: &Type,
        out: &mut BytesMut,
        checked: bool,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        /// Call `to_sql_checked` or `to_sql` on the inner value.
        macro_rules! delegate {
            ($value:expr) => {
                if checked {
                    $value.to_sql_checked(ty, out)
                } else {
                    $value.to_sql(ty, out)
                }
            };
        }

        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => delegate!(v),
            Value::Int(v) => match *ty {
                Type::INT2 => delegate!(i16::try_from(*v)?),
                Type::INT4 => delegate!(i32::try_from(*v)?),
                _ => delegate!(v),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => delegate!(*v as f32),
                _ => delegate!(v),
            },
            Value::Text(v) => delegate!(v),
            Value::Bytes(v) => delegate!(v),
            Value::Uuid(v) => delegate!(v),
            Value::Timestamp(v) => delegate!(v),
            Value::Date(v) => delegate!(v),
            Value::Json(v) => delegate!(v),
        }
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.encode(ty, out, false)
    }

    // Type checking is delegated to the inner value in `to_sql_checked`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.encode(ty, out, true)
    }
}

/// Implement `From<$ty> for Value` for scalar types.
macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    &String => Text,
    uuid::Uuid => Uuid,
    DateTime<Utc> => Timestamp,
    NaiveDate => Date,
    serde_json::Value => Json,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Build a `Vec<Value>` from heterogeneous arguments.
///
/// ```ignore
/// let args = sqlchain::args![1, "open", "spam"];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Value::from(7i32), Value::Int(7));
        assert_eq!(Value::from(7u8), Value::Int(7));
        assert_eq!(Value::from(1.5f64), Value::Float(1.5));
        assert_eq!(Value::from("hi"), Value::Text("hi".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn test_args_macro() {
        let args = crate::args![1, "open", 2.5, true];
        assert_eq!(
            args,
            vec![
                Value::Int(1),
                Value::Text("open".to_string()),
                Value::Float(2.5),
                Value::Bool(true),
            ]
        );
        assert!(crate::args![].is_empty());
    }

    #[test]
    fn test_to_sql_narrows_integers() {
        let mut buf = BytesMut::new();
        Value::Int(5).to_sql_checked(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &5i32.to_be_bytes());

        let mut buf = BytesMut::new();
        let err = Value::Int(i64::MAX).to_sql_checked(&Type::INT2, &mut buf);
        assert!(err.is_err());
    }

    #[test]
    fn test_to_sql_null_and_type_mismatch() {
        let mut buf = BytesMut::new();
        let is_null = Value::Null.to_sql_checked(&Type::TEXT, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));

        let mut buf = BytesMut::new();
        let err = Value::Bool(true).to_sql_checked(&Type::TEXT, &mut buf);
        assert!(err.is_err());
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&crate::args![1, "a", None::<i32>]).unwrap();
        assert_eq!(json, r#"[1,"a",null]"#);
    }
}
