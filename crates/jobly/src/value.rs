//! Scalar values bound to positional parameters.
//!
//! [`SqlValue`] is the value type of a [`FieldMap`](crate::FieldMap) and of a
//! [`Clause`](crate::Clause) parameter list. Unlike a boxed `dyn ToSql`, it can be
//! compared and inspected, and it narrows itself to the column type Postgres
//! reports for the placeholder (`int4` for an `Int`, `numeric` for a `Text`
//! holding `"0.1"`, ...).

use crate::error::{StoreError, StoreResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A dynamically typed scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
}

impl SqlValue {
    /// Convert a JSON scalar.
    ///
    /// Arrays and objects are rejected: a single placeholder binds a single scalar.
    pub fn from_json(value: serde_json::Value) -> StoreResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(StoreError::invalid_argument(format!(
                        "unsupported number: {n}"
                    )))
                }
            }
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(_) => Err(StoreError::invalid_argument(
                "arrays cannot be bound as a scalar value",
            )),
            Value::Object(_) => Err(StoreError::invalid_argument(
                "objects cannot be bound as a scalar value",
            )),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl ToSql for SqlValue {
    /// Bind to the parameter type Postgres inferred.
    ///
    /// Conversions beyond the variant's native type: `Int` to `int2`, `int4`,
    /// `float4`, `float8` and `numeric`; `Float` to `float4`, `numeric` and,
    /// when it has no fractional part, the integer types; `Text` to `numeric`.
    /// Out-of-range values are bind errors.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => v.to_sql_checked(ty, out),
            SqlValue::Int(v) => int_to_sql(*v, ty, out),
            SqlValue::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else if *ty == Type::NUMERIC {
                    // Shortest round-trip form, so 0.1 stays 0.1.
                    v.to_string().parse::<Decimal>()?.to_sql_checked(ty, out)
                } else if [Type::INT2, Type::INT4, Type::INT8].contains(ty) {
                    int_to_sql(float_to_int(*v)?, ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            SqlValue::Numeric(v) => v.to_sql_checked(ty, out),
            SqlValue::Text(v) => {
                if *ty == Type::NUMERIC {
                    v.parse::<Decimal>()?.to_sql_checked(ty, out)
                } else {
                    v.as_str().to_sql_checked(ty, out)
                }
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Per-variant checks happen in `to_sql` via `to_sql_checked`.
        true
    }

    to_sql_checked!();
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from(v).to_sql_checked(ty, out)
    } else if *ty == Type::FLOAT4 {
        (v as f32).to_sql_checked(ty, out)
    } else if *ty == Type::FLOAT8 {
        (v as f64).to_sql_checked(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

fn float_to_int(v: f64) -> Result<i64, Box<dyn Error + Sync + Send>> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Ok(v as i64)
    } else {
        Err(format!("{v} is not an integer").into())
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        Self::Int(v.into())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Numeric(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_postgres::types::FromSql;

    fn encode(value: &SqlValue, ty: &Type) -> Result<Vec<u8>, Box<dyn Error + Sync + Send>> {
        let mut buf = BytesMut::new();
        value.to_sql_checked(ty, &mut buf)?;
        Ok(buf.to_vec())
    }

    #[test]
    fn int_narrows_to_int4() {
        let bytes = encode(&SqlValue::Int(50_000), &Type::INT4).unwrap();
        assert_eq!(bytes, 50_000_i32.to_be_bytes().to_vec());
    }

    #[test]
    fn int_overflowing_int4_is_an_error() {
        assert!(encode(&SqlValue::Int(i64::MAX), &Type::INT4).is_err());
    }

    #[test]
    fn int_stays_int8() {
        let bytes = encode(&SqlValue::Int(7), &Type::INT8).unwrap();
        assert_eq!(bytes, 7_i64.to_be_bytes().to_vec());
    }

    #[test]
    fn text_for_numeric_column_is_parsed() {
        assert!(encode(&SqlValue::Text("0.1".into()), &Type::NUMERIC).is_ok());
        assert!(encode(&SqlValue::Text("lots".into()), &Type::NUMERIC).is_err());
    }

    #[test]
    fn float_for_numeric_column_keeps_shortest_form() {
        let value = SqlValue::from_json(json!(0.1)).unwrap();
        let bytes = encode(&value, &Type::NUMERIC).unwrap();
        let decoded = Decimal::from_sql(&Type::NUMERIC, &bytes).unwrap();
        assert_eq!(decoded, Decimal::new(1, 1));
        assert_eq!(decoded.to_string(), "0.1");
    }

    #[test]
    fn float_for_numeric_column_rejects_non_finite() {
        assert!(encode(&SqlValue::Float(f64::NAN), &Type::NUMERIC).is_err());
        assert!(encode(&SqlValue::Float(f64::INFINITY), &Type::NUMERIC).is_err());
    }

    #[test]
    fn integral_float_narrows_to_int4() {
        let bytes = encode(&SqlValue::from_json(json!(80.0)).unwrap(), &Type::INT4).unwrap();
        assert_eq!(bytes, 80_i32.to_be_bytes().to_vec());
    }

    #[test]
    fn fractional_or_overflowing_float_rejected_for_int_columns() {
        assert!(encode(&SqlValue::Float(80.5), &Type::INT4).is_err());
        assert!(encode(&SqlValue::Float(1e10), &Type::INT4).is_err());
        assert!(encode(&SqlValue::Float(f64::NAN), &Type::INT8).is_err());
    }

    #[test]
    fn int_widens_to_float4() {
        let bytes = encode(&SqlValue::Int(3), &Type::FLOAT4).unwrap();
        assert_eq!(bytes, 3.0_f32.to_be_bytes().to_vec());
    }

    #[test]
    fn text_rejected_for_int_column() {
        assert!(encode(&SqlValue::Text("12".into()), &Type::INT4).is_err());
    }

    #[test]
    fn null_binds_to_any_type() {
        let mut buf = BytesMut::new();
        let res = SqlValue::Null.to_sql_checked(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(res, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn from_json_scalars() {
        assert_eq!(SqlValue::from_json(json!(null)).unwrap(), SqlValue::Null);
        assert_eq!(SqlValue::from_json(json!(true)).unwrap(), SqlValue::Bool(true));
        assert_eq!(SqlValue::from_json(json!(80)).unwrap(), SqlValue::Int(80));
        assert_eq!(SqlValue::from_json(json!(0.5)).unwrap(), SqlValue::Float(0.5));
        assert_eq!(
            SqlValue::from_json(json!("J-New")).unwrap(),
            SqlValue::Text("J-New".into())
        );
    }

    #[test]
    fn from_json_rejects_nested() {
        let err = SqlValue::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
        let err = SqlValue::from_json(json!({"a": 1})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3)), SqlValue::Int(3));
    }
}
