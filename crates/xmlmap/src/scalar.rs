//! Conversion of attribute values and text content into leaf values.

use std::fmt::Display;
use std::str::FromStr;

use crate::types::{ScalarType, Type};
use crate::value::Value;
use crate::{Error, Result};

/// Parse `text` as a value of type `ty`.
///
/// Dynamic types (`Any`, unresolved variables, unbounded wildcards) produce a
/// string. Floating point types accept `INF` and `-INF`. Composite types are
/// rejected with [`Error::TypeMismatch`].
pub fn parse_value(ty: &Type, text: &str) -> Result<Value> {
    match ty {
        Type::Scalar(scalar) => parse_scalar(*scalar, text),
        Type::Enum(info) => {
            if info.contains(text) {
                Ok(Value::Enum(text.to_owned()))
            } else {
                Err(Error::UnknownEnumValue {
                    enum_name: info.name().to_owned(),
                    value: text.to_owned(),
                })
            }
        }
        Type::Any | Type::Var(_) | Type::Wildcard(_) => Ok(Value::String(text.to_owned())),
        _ => Err(mismatch(ty, text, "not a scalar or enum type")),
    }
}

/// Parse `text` as a scalar of type `scalar`.
pub fn parse_scalar(scalar: ScalarType, text: &str) -> Result<Value> {
    let ty = Type::Scalar(scalar);
    let value = match scalar {
        ScalarType::Bool => match text {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => return Err(mismatch(&ty, text, "expected true, false, 1 or 0")),
        },
        ScalarType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err(mismatch(&ty, text, "expected exactly one character")),
            }
        }
        ScalarType::Int8 => Value::Int8(parse_number(&ty, text)?),
        ScalarType::Int16 => Value::Int16(parse_number(&ty, text)?),
        ScalarType::Int32 => Value::Int32(parse_number(&ty, text)?),
        ScalarType::Int64 => Value::Int64(parse_number(&ty, text)?),
        ScalarType::UInt8 => Value::UInt8(parse_number(&ty, text)?),
        ScalarType::UInt16 => Value::UInt16(parse_number(&ty, text)?),
        ScalarType::UInt32 => Value::UInt32(parse_number(&ty, text)?),
        ScalarType::UInt64 => Value::UInt64(parse_number(&ty, text)?),
        ScalarType::Float => Value::Float(match text {
            "INF" => f32::INFINITY,
            "-INF" => f32::NEG_INFINITY,
            _ => parse_number(&ty, text)?,
        }),
        ScalarType::Double => Value::Double(match text {
            "INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            _ => parse_number(&ty, text)?,
        }),
        ScalarType::String => Value::String(text.to_owned()),
    };
    Ok(value)
}

fn parse_number<T>(ty: &Type, text: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse().map_err(|e: T::Err| mismatch(ty, text, e))
}

fn mismatch(ty: &Type, text: &str, reason: impl Display) -> Error {
    Error::TypeMismatch {
        expected: ty.to_string(),
        value: text.to_owned(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumInfo;

    #[test]
    fn test_infinity_literals() {
        assert_eq!(
            parse_scalar(ScalarType::Double, "-INF").unwrap(),
            Value::Double(f64::NEG_INFINITY)
        );
        assert_eq!(
            parse_scalar(ScalarType::Float, "INF").unwrap(),
            Value::Float(f32::INFINITY)
        );
        assert_eq!(parse_scalar(ScalarType::Double, "1.5").unwrap(), Value::Double(1.5));
    }

    #[test]
    fn test_integers() {
        assert_eq!(parse_scalar(ScalarType::Int32, "-42").unwrap(), Value::Int32(-42));
        assert_eq!(parse_scalar(ScalarType::UInt8, "255").unwrap(), Value::UInt8(255));
        assert!(matches!(
            parse_scalar(ScalarType::UInt8, "256"),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(parse_scalar(ScalarType::Int64, "abc").is_err());
        assert!(parse_scalar(ScalarType::Int32, "").is_err());
    }

    #[test]
    fn test_bool_and_char() {
        assert_eq!(parse_scalar(ScalarType::Bool, "1").unwrap(), Value::Bool(true));
        assert_eq!(parse_scalar(ScalarType::Bool, "false").unwrap(), Value::Bool(false));
        assert!(parse_scalar(ScalarType::Bool, "yes").is_err());

        assert_eq!(parse_scalar(ScalarType::Char, "é").unwrap(), Value::Char('é'));
        assert!(parse_scalar(ScalarType::Char, "ab").is_err());
        assert!(parse_scalar(ScalarType::Char, "").is_err());
    }

    #[test]
    fn test_enum_values() {
        let ty = Type::Enum(EnumInfo::new("AnyEnum", ["ENUM_1", "ENUM_2"]));
        assert_eq!(parse_value(&ty, "ENUM_2").unwrap(), Value::Enum("ENUM_2".into()));

        match parse_value(&ty, "ENUM_3") {
            Err(Error::UnknownEnumValue { enum_name, value }) => {
                assert_eq!(enum_name, "AnyEnum");
                assert_eq!(value, "ENUM_3");
            }
            other => panic!("expected UnknownEnumValue, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_and_composite() {
        assert_eq!(parse_value(&Type::Any, " x ").unwrap(), Value::from(" x "));
        assert_eq!(parse_value(&Type::var("T"), "x").unwrap(), Value::from("x"));
        assert!(matches!(
            parse_value(&Type::list(Type::Any), "x"),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
