//! Scalar coercion the `#[derive(Record)]` macro calls into for every field
//! (§4.9: "type coercion follows simple scalar rules... a complex source
//! value targeting a simple field is an error, not a silent
//! stringification"). Kept here, rather than inlined in the macro's
//! generated code, so each field costs one function call instead of a
//! hand-unrolled match arm.

use chrono::{DateTime, Utc};
use dimstore_core::ScalarValue;
use uuid::Uuid;

use super::TypedError;

fn mismatch(field: &'static str, found: &ScalarValue) -> TypedError {
    TypedError::InvalidFieldValue {
        field,
        found: found.to_value_string(),
    }
}

pub fn str_value(
    v: Option<&ScalarValue>,
    field: &'static str,
    default: &str,
) -> Result<String, TypedError> {
    match v {
        None => Ok(default.to_owned()),
        Some(ScalarValue::Str(s)) => Ok(s.clone()),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn bool_value(v: Option<&ScalarValue>, field: &'static str) -> Result<bool, TypedError> {
    match v {
        None => Ok(false),
        Some(ScalarValue::Bool(b)) => Ok(*b),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn i64_value(v: Option<&ScalarValue>, field: &'static str) -> Result<i64, TypedError> {
    match v {
        None => Ok(0),
        Some(ScalarValue::Int(i)) => Ok(*i),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn f64_value(v: Option<&ScalarValue>, field: &'static str) -> Result<f64, TypedError> {
    match v {
        None => Ok(0.0),
        Some(ScalarValue::Float(f)) => Ok(*f),
        Some(ScalarValue::Int(i)) => Ok(*i as f64),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn timestamp_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<DateTime<Utc>, TypedError> {
    match v {
        Some(ScalarValue::Timestamp(t)) => Ok(*t),
        Some(other) => Err(mismatch(field, other)),
        None => Err(TypedError::MissingField { field }),
    }
}

pub fn opt_str_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<Option<String>, TypedError> {
    match v {
        None => Ok(None),
        Some(ScalarValue::Str(s)) if s.is_empty() => Ok(None),
        Some(ScalarValue::Str(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn opt_bool_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<Option<bool>, TypedError> {
    match v {
        None => Ok(None),
        Some(ScalarValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn opt_i64_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<Option<i64>, TypedError> {
    match v {
        None => Ok(None),
        Some(ScalarValue::Int(i)) => Ok(Some(*i)),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn opt_f64_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<Option<f64>, TypedError> {
    match v {
        None => Ok(None),
        Some(ScalarValue::Float(f)) => Ok(Some(*f)),
        Some(ScalarValue::Int(i)) => Ok(Some(*i as f64)),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn opt_timestamp_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, TypedError> {
    match v {
        None => Ok(None),
        Some(ScalarValue::Timestamp(t)) => Ok(Some(*t)),
        Some(other) => Err(mismatch(field, other)),
    }
}

pub fn opt_uuid_value(
    v: Option<&ScalarValue>,
    field: &'static str,
) -> Result<Option<Uuid>, TypedError> {
    match v {
        None => Ok(None),
        Some(ScalarValue::Str(s)) if s.is_empty() => Ok(None),
        Some(ScalarValue::Str(s)) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| TypedError::InvalidFieldValue {
                field,
                found: s.clone(),
            }),
        Some(other) => Err(mismatch(field, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_scalar_field_falls_back_to_annotation_default() {
        assert_eq!(str_value(None, "status", "pending").unwrap(), "pending");
    }

    #[test]
    fn wrong_family_is_rejected_not_stringified() {
        let err = str_value(Some(&ScalarValue::Int(3)), "status", "").unwrap_err();
        assert!(matches!(err, TypedError::InvalidFieldValue { .. }));
    }

    #[test]
    fn empty_uuid_string_means_absent() {
        assert_eq!(opt_uuid_value(Some(&ScalarValue::from("")), "parent").unwrap(), None);
    }

    #[test]
    fn malformed_uuid_string_is_an_error() {
        let err = opt_uuid_value(Some(&ScalarValue::from("not-a-uuid")), "parent").unwrap_err();
        assert!(matches!(err, TypedError::InvalidFieldValue { .. }));
    }
}
