//! Request validation from column metadata: create/update bodies are checked
//! against the declarations before any SQL is built.

use crate::error::AppError;
use crate::model::{ApiModel, ColumnModel};
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body: every key must name a writable declared
    /// column, required columns must be present, and values must fit.
    pub fn validate_create(
        body: &HashMap<String, Value>,
        model: &ApiModel,
    ) -> Result<(), AppError> {
        Self::check_columns(body, model)?;
        for c in &model.columns {
            if c.required_on_create() {
                match body.get(&c.name) {
                    None | Some(Value::Null) => {
                        return Err(AppError::Validation(format!("{} is required", c.name)))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Validate an update body (version token already removed by the caller).
    /// Only the fields present are checked; required is not enforced.
    pub fn validate_update(
        body: &HashMap<String, Value>,
        model: &ApiModel,
    ) -> Result<(), AppError> {
        Self::check_columns(body, model)
    }

    fn check_columns(body: &HashMap<String, Value>, model: &ApiModel) -> Result<(), AppError> {
        for (k, v) in body {
            let Some(col) = model.column(k) else {
                return Err(AppError::Validation(format!(
                    "unknown column '{}' for {}",
                    k, model.table_name
                )));
            };
            if !col.writable {
                return Err(AppError::Validation(format!("{} is read-only", k)));
            }
            validate_value(col, v)?;
        }
        Ok(())
    }
}

fn validate_value(col: &ColumnModel, v: &Value) -> Result<(), AppError> {
    if v.is_null() {
        if !col.nullable {
            return Err(AppError::Validation(format!("{} must not be null", col.name)));
        }
        return Ok(());
    }
    if let Some(max) = col.ty.max_length() {
        if let Some(s) = v.as_str() {
            if s.len() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col.name, max
                )));
            }
        }
    }
    if let Some(ref allowed) = col.allowed_values {
        let ok = v
            .as_i64()
            .and_then(|n| i16::try_from(n).ok())
            .map(|n| allowed.contains(&n))
            .unwrap_or(false);
        if !ok {
            return Err(AppError::Validation(format!(
                "{} must be one of: {:?}",
                col.name, allowed
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::derive_model;
    use crate::schema::{action_event, system_user};
    use serde_json::json;

    fn user_model() -> ApiModel {
        derive_model(&system_user()).unwrap()
    }

    fn event_model() -> ApiModel {
        derive_model(&action_event()).unwrap()
    }

    fn map(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn create_requires_declared_not_null_columns() {
        let body = map(&[("username", json!("ada"))]);
        let err = RequestValidator::validate_create(&body, &user_model()).unwrap_err();
        assert!(err.to_string().contains("password is required"));

        let body = map(&[("username", json!("ada")), ("password", json!("s3cret"))]);
        assert!(RequestValidator::validate_create(&body, &user_model()).is_ok());
    }

    #[test]
    fn unknown_and_read_only_columns_are_rejected() {
        let body = map(&[("no_such_column", json!("x"))]);
        assert!(RequestValidator::validate_update(&body, &user_model()).is_err());

        let body = map(&[("created_at", json!("2024-01-01T00:00:00"))]);
        let err = RequestValidator::validate_update(&body, &user_model()).unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn length_cap_comes_from_declaration() {
        let body = map(&[("lang", Value::String("x".repeat(21)))]);
        assert!(RequestValidator::validate_update(&body, &user_model()).is_err());
        let body = map(&[("lang", Value::String("x".repeat(20)))]);
        assert!(RequestValidator::validate_update(&body, &user_model()).is_ok());
    }

    #[test]
    fn enum_columns_accept_only_declared_integers() {
        let body = map(&[("action_event_type", json!(4))]);
        assert!(RequestValidator::validate_update(&body, &event_model()).is_ok());
        let body = map(&[("action_event_type", json!(5))]);
        assert!(RequestValidator::validate_update(&body, &event_model()).is_err());
        let body = map(&[("action_event_type", json!("talk"))]);
        assert!(RequestValidator::validate_update(&body, &event_model()).is_err());
    }

    #[test]
    fn null_is_fine_for_nullable_columns_only() {
        let body = map(&[("remark", Value::Null)]);
        assert!(RequestValidator::validate_update(&body, &event_model()).is_ok());
        let body = map(&[("user_type", Value::Null)]);
        assert!(RequestValidator::validate_update(&body, &event_model()).is_err());
    }
}
