//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive as loosely typed DTOs; these helpers turn each raw
//! field into its domain value or an `invalid_request` error whose details
//! name the field and a stable validation code.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{
    BloodGroup, Email, Error, PhoneNumber, Quantity, QuantityError, Role, UserId, UserName,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidBloodGroup,
    InvalidPhone,
    InvalidQuantity,
    InvalidName,
    InvalidEmail,
    InvalidRole,
    InvalidUuid,
    InvalidDescriptor,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidBloodGroup => "invalid_blood_group",
            ErrorCode::InvalidPhone => "invalid_phone",
            ErrorCode::InvalidQuantity => "invalid_quantity",
            ErrorCode::InvalidName => "invalid_name",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidRole => "invalid_role",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDescriptor => "invalid_descriptor",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_descriptor_error(field: FieldName, value: &str) -> Error {
    ValidationError::new(field.as_str(), format!("unsupported {}: {value}", field.as_str()))
        .with_value(ErrorCode::InvalidDescriptor, value)
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_blood_group(value: &str, field: FieldName) -> Result<BloodGroup, Error> {
    value.parse::<BloodGroup>().map_err(|_| {
        ValidationError::new(
            field.as_str(),
            format!("{} must be one of A+, A-, B+, B-, AB+, AB-, O+, O-", field.as_str()),
        )
        .with_value(ErrorCode::InvalidBloodGroup, value)
    })
}

pub(crate) fn parse_phone(value: String, field: FieldName) -> Result<PhoneNumber, Error> {
    PhoneNumber::new(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidPhone)
    })
}

/// Parse a quantity that must be a JSON integer within `1..=100`.
///
/// Strings, booleans and fractional numbers are rejected rather than coerced.
pub(crate) fn parse_quantity(value: &Value, field: FieldName) -> Result<Quantity, Error> {
    let invalid = |message: String| {
        ValidationError::new(field.as_str(), message).with_code(ErrorCode::InvalidQuantity)
    };
    let units = value
        .as_i64()
        .or_else(|| value.as_u64().map(|_| i64::MAX))
        .ok_or_else(|| invalid(format!("{} must be an integer", field.as_str())))?;
    Quantity::new(units).map_err(|err: QuantityError| invalid(err.to_string()))
}

pub(crate) fn parse_name(value: &str, field: FieldName) -> Result<UserName, Error> {
    UserName::new(value).map_err(|err| name_error(field, &err))
}

fn name_error(field: FieldName, err: &UserValidationError) -> Error {
    ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidName)
}

pub(crate) fn parse_email(value: &str, field: FieldName) -> Result<Email, Error> {
    Email::new(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidEmail)
    })
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    value.parse::<Role>().map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidRole, value)
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    Uuid::parse_str(value).map(UserId::from_uuid).map_err(|_| {
        ValidationError::new(field.as_str(), format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const QUANTITY: FieldName = FieldName::new("quantity");

    fn detail_code(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|details| details.get("code"))
            .and_then(Value::as_str)
    }

    #[rstest]
    #[case(json!(1), 1)]
    #[case(json!(100), 100)]
    fn accepts_integer_quantities(#[case] raw: Value, #[case] expected: u8) {
        let quantity = parse_quantity(&raw, QUANTITY).expect("valid quantity");
        assert_eq!(quantity.get(), expected);
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(101))]
    #[case(json!(-5))]
    #[case(json!(12.5))]
    #[case(json!("20"))]
    #[case(json!(null))]
    #[case(json!(u64::MAX))]
    fn rejects_invalid_quantities(#[case] raw: Value) {
        let error = parse_quantity(&raw, QUANTITY).expect_err("invalid quantity");
        assert_eq!(detail_code(&error), Some("invalid_quantity"));
    }

    #[rstest]
    #[case("AB+", Some(BloodGroup::AbPositive))]
    #[case("O-", Some(BloodGroup::ONegative))]
    #[case("ab+", None)]
    #[case("C+", None)]
    fn blood_groups_parse_exactly(#[case] raw: &str, #[case] expected: Option<BloodGroup>) {
        assert_eq!(
            parse_blood_group(raw, FieldName::new("bloodGroup")).ok(),
            expected
        );
    }

    #[rstest]
    fn phone_errors_name_the_field() {
        let error = parse_phone("12345".to_owned(), FieldName::new("phone")).expect_err("short");
        let field = error
            .details()
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str);
        assert_eq!(field, Some("phone"));
        assert_eq!(detail_code(&error), Some("invalid_phone"));
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let error = require::<String>(None, FieldName::new("name")).expect_err("missing");
        assert_eq!(error.message(), "missing required field: name");
        assert_eq!(detail_code(&error), Some("missing_field"));
    }

    #[rstest]
    #[case("admin", true)]
    #[case("regular", true)]
    #[case("superuser", false)]
    fn roles_are_whitelisted(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(parse_role(raw, FieldName::new("role")).is_ok(), valid);
    }
}
