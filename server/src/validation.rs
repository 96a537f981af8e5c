//! Typed request-body validation.
//!
//! Bodies arrive as loose JSON. Each `parse_*` function returns either the
//! typed request or every field-level problem found, so a client learns about
//! all missing and mistyped fields at once. Value ranges are domain rules and
//! are enforced by the commands.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Missing,
    InvalidType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

#[derive(Debug, Default, PartialEq, Eq, Error)]
#[error("request body failed validation")]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &str, kind: FieldErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of absent required fields, in the order they were checked.
    pub fn missing_fields(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter(|e| e.kind == FieldErrorKind::Missing)
            .map(|e| e.field.clone())
            .collect()
    }

    pub fn invalid_fields(&self) -> Vec<FieldError> {
        self.errors
            .iter()
            .filter(|e| e.kind != FieldErrorKind::Missing)
            .cloned()
            .collect()
    }
}

/// Collects field errors while reading values out of a JSON object.
/// `null` counts as absent.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(body: &'a Value) -> Result<Self, ValidationErrors> {
        match body.as_object() {
            Some(object) => Ok(Self {
                object,
                errors: ValidationErrors::default(),
            }),
            None => {
                let mut errors = ValidationErrors::default();
                errors.push(
                    "body",
                    FieldErrorKind::InvalidType,
                    "Request body must be a JSON object",
                );
                Err(errors)
            }
        }
    }

    fn value(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    fn required(&mut self, field: &str) -> Option<&'a Value> {
        let value = self.value(field);
        if value.is_none() {
            self.errors.push(
                field,
                FieldErrorKind::Missing,
                format!("{field} is required"),
            );
        }
        value
    }

    fn invalid(&mut self, field: &str, expected: &str) {
        self.errors.push(
            field,
            FieldErrorKind::InvalidType,
            format!("{field} must be {expected}"),
        );
    }

    fn string(&mut self, field: &str, value: Option<&Value>) -> Option<String> {
        match value? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.invalid(field, "a string");
                None
            }
        }
    }

    fn required_string(&mut self, field: &str) -> Option<String> {
        let value = self.required(field);
        self.string(field, value)
    }

    fn optional_string(&mut self, field: &str) -> Option<String> {
        let value = self.value(field);
        self.string(field, value)
    }

    fn required_decimal(&mut self, field: &str) -> Option<Decimal> {
        let parsed = match self.required(field)? {
            Value::Number(number) => {
                let text = number.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            _ => None,
        };
        if parsed.is_none() {
            self.invalid(field, "a number");
        }
        parsed
    }

    fn required_integer(&mut self, field: &str) -> Option<i64> {
        let parsed = self.required(field)?.as_i64();
        if parsed.is_none() {
            self.invalid(field, "an integer");
        }
        parsed
    }

    fn optional_uuid(&mut self, field: &str) -> Option<Uuid> {
        let parsed = match self.value(field)? {
            Value::String(s) => Uuid::parse_str(s).ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.invalid(field, "a UUID string");
        }
        parsed
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        // Every required read succeeded, so `build` only sees `Some` values.
        build().ok_or(self.errors)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureTicketTypeRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
    pub ticket_type_id: Option<Uuid>,
}

pub fn parse_configure_ticket_type(
    body: &Value,
) -> Result<ConfigureTicketTypeRequest, ValidationErrors> {
    let mut reader = FieldReader::new(body)?;

    let name = reader.required_string("name");
    let price = reader.required_decimal("price");
    let quantity = reader.required_integer("quantity");
    let description = reader.optional_string("description");
    let ticket_type_id = reader.optional_uuid("ticketTypeId");

    reader.finish(|| {
        Some(ConfigureTicketTypeRequest {
            name: name?,
            description,
            price: price?,
            quantity: quantity?,
            ticket_type_id,
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRequest {
    pub qr_code: String,
}

pub fn parse_check_in(body: &Value) -> Result<CheckInRequest, ValidationErrors> {
    let mut reader = FieldReader::new(body)?;
    let qr_code = reader.required_string("qrCode");

    reader.finish(|| Some(CheckInRequest { qr_code: qr_code? }))
}
