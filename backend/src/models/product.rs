//! Product entity and request validation.
//!
//! A [`ProductDraft`] is the validated form of a create/update request body.
//! Validation runs in two stages, in this order:
//!
//! 1. presence: every field exists with a value of the expected JSON type
//!    (`0` counts as present, `null` does not);
//! 2. range: `price > 0` and `stock >= 0`.
//!
//! Range limits imposed by the table definition (name length, decimal
//! precision, 32-bit stock) are enforced by the store, not here.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

crate::define_id_type!(i64, ProductId);

/// Message returned when a required field is missing or has the wrong type.
pub const FIELDS_REQUIRED: &str = "All fields are required";

/// Message returned when price or stock are out of range.
pub const INVALID_PRICE_OR_STOCK: &str = "Price must be positive and stock cannot be negative";

/// A persisted product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Fixed-point price with two decimal places, serialized as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
}

/// Input validation failure, carrying the client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Price must be positive and stock cannot be negative")]
    OutOfRange,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingFields => FIELDS_REQUIRED,
            Self::OutOfRange => INVALID_PRICE_OR_STOCK,
        }
    }
}

/// Validated field values for a create or a full update.
///
/// `stock` is kept as `i64` so that values the table cannot hold reach the
/// store and fail there instead of being silently truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
}

impl ProductDraft {
    /// Build a draft from typed values, applying the range stage only.
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        stock: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if price <= Decimal::ZERO || stock < 0 {
            return Err(ValidationError::OutOfRange);
        }
        Ok(Self { name, price, stock })
    }

    /// Validate a JSON request body.
    ///
    /// The name is read from `productName`, falling back to `name`.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let name = fields
            .get("productName")
            .filter(|v| !v.is_null())
            .or_else(|| fields.get("name"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let price = fields.get("price").and_then(json_to_decimal);
        let stock = fields.get("stock").and_then(json_to_stock);

        match (name, price, stock) {
            (Some(name), Some(price), Some(stock)) => Self::new(name, price, stock),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

/// Convert a JSON number to a decimal without going through `f64`.
///
/// Numbers outside what a `Decimal` can hold keep their sign and magnitude
/// class: huge values saturate, tiny ones become the smallest non-zero
/// decimal. The range checks and the store's column limits then apply to
/// them like to any other price.
fn json_to_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(n) = value else {
        return None;
    };
    let text = n.to_string();
    if let Ok(price) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        return Some(price);
    }

    let approx = n.as_f64()?;
    let tiny = Decimal::new(1, 28);
    let price = match (approx.abs() >= 1.0, approx.is_sign_negative()) {
        (true, false) => Decimal::MAX,
        (true, true) => Decimal::MIN,
        (false, _) if approx == 0.0 => Decimal::ZERO,
        (false, false) => tiny,
        (false, true) => -tiny,
    };
    Some(price)
}

/// Integral JSON numbers, including floats such as `5.0`. Floats beyond the
/// `i64` range saturate so that the store rejects them.
fn json_to_stock(value: &Value) -> Option<i64> {
    if let Some(stock) = value.as_i64() {
        return Some(stock);
    }
    if value.is_u64() {
        return Some(i64::MAX);
    }
    let approx = value.as_f64()?;
    if !approx.is_finite() || approx.fract() != 0.0 {
        return None;
    }
    // `as` saturates at the i64 bounds.
    Some(approx as i64)
}

/// Parse a path segment as a product id.
pub fn parse_product_id(raw: &str) -> Result<ProductId, String> {
    raw.parse()
}
