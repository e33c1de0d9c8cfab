//! Domain types for the product catalogue.

pub mod macros;
pub mod product;

pub use product::{
    parse_product_id, Product, ProductDraft, ProductId, ValidationError, FIELDS_REQUIRED,
    INVALID_PRICE_OR_STOCK,
};
