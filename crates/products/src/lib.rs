//! Products: validation and stamping of new product submissions.
//!
//! Pure request-body logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{
    PRODUCTS_PATH, ProductField, ProductValidator, coerce_price, stamp_created_at, validate_product,
};
