//! Orders: validation and stamping of new order submissions.
//!
//! Pure request-body logic (no IO, no HTTP, no storage).

pub mod order;

pub use order::{
    ORDERS_PATH, OrderRejection, OrderStatus, OrderValidator, TOTAL_TOLERANCE, calculated_total,
    stamp_new_order, validate_order,
};
