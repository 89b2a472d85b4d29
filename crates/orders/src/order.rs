use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use shopfront_core::{
    Body, Numeric, Rejection, RequestTarget, StageContext, StageOutcome, ValidationStage, Verb,
    is_truthy,
};

/// Collection path guarded by [`OrderValidator`].
pub const ORDERS_PATH: &str = "/orders";

/// Largest accepted absolute difference between `total` and the items sum.
pub const TOTAL_TOLERANCE: f64 = 0.01;

const REQUIRED_FIELDS: [&str; 4] = ["userId", "items", "total", "shippingDetails"];
const SHIPPING_FIELDS: [&str; 4] = ["firstName", "lastName", "address", "phone"];

/// Status stamped onto accepted orders. Later transitions are plain field updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

/// Why an order submission was refused. Checks fail fast, in declaration order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OrderRejection {
    #[error("Missing required fields")]
    MissingRequiredFields,

    #[error("Missing shipping details")]
    MissingShippingDetails,

    #[error("Order must contain at least one item")]
    NoItems,

    #[error("Order total doesn't match items total")]
    TotalMismatch,
}

impl From<OrderRejection> for Rejection {
    fn from(value: OrderRejection) -> Self {
        Rejection::message(value.to_string())
    }
}

/// Sum of `price * quantity` over the items.
///
/// `None` if any item lacks a numeric price or quantity.
pub fn calculated_total(items: &[Value]) -> Option<f64> {
    items.iter().try_fold(0.0, |sum, item| {
        let price = Numeric::coerce(item.get("price")).value()?;
        let quantity = Numeric::coerce(item.get("quantity")).value()?;
        Some(sum + price * quantity)
    })
}

/// Check an order submission.
pub fn validate_order(body: &Body) -> Result<(), OrderRejection> {
    if !REQUIRED_FIELDS.iter().all(|f| is_truthy(body.get(*f))) {
        return Err(OrderRejection::MissingRequiredFields);
    }

    // A shippingDetails that is not an object carries none of the fields.
    let shipping = body.get("shippingDetails").and_then(Value::as_object);
    let has_shipping = shipping
        .is_some_and(|details| SHIPPING_FIELDS.iter().all(|f| is_truthy(details.get(*f))));
    if !has_shipping {
        return Err(OrderRejection::MissingShippingDetails);
    }

    let items = match body.get("items") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(OrderRejection::NoItems),
    };

    let total = Numeric::coerce(body.get("total")).value();
    match (calculated_total(items), total) {
        (Some(calculated), Some(total)) if (calculated - total).abs() <= TOTAL_TOLERANCE => Ok(()),
        _ => Err(OrderRejection::TotalMismatch),
    }
}

/// Stamp `createdAt` and the initial status onto an accepted order.
pub fn stamp_new_order(body: &mut Body, ctx: &StageContext) {
    body.insert("createdAt".to_string(), Value::String(ctx.timestamp()));
    body.insert(
        "status".to_string(),
        Value::String(OrderStatus::Pending.as_str().to_string()),
    );
}

/// Validation stage for `POST /orders`: validate, then stamp.
#[derive(Debug, Default, Copy, Clone)]
pub struct OrderValidator;

impl ValidationStage for OrderValidator {
    fn name(&self) -> &'static str {
        "orders"
    }

    fn applies_to(&self, target: &RequestTarget<'_>) -> bool {
        target.is(Verb::Post, ORDERS_PATH)
    }

    fn check(&self, body: &mut Body, ctx: &StageContext) -> StageOutcome {
        if let Err(e) = validate_order(body) {
            return StageOutcome::Reject(e.into());
        }
        stamp_new_order(body, ctx);
        StageOutcome::Continue
    }
}
