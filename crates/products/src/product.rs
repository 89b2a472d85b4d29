use serde_json::Value;

use shopfront_core::{
    Body, FieldErrors, Numeric, RequestTarget, StageContext, StageOutcome, ValidationStage, Verb,
};

/// Collection path guarded by [`ProductValidator`].
pub const PRODUCTS_PATH: &str = "/products";

/// Text fields of a product submission and their minimum lengths.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Brand,
    Category,
    Description,
}

impl ProductField {
    pub const TEXT_FIELDS: [ProductField; 4] = [
        ProductField::Name,
        ProductField::Brand,
        ProductField::Category,
        ProductField::Description,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Brand => "brand",
            ProductField::Category => "category",
            ProductField::Description => "description",
        }
    }

    /// Minimum length in characters.
    pub fn min_len(&self) -> usize {
        match self {
            ProductField::Description => 10,
            _ => 2,
        }
    }

    fn too_short_message(&self) -> String {
        format!(
            "The {} length should be at least {} characters",
            self.key(),
            self.min_len()
        )
    }

    fn check(&self, body: &Body, errors: &mut FieldErrors) {
        match body.get(self.key()) {
            None | Some(Value::Null) => errors.insert(self.key(), required_message(self.key())),
            Some(Value::String(s)) if s.chars().count() >= self.min_len() => {}
            Some(_) => errors.insert(self.key(), self.too_short_message()),
        }
    }
}

const PRICE_KEY: &str = "price";
const INVALID_PRICE: &str = "The price is not valid";

fn required_message(key: &str) -> String {
    format!("The {key} is required")
}

/// Set `createdAt` to the context's timestamp, replacing any previous value.
pub fn stamp_created_at(body: &mut Body, ctx: &StageContext) {
    body.insert("createdAt".to_string(), Value::String(ctx.timestamp()));
}

/// Replace a textual `price` with its numeric value.
///
/// Returns the coercion outcome; an unparsable price is left untouched so the
/// range check reports it.
pub fn coerce_price(body: &mut Body) -> Numeric {
    let price = Numeric::coerce(body.get(PRICE_KEY));
    if let Some(number) = price.to_json() {
        body.insert(PRICE_KEY.to_string(), number);
    }
    price
}

/// Check every product rule, collecting all violations.
///
/// Expects `price` to have gone through [`coerce_price`] already.
pub fn validate_product(body: &Body) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for field in ProductField::TEXT_FIELDS {
        field.check(body, &mut errors);
    }

    match Numeric::coerce(body.get(PRICE_KEY)) {
        Numeric::Absent => errors.insert(PRICE_KEY, required_message(PRICE_KEY)),
        Numeric::Value(price) if price > 0.0 => {}
        Numeric::Value(_) | Numeric::Unparsable => errors.insert(PRICE_KEY, INVALID_PRICE),
    }

    errors.into_result()
}

/// Validation stage for `POST /products`: stamp, coerce, then validate.
#[derive(Debug, Default, Copy, Clone)]
pub struct ProductValidator;

impl ValidationStage for ProductValidator {
    fn name(&self) -> &'static str {
        "products"
    }

    fn applies_to(&self, target: &RequestTarget<'_>) -> bool {
        target.is(Verb::Post, PRODUCTS_PATH)
    }

    fn check(&self, body: &mut Body, ctx: &StageContext) -> StageOutcome {
        stamp_created_at(body, ctx);
        coerce_price(body);
        validate_product(body).into()
    }
}
