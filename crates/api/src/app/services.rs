use std::sync::Arc;

use anyhow::Context;

use shopfront_auth::AccessRules;
use shopfront_core::ValidationPipeline;
use shopfront_infra::{DocumentStore, ImageStore, JsonFileStore};
use shopfront_orders::OrderValidator;
use shopfront_products::ProductValidator;

use crate::config::AppConfig;

/// Everything the handlers need, built once at startup.
pub struct AppServices {
    pub store: Arc<dyn DocumentStore>,
    pub images: ImageStore,
    pub pipeline: ValidationPipeline,
    pub rules: AccessRules,
}

impl AppServices {
    pub fn new(store: Arc<dyn DocumentStore>, images: ImageStore, rules: AccessRules) -> Self {
        Self {
            store,
            images,
            pipeline: validation_pipeline(),
            rules,
        }
    }
}

/// One stage per validated resource, in a fixed order.
pub fn validation_pipeline() -> ValidationPipeline {
    ValidationPipeline::new()
        .with_stage(ProductValidator)
        .with_stage(OrderValidator)
}

pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = JsonFileStore::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;

    Ok(AppServices::new(
        Arc::new(store),
        ImageStore::new(&config.images_dir),
        config.access_rules.clone(),
    ))
}
