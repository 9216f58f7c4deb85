//! HTTP surface.
//!
//! - `templates` - upload, metadata, placeholders, preview and generation
//!   for stored templates
//! - `documents` - per-kind generation under `/api/{quotes|contracts|labels|payments}`
//! - `catalog` - option lists served to the forms
//! - `error` - `GeneratorError` to `ErrorResponse` mapping

pub mod catalog;
pub mod documents;
pub mod error;
pub mod templates;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::generators::{DocumentService, RenderBackend, TypstRenderEngine};
use crate::templates::{CommandTextExtractor, InMemoryTemplateStore, TemplateStore};

pub struct AppState {
    pub service: DocumentService,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the process-local store, the pandoc extractor and the Typst engine.
    pub fn new(config: AppConfig) -> Self {
        let store: Arc<dyn TemplateStore> = Arc::new(InMemoryTemplateStore::new());
        let backend: Arc<dyn RenderBackend> =
            Arc::new(TypstRenderEngine::new(config.render.clone()));
        Self::with_parts(config, store, backend)
    }

    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn TemplateStore>,
        backend: Arc<dyn RenderBackend>,
    ) -> Self {
        let extractor = Arc::new(CommandTextExtractor::new(config.pandoc_binary.clone()));
        let service = DocumentService::new(store, extractor, backend, config.default_vat_rate);
        Self { service, config }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store_available: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_available: state.service.store().is_available(),
    })
}

/// Routes under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(templates::config)
        .configure(catalog::config)
        .configure(documents::config);
}
