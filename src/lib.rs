use actix_web::middleware::Compress;
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod config;
pub mod generators;
pub mod metrics;
pub mod templates;

pub use crate::api::AppState;
pub use crate::config::AppConfig;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health,
        crate::api::templates::list_templates,
        crate::api::templates::upload_template,
        crate::api::templates::get_template,
        crate::api::templates::get_placeholders,
        crate::api::templates::preview_template,
        crate::api::templates::generate_from_template,
        crate::api::templates::update_template,
        crate::api::templates::delete_template,
        crate::api::documents::generate_quote,
        crate::api::documents::generate_contract,
        crate::api::documents::generate_label,
        crate::api::documents::generate_payment,
        crate::api::catalog::contract_templates,
        crate::api::catalog::label_types,
        crate::api::catalog::payment_types,
        crate::api::catalog::quote_templates
    ),
    components(
        schemas(
            ErrorResponse,
            api::HealthResponse,
            api::templates::TemplateResponse,
            api::templates::TemplateListResponse,
            api::templates::UploadTemplateRequest,
            api::documents::GeneratedTextResponse,
            api::catalog::CatalogueResponse,
            templates::Template,
            templates::TemplatePatch,
            templates::FieldSchema,
            templates::FieldType,
            templates::SourceFormat,
            templates::CatalogueEntry,
            generators::PlaceholderListing,
            generators::Preview,
            generators::DocumentKind,
            generators::OutputMode,
            generators::LineItem,
            generators::quote::QuoteRequest,
            generators::quote::QuoteSettings,
            generators::payment::PaymentRequest,
            generators::payment::PaymentInfo,
            generators::label::LabelRequest,
            generators::label::Product,
            generators::party::Party,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoint."),
        (name = "Templates", description = "Template upload, preview and generation."),
        (name = "Documents", description = "Quote, contract, label and payment generation."),
        (name = "Catalogues", description = "Option lists for the document forms.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost server")
    )
)]
pub struct ApiDoc;

/// Every route of the service; shared by `run` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(api::health))
        .route("/metrics/documents", web::get().to(metrics::document_metrics))
        .service(web::scope("/api").configure(api::config));
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };
    if config.pandoc_binary.is_none() {
        log::warn!("PANDOC_BIN is not set; .docx templates cannot be read");
    }

    let bind = (config.host.clone(), config.port);
    let max_upload_bytes = config.max_upload_bytes;
    let app_state = web::Data::new(AppState::new(config));

    let prometheus = PrometheusMetricsBuilder::new("docgen_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(max_upload_bytes))
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind)?
    .run()
    .await
}
