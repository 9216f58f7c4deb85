use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::templates::builtin::{CONTRACT_TEMPLATES, LABEL_TYPES, PAYMENT_TYPES, QUOTE_TEMPLATES};
use crate::templates::CatalogueEntry;

#[derive(Serialize, ToSchema)]
pub struct CatalogueResponse {
    pub success: bool,
    pub data: Vec<CatalogueEntry>,
}

fn catalogue(entries: &[CatalogueEntry]) -> HttpResponse {
    HttpResponse::Ok().json(CatalogueResponse {
        success: true,
        data: entries.to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/api/contracts/templates",
    tag = "Catalogues",
    responses(
        (status = 200, description = "Contract template kinds", body = CatalogueResponse)
    )
)]
pub async fn contract_templates() -> impl Responder {
    catalogue(&CONTRACT_TEMPLATES)
}

#[utoipa::path(
    get,
    path = "/api/labels/types",
    tag = "Catalogues",
    responses(
        (status = 200, description = "Label categories", body = CatalogueResponse)
    )
)]
pub async fn label_types() -> impl Responder {
    catalogue(&LABEL_TYPES)
}

#[utoipa::path(
    get,
    path = "/api/payments/types",
    tag = "Catalogues",
    responses(
        (status = 200, description = "Payment voucher types", body = CatalogueResponse)
    )
)]
pub async fn payment_types() -> impl Responder {
    catalogue(&PAYMENT_TYPES)
}

#[utoipa::path(
    get,
    path = "/api/quotes/templates",
    tag = "Catalogues",
    responses(
        (status = 200, description = "Quote layouts", body = CatalogueResponse)
    )
)]
pub async fn quote_templates() -> impl Responder {
    catalogue(&QUOTE_TEMPLATES)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/contracts/templates", web::get().to(contract_templates))
        .route("/labels/types", web::get().to(label_types))
        .route("/payments/types", web::get().to(payment_types))
        .route("/quotes/templates", web::get().to(quote_templates));
}
