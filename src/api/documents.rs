use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::AppState;
use crate::generators::label::LabelRequest;
use crate::generators::payment::PaymentRequest;
use crate::generators::quote::QuoteRequest;
use crate::generators::{
    DataBag, DocumentKind, GenerateTarget, GeneratedDocument, OutputMode, RenderedContent,
};
use crate::ErrorResponse;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateQuery {
    /// pdf | text; defaults to text for quotes and pdf otherwise
    pub mode: Option<OutputMode>,
}

/// Text body returned instead of a PDF file.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTextResponse {
    pub success: bool,
    /// `text` when requested, `fallback` when PDF rendering failed
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
    pub mime_type: String,
    pub generated_at: String,
    pub message: String,
}

fn success_message(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Quote => "Báo giá được tạo thành công",
        DocumentKind::Contract => "Hợp đồng được tạo thành công",
        DocumentKind::Label => "Tem dán được tạo thành công",
        DocumentKind::Payment => "Phiếu thanh toán được tạo thành công",
    }
}

/// PDF as an attachment, text as JSON.
pub fn document_response(doc: GeneratedDocument) -> HttpResponse {
    let mime_type = doc.mime_type();
    let generated_at = doc.generated_at.to_rfc3339();
    match doc.content {
        RenderedContent::Pdf(bytes) => HttpResponse::Ok()
            .content_type(mime_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(doc.filename)],
            })
            .body(bytes),
        RenderedContent::Text(content) => {
            let (content_type, message) = if doc.fallback {
                (
                    "fallback",
                    "Không thể tạo PDF, đã trả về nội dung dạng văn bản",
                )
            } else {
                ("text", success_message(doc.kind))
            };
            HttpResponse::Ok().json(GeneratedTextResponse {
                success: true,
                content_type: content_type.to_string(),
                content,
                mime_type: mime_type.to_string(),
                generated_at,
                message: message.to_string(),
            })
        }
    }
}

async fn generate_kind(
    state: &AppState,
    kind: DocumentKind,
    body: Value,
    mode: Option<OutputMode>,
) -> HttpResponse {
    let data: DataBag = match body {
        Value::Object(map) => map,
        _ => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("Request body must be a JSON object"))
        }
    };

    match state
        .service
        .generate(GenerateTarget::Kind(kind), data, mode)
        .await
    {
        Ok(doc) => document_response(doc),
        Err(e) => {
            log::warn!("Failed to generate {}: {}", kind, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/quotes/generate",
    tag = "Documents",
    params(GenerateQuery),
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Quote text, or PDF when mode=pdf", body = GeneratedTextResponse),
        (status = 400, description = "Invalid quote data", body = ErrorResponse)
    )
)]
pub async fn generate_quote(
    state: web::Data<AppState>,
    query: web::Query<GenerateQuery>,
    body: web::Json<Value>,
) -> impl Responder {
    generate_kind(&state, DocumentKind::Quote, body.into_inner(), query.mode).await
}

/// Body: `template` plus the contract data bag (`partyA`, `partyB`, fields).
#[utoipa::path(
    post,
    path = "/api/contracts/generate",
    tag = "Documents",
    params(GenerateQuery),
    request_body = Object,
    responses(
        (status = 200, description = "Contract PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid contract data", body = ErrorResponse),
        (status = 404, description = "Contract template not found", body = ErrorResponse)
    )
)]
pub async fn generate_contract(
    state: web::Data<AppState>,
    query: web::Query<GenerateQuery>,
    body: web::Json<Value>,
) -> impl Responder {
    generate_kind(&state, DocumentKind::Contract, body.into_inner(), query.mode).await
}

#[utoipa::path(
    post,
    path = "/api/labels/generate",
    tag = "Documents",
    params(GenerateQuery),
    request_body = LabelRequest,
    responses(
        (status = 200, description = "Label sheet PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid label data", body = ErrorResponse)
    )
)]
pub async fn generate_label(
    state: web::Data<AppState>,
    query: web::Query<GenerateQuery>,
    body: web::Json<Value>,
) -> impl Responder {
    generate_kind(&state, DocumentKind::Label, body.into_inner(), query.mode).await
}

#[utoipa::path(
    post,
    path = "/api/payments/generate",
    tag = "Documents",
    params(GenerateQuery),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment voucher PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid payment data", body = ErrorResponse)
    )
)]
pub async fn generate_payment(
    state: web::Data<AppState>,
    query: web::Query<GenerateQuery>,
    body: web::Json<Value>,
) -> impl Responder {
    generate_kind(&state, DocumentKind::Payment, body.into_inner(), query.mode).await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/quotes/generate", web::post().to(generate_quote))
        .route("/contracts/generate", web::post().to(generate_contract))
        .route("/labels/generate", web::post().to(generate_label))
        .route("/payments/generate", web::post().to(generate_payment));
}
