use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use futures_util::TryStreamExt;
use sanitize_filename::sanitize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::documents::{document_response, GeneratedTextResponse, GenerateQuery};
use super::AppState;
use crate::generators::{
    DataBag, DocumentKind, GenerateTarget, GeneratorError, PlaceholderListing, Preview,
};
use crate::templates::{NewTemplate, SourceFormat, Template, TemplateFilter, TemplatePatch};
use crate::ErrorResponse;

/// Multipart form accepted by the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadTemplateRequest {
    /// .txt or .docx file
    #[schema(value_type = String, format = Binary)]
    pub template: Vec<u8>,
    pub name: String,
    pub description: Option<String>,
    /// quote | contract | label | payment
    pub category: String,
}

#[derive(Serialize, ToSchema)]
pub struct TemplateResponse {
    pub success: bool,
    pub message: String,
    pub data: Template,
}

#[derive(Serialize, ToSchema)]
pub struct TemplateListResponse {
    pub success: bool,
    pub data: Vec<Template>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Multipart field error: {0}")]
    Field(String),
    #[error("Invalid UTF-8 data in field '{0}'")]
    Utf8(String),
    #[error("Vui lòng chọn file để upload")]
    MissingFile,
    #[error("Tên template và danh mục là bắt buộc")]
    MissingMetadata,
    #[error("Chỉ chấp nhận file {}", SourceFormat::ALLOWED_EXTENSIONS.join(", "))]
    UnsupportedFile(String),
    #[error("File vượt quá giới hạn {0} bytes")]
    TooLarge(usize),
}

impl From<UploadError> for HttpResponse {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::UnsupportedFile(_) => HttpResponse::UnsupportedMediaType()
                .json(ErrorResponse::new("UnsupportedMediaType", &error.to_string())),
            UploadError::TooLarge(_) => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &error.to_string())),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string())),
        }
    }
}

struct ParsedUpload {
    filename: String,
    content: Vec<u8>,
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

async fn read_field(
    field: &mut actix_multipart::Field,
    name: &str,
    limit: usize,
) -> Result<Vec<u8>, UploadError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| UploadError::Field(e.to_string()))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    log::debug!("Read {} bytes from field '{}'", bytes.len(), name);
    Ok(bytes)
}

async fn read_text(
    field: &mut actix_multipart::Field,
    name: &str,
    limit: usize,
) -> Result<Option<String>, UploadError> {
    let bytes = read_field(field, name, limit).await?;
    let value = String::from_utf8(bytes).map_err(|_| UploadError::Utf8(name.to_string()))?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

async fn parse_upload(mut payload: Multipart, limit: usize) -> Result<ParsedUpload, UploadError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut name = None;
    let mut description = None;
    let mut category = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Field(e.to_string()))?
    {
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| UploadError::Field("Content-Disposition not set".to_string()))?;
        let field_name = content_disposition
            .get_name()
            .ok_or_else(|| UploadError::Field("No field name".to_string()))?
            .to_string();
        let filename = content_disposition.get_filename().map(sanitize);

        match field_name.as_str() {
            "template" => {
                let filename = filename.ok_or(UploadError::MissingFile)?;
                if SourceFormat::from_filename(&filename).is_none() {
                    return Err(UploadError::UnsupportedFile(filename));
                }
                let content = read_field(&mut field, &field_name, limit).await?;
                file = Some((filename, content));
            }
            "name" => name = read_text(&mut field, &field_name, limit).await?,
            "description" => description = read_text(&mut field, &field_name, limit).await?,
            "category" => category = read_text(&mut field, &field_name, limit).await?,
            _ => continue,
        }
    }

    let (filename, content) = file.ok_or(UploadError::MissingFile)?;
    if content.is_empty() {
        return Err(UploadError::MissingFile);
    }
    Ok(ParsedUpload {
        filename,
        content,
        name,
        description,
        category,
    })
}

fn data_bag(body: Value) -> Result<DataBag, HttpResponse> {
    match body {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(DataBag::new()),
        _ => Err(HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Request body must be a JSON object"))),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        GeneratorError::TemplateNotFound(raw.to_string()).error_response()
    })
}

#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    params(TemplateFilter),
    responses(
        (status = 200, description = "Active templates", body = TemplateListResponse),
        (status = 503, description = "Template store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_templates(
    state: web::Data<AppState>,
    query: web::Query<TemplateFilter>,
) -> impl Responder {
    match state.service.store().list(&query).await {
        Ok(templates) => HttpResponse::Ok().json(TemplateListResponse {
            success: true,
            data: templates,
        }),
        Err(e) => {
            log::error!("Failed to list templates: {}", e);
            GeneratorError::from(e).error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/templates/upload",
    tag = "Templates",
    request_body(content = inline(UploadTemplateRequest), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Template stored", body = TemplateResponse),
        (status = 400, description = "Missing file, name or category", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 503, description = "Template store unavailable", body = ErrorResponse)
    )
)]
pub async fn upload_template(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    log::info!("Executing upload_template handler");
    let upload = match parse_upload(payload, state.config.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(e) => {
            log::warn!("Rejected template upload: {}", e);
            return HttpResponse::from(e);
        }
    };

    let (name, category) = match (upload.name, upload.category) {
        (Some(name), Some(category)) => (name, category),
        _ => return HttpResponse::from(UploadError::MissingMetadata),
    };
    let category = match category.parse::<DocumentKind>() {
        Ok(kind) => kind,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
        }
    };
    let source_format = match SourceFormat::from_filename(&upload.filename) {
        Some(format) => format,
        None => return HttpResponse::from(UploadError::UnsupportedFile(upload.filename)),
    };

    let new = NewTemplate {
        name,
        description: upload.description,
        category,
        source_format,
        original_name: upload.filename,
        content: upload.content,
    };
    match state.service.register_template(new).await {
        Ok(template) => {
            log::info!("Template {} stored", template.id);
            HttpResponse::Created().json(TemplateResponse {
                success: true,
                message: "Upload template thành công".to_string(),
                data: template,
            })
        }
        Err(e) => {
            log::error!("Failed to store template: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template metadata", body = Template),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn get_template(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.service.store().get(id).await {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => GeneratorError::from(e).error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}/placeholders",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID or built-in contract id")),
    responses(
        (status = 200, description = "Placeholder names and text preview", body = PlaceholderListing),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 415, description = "Template content cannot be read", body = ErrorResponse)
    )
)]
pub async fn get_placeholders(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match state.service.list_placeholders(&path).await {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/templates/{id}/preview",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID or built-in contract id")),
    request_body = Object,
    responses(
        (status = 200, description = "Bound text", body = Preview),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn preview_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> impl Responder {
    let data = match data_bag(body.into_inner()) {
        Ok(data) => data,
        Err(response) => return response,
    };
    match state.service.preview(&path, data).await {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/templates/{id}/generate",
    tag = "Templates",
    params(
        ("id" = String, Path, description = "Template ID or built-in contract id"),
        GenerateQuery
    ),
    request_body = Object,
    responses(
        (status = 200, description = "PDF file, or text when requested or as fallback", body = GeneratedTextResponse),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn generate_from_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<GenerateQuery>,
    body: web::Json<Value>,
) -> impl Responder {
    let data = match data_bag(body.into_inner()) {
        Ok(data) => data,
        Err(response) => return response,
    };
    match state
        .service
        .generate(GenerateTarget::Template(path.into_inner()), data, query.mode)
        .await
    {
        Ok(doc) => document_response(doc),
        Err(e) => {
            log::warn!("Template generation failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    request_body = TemplatePatch,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn update_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TemplatePatch>,
) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.service.store().update(id, body.into_inner()).await {
        Ok(template) => HttpResponse::Ok().json(TemplateResponse {
            success: true,
            message: "Cập nhật template thành công".to_string(),
            data: template,
        }),
        Err(e) => GeneratorError::from(e).error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deactivated"),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn delete_template(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.service.store().deactivate(id).await {
        Ok(()) => {
            log::info!("Template {} deactivated", id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => GeneratorError::from(e).error_response(),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/templates").route(web::get().to(list_templates)))
        .service(web::resource("/templates/upload").route(web::post().to(upload_template)))
        .service(
            web::resource("/templates/{id}")
                .route(web::get().to(get_template))
                .route(web::put().to(update_template))
                .route(web::delete().to(delete_template)),
        )
        .service(
            web::resource("/templates/{id}/placeholders").route(web::get().to(get_placeholders)),
        )
        .service(web::resource("/templates/{id}/preview").route(web::post().to(preview_template)))
        .service(
            web::resource("/templates/{id}/generate").route(web::post().to(generate_from_template)),
        );
}
