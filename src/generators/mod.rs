//! Generators module - the document generation core.
//!
//! Everything here is pure, in-memory work except the PDF engine, which shells
//! out to the Typst compiler:
//! - `placeholder` - discovers bracketed field tokens in template text
//! - `binder` - substitutes data bag values into those tokens
//! - `totals` - line/VAT/grand totals for itemized documents
//! - `quote`, `payment`, `contract`, `label` - per-kind requests and layouts
//! - `assembler` - turns a prepared request into a `DocumentPlan`
//! - `text`, `engine` - text and PDF render backends
//! - `service` - the request pipeline with the single text fallback edge

pub mod assembler;
pub mod binder;
pub mod common;
pub mod contract;
pub mod engine;
pub mod label;
pub mod party;
pub mod payment;
pub mod placeholder;
pub mod plan;
pub mod quote;
pub mod service;
pub mod stamp;
pub mod styles;
pub mod text;
pub mod totals;
pub mod traits;
pub mod validation;

pub use assembler::{AssemblyContext, DocumentContent};
pub use binder::{bind, bind_nested, BindMode, Binder, DataBag};
pub use engine::{RenderConfig, RenderError, TypstRenderEngine};
pub use placeholder::extract;
pub use plan::{DocumentKind, DocumentPlan};
pub use service::{DocumentService, GenerateTarget, PlaceholderListing, Preview};
pub use text::TextRenderer;
pub use totals::{compute_totals, LineItem, Totals};
pub use traits::{Assemble, RenderBackend, Validator};
pub use validation::{ValidationError, ValidationErrors};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("invalid request data: {0}")]
    InvalidData(#[source] serde_json::Error),
    #[error("template '{0}' not found")]
    TemplateNotFound(String),
    #[error("unknown document kind '{0}'")]
    UnknownKind(String),
    #[error("unsupported template format: {0}")]
    UnsupportedFormat(String),
    #[error("template store is unavailable: {0}")]
    StoreUnavailable(String),
    #[error("PDF rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl From<crate::templates::StoreError> for GeneratorError {
    fn from(err: crate::templates::StoreError) -> Self {
        use crate::templates::StoreError;
        match err {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
            StoreError::NotFound(id) => Self::TemplateNotFound(id),
        }
    }
}

/// Requested output of a generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Pdf,
    Text,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

/// Rendered bytes or text, returned once and never retained.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedContent {
    Pdf(Vec<u8>),
    Text(String),
}

impl RenderedContent {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "application/pdf",
            Self::Text(_) => "text/plain; charset=utf-8",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Pdf(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a successful document generation.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub kind: DocumentKind,
    pub content: RenderedContent,
    pub generated_at: DateTime<Local>,
    /// Set when PDF rendering failed and the text rendition was returned instead.
    pub fallback: bool,
}

impl GeneratedDocument {
    pub fn mime_type(&self) -> &'static str {
        self.content.mime_type()
    }
}
