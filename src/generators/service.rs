//! The generation pipeline.
//!
//! `Received -> Bound -> Computed -> Assembled -> Rendered -> Returned`, with
//! exactly one recovery edge: a failed PDF render returns the text rendition
//! of the same plan, tagged as a fallback. Nothing is retried.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::assembler::{AssemblyContext, DocumentContent};
use super::binder::{apply_auto_fields, Binder, DataBag};
use super::common::sanitize_filename;
use super::contract::{ContractRequest, FlowedDocument};
use super::engine::RenderError;
use super::label::LabelRequest;
use super::payment::PaymentRequest;
use super::placeholder::extract_list;
use super::plan::{DocumentKind, DocumentPlan};
use super::quote::QuoteRequest;
use super::text::TextRenderer;
use super::traits::{Assemble, RenderBackend, Validator};
use super::{GeneratedDocument, GeneratorError, OutputMode, RenderedContent};
use crate::metrics;
use crate::templates::builtin::{builtin, is_contract_kind};
use crate::templates::model::{apply_field_defaults, validate_fields};
use crate::templates::{
    FieldSchema, NewTemplate, Template, TemplateContent, TemplateStore, TextExtractor,
};

const PREVIEW_CHARS: usize = 500;

/// What to generate: a stored or built-in template by id, or a built-in kind.
#[derive(Debug, Clone)]
pub enum GenerateTarget {
    Template(String),
    Kind(DocumentKind),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderListing {
    pub template_id: String,
    pub placeholders: Vec<String>,
    /// First characters of the template text.
    pub preview_text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub content: String,
    pub placeholders: Vec<String>,
    /// Placeholders still present in `content` after binding.
    pub unresolved: Vec<String>,
    #[schema(value_type = String, format = DateTime)]
    pub generated_at: DateTime<Local>,
}

/// Template text plus what is known about its fields.
struct SourceText {
    title: String,
    kind: DocumentKind,
    text: String,
    fields: Vec<FieldSchema>,
    is_contract: bool,
}

pub struct DocumentService {
    store: Arc<dyn TemplateStore>,
    extractor: Arc<dyn TextExtractor>,
    backend: Arc<dyn RenderBackend>,
    default_vat_rate: f64,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn TemplateStore>,
        extractor: Arc<dyn TextExtractor>,
        backend: Arc<dyn RenderBackend>,
        default_vat_rate: f64,
    ) -> Self {
        Self {
            store,
            extractor,
            backend,
            default_vat_rate,
        }
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    fn ensure_store(&self) -> Result<(), GeneratorError> {
        if self.store.is_available() {
            Ok(())
        } else {
            log::error!("Template store is unavailable");
            Err(GeneratorError::StoreUnavailable(
                "template store is not available".to_string(),
            ))
        }
    }

    /// Read an upload once, discover its placeholders and store it.
    pub async fn register_template(&self, new: NewTemplate) -> Result<Template, GeneratorError> {
        self.ensure_store()?;

        let text = self
            .extract_text(TemplateContent {
                data: new.content.clone(),
                source_format: new.source_format,
            })
            .await?;
        let placeholders = extract_list(&text);
        log::info!(
            "Registering template '{}' with {} placeholder(s)",
            new.name,
            placeholders.len()
        );

        let template = Template::create(new, placeholders);
        Ok(self.store.insert(template).await?)
    }

    /// Extraction may shell out to pandoc, so it runs on the blocking pool.
    async fn extract_text(&self, content: TemplateContent) -> Result<String, GeneratorError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&content))
            .await
            .map_err(|e| {
                GeneratorError::UnsupportedFormat(format!("text extraction stopped: {}", e))
            })?
    }

    async fn source_text(&self, id: &str) -> Result<SourceText, GeneratorError> {
        let id = id.trim();
        if let Some(template) = builtin(id) {
            return Ok(SourceText {
                title: template.title.to_string(),
                kind: DocumentKind::Contract,
                text: template.body.to_string(),
                fields: template.fields.clone(),
                is_contract: true,
            });
        }
        if is_contract_kind(id) {
            // Listed in the catalogue but has no body.
            return Err(GeneratorError::TemplateNotFound(id.to_string()));
        }

        let uuid =
            Uuid::parse_str(id).map_err(|_| GeneratorError::TemplateNotFound(id.to_string()))?;
        self.ensure_store()?;
        let template = self.store.get(uuid).await?;
        let content = self.store.get_content(uuid).await?;
        let text = self.extract_text(content).await?;

        Ok(SourceText {
            title: template.name,
            kind: template.category,
            text,
            fields: template.fields,
            is_contract: false,
        })
    }

    /// Placeholder names of a template and the start of its text.
    pub async fn list_placeholders(&self, id: &str) -> Result<PlaceholderListing, GeneratorError> {
        let source = self.source_text(id).await?;
        Ok(PlaceholderListing {
            template_id: id.trim().to_string(),
            placeholders: extract_list(&source.text),
            preview_text: source.text.chars().take(PREVIEW_CHARS).collect(),
        })
    }

    /// Bind without validation so incomplete data can be reviewed.
    pub async fn preview(&self, id: &str, data: DataBag) -> Result<Preview, GeneratorError> {
        let source = self.source_text(id).await?;
        let now = Local::now();
        let content = bind_source(&source, data, now);

        Ok(Preview {
            placeholders: extract_list(&source.text),
            unresolved: extract_list(&content),
            content,
            generated_at: now,
        })
    }

    /// Run the full pipeline. `mode` defaults per kind.
    pub async fn generate(
        &self,
        target: GenerateTarget,
        data: DataBag,
        mode: Option<OutputMode>,
    ) -> Result<GeneratedDocument, GeneratorError> {
        let now = Local::now();
        let (content, stem) = self.prepare(target, data, now).await?;
        let kind = content.kind();
        let mode = mode.unwrap_or_else(|| kind.default_mode());
        log::info!("Generating {} document as {}", kind, mode.as_str());

        let ctx = AssemblyContext::new(now, self.default_vat_rate);
        let plan = content.assemble(&ctx);

        Ok(self.render(plan, mode, &stem, now).await)
    }

    async fn prepare(
        &self,
        target: GenerateTarget,
        data: DataBag,
        now: DateTime<Local>,
    ) -> Result<(DocumentContent, String), GeneratorError> {
        match target {
            GenerateTarget::Template(id) => {
                let source = self.source_text(&id).await?;
                let stem = sanitize_filename(&source.title, source.kind.file_stem());
                let document = self.bind_validated(&source, data, now)?;
                Ok((DocumentContent::Flowed(document), stem))
            }
            GenerateTarget::Kind(kind) => {
                let stem = kind.file_stem().to_string();
                let content = match kind {
                    DocumentKind::Quote => {
                        let request: QuoteRequest = parse(data)?;
                        request.validate()?;
                        DocumentContent::Quote(request)
                    }
                    DocumentKind::Payment => {
                        let request: PaymentRequest = parse(data)?;
                        request.validate()?;
                        DocumentContent::Payment(request)
                    }
                    DocumentKind::Label => {
                        let request: LabelRequest = parse(data)?;
                        request.validate()?;
                        DocumentContent::Label(request)
                    }
                    DocumentKind::Contract => {
                        let request: ContractRequest = parse(data)?;
                        request.validate()?;
                        let id = request.template.clone().unwrap_or_default();
                        let source = self.source_text(&id).await?;
                        DocumentContent::Flowed(self.bind_validated(&source, request.data, now)?)
                    }
                };
                Ok((content, stem))
            }
        }
    }

    fn bind_validated(
        &self,
        source: &SourceText,
        mut data: DataBag,
        now: DateTime<Local>,
    ) -> Result<FlowedDocument, GeneratorError> {
        apply_field_defaults(&source.fields, &mut data);
        apply_auto_fields(&mut data, now);
        validate_fields(&source.fields, &data)?;

        let body = Binder::nested().bind(&source.text, &data);
        let mut document = if source.is_contract {
            FlowedDocument::contract(source.title.clone(), body, &data)
        } else {
            FlowedDocument::plain(source.title.clone(), body)
        };
        document.kind = source.kind;
        Ok(document)
    }

    /// Render a plan, degrading to text when the PDF backend fails.
    pub async fn render(
        &self,
        plan: DocumentPlan,
        mode: OutputMode,
        stem: &str,
        generated_at: DateTime<Local>,
    ) -> GeneratedDocument {
        let kind = plan.kind;

        if mode == OutputMode::Text {
            metrics::record_generation(kind, "text");
            return GeneratedDocument {
                filename: format!("{}.txt", stem),
                kind,
                content: RenderedContent::Text(TextRenderer::render(&plan)),
                generated_at,
                fallback: false,
            };
        }

        let backend = Arc::clone(&self.backend);
        let plan = Arc::new(plan);
        let render_plan = Arc::clone(&plan);
        let result = tokio::task::spawn_blocking(move || backend.render_pdf(&render_plan))
            .await
            .map_err(|e| RenderError::Join(e.to_string()))
            .and_then(|r| r);

        match result {
            Ok(pdf) => {
                log::info!("Rendered {} PDF ({} bytes)", kind, pdf.len());
                metrics::record_generation(kind, "pdf");
                GeneratedDocument {
                    filename: format!("{}.pdf", stem),
                    kind,
                    content: RenderedContent::Pdf(pdf),
                    generated_at,
                    fallback: false,
                }
            }
            Err(err) => {
                log::warn!("PDF rendering failed for {}, returning text: {}", kind, err);
                metrics::record_generation(kind, "fallback");
                GeneratedDocument {
                    filename: format!("{}.txt", stem),
                    kind,
                    content: RenderedContent::Text(TextRenderer::render(&plan)),
                    generated_at,
                    fallback: true,
                }
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(data: DataBag) -> Result<T, GeneratorError> {
    serde_json::from_value(Value::Object(data)).map_err(GeneratorError::InvalidData)
}

fn bind_source(source: &SourceText, mut data: DataBag, now: DateTime<Local>) -> String {
    apply_field_defaults(&source.fields, &mut data);
    apply_auto_fields(&mut data, now);
    Binder::nested().bind(&source.text, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{CommandTextExtractor, InMemoryTemplateStore, SourceFormat};
    use serde_json::json;

    struct FailingBackend;

    impl RenderBackend for FailingBackend {
        fn render_pdf(&self, _plan: &DocumentPlan) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::EmptyOutput)
        }
    }

    struct FixedBackend;

    impl RenderBackend for FixedBackend {
        fn render_pdf(&self, _plan: &DocumentPlan) -> Result<Vec<u8>, RenderError> {
            Ok(b"%PDF-1.7".to_vec())
        }
    }

    fn service(backend: Arc<dyn RenderBackend>) -> DocumentService {
        DocumentService::new(
            Arc::new(InMemoryTemplateStore::new()),
            Arc::new(CommandTextExtractor::default()),
            backend,
            10.0,
        )
    }

    /// Plain-text extractor that remembers which thread ran it.
    #[derive(Default)]
    struct RecordingExtractor {
        threads: parking_lot::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl TextExtractor for RecordingExtractor {
        fn extract(&self, content: &TemplateContent) -> Result<String, GeneratorError> {
            self.threads.lock().push(std::thread::current().id());
            Ok(String::from_utf8_lossy(&content.data).into_owned())
        }
    }

    fn bag(value: Value) -> DataBag {
        value.as_object().cloned().unwrap()
    }

    async fn upload(service: &DocumentService, text: &str) -> Template {
        service
            .register_template(NewTemplate {
                name: "Thư mời".to_string(),
                description: None,
                category: DocumentKind::Contract,
                source_format: SourceFormat::PlainText,
                original_name: "thu-moi.txt".to_string(),
                content: text.as_bytes().to_vec(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_discovers_placeholders_once() {
        let service = service(Arc::new(FixedBackend));
        let template = upload(&service, "Kính gửi [NAME], {{NAME}} - {DATE}").await;
        assert_eq!(template.placeholders, vec!["DATE", "NAME"]);

        let listing = service
            .list_placeholders(&template.id.to_string())
            .await
            .unwrap();
        assert_eq!(listing.placeholders, vec!["DATE", "NAME"]);
        assert!(listing.preview_text.starts_with("Kính gửi"));
    }

    #[tokio::test]
    async fn test_extraction_runs_off_the_runtime_thread() {
        let extractor = Arc::new(RecordingExtractor::default());
        let service = DocumentService::new(
            Arc::new(InMemoryTemplateStore::new()),
            extractor.clone(),
            Arc::new(FixedBackend),
            10.0,
        );
        let template = upload(&service, "Kính gửi [NAME]").await;
        let listing = service
            .list_placeholders(&template.id.to_string())
            .await
            .unwrap();
        assert_eq!(listing.placeholders, vec!["NAME"]);

        let threads = extractor.threads.lock();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != std::thread::current().id()));
    }

    #[tokio::test]
    async fn test_preview_keeps_unresolved_tokens() {
        let service = service(Arc::new(FixedBackend));
        let template = upload(&service, "Xin chào [NAME], hẹn {DATE}").await;
        let preview = service
            .preview(&template.id.to_string(), bag(json!({ "NAME": "An" })))
            .await
            .unwrap();
        assert_eq!(preview.content, "Xin chào An, hẹn {DATE}");
        assert_eq!(preview.unresolved, vec!["DATE"]);
    }

    #[tokio::test]
    async fn test_pdf_failure_falls_back_to_text() {
        let service = service(Arc::new(FailingBackend));
        let template = upload(&service, "Xin chào [NAME]").await;
        let doc = service
            .generate(
                GenerateTarget::Template(template.id.to_string()),
                bag(json!({ "NAME": "An" })),
                Some(OutputMode::Pdf),
            )
            .await
            .unwrap();

        assert!(doc.fallback);
        match doc.content {
            RenderedContent::Text(text) => assert!(text.contains("Xin chào An")),
            RenderedContent::Pdf(_) => panic!("expected text fallback"),
        }
    }

    #[tokio::test]
    async fn test_pdf_success() {
        let service = service(Arc::new(FixedBackend));
        let doc = service
            .generate(
                GenerateTarget::Kind(DocumentKind::Label),
                bag(json!({
                    "product": { "name": "Trà", "origin": "Việt Nam", "company": { "name": "ABC" } }
                })),
                None,
            )
            .await
            .unwrap();
        assert!(!doc.fallback);
        assert!(doc.content.is_pdf());
        assert_eq!(doc.filename, "tem-dan.pdf");
    }

    #[tokio::test]
    async fn test_catalogue_kind_without_body_is_not_found() {
        let service = service(Arc::new(FixedBackend));
        let err = service
            .generate(
                GenerateTarget::Kind(DocumentKind::Contract),
                bag(json!({
                    "template": "bao_hiem",
                    "partyA": { "name": "A" },
                    "partyB": { "name": "B" }
                })),
                Some(OutputMode::Text),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::TemplateNotFound(id) if id == "bao_hiem"));
    }

    #[tokio::test]
    async fn test_unknown_template_id() {
        let service = service(Arc::new(FixedBackend));
        let err = service.list_placeholders("not-a-template").await.unwrap_err();
        assert!(matches!(err, GeneratorError::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = Arc::new(InMemoryTemplateStore::new());
        store.set_available(false);
        let service = DocumentService::new(
            store,
            Arc::new(CommandTextExtractor::default()),
            Arc::new(FixedBackend),
            10.0,
        );
        let err = service
            .list_placeholders(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::StoreUnavailable(_)));
    }
}
