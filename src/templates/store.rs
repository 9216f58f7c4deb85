//! Template metadata store.
//!
//! The store is the only shared mutable state in the service. Reads run
//! concurrently; uploads and metadata edits take the write lock briefly.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use uuid::Uuid;

use super::model::{Template, TemplateContent, TemplateFilter, TemplatePatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("template store unavailable: {0}")]
    Unavailable(String),
    #[error("template '{0}' not found")]
    NotFound(String),
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Whether the backing storage can serve requests right now.
    fn is_available(&self) -> bool;

    async fn insert(&self, template: Template) -> Result<Template, StoreError>;

    /// Metadata of an active template.
    async fn get(&self, id: Uuid) -> Result<Template, StoreError>;

    /// Stored bytes of an active template.
    async fn get_content(&self, id: Uuid) -> Result<TemplateContent, StoreError>;

    /// Active templates matching `filter`, newest first.
    async fn list(&self, filter: &TemplateFilter) -> Result<Vec<Template>, StoreError>;

    /// Edit name/description/active flag. Inactive templates can be edited
    /// so they can be reactivated.
    async fn update(&self, id: Uuid, patch: TemplatePatch) -> Result<Template, StoreError>;

    /// Soft delete: the template stays stored but is no longer served.
    async fn deactivate(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Process-local store.
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<Uuid, Template>>,
    available: AtomicBool,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Mark the store (un)available, e.g. during maintenance.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "template store is marked unavailable".to_string(),
            ))
        }
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn insert(&self, template: Template) -> Result<Template, StoreError> {
        self.ensure_available()?;
        self.templates.write().insert(template.id, template.clone());
        log::info!("Stored template {} ({})", template.id, template.name);
        Ok(template)
    }

    async fn get(&self, id: Uuid) -> Result<Template, StoreError> {
        self.ensure_available()?;
        self.templates
            .read()
            .get(&id)
            .filter(|t| t.active)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn get_content(&self, id: Uuid) -> Result<TemplateContent, StoreError> {
        self.ensure_available()?;
        self.templates
            .read()
            .get(&id)
            .filter(|t| t.active)
            .map(|t| TemplateContent {
                data: t.content.clone(),
                source_format: t.source_format,
            })
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &TemplateFilter) -> Result<Vec<Template>, StoreError> {
        self.ensure_available()?;
        let mut templates: Vec<Template> = self
            .templates
            .read()
            .values()
            .filter(|t| t.matches(filter))
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn update(&self, id: Uuid, patch: TemplatePatch) -> Result<Template, StoreError> {
        self.ensure_available()?;
        let mut templates = self.templates.write();
        let template = templates
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(template);
        Ok(template.clone())
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut templates = self.templates.write();
        match templates.get_mut(&id) {
            Some(template) if template.active => {
                template.active = false;
                template.updated_at = chrono::Utc::now();
                log::info!("Deactivated template {}", id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::DocumentKind;
    use crate::templates::model::{NewTemplate, SourceFormat};

    fn template(name: &str) -> Template {
        Template::create(
            NewTemplate {
                name: name.to_string(),
                description: None,
                category: DocumentKind::Contract,
                source_format: SourceFormat::PlainText,
                original_name: format!("{}.txt", name),
                content: b"Hello [NAME]".to_vec(),
            },
            vec!["NAME".to_string()],
        )
    }

    #[tokio::test]
    async fn test_insert_get_and_content() {
        let store = InMemoryTemplateStore::new();
        let saved = store.insert(template("a")).await.unwrap();

        let fetched = store.get(saved.id).await.unwrap();
        assert_eq!(fetched.name, "a");
        let content = store.get_content(saved.id).await.unwrap();
        assert_eq!(content.data, b"Hello [NAME]".to_vec());
        assert_eq!(content.source_format, SourceFormat::PlainText);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_template() {
        let store = InMemoryTemplateStore::new();
        let saved = store.insert(template("a")).await.unwrap();
        store.deactivate(saved.id).await.unwrap();

        assert!(matches!(store.get(saved.id).await, Err(StoreError::NotFound(_))));
        assert!(store.list(&TemplateFilter::default()).await.unwrap().is_empty());
        assert!(matches!(
            store.deactivate(saved.id).await,
            Err(StoreError::NotFound(_))
        ));

        let patch = TemplatePatch {
            active: Some(true),
            ..Default::default()
        };
        assert!(store.update(saved.id, patch).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = InMemoryTemplateStore::new();
        store.set_available(false);
        assert!(!store.is_available());
        assert!(matches!(
            store.insert(template("a")).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
