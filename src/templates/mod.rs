//! Template storage, built-in templates and text extraction.
//!
//! These are the collaborators of the generation core: the core asks for
//! template content by id and never writes back.

pub mod builtin;
pub mod extract;
pub mod model;
pub mod store;

pub use builtin::{builtin, BuiltinTemplate, CatalogueEntry};
pub use extract::{CommandTextExtractor, TextExtractor};
pub use model::{
    FieldSchema, FieldType, NewTemplate, SourceFormat, Template, TemplateContent, TemplateFilter,
    TemplatePatch,
};
pub use store::{InMemoryTemplateStore, StoreError, TemplateStore};
