//! Traits for generator system standardization.

use super::assembler::AssemblyContext;
use super::engine::RenderError;
use super::plan::DocumentPlan;
use super::validation::ValidationErrors;

/// Trait for validating request objects.
pub trait Validator {
    /// Validate the state of the object, collecting every field error.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Trait for prepared documents that can lay themselves out.
pub trait Assemble {
    /// Build the ordered block structure for this document.
    fn assemble(&self, ctx: &AssemblyContext) -> DocumentPlan;
}

/// Trait for PDF render backends.
///
/// Implementations are loaded once and shared across requests.
pub trait RenderBackend: Send + Sync {
    fn render_pdf(&self, plan: &DocumentPlan) -> Result<Vec<u8>, RenderError>;
}
