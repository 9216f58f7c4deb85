//! Document assembly: prepared content in, ordered block plan out.

use chrono::{DateTime, Local};

use super::contract::FlowedDocument;
use super::label::LabelRequest;
use super::payment::PaymentRequest;
use super::plan::{DocumentKind, DocumentPlan};
use super::quote::QuoteRequest;
use super::traits::Assemble;

/// Per-request values every layout may need.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext {
    pub generated_at: DateTime<Local>,
    /// VAT percent applied when a quote does not name one.
    pub default_vat_rate: f64,
}

impl AssemblyContext {
    pub fn new(generated_at: DateTime<Local>, default_vat_rate: f64) -> Self {
        Self {
            generated_at,
            default_vat_rate,
        }
    }

    pub fn now(default_vat_rate: f64) -> Self {
        Self::new(Local::now(), default_vat_rate)
    }
}

/// Validated, bound content of one document.
#[derive(Debug, Clone)]
pub enum DocumentContent {
    Quote(QuoteRequest),
    Payment(PaymentRequest),
    Flowed(FlowedDocument),
    Label(LabelRequest),
}

impl DocumentContent {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Quote(_) => DocumentKind::Quote,
            Self::Payment(_) => DocumentKind::Payment,
            Self::Flowed(doc) => doc.kind,
            Self::Label(_) => DocumentKind::Label,
        }
    }
}

impl Assemble for DocumentContent {
    fn assemble(&self, ctx: &AssemblyContext) -> DocumentPlan {
        match self {
            Self::Quote(quote) => quote.assemble(ctx),
            Self::Payment(payment) => payment.assemble(ctx),
            Self::Flowed(doc) => doc.assemble(ctx),
            Self::Label(label) => label.assemble(ctx),
        }
    }
}
