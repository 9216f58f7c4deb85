//! Generation counters.
//!
//! Request-level metrics come from the prometheus middleware at `/metrics`;
//! the per-kind outcome counters live in their own registry and are served
//! at `/metrics/documents`.

use actix_web::{HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::generators::DocumentKind;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    static ref DOCUMENTS_GENERATED: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new(
                "documents_generated_total",
                "Generated documents by kind and outcome",
            )
            .namespace("docgen_server"),
            &["kind", "outcome"],
        )
        .expect("Failed to create generation counter");
        if let Err(e) = REGISTRY.register(Box::new(counter.clone())) {
            log::error!("Failed to register generation counter: {}", e);
        }
        counter
    };
}

/// `outcome` is one of `pdf`, `text` or `fallback`.
pub fn record_generation(kind: DocumentKind, outcome: &str) {
    DOCUMENTS_GENERATED
        .with_label_values(&[kind.as_str(), outcome])
        .inc();
}

pub fn generation_count(kind: DocumentKind, outcome: &str) -> u64 {
    DOCUMENTS_GENERATED
        .with_label_values(&[kind.as_str(), outcome])
        .get()
}

pub async fn document_metrics() -> impl Responder {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        log::error!("Failed to encode generation metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments() {
        let before = generation_count(DocumentKind::Payment, "fallback");
        record_generation(DocumentKind::Payment, "fallback");
        assert_eq!(generation_count(DocumentKind::Payment, "fallback"), before + 1);
    }
}
