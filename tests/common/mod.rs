#![allow(dead_code)]

use actix_web::web;
use docgen_server::config::AppConfig;
use docgen_server::generators::plan::DocumentPlan;
use docgen_server::generators::{DataBag, RenderBackend, RenderError};
use docgen_server::templates::InMemoryTemplateStore;
use docgen_server::AppState;
use serde_json::Value;
use std::sync::Arc;

/// Backend that always fails, forcing the text fallback.
pub struct FailingBackend;

impl RenderBackend for FailingBackend {
    fn render_pdf(&self, _plan: &DocumentPlan) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::TypstExit {
            code: 1,
            stderr: "error: font not found".to_string(),
        })
    }
}

/// Backend that returns a fixed PDF header.
pub struct StaticPdfBackend;

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n%fake";

impl RenderBackend for StaticPdfBackend {
    fn render_pdf(&self, plan: &DocumentPlan) -> Result<Vec<u8>, RenderError> {
        assert!(!plan.blocks.is_empty());
        Ok(FAKE_PDF.to_vec())
    }
}

pub fn state_with(backend: Arc<dyn RenderBackend>) -> web::Data<AppState> {
    web::Data::new(AppState::with_parts(
        AppConfig::default(),
        Arc::new(InMemoryTemplateStore::new()),
        backend,
    ))
}

pub fn bag(value: Value) -> DataBag {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn quote_body() -> Value {
    serde_json::json!({
        "company": { "name": "Công ty TNHH Xuất Nhập Khẩu ABC", "phone": "028 1234 5678" },
        "customer": { "name": "Công ty CP XYZ", "address": "12 Lê Lợi, Quận 1" },
        "items": [
            { "name": "Bàn", "unit": "cái", "quantity": 2, "unitPrice": 100, "discount": 10 },
            { "name": "Ghế", "unit": "cái", "quantity": 1, "unitPrice": 50 }
        ],
        "settings": { "vatRate": 10, "notes": "Giao hàng trong 7 ngày" }
    })
}

pub fn payment_body() -> Value {
    serde_json::json!({
        "paymentType": "purchase",
        "company": { "name": "Công ty ABC" },
        "vendor": { "name": "Nhà cung cấp DEF", "bankAccount": "0123456789" },
        "paymentInfo": { "purpose": "Thanh toán lô hàng tháng 3", "currency": "VND" },
        "items": [
            { "name": "Vải", "quantity": 10, "unitPrice": 25000, "discount": 50 }
        ]
    })
}

pub fn label_body(rows: i64, cols: i64, count: Option<i64>) -> Value {
    let mut body = serde_json::json!({
        "product": {
            "name": "Trà Ô Long",
            "origin": "Đài Loan",
            "company": { "name": "Công ty ABC" }
        },
        "labelType": "food",
        "rows": rows,
        "cols": cols
    });
    if let Some(count) = count {
        body["count"] = count.into();
    }
    body
}

pub fn contract_body() -> Value {
    serde_json::json!({
        "template": "mua_ban",
        "partyA": { "name": "Công ty A", "representative": "Nguyễn Văn An" },
        "partyB": { "name": "Công ty B", "representative": "Trần Thị Bình" },
        "description": "100 thùng cà phê",
        "contractValue": 50000000,
        "currency": "VND",
        "paymentTerms": "cod"
    })
}
