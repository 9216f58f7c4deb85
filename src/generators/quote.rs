//! Sales quote ("báo giá") request and layout.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::assembler::AssemblyContext;
use super::common::{format_money, format_quantity, format_vn_date};
use super::party::Party;
use super::plan::{
    Block, Column, DocumentKind, DocumentPlan, InfoPanel, ItemTable, PageSetup, StyleRole,
    StyledLine, TotalLine,
};
use super::totals::{compute_lines, compute_totals, LineItem};
use super::traits::{Assemble, Validator};
use super::validation::{
    validate_non_empty, validate_non_negative, validate_one_of, validate_range,
    validate_required, ValidationErrors,
};

pub const QUOTE_TEMPLATES: [&str; 3] = ["standard", "detailed", "simple"];
pub const DEFAULT_VALID_DAYS: i64 = 30;
pub const MAX_VALID_DAYS: i64 = 3650;
const CURRENCY: &str = "VND";

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettings {
    /// VAT percent; the server default applies when absent.
    #[serde(default)]
    pub vat_rate: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub valid_days: Option<i64>,
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub company: Party,
    #[serde(default)]
    pub customer: Party,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub settings: QuoteSettings,
}

impl Validator for QuoteRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(self.company.name(), "company.name", "Tên công ty", &mut errors);
        validate_required(
            self.customer.name(),
            "customer.name",
            "Tên khách hàng",
            &mut errors,
        );
        validate_non_empty(&self.items, "items", "Danh sách sản phẩm", &mut errors);

        for (i, item) in self.items.iter().enumerate() {
            validate_non_negative(
                item.quantity,
                &format!("items[{}].quantity", i),
                "Số lượng",
                &mut errors,
            );
            validate_non_negative(
                item.unit_price,
                &format!("items[{}].unitPrice", i),
                "Đơn giá",
                &mut errors,
            );
            validate_range(
                item.discount,
                0.0,
                100.0,
                &format!("items[{}].discount", i),
                "Chiết khấu",
                &mut errors,
            );
        }

        validate_range(
            self.settings.vat_rate,
            0.0,
            100.0,
            "settings.vatRate",
            "Thuế VAT",
            &mut errors,
        );
        validate_range(
            self.settings.valid_days.map(|days| days as f64),
            0.0,
            MAX_VALID_DAYS as f64,
            "settings.validDays",
            "Số ngày hiệu lực",
            &mut errors,
        );
        if let Some(template) = self.settings.template.as_deref() {
            validate_one_of(
                template,
                &QUOTE_TEMPLATES,
                "settings.template",
                "Mẫu báo giá",
                &mut errors,
            );
        }

        errors.into_result()
    }
}

fn party_panel(heading: &str, party: &Party) -> InfoPanel {
    InfoPanel {
        heading: heading.to_string(),
        lines: party.info_lines(),
    }
}

impl Assemble for QuoteRequest {
    fn assemble(&self, ctx: &AssemblyContext) -> DocumentPlan {
        let today = ctx.generated_at.date_naive();
        let valid_days = self.settings.valid_days.unwrap_or(DEFAULT_VALID_DAYS);
        let valid_until = Duration::try_days(valid_days)
            .and_then(|offset| today.checked_add_signed(offset))
            .unwrap_or(today);
        let vat_rate = self.settings.vat_rate.unwrap_or(ctx.default_vat_rate);

        let mut plan = DocumentPlan::new(
            DocumentKind::Quote,
            "BÁO GIÁ HÀNG HÓA",
            PageSetup::a4([40.0, 60.0, 40.0, 60.0]),
        );

        plan.push(Block::Header {
            title: "BÁO GIÁ HÀNG HÓA".to_string(),
            subtitles: vec![
                format!("Ngày: {}", format_vn_date(today)),
                format!("Có hiệu lực đến: {}", format_vn_date(valid_until)),
            ],
            stamp: None,
        });

        plan.push(Block::Panels(vec![
            party_panel("THÔNG TIN CÔNG TY", &self.company),
            party_panel("THÔNG TIN KHÁCH HÀNG", &self.customer),
        ]));

        plan.push(Block::Heading("DANH SÁCH SẢN PHẨM".to_string()));

        let lines = compute_lines(&self.items);
        let rows = self
            .items
            .iter()
            .zip(&lines)
            .enumerate()
            .map(|(i, (item, line))| {
                vec![
                    (i + 1).to_string(),
                    item.label(),
                    item.unit.clone().unwrap_or_default(),
                    format_quantity(item.quantity()),
                    format_money(item.unit_price()),
                    format_quantity(item.discount()),
                    format_money(line.line_final),
                ]
            })
            .collect();

        plan.push(Block::Table(ItemTable {
            columns: vec![
                Column::center("STT"),
                Column::fill("Sản phẩm"),
                Column::center("ĐVT"),
                Column::center("SL"),
                Column::right("Đơn giá"),
                Column::center("CK (%)"),
                Column::right("Thành tiền"),
            ],
            rows,
            striped: true,
        }));

        let totals = compute_totals(&self.items, vat_rate);
        plan.push(Block::Totals(vec![
            TotalLine {
                label: "Tạm tính:".to_string(),
                value: format!("{} {}", format_money(totals.subtotal), CURRENCY),
                emphasized: false,
            },
            TotalLine {
                label: format!("VAT ({}%):", format_quantity(totals.vat_rate)),
                value: format!("{} {}", format_money(totals.vat_amount), CURRENCY),
                emphasized: false,
            },
            TotalLine {
                label: "TỔNG CỘNG:".to_string(),
                value: format!("{} {}", format_money(totals.total), CURRENCY),
                emphasized: true,
            },
        ]));

        if let Some(notes) = self
            .settings
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            plan.push(Block::Paragraph(StyledLine::new(
                format!("Ghi chú: {}", notes),
                StyleRole::Info,
            )));
        }

        plan.push(Block::Footer(
            "Cảm ơn quý khách đã quan tâm đến sản phẩm của chúng tôi!".to_string(),
        ));

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::plan::Block;
    use serde_json::json;

    fn request() -> QuoteRequest {
        serde_json::from_value(json!({
            "company": { "name": "Công ty ABC" },
            "customer": { "name": "Khách hàng XYZ" },
            "items": [
                { "name": "Bàn", "quantity": 2, "unitPrice": 100, "discount": 10 },
                { "name": "Ghế", "quantity": 1, "unitPrice": 50 }
            ],
            "settings": { "vatRate": 10 }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_missing_names_and_items_are_reported_together() {
        let err = QuoteRequest::default().validate().unwrap_err();
        assert_eq!(err.fields(), vec!["company.name", "customer.name", "items"]);
    }

    #[test]
    fn test_negative_and_out_of_range_values_rejected() {
        let mut req = request();
        req.items[0].quantity = Some(-1.0);
        req.items[1].discount = Some(120.0);
        let err = req.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["items[0].quantity", "items[1].discount"]);
    }

    #[test]
    fn test_valid_days_bounded() {
        let mut req = request();
        req.settings.valid_days = Some(100_000_000);
        let err = req.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["settings.validDays"]);

        req.settings.valid_days = Some(MAX_VALID_DAYS);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_oversized_valid_days_keeps_issue_date() {
        let mut req = request();
        req.settings.valid_days = Some(i64::MAX);
        let ctx = AssemblyContext::now(10.0);
        let today = format_vn_date(ctx.generated_at.date_naive());
        let plan = req.assemble(&ctx);
        let Block::Header { subtitles, .. } = &plan.blocks[0] else {
            panic!("expected header block");
        };
        assert_eq!(subtitles[1], format!("Có hiệu lực đến: {}", today));
    }

    #[test]
    fn test_assembled_block_order_and_totals() {
        let plan = request().assemble(&AssemblyContext::now(10.0));
        let kinds: Vec<&str> = plan
            .blocks
            .iter()
            .map(|b| match b {
                Block::Header { .. } => "header",
                Block::Panels(_) => "panels",
                Block::Heading(_) => "heading",
                Block::Table(_) => "table",
                Block::Totals(_) => "totals",
                Block::Footer(_) => "footer",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["header", "panels", "heading", "table", "totals", "footer"]
        );

        let Block::Totals(lines) = &plan.blocks[4] else {
            panic!("expected totals block");
        };
        assert_eq!(lines[0].value, "230 VND");
        assert_eq!(lines[1].value, "23 VND");
        assert_eq!(lines[2].value, "253 VND");
        assert!(lines[2].emphasized);
    }
}
