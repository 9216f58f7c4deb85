//! Payment request voucher ("phiếu đề nghị thanh toán") request and layout.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::assembler::AssemblyContext;
use super::common::{format_input_date, format_money, format_quantity, format_vn_date};
use super::party::Party;
use super::plan::{
    Block, Column, DocumentKind, DocumentPlan, InfoPanel, ItemTable, PageSetup, SignatureBox,
    StyleRole, StyledLine, TotalLine,
};
use super::stamp::Stamp;
use super::totals::{voucher_total, LineItem};
use super::traits::{Assemble, Validator};
use super::validation::{
    validate_non_negative, validate_required, validate_required_opt, ValidationErrors,
};

pub const PAYMENT_TYPES: [&str; 4] = ["purchase", "service", "expense", "advance"];
const DEFAULT_CURRENCY: &str = "VND";
const STAMP_PREFIX: &str = "Payment";

/// Heading of the counterparty panel for a payment type.
pub fn vendor_heading(payment_type: Option<&str>) -> &'static str {
    match payment_type.map(str::trim) {
        Some("service") => "THÔNG TIN NHÀ CUNG CẤP DỊCH VỤ",
        Some("expense") => "THÔNG TIN ĐỐI TƯỢNG CHI PHÍ",
        Some("advance") => "THÔNG TIN NGƯỜI NHẬN",
        _ => "THÔNG TIN NHÀ CUNG CẤP",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    #[serde(default)]
    pub request_number: Option<String>,
    /// `YYYY-MM-DD`; today when absent.
    #[serde(default)]
    pub request_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub requester: Option<String>,
    #[serde(default)]
    pub approver: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub company: Party,
    #[serde(default)]
    pub vendor: Party,
    #[serde(default)]
    pub payment_info: PaymentInfo,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Used only when there are no items.
    #[serde(default)]
    pub total: Option<f64>,
}

impl Validator for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(self.company.name(), "company.name", "Tên công ty", &mut errors);
        validate_required(
            self.vendor.name(),
            "vendor.name",
            "Tên nhà cung cấp",
            &mut errors,
        );
        validate_required_opt(
            self.payment_info.purpose.as_deref(),
            "paymentInfo.purpose",
            "Mục đích thanh toán",
            &mut errors,
        );

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
        }
        validate_non_negative(self.total, "total", "Tổng tiền", &mut errors);

        errors.into_result()
    }
}

fn text_or_empty(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Voucher panels list every field, blank or not, so the printed form keeps
/// a fixed shape.
fn voucher_panel(heading: &str, party: &Party) -> InfoPanel {
    InfoPanel {
        heading: heading.to_string(),
        lines: vec![
            format!("Tên: {}", party.name()),
            format!("Địa chỉ: {}", text_or_empty(&party.address)),
            format!("MST: {}", text_or_empty(&party.tax_code)),
            format!("Điện thoại: {}", text_or_empty(&party.phone)),
            format!("Email: {}", text_or_empty(&party.email)),
            format!("STK: {}", text_or_empty(&party.bank_account)),
            format!("Ngân hàng: {}", text_or_empty(&party.bank_name)),
        ],
    }
}

impl Assemble for PaymentRequest {
    fn assemble(&self, ctx: &AssemblyContext) -> DocumentPlan {
        let info = &self.payment_info;
        let request_date = info
            .request_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(format_input_date)
            .unwrap_or_else(|| format_vn_date(ctx.generated_at.date_naive()));
        let due_date = info
            .due_date
            .as_deref()
            .map(format_input_date)
            .unwrap_or_default();
        let request_number = info
            .request_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Tự động");
        let currency = info
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY);

        let mut plan = DocumentPlan::new(
            DocumentKind::Payment,
            "PHIẾU ĐỀ NGHỊ THANH TOÁN",
            PageSetup::a4([40.0, 60.0, 40.0, 60.0]),
        );

        plan.push(Block::Header {
            title: "PHIẾU ĐỀ NGHỊ THANH TOÁN".to_string(),
            subtitles: vec![
                format!("Số: {}", request_number),
                format!("Ngày: {}", request_date),
            ],
            stamp: Some(Stamp::from_timestamp(STAMP_PREFIX, &ctx.generated_at)),
        });

        plan.push(Block::Panels(vec![
            voucher_panel("THÔNG TIN CÔNG TY", &self.company),
            voucher_panel(
                vendor_heading(self.payment_type.as_deref()),
                &self.vendor,
            ),
        ]));

        plan.push(Block::FormGrid(vec![
            ("Bộ phận đề nghị:".to_string(), text_or_empty(&info.department)),
            ("Người đề nghị:".to_string(), text_or_empty(&info.requester)),
            ("Người phê duyệt:".to_string(), text_or_empty(&info.approver)),
            ("Hạn thanh toán:".to_string(), due_date),
        ]));

        plan.push(Block::Heading("MỤC ĐÍCH THANH TOÁN:".to_string()));
        plan.push(Block::Paragraph(StyledLine::new(
            text_or_empty(&info.purpose),
            StyleRole::Purpose,
        )));

        if !self.items.is_empty() {
            plan.push(Block::Heading("CHI TIẾT THANH TOÁN:".to_string()));
            let rows = self
                .items
                .iter()
                .map(|item| {
                    vec![
                        item.label(),
                        format_quantity(item.quantity()),
                        format_money(item.unit_price()),
                        format_money(item.quantity() * item.unit_price()),
                    ]
                })
                .collect();
            plan.push(Block::Table(ItemTable {
                columns: vec![
                    Column::fill("Nội dung"),
                    Column::center("Số lượng"),
                    Column::right("Đơn giá"),
                    Column::right("Thành tiền"),
                ],
                rows,
                striped: true,
            }));
        }

        let total = voucher_total(&self.items, self.total);
        plan.push(Block::Totals(vec![TotalLine {
            label: "TỔNG TIỀN:".to_string(),
            value: format!("{} {}", format_money(total), currency),
            emphasized: true,
        }]));

        let requester = info.requester.clone().filter(|n| !n.trim().is_empty());
        let approver = info.approver.clone().filter(|n| !n.trim().is_empty());
        plan.push(Block::Signatures(vec![
            SignatureBox {
                heading: "NGƯỜI ĐỀ NGHỊ".to_string(),
                note: "(Ký tên)".to_string(),
                name: requester,
            },
            SignatureBox {
                heading: "KẾ TOÁN".to_string(),
                note: "(Ký tên)".to_string(),
                name: None,
            },
            SignatureBox {
                heading: "NGƯỜI PHÊ DUYỆT".to_string(),
                note: "(Ký tên, đóng dấu)".to_string(),
                name: approver,
            },
        ]));

        plan
    }
}
