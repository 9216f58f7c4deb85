//! Built-in contract templates and the option catalogues served to forms.

use lazy_static::lazy_static;
use serde::Serialize;
use utoipa::ToSchema;

use super::model::{FieldSchema, FieldType};

const MUA_BAN_BODY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/static/contracts/mua_ban.txt"
));
const VAN_CHUYEN_BODY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/static/contracts/van_chuyen.txt"
));

/// A contract template shipped with the service.
#[derive(Debug, Clone)]
pub struct BuiltinTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub fields: Vec<FieldSchema>,
}

/// One selectable option in a catalogue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogueEntry {
    #[schema(value_type = String)]
    pub id: &'static str,
    #[schema(value_type = String)]
    pub name: &'static str,
    #[schema(value_type = String)]
    pub description: &'static str,
}

const fn entry(id: &'static str, name: &'static str, description: &'static str) -> CatalogueEntry {
    CatalogueEntry {
        id,
        name,
        description,
    }
}

lazy_static! {
    static ref BUILTINS: Vec<BuiltinTemplate> = vec![
        BuiltinTemplate {
            id: "mua_ban",
            title: "HỢP ĐỒNG MUA BÁN HÀNG HÓA",
            body: MUA_BAN_BODY,
            fields: vec![
                FieldSchema::new("contractNumber", "Số hợp đồng", FieldType::Text),
                FieldSchema::new("signDate", "Ngày ký", FieldType::Date).required(),
                FieldSchema::new("signLocation", "Nơi ký", FieldType::Text)
                    .with_default("Tp. Hồ Chí Minh"),
                FieldSchema::new("description", "Mô tả hàng hóa", FieldType::Textarea).required(),
                FieldSchema::new("contractValue", "Giá trị hợp đồng", FieldType::Number).required(),
                FieldSchema::new("currency", "Đơn vị tiền tệ", FieldType::Select)
                    .required()
                    .with_options(&["VND", "USD", "EUR"]),
                FieldSchema::new("paymentTerms", "Điều kiện thanh toán", FieldType::Textarea)
                    .required(),
                FieldSchema::new("duration", "Thời hạn (ngày)", FieldType::Number)
                    .with_default("30"),
                FieldSchema::new("responsibilities", "Trách nhiệm các bên", FieldType::Textarea),
                FieldSchema::new("specialTerms", "Điều khoản đặc biệt", FieldType::Textarea),
            ],
        },
        BuiltinTemplate {
            id: "van_chuyen",
            title: "HỢP ĐỒNG VẬN CHUYỂN",
            body: VAN_CHUYEN_BODY,
            fields: vec![
                FieldSchema::new("cargoType", "Loại hàng hóa", FieldType::Text).required(),
                FieldSchema::new("weight", "Trọng lượng", FieldType::Number).required(),
                FieldSchema::new("weightUnit", "Đơn vị trọng lượng", FieldType::Select)
                    .required()
                    .with_options(&["kg", "tấn", "m³"]),
                FieldSchema::new("originLocation", "Điểm đi", FieldType::Text).required(),
                FieldSchema::new("destinationLocation", "Điểm đến", FieldType::Text).required(),
                FieldSchema::new(
                    "transportDuration",
                    "Thời gian vận chuyển (ngày)",
                    FieldType::Number
                )
                .required(),
                FieldSchema::new("transportCost", "Cước vận chuyển", FieldType::Number).required(),
                FieldSchema::new("currency", "Đơn vị tiền tệ", FieldType::Select)
                    .with_default("VND")
                    .with_options(&["VND", "USD", "EUR"]),
                FieldSchema::new("transportTerms", "Điều kiện vận chuyển", FieldType::Textarea),
            ],
        },
    ];
}

/// Built-in template with a body, by id.
pub fn builtin(id: &str) -> Option<&'static BuiltinTemplate> {
    BUILTINS.iter().find(|t| t.id == id.trim())
}

pub fn builtins() -> &'static [BuiltinTemplate] {
    &BUILTINS
}

/// Whether `id` names a catalogue contract kind, with or without a body.
pub fn is_contract_kind(id: &str) -> bool {
    CONTRACT_TEMPLATES.iter().any(|e| e.id == id.trim())
}

pub const CONTRACT_TEMPLATES: [CatalogueEntry; 4] = [
    entry(
        "mua_ban",
        "Hợp đồng mua bán hàng hóa",
        "Dành cho giao dịch mua bán hàng hóa nhập khẩu",
    ),
    entry(
        "van_chuyen",
        "Hợp đồng vận chuyển",
        "Dành cho dịch vụ vận chuyển hàng hóa",
    ),
    entry("bao_hiem", "Hợp đồng bảo hiểm", "Bảo hiểm hàng hóa nhập khẩu"),
    entry("dai_ly", "Hợp đồng đại lý", "Hợp đồng đại lý phân phối"),
];

pub const LABEL_TYPES: [CatalogueEntry; 5] = [
    entry(
        "standard",
        "Tem tiêu chuẩn",
        "Tem dán cơ bản với thông tin sản phẩm",
    ),
    entry("food", "Tem thực phẩm", "Tem dán cho thực phẩm nhập khẩu"),
    entry("cosmetic", "Tem mỹ phẩm", "Tem dán cho mỹ phẩm, chăm sóc da"),
    entry("electronic", "Tem điện tử", "Tem dán cho thiết bị điện tử"),
    entry("medicine", "Tem dược phẩm", "Tem dán cho thuốc và dược phẩm"),
];

pub const PAYMENT_TYPES: [CatalogueEntry; 4] = [
    entry(
        "purchase",
        "Thanh toán mua hàng",
        "Thanh toán cho nhà cung cấp",
    ),
    entry("service", "Thanh toán dịch vụ", "Thanh toán phí dịch vụ"),
    entry(
        "expense",
        "Thanh toán chi phí",
        "Thanh toán các khoản chi phí khác",
    ),
    entry("advance", "Tạm ứng", "Phiếu tạm ứng cho nhân viên"),
];

pub const QUOTE_TEMPLATES: [CatalogueEntry; 3] = [
    entry("standard", "Báo giá tiêu chuẩn", "Mẫu báo giá cơ bản"),
    entry(
        "detailed",
        "Báo giá chi tiết",
        "Mẫu báo giá với thông tin chi tiết",
    ),
    entry("simple", "Báo giá đơn giản", "Mẫu báo giá tối giản"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::placeholder::extract;

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin("mua_ban").map(|t| t.title), Some("HỢP ĐỒNG MUA BÁN HÀNG HÓA"));
        assert!(builtin("bao_hiem").is_none());
        assert!(is_contract_kind("bao_hiem"));
        assert!(!is_contract_kind("thue_nha"));
    }

    #[test]
    fn test_bodies_reference_their_fields() {
        for template in builtins() {
            let placeholders = extract(template.body);
            for field in &template.fields {
                assert!(
                    placeholders.contains(&field.key),
                    "{} missing {{{{{}}}}}",
                    template.id,
                    field.key
                );
            }
        }
    }

    #[test]
    fn test_catalogues_match_request_options() {
        let payment_ids: Vec<&str> = PAYMENT_TYPES.iter().map(|e| e.id).collect();
        assert_eq!(payment_ids, crate::generators::payment::PAYMENT_TYPES.to_vec());
        let quote_ids: Vec<&str> = QUOTE_TEMPLATES.iter().map(|e| e.id).collect();
        assert_eq!(quote_ids, crate::generators::quote::QUOTE_TEMPLATES.to_vec());
    }
}
