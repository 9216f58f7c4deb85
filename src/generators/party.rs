//! Parties appearing on documents (company, customer, vendor, contract sides).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub representative: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
}

impl Party {
    pub fn name(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Labelled lines for an info panel, skipping empty fields.
    pub fn info_lines(&self) -> Vec<String> {
        let fields = [
            ("Địa chỉ", &self.address),
            ("Điện thoại", &self.phone),
            ("Email", &self.email),
            ("MST", &self.tax_code),
            ("Người liên hệ", &self.contact_person),
            ("Số tài khoản", &self.bank_account),
            ("Ngân hàng", &self.bank_name),
        ];

        let mut lines = Vec::new();
        if !self.name().is_empty() {
            lines.push(self.name().to_string());
        }
        for (label, value) in fields {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                lines.push(format!("{}: {}", label, v));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lines_skip_blank_fields() {
        let party = Party {
            name: Some("Công ty ABC".into()),
            phone: Some("  ".into()),
            tax_code: Some("0312345678".into()),
            ..Default::default()
        };
        assert_eq!(
            party.info_lines(),
            vec!["Công ty ABC".to_string(), "MST: 0312345678".to_string()]
        );
    }
}
