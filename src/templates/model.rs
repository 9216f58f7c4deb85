use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::generators::binder::{display_value, lookup_path, numeric_value, DataBag};
use crate::generators::common::format_input_date;
use crate::generators::validation::{ValidationError, ValidationErrors};
use crate::generators::DocumentKind;

/// How a template's stored bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SourceFormat {
    PlainText,
    WordProcessingDocument,
}

impl SourceFormat {
    pub const ALLOWED_EXTENSIONS: [&'static str; 2] = ["txt", "docx"];

    /// Format for an uploaded filename, by extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "txt" => Some(Self::PlainText),
            "docx" => Some(Self::WordProcessingDocument),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::WordProcessingDocument => "docx",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
}

/// Input description for one template field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Field path as used in the template, e.g. `contractValue`.
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldSchema {
    pub fn new(key: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
            required: false,
            default: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    fn check(&self, data: &DataBag, errors: &mut ValidationErrors) {
        let value = lookup_path(data, &self.key);
        let Some(text) = value.and_then(display_value) else {
            if self.required {
                errors.add(ValidationError::empty_field(&self.key, &self.label));
            }
            return;
        };

        match self.field_type {
            FieldType::Number => {
                if value.and_then(numeric_value).is_none() {
                    errors.add(ValidationError::invalid_number(&self.key, &self.label));
                }
            }
            FieldType::Select if !self.options.is_empty() => {
                if !self.options.iter().any(|o| o == text.trim()) {
                    let options: Vec<&str> = self.options.iter().map(String::as_str).collect();
                    errors.add(ValidationError::unknown_option(
                        &self.key,
                        &self.label,
                        text.trim(),
                        &options,
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Fill schema defaults for absent top-level fields and print ISO dates the
/// way the forms do.
pub fn apply_field_defaults(fields: &[FieldSchema], data: &mut DataBag) {
    for field in fields {
        let present = data.get(&field.key).and_then(display_value).is_some();
        match (&field.default, present) {
            (Some(default), false) => {
                data.insert(field.key.clone(), Value::String(default.clone()));
            }
            (_, true) if field.field_type == FieldType::Date => {
                let formatted = match data.get(&field.key) {
                    Some(Value::String(raw)) => Some(format_input_date(raw)),
                    _ => None,
                };
                if let Some(formatted) = formatted {
                    data.insert(field.key.clone(), Value::String(formatted));
                }
            }
            _ => {}
        }
    }
}

/// Check required fields, numbers and select options against the schema.
pub fn validate_fields(fields: &[FieldSchema], data: &DataBag) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for field in fields {
        field.check(data, &mut errors);
    }
    errors.into_result()
}

/// An uploaded template.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: DocumentKind,
    pub source_format: SourceFormat,
    pub original_name: String,
    pub file_size: usize,
    /// Discovered once at upload.
    pub placeholders: Vec<String>,
    pub fields: Vec<FieldSchema>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// Raw stored content plus the format needed to read it.
#[derive(Debug, Clone)]
pub struct TemplateContent {
    pub data: Vec<u8>,
    pub source_format: SourceFormat,
}

/// Everything needed to create a template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub category: DocumentKind,
    pub source_format: SourceFormat,
    pub original_name: String,
    pub content: Vec<u8>,
}

impl Template {
    pub fn create(new: NewTemplate, placeholders: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            category: new.category,
            source_format: new.source_format,
            original_name: new.original_name,
            file_size: new.content.len(),
            placeholders,
            fields: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
            content: new.content,
        }
    }

    pub fn matches(&self, filter: &TemplateFilter) -> bool {
        let category_ok = filter
            .category
            .as_deref()
            .map(|c| self.category.as_str().eq_ignore_ascii_case(c.trim()))
            .unwrap_or(true);
        let type_ok = filter
            .template_type
            .as_deref()
            .map(|t| self.source_format.extension().eq_ignore_ascii_case(t.trim()))
            .unwrap_or(true);
        self.active && category_ok && type_ok
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TemplateFilter {
    /// quote | contract | label | payment
    pub category: Option<String>,
    /// File type: txt | docx
    #[serde(rename = "type")]
    pub template_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl TemplatePatch {
    pub fn apply(self, template: &mut Template) {
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            template.name = name.trim().to_string();
        }
        if let Some(description) = self.description.filter(|d| !d.trim().is_empty()) {
            template.description = Some(description.trim().to_string());
        }
        if let Some(active) = self.active {
            template.active = active;
        }
        template.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> DataBag {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_source_format_from_filename() {
        assert_eq!(SourceFormat::from_filename("a.TXT"), Some(SourceFormat::PlainText));
        assert_eq!(
            SourceFormat::from_filename("hop-dong.docx"),
            Some(SourceFormat::WordProcessingDocument)
        );
        assert_eq!(SourceFormat::from_filename("sheet.xlsx"), None);
        assert_eq!(SourceFormat::from_filename("noext"), None);
    }

    #[test]
    fn test_defaults_fill_only_missing_fields() {
        let fields = vec![
            FieldSchema::new("signLocation", "Nơi ký", FieldType::Text).with_default("Tp. Hồ Chí Minh"),
            FieldSchema::new("duration", "Thời hạn", FieldType::Number).with_default("30"),
        ];
        let mut data = bag(json!({ "duration": 45 }));
        apply_field_defaults(&fields, &mut data);
        assert_eq!(data["signLocation"], json!("Tp. Hồ Chí Minh"));
        assert_eq!(data["duration"], json!(45));
    }

    #[test]
    fn test_date_fields_are_reformatted() {
        let fields = vec![FieldSchema::new("signDate", "Ngày ký", FieldType::Date)];
        let mut data = bag(json!({ "signDate": "2025-03-05" }));
        apply_field_defaults(&fields, &mut data);
        assert_eq!(data["signDate"], json!("05/03/2025"));
    }

    #[test]
    fn test_validate_fields() {
        let fields = vec![
            FieldSchema::new("description", "Mô tả", FieldType::Textarea).required(),
            FieldSchema::new("contractValue", "Giá trị", FieldType::Number).required(),
            FieldSchema::new("currency", "Tiền tệ", FieldType::Select)
                .required()
                .with_options(&["VND", "USD", "EUR"]),
        ];
        let data = bag(json!({ "contractValue": "abc", "currency": "JPY" }));
        let err = validate_fields(&fields, &data).unwrap_err();
        assert_eq!(err.fields(), vec!["description", "contractValue", "currency"]);

        let ok = bag(json!({ "description": "x", "contractValue": "1000", "currency": "VND" }));
        assert!(validate_fields(&fields, &ok).is_ok());
    }
}
