//! Input validation module for document generators.
//!
//! Validation runs before any generation work starts and collects every
//! problem at once, so the form can be fixed in one round trip.

use std::fmt;

/// Validation error with detailed, user-friendly messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field that failed validation (dotted path)
    pub field: String,
    /// Human-readable error message in Vietnamese
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} không được để trống", label))
            .with_suggestion(format!("Vui lòng nhập {}", label.to_lowercase()))
    }

    /// Create error for a list that needs at least one entry
    pub fn empty_list(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} phải có ít nhất một mục", label))
    }

    /// Create error for a negative amount
    pub fn negative_number(field: &str, label: &str, value: f64) -> Self {
        Self::new(field, format!("{} không được là số âm ({})", label, value))
    }

    /// Create error for a value that is not a finite number
    pub fn invalid_number(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} phải là một số hợp lệ", label))
    }

    /// Create error for a value outside an inclusive range
    pub fn out_of_range(field: &str, label: &str, min: f64, max: f64) -> Self {
        Self::new(
            field,
            format!("{} phải nằm trong khoảng {} - {}", label, min, max),
        )
    }

    /// Create error for a value outside an enumerated option list
    pub fn unknown_option(field: &str, label: &str, value: &str, options: &[&str]) -> Self {
        Self::new(
            field,
            format!("Giá trị '{}' không hợp lệ cho {}", value, label),
        )
        .with_suggestion(format!("Chọn một trong: {}", options.join(", ")))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Fields that failed, in the order they were reported.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Get formatted error message suitable for an API response
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Dữ liệu không hợp lệ: phát hiện {} lỗi\n",
            self.errors.len()
        )];

        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }

        parts.push(String::new());
        parts.push("Vui lòng sửa các thông tin trên và thử lại.".to_string());

        parts.join("\n")
    }

    /// Convert to Result - Ok if no errors, Err with all collected errors otherwise
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate that an optional string is present and not blank
pub fn validate_required_opt(
    value: Option<&str>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    validate_required(value.unwrap_or_default(), field, label, errors);
}

/// Validate that a list has at least one entry
pub fn validate_non_empty<T>(items: &[T], field: &str, label: &str, errors: &mut ValidationErrors) {
    if items.is_empty() {
        errors.add(ValidationError::empty_list(field, label));
    }
}

/// Validate an optional amount: when present it must be finite and >= 0
pub fn validate_non_negative(
    value: Option<f64>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    let Some(v) = value else {
        return;
    };

    if !v.is_finite() {
        errors.add(ValidationError::invalid_number(field, label));
    } else if v < 0.0 {
        errors.add(ValidationError::negative_number(field, label, v));
    }
}

/// Validate an optional value against an inclusive range
pub fn validate_range(
    value: Option<f64>,
    min: f64,
    max: f64,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    let Some(v) = value else {
        return;
    };

    if !v.is_finite() {
        errors.add(ValidationError::invalid_number(field, label));
    } else if v < min || v > max {
        errors.add(ValidationError::out_of_range(field, label, min, max));
    }
}

/// Validate that a value is one of the allowed options (case-insensitive)
pub fn validate_one_of(
    value: &str,
    options: &[&str],
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    let trimmed = value.trim();
    if !options.iter().any(|o| o.eq_ignore_ascii_case(trimmed)) {
        errors.add(ValidationError::unknown_option(field, label, trimmed, options));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_empty() {
        let mut errors = ValidationErrors::new();
        validate_required("   ", "company.name", "Tên công ty", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.to_message().contains("Tên công ty không được để trống"));
    }

    #[test]
    fn test_validate_non_negative() {
        let mut errors = ValidationErrors::new();
        validate_non_negative(Some(-1.0), "items[0].quantity", "Số lượng", &mut errors);
        validate_non_negative(None, "items[1].quantity", "Số lượng", &mut errors);
        validate_non_negative(Some(f64::NAN), "items[2].quantity", "Số lượng", &mut errors);
        assert_eq!(errors.fields(), vec!["items[0].quantity", "items[2].quantity"]);
    }

    #[test]
    fn test_validate_range_bounds_inclusive() {
        let mut errors = ValidationErrors::new();
        validate_range(Some(0.0), 0.0, 100.0, "d", "Chiết khấu", &mut errors);
        validate_range(Some(100.0), 0.0, 100.0, "d", "Chiết khấu", &mut errors);
        assert!(errors.is_empty());

        validate_range(Some(100.5), 0.0, 100.0, "d", "Chiết khấu", &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_one_of_suggests_options() {
        let mut errors = ValidationErrors::new();
        validate_one_of("a3", &["a4", "a5"], "size", "Khổ giấy", &mut errors);
        let message = errors.to_message();
        assert!(message.contains("'a3'"));
        assert!(message.contains("a4, a5"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_list("items", "Danh sách sản phẩm"));
        let err = errors.into_result().unwrap_err();
        assert!(err.to_string().contains("1 lỗi"));
    }
}
