//! Field binding - substitutes data bag values into template tokens.
//!
//! Binding is a single left-to-right pass over the template. A substituted
//! value is never rescanned, so a value that happens to look like a token is
//! emitted literally instead of being rewritten by a later field.
//!
//! Tokens without a usable value are kept verbatim, brackets included, so an
//! incomplete document is visibly incomplete.

use chrono::{DateTime, Local};
use rand::Rng;
use regex::Captures;
use serde_json::{Map, Value};

use super::common::{format_vn_date, number_to_words};
use super::placeholder::TOKEN;

/// Per-request mapping of field names (possibly dotted paths) to values.
pub type DataBag = Map<String, Value>;

/// Field receiving the auto-generated signing date.
pub const SIGN_DATE_FIELD: &str = "signDate";
/// Field receiving the auto-generated reference number.
pub const REFERENCE_FIELD: &str = "contractNumber";
/// Amount read into words when the currency is local.
pub const AMOUNT_FIELD: &str = "contractValue";
pub const CURRENCY_FIELD: &str = "currency";
pub const AMOUNT_IN_WORDS_FIELD: &str = "contractValueInWords";
pub const PAYMENT_TERMS_FIELD: &str = "paymentTerms";

const LOCAL_CURRENCY: &str = "VND";
const REFERENCE_PREFIX: &str = "HD";

/// How token names are resolved against the data bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Only top-level keys are looked up.
    Flat,
    /// A literal key wins; otherwise `a.b.c` walks nested objects (and array
    /// indices).
    Nested,
}

/// Substitution engine for one binding mode.
#[derive(Debug, Clone, Copy)]
pub struct Binder {
    mode: BindMode,
}

impl Binder {
    pub fn new(mode: BindMode) -> Self {
        Self { mode }
    }

    pub fn flat() -> Self {
        Self::new(BindMode::Flat)
    }

    pub fn nested() -> Self {
        Self::new(BindMode::Nested)
    }

    pub fn mode(&self) -> BindMode {
        self.mode
    }

    /// Replace every resolvable token in `template` with its display text.
    pub fn bind(&self, template: &str, data: &DataBag) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().trim())
                    .unwrap_or_default();

                match self.resolve(name, data).and_then(display_value) {
                    Some(text) => text,
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn resolve<'a>(&self, name: &str, data: &'a DataBag) -> Option<&'a Value> {
        if let Some(value) = data.get(name) {
            return Some(value);
        }
        match self.mode {
            BindMode::Flat => None,
            BindMode::Nested => lookup_path(data, name),
        }
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::nested()
    }
}

/// Bind top-level keys only.
pub fn bind(template: &str, data: &DataBag) -> String {
    Binder::flat().bind(template, data)
}

/// Bind with dotted-path resolution.
pub fn bind_nested(template: &str, data: &DataBag) -> String {
    Binder::nested().bind(template, data)
}

/// Walk a dotted path such as `partyA.name` or `items.0.description`.
pub fn lookup_path<'a>(data: &'a DataBag, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = data.get(first)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Display text for a bound value; `None` means "leave the token in place".
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{:.0}", f)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(map) if map.is_empty() => None,
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Numeric view of a value, accepting numeric strings from form inputs.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn is_blank(data: &DataBag, key: &str) -> bool {
    data.get(key).and_then(display_value).is_none()
}

/// Synthesize the well-known fields that are absent from `data`:
/// the signing date, the reference number and, for amounts in the local
/// currency, the amount in words.
pub fn apply_auto_fields(data: &mut DataBag, now: DateTime<Local>) {
    if is_blank(data, SIGN_DATE_FIELD) {
        data.insert(
            SIGN_DATE_FIELD.to_string(),
            Value::String(format_vn_date(now.date_naive())),
        );
    }

    if is_blank(data, REFERENCE_FIELD) {
        data.insert(
            REFERENCE_FIELD.to_string(),
            Value::String(generate_reference(REFERENCE_PREFIX, now)),
        );
    }

    if is_blank(data, AMOUNT_IN_WORDS_FIELD) {
        let local_currency = data
            .get(CURRENCY_FIELD)
            .and_then(Value::as_str)
            .map(|c| c.trim().eq_ignore_ascii_case(LOCAL_CURRENCY))
            .unwrap_or(false);
        let amount = data.get(AMOUNT_FIELD).and_then(numeric_value);

        if let (true, Some(amount)) = (local_currency, amount) {
            data.insert(
                AMOUNT_IN_WORDS_FIELD.to_string(),
                Value::String(format!("{} đồng", number_to_words(amount))),
            );
        }
    }

    if let Some(text) = data
        .get(PAYMENT_TERMS_FIELD)
        .and_then(Value::as_str)
        .and_then(payment_terms_text)
    {
        data.insert(PAYMENT_TERMS_FIELD.to_string(), Value::String(text.to_string()));
    }
}

/// Date-stamped reference with a random suffix, e.g. `HD-20250305-417`.
pub fn generate_reference(prefix: &str, now: DateTime<Local>) -> String {
    let suffix: u32 = rand::rng().random_range(0..1000);
    format!("{}-{}-{}", prefix, now.format("%Y%m%d"), suffix)
}

/// Display text for the known payment-term codes.
pub fn payment_terms_text(code: &str) -> Option<&'static str> {
    match code.trim() {
        "prepaid" => Some("Trả trước 100%"),
        "cod" => Some("Thanh toán khi giao hàng"),
        "30days" => Some("Thanh toán trong 30 ngày"),
        "60days" => Some("Thanh toán trong 60 ngày"),
        "installment" => Some("Thanh toán theo đợt"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn bag(value: Value) -> DataBag {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flat_bind_replaces_all_conventions() {
        let data = bag(json!({ "NAME": "An" }));
        let out = bind("Hello [NAME], {{NAME}}, {NAME}!", &data);
        assert_eq!(out, "Hello An, An, An!");
    }

    #[test]
    fn test_missing_or_empty_values_keep_token() {
        let data = bag(json!({ "empty": "", "nothing": null }));
        let out = bind("[empty] {{nothing}} {absent}", &data);
        assert_eq!(out, "[empty] {{nothing}} {absent}");
    }

    #[test]
    fn test_flat_mode_ignores_dotted_paths() {
        let data = bag(json!({ "partyA": { "name": "Công ty A" } }));
        assert_eq!(bind("{{partyA.name}}", &data), "{{partyA.name}}");
        assert_eq!(bind_nested("{{partyA.name}}", &data), "Công ty A");
    }

    #[test]
    fn test_nested_missing_level_keeps_token() {
        let data = bag(json!({ "partyA": { "name": "A" } }));
        assert_eq!(bind_nested("{{partyB.name}}", &data), "{{partyB.name}}");
        assert_eq!(bind_nested("{{partyA.phone}}", &data), "{{partyA.phone}}");
    }

    #[test]
    fn test_literal_dotted_key_wins() {
        let data = bag(json!({ "partyA.name": "flat", "partyA": { "name": "nested" } }));
        assert_eq!(bind_nested("{{partyA.name}}", &data), "flat");
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let data = bag(json!({ "a": "{{b}}", "b": "boom" }));
        assert_eq!(bind("{{a}} {{b}}", &data), "{{b}} boom");
    }

    #[test]
    fn test_number_display() {
        let data = bag(json!({ "qty": 3, "price": 1500.0, "rate": 0.5 }));
        assert_eq!(bind("[qty] [price] [rate]", &data), "3 1500 0.5");
    }

    #[test]
    fn test_auto_fields_fill_date_and_reference() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap();
        let mut data = DataBag::new();
        apply_auto_fields(&mut data, now);

        assert_eq!(data[SIGN_DATE_FIELD], json!("05/03/2025"));
        let reference = data[REFERENCE_FIELD].as_str().unwrap();
        assert!(reference.starts_with("HD-20250305-"));
    }

    #[test]
    fn test_auto_fields_keep_caller_values() {
        let mut data = bag(json!({ "signDate": "01/01/2024", "contractNumber": "HD-X" }));
        apply_auto_fields(&mut data, Local::now());
        assert_eq!(data[SIGN_DATE_FIELD], json!("01/01/2024"));
        assert_eq!(data[REFERENCE_FIELD], json!("HD-X"));
    }

    #[test]
    fn test_amount_in_words_only_for_local_currency() {
        let mut vnd = bag(json!({ "contractValue": "1500000", "currency": "VND" }));
        apply_auto_fields(&mut vnd, Local::now());
        assert_eq!(
            vnd[AMOUNT_IN_WORDS_FIELD],
            json!("Một triệu năm trăm nghìn đồng")
        );

        let mut usd = bag(json!({ "contractValue": 1500, "currency": "USD" }));
        apply_auto_fields(&mut usd, Local::now());
        assert!(usd.get(AMOUNT_IN_WORDS_FIELD).is_none());
    }

    #[test]
    fn test_payment_term_codes_are_expanded() {
        let mut data = bag(json!({ "paymentTerms": "cod" }));
        apply_auto_fields(&mut data, Local::now());
        assert_eq!(data[PAYMENT_TERMS_FIELD], json!("Thanh toán khi giao hàng"));
    }
}
