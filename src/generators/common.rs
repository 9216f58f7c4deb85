//! Common utilities for document generation.
//!
//! Shared helpers for date and money formatting, filenames, Typst escaping and
//! the amount-in-words reading.

use chrono::{DateTime, Local, NaiveDate};

/// Format a date the way the forms print it (e.g., "05/03/2025").
pub fn format_vn_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format a timestamp as `DD/MM/YYYY HH:MM:SS`.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

/// Reformat a caller-supplied date (`YYYY-MM-DD` or RFC 3339) as `DD/MM/YYYY`.
///
/// Anything unparseable is passed through unchanged.
pub fn format_input_date(value: &str) -> String {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return format_vn_date(date);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return format_vn_date(at.date_naive());
    }
    trimmed.to_string()
}

/// Format an amount with `.` thousands and `,` decimals (vi-VN), at most three
/// fraction digits.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let int_part = rounded.trunc() as u128;
    let frac = format!("{:.3}", rounded.fract());
    let frac = frac
        .trim_start_matches('0')
        .trim_start_matches('.')
        .trim_end_matches('0');

    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative && (int_part > 0 || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Format a quantity: whole numbers without decimals.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\r', "")
        .replace('\n', r"\n")
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let result = result.trim_matches('-').to_string();
    if result.is_empty() {
        return fallback.to_string();
    }
    result
}

const DIGITS: [&str; 10] = [
    "không", "một", "hai", "ba", "bốn", "năm", "sáu", "bảy", "tám", "chín",
];
const GROUP_SCALES: [&str; 3] = ["", "nghìn", "triệu"];

/// Best-effort Vietnamese reading of an amount, e.g. `1_500_000` →
/// "Một triệu năm trăm nghìn".
///
/// Only the integer part is read. This is a display nicety for contracts, not
/// an accounting guarantee.
pub fn number_to_words(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let negative = value < 0.0;
    // u64 covers every amount that fits in a form field.
    let mut n = value.abs().trunc().min(u64::MAX as f64) as u64;
    if n == 0 {
        return "Không".to_string();
    }

    let mut groups = Vec::new();
    while n > 0 {
        groups.push(n % 1000);
        n /= 1000;
    }

    let mut words: Vec<String> = Vec::new();
    for (index, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        let full = !words.is_empty();
        words.push(read_group(group, full));

        let mut scale = GROUP_SCALES[index % 3].to_string();
        for _ in 0..index / 3 {
            if !scale.is_empty() {
                scale.push(' ');
            }
            scale.push_str("tỷ");
        }
        if !scale.is_empty() {
            words.push(scale);
        }
    }

    let mut text = words.join(" ");
    if negative {
        text = format!("âm {}", text);
    }
    capitalize(&text)
}

/// Read one group of three digits. `full` forces the hundreds digit
/// ("không trăm") when a higher group was already read.
fn read_group(n: u64, full: bool) -> String {
    let hundreds = (n / 100) as usize;
    let tens = ((n / 10) % 10) as usize;
    let units = (n % 10) as usize;
    let mut parts: Vec<&str> = Vec::new();

    if full || hundreds > 0 {
        parts.push(DIGITS[hundreds]);
        parts.push("trăm");
    }

    match tens {
        0 => {
            if units > 0 && (full || hundreds > 0) {
                parts.push("lẻ");
            }
        }
        1 => parts.push("mười"),
        t => {
            parts.push(DIGITS[t]);
            parts.push("mươi");
        }
    }

    if units > 0 {
        let word = match units {
            1 if tens > 1 => "mốt",
            5 if tens > 0 => "lăm",
            u => DIGITS[u],
        };
        parts.push(word);
    }

    parts.join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_groups_thousands() {
        assert_eq!(format_money(0.0), "0");
        assert_eq!(format_money(253.0), "253");
        assert_eq!(format_money(1_234_567.0), "1.234.567");
        assert_eq!(format_money(1234.5), "1.234,5");
        assert_eq!(format_money(-2000.0), "-2.000");
    }

    #[test]
    fn test_format_input_date() {
        assert_eq!(format_input_date("2025-03-05"), "05/03/2025");
        assert_eq!(format_input_date("2025-03-05T10:00:00+07:00"), "05/03/2025");
        assert_eq!(format_input_date("next week"), "next week");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Báo giá  ABC_01", "doc"), "bo-gi-abc-01");
        assert_eq!(sanitize_filename("***", "doc"), "doc");
    }

    #[test]
    fn test_number_to_words() {
        assert_eq!(number_to_words(0.0), "Không");
        assert_eq!(number_to_words(15.0), "Mười lăm");
        assert_eq!(number_to_words(21.0), "Hai mươi mốt");
        assert_eq!(number_to_words(105.0), "Một trăm lẻ năm");
        assert_eq!(number_to_words(1_500_000.0), "Một triệu năm trăm nghìn");
        assert_eq!(number_to_words(1_005.0), "Một nghìn không trăm lẻ năm");
        assert_eq!(number_to_words(2_000_000_000.0), "Hai tỷ");
    }

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(escape_typst_string("a \"b\"\nc\\"), r#"a \"b\"\nc\\"#);
    }
}
