//! Placeholder discovery.
//!
//! Three bracket conventions are recognized over the same text: `[NAME]`,
//! `{{NAME}}` and `{NAME}`. Each convention is scanned independently and the
//! names are merged, so `{{NAME}}` reports `NAME` through both brace patterns
//! and deduplicates to a single entry.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref SQUARE: Regex = Regex::new(r"\[([^\[\]\r\n]+?)\]").expect("valid regex");
    static ref DOUBLE_BRACE: Regex =
        Regex::new(r"\{\{([^{}\r\n]+?)\}\}").expect("valid regex");
    static ref SINGLE_BRACE: Regex = Regex::new(r"\{([^{}\r\n]+?)\}").expect("valid regex");

    /// Combined token pattern used by the binder: a single left-to-right scan
    /// where `{{..}}` wins over `{..}` at the same position.
    pub(crate) static ref TOKEN: Regex =
        Regex::new(r"\{\{([^{}\r\n]+?)\}\}|\[([^\[\]\r\n]+?)\]|\{([^{}\r\n]+?)\}")
            .expect("valid regex");
}

/// Extract the deduplicated, trimmed set of placeholder names in `text`.
///
/// No validation of the name is performed: spaces and punctuation are
/// accepted. Names that are blank after trimming are ignored.
pub fn extract(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for pattern in [&*SQUARE, &*DOUBLE_BRACE, &*SINGLE_BRACE] {
        for caps in pattern.captures_iter(text) {
            let name = caps[1].trim();
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }

    log::debug!("extracted {} placeholder(s)", names.len());
    names
}

/// Extract placeholders as an ordered list, convenient for JSON responses.
pub fn extract_list(text: &str) -> Vec<String> {
    extract(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_convention_collapses_to_one_name() {
        let names = extract("Hello [NAME], {{NAME}}, {NAME}");
        assert_eq!(names.len(), 1);
        assert!(names.contains("NAME"));
    }

    #[test]
    fn test_names_are_trimmed_and_free_form() {
        let names = extract("{{ partyA.name }} [Ngày ký] {so hop dong!}");
        let expected: BTreeSet<String> = ["partyA.name", "Ngày ký", "so hop dong!"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_no_tokens_yields_empty_set() {
        assert!(extract("plain text without markers").is_empty());
        assert!(extract("").is_empty());
        assert!(extract("[] {} {{ }}").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent_on_rendered_names() {
        let first = extract("[A] {{B}} {C}");
        let rendered = first.iter().cloned().collect::<Vec<_>>().join(" ");
        assert!(extract(&rendered).is_empty());
    }

    #[test]
    fn test_tokens_do_not_span_lines() {
        assert!(extract("[open\nclose]").is_empty());
    }

    #[test]
    fn test_large_input() {
        let text = "[FIELD] filler text ".repeat(50_000);
        let names = extract(&text);
        assert_eq!(names.len(), 1);
    }
}
