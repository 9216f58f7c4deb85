//! Line, discount, VAT and grand totals for itemized documents.
//!
//! Totals are always recomputed here; anything the client sends as a total is
//! ignored. Missing numbers count as zero and the layer itself never rejects
//! negative input, that is the validators' job.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of a quote or payment voucher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Discount percent in [0, 100].
    #[serde(default)]
    pub discount: Option<f64>,
}

impl LineItem {
    /// Text shown in the description column: name, then description.
    pub fn label(&self) -> String {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();

        match (name.is_empty(), description.is_empty()) {
            (false, false) => format!("{} - {}", name, description),
            (false, true) => name.to_string(),
            (true, false) => description.to_string(),
            (true, true) => String::new(),
        }
    }

    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price.unwrap_or(0.0)
    }

    pub fn discount(&self) -> f64 {
        self.discount.unwrap_or(0.0)
    }

    pub fn has_discount(&self) -> bool {
        self.discount() != 0.0
    }
}

/// Computed amounts for one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineTotals {
    pub item_total: f64,
    pub discount_amount: f64,
    pub line_final: f64,
}

impl LineTotals {
    pub fn of(item: &LineItem) -> Self {
        let item_total = item.quantity() * item.unit_price();
        let discount_amount = item_total * item.discount() / 100.0;
        Self {
            item_total,
            discount_amount,
            line_final: item_total - discount_amount,
        }
    }
}

/// Document-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub vat_rate: f64,
    pub vat_amount: f64,
    pub total: f64,
}

/// Per-line amounts in input order.
pub fn compute_lines(items: &[LineItem]) -> Vec<LineTotals> {
    items.iter().map(LineTotals::of).collect()
}

/// Subtotal, VAT and total for `items` at `vat_rate` percent.
pub fn compute_totals(items: &[LineItem], vat_rate: f64) -> Totals {
    let subtotal: f64 = compute_lines(items).iter().map(|l| l.line_final).sum();
    let vat_amount = subtotal * vat_rate / 100.0;
    Totals {
        subtotal,
        vat_rate,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

/// Voucher total: items ignore discounts and carry no VAT. Without items the
/// caller-supplied amount is used as-is.
pub fn voucher_total(items: &[LineItem], supplied: Option<f64>) -> f64 {
    if items.is_empty() {
        return supplied.unwrap_or(0.0);
    }
    items.iter().map(|i| i.quantity() * i.unit_price()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, unit_price: f64, discount: Option<f64>) -> LineItem {
        LineItem {
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            discount,
            ..Default::default()
        }
    }

    #[test]
    fn test_worked_example() {
        let items = vec![item(2.0, 100.0, Some(10.0)), item(1.0, 50.0, None)];
        let lines = compute_lines(&items);
        assert_eq!(lines[0].line_final, 180.0);
        assert_eq!(lines[0].discount_amount, 20.0);
        assert_eq!(lines[1].line_final, 50.0);

        let totals = compute_totals(&items, 10.0);
        assert_eq!(totals.subtotal, 230.0);
        assert_eq!(totals.vat_amount, 23.0);
        assert_eq!(totals.total, 253.0);
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let totals = compute_totals(&[LineItem::default()], 10.0);
        assert_eq!(totals.total, 0.0);
        assert!(compute_totals(&[], 10.0).subtotal == 0.0);
    }

    #[test]
    fn test_voucher_total() {
        let items = vec![item(2.0, 100.0, Some(50.0)), item(3.0, 10.0, None)];
        assert_eq!(voucher_total(&items, Some(1.0)), 230.0);
        assert_eq!(voucher_total(&[], Some(5_000_000.0)), 5_000_000.0);
        assert_eq!(voucher_total(&[], None), 0.0);
    }

    #[test]
    fn test_label_joins_name_and_description() {
        let mut line = LineItem {
            name: Some("Laptop".into()),
            description: Some("14 inch".into()),
            ..Default::default()
        };
        assert_eq!(line.label(), "Laptop - 14 inch");
        line.name = None;
        assert_eq!(line.label(), "14 inch");
    }
}
