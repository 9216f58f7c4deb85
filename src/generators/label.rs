//! Product label sheets: a rows x cols grid of identical labels per page.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::assembler::AssemblyContext;
use super::binder::display_value;
use super::common::format_input_date;
use super::party::Party;
use super::plan::{
    Block, DocumentKind, DocumentPlan, LabelCell, LabelGrid, Orientation, PageSetup, PageSize,
    StyleRole, StyledLine,
};
use super::traits::{Assemble, Validator};
use super::validation::{
    validate_one_of, validate_range, validate_required, validate_required_opt, ValidationErrors,
};

pub const MAX_GRID_SIDE: i64 = 10;
pub const MAX_LABELS: i64 = 1000;
/// Page margin on every side of a label sheet.
pub const SHEET_MARGIN: f64 = 10.0;
const MISSING: &str = "N/A";

/// Label category; unknown values print as a standard label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Food,
    Cosmetic,
    Electronic,
    Medicine,
    #[default]
    #[serde(other)]
    Standard,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub company: Party,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub skin_type: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub active_ingredient: Option<String>,
    #[serde(default)]
    pub lot_number: Option<String>,
    /// Number or text, printed as given.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

fn default_size() -> String {
    "a4".to_string()
}

fn default_orientation() -> String {
    "portrait".to_string()
}

fn default_rows() -> i64 {
    3
}

fn default_cols() -> i64 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    #[serde(default)]
    pub product: Product,
    #[serde(default)]
    #[schema(value_type = String, example = "food")]
    pub label_type: LabelType,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_orientation")]
    pub orientation: String,
    #[serde(default = "default_rows")]
    pub rows: i64,
    #[serde(default = "default_cols")]
    pub cols: i64,
    /// Labels to print; one full page when absent.
    #[serde(default)]
    pub count: Option<i64>,
}

impl Default for LabelRequest {
    fn default() -> Self {
        Self {
            product: Product::default(),
            label_type: LabelType::default(),
            size: default_size(),
            orientation: default_orientation(),
            rows: default_rows(),
            cols: default_cols(),
            count: None,
        }
    }
}

impl Validator for LabelRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required_opt(
            self.product.name.as_deref(),
            "product.name",
            "Tên sản phẩm",
            &mut errors,
        );
        validate_required_opt(
            self.product.origin.as_deref(),
            "product.origin",
            "Xuất xứ",
            &mut errors,
        );
        validate_required(
            self.product.company.name(),
            "product.company.name",
            "Tên công ty nhập khẩu",
            &mut errors,
        );
        validate_one_of(&self.size, &PageSize::OPTIONS, "size", "Khổ giấy", &mut errors);
        validate_one_of(
            &self.orientation,
            &Orientation::OPTIONS,
            "orientation",
            "Hướng giấy",
            &mut errors,
        );
        validate_range(
            Some(self.rows as f64),
            1.0,
            MAX_GRID_SIDE as f64,
            "rows",
            "Số hàng",
            &mut errors,
        );
        validate_range(
            Some(self.cols as f64),
            1.0,
            MAX_GRID_SIDE as f64,
            "cols",
            "Số cột",
            &mut errors,
        );
        validate_range(
            self.count.map(|c| c as f64),
            1.0,
            MAX_LABELS as f64,
            "count",
            "Số lượng tem",
            &mut errors,
        );

        errors.into_result()
    }
}

fn or_missing(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn expiry_text(product: &Product) -> String {
    present(&product.expiry_date)
        .map(format_input_date)
        .unwrap_or_else(|| MISSING.to_string())
}

impl LabelRequest {
    pub fn page_setup(&self) -> PageSetup {
        PageSetup {
            size: PageSize::parse(&self.size).unwrap_or(PageSize::A4),
            orientation: Orientation::parse(&self.orientation).unwrap_or(Orientation::Portrait),
            margins: [SHEET_MARGIN; 4],
        }
    }

    fn grid_shape(&self) -> (usize, usize) {
        let clamp = |v: i64| v.clamp(1, MAX_GRID_SIDE) as usize;
        (clamp(self.rows), clamp(self.cols))
    }

    /// The content of one label for this product and label type.
    pub fn cell(&self) -> LabelCell {
        let p = &self.product;
        let mut lines = vec![
            StyledLine::new(
                present(&p.name).unwrap_or("Tên sản phẩm"),
                StyleRole::ProductName,
            ),
            StyledLine::new(format!("Xuất xứ: {}", or_missing(&p.origin)), StyleRole::Origin),
            StyledLine::new(
                format!("Công ty: {}", or_missing(&p.company.name)),
                StyleRole::Company,
            ),
        ];

        match self.label_type {
            LabelType::Food => {
                lines.push(StyledLine::new(
                    format!("Thành phần: {}", or_missing(&p.ingredients)),
                    StyleRole::LabelInfo,
                ));
                lines.push(StyledLine::new(
                    format!("HSD: {}", expiry_text(p)),
                    StyleRole::Expiry,
                ));
                lines.push(StyledLine::new(
                    format!("Bảo quản: {}", or_missing(&p.storage)),
                    StyleRole::Storage,
                ));
            }
            LabelType::Cosmetic => {
                lines.push(StyledLine::new(
                    format!(
                        "Loại da: {}",
                        present(&p.skin_type).unwrap_or("Mọi loại da")
                    ),
                    StyleRole::LabelInfo,
                ));
                lines.push(StyledLine::new(
                    format!("Cách dùng: {}", or_missing(&p.usage)),
                    StyleRole::LabelInfo,
                ));
                lines.push(StyledLine::new(
                    format!("HSD: {}", expiry_text(p)),
                    StyleRole::Expiry,
                ));
            }
            LabelType::Electronic => {
                lines.push(StyledLine::new(
                    format!("Model: {}", or_missing(&p.model)),
                    StyleRole::LabelInfo,
                ));
                lines.push(StyledLine::new(
                    format!("Bảo hành: {}", or_missing(&p.warranty)),
                    StyleRole::LabelInfo,
                ));
            }
            LabelType::Medicine => {
                lines.push(StyledLine::new(
                    format!("Hoạt chất: {}", or_missing(&p.active_ingredient)),
                    StyleRole::LabelInfo,
                ));
                lines.push(StyledLine::new(
                    format!("HSD: {}", expiry_text(p)),
                    StyleRole::Expiry,
                ));
                lines.push(StyledLine::new(
                    format!("Số lô: {}", or_missing(&p.lot_number)),
                    StyleRole::LabelInfo,
                ));
            }
            LabelType::Standard => {
                if let Some(weight) = p.weight.as_ref().and_then(display_value) {
                    lines.push(StyledLine::new(
                        format!(
                            "Trọng lượng: {} {}",
                            weight,
                            present(&p.unit).unwrap_or("kg")
                        ),
                        StyleRole::LabelInfo,
                    ));
                }
                if let Some(lot) = present(&p.lot_number) {
                    lines.push(StyledLine::new(
                        format!("Số lô: {}", lot),
                        StyleRole::LabelInfo,
                    ));
                }
            }
        }

        if let Some(barcode) = present(&p.barcode) {
            lines.push(StyledLine::new(format!("Mã: {}", barcode), StyleRole::Barcode));
        }

        LabelCell { lines }
    }

    /// Grid pages holding `count` labels; cells past the count are blank.
    pub fn grids(&self) -> Vec<LabelGrid> {
        let page = self.page_setup();
        let (rows, cols) = self.grid_shape();
        let (width, height) = page.dimensions();
        let cell_width = (width - 2.0 * SHEET_MARGIN) / cols as f64;
        let cell_height = (height - 2.0 * SHEET_MARGIN) / rows as f64;

        let per_page = rows * cols;
        let count = self
            .count
            .map(|c| c.clamp(1, MAX_LABELS) as usize)
            .unwrap_or(per_page);
        let cell = self.cell();

        let mut grids = Vec::new();
        let mut remaining = count;
        while remaining > 0 {
            let filled = remaining.min(per_page);
            let cells = (0..per_page)
                .map(|i| (i < filled).then(|| cell.clone()))
                .collect();
            grids.push(LabelGrid {
                rows,
                cols,
                cell_width,
                cell_height,
                cells,
            });
            remaining -= filled;
        }
        grids
    }
}

impl Assemble for LabelRequest {
    fn assemble(&self, _ctx: &AssemblyContext) -> DocumentPlan {
        let mut plan = DocumentPlan::new(DocumentKind::Label, "TEM DÁN SẢN PHẨM", self.page_setup());

        for (i, grid) in self.grids().into_iter().enumerate() {
            if i > 0 {
                plan.push(Block::PageBreak);
            }
            plan.push(Block::Labels(grid));
        }

        plan
    }
}
