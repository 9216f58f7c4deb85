//! Document plans - the ordered block structure handed to render backends.
//!
//! A plan is the contract between assembly and rendering: backends only
//! decide how each block looks, never which blocks exist or in what order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::stamp::Stamp;
use super::{GeneratorError, OutputMode};

/// The built-in document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quote,
    Contract,
    Label,
    Payment,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [Self::Quote, Self::Contract, Self::Label, Self::Payment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Contract => "contract",
            Self::Label => "label",
            Self::Payment => "payment",
        }
    }

    /// Filename stem for generated files.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Quote => "bao-gia",
            Self::Contract => "hop-dong",
            Self::Label => "tem-dan",
            Self::Payment => "phieu-thanh-toan",
        }
    }

    /// Output used when the caller does not ask for one.
    pub fn default_mode(&self) -> OutputMode {
        match self {
            Self::Quote => OutputMode::Text,
            _ => OutputMode::Pdf,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quote" | "quotes" => Ok(Self::Quote),
            "contract" | "contracts" => Ok(Self::Contract),
            "label" | "labels" => Ok(Self::Label),
            "payment" | "payments" => Ok(Self::Payment),
            _ => Err(GeneratorError::UnknownKind(s.to_string())),
        }
    }
}

/// Named style presets; see `styles` for the concrete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleRole {
    Title,
    Subtitle,
    SectionHeader,
    Info,
    FormLabel,
    FormValue,
    Purpose,
    Body,
    TableHeader,
    TableCell,
    TotalLabel,
    TotalValue,
    SignatureHeader,
    SignatureNote,
    SignatureName,
    Footer,
    ProductName,
    Origin,
    Company,
    LabelInfo,
    Expiry,
    Storage,
    Barcode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledLine {
    pub text: String,
    pub role: StyleRole,
}

impl StyledLine {
    pub fn new(text: impl Into<String>, role: StyleRole) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// One column of a side-by-side info section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPanel {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    /// Takes the remaining width.
    Fill,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub title: String,
    pub align: Align,
    pub width: ColumnWidth,
}

impl Column {
    pub fn fill(title: &str) -> Self {
        Self {
            title: title.to_string(),
            align: Align::Left,
            width: ColumnWidth::Fill,
        }
    }

    pub fn center(title: &str) -> Self {
        Self {
            title: title.to_string(),
            align: Align::Center,
            width: ColumnWidth::Auto,
        }
    }

    pub fn right(title: &str) -> Self {
        Self {
            title: title.to_string(),
            align: Align::Right,
            width: ColumnWidth::Auto,
        }
    }
}

/// Itemized table; row 0 of the rendered table is the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    /// Alternate body rows get a light background.
    pub striped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalLine {
    pub label: String,
    pub value: String,
    /// The grand total, drawn with the total presets.
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureBox {
    pub heading: String,
    pub note: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCell {
    pub lines: Vec<StyledLine>,
}

/// One page of labels; `cells` is row-major with `rows * cols` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelGrid {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub cells: Vec<Option<LabelCell>>,
}

impl LabelGrid {
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Block {
    Header {
        title: String,
        subtitles: Vec<String>,
        stamp: Option<Stamp>,
    },
    Panels(Vec<InfoPanel>),
    /// Label/value pairs laid out two pairs per row.
    FormGrid(Vec<(String, String)>),
    Heading(String),
    Paragraph(StyledLine),
    Table(ItemTable),
    Totals(Vec<TotalLine>),
    Signatures(Vec<SignatureBox>),
    Labels(LabelGrid),
    PageBreak,
    Footer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    A5,
}

impl PageSize {
    pub const OPTIONS: [&'static str; 2] = ["a4", "a5"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            _ => None,
        }
    }

    /// Portrait width and height in points.
    pub fn points(&self) -> (f64, f64) {
        match self {
            Self::A4 => (595.0, 842.0),
            Self::A5 => (420.0, 595.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub const OPTIONS: [&'static str; 2] = ["portrait", "landscape"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "portrait" => Some(Self::Portrait),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSetup {
    pub size: PageSize,
    pub orientation: Orientation,
    /// Left, top, right, bottom in points.
    pub margins: [f64; 4],
}

impl PageSetup {
    pub fn a4(margins: [f64; 4]) -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins,
        }
    }

    /// Page width and height in points after orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.points();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPlan {
    pub kind: DocumentKind,
    pub title: String,
    pub page: PageSetup,
    pub blocks: Vec<Block>,
}

impl DocumentPlan {
    pub fn new(kind: DocumentKind, title: impl Into<String>, page: PageSetup) -> Self {
        Self {
            kind,
            title: title.into(),
            page,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Label grids in page order.
    pub fn label_pages(&self) -> impl Iterator<Item = &LabelGrid> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Labels(grid) => Some(grid),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("quote".parse::<DocumentKind>().unwrap(), DocumentKind::Quote);
        assert_eq!("Labels".parse::<DocumentKind>().unwrap(), DocumentKind::Label);
        assert!(matches!(
            "invoice".parse::<DocumentKind>(),
            Err(GeneratorError::UnknownKind(k)) if k == "invoice"
        ));
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(DocumentKind::Quote.default_mode(), OutputMode::Text);
        assert_eq!(DocumentKind::Label.default_mode(), OutputMode::Pdf);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let mut page = PageSetup::a4([10.0; 4]);
        assert_eq!(page.dimensions(), (595.0, 842.0));
        page.orientation = Orientation::Landscape;
        assert_eq!(page.dimensions(), (842.0, 595.0));
        page.size = PageSize::A5;
        assert_eq!(page.dimensions(), (595.0, 420.0));
    }
}
