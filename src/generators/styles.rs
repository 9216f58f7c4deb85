//! Style presets per role, shared by every PDF layout.

use super::plan::{Align, StyleRole};

/// Fill for table headers.
pub const HEADER_FILL: &str = "#3B82F6";
/// Fill for alternate table rows.
pub const STRIPE_FILL: &str = "#F8FAFC";
/// Label cell border.
pub const LABEL_BORDER: &str = "#D1D5DB";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<&'static str>,
    pub align: Align,
}

impl TextStyle {
    const fn plain(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            color: None,
            align: Align::Left,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    const fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    const fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

impl StyleRole {
    pub fn style(&self) -> TextStyle {
        match self {
            Self::Title => TextStyle::plain(18.0)
                .bold()
                .color("#1F2937")
                .align(Align::Center),
            Self::Subtitle => TextStyle::plain(12.0)
                .color("#6B7280")
                .align(Align::Center),
            Self::SectionHeader => TextStyle::plain(12.0).bold().color("#374151"),
            Self::Info => TextStyle::plain(10.0),
            Self::FormLabel => TextStyle::plain(10.0).bold().color("#374151"),
            Self::FormValue => TextStyle::plain(10.0).color("#1F2937"),
            Self::Purpose => TextStyle::plain(11.0).color("#1F2937"),
            Self::Body => TextStyle::plain(11.0),
            Self::TableHeader => TextStyle::plain(11.0)
                .bold()
                .color("#FFFFFF")
                .align(Align::Center),
            Self::TableCell => TextStyle::plain(10.0),
            Self::TotalLabel => TextStyle::plain(14.0).bold().color("#DC2626"),
            Self::TotalValue => TextStyle::plain(14.0)
                .bold()
                .color("#DC2626")
                .align(Align::Right),
            Self::SignatureHeader => TextStyle::plain(11.0)
                .bold()
                .color("#1F2937")
                .align(Align::Center),
            Self::SignatureNote => TextStyle::plain(9.0)
                .italic()
                .color("#6B7280")
                .align(Align::Center),
            Self::SignatureName => TextStyle::plain(10.0)
                .bold()
                .color("#1F2937")
                .align(Align::Center),
            Self::Footer => TextStyle::plain(8.0)
                .italic()
                .color("#6B7280")
                .align(Align::Right),
            Self::ProductName => TextStyle::plain(10.0).bold().color("#1F2937"),
            Self::Origin => TextStyle::plain(8.0).color("#374151"),
            Self::Company => TextStyle::plain(7.0).color("#6B7280"),
            Self::LabelInfo => TextStyle::plain(7.0).color("#4B5563"),
            Self::Expiry => TextStyle::plain(8.0).bold().color("#DC2626"),
            Self::Storage => TextStyle::plain(7.0).italic().color("#059669"),
            Self::Barcode => TextStyle::plain(7.0)
                .color("#1F2937")
                .align(Align::Center),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let title = StyleRole::Title.style();
        assert_eq!(title.size, 18.0);
        assert!(title.bold);
        assert_eq!(title.align, Align::Center);

        let storage = StyleRole::Storage.style();
        assert!(storage.italic);
        assert_eq!(storage.color, Some("#059669"));
    }
}
