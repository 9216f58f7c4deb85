//! Plain-text rendition of a plan.
//!
//! Used for text mode and as the fallback when PDF rendering fails, so it
//! must never fail itself.

use super::plan::{Block, DocumentPlan, ItemTable};

const RULE: &str = "==================";

pub struct TextRenderer;

impl TextRenderer {
    /// Serialize the blocks in order, separated by blank lines.
    pub fn render(plan: &DocumentPlan) -> String {
        let sections: Vec<String> = plan.blocks.iter().filter_map(render_block).collect();
        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }
}

fn render_block(block: &Block) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();

    match block {
        Block::Header {
            title, subtitles, ..
        } => {
            lines.push(title.clone());
            lines.push(RULE.to_string());
            if !subtitles.is_empty() {
                lines.push(String::new());
                lines.extend(subtitles.iter().cloned());
            }
        }
        Block::Panels(panels) => {
            let rendered: Vec<String> = panels
                .iter()
                .map(|panel| {
                    let mut section = vec![format!("{}:", panel.heading)];
                    section.extend(panel.lines.iter().map(|l| format!("- {}", l)));
                    section.join("\n")
                })
                .collect();
            lines.push(rendered.join("\n\n"));
        }
        Block::FormGrid(pairs) => {
            lines.extend(pairs.iter().map(|(label, value)| format!("{} {}", label, value)));
        }
        Block::Heading(text) => lines.push(text.clone()),
        Block::Paragraph(line) => lines.push(line.text.clone()),
        Block::Table(table) => lines.extend(table_lines(table)),
        Block::Totals(totals) => {
            lines.extend(totals.iter().map(|t| format!("- {} {}", t.label, t.value)));
        }
        Block::Signatures(boxes) => {
            lines.extend(boxes.iter().map(|b| {
                format!(
                    "{} {}: {}",
                    b.heading,
                    b.note,
                    b.name.as_deref().unwrap_or("")
                )
                .trim_end()
                .to_string()
            }));
        }
        Block::Labels(grid) => {
            for (i, cell) in grid.cells.iter().enumerate() {
                let Some(cell) = cell else {
                    continue;
                };
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push(format!("[Tem {}]", i + 1));
                lines.extend(cell.lines.iter().map(|l| l.text.clone()));
            }
        }
        Block::PageBreak => lines.push("----".to_string()),
        Block::Footer(text) => lines.push(text.clone()),
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn table_lines(table: &ItemTable) -> Vec<String> {
    let header = table
        .columns
        .iter()
        .map(|c| c.title.as_str())
        .collect::<Vec<_>>()
        .join(" | ");
    let mut lines = vec![header];
    lines.extend(table.rows.iter().map(|row| format!("- {}", row.join(" | "))));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::plan::{
        Column, DocumentKind, PageSetup, StyleRole, StyledLine, TotalLine,
    };

    #[test]
    fn test_blocks_render_in_order() {
        let mut plan = DocumentPlan::new(DocumentKind::Quote, "T", PageSetup::a4([0.0; 4]));
        plan.push(Block::Header {
            title: "BÁO GIÁ".into(),
            subtitles: vec!["Ngày: 01/01/2025".into()],
            stamp: None,
        });
        plan.push(Block::Table(ItemTable {
            columns: vec![Column::fill("Sản phẩm"), Column::right("Thành tiền")],
            rows: vec![vec!["Bàn".into(), "180".into()]],
            striped: true,
        }));
        plan.push(Block::Totals(vec![TotalLine {
            label: "TỔNG CỘNG:".into(),
            value: "253 VND".into(),
            emphasized: true,
        }]));
        plan.push(Block::Paragraph(StyledLine::new("Ghi chú", StyleRole::Info)));

        let text = TextRenderer::render(&plan);
        let header = text.find("BÁO GIÁ").unwrap();
        let row = text.find("- Bàn | 180").unwrap();
        let total = text.find("- TỔNG CỘNG: 253 VND").unwrap();
        assert!(header < row && row < total);
        assert!(text.ends_with("Ghi chú\n"));
    }

    #[test]
    fn test_empty_plan_renders_newline() {
        let plan = DocumentPlan::new(DocumentKind::Contract, "T", PageSetup::a4([0.0; 4]));
        assert_eq!(TextRenderer::render(&plan), "\n");
    }
}
