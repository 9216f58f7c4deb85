//! Typst rendering engine.
//!
//! Handles the low-level details of turning a plan into Typst source, writing
//! it to a temporary directory, invoking the compiler, and reading back the
//! output PDF.

use std::fmt::Write as _;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use tempfile::TempDir;
use thiserror::Error;

use super::common::escape_typst_string;
use super::plan::{
    Align, Block, ColumnWidth, DocumentPlan, InfoPanel, ItemTable, LabelGrid, SignatureBox,
    StyleRole, TotalLine,
};
use super::stamp::{Stamp, STAMP_MODULES};
use super::styles::{HEADER_FILL, LABEL_BORDER, STRIPE_FILL};
use super::traits::RenderBackend;

const SOURCE_FILE: &str = "document.typ";
const OUTPUT_FILE: &str = "document.pdf";
const STAMP_SIZE: f64 = 80.0;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Causes of a failed PDF render. All of them are recovered by the text
/// fallback.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create temp directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst file: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("failed to execute typst compile: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("typst compile exited with code {code}: {stderr}")]
    TypstExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("typst produced an empty PDF")]
    EmptyOutput,
    #[error("typst compile did not finish within {0:?}")]
    Timeout(Duration),
    #[error("render task failed: {0}")]
    Join(String),
}

/// Render configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub typst_binary: PathBuf,
    pub font_paths: Vec<PathBuf>,
    pub default_font: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            typst_binary: PathBuf::from("typst"),
            font_paths: Vec::new(),
            default_font: None,
            timeout: None,
        }
    }
}

/// PDF backend driving the `typst` CLI.
pub struct TypstRenderEngine {
    config: RenderConfig,
}

impl TypstRenderEngine {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The complete Typst source for `plan`.
    pub fn typst_source(&self, plan: &DocumentPlan) -> String {
        let mut src = String::new();
        let (width, height) = plan.page.dimensions();
        let [left, top, right, bottom] = plan.page.margins;

        let _ = writeln!(
            src,
            "#set document(title: \"{}\")",
            escape_typst_string(&plan.title)
        );
        let _ = writeln!(
            src,
            "#set page(width: {}pt, height: {}pt, margin: (left: {}pt, top: {}pt, right: {}pt, bottom: {}pt))",
            width, height, left, top, right, bottom
        );
        match &self.config.default_font {
            Some(font) => {
                let _ = writeln!(
                    src,
                    "#set text(font: \"{}\", size: 10pt, lang: \"vi\")",
                    escape_typst_string(font)
                );
            }
            None => {
                let _ = writeln!(src, "#set text(size: 10pt, lang: \"vi\")");
            }
        }
        src.push('\n');

        for block in &plan.blocks {
            src.push_str(&block_source(block));
            src.push('\n');
        }

        src
    }

    /// Compile Typst source to PDF bytes.
    pub fn compile(&self, typst_source: &str) -> Result<Vec<u8>, RenderError> {
        // Create temp directory for compilation context
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;
        let typ_path = temp_dir.path().join(SOURCE_FILE);

        fs::write(&typ_path, typst_source).map_err(RenderError::WriteTypst)?;

        let pdf = self.compile_typst_to_pdf(&temp_dir)?;
        if pdf.is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(pdf)
    }

    fn compile_typst_to_pdf(&self, temp_dir: &TempDir) -> Result<Vec<u8>, RenderError> {
        let typ_path = temp_dir.path().join(SOURCE_FILE);
        let output_path = temp_dir.path().join(OUTPUT_FILE);

        let mut command = Command::new(&self.config.typst_binary);
        command.arg("compile");
        for font_path in &self.config.font_paths {
            command.arg("--font-path").arg(font_path);
        }
        command
            .arg(&typ_path)
            .arg(&output_path)
            .current_dir(temp_dir.path())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        log::debug!("running {:?}", command);
        let mut child = command.spawn().map_err(RenderError::TypstIo)?;
        // Read stderr while the compiler runs so a full pipe cannot stall it.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });
        let status = match self.config.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit)?,
            None => child.wait().map_err(RenderError::TypstIo)?,
        };
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(RenderError::TypstExit {
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        fs::read(&output_path).map_err(RenderError::ReadPdf)
    }
}

impl RenderBackend for TypstRenderEngine {
    fn render_pdf(&self, plan: &DocumentPlan) -> Result<Vec<u8>, RenderError> {
        let source = self.typst_source(plan);
        self.compile(&source)
    }
}

/// Wait for `child`, killing it once `limit` has passed.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<ExitStatus, RenderError> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().map_err(RenderError::TypstIo)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RenderError::Timeout(limit));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// ============================================================================
// Typst source generation
// ============================================================================

fn align_name(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    }
}

/// `text(...)` call for `value` in the preset of `role`, aligned per preset.
fn styled(value: &str, role: StyleRole) -> String {
    styled_aligned(value, role, role.style().align)
}

fn styled_aligned(value: &str, role: StyleRole, align: Align) -> String {
    let style = role.style();
    let mut args = format!("size: {}pt", style.size);
    if style.bold {
        args.push_str(", weight: \"bold\"");
    }
    if style.italic {
        args.push_str(", style: \"italic\"");
    }
    if let Some(color) = style.color {
        let _ = write!(args, ", fill: rgb(\"{}\")", color);
    }

    let text = format!("text({}, \"{}\")", args, escape_typst_string(value));
    match align {
        Align::Left => text,
        other => format!("align({}, {})", align_name(other), text),
    }
}

fn block_source(block: &Block) -> String {
    match block {
        Block::Header {
            title,
            subtitles,
            stamp,
        } => header_source(title, subtitles, stamp.as_ref()),
        Block::Panels(panels) => panels_source(panels),
        Block::FormGrid(pairs) => form_grid_source(pairs),
        Block::Heading(text) => format!(
            "#v(6pt)\n#{}\n#v(4pt)",
            styled(text, StyleRole::SectionHeader)
        ),
        Block::Paragraph(line) => format!("#{}\n#v(10pt)", styled(&line.text, line.role)),
        Block::Table(table) => table_source(table),
        Block::Totals(lines) => totals_source(lines),
        Block::Signatures(boxes) => signatures_source(boxes),
        Block::Labels(grid) => labels_source(grid),
        Block::PageBreak => "#pagebreak()".to_string(),
        Block::Footer(text) => format!("#v(12pt)\n#{}", styled(text, StyleRole::Footer)),
    }
}

fn header_source(title: &str, subtitles: &[String], stamp: Option<&Stamp>) -> String {
    let mut lines = vec![styled(title, StyleRole::Title)];
    lines.extend(subtitles.iter().map(|s| styled(s, StyleRole::Subtitle)));
    let stack = format!("stack(spacing: 4pt, {})", lines.join(", "));

    match stamp {
        Some(stamp) => format!(
            "#grid(columns: (1fr, auto), column-gutter: 12pt, align: horizon,\n  {},\n  {},\n)\n#v(24pt)",
            stack,
            stamp_source(stamp)
        ),
        None => format!("#{}\n#v(24pt)", stack),
    }
}

fn stamp_source(stamp: &Stamp) -> String {
    let module = STAMP_SIZE / STAMP_MODULES as f64;
    let mut cells = String::new();
    for row in 0..STAMP_MODULES {
        for col in 0..STAMP_MODULES {
            if stamp.is_dark(row, col) {
                let _ = write!(
                    cells,
                    "place(dx: {:.2}pt, dy: {:.2}pt, rect(width: {:.2}pt, height: {:.2}pt, fill: black, stroke: none)); ",
                    col as f64 * module,
                    row as f64 * module,
                    module,
                    module
                );
            }
        }
    }
    format!(
        "box(width: {size}pt, height: {size}pt, {{ {cells}}})",
        size = STAMP_SIZE,
        cells = cells
    )
}

fn panels_source(panels: &[InfoPanel]) -> String {
    let columns = panels.iter().map(|_| "1fr").collect::<Vec<_>>().join(", ");
    let cells: Vec<String> = panels
        .iter()
        .map(|panel| {
            let mut items = vec![styled(&panel.heading, StyleRole::SectionHeader)];
            items.extend(panel.lines.iter().map(|l| styled(l, StyleRole::Info)));
            format!("stack(spacing: 4pt, {})", items.join(", "))
        })
        .collect();

    format!(
        "#grid(columns: ({},), column-gutter: 4%,\n  {},\n)\n#v(18pt)",
        columns,
        cells.join(",\n  ")
    )
}

fn form_grid_source(pairs: &[(String, String)]) -> String {
    let cells: Vec<String> = pairs
        .iter()
        .flat_map(|(label, value)| {
            [
                styled(label, StyleRole::FormLabel),
                styled(value, StyleRole::FormValue),
            ]
        })
        .collect();

    format!(
        "#table(columns: (25%, 25%, 25%, 25%), stroke: (x: none, y: 0.5pt + luma(200)), inset: 5pt,\n  {},\n)\n#v(14pt)",
        cells.join(",\n  ")
    )
}

fn table_source(table: &ItemTable) -> String {
    let widths: Vec<&str> = table
        .columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fill => "1fr",
            ColumnWidth::Auto => "auto",
        })
        .collect();
    let aligns: Vec<&str> = table.columns.iter().map(|c| align_name(c.align)).collect();
    let fill = if table.striped {
        format!(
            "(x, y) => if y == 0 {{ rgb(\"{}\") }} else if calc.even(y) {{ rgb(\"{}\") }}",
            HEADER_FILL, STRIPE_FILL
        )
    } else {
        format!("(x, y) => if y == 0 {{ rgb(\"{}\") }}", HEADER_FILL)
    };

    let header: Vec<String> = table
        .columns
        .iter()
        .map(|c| styled_aligned(&c.title, StyleRole::TableHeader, Align::Left))
        .collect();
    let body: Vec<String> = table
        .rows
        .iter()
        .flat_map(|row| {
            row.iter()
                .map(|cell| styled_aligned(cell, StyleRole::TableCell, Align::Left))
        })
        .collect();

    let mut src = format!(
        "#table(columns: ({},), align: ({},), inset: 5pt, stroke: 0.5pt + luma(210), fill: {},\n  table.header({}),\n",
        widths.join(", "),
        aligns.join(", "),
        fill,
        header.join(", ")
    );
    for cell in body {
        let _ = writeln!(src, "  {},", cell);
    }
    src.push_str(")\n#v(12pt)");
    src
}

fn totals_source(lines: &[TotalLine]) -> String {
    let cells: Vec<String> = lines
        .iter()
        .flat_map(|line| {
            let (label_role, value_role) = if line.emphasized {
                (StyleRole::TotalLabel, StyleRole::TotalValue)
            } else {
                (StyleRole::Info, StyleRole::Info)
            };
            [
                styled_aligned(&line.label, label_role, Align::Left),
                styled_aligned(&line.value, value_role, Align::Left),
            ]
        })
        .collect();

    format!(
        "#align(right, grid(columns: (auto, auto), column-gutter: 16pt, row-gutter: 6pt, align: (left, right),\n  {},\n))\n#v(24pt)",
        cells.join(",\n  ")
    )
}

fn signatures_source(boxes: &[SignatureBox]) -> String {
    let columns = boxes.iter().map(|_| "1fr").collect::<Vec<_>>().join(", ");
    let cells: Vec<String> = boxes
        .iter()
        .map(|b| {
            format!(
                "stack(spacing: 4pt, {}, {}, v(40pt), {})",
                styled(&b.heading, StyleRole::SignatureHeader),
                styled(&b.note, StyleRole::SignatureNote),
                styled(b.name.as_deref().unwrap_or(""), StyleRole::SignatureName)
            )
        })
        .collect();

    format!(
        "#v(16pt)\n#grid(columns: ({},),\n  {},\n)",
        columns,
        cells.join(",\n  ")
    )
}

fn labels_source(grid: &LabelGrid) -> String {
    let cols = vec![format!("{:.2}pt", grid.cell_width); grid.cols].join(", ");
    let rows = vec![format!("{:.2}pt", grid.cell_height); grid.rows].join(", ");

    let cells: Vec<String> = grid
        .cells
        .iter()
        .map(|cell| match cell {
            Some(cell) => {
                let lines: Vec<String> = cell
                    .lines
                    .iter()
                    .map(|l| styled(&l.text, l.role))
                    .collect();
                format!("stack(spacing: 2pt, {})", lines.join(", "))
            }
            None => "[]".to_string(),
        })
        .collect();

    format!(
        "#grid(columns: ({},), rows: ({},), stroke: 0.5pt + rgb(\"{}\"), inset: 3pt,\n  {},\n)",
        cols,
        rows,
        LABEL_BORDER,
        cells.join(",\n  ")
    )
}
