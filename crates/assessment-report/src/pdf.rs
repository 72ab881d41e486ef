//! PDF output.
//!
//! Lays a [`ReportDocument`] out top to bottom on A4 pages, starting a new
//! page whenever the next line or table row does not fit. Fonts are never
//! embedded: the CJK face relies on the viewer's `STSong-Light`, the Latin
//! face on the standard Helvetica.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::document::{Block, ReportDocument, Table};
use crate::locale::Locale;

/// Failures of PDF rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("character {ch:?} cannot be drawn with the {font} font")]
    Unencodable { ch: char, font: &'static str },

    #[error("failed to serialize PDF: {0}")]
    Pdf(String),
}

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.5;
const TABLE_SIZE: f32 = 10.0;
const LEADING: f32 = 1.45;
const CELL_PADDING: f32 = 4.0;

const FONT_KEY: &str = "F1";
const PRODUCER: &str = concat!("assessment-report ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFace {
    /// Helvetica, WinAnsi encoding.
    Latin,
    /// STSong-Light, UCS-2 big-endian encoding.
    Cjk,
}

impl FontFace {
    fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::ZhCn => FontFace::Cjk,
            Locale::En => FontFace::Latin,
        }
    }

    fn name(self) -> &'static str {
        match self {
            FontFace::Latin => "Helvetica",
            FontFace::Cjk => "STSong-Light",
        }
    }

    /// Encode `text` as the byte string shown by `Tj`.
    fn encode(self, text: &str) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let code = ch as u32;
            match self {
                // WinAnsi coincides with Latin-1 on these ranges
                FontFace::Latin
                    if (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code) =>
                {
                    out.push(code as u8);
                }
                FontFace::Cjk if (0x20..=0xffff).contains(&code) => {
                    out.extend_from_slice(&(code as u16).to_be_bytes());
                }
                _ => {
                    return Err(RenderError::Unencodable {
                        ch,
                        font: self.name(),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Approximate advance width of `text` at `size` points.
    fn width(self, text: &str, size: f32) -> f32 {
        let em: f32 = text
            .chars()
            .map(|c| match self {
                FontFace::Cjk if c.is_ascii() => 0.5,
                FontFace::Cjk => 1.0,
                FontFace::Latin => helvetica_width(c),
            })
            .sum();
        em * size
    }

    fn add_font(self, doc: &mut Document) -> ObjectId {
        match self {
            FontFace::Latin => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }),
            FontFace::Cjk => {
                let descriptor = doc.add_object(dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => "STSong-Light",
                    "Flags" => 6,
                    "FontBBox" => vec![(-25).into(), (-254).into(), 1000.into(), 880.into()],
                    "ItalicAngle" => 0,
                    "Ascent" => 880,
                    "Descent" => -120,
                    "CapHeight" => 880,
                    "StemV" => 93,
                });
                let descendant = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "CIDFontType0",
                    "BaseFont" => "STSong-Light",
                    "CIDSystemInfo" => dictionary! {
                        "Registry" => Object::string_literal("Adobe"),
                        "Ordering" => Object::string_literal("GB1"),
                        "Supplement" => 2,
                    },
                    "FontDescriptor" => descriptor,
                    "DW" => 1000,
                    // half-width glyphs for printable ASCII
                    "W" => vec![1.into(), 95.into(), 500.into()],
                });
                doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type0",
                    "BaseFont" => "STSong-Light",
                    "Encoding" => "UniGB-UCS2-H",
                    "DescendantFonts" => vec![descendant.into()],
                })
            }
        }
    }
}

fn helvetica_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' => 0.222,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | 'f' | 't' | '[' | ']' | '|' => 0.278,
        '(' | ')' | '-' | 'r' | '"' => 0.333,
        'm' | 'M' | 'W' | '%' => 0.889,
        'A'..='Z' => 0.667,
        _ => 0.556,
    }
}

/// Split `text` into lines that fit `max_width`. Embedded line breaks start a
/// new line; tabs and stray carriage returns print as spaces.
fn wrap(face: FontFace, text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .flat_map(|line| wrap_line(face, &line.replace(['\t', '\r'], " "), size, max_width))
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Greedy line breaking. Latin text breaks at spaces where possible, CJK text
/// at any character.
fn wrap_line(face: FontFace, text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for ch in text.chars() {
        line.push(ch);
        if face.width(&line, size) <= max_width || line.chars().count() == 1 {
            continue;
        }
        line.pop();
        if ch == ' ' {
            lines.push(std::mem::take(&mut line));
            continue;
        }
        let carry = match line.rfind(' ') {
            Some(at) if face == FontFace::Latin && at > 0 => {
                let rest = line[at + 1..].to_string();
                line.truncate(at);
                rest
            }
            _ => String::new(),
        };
        lines.push(std::mem::take(&mut line));
        line = carry;
        line.push(ch);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Page-by-page accumulation of content operations.
struct Layout {
    face: FontFace,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl Layout {
    fn new(face: FontFace) -> Self {
        Self {
            face,
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Start a new page unless `height` points still fit on this one.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.new_page();
        }
    }

    fn text(&mut self, x: f32, baseline: f32, text: &str, size: f32) -> Result<(), RenderError> {
        let encoded = self.face.encode(text)?;
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_KEY.into(), size.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::String(encoded, StringFormat::Hexadecimal)]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill_gray: Option<f32>) {
        let rect = Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]);
        match fill_gray {
            Some(gray) => self.ops.extend([
                Operation::new("g", vec![gray.into()]),
                rect,
                Operation::new("B", vec![]),
                Operation::new("g", vec![0.into()]),
            ]),
            None => self.ops.extend([rect, Operation::new("S", vec![])]),
        }
    }

    fn lines(&mut self, indent: f32, text: &str, size: f32) -> Result<(), RenderError> {
        let line_height = size * LEADING;
        for line in wrap(self.face, text, size, CONTENT_WIDTH - indent) {
            self.reserve(line_height);
            self.y -= line_height;
            self.text(MARGIN + indent, self.y + size * 0.3, &line, size)?;
        }
        Ok(())
    }

    fn title(&mut self, title: &str) -> Result<(), RenderError> {
        let line_height = TITLE_SIZE * LEADING;
        self.y -= line_height;
        let x = MARGIN + (CONTENT_WIDTH - self.face.width(title, TITLE_SIZE)).max(0.0) / 2.0;
        self.text(x, self.y + TITLE_SIZE * 0.3, title, TITLE_SIZE)?;
        self.y -= 10.0;
        Ok(())
    }

    fn heading(&mut self, text: &str) -> Result<(), RenderError> {
        // keep a heading together with at least one following line
        self.reserve(12.0 + HEADING_SIZE * LEADING + BODY_SIZE * LEADING * 2.0);
        self.y -= 12.0;
        self.lines(0.0, text, HEADING_SIZE)?;
        self.y -= 4.0;
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<(), RenderError> {
        let widths: Vec<f32> = table.widths.iter().map(|w| w * CONTENT_WIDTH).collect();
        let header = self.wrap_cells(&table.header, &widths);
        let header_height = row_height(&header);

        self.reserve(header_height * 2.0);
        self.draw_row(&header, &widths, header_height, true)?;
        for row in &table.rows {
            let cells = self.wrap_cells(row, &widths);
            let height = row_height(&cells);
            if self.y - height < MARGIN {
                self.new_page();
                self.draw_row(&header, &widths, header_height, true)?;
            }
            self.draw_row(&cells, &widths, height, false)?;
        }
        self.y -= 6.0;
        Ok(())
    }

    fn wrap_cells(&self, cells: &[String], widths: &[f32]) -> Vec<Vec<String>> {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| wrap(self.face, cell, TABLE_SIZE, w - 2.0 * CELL_PADDING))
            .collect()
    }

    fn draw_row(
        &mut self,
        cells: &[Vec<String>],
        widths: &[f32],
        height: f32,
        header: bool,
    ) -> Result<(), RenderError> {
        let top = self.y;
        let mut x = MARGIN;
        for (lines, w) in cells.iter().zip(widths) {
            self.rect(x, top - height, *w, height, header.then_some(0.9));
            for (i, line) in lines.iter().enumerate() {
                let baseline =
                    top - CELL_PADDING - (i as f32 + 1.0) * TABLE_SIZE * LEADING + TABLE_SIZE * 0.3;
                self.text(x + CELL_PADDING, baseline, line, TABLE_SIZE)?;
            }
            x += w;
        }
        self.y = top - height;
        Ok(())
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.ops);
        self.pages
    }
}

fn row_height(cells: &[Vec<String>]) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
    lines as f32 * TABLE_SIZE * LEADING + 2.0 * CELL_PADDING
}

/// UTF-16BE with byte order mark, for document information strings.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xfe, 0xff];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Render `report` to PDF bytes.
pub fn write_pdf(report: &ReportDocument) -> Result<Vec<u8>, RenderError> {
    let face = FontFace::for_locale(report.locale);
    let mut layout = Layout::new(face);

    layout.title(&report.title)?;
    for block in &report.blocks {
        match block {
            Block::Heading(text) => layout.heading(text)?,
            Block::Paragraph(text) => layout.lines(0.0, text, BODY_SIZE)?,
            Block::Table(table) => layout.table(table)?,
            Block::Bullets(items) => {
                for item in items {
                    layout.lines(0.0, &format!("- {item}"), BODY_SIZE)?;
                }
            }
        }
    }
    let pages = layout.finish();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = face.add_font(&mut doc);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_KEY => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(&report.title),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    tracing::debug!("rendered {} page(s), {} bytes", count, out.len());
    Ok(out)
}
