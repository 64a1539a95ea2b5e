use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::markdown;
use crate::recipe::Language;
use crate::sections::{classify, Section};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const SIDE_MARGIN_MM: f32 = 10.0;
pub const TOP_MARGIN_MM: f32 = 10.0;
/// Distance from the bottom edge at which a new page is started.
pub const BREAK_MARGIN_MM: f32 = 15.0;
pub const FILE_NAME: &str = "recipe.pdf";
/// Stands in for characters the builtin fonts cannot encode.
pub const REPLACEMENT_CHAR: char = '?';

const PT_TO_MM: f32 = 0.352_778;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStyle {
    /// Every line of the reply, in reading order.
    #[default]
    Plain,
    /// Classified sections with headings.
    Sectioned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Body,
}

impl TextStyle {
    fn font_size(self) -> f32 {
        match self {
            TextStyle::Title => 16.0,
            TextStyle::Heading => 14.0,
            TextStyle::Body => 12.0,
        }
    }

    fn line_height(self) -> f32 {
        match self {
            TextStyle::Title => 12.0,
            TextStyle::Heading | TextStyle::Body => 10.0,
        }
    }

    fn bold(self) -> bool {
        !matches!(self, TextStyle::Body)
    }
}

/// A single wrapped line placed on a page. `y_mm` is the top of the line,
/// measured from the top edge.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: TextStyle,
    pub y_mm: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
    /// Characters swapped for `REPLACEMENT_CHAR`.
    pub replaced_chars: usize,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All placed text in order, one line per entry.
    pub fn text(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.as_str()))
            .collect()
    }
}

/// Places lines top to bottom and starts a new page when the next line
/// would cross the break margin.
struct Composer {
    pages: Vec<Page>,
    y: f32,
    replaced_chars: usize,
}

impl Composer {
    fn new() -> Self {
        Composer {
            pages: vec![Page::default()],
            y: TOP_MARGIN_MM,
            replaced_chars: 0,
        }
    }

    fn write(&mut self, text: &str, style: TextStyle) {
        let width = PAGE_WIDTH_MM - 2.0 * SIDE_MARGIN_MM;
        let (text, replaced) = to_winansi(text);
        self.replaced_chars += replaced;
        for line in wrap(&text, width, style) {
            self.place(line, style);
        }
    }

    fn place(&mut self, text: String, style: TextStyle) {
        if self.y + style.line_height() > PAGE_HEIGHT_MM - BREAK_MARGIN_MM {
            self.pages.push(Page::default());
            self.y = TOP_MARGIN_MM;
        }
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                text,
                style,
                y_mm: self.y,
            });
        }
        self.y += style.line_height();
    }

    fn gap(&mut self, mm: f32) {
        self.y += mm;
    }

    fn finish(self) -> DocumentLayout {
        DocumentLayout {
            pages: self.pages,
            replaced_chars: self.replaced_chars,
        }
    }
}

pub fn layout(text: &str, style: ExportStyle, language: Language) -> DocumentLayout {
    let mut composer = Composer::new();

    match style {
        ExportStyle::Plain => {
            for line in text.split('\n') {
                composer.write(line.trim_end(), TextStyle::Body);
            }
        }
        ExportStyle::Sectioned => {
            let sections = classify(text, language);
            for line in sections.title.lines() {
                composer.write(markdown::strip_line(line).trim(), TextStyle::Title);
            }

            let labels = language.section_labels();
            let bodies = [Section::Ingredients, Section::Instructions, Section::SideDishes];
            for (label, section) in labels.iter().zip(bodies) {
                let body = sections.get(section);
                if body.is_empty() {
                    continue;
                }
                composer.gap(4.0);
                composer.write(label, TextStyle::Heading);
                for line in body.lines() {
                    composer.write(line, TextStyle::Body);
                }
            }
        }
    }

    composer.finish()
}

/// Greedy word wrap against Helvetica advance widths. A word that does not
/// fit on a line of its own is split by characters.
fn wrap(text: &str, width_mm: f32, style: TextStyle) -> Vec<String> {
    let measure = |s: &str| text_width_mm(s, style);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure(&candidate) <= width_mm {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure(word) <= width_mm {
            current = word.to_string();
            continue;
        }

        for ch in word.chars() {
            current.push(ch);
            if measure(&current) > width_mm {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// The builtin Helvetica only encodes WinAnsi. A few common symbols are
/// spelled out; zero-width joiners and variation selectors are dropped;
/// anything else becomes `REPLACEMENT_CHAR` and is counted.
fn to_winansi(text: &str) -> (String, usize) {
    const WINANSI_EXTRA: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

    let mut out = String::with_capacity(text.len());
    let mut replaced = 0;
    for c in text.chars() {
        match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => out.push(c),
            c if WINANSI_EXTRA.contains(c) => out.push(c),
            '\t' => out.push(' '),
            '→' => out.push_str("->"),
            '←' => out.push_str("<-"),
            '⅓' => out.push_str("1/3"),
            '⅔' => out.push_str("2/3"),
            '⅛' => out.push_str("1/8"),
            '\u{200d}' | '\u{fe0e}' | '\u{fe0f}' => {}
            _ => {
                out.push(REPLACEMENT_CHAR);
                replaced += 1;
            }
        }
    }
    (out, replaced)
}

fn text_width_mm(text: &str, style: TextStyle) -> f32 {
    let units: u32 = text.chars().map(helvetica_width).sum();
    let scale = if style.bold() { 1.06 } else { 1.0 };
    units as f32 / 1000.0 * style.font_size() * PT_TO_MM * scale
}

/// Helvetica advance widths in 1/1000 em for printable ASCII.
fn helvetica_width(c: char) -> u32 {
    const WIDTHS: [u32; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        278, 278, 278, 469, 556, 333, // '['..'`'
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
        334, 260, 334, 584, // '{'..'~'
    ];
    match c as u32 {
        code @ 32..=126 => WIDTHS[(code - 32) as usize],
        _ => 556,
    }
}

/// Result of one export; the temporary file is gone by the time this is
/// returned.
#[derive(Clone, Debug)]
pub struct ExportedDocument {
    pub file_name: &'static str,
    pub page_count: usize,
    pub replaced_chars: usize,
    pub bytes: Vec<u8>,
}

/// Renders `text` to a PDF written to a fresh temporary file inside `dir`,
/// so concurrent exports never share a path.
pub fn export_pdf(
    text: &str,
    style: ExportStyle,
    language: Language,
    dir: &Path,
) -> Result<ExportedDocument> {
    let layout = layout(text, style, language);
    let page_count = layout.page_count();
    if layout.replaced_chars > 0 {
        warn!(
            replaced = layout.replaced_chars,
            "recipe contains characters the PDF font cannot encode; replaced with '{}'",
            REPLACEMENT_CHAR
        );
    }

    let mut file = tempfile::Builder::new()
        .prefix("recipe-")
        .suffix(".pdf")
        .tempfile_in(dir)?;
    debug!(path = %file.path().display(), pages = page_count, "writing recipe document");

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        render(&layout)?.save(&mut writer)?;
        writer.flush()?;
    }

    let bytes = fs::read(file.path())?;
    file.close()?;

    Ok(ExportedDocument {
        file_name: FILE_NAME,
        page_count,
        replaced_chars: layout.replaced_chars,
        bytes,
    })
}

fn render(layout: &DocumentLayout) -> Result<printpdf::PdfDocumentReference> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Recipe", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            if line.text.is_empty() {
                continue;
            }
            let font: &IndirectFontRef = if line.style.bold() { &bold } else { &regular };
            let size = line.style.font_size();
            // Baseline sits in the middle of the line box.
            let baseline = line.y_mm + line.style.line_height() / 2.0 + 0.3 * size * PT_TO_MM;
            layer.use_text(
                line.text.as_str(),
                size,
                Mm(SIDE_MARGIN_MM),
                Mm(PAGE_HEIGHT_MM - baseline),
                font,
            );
        }
    }

    Ok(doc)
}
