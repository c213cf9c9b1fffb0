//! A4 tabular PDF rendering with `printpdf`.

use crate::export::{ReportDocument, ReportRow};
use crate::format::{date_dmy, rupiah};
use crate::Result;
use anyhow::anyhow;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use std::ops::Range;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TOP: f32 = PAGE_HEIGHT - 20.0;
const BOTTOM: f32 = 20.0;
const ROW_HEIGHT: f32 = 6.5;
/// Height taken by the title block on the first page.
const HEADER_BLOCK: f32 = 44.0;

/// Column x positions and the number of characters that fit in each.
const COLUMNS: [(&str, f32, usize); 5] = [
    ("Tanggal", MARGIN, 10),
    ("Nama", MARGIN + 24.0, 30),
    ("Kategori", MARGIN + 82.0, 22),
    ("Jenis", MARGIN + 126.0, 12),
    ("Jumlah", MARGIN + 150.0, 18),
];

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

pub(super) fn render(doc: &ReportDocument) -> Result<Vec<u8>> {
    let (pdf, page, layer) = PdfDocument::new(
        doc.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Halaman 1",
    );
    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Unable to load the PDF font: {e}"))?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Unable to load the PDF font: {e}"))?,
    };

    let pages = paginate(doc.rows.len(), rows_per_page(TOP - HEADER_BLOCK), rows_per_page(TOP));
    let mut layer = pdf.get_page(page).get_layer(layer);
    let mut y = title_block(&layer, &fonts, doc);
    for (i, rows) in pages.iter().enumerate() {
        if i > 0 {
            layer = new_page(&pdf, i + 1);
            y = TOP;
        }
        y = table_header(&layer, &fonts, y);
        for row in &doc.rows[rows.clone()] {
            table_row(&layer, &fonts, y, row);
            y -= ROW_HEIGHT;
        }
        footer(&layer, &fonts, i + 1, pages.len());
    }
    if doc.rows.is_empty() {
        layer.use_text(
            "Tidak ada transaksi pada periode ini",
            10.0,
            Mm(MARGIN),
            Mm(y - ROW_HEIGHT),
            &fonts.regular,
        );
    }

    pdf.save_to_bytes()
        .map_err(|e| anyhow!("Unable to produce the PDF: {e}"))
}

/// Splits `rows` into page ranges: `first` rows fit on the first page and `rest` on every
/// following page. There is always at least one page.
fn paginate(rows: usize, first: usize, rest: usize) -> Vec<Range<usize>> {
    let first = first.max(1);
    let rest = rest.max(1);
    let mut pages = vec![0..rows.min(first)];
    let mut start = first;
    while start < rows {
        let end = (start + rest).min(rows);
        pages.push(start..end);
        start = end;
    }
    pages
}

/// How many table rows fit below a header row drawn at `from`.
fn rows_per_page(from: f32) -> usize {
    ((from - ROW_HEIGHT - BOTTOM) / ROW_HEIGHT).floor().max(1.0) as usize
}

fn new_page(pdf: &PdfDocumentReference, number: usize) -> PdfLayerReference {
    let (page, layer) = pdf.add_page(
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        format!("Halaman {number}"),
    );
    pdf.get_page(page).get_layer(layer)
}

/// Draws the title, business name, period and totals. Returns the y position below them.
fn title_block(layer: &PdfLayerReference, fonts: &Fonts, doc: &ReportDocument) -> f32 {
    let mut y = TOP;
    layer.use_text(doc.title.as_str(), 18.0, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= 7.0;
    if let Some(subtitle) = &doc.subtitle {
        layer.use_text(subtitle.as_str(), 12.0, Mm(MARGIN), Mm(y), &fonts.regular);
        y -= 6.0;
    }
    layer.use_text(doc.period_line(), 10.0, Mm(MARGIN), Mm(y), &fonts.regular);
    y -= 8.0;
    for (label, value) in &doc.summary {
        layer.use_text(label.as_str(), 10.0, Mm(MARGIN), Mm(y), &fonts.regular);
        layer.use_text(value.as_str(), 10.0, Mm(MARGIN + 45.0), Mm(y), &fonts.bold);
        y -= 5.5;
    }
    TOP - HEADER_BLOCK
}

/// Draws the column headings with a rule under them. Returns the y of the first row.
fn table_header(layer: &PdfLayerReference, fonts: &Fonts, y: f32) -> f32 {
    for (name, x, _) in COLUMNS {
        layer.use_text(name, 10.0, Mm(x), Mm(y), &fonts.bold);
    }
    rule(layer, y - 2.0, 0.6);
    y - ROW_HEIGHT
}

fn table_row(layer: &PdfLayerReference, fonts: &Fonts, y: f32, row: &ReportRow) {
    let cells = [
        date_dmy(row.date),
        row.name.clone(),
        row.category.clone(),
        row.kind.label().to_string(),
        rupiah(row.amount.value()),
    ];
    for ((_, x, width), cell) in COLUMNS.iter().zip(cells) {
        layer.use_text(clip(&cell, *width), 9.0, Mm(*x), Mm(y), &fonts.regular);
    }
    rule(layer, y - 2.0, 0.2);
}

fn footer(layer: &PdfLayerReference, fonts: &Fonts, page: usize, pages: usize) {
    layer.use_text(
        format!("Halaman {page} dari {pages}"),
        8.0,
        Mm(PAGE_WIDTH - MARGIN - 25.0),
        Mm(BOTTOM - 8.0),
        &fonts.regular,
    );
}

/// A horizontal line across the table at `y`.
fn rule(layer: &PdfLayerReference, y: f32, thickness: f32) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Shortens `s` to at most `width` characters, marking the cut with `...`.
fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_document;

    #[test]
    fn test_paginate() {
        assert_eq!(paginate(0, 10, 20), vec![0..0]);
        assert_eq!(paginate(10, 10, 20), vec![0..10]);
        assert_eq!(paginate(11, 10, 20), vec![0..10, 10..11]);
        assert_eq!(paginate(55, 10, 20), vec![0..10, 10..30, 30..50, 50..55]);
    }

    #[test]
    fn test_rows_per_page() {
        assert!(rows_per_page(TOP) > rows_per_page(TOP - HEADER_BLOCK));
        assert_eq!(rows_per_page(BOTTOM), 1);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("Listrik", 10), "Listrik");
        assert_eq!(clip("Pembelian Kebutuhan Dapur", 10), "Pembela...");
    }

    #[test]
    fn test_render_pdf() {
        let bytes = render(&sample_document()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_many_pages() {
        let mut doc = sample_document();
        let row = doc.rows[0].clone();
        doc.rows = vec![row; 120];
        let bytes = render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
