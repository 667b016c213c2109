use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocumentReference, PdfLayerReference};

use crate::data::model::Dataset;

// US Letter, millimetres.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 7.0;
const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 9.0;

const TITLE: &str = "Gefilterte Daten";

/// Write the view as a paginated PDF table: a title line, a header row, then
/// one row per record with values stringified. Column widths are fixed at
/// printable-width / column-count; a new page starts whenever the next row
/// would leave the printable area.
pub fn write_pdf(view: &Dataset, path: &Path) -> Result<()> {
    let (doc, page, layer) =
        printpdf::PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "table");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("loading builtin font")?;

    let header = view.header();
    let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / header.len() as f32;

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;

    layer_ref.use_text(TITLE, TITLE_SIZE, Mm(MARGIN), Mm(y), &font);
    y -= 1.5 * ROW_HEIGHT;

    draw_row(&layer_ref, &font, &header, col_width, y);
    y -= ROW_HEIGHT;

    for record in &view.records {
        if y < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "table");
            layer_ref = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
        }
        draw_row(&layer_ref, &font, &super::row_values(record), col_width, y);
        y -= ROW_HEIGHT;
    }

    save_document(doc, path)
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    cells: &[String],
    col_width: f32,
    y: f32,
) {
    for (i, cell) in cells.iter().enumerate() {
        layer.use_text(
            cell.as_str(),
            BODY_SIZE,
            Mm(MARGIN + i as f32 * col_width),
            Mm(y),
            font,
        );
    }
}

fn save_document(doc: PdfDocumentReference, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    doc.save(&mut BufWriter::new(file)).context("writing PDF")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn view(rows: usize) -> Dataset {
        let records = (0..rows)
            .map(|i| record(&format!("Athlete {i}"), "DM", 2023, 55.0 + i as f64 * 0.01, &[6.1, 4.2]))
            .collect();
        Dataset::new(vec!["H1".to_string(), "H2".to_string()], records).unwrap()
    }

    #[test]
    fn pdf_export_writes_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_data.pdf");
        write_pdf(&view(3), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_tables_paginate_instead_of_overflowing() {
        // ~35 rows fit on one page at the current row height; 120 must not.
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("short.pdf");
        let many = dir.path().join("long.pdf");
        write_pdf(&view(3), &one).unwrap();
        write_pdf(&view(120), &many).unwrap();

        // Page objects appear once per page in printpdf output.
        let count_pages = |p: &Path| {
            let text = std::fs::read(p).unwrap();
            let pat = b"/Type/Page";
            text.windows(pat.len()).filter(|w| w == pat).count()
        };
        assert!(count_pages(&many) > count_pages(&one));
    }
}
