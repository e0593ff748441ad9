// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test-page PDF generation.
//
// Builds a one-page A4 PDF with `printpdf` 0.8 (data-oriented API: pages
// are `Vec<Op>` operation lists serialized via `PdfDocument::save`), so a
// `testpage` run exercises the full render-and-deliver path without the
// user supplying a document.

use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};

use jetspool_core::error::Result;

const PAGE_W_MM: f32 = 210.0;
const PAGE_H_MM: f32 = 297.0;

/// Render the test page as PDF bytes.
pub fn test_page_pdf() -> Vec<u8> {
    let lines = [
        "JETSPOOL TEST PAGE",
        "",
        "If you can read this, the dispatch path",
        "from renderer to printer is working.",
        "",
        "RAW 9100 / PCL XL (pxlmono, 600 dpi)",
    ];

    let font_size_pt: f32 = 14.0;
    let line_height_pt: f32 = 20.0;
    let margin_pt: f32 = Mm(25.0).into_pt().0;
    let page_h_pt: f32 = Mm(PAGE_H_MM).into_pt().0;

    let mut ops: Vec<Op> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y_pt = page_h_pt - margin_pt - (i as f32 * line_height_pt);
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(margin_pt),
                y: Pt(y_pt),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(font_size_pt),
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text((*line).to_string())],
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::EndTextSection);
    }

    let mut doc = PdfDocument::new("Jetspool Test Page");
    doc.with_pages(vec![PdfPage::new(Mm(PAGE_W_MM), Mm(PAGE_H_MM), ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    doc.save(&PdfSaveOptions::default(), &mut warnings)
}

/// Write the test page into `dir` and return its path.
pub fn write_test_page(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("jetspool-testpage.pdf");
    std::fs::write(&path, test_page_pdf())?;
    Ok(path)
}
