//! Shared helpers: build small, well-formed PDFs with lopdf so the tests
//! never depend on binary fixtures.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// A page description: text lines plus optional ruling-line geometry.
pub struct PageSpec<'a> {
    pub lines: &'a [&'a str],
    /// Horizontal rulings as (y, x0, x1).
    pub h_rules: &'a [(i64, i64, i64)],
    /// Vertical rulings as (x, y0, y1).
    pub v_rules: &'a [(i64, i64, i64)],
}

impl<'a> PageSpec<'a> {
    pub fn text_only(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            h_rules: &[],
            v_rules: &[],
        }
    }
}

/// Assemble a one-or-more-page PDF and return its bytes.
pub fn build_pdf(pages: &[PageSpec<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();

        for &(y, x0, x1) in page.h_rules {
            operations.push(Operation::new("m", vec![x0.into(), y.into()]));
            operations.push(Operation::new("l", vec![x1.into(), y.into()]));
            operations.push(Operation::new("S", vec![]));
        }
        for &(x, y0, y1) in page.v_rules {
            operations.push(Operation::new("m", vec![x.into(), y0.into()]));
            operations.push(Operation::new("l", vec![x.into(), y1.into()]));
            operations.push(Operation::new("S", vec![]));
        }

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
        operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
        for line in page.lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
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
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Write a PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageSpec<'_>]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).expect("write pdf");
    path
}

/// A whitespace-aligned 3×3 table (header + two data rows), no rulings.
pub fn stream_table_pdf(dir: &Path, name: &str) -> PathBuf {
    write_pdf(
        dir,
        name,
        &[PageSpec::text_only(&[
            "Nombre  Ciudad  Nota",
            "Alice  Madrid  sobresaliente",
            "Bob  Sevilla  aprobado",
        ])],
    )
}

/// The same table bounded by a drawn 4×4 ruling grid.
pub fn ruled_table_pdf(dir: &Path, name: &str) -> PathBuf {
    write_pdf(
        dir,
        name,
        &[PageSpec {
            lines: &["Nombre  Ciudad  Nota", "Alice  Madrid  diez", "Bob  Sevilla  siete"],
            h_rules: &[
                (730, 70, 430),
                (716, 70, 430),
                (702, 70, 430),
                (688, 70, 430),
            ],
            v_rules: &[
                (70, 688, 730),
                (190, 688, 730),
                (310, 688, 730),
                (430, 688, 730),
            ],
        }],
    )
}

/// Prose only: nothing in here should ever count as a table.
pub fn prose_pdf(dir: &Path, name: &str) -> PathBuf {
    write_pdf(
        dir,
        name,
        &[PageSpec::text_only(&[
            "Informe trimestral de actividad.",
            "Los ingresos crecieron de forma moderada.",
            "No se registraron incidencias relevantes.",
        ])],
    )
}
