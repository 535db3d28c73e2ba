//! Page reading: text layer and ruling-line geometry from a PDF.
//!
//! ## Why two text candidates?
//!
//! `pdf-extract` reconstructs inter-word spacing from glyph positions, which
//! is excellent for prose but tends to collapse the wide gaps between table
//! columns into single spaces. Walking the content stream ourselves preserves
//! the literal string segments (and therefore the column gaps), but misses
//! glyph-level positioning on exotic producers. Each page keeps whichever
//! candidate scores better on a tabular-ness heuristic.
//!
//! Geometry comes from the same content-stream walk: stroked or filled path
//! segments and rectangles become the horizontal/vertical rulings that
//! lattice mode later clusters into cell grids.

use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::{debug, warn};

use crate::config::TextEncoding;
use crate::error::ConvertError;
use crate::extract::table::split_cells;

/// Segments thinner than this count as rulings rather than boxes, and
/// coordinate jitter below it is ignored when classifying direction.
const RULING_TOLERANCE: f64 = 1.5;

/// Rulings shorter than this are decoration (tick marks, underlines of a
/// single word), not table structure.
const MIN_RULING_LEN: f64 = 8.0;

/// A horizontal or vertical ruling in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ruling {
    /// The fixed coordinate: y for horizontal rulings, x for vertical ones.
    pub pos: f64,
    /// Start of the span along the other axis.
    pub start: f64,
    /// End of the span along the other axis.
    pub end: f64,
}

/// Everything the detectors need from one page.
#[derive(Debug, Clone)]
pub(crate) struct PageContent {
    /// 1-indexed page number.
    pub number: u32,
    /// Text layer, one extracted line per text row.
    pub text: String,
    pub horizontal: Vec<Ruling>,
    pub vertical: Vec<Ruling>,
}

/// Read every page of a PDF: text layer plus ruling geometry.
pub(crate) fn read_pages(
    path: &Path,
    encoding: TextEncoding,
) -> Result<Vec<PageContent>, ConvertError> {
    let document = Document::load(path).map_err(|source| ConvertError::PdfParse {
        path: path.to_path_buf(),
        source,
    })?;
    let page_map = document.get_pages();

    // Whole-document extraction, split back into pages on form feeds. Only
    // usable when the page counts agree.
    let extracted_pages = match pdf_extract::extract_text(path) {
        Ok(text) => {
            let pages = split_form_feed_pages(&text);
            if pages.len() == page_map.len() {
                Some(pages)
            } else {
                debug!(
                    expected = page_map.len(),
                    got = pages.len(),
                    "pdf-extract page count mismatch, using content-stream text only"
                );
                None
            }
        }
        Err(err) => {
            warn!("pdf-extract failed on '{}': {err}", path.display());
            None
        }
    };

    let mut pages = Vec::with_capacity(page_map.len());
    for (index, (number, page_id)) in page_map.iter().enumerate() {
        let walked = walk_page(&document, *page_id, encoding);

        let positional = extracted_pages
            .as_ref()
            .and_then(|p| p.get(index))
            .map(String::as_str)
            .unwrap_or("");
        let text = if tabular_score(&walked.text) >= tabular_score(positional) {
            walked.text
        } else {
            positional.to_string()
        };

        pages.push(PageContent {
            number: *number,
            text,
            horizontal: walked.horizontal,
            vertical: walked.vertical,
        });
    }

    Ok(pages)
}

fn split_form_feed_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw.split('\u{000C}').map(str::to_string).collect();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

/// Lines that split into several cells are worth far more than prose lines;
/// replacement characters disqualify a candidate quickly.
fn tabular_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut score = 0_i64;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        score += 1;
        if split_cells(line).len() >= 2 {
            score += 40;
        }
    }
    score - 200 * text.matches('\u{FFFD}').count() as i64
}

// ── Content-stream walk ──────────────────────────────────────────────────

struct WalkedPage {
    text: String,
    horizontal: Vec<Ruling>,
    vertical: Vec<Ruling>,
}

/// One pass over the page's operations, collecting text lines and painted
/// path segments together.
fn walk_page(document: &Document, page_id: lopdf::ObjectId, encoding: TextEncoding) -> WalkedPage {
    let mut out = WalkedPage {
        text: String::new(),
        horizontal: Vec::new(),
        vertical: Vec::new(),
    };

    let Ok(raw) = document.get_page_content(page_id) else {
        return out;
    };
    let Ok(content) = Content::decode(&raw) else {
        return out;
    };

    let font_encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines: Vec<String> = Vec::new();
    let mut current_line = String::new();
    let mut current_encoding: Option<&str> = None;

    // Path state: segments are provisional until a painting operator keeps
    // them; `n` (clip, no paint) discards.
    let mut point: Option<(f64, f64)> = None;
    let mut pending: Vec<((f64, f64), (f64, f64))> = Vec::new();

    for op in content.operations {
        match op.operator.as_str() {
            // ── Text ──────────────────────────────────────────────────────
            "Tf" => {
                if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                    current_encoding = font_encodings.get(name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current_line, current_encoding, &op.operands, encoding);
            }
            "Td" | "TD" | "T*" | "ET" => {
                if !current_line.trim().is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                } else {
                    current_line.clear();
                }
            }
            // ── Paths ─────────────────────────────────────────────────────
            "m" => {
                point = operand_pair(&op.operands);
            }
            "l" => {
                if let (Some(from), Some(to)) = (point, operand_pair(&op.operands)) {
                    pending.push((from, to));
                    point = Some(to);
                }
            }
            "re" => {
                if let Some([x, y, w, h]) = operand_quad(&op.operands) {
                    push_rect_edges(&mut pending, x, y, w, h);
                }
            }
            "S" | "s" | "B" | "B*" | "b" | "b*" | "f" | "F" | "f*" => {
                for (from, to) in pending.drain(..) {
                    classify_segment(from, to, &mut out.horizontal, &mut out.vertical);
                }
                point = None;
            }
            "n" => {
                pending.clear();
                point = None;
            }
            _ => {}
        }
    }

    if !current_line.trim().is_empty() {
        lines.push(current_line);
    }

    out.text = lines.join("\n");
    out
}

fn collect_text(
    line: &mut String,
    font_encoding: Option<&str>,
    operands: &[Object],
    fallback: TextEncoding,
) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                line.push_str(&decode_string(font_encoding, bytes, fallback));
            }
            Object::Array(items) => {
                collect_text(line, font_encoding, items, fallback);
            }
            // Large negative TJ adjustments are the producer's way of
            // spelling a column gap.
            Object::Integer(v) if *v < -100 => line.push_str("  "),
            Object::Real(v) if *v < -100.0 => line.push_str("  "),
            _ => {}
        }
    }
}

/// Decode one PDF string. `Document::decode_text` handles the font's declared
/// encoding; bytes that come back mangled fall through to the configured
/// single-byte shim.
fn decode_string(font_encoding: Option<&str>, bytes: &[u8], fallback: TextEncoding) -> String {
    let decoded = Document::decode_text(font_encoding, bytes);
    if !decoded.contains('\u{FFFD}') {
        return decoded;
    }

    match fallback {
        TextEncoding::Windows1252 => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
        TextEncoding::Utf8 => decoded,
    }
}

fn operand_number(operand: &Object) -> Option<f64> {
    match operand {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn operand_pair(operands: &[Object]) -> Option<(f64, f64)> {
    match operands {
        [x, y] => Some((operand_number(x)?, operand_number(y)?)),
        _ => None,
    }
}

fn operand_quad(operands: &[Object]) -> Option<[f64; 4]> {
    match operands {
        [a, b, c, d] => Some([
            operand_number(a)?,
            operand_number(b)?,
            operand_number(c)?,
            operand_number(d)?,
        ]),
        _ => None,
    }
}

/// A thin rectangle is a single ruling; anything else contributes its four
/// border edges, the way cell boxes do in ruled tables.
fn push_rect_edges(pending: &mut Vec<((f64, f64), (f64, f64))>, x: f64, y: f64, w: f64, h: f64) {
    if h.abs() <= RULING_TOLERANCE {
        pending.push(((x, y), (x + w, y)));
    } else if w.abs() <= RULING_TOLERANCE {
        pending.push(((x, y), (x, y + h)));
    } else {
        pending.push(((x, y), (x + w, y)));
        pending.push(((x, y + h), (x + w, y + h)));
        pending.push(((x, y), (x, y + h)));
        pending.push(((x + w, y), (x + w, y + h)));
    }
}

fn classify_segment(
    from: (f64, f64),
    to: (f64, f64),
    horizontal: &mut Vec<Ruling>,
    vertical: &mut Vec<Ruling>,
) {
    let (x0, y0) = from;
    let (x1, y1) = to;

    if (y0 - y1).abs() <= RULING_TOLERANCE && (x0 - x1).abs() >= MIN_RULING_LEN {
        horizontal.push(Ruling {
            pos: (y0 + y1) / 2.0,
            start: x0.min(x1),
            end: x0.max(x1),
        });
    } else if (x0 - x1).abs() <= RULING_TOLERANCE && (y0 - y1).abs() >= MIN_RULING_LEN {
        vertical.push(Ruling {
            pos: (x0 + x1) / 2.0,
            start: y0.min(y1),
            end: y0.max(y1),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_split_drops_trailing_empty_page() {
        assert_eq!(split_form_feed_pages("p1\u{000C}p2\u{000C}"), vec!["p1", "p2"]);
    }

    #[test]
    fn tabular_score_prefers_multi_cell_lines() {
        let tabular = "Name  Age\nAlice  30";
        let prose = "Name Age\nAlice 30";
        assert!(tabular_score(tabular) > tabular_score(prose));
    }

    #[test]
    fn tabular_score_punishes_replacement_chars() {
        assert!(tabular_score("a  b\nc  d") > tabular_score("a  b\nc\u{FFFD}  d"));
    }

    #[test]
    fn windows1252_fallback_recovers_accented_bytes() {
        // "Año" in CP-1252; 0xF1 is not valid UTF-8 on its own.
        let bytes = [b'A', 0xF1, b'o'];
        let decoded = decode_string(None, &bytes, TextEncoding::Windows1252);
        assert_eq!(decoded, "Año");
    }

    #[test]
    fn thin_rect_becomes_single_horizontal_ruling() {
        let mut pending = Vec::new();
        push_rect_edges(&mut pending, 10.0, 700.0, 200.0, 0.5);
        assert_eq!(pending.len(), 1);

        let (mut h, mut v) = (Vec::new(), Vec::new());
        for (from, to) in pending {
            classify_segment(from, to, &mut h, &mut v);
        }
        assert_eq!(h.len(), 1);
        assert!(v.is_empty());
        assert!((h[0].end - h[0].start - 200.0).abs() < 0.01);
    }

    #[test]
    fn full_rect_contributes_four_edges() {
        let mut pending = Vec::new();
        push_rect_edges(&mut pending, 0.0, 0.0, 100.0, 50.0);
        let (mut h, mut v) = (Vec::new(), Vec::new());
        for (from, to) in pending {
            classify_segment(from, to, &mut h, &mut v);
        }
        assert_eq!(h.len(), 2);
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn short_segments_are_ignored() {
        let (mut h, mut v) = (Vec::new(), Vec::new());
        classify_segment((0.0, 0.0), (4.0, 0.0), &mut h, &mut v);
        assert!(h.is_empty() && v.is_empty());
    }
}
