//! PDF pages through pdfium
//!
//! Characters are read with their tight bounds, grouped into lines by
//! baseline proximity and spaced at horizontal gaps. Bounds are flipped
//! from pdfium's bottom-up space into top-left page coordinates.

use std::path::Path;

use image::RgbaImage;
use pdfium_render::prelude::*;

use super::{BBox, ExtractedPage, LineSource, Rasterizer, RawLine};
use crate::highlight::{HighlightError, Result};

/// A positioned character, top-left coordinates.
#[derive(Debug, Clone)]
struct PdfChar {
    ch: char,
    bbox: BBox,
    /// Baseline in pdfium's bottom-up space, used for line grouping
    baseline: f32,
}

/// PDF document held in memory.
pub struct PdfPageSource {
    bytes: Vec<u8>,
    page_count: usize,
}

fn pdf_err(e: PdfiumError) -> HighlightError {
    HighlightError::Pdf(e.to_string())
}

impl PdfPageSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let pdfium = Pdfium::default();
        let page_count = {
            let doc = pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .map_err(pdf_err)?;
            doc.pages().len() as usize
        };
        Ok(Self { bytes, page_count })
    }

    fn page_index(&self, page: usize) -> Result<u16> {
        if page >= self.page_count {
            return Err(HighlightError::InvalidInput(format!(
                "page {} out of range (document has {})",
                page + 1,
                self.page_count
            )));
        }
        u16::try_from(page).map_err(|_| HighlightError::InvalidInput(format!("page {page} too large")))
    }

    #[allow(deprecated)] // PdfRect field access deprecated in 0.8.28
    fn extract_chars(page: &PdfPage, height: f32) -> Result<Vec<PdfChar>> {
        let text = page.text().map_err(pdf_err)?;
        let mut chars = Vec::new();
        for ch in text.chars().iter() {
            if let (Some(c), Ok(rect)) = (ch.unicode_char(), ch.tight_bounds()) {
                chars.push(PdfChar {
                    ch: c,
                    bbox: BBox::new(
                        rect.left.value,
                        height - rect.top.value,
                        rect.right.value,
                        height - rect.bottom.value,
                    ),
                    baseline: rect.bottom.value,
                });
            }
        }
        Ok(chars)
    }
}

/// Group characters into lines, top to bottom.
fn reconstruct_lines(chars: &[PdfChar]) -> Vec<RawLine> {
    let Some(first) = chars.first() else {
        return Vec::new();
    };

    let mut sorted = chars.to_vec();
    sorted.sort_by(|a, b| {
        b.baseline
            .total_cmp(&a.baseline)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let tolerance = first.bbox.height().max(1.0) * 0.4;
    let mut lines = Vec::new();
    let mut current: Vec<PdfChar> = Vec::new();

    for ch in sorted {
        let same_line = current
            .last()
            .is_some_and(|last| (ch.baseline - last.baseline).abs() < tolerance);
        if !same_line && !current.is_empty() {
            lines.push(build_line(&current));
            current.clear();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        lines.push(build_line(&current));
    }

    lines.retain(|l| !l.text.trim().is_empty());
    lines
}

fn build_line(chars: &[PdfChar]) -> RawLine {
    let avg_width = chars.iter().map(|c| c.bbox.width()).sum::<f32>() / chars.len() as f32;
    let space_threshold = avg_width * 0.3;

    let mut text = String::new();
    let mut bbox = chars[0].bbox;
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 {
            let gap = ch.bbox.x0 - chars[i - 1].bbox.x1;
            if gap > space_threshold && !ch.ch.is_whitespace() {
                text.push(' ');
            }
        }
        text.push(ch.ch);
        bbox = bbox.union(&ch.bbox);
    }

    RawLine {
        text: text.split_whitespace().collect::<Vec<_>>().join(" "),
        bbox,
    }
}

impl LineSource for PdfPageSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn extract_lines(&self, page: usize) -> Result<ExtractedPage> {
        let index = self.page_index(page)?;
        let pdfium = Pdfium::default();
        let doc = pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(pdf_err)?;
        let pdf_page = doc.pages().get(index).map_err(pdf_err)?;

        let width = pdf_page.width().value;
        let height = pdf_page.height().value;
        let chars = Self::extract_chars(&pdf_page, height)?;

        Ok(ExtractedPage {
            width,
            height,
            lines: reconstruct_lines(&chars),
        })
    }
}

impl Rasterizer for PdfPageSource {
    fn rasterize(&self, page: usize, dpi: f32) -> Result<RgbaImage> {
        let index = self.page_index(page)?;
        let pdfium = Pdfium::default();
        let doc = pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(pdf_err)?;
        let pdf_page = doc.pages().get(index).map_err(pdf_err)?;

        let (target_width, _) =
            super::raster_size(pdf_page.width().value, pdf_page.height().value, dpi)?;
        let bitmap = pdf_page
            .render_with_config(
                &PdfRenderConfig::new().set_target_width(target_width.try_into().unwrap_or(i32::MAX)),
            )
            .map_err(pdf_err)?;

        let rendered = bitmap.as_image().to_rgba8();
        let (w, h) = (rendered.width(), rendered.height());
        RgbaImage::from_raw(w, h, rendered.into_raw())
            .ok_or_else(|| HighlightError::Pdf("rendered bitmap has unexpected size".to_string()))
    }
}
