//! Page sources: positioned text lines and page rasters
//!
//! Coordinates are PDF points (1/72 inch) with the origin at the top-left
//! corner of the page and `y` growing downwards.
//!
//! # Formats
//!
//! - `.json`: pre-extracted lines, either a single page
//!   `{"width", "height", "lines": [{"text", "bbox": [x0, y0, x1, y1]}]}`
//!   or `{"pages": [...]}`. Rasterizes to a blank white page.
//! - `.pdf`: text layer and rendering through pdfium (`pdf` feature).

#[cfg(feature = "pdf")]
pub mod pdf;

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::highlight::{HighlightError, Result};

/// Axis-aligned box in page points, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Scale every coordinate, e.g. points to pixels with `dpi / 72`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            self.x0 * factor,
            self.y0 * factor,
            self.x1 * factor,
            self.y1 * factor,
        )
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}

impl From<[f32; 4]> for BBox {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// One extracted text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub text: String,
    pub bbox: BBox,
}

/// All lines of one page plus its size in points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub lines: Vec<RawLine>,
}

/// Supplies positioned text lines per page.
pub trait LineSource: Send + Sync {
    fn page_count(&self) -> usize;

    /// Lines of a 0-based page, unfiltered.
    fn extract_lines(&self, page: usize) -> Result<ExtractedPage>;
}

/// Renders a page to pixels.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, page: usize, dpi: f32) -> Result<RgbaImage>;
}

/// A document that can both supply lines and be rasterized.
pub trait PageDocument: LineSource + Rasterizer {}

impl<T: LineSource + Rasterizer> PageDocument for T {}

/// Line filtering applied before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines shorter than this are dropped
    pub min_line_chars: usize,
    /// Fraction of the page height treated as header / footer band
    pub edge_fraction: f32,
    /// Lines in the header/footer band shorter than this are dropped
    pub edge_max_chars: usize,
    /// Pages whose joined text is shorter than this are not scored
    pub min_document_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_chars: 10,
            edge_fraction: 0.1,
            edge_max_chars: 50,
            min_document_chars: 100,
        }
    }
}

/// Drop short lines and short header/footer lines.
///
/// Text is trimmed; a line is in the header/footer band when its top edge
/// lies within `edge_fraction` of the top or bottom of the page.
pub fn filter_lines(page: &ExtractedPage, config: &ExtractionConfig) -> Vec<RawLine> {
    let top = page.height * config.edge_fraction;
    let bottom = page.height * (1.0 - config.edge_fraction);

    page.lines
        .iter()
        .filter_map(|line| {
            let text = line.text.trim();
            let chars = text.chars().count();
            if chars < config.min_line_chars {
                return None;
            }
            let y0 = line.bbox.y0;
            if (y0 < top || y0 > bottom) && chars < config.edge_max_chars {
                return None;
            }
            Some(RawLine {
                text: text.to_string(),
                bbox: line.bbox,
            })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Pages { pages: Vec<ExtractedPage> },
    Single(ExtractedPage),
}

/// Pre-extracted pages loaded from JSON.
#[derive(Debug, Clone)]
pub struct JsonPageSource {
    pages: Vec<ExtractedPage>,
}

impl JsonPageSource {
    pub fn from_pages(pages: Vec<ExtractedPage>) -> Self {
        Self { pages }
    }

    pub fn parse(json: &str) -> Result<Self> {
        let pages = match serde_json::from_str::<JsonDocument>(json)? {
            JsonDocument::Pages { pages } => pages,
            JsonDocument::Single(page) => vec![page],
        };
        Ok(Self { pages })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn page(&self, index: usize) -> Result<&ExtractedPage> {
        self.pages.get(index).ok_or_else(|| {
            HighlightError::InvalidInput(format!(
                "page {} out of range (document has {})",
                index + 1,
                self.pages.len()
            ))
        })
    }
}

impl LineSource for JsonPageSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_lines(&self, page: usize) -> Result<ExtractedPage> {
        self.page(page).cloned()
    }
}

impl Rasterizer for JsonPageSource {
    /// A white canvas of the page's size.
    fn rasterize(&self, page: usize, dpi: f32) -> Result<RgbaImage> {
        let page = self.page(page)?;
        let (width, height) = raster_size(page.width, page.height, dpi)?;
        Ok(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }
}

/// Longest raster side in pixels.
pub const MAX_RASTER_SIDE: u32 = 20_000;
/// Largest raster area in pixels (400 MB as RGBA).
pub const MAX_RASTER_PIXELS: u64 = 100_000_000;

/// Pixel size of a `width` x `height` point page at `dpi`.
///
/// Non-finite or oversized results are rejected before anything is
/// allocated.
pub(crate) fn raster_size(width: f32, height: f32, dpi: f32) -> Result<(u32, u32)> {
    let scale = dpi / 72.0;
    let (w, h) = ((width * scale).round(), (height * scale).round());
    if !w.is_finite() || !h.is_finite() || w > MAX_RASTER_SIDE as f32 || h > MAX_RASTER_SIDE as f32 {
        return Err(HighlightError::InvalidInput(format!(
            "{width}x{height} pt page at {dpi} dpi exceeds the {MAX_RASTER_SIDE} px raster limit"
        )));
    }
    let (w, h) = (w.max(1.0) as u32, h.max(1.0) as u32);
    if u64::from(w) * u64::from(h) > MAX_RASTER_PIXELS {
        return Err(HighlightError::InvalidInput(format!(
            "{w}x{h} px raster exceeds {MAX_RASTER_PIXELS} pixels"
        )));
    }
    Ok((w, h))
}

/// Open a document by extension.
pub fn open(path: &Path) -> Result<Box<dyn PageDocument>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    debug!("Opening {} ({:?})", path.display(), ext);

    match ext.as_deref() {
        Some("json") => Ok(Box::new(JsonPageSource::from_path(path)?)),
        Some("pdf") => open_pdf(path),
        _ => Err(HighlightError::InvalidInput(format!(
            "unsupported input {}; expected .json or .pdf",
            path.display()
        ))),
    }
}

#[cfg(feature = "pdf")]
fn open_pdf(path: &Path) -> Result<Box<dyn PageDocument>> {
    Ok(Box::new(pdf::PdfPageSource::from_path(path)?))
}

#[cfg(not(feature = "pdf"))]
fn open_pdf(path: &Path) -> Result<Box<dyn PageDocument>> {
    Err(HighlightError::MissingDependency(format!(
        "{} is a PDF but pagelight was built without the `pdf` feature",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, y0: f32) -> RawLine {
        RawLine {
            text: text.to_string(),
            bbox: BBox::new(50.0, y0, 500.0, y0 + 12.0),
        }
    }

    #[test]
    fn bbox_serializes_as_array() {
        let json = serde_json::to_string(&BBox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        let b: BBox = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert!((b.width() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bbox_scale_and_union() {
        let b = BBox::new(10.0, 20.0, 30.0, 40.0).scaled(2.0);
        assert_eq!(b, BBox::new(20.0, 40.0, 60.0, 80.0));
        let u = BBox::new(0.0, 5.0, 10.0, 10.0).union(&BBox::new(5.0, 0.0, 20.0, 8.0));
        assert_eq!(u, BBox::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn short_lines_are_dropped() {
        let page = ExtractedPage {
            width: 612.0,
            height: 800.0,
            lines: vec![line("too short", 400.0), line("  long enough text  ", 400.0)],
        };
        let kept = filter_lines(&page, &ExtractionConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "long enough text");
    }

    #[test]
    fn short_header_and_footer_lines_are_dropped() {
        let page = ExtractedPage {
            width: 612.0,
            height: 800.0,
            lines: vec![
                line("Chapter 3 running header", 40.0),
                line("Page 12 of the history notes", 760.0),
                line(
                    "A header-band line that is long enough to be real body content here",
                    40.0,
                ),
                line("Body text in the middle", 400.0),
            ],
        };
        let kept = filter_lines(&page, &ExtractionConfig::default());
        let texts: Vec<_> = kept.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "A header-band line that is long enough to be real body content here",
                "Body text in the middle"
            ]
        );
    }

    #[test]
    fn parse_single_and_multi_page_json() {
        let single = r#"{"width": 612, "height": 792, "lines": [{"text": "hello world!", "bbox": [1, 2, 3, 4]}]}"#;
        let src = JsonPageSource::parse(single).unwrap();
        assert_eq!(src.page_count(), 1);
        assert_eq!(src.extract_lines(0).unwrap().lines.len(), 1);

        let multi = r#"{"pages": [{"width": 612, "height": 792}, {"width": 612, "height": 792, "lines": []}]}"#;
        let src = JsonPageSource::parse(multi).unwrap();
        assert_eq!(src.page_count(), 2);
        assert!(matches!(
            src.extract_lines(5),
            Err(HighlightError::InvalidInput(_))
        ));
    }

    #[test]
    fn json_pages_rasterize_to_white_canvas() {
        let src = JsonPageSource::from_pages(vec![ExtractedPage {
            width: 72.0,
            height: 144.0,
            lines: Vec::new(),
        }]);
        let img = src.rasterize(0, 200.0).unwrap();
        assert_eq!(img.dimensions(), (200, 400));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn oversized_pages_are_not_rasterized() {
        let huge = JsonPageSource::from_pages(vec![ExtractedPage {
            width: 1.0e7,
            height: 1.0e7,
            lines: Vec::new(),
        }]);
        assert!(matches!(
            huge.rasterize(0, 300.0),
            Err(HighlightError::InvalidInput(_))
        ));

        // each side within bounds, area over the limit
        let wide = JsonPageSource::from_pages(vec![ExtractedPage {
            width: 14_000.0,
            height: 14_000.0,
            lines: Vec::new(),
        }]);
        assert!(matches!(
            wide.rasterize(0, 72.0),
            Err(HighlightError::InvalidInput(_))
        ));

        assert!(raster_size(f32::NAN, 792.0, 72.0).is_err());
        assert_eq!(raster_size(612.0, 792.0, 144.0).unwrap(), (1224, 1584));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = open(Path::new("notes.docx")).err().unwrap();
        assert!(matches!(err, HighlightError::InvalidInput(_)));
    }
}
