//! Highlight overlays on page rasters
//!
//! Each scored line's box is scaled from page points to pixels
//! (`dpi / 72`) and filled with a translucent color:
//!
//! | Tier                   | RGBA                 |
//! |------------------------|----------------------|
//! | high                   | `(0, 255, 0, 100)`   |
//! | medium                 | `(255, 255, 0, 80)`  |
//! | low, irrelevant        | `(255, 200, 200, 40)`|
//! | low                    | none                 |

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::highlight::{Result, ScoredLine, Tier};
use crate::source::BBox;

/// Overlay colors and raster resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub dpi: f32,
    pub high: [u8; 4],
    pub medium: [u8; 4],
    /// Tint for low-tier lines flagged irrelevant
    pub irrelevant: [u8; 4],
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            dpi: 200.0,
            high: [0, 255, 0, 100],
            medium: [255, 255, 0, 80],
            irrelevant: [255, 200, 200, 40],
        }
    }
}

impl HighlightStyle {
    /// Overlay color for a line, or `None` for no overlay.
    pub fn color_for(&self, line: &ScoredLine) -> Option<[u8; 4]> {
        match line.tier {
            Tier::High => Some(self.high),
            Tier::Medium => Some(self.medium),
            Tier::Low if line.features.is_irrelevant => Some(self.irrelevant),
            Tier::Low => None,
        }
    }
}

/// Overlays drawn by one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Low lines that received the irrelevance tint
    pub irrelevant_tinted: usize,
    /// High/medium lines carrying proper nouns or topic keywords
    pub vocabulary_high: usize,
    pub vocabulary_medium: usize,
}

/// Draw tier overlays onto `image`, which was rasterized at `style.dpi`.
pub fn render(image: &mut RgbaImage, lines: &[ScoredLine], style: &HighlightStyle) -> RenderSummary {
    let scale = style.dpi / 72.0;
    let mut summary = RenderSummary::default();

    for line in lines {
        let has_vocabulary = line.features.has_proper_nouns || line.features.has_topic_keywords;
        match line.tier {
            Tier::High => {
                summary.high += 1;
                summary.vocabulary_high += usize::from(has_vocabulary);
            }
            Tier::Medium => {
                summary.medium += 1;
                summary.vocabulary_medium += usize::from(has_vocabulary);
            }
            Tier::Low => {
                summary.low += 1;
                summary.irrelevant_tinted += usize::from(line.features.is_irrelevant);
            }
        }

        if let Some(color) = style.color_for(line) {
            fill_rect(image, &line.bbox.scaled(scale), color);
        }
    }

    summary
}

/// Write the image as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Alpha-blend a filled rectangle; edges are inclusive and clipped.
fn fill_rect(image: &mut RgbaImage, rect: &BBox, color: [u8; 4]) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let clamp_x = |v: f32| (v.round().max(0.0) as u32).min(width - 1);
    let clamp_y = |v: f32| (v.round().max(0.0) as u32).min(height - 1);

    if rect.x1 < 0.0 || rect.y1 < 0.0 || rect.x0 >= width as f32 || rect.y0 >= height as f32 {
        return;
    }
    let (x0, x1) = (clamp_x(rect.x0), clamp_x(rect.x1));
    let (y0, y1) = (clamp_y(rect.y0), clamp_y(rect.y1));

    let alpha = u32::from(color[3]);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let px = image.get_pixel_mut(x, y);
            *px = blend(*px, color, alpha);
        }
    }
}

fn blend(dst: Rgba<u8>, src: [u8; 4], alpha: u32) -> Rgba<u8> {
    let mix = |d: u8, s: u8| -> u8 {
        let v = (u32::from(s) * alpha + u32::from(d) * (255 - alpha) + 127) / 255;
        v.min(255) as u8
    };
    Rgba([
        mix(dst[0], src[0]),
        mix(dst[1], src[1]),
        mix(dst[2], src[2]),
        dst[3].max(src[3]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::FeatureSet;

    fn scored(tier: Tier, irrelevant: bool, bbox: BBox) -> ScoredLine {
        ScoredLine {
            text: "line of text".to_string(),
            bbox,
            features: FeatureSet {
                is_irrelevant: irrelevant,
                ..FeatureSet::default()
            },
            similarity_score: 0.0,
            boosted_score: 0.0,
            final_score: 0.0,
            tier,
        }
    }

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn high_lines_are_tinted_green() {
        let mut img = white(20, 20);
        let style = HighlightStyle {
            dpi: 72.0,
            ..HighlightStyle::default()
        };
        let lines = [scored(Tier::High, false, BBox::new(2.0, 2.0, 5.0, 5.0))];
        let summary = render(&mut img, &lines, &style);

        assert_eq!(summary.high, 1);
        let px = img.get_pixel(3, 3);
        // 255 * (155/255) for red/blue, green stays 255
        assert_eq!(px[1], 255);
        assert_eq!(px[0], 155);
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn plain_low_lines_are_not_drawn() {
        let mut img = white(10, 10);
        let lines = [
            scored(Tier::Low, false, BBox::new(0.0, 0.0, 2.0, 2.0)),
            scored(Tier::Low, true, BBox::new(5.0, 5.0, 7.0, 7.0)),
        ];
        let style = HighlightStyle {
            dpi: 72.0,
            ..HighlightStyle::default()
        };
        let summary = render(&mut img, &lines, &style);

        assert_eq!(summary.low, 2);
        assert_eq!(summary.irrelevant_tinted, 1);
        assert_eq!(img.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
        assert_ne!(img.get_pixel(6, 6), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn boxes_scale_with_dpi_and_clip() {
        let mut img = white(100, 100);
        let lines = [scored(Tier::Medium, false, BBox::new(36.0, 36.0, 500.0, 500.0))];
        // 144 dpi doubles coordinates: starts at 72px, clipped at the edge
        let style = HighlightStyle {
            dpi: 144.0,
            ..HighlightStyle::default()
        };
        render(&mut img, &lines, &style);
        assert_eq!(img.get_pixel(71, 71), &Rgba([255, 255, 255, 255]));
        assert_ne!(img.get_pixel(72, 72), &Rgba([255, 255, 255, 255]));
        assert_ne!(img.get_pixel(99, 99), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn boxes_outside_the_image_are_skipped() {
        let mut img = white(10, 10);
        fill_rect(&mut img, &BBox::new(20.0, 20.0, 30.0, 30.0), [0, 0, 0, 255]);
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }
}
