//! TrueType text rendering using fontdue (pure Rust)

use anyhow::{Context, Result, anyhow};
use fontdue::{Font, FontSettings};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::font_discovery;

/// Rendered text as ARGB bitmap
pub struct RenderedText {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>, // ARGB pixels (premultiplied alpha)
}

impl RenderedText {
    fn empty() -> Self {
        Self { width: 0, height: 0, data: Vec::new() }
    }
}

/// One loaded face, rendered at any pixel size
#[derive(Debug)]
pub struct FontRenderer {
    font: Font,
}

impl FontRenderer {
    pub fn from_path(path: &Path) -> Result<Self> {
        let font_data = fs::read(path).with_context(|| format!("Failed to read font file: {}", path.display()))?;
        // .ttc collections: first face
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| anyhow!("Failed to parse font {}: {e}", path.display()))?;

        info!(path = %path.display(), "Loaded font");
        Ok(Self { font })
    }

    /// Load `family` via fontconfig, falling back to any usable system font
    pub fn load(family: &str) -> Result<Self> {
        let path = font_discovery::resolve_font(family)?;
        Self::from_path(&path)
    }

    /// Distance between baselines
    pub fn line_height(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2)
    }

    fn ascent(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|m| m.ascent)
            .unwrap_or(size)
    }

    /// Advance width of `text`
    pub fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.font.metrics(ch, size).advance_width).sum()
    }

    /// Render one line onto a transparent bitmap `line_height` tall
    pub fn render_line(&self, text: &str, size: f32, fg_color: u32) -> RenderedText {
        let width = self.measure_text(text, size).ceil() as usize;
        let height = self.line_height(size).ceil() as usize;
        if text.is_empty() || width == 0 || height == 0 {
            return RenderedText::empty();
        }

        let baseline = self.ascent(size).round() as i32;
        let mut data = vec![0u32; width * height];

        // Foreground is raw ARGB, output is premultiplied
        let fg_a = ((fg_color >> 24) & 0xFF) as f32 / 255.0;
        let fg_r = ((fg_color >> 16) & 0xFF) as f32 / 255.0;
        let fg_g = ((fg_color >> 8) & 0xFF) as f32 / 255.0;
        let fg_b = (fg_color & 0xFF) as f32 / 255.0;

        let mut pen_x = 0.0f32;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size);
            let x_offset = pen_x.round() as i32 + metrics.xmin;
            let top = baseline - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let px = x_offset + gx as i32;
                    let py = top + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        continue;
                    }

                    let coverage = bitmap[gy * metrics.width + gx] as f32 / 255.0;
                    if coverage > 0.0 {
                        let alpha = fg_a * coverage;
                        let a = (alpha * 255.0) as u32;
                        let r = (fg_r * alpha * 255.0) as u32;
                        let g = (fg_g * alpha * 255.0) as u32;
                        let b = (fg_b * alpha * 255.0) as u32;
                        data[py as usize * width + px as usize] = (a << 24) | (r << 16) | (g << 8) | b;
                    }
                }
            }
            pen_x += metrics.advance_width;
        }

        RenderedText { width, height, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_font() -> Option<FontRenderer> {
        FontRenderer::load("DejaVu Sans").ok()
    }

    #[test]
    fn test_measure_grows_with_text() {
        let Some(font) = system_font() else { return };
        let short = font.measure_text("ab", 14.0);
        let long = font.measure_text("abcd", 14.0);
        assert!(long > short);
        assert_eq!(font.measure_text("", 14.0), 0.0);
    }

    #[test]
    fn test_render_line_dimensions() {
        let Some(font) = system_font() else { return };
        let rendered = font.render_line("Hello", 20.0, 0xFF00_0000);
        assert_eq!(rendered.width, font.measure_text("Hello", 20.0).ceil() as usize);
        assert_eq!(rendered.height, font.line_height(20.0).ceil() as usize);
        assert!(rendered.data.iter().any(|&px| px != 0));
    }

    #[test]
    fn test_empty_line_renders_nothing() {
        let Some(font) = system_font() else { return };
        assert_eq!(font.render_line("", 20.0, 0xFF00_0000).width, 0);
    }
}
