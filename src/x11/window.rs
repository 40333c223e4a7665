//! Override-redirect X11 window that paints flattened markup with RENDER

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use x11rb::connection::Connection;
use x11rb::protocol::render::{self, ConnectionExt as RenderExt, CreatePictureAux, PictOp, Picture};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as WrapperExt;

use super::X11Desktop;
use crate::constants::{widget, x11};
use crate::font::FontRenderer;
use crate::markup::{self, Markup, TextLine};
use crate::style::WidgetStyle;
use crate::types::{Dimensions, Position};
use crate::window::{FloatingWindow, PlacedText, WindowId};

pub struct X11FloatingWindow<'a> {
    conn: &'a RustConnection,
    font: &'a FontRenderer,
    opacity_atom: Atom,
    argb_format: render::Pictformat,

    window: Window,
    picture: Picture,

    position: Position,
    dimensions: Dimensions,
    visible: bool,
    /// Set once `set_opacity` was called; otherwise the background alpha is used
    explicit_opacity: bool,
    closed: bool,

    lines: Vec<TextLine>,
    placed: Vec<PlacedText>,
    style: WidgetStyle,
}

/// Dimensions as X11 wants them; zero is not a valid window size
fn x11_size(dimensions: Dimensions) -> (u16, u16) {
    (
        dimensions.width.clamp(1, u16::MAX as u32) as u16,
        dimensions.height.clamp(1, u16::MAX as u32) as u16,
    )
}

fn opacity_cardinal(opacity: f32) -> u32 {
    (opacity.clamp(0.0, 1.0) as f64 * u32::MAX as f64) as u32
}

/// ARGB channel widened to the 16-bit range RENDER colors use
fn channel(color: u32, shift: u32) -> u16 {
    let value = ((color >> shift) & 0xFF) as u16;
    (value << 8) | value
}

impl<'a> X11FloatingWindow<'a> {
    pub fn new(ctx: &X11Desktop<'a>, position: Position, dimensions: Dimensions) -> Result<Self> {
        let window = Self::create_window(ctx, position, dimensions)?;

        // Destroys the window if anything below fails
        struct WindowGuard<'c> {
            conn: &'c RustConnection,
            window: Window,
            should_cleanup: bool,
        }

        impl Drop for WindowGuard<'_> {
            fn drop(&mut self) {
                if self.should_cleanup {
                    if let Err(e) = self.conn.destroy_window(self.window) {
                        error!(window = self.window, error = %e, "Failed to clean up window after initialization failure");
                    }
                    let _ = self.conn.flush();
                }
            }
        }

        let mut guard = WindowGuard { conn: ctx.conn, window, should_cleanup: true };

        Self::setup_window_properties(ctx, window)?;

        let picture = ctx.conn.generate_id().context("Failed to generate ID for window picture")?;
        ctx.conn
            .render_create_picture(picture, window, ctx.window_format, &CreatePictureAux::new())
            .context(format!("Failed to create picture for window {window}"))?;

        ctx.conn
            .map_window(window)
            .context(format!("Failed to map window {window}"))?;
        ctx.conn.flush().context("Failed to flush after creating window")?;
        info!(window, x = position.x, y = position.y, "Mapped floating window");

        guard.should_cleanup = false;
        Ok(Self {
            conn: ctx.conn,
            font: ctx.font,
            opacity_atom: ctx.atoms.net_wm_window_opacity,
            argb_format: ctx.argb_format,
            window,
            picture,
            position,
            dimensions,
            visible: true,
            explicit_opacity: false,
            closed: false,
            lines: Vec::new(),
            placed: Vec::new(),
            style: WidgetStyle::default(),
        })
    }

    fn create_window(ctx: &X11Desktop, position: Position, dimensions: Dimensions) -> Result<Window> {
        let window = ctx.conn.generate_id().context("Failed to generate window ID")?;
        let (width, height) = x11_size(dimensions);

        ctx.conn
            .create_window(
                ctx.screen.root_depth,
                window,
                ctx.screen.root,
                position.x as i16,
                position.y as i16,
                width,
                height,
                0,
                WindowClass::INPUT_OUTPUT,
                ctx.screen.root_visual,
                &CreateWindowAux::new()
                    .override_redirect(x11::OVERRIDE_REDIRECT)
                    .event_mask(
                        EventMask::EXPOSURE
                            | EventMask::BUTTON_PRESS
                            | EventMask::BUTTON_RELEASE
                            | EventMask::POINTER_MOTION,
                    ),
            )
            .context("Failed to create floating window")?;
        Ok(window)
    }

    fn setup_window_properties(ctx: &X11Desktop, window: Window) -> Result<()> {
        ctx.conn
            .change_property8(PropMode::REPLACE, window, ctx.atoms.wm_class, AtomEnum::STRING, x11::WM_CLASS)
            .context(format!("Failed to set WM_CLASS for window {window}"))?;

        ctx.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                ctx.atoms.net_wm_state,
                AtomEnum::ATOM,
                &[ctx.atoms.net_wm_state_above],
            )
            .context(format!("Failed to set always-on-top for window {window}"))?;
        Ok(())
    }

    fn write_opacity(&self, opacity: f32) -> Result<()> {
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.opacity_atom,
                AtomEnum::CARDINAL,
                &[opacity_cardinal(opacity)],
            )
            .context(format!("Failed to set opacity for window {}", self.window))?;
        Ok(())
    }

    fn apply_style(&mut self, style: &WidgetStyle) -> Result<()> {
        self.style = *style;
        if !self.explicit_opacity && !self.closed {
            self.write_opacity(((style.background >> 24) & 0xFF) as f32 / 255.0)?;
        }
        Ok(())
    }

    fn padding() -> f32 {
        widget::CONTENT_PADDING as f32
    }

    fn layout(&self, markup: &Markup, style: &WidgetStyle, max_width: u32) -> Vec<TextLine> {
        let inner = max_width.saturating_sub(widget::CONTENT_PADDING * 2) as f32;
        markup::layout(markup, inner, |text, scale| self.font.measure_text(text, style.font_size * scale))
    }

    fn fill_background(&self) -> Result<()> {
        let color = self.style.background;
        let (width, height) = x11_size(self.dimensions);
        self.conn
            .render_fill_rectangles(
                PictOp::SRC,
                self.picture,
                render::Color {
                    red: channel(color, 16),
                    green: channel(color, 8),
                    blue: channel(color, 0),
                    alpha: 0xFFFF,
                },
                &[Rectangle { x: 0, y: 0, width, height }],
            )
            .context(format!("Failed to fill background of window {}", self.window))?;
        Ok(())
    }

    /// Upload one rendered line and composite it at (`x`, `y`), at most `clip` pixels wide
    fn draw_text(&self, text: &str, size: f32, x: i16, y: i16, clip: Option<u32>) -> Result<()> {
        let rendered = self.font.render_line(text, size, self.style.foreground);
        if rendered.width == 0 || rendered.height == 0 {
            return Ok(());
        }
        let (width, height) = (rendered.width as u16, rendered.height as u16);
        let visible_width = clip.map_or(width, |clip| width.min(clip.min(u16::MAX as u32) as u16));
        if visible_width == 0 {
            return Ok(());
        }

        let pixmap = self.conn.generate_id().context("Failed to generate ID for text pixmap")?;
        self.conn
            .create_pixmap(x11::ARGB_DEPTH, pixmap, self.window, width, height)
            .context("Failed to create text pixmap")?;
        let gc = self.conn.generate_id().context("Failed to generate ID for text graphics context")?;
        self.conn
            .create_gc(gc, pixmap, &CreateGCAux::new())
            .context("Failed to create text graphics context")?;

        // Native little-endian BGRA
        let mut image_data = Vec::with_capacity(rendered.data.len() * 4);
        for pixel in &rendered.data {
            image_data.extend_from_slice(&pixel.to_le_bytes());
        }
        self.conn
            .put_image(ImageFormat::Z_PIXMAP, pixmap, gc, width, height, 0, 0, 0, x11::ARGB_DEPTH, &image_data)
            .context("Failed to upload text image")?;

        let picture = self.conn.generate_id().context("Failed to generate ID for text picture")?;
        self.conn
            .render_create_picture(picture, pixmap, self.argb_format, &CreatePictureAux::new())
            .context("Failed to create text picture")?;
        self.conn
            .render_composite(PictOp::OVER, picture, 0u32, self.picture, 0, 0, 0, 0, x, y, visible_width, height)
            .context(format!("Failed to composite text onto window {}", self.window))?;

        self.conn.render_free_picture(picture).context("Failed to free text picture")?;
        self.conn.free_gc(gc).context("Failed to free text graphics context")?;
        self.conn.free_pixmap(pixmap).context("Failed to free text pixmap")?;
        Ok(())
    }

    fn paint(&self) -> Result<()> {
        if self.closed || !self.visible {
            return Ok(());
        }
        self.fill_background()?;

        let padding = Self::padding();
        let mut y = padding;
        for line in &self.lines {
            let size = self.style.font_size * line.kind.scale();
            if y >= self.dimensions.height as f32 {
                break;
            }
            self.draw_text(&line.text, size, padding as i16, y.round() as i16, None)?;
            y += self.font.line_height(size);
        }
        for item in &self.placed {
            self.draw_text(
                &item.text,
                self.style.font_size,
                item.origin.x as i16,
                item.origin.y as i16,
                Some(item.max_width),
            )?;
        }
        self.conn.flush().context("Failed to flush after painting")?;
        Ok(())
    }
}

impl FloatingWindow for X11FloatingWindow<'_> {
    fn id(&self) -> WindowId {
        self.window
    }

    fn position(&self) -> Position {
        self.position
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn move_to(&mut self, position: Position) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.conn
            .configure_window(self.window, &ConfigureWindowAux::new().x(position.x).y(position.y))
            .context(format!("Failed to move window {} to ({}, {})", self.window, position.x, position.y))?;
        self.conn.flush().context("Failed to flush after moving window")?;
        self.position = position;
        Ok(())
    }

    fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
        if self.closed || dimensions == self.dimensions {
            return Ok(());
        }
        let (width, height) = x11_size(dimensions);
        self.conn
            .configure_window(
                self.window,
                &ConfigureWindowAux::new().width(width as u32).height(height as u32),
            )
            .context(format!("Failed to resize window {} to {width}x{height}", self.window))?;
        self.conn.flush().context("Failed to flush after resizing window")?;
        self.dimensions = dimensions;
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        if self.closed || self.visible == visible {
            return Ok(());
        }
        if visible {
            self.conn
                .map_window(self.window)
                .context(format!("Failed to map window {}", self.window))?;
        } else {
            self.conn
                .unmap_window(self.window)
                .context(format!("Failed to unmap window {}", self.window))?;
        }
        self.conn.flush().context("Failed to flush after changing visibility")?;
        self.visible = visible;
        debug!(window = self.window, visible, "Changed window visibility");
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_opacity(&mut self, opacity: f32) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.explicit_opacity = true;
        self.write_opacity(opacity)?;
        self.conn.flush().context("Failed to flush after setting opacity")?;
        Ok(())
    }

    fn show_markup(&mut self, markup: &Markup, style: &WidgetStyle) -> Result<()> {
        self.lines = self.layout(markup, style, self.dimensions.width);
        self.placed.clear();
        self.apply_style(style)?;
        self.paint()
    }

    fn show_placed(&mut self, items: &[PlacedText], style: &WidgetStyle) -> Result<()> {
        self.lines.clear();
        self.placed = items.to_vec();
        self.apply_style(style)?;
        self.paint()
    }

    fn measure(&self, markup: &Markup, style: &WidgetStyle, max_width: u32) -> Dimensions {
        let lines = self.layout(markup, style, max_width);
        let widest = lines
            .iter()
            .map(|line| self.font.measure_text(&line.text, style.font_size * line.kind.scale()))
            .fold(0.0f32, f32::max);
        let height: f32 = lines
            .iter()
            .map(|line| self.font.line_height(style.font_size * line.kind.scale()))
            .sum();

        let padding = widget::CONTENT_PADDING * 2;
        Dimensions::new(widest.ceil() as u32 + padding, height.ceil() as u32 + padding)
    }

    fn measure_line(&self, text: &str, style: &WidgetStyle) -> Dimensions {
        Dimensions::new(
            self.font.measure_text(text, style.font_size).ceil() as u32,
            self.font.line_height(style.font_size).ceil() as u32,
        )
    }

    fn redraw(&mut self) -> Result<()> {
        self.paint()
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.visible = false;

        // Each resource is released independently
        if let Err(e) = self.conn.render_free_picture(self.picture) {
            error!(picture = self.picture, error = %e, "Failed to free window picture");
        }
        if let Err(e) = self.conn.destroy_window(self.window) {
            error!(window = self.window, error = %e, "Failed to destroy window");
        }
        if let Err(e) = self.conn.flush() {
            error!(error = %e, "Failed to flush after closing window");
        }
        info!(window = self.window, "Closed floating window");
    }
}

impl Drop for X11FloatingWindow<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_becomes_one_pixel() {
        assert_eq!(x11_size(Dimensions::new(0, 0)), (1, 1));
        assert_eq!(x11_size(Dimensions::new(800, 70000)), (800, u16::MAX));
    }

    #[test]
    fn test_opacity_cardinal_range() {
        assert_eq!(opacity_cardinal(1.0), u32::MAX);
        assert_eq!(opacity_cardinal(0.0), 0);
        assert_eq!(opacity_cardinal(2.0), u32::MAX);
    }

    #[test]
    fn test_channel_widening() {
        assert_eq!(channel(0xC8FF_8000, 16), 0xFFFF);
        assert_eq!(channel(0xC8FF_8000, 8), 0x8080);
        assert_eq!(channel(0xC8FF_8000, 0), 0);
    }
}
