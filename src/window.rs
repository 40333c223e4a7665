//! Platform seams for floating windows and desktop queries
//!
//! Widgets and the launch bar only talk to these traits. The X11 backend
//! implements them in `crate::x11`; tests use the headless fakes in
//! [`testing`].

use anyhow::Result;

use crate::error::PlatformResult;
use crate::markup::Markup;
use crate::style::WidgetStyle;
use crate::types::{Dimensions, Position, Rect};

/// Platform identifier used to route pointer events to their owner
pub type WindowId = u32;

/// One line of text pinned at a window-local origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedText {
    pub text: String,
    pub origin: Position,
    /// Text running past `origin.x + max_width` is clipped
    pub max_width: u32,
}

impl PlacedText {
    pub fn new(text: impl Into<String>, origin: Position, max_width: u32) -> Self {
        Self { text: text.into(), origin, max_width }
    }
}

/// A frameless, always-on-top window that can show rendered markup
pub trait FloatingWindow {
    fn id(&self) -> WindowId;
    fn position(&self) -> Position;
    fn dimensions(&self) -> Dimensions;

    fn rect(&self) -> Rect {
        Rect::from_parts(self.position(), self.dimensions())
    }

    fn move_to(&mut self, position: Position) -> Result<()>;
    fn resize(&mut self, dimensions: Dimensions) -> Result<()>;
    fn set_visible(&mut self, visible: bool) -> Result<()>;
    fn is_visible(&self) -> bool;
    fn set_opacity(&mut self, opacity: f32) -> Result<()>;

    /// Replace what the window draws
    fn show_markup(&mut self, markup: &Markup, style: &WidgetStyle) -> Result<()>;

    /// Replace what the window draws with individually placed lines
    fn show_placed(&mut self, items: &[PlacedText], style: &WidgetStyle) -> Result<()>;

    /// Natural size of `markup` when wrapped at `max_width`, padding included
    fn measure(&self, markup: &Markup, style: &WidgetStyle, max_width: u32) -> Dimensions;

    /// Size of one unwrapped line at the style's font size, no padding
    fn measure_line(&self, text: &str, style: &WidgetStyle) -> Dimensions;

    /// Repaint the last shown markup after the window was exposed
    fn redraw(&mut self) -> Result<()> {
        Ok(())
    }

    /// Destroy the native window; further calls are no-ops
    fn close(&mut self);
}

/// Creates floating windows for one display connection
pub trait WindowFactory {
    type Window: FloatingWindow;

    fn create_window(&self, position: Position, dimensions: Dimensions) -> Result<Self::Window>;
}

/// The currently focused top-level window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundWindow {
    pub title: String,
    pub bounds: Rect,
}

/// Screen metrics and global queries
pub trait Desktop {
    /// Usable area (screen minus panels)
    fn work_area(&self) -> PlatformResult<Rect>;
    fn screen_bounds(&self) -> PlatformResult<Rect>;
    fn cursor_position(&self) -> PlatformResult<Position>;
    fn foreground_window(&self) -> PlatformResult<ForegroundWindow>;
}

#[cfg(test)]
pub mod testing {
    //! Headless window and desktop used by unit tests

    use std::cell::Cell;

    use super::*;
    use crate::error::PlatformError;
    use crate::markup;

    /// Glyph advance of the fake font
    pub const CHAR_WIDTH: f32 = 8.0;
    pub const LINE_HEIGHT: u32 = 16;
    pub const PADDING: u32 = 10;

    thread_local! {
        static NEXT_ID: Cell<WindowId> = const { Cell::new(1) };
    }

    #[derive(Debug)]
    pub struct HeadlessWindow {
        pub id: WindowId,
        pub position: Position,
        pub dimensions: Dimensions,
        pub visible: bool,
        pub opacity: f32,
        pub shown: Option<Markup>,
        pub placed: Vec<PlacedText>,
        pub style: WidgetStyle,
        pub closed: bool,
        /// Every position this window was moved to
        pub moves: Vec<Position>,
    }

    impl HeadlessWindow {
        pub fn new(position: Position, dimensions: Dimensions) -> Self {
            let id = NEXT_ID.with(|next| {
                let id = next.get();
                next.set(id + 1);
                id
            });
            Self {
                id,
                position,
                dimensions,
                visible: true,
                opacity: 1.0,
                shown: None,
                placed: Vec::new(),
                style: WidgetStyle::default(),
                closed: false,
                moves: Vec::new(),
            }
        }
    }

    impl FloatingWindow for HeadlessWindow {
        fn id(&self) -> WindowId {
            self.id
        }

        fn position(&self) -> Position {
            self.position
        }

        fn dimensions(&self) -> Dimensions {
            self.dimensions
        }

        fn move_to(&mut self, position: Position) -> Result<()> {
            self.position = position;
            self.moves.push(position);
            Ok(())
        }

        fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
            self.dimensions = dimensions;
            Ok(())
        }

        fn set_visible(&mut self, visible: bool) -> Result<()> {
            self.visible = visible;
            Ok(())
        }

        fn is_visible(&self) -> bool {
            self.visible
        }

        fn set_opacity(&mut self, opacity: f32) -> Result<()> {
            self.opacity = opacity;
            Ok(())
        }

        fn show_markup(&mut self, markup: &Markup, style: &WidgetStyle) -> Result<()> {
            self.shown = Some(markup.clone());
            self.placed.clear();
            self.style = *style;
            Ok(())
        }

        fn show_placed(&mut self, items: &[PlacedText], style: &WidgetStyle) -> Result<()> {
            self.shown = None;
            self.placed = items.to_vec();
            self.style = *style;
            Ok(())
        }

        fn measure(&self, markup: &Markup, _style: &WidgetStyle, max_width: u32) -> Dimensions {
            let inner = max_width.saturating_sub(PADDING * 2) as f32;
            let lines = markup::layout(markup, inner, |text, scale| {
                text.chars().count() as f32 * CHAR_WIDTH * scale
            });
            let widest = lines
                .iter()
                .map(|line| (line.text.chars().count() as f32 * CHAR_WIDTH * line.kind.scale()).ceil() as u32)
                .max()
                .unwrap_or(0);
            Dimensions::new(widest + PADDING * 2, lines.len() as u32 * LINE_HEIGHT + PADDING * 2)
        }

        fn measure_line(&self, text: &str, style: &WidgetStyle) -> Dimensions {
            let scale = style.font_size / crate::constants::presentation::FONT_SIZE;
            let width = text.chars().count() as f32 * CHAR_WIDTH * scale;
            Dimensions::new(width.ceil() as u32, (LINE_HEIGHT as f32 * scale).ceil() as u32)
        }

        fn close(&mut self) {
            self.visible = false;
            self.closed = true;
        }
    }

    #[derive(Debug, Default)]
    pub struct HeadlessFactory;

    impl WindowFactory for HeadlessFactory {
        type Window = HeadlessWindow;

        fn create_window(&self, position: Position, dimensions: Dimensions) -> Result<HeadlessWindow> {
            Ok(HeadlessWindow::new(position, dimensions))
        }
    }

    /// Desktop whose answers tests set directly; `None` means the query fails
    #[derive(Debug, Clone)]
    pub struct FakeDesktop {
        pub work_area: Option<Rect>,
        pub screen: Option<Rect>,
        pub cursor: Option<Position>,
        pub foreground: Option<ForegroundWindow>,
    }

    impl FakeDesktop {
        /// 1920x1080 screen with a 40px bottom panel, cursor far away
        pub fn new() -> Self {
            Self {
                work_area: Some(Rect::new(0, 0, 1920, 1040)),
                screen: Some(Rect::new(0, 0, 1920, 1080)),
                cursor: Some(Position::new(960, 500)),
                foreground: None,
            }
        }
    }

    impl WindowFactory for FakeDesktop {
        type Window = HeadlessWindow;

        fn create_window(&self, position: Position, dimensions: Dimensions) -> Result<HeadlessWindow> {
            Ok(HeadlessWindow::new(position, dimensions))
        }
    }

    impl Desktop for FakeDesktop {
        fn work_area(&self) -> PlatformResult<Rect> {
            self.work_area.ok_or_else(|| PlatformError::unavailable("work area"))
        }

        fn screen_bounds(&self) -> PlatformResult<Rect> {
            self.screen.ok_or_else(|| PlatformError::unavailable("screen bounds"))
        }

        fn cursor_position(&self) -> PlatformResult<Position> {
            self.cursor.ok_or_else(|| PlatformError::unavailable("cursor"))
        }

        fn foreground_window(&self) -> PlatformResult<ForegroundWindow> {
            self.foreground.clone().ok_or_else(|| PlatformError::unavailable("foreground window"))
        }
    }
}
