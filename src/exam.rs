//! Exam mode: an opaque fullscreen screen with a centred caption
//!
//! Covers the whole screen above everything else until dismissed with a
//! right click or the process is signalled.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::constants::{exam, mouse};
use crate::style::WidgetStyle;
use crate::types::{Dimensions, Position, Rect};
use crate::window::{Desktop, FloatingWindow, PlacedText, WindowFactory, WindowId};

fn exam_style() -> WidgetStyle {
    WidgetStyle {
        background: exam::BACKGROUND,
        foreground: exam::FOREGROUND,
        font_size: exam::FONT_SIZE,
    }
}

/// Window-local origin that centres `text` inside `screen`
pub fn centred_origin(screen: Rect, text: Dimensions) -> Position {
    Position::new(
        (screen.width as i32 - text.width as i32) / 2,
        (screen.height as i32 - text.height as i32) / 2,
    )
}

pub struct ExamScreen<W: FloatingWindow> {
    window: W,
    closed: bool,
}

impl<W: FloatingWindow> ExamScreen<W> {
    pub fn new<F>(factory: &F, desktop: &dyn Desktop) -> Result<Self>
    where
        F: WindowFactory<Window = W>,
    {
        let screen = desktop.screen_bounds().context("Failed to query screen size for exam mode")?;
        let mut window = factory
            .create_window(screen.position(), Dimensions::new(screen.width, screen.height))
            .context("Failed to create exam mode window")?;
        window.set_opacity(1.0).context("Failed to make exam mode window opaque")?;

        let style = exam_style();
        let caption = window.measure_line(exam::CAPTION, &style);
        let label = PlacedText::new(exam::CAPTION, centred_origin(screen, caption), screen.width);
        window.show_placed(&[label], &style).context("Failed to draw exam mode caption")?;

        info!(width = screen.width, height = screen.height, "Exam mode on");
        Ok(Self { window, closed: false })
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn repaint(&mut self) {
        if let Err(e) = self.window.redraw() {
            warn!(error = %e, "Failed to repaint exam mode window");
        }
    }

    /// A right click dismisses the screen
    pub fn pointer_up(&mut self, button: u8) {
        if button == mouse::BUTTON_RIGHT {
            self.close();
        }
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.window.close();
        self.closed = true;
        info!("Exam mode off");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::testing::{FakeDesktop, HeadlessFactory};

    #[test]
    fn test_covers_screen_with_centred_caption() {
        let desktop = FakeDesktop::new();
        let screen = ExamScreen::new(&HeadlessFactory, &desktop).unwrap();
        let window = screen.window();

        assert_eq!(window.position, Position::new(0, 0));
        assert_eq!(window.dimensions, Dimensions::new(1920, 1080));
        assert_eq!(window.opacity, 1.0);
        assert_eq!(window.style, exam_style());

        let caption = &window.placed[0];
        assert_eq!(caption.text, exam::CAPTION);
        let size = window.measure_line(exam::CAPTION, &exam_style());
        assert_eq!(caption.origin.x * 2 + size.width as i32, 1920);
        assert!((caption.origin.y * 2 + size.height as i32 - 1080).abs() <= 1);
    }

    #[test]
    fn test_centred_origin() {
        let screen = Rect::new(0, 0, 1920, 1080);
        assert_eq!(centred_origin(screen, Dimensions::new(120, 40)), Position::new(900, 520));
        assert_eq!(centred_origin(screen, Dimensions::new(2000, 40)), Position::new(-40, 520));
    }

    #[test]
    fn test_right_click_dismisses() {
        let desktop = FakeDesktop::new();
        let mut screen = ExamScreen::new(&HeadlessFactory, &desktop).unwrap();

        screen.pointer_up(mouse::BUTTON_LEFT);
        assert!(!screen.is_closed());

        screen.pointer_up(mouse::BUTTON_RIGHT);
        assert!(screen.is_closed());
        assert!(screen.window().closed);
    }

    #[test]
    fn test_needs_screen_bounds() {
        let mut desktop = FakeDesktop::new();
        desktop.screen = None;
        assert!(ExamScreen::new(&HeadlessFactory, &desktop).is_err());
    }
}
