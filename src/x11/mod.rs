//! X11 backend: floating windows and desktop queries over x11rb

pub mod window;

pub use window::X11FloatingWindow;

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::protocol::render::{ConnectionExt as RenderExt, Pictformat};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::error::{PlatformError, PlatformResult};
use crate::font::FontRenderer;
use crate::types::{Dimensions, Position, Rect};
use crate::window::{Desktop, ForegroundWindow, WindowFactory};

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub wm_name: Atom,
    pub wm_class: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
    pub net_active_window: Atom,
    pub net_workarea: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_above: Atom,
    pub net_wm_window_opacity: Atom,
}

fn intern(conn: &RustConnection, name: &str) -> Result<Atom> {
    Ok(conn
        .intern_atom(false, name.as_bytes())
        .with_context(|| format!("Failed to intern {name} atom"))?
        .reply()
        .with_context(|| format!("Failed to get reply for {name} atom"))?
        .atom)
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            wm_name: intern(conn, "WM_NAME")?,
            wm_class: intern(conn, "WM_CLASS")?,
            net_wm_name: intern(conn, "_NET_WM_NAME")?,
            utf8_string: intern(conn, "UTF8_STRING")?,
            net_active_window: intern(conn, "_NET_ACTIVE_WINDOW")?,
            net_workarea: intern(conn, "_NET_WORKAREA")?,
            net_wm_state: intern(conn, "_NET_WM_STATE")?,
            net_wm_state_above: intern(conn, "_NET_WM_STATE_ABOVE")?,
            net_wm_window_opacity: intern(conn, "_NET_WM_WINDOW_OPACITY")?,
        })
    }
}

#[tracing::instrument(skip(conn))]
pub fn get_pictformat(conn: &RustConnection, depth: u8, alpha: bool) -> Result<Pictformat> {
    let formats = conn
        .render_query_pict_formats()
        .context("Failed to query RENDER picture formats")?
        .reply()
        .context("Failed to get reply for RENDER picture formats query")?
        .formats;

    match formats
        .iter()
        .find(|format| format.depth == depth && (format.direct.alpha_mask != 0) == alpha)
    {
        Some(format) => {
            debug!(depth = format.depth, alpha_mask = format.direct.alpha_mask, "using Pictformat");
            Ok(format.id)
        }
        None => anyhow::bail!(
            "Could not find suitable picture format (depth={depth}, alpha={alpha}). Check RENDER extension support."
        ),
    }
}

/// Shared connection state; creates windows and answers desktop queries
pub struct X11Desktop<'a> {
    pub conn: &'a RustConnection,
    pub screen: &'a Screen,
    pub atoms: &'a CachedAtoms,
    pub font: &'a FontRenderer,
    /// Format of windows created with the root visual
    pub window_format: Pictformat,
    /// 32-bit ARGB format for text bitmaps
    pub argb_format: Pictformat,
}

impl<'a> X11Desktop<'a> {
    pub fn new(conn: &'a RustConnection, screen: &'a Screen, atoms: &'a CachedAtoms, font: &'a FontRenderer) -> Result<Self> {
        Ok(Self {
            conn,
            screen,
            atoms,
            font,
            window_format: get_pictformat(conn, screen.root_depth, false)
                .context("Failed to get picture format for widget windows")?,
            argb_format: get_pictformat(conn, crate::constants::x11::ARGB_DEPTH, true)
                .context("Failed to get ARGB picture format")?,
        })
    }

    fn window_title(&self, window: Window) -> Result<String> {
        let utf8 = self
            .conn
            .get_property(false, window, self.atoms.net_wm_name, self.atoms.utf8_string, 0, 1024)
            .context("Failed to query _NET_WM_NAME")?
            .reply()
            .context("Failed to get _NET_WM_NAME reply")?;
        if !utf8.value.is_empty() {
            return Ok(String::from_utf8_lossy(&utf8.value).into_owned());
        }

        let legacy = self
            .conn
            .get_property(false, window, self.atoms.wm_name, AtomEnum::STRING, 0, 1024)
            .context("Failed to query WM_NAME")?
            .reply()
            .context("Failed to get WM_NAME reply")?;
        Ok(String::from_utf8_lossy(&legacy.value).into_owned())
    }

    fn active_window(&self) -> Result<Option<Window>> {
        let prop = self
            .conn
            .get_property(false, self.screen.root, self.atoms.net_active_window, AtomEnum::WINDOW, 0, 1)
            .context("Failed to query _NET_ACTIVE_WINDOW property")?
            .reply()
            .context("Failed to get reply for _NET_ACTIVE_WINDOW query")?;
        Ok(prop.value32().and_then(|mut values| values.next()).filter(|&w| w != 0))
    }

    fn window_bounds(&self, window: Window) -> Result<Rect> {
        let geom = self
            .conn
            .get_geometry(window)
            .context("Failed to send geometry query")?
            .reply()
            .context("Failed to get window geometry")?;
        let origin = self
            .conn
            .translate_coordinates(window, self.screen.root, 0, 0)
            .context("Failed to send translate_coordinates")?
            .reply()
            .context("Failed to translate window origin")?;
        Ok(Rect::new(origin.dst_x as i32, origin.dst_y as i32, geom.width as u32, geom.height as u32))
    }
}

impl<'a> WindowFactory for X11Desktop<'a> {
    type Window = X11FloatingWindow<'a>;

    fn create_window(&self, position: Position, dimensions: Dimensions) -> Result<X11FloatingWindow<'a>> {
        X11FloatingWindow::new(self, position, dimensions)
    }
}

fn unavailable(e: anyhow::Error) -> PlatformError {
    PlatformError::unavailable(format!("{e:#}"))
}

impl Desktop for X11Desktop<'_> {
    fn work_area(&self) -> PlatformResult<Rect> {
        let reply = self
            .conn
            .get_property(false, self.screen.root, self.atoms.net_workarea, AtomEnum::CARDINAL, 0, 4)
            .map_err(|e| PlatformError::unavailable(e))?
            .reply()
            .map_err(|e| PlatformError::unavailable(e))?;

        let values: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
        match values.as_slice() {
            [x, y, width, height, ..] if *width > 0 && *height > 0 => {
                Ok(Rect::new(*x as i32, *y as i32, *width, *height))
            }
            // No EWMH window manager, the whole screen is usable
            _ => self.screen_bounds(),
        }
    }

    fn screen_bounds(&self) -> PlatformResult<Rect> {
        Ok(Rect::new(
            0,
            0,
            self.screen.width_in_pixels as u32,
            self.screen.height_in_pixels as u32,
        ))
    }

    fn cursor_position(&self) -> PlatformResult<Position> {
        let pointer = self
            .conn
            .query_pointer(self.screen.root)
            .map_err(|e| PlatformError::unavailable(e))?
            .reply()
            .map_err(|e| PlatformError::unavailable(e))?;
        Ok(Position::new(pointer.root_x as i32, pointer.root_y as i32))
    }

    fn foreground_window(&self) -> PlatformResult<ForegroundWindow> {
        let window = self
            .active_window()
            .map_err(unavailable)?
            .ok_or_else(|| PlatformError::unavailable("no active window"))?;
        let title = self.window_title(window).map_err(unavailable)?;
        let bounds = self.window_bounds(window).map_err(unavailable)?;
        Ok(ForegroundWindow { title, bounds })
    }
}
