use crate::constants::snap;
use crate::types::{Position, Rect};

/// Horizontal screen edge a window can dock and hide against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

/// Result of classifying a window against the work area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeContact {
    /// Docked side, if any (left wins when both apply)
    pub edge: Option<Edge>,
    /// Touching the bottom edge
    pub bottom: bool,
}

impl EdgeContact {
    pub fn is_near_edge(&self) -> bool {
        self.edge.is_some()
    }
}

/// Classify `window` against the work area
pub fn classify(window: Rect, work_area: Rect) -> EdgeContact {
    let edge = if window.left() - work_area.left() <= snap::LEFT_THRESHOLD {
        Some(Edge::Left)
    } else if window.right() >= work_area.right() - snap::FAR_EDGE_THRESHOLD {
        Some(Edge::Right)
    } else {
        None
    };
    let bottom = window.bottom() >= work_area.bottom() - snap::FAR_EDGE_THRESHOLD;
    EdgeContact { edge, bottom }
}

/// Position after snapping flush to whatever edges `window` touches
/// Returns None when the window is already where it should be
pub fn snap_position(window: Rect, work_area: Rect) -> (EdgeContact, Option<Position>) {
    let contact = classify(window, work_area);
    let mut target = window.position();

    if let Some(edge) = contact.edge {
        target.x = docked_x(edge, window, work_area);
    }
    if contact.bottom {
        target.y = work_area.bottom() - window.height as i32;
    }

    let moved = (target != window.position()).then_some(target);
    (contact, moved)
}

/// X coordinate flush against `edge`
pub fn docked_x(edge: Edge, window: Rect, work_area: Rect) -> i32 {
    match edge {
        Edge::Left => work_area.left(),
        Edge::Right => work_area.right() - window.width as i32,
    }
}

/// X coordinate that leaves only a sliver of the window on screen
pub fn hidden_x(edge: Edge, window: Rect, work_area: Rect) -> i32 {
    match edge {
        Edge::Left => work_area.left() - window.width as i32 + snap::HIDDEN_SLIVER,
        Edge::Right => work_area.right() - snap::HIDDEN_SLIVER,
    }
}
