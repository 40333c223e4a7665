//! Shared geometry types

use serde::{Deserialize, Serialize};

/// Top-left screen coordinate of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset between two points (`self - origin`)
    pub fn offset_from(self, origin: Position) -> Position {
        Position::new(self.x - origin.x, self.y - origin.y)
    }

    /// Move by an offset in the opposite direction (`self - offset`)
    pub fn minus(self, offset: Position) -> Position {
        Position::new(self.x - offset.x, self.y - offset.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(position: Position, dimensions: Dimensions) -> Self {
        Self::new(position.x, position.y, dimensions.width, dimensions.height)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Inclusive of the top-left edge, exclusive of the bottom-right edge
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 300, 90);
        assert_eq!(rect.left(), 10);
        assert_eq!(rect.right(), 310);
        assert_eq!(rect.top(), 20);
        assert_eq!(rect.bottom(), 110);
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0, 0, 100, 50);
        assert!(rect.contains(Position::new(0, 0)));
        assert!(rect.contains(Position::new(99, 49)));
        assert!(!rect.contains(Position::new(100, 10)));
        assert!(!rect.contains(Position::new(10, 50)));
    }

    #[test]
    fn test_rect_contains_negative_origin() {
        // Hidden windows sit partly off-screen
        let rect = Rect::new(-290, 400, 300, 90);
        assert!(rect.contains(Position::new(5, 420)));
        assert!(!rect.contains(Position::new(10, 420)));
    }

    #[test]
    fn test_position_offsets() {
        let pointer = Position::new(150, 130);
        let origin = Position::new(100, 100);
        let offset = pointer.offset_from(origin);
        assert_eq!(offset, Position::new(50, 30));
        assert_eq!(Position::new(400, 300).minus(offset), Position::new(350, 270));
    }
}
