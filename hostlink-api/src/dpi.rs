//! Pixel geometry in the two coordinate spaces hosts report.
//!
//! Physical pixels are what the compositor works in; logical pixels divide
//! them by the window's scale factor. Hosts reply with physical values and
//! accept either, wrapped in the tagged [`Size`] / [`Position`] enums.

use serde::{Deserialize, Serialize};

pub type ScaleFactor = f64;
pub type PixelCount = isize;

/// A size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogicalSize {
    width: PixelCount,
    height: PixelCount,
}

impl LogicalSize {
    pub fn new(width: PixelCount, height: PixelCount) -> Self {
        LogicalSize { width, height }
    }

    pub fn width(&self) -> PixelCount {
        self.width
    }

    pub fn height(&self) -> PixelCount {
        self.height
    }
}

/// A size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicalSize {
    width: PixelCount,
    height: PixelCount,
}

impl PhysicalSize {
    pub fn new(width: PixelCount, height: PixelCount) -> Self {
        PhysicalSize { width, height }
    }

    pub fn width(&self) -> PixelCount {
        self.width
    }

    pub fn height(&self) -> PixelCount {
        self.height
    }

    /// Converts to logical pixels under `scale_factor`.
    pub fn as_logical(&self, scale_factor: ScaleFactor) -> LogicalSize {
        LogicalSize {
            width: (self.width as f64 / scale_factor) as PixelCount,
            height: (self.height as f64 / scale_factor) as PixelCount,
        }
    }
}

/// A position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogicalPosition {
    x: PixelCount,
    y: PixelCount,
}

impl LogicalPosition {
    pub fn new(x: PixelCount, y: PixelCount) -> Self {
        LogicalPosition { x, y }
    }

    pub fn x(&self) -> PixelCount {
        self.x
    }

    pub fn y(&self) -> PixelCount {
        self.y
    }
}

/// A position in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicalPosition {
    x: PixelCount,
    y: PixelCount,
}

impl PhysicalPosition {
    pub fn new(x: PixelCount, y: PixelCount) -> Self {
        PhysicalPosition { x, y }
    }

    pub fn x(&self) -> PixelCount {
        self.x
    }

    pub fn y(&self) -> PixelCount {
        self.y
    }

    /// Converts to logical pixels under `scale_factor`.
    pub fn as_logical(&self, scale_factor: ScaleFactor) -> LogicalPosition {
        LogicalPosition {
            x: (self.x as f64 / scale_factor) as PixelCount,
            y: (self.y as f64 / scale_factor) as PixelCount,
        }
    }
}

/// Either coordinate space of a size, tagged for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Size {
    Physical(PhysicalSize),
    Logical(LogicalSize),
}

impl From<PhysicalSize> for Size {
    fn from(size: PhysicalSize) -> Self {
        Size::Physical(size)
    }
}

impl From<LogicalSize> for Size {
    fn from(size: LogicalSize) -> Self {
        Size::Logical(size)
    }
}

/// Either coordinate space of a position, tagged for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Position {
    Physical(PhysicalPosition),
    Logical(LogicalPosition),
}

impl From<PhysicalPosition> for Position {
    fn from(position: PhysicalPosition) -> Self {
        Position::Physical(position)
    }
}

impl From<LogicalPosition> for Position {
    fn from(position: LogicalPosition) -> Self {
        Position::Logical(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_physical_size_as_logical() {
        let physical = PhysicalSize::new(1600, 1200);
        let logical = physical.as_logical(2.0);
        assert_eq!(logical.width(), 800);
        assert_eq!(logical.height(), 600);
    }

    #[test]
    fn test_physical_position_as_logical() {
        let physical = PhysicalPosition::new(300, -150);
        let logical = physical.as_logical(1.5);
        assert_eq!(logical.x(), 200);
        assert_eq!(logical.y(), -100);
    }

    #[test]
    fn test_size_wire_shape_is_tagged() {
        let value = serde_json::to_value(Size::Physical(PhysicalSize::new(800, 600))).unwrap();
        assert_eq!(
            value,
            json!({"type": "Physical", "data": {"width": 800, "height": 600}})
        );
    }

    #[test]
    fn test_position_decodes_from_plain_fields() {
        let position: PhysicalPosition = serde_json::from_value(json!({"x": 10, "y": 20})).unwrap();
        assert_eq!(position, PhysicalPosition::new(10, 20));
    }
}
