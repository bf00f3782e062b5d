use std::fmt;

use ferroservo_clients_io::Point2D;
use serde::{Deserialize, Serialize};

/// Trajectory shapes
///
/// The shape-change signal cycles through the shapes in the order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    #[default]
    VerticalLines,
    LetterA,
    LetterL,
    LetterT,
    LetterS,
    Lettere,
    LetterO,
    LetterI,
    LetterU,
    Letterd,
    HorizontalLines,
    Square,
    Circle,
    Spiral,
    HorizontalLinesOpposite,
    VerticalLinesOpposite,
}

impl Shape {
    pub const ALL: [Shape; 16] = [
        Shape::VerticalLines,
        Shape::LetterA,
        Shape::LetterL,
        Shape::LetterT,
        Shape::LetterS,
        Shape::Lettere,
        Shape::LetterO,
        Shape::LetterI,
        Shape::LetterU,
        Shape::Letterd,
        Shape::HorizontalLines,
        Shape::Square,
        Shape::Circle,
        Shape::Spiral,
        Shape::HorizontalLinesOpposite,
        Shape::VerticalLinesOpposite,
    ];
    /// Next shape, wrapping around
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&s| s == self).unwrap_or_default();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Shape::*;
        match self {
            VerticalLines => write!(f, "vertical lines"),
            LetterA => write!(f, "letter A"),
            LetterL => write!(f, "letter L"),
            LetterT => write!(f, "letter T"),
            LetterS => write!(f, "letter S"),
            Lettere => write!(f, "letter e"),
            LetterO => write!(f, "letter O"),
            LetterI => write!(f, "letter I"),
            LetterU => write!(f, "letter U"),
            Letterd => write!(f, "letter d"),
            HorizontalLines => write!(f, "horizontal lines"),
            Square => write!(f, "square"),
            Circle => write!(f, "circle"),
            Spiral => write!(f, "spiral"),
            HorizontalLinesOpposite => write!(f, "horizontal lines (opposite)"),
            VerticalLinesOpposite => write!(f, "vertical lines (opposite)"),
        }
    }
}

/// Waypoint layout of the shapes around the workspace centre
///
/// Letters are drawn on a `2 * half_width` by `2 * half_height` box,
/// the square is `2 * square_half_width` wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeLayout {
    pub centre: Point2D,
    pub half_width: f64,
    pub half_height: f64,
    pub square_half_width: f64,
    /// Half height of the point-to-point zig-zags
    pub point_to_point_half_height: f64,
}

impl Default for ShapeLayout {
    fn default() -> Self {
        Self {
            centre: Point2D::new(470., 532.),
            half_width: 60.,
            half_height: 90.,
            square_half_width: 93.,
            point_to_point_half_height: 93.,
        }
    }
}

impl ShapeLayout {
    /// Waypoints of a piecewise linear shape
    ///
    /// Returns `None` for the [circle](Shape::Circle) and the [spiral](Shape::Spiral)
    pub fn waypoints(&self, shape: Shape) -> Option<Vec<Point2D>> {
        let Point2D { u: mx, v: my } = self.centre;
        let (lx, rx) = (mx - self.half_width, mx + self.half_width);
        let (hy, ly) = (my - self.half_height, my + self.half_height);
        let (s_lx, s_rx) = (mx - self.square_half_width, mx + self.square_half_width);
        let (s_hy, s_ly) = (my - self.square_half_width, my + self.square_half_width);
        use Shape::*;
        let uv: Vec<(f64, f64)> = match shape {
            VerticalLines => vec![(mx, ly), (mx, hy)],
            VerticalLinesOpposite => vec![(mx, hy), (mx, ly)],
            HorizontalLines => vec![(s_lx, my), (s_rx, my)],
            HorizontalLinesOpposite => vec![(s_rx, my), (s_lx, my)],
            LetterA => vec![(lx, ly), (lx, hy), (rx, hy), (rx, ly), (rx, my), (lx, my)],
            LetterL => vec![(lx, hy), (lx, ly), (rx, ly)],
            LetterT => vec![(lx, hy), (rx, hy), (mx, hy), (mx, ly)],
            LetterS => vec![(rx, hy), (lx, hy), (lx, my), (rx, my), (rx, ly), (lx, ly)],
            Lettere => vec![(lx, my), (rx, my), (rx, hy), (lx, hy), (lx, ly), (rx, ly)],
            LetterO => vec![(lx, hy), (lx, ly), (rx, ly), (rx, hy), (lx, hy)],
            LetterI => vec![(rx, hy), (rx, ly)],
            LetterU => vec![(lx, hy), (lx, ly), (rx, ly), (rx, hy)],
            Letterd => vec![(rx, hy), (rx, ly), (lx, ly), (lx, my), (rx, my)],
            Square => vec![
                (s_lx, s_hy),
                (s_rx, s_hy),
                (s_rx, s_ly),
                (s_lx, s_ly),
                (s_lx, s_hy),
            ],
            Circle | Spiral => return None,
        };
        Some(uv.into_iter().map(Point2D::from).collect())
    }
    /// Point-to-point waypoints
    ///
    /// Vertical and horizontal zig-zags for the line shapes, letter A otherwise
    pub fn point_to_point(&self, shape: Shape) -> Vec<Point2D> {
        let Point2D { u: mx, v: my } = self.centre;
        let (lx, rx) = (mx - self.half_width, mx + self.half_width);
        let (hy, ly) = (
            my - self.point_to_point_half_height,
            my + self.point_to_point_half_height,
        );
        let uv: Vec<(f64, f64)> = match shape {
            Shape::VerticalLines => vec![
                (lx, hy),
                (lx, ly),
                (mx, hy),
                (mx, ly),
                (rx, hy),
                (rx, ly),
                (lx, ly),
                (lx, hy),
                (mx, ly),
                (mx, hy),
                (rx, ly),
                (rx, hy),
            ],
            Shape::HorizontalLines => vec![
                (lx, ly),
                (rx, ly),
                (lx, my),
                (rx, my),
                (lx, hy),
                (rx, hy),
                (rx, ly),
                (lx, ly),
                (rx, my),
                (lx, my),
                (rx, hy),
                (lx, hy),
            ],
            _ => vec![(lx, ly), (lx, hy), (rx, hy), (rx, ly), (rx, my), (lx, my)],
        };
        uv.into_iter().map(Point2D::from).collect()
    }
}
