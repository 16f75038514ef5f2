//! The 2×2 goal region in the middle of the maze

use crate::walls::{Point, WallId};

/// 2×2 block of goal cells, addressed by its south-west cell
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct GoalRegion {
    origin: Point,
}

impl GoalRegion {
    pub const fn at(origin: Point) -> Self {
        GoalRegion { origin }
    }

    /// Region in the middle of a `width` × `height` grid.
    ///
    /// For the 10×10 competition maze these are the cells `(4,4)`, `(4,5)`,
    /// `(5,4)` and `(5,5)`.
    pub fn centered(width: usize, height: usize) -> Self {
        GoalRegion::at(Point::new(
            width.saturating_sub(2) / 2,
            height.saturating_sub(2) / 2,
        ))
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn cells(&self) -> [Point; 4] {
        let Point { x, y } = self.origin;
        [
            Point::new(x, y),
            Point::new(x, y + 1),
            Point::new(x + 1, y),
            Point::new(x + 1, y + 1),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        (self.origin.x..self.origin.x + 2).contains(&p.x)
            && (self.origin.y..self.origin.y + 2).contains(&p.y)
    }

    /// The four walls inside the block
    pub fn interior_walls(&self) -> [WallId; 4] {
        let Point { x, y } = self.origin;
        [
            WallId::vertical(x, y),
            WallId::vertical(x, y + 1),
            WallId::horizontal(x, y),
            WallId::horizontal(x + 1, y),
        ]
    }

    /// The eight walls around the block: south, north, west, then east side.
    ///
    /// Only meaningful for a region that [fits](Self::fits) its grid.
    pub fn perimeter(&self) -> [WallId; 8] {
        let Point { x, y } = self.origin;
        [
            WallId::horizontal(x, y - 1),
            WallId::horizontal(x + 1, y - 1),
            WallId::horizontal(x, y + 1),
            WallId::horizontal(x + 1, y + 1),
            WallId::vertical(x - 1, y),
            WallId::vertical(x - 1, y + 1),
            WallId::vertical(x + 1, y),
            WallId::vertical(x + 1, y + 1),
        ]
    }

    /// Whether the whole perimeter consists of interior walls of a
    /// `width` × `height` grid
    pub fn fits(&self, width: usize, height: usize) -> bool {
        let Point { x, y } = self.origin;
        x >= 1 && y >= 1 && x + 2 < width && y + 2 < height
    }
}
