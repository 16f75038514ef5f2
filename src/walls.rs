//! Grid wall model
//!
//! A maze is a `width` × `height` grid of cells with walls between
//! neighbouring cells. Every interior wall is stored exactly once, so the two
//! cells on either side of it can never disagree about it. The outer
//! boundary is always walled.

use std::fmt;

/// Location of a cell, `(0, 0)` being the south-west corner
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug, Default)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Absolute grid direction. North is towards increasing `y`.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction after a 90° clockwise turn
    pub fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Direction after a 90° counter-clockwise turn
    pub fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    pub fn opposite(self) -> Self {
        self.turn_right().turn_right()
    }

    /// Step `(dx, dy)` taken when moving one cell in this direction
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Neighbouring point in this direction, if it does not underflow.
    ///
    /// The upper grid bound is not checked here; see [WallSource::neighbor].
    pub fn step(self, from: Point) -> Option<Point> {
        let (dx, dy) = self.delta();
        Some(Point {
            x: from.x.checked_add_signed(dx)?,
            y: from.y.checked_add_signed(dy)?,
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        write!(f, "{name}")
    }
}

/// Walls around a single cell, in absolute directions
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct CellWalls {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl CellWalls {
    /// A cell with all four sides walled
    pub const CLOSED: CellWalls = CellWalls {
        north: true,
        east: true,
        south: true,
        west: true,
    };

    pub fn get(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, dir: Direction, present: bool) {
        match dir {
            Direction::North => self.north = present,
            Direction::East => self.east = present,
            Direction::South => self.south = present,
            Direction::West => self.west = present,
        }
    }

    /// Number of sides without a wall
    pub fn open_sides(&self) -> usize {
        Direction::ALL.iter().filter(|&&dir| !self.get(dir)).count()
    }
}

/// Anything that can answer "is there a wall on this side of this cell".
///
/// Implemented by the generated [WallGrid] and by layouts read from maze
/// files, so that the validator and the simulator work with both.
pub trait WallSource {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Whether there is a wall on side `dir` of cell `at`
    fn has_wall(&self, at: Point, dir: Direction) -> bool;

    fn contains(&self, p: Point) -> bool {
        p.x < self.width() && p.y < self.height()
    }

    /// Adjacent cell in direction `dir`, if it lies inside the grid
    fn neighbor(&self, at: Point, dir: Direction) -> Option<Point> {
        dir.step(at).filter(|&p| self.contains(p))
    }

    /// Four-sided view of one cell
    fn cell_walls(&self, at: Point) -> CellWalls {
        CellWalls {
            north: self.has_wall(at, Direction::North),
            east: self.has_wall(at, Direction::East),
            south: self.has_wall(at, Direction::South),
            west: self.has_wall(at, Direction::West),
        }
    }
}

/// Which of the two stored matrices a wall lives in
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Orientation {
    /// Wall between `(x, y)` and `(x, y + 1)`
    Horizontal,
    /// Wall between `(x, y)` and `(x + 1, y)`
    Vertical,
}

/// A stored wall: the one above (`Horizontal`) or to the right of
/// (`Vertical`) `cell`
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct WallId {
    pub cell: Point,
    pub orientation: Orientation,
}

impl WallId {
    pub const fn horizontal(x: usize, y: usize) -> Self {
        WallId {
            cell: Point::new(x, y),
            orientation: Orientation::Horizontal,
        }
    }

    pub const fn vertical(x: usize, y: usize) -> Self {
        WallId {
            cell: Point::new(x, y),
            orientation: Orientation::Vertical,
        }
    }

    /// Wall on side `dir` of `cell`.
    ///
    /// Returns `None` for the south wall of the bottom row and the west wall
    /// of the leftmost column, which have no stored counterpart.
    pub fn of(cell: Point, dir: Direction) -> Option<Self> {
        match dir {
            Direction::North => Some(Self::horizontal(cell.x, cell.y)),
            Direction::East => Some(Self::vertical(cell.x, cell.y)),
            Direction::South => Some(Self::horizontal(cell.x, cell.y.checked_sub(1)?)),
            Direction::West => Some(Self::vertical(cell.x.checked_sub(1)?, cell.y)),
        }
    }

    /// Wall separating two adjacent cells
    pub fn between(a: Point, b: Point) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|dir| dir.step(a) == Some(b))
            .and_then(|dir| Self::of(a, dir))
    }

    /// The two cells this wall separates, south/west one first
    pub fn cells(&self) -> (Point, Point) {
        let Point { x, y } = self.cell;
        match self.orientation {
            Orientation::Horizontal => (self.cell, Point::new(x, y + 1)),
            Orientation::Vertical => (self.cell, Point::new(x + 1, y)),
        }
    }
}

/// Wall presence for a whole maze
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct WallGrid {
    width: usize,
    height: usize,
    /// `horiz[y][x]`: wall above cell `(x, y)`
    horiz: Vec<Vec<bool>>,
    /// `vert[y][x]`: wall to the right of cell `(x, y)`
    vert: Vec<Vec<bool>>,
}

impl WallGrid {
    /// Create a grid with every wall present
    pub fn new(width: usize, height: usize) -> Self {
        WallGrid {
            width,
            height,
            horiz: vec![vec![true; width]; height],
            vert: vec![vec![true; width]; height],
        }
    }

    /// Whether `wall` separates two cells of this grid (as opposed to being
    /// part of the outer boundary)
    pub fn is_interior(&self, wall: WallId) -> bool {
        let (a, b) = wall.cells();
        self.contains(a) && self.contains(b)
    }

    /// Whether `wall` is present. Boundary walls are always present.
    pub fn is_present(&self, wall: WallId) -> bool {
        if !self.is_interior(wall) {
            return true;
        }
        let Point { x, y } = wall.cell;
        match wall.orientation {
            Orientation::Horizontal => self.horiz[y][x],
            Orientation::Vertical => self.vert[y][x],
        }
    }

    /// Set or clear an interior wall.
    ///
    /// # Panics
    /// If `wall` is on the outer boundary.
    pub fn set(&mut self, wall: WallId, present: bool) {
        assert!(
            self.is_interior(wall),
            "wall {wall:?} is not inside the {}x{} grid",
            self.width,
            self.height
        );
        let Point { x, y } = wall.cell;
        match wall.orientation {
            Orientation::Horizontal => self.horiz[y][x] = present,
            Orientation::Vertical => self.vert[y][x] = present,
        }
    }

    pub fn open(&mut self, wall: WallId) {
        self.set(wall, false)
    }

    pub fn close(&mut self, wall: WallId) {
        self.set(wall, true)
    }

    /// All walls that separate two cells
    pub fn interior_walls(&self) -> impl Iterator<Item = WallId> + '_ {
        self.cells().flat_map(move |Point { x, y }| {
            [WallId::horizontal(x, y), WallId::vertical(x, y)]
                .into_iter()
                .filter(move |&wall| self.is_interior(wall))
        })
    }

    /// Number of interior walls that have been knocked down
    pub fn open_wall_count(&self) -> usize {
        self.interior_walls()
            .filter(|&wall| !self.is_present(wall))
            .count()
    }

    /// Every cell, column by column (`x` outer, `y` inner)
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| Point { x, y }))
    }
}

impl WallSource for WallGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn has_wall(&self, at: Point, dir: Direction) -> bool {
        match WallId::of(at, dir) {
            Some(wall) => self.is_present(wall),
            None => true,
        }
    }
}

/// ASCII drawing with north at the top
impl fmt::Display for WallGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let top = self.has_wall(Point::new(x, y), Direction::North);
                write!(f, "+{}", if top { "---" } else { "   " })?;
            }
            writeln!(f, "+")?;
            for x in 0..self.width {
                let left = self.has_wall(Point::new(x, y), Direction::West);
                write!(f, "{}   ", if left { '|' } else { ' ' })?;
            }
            writeln!(f, "|")?;
        }
        for _ in 0..self.width {
            write!(f, "+---")?;
        }
        writeln!(f, "+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_fully_walled() {
        let grid = WallGrid::new(3, 2);
        assert_eq!(grid.open_wall_count(), 0);
        for p in grid.cells() {
            assert_eq!(grid.cell_walls(p), CellWalls::CLOSED);
        }
        // 2 vertical per row * 2 rows + 3 horizontal between the rows
        assert_eq!(grid.interior_walls().count(), 7);
    }

    #[test]
    fn opening_a_wall_is_seen_from_both_cells() {
        let mut grid = WallGrid::new(3, 3);
        grid.open(WallId::vertical(1, 1));
        assert!(!grid.has_wall(Point::new(1, 1), Direction::East));
        assert!(!grid.has_wall(Point::new(2, 1), Direction::West));

        grid.open(WallId::horizontal(0, 1));
        assert!(!grid.has_wall(Point::new(0, 1), Direction::North));
        assert!(!grid.has_wall(Point::new(0, 2), Direction::South));
        assert_eq!(grid.open_wall_count(), 2);
    }

    #[test]
    fn boundary_walls_are_always_present() {
        let grid = WallGrid::new(4, 4);
        assert!(grid.has_wall(Point::new(0, 0), Direction::South));
        assert!(grid.has_wall(Point::new(0, 0), Direction::West));
        assert!(grid.has_wall(Point::new(3, 2), Direction::East));
        assert!(grid.has_wall(Point::new(2, 3), Direction::North));
        assert!(grid.is_present(WallId::vertical(3, 0)));
        assert!(!grid.is_interior(WallId::horizontal(1, 3)));
    }

    #[test]
    #[should_panic]
    fn boundary_walls_cannot_be_opened() {
        let mut grid = WallGrid::new(4, 4);
        grid.open(WallId::vertical(3, 1));
    }

    #[test]
    fn wall_between_adjacent_cells() {
        assert_eq!(
            WallId::between(Point::new(2, 3), Point::new(2, 4)),
            Some(WallId::horizontal(2, 3))
        );
        assert_eq!(
            WallId::between(Point::new(2, 3), Point::new(1, 3)),
            Some(WallId::vertical(1, 3))
        );
        assert_eq!(WallId::between(Point::new(0, 0), Point::new(1, 1)), None);
    }

    #[test]
    fn turning_cycles_through_all_headings() {
        let mut dir = Direction::North;
        for expected in [
            Direction::East,
            Direction::South,
            Direction::West,
            Direction::North,
        ] {
            dir = dir.turn_right();
            assert_eq!(dir, expected);
        }
        assert_eq!(Direction::North.turn_left(), Direction::West);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }

    #[test]
    fn neighbor_respects_bounds() {
        let grid = WallGrid::new(2, 2);
        assert_eq!(grid.neighbor(Point::new(0, 0), Direction::South), None);
        assert_eq!(grid.neighbor(Point::new(1, 0), Direction::East), None);
        assert_eq!(
            grid.neighbor(Point::new(0, 0), Direction::North),
            Some(Point::new(0, 1))
        );
    }

    #[test]
    fn render_closed_grid() {
        let grid = WallGrid::new(2, 1);
        assert_eq!(grid.to_string(), "+---+---+\n|   |   |\n+---+---+\n");
    }
}
