//! Maze generation
//!
//! Mazes are grown from the start cell with randomized Prim's algorithm,
//! which yields a spanning tree of the grid. Two competition rules are then
//! stamped on top: a sealed 2×2 goal region with a single entrance, and a
//! start cell with exactly one open side.

use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use crate::goal::GoalRegion;
use crate::walls::{Orientation, Point, WallGrid, WallId};

/// Errors from maze generation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Grid too small to hold a start cell and a goal region
    #[error("maze must be at least 2x2, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Goal region would touch or cross the outer boundary
    #[error("goal region at {origin} does not fit strictly inside a {width}x{height} maze")]
    GoalOutOfBounds {
        origin: Point,
        width: usize,
        height: usize,
    },
    /// Every candidate was disconnected by the overlays
    #[error("no connected maze found in {attempts} attempts")]
    AttemptsExhausted { attempts: usize },
}

/// A wall between two adjacent cells considered for removal
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct CandidateWall {
    /// South or west cell
    pub a: Point,
    /// North or east cell
    pub b: Point,
    pub orientation: Orientation,
}

impl CandidateWall {
    pub fn wall(&self) -> WallId {
        WallId {
            cell: self.a,
            orientation: self.orientation,
        }
    }
}

/// Maze generator with an injected random source
pub struct MazeGenerator<R = StdRng> {
    random: R,
}

impl MazeGenerator<StdRng> {
    /// Generator seeded with `seed`, or from system entropy
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }
}

impl<R: Rng> MazeGenerator<R> {
    pub fn with_rng(random: R) -> Self {
        Self { random }
    }

    /// Check that a `width` × `height` maze with `goal` can be generated
    pub fn check_layout(
        width: usize,
        height: usize,
        goal: &GoalRegion,
    ) -> Result<(), GenerationError> {
        if width < 2 || height < 2 {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        if !goal.fits(width, height) {
            return Err(GenerationError::GoalOutOfBounds {
                origin: goal.origin(),
                width,
                height,
            });
        }
        Ok(())
    }

    /// Build one candidate maze: spanning tree plus both overlays.
    ///
    /// The result is not guaranteed to be connected, since sealing the goal
    /// region can cut off cells. See [crate::controller::generate_connected].
    pub fn generate_candidate(
        &mut self,
        width: usize,
        height: usize,
        goal: &GoalRegion,
    ) -> Result<WallGrid, GenerationError> {
        Self::check_layout(width, height, goal)?;

        let mut grid = self.spanning_tree(width, height);
        self.carve_goal_region(&mut grid, goal);
        self.carve_start_cell(&mut grid);
        Ok(grid)
    }

    /// Randomized Prim's algorithm over the walls of the grid.
    ///
    /// Growth starts from `(0, 0)`. Knocks down exactly `width * height - 1`
    /// walls, leaving a perfect maze.
    pub fn spanning_tree(&mut self, width: usize, height: usize) -> WallGrid {
        let mut grid = WallGrid::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }
        let mut visited = vec![vec![false; width]; height];
        let mut frontier: Vec<CandidateWall> = Vec::new();

        visited[0][0] = true;
        Self::add_frontier(Point::new(0, 0), width, height, &visited, &mut frontier);

        while !frontier.is_empty() {
            let idx = self.random.gen_range(0..frontier.len());
            let candidate = frontier.swap_remove(idx);
            let (a, b) = (candidate.a, candidate.b);

            // Joining two visited cells would close a loop
            if visited[a.y][a.x] == visited[b.y][b.x] {
                continue;
            }
            grid.open(candidate.wall());
            let reached = if visited[a.y][a.x] { b } else { a };
            visited[reached.y][reached.x] = true;
            Self::add_frontier(reached, width, height, &visited, &mut frontier);
        }
        grid
    }

    /// Push the walls between `p` and its unvisited neighbours
    fn add_frontier(
        p: Point,
        width: usize,
        height: usize,
        visited: &[Vec<bool>],
        frontier: &mut Vec<CandidateWall>,
    ) {
        let Point { x, y } = p;
        let mut push = |a: Point, b: Point, orientation| {
            let other = if a == p { b } else { a };
            if !visited[other.y][other.x] {
                frontier.push(CandidateWall { a, b, orientation });
            }
        };
        if x > 0 {
            push(Point::new(x - 1, y), p, Orientation::Vertical);
        }
        if x + 1 < width {
            push(p, Point::new(x + 1, y), Orientation::Vertical);
        }
        if y > 0 {
            push(Point::new(x, y - 1), p, Orientation::Horizontal);
        }
        if y + 1 < height {
            push(p, Point::new(x, y + 1), Orientation::Horizontal);
        }
    }

    /// Open the goal block, seal its perimeter and open one random entrance
    pub fn carve_goal_region(&mut self, grid: &mut WallGrid, goal: &GoalRegion) {
        for wall in goal.interior_walls() {
            grid.open(wall);
        }
        let perimeter = goal.perimeter();
        for wall in perimeter {
            grid.close(wall);
        }
        let entrance = perimeter[self.random.gen_range(0..perimeter.len())];
        grid.open(entrance);
    }

    /// Leave the start cell with a single open side, north or east
    pub fn carve_start_cell(&mut self, grid: &mut WallGrid) {
        let north = WallId::horizontal(0, 0);
        let east = WallId::vertical(0, 0);
        if self.random.gen_bool(0.5) {
            grid.close(north);
            grid.open(east);
        } else {
            grid.open(north);
            grid.close(east);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;
    use crate::validator::is_fully_connected;
    use crate::walls::WallSource;

    #[test]
    fn spanning_tree_is_perfect() {
        for seed in 0..20 {
            let mut gen = MazeGenerator::new(Some(seed));
            let grid = gen.spanning_tree(10, 10);
            assert_eq!(grid.open_wall_count(), 99, "seed {seed}");
            assert!(is_fully_connected(&grid, Point::new(0, 0)), "seed {seed}");
        }
    }

    #[test]
    fn spanning_tree_on_non_square_grids() {
        let mut gen = MazeGenerator::new(Some(7));
        for (w, h) in [(2, 2), (2, 9), (13, 3), (1, 5)] {
            let grid = gen.spanning_tree(w, h);
            assert_eq!(grid.open_wall_count(), w * h - 1, "{w}x{h}");
            assert!(is_fully_connected(&grid, Point::new(0, 0)), "{w}x{h}");
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = MazeGenerator::new(Some(42)).spanning_tree(10, 10);
        let b = MazeGenerator::new(Some(42)).spanning_tree(10, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn injected_rng_is_used() {
        let mut gen = MazeGenerator::with_rng(StdRng::seed_from_u64(3));
        let grid = gen.spanning_tree(5, 5);
        assert_eq!(grid, MazeGenerator::new(Some(3)).spanning_tree(5, 5));
    }

    #[test]
    fn candidate_has_goal_and_start_overlays() {
        let goal = GoalRegion::centered(10, 10);
        for seed in 0..50 {
            let mut gen = MazeGenerator::new(Some(seed));
            let grid = gen.generate_candidate(10, 10, &goal).unwrap();

            assert!(goal.interior_walls().iter().all(|&w| !grid.is_present(w)));
            let entrances = goal
                .perimeter()
                .iter()
                .filter(|&&w| !grid.is_present(w))
                .count();
            assert_eq!(entrances, 1, "seed {seed}");
            assert_eq!(grid.cell_walls(Point::new(0, 0)).open_sides(), 1);
        }
    }

    #[test]
    fn start_cell_opens_north_or_east() {
        let mut seen = (false, false);
        let mut gen = MazeGenerator::new(Some(11));
        for _ in 0..40 {
            let mut grid = WallGrid::new(3, 3);
            gen.carve_start_cell(&mut grid);
            let walls = grid.cell_walls(Point::new(0, 0));
            assert_ne!(walls.north, walls.east);
            assert!(walls.south && walls.west);
            if walls.north {
                seen.0 = true;
            } else {
                seen.1 = true;
            }
        }
        assert_eq!(seen, (true, true));
    }

    #[test]
    fn rejects_bad_layouts() {
        let mut gen = MazeGenerator::new(Some(0));
        assert_eq!(
            gen.generate_candidate(1, 10, &GoalRegion::centered(1, 10)),
            Err(GenerationError::InvalidDimensions {
                width: 1,
                height: 10
            })
        );
        assert!(matches!(
            gen.generate_candidate(3, 3, &GoalRegion::centered(3, 3)),
            Err(GenerationError::GoalOutOfBounds { .. })
        ));
        assert!(matches!(
            gen.generate_candidate(10, 10, &GoalRegion::at(Point::new(8, 8))),
            Err(GenerationError::GoalOutOfBounds { .. })
        ));
    }
}
