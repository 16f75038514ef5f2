//! Generate-and-validate loop
//!
//! The goal-region overlay may cut cells off from the start. Such candidates
//! are thrown away whole and a new spanning tree is grown; a disconnected
//! candidate is never patched.

use rand::Rng;

use crate::goal::GoalRegion;
use crate::maze_generator::{GenerationError, MazeGenerator};
use crate::validator::is_fully_connected;
use crate::walls::{Point, WallGrid};

/// Default cap on generation attempts
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Settings for producing a competition maze
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    pub width: usize,
    pub height: usize,
    /// Goal region; centered when `None`
    pub goal: Option<GoalRegion>,
    /// Give up after this many candidates; retry forever when `None`
    pub max_attempts: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            width: 10,
            height: 10,
            goal: None,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
        }
    }
}

impl GenerationConfig {
    pub fn goal(&self) -> GoalRegion {
        self.goal
            .unwrap_or_else(|| GoalRegion::centered(self.width, self.height))
    }
}

/// A maze that passed validation
#[derive(Clone, Debug)]
pub struct GeneratedMaze {
    pub walls: WallGrid,
    pub goal: GoalRegion,
    /// Number of candidates built, including the accepted one
    pub attempts: usize,
}

/// Build candidates until one is fully connected from `(0, 0)`
pub fn generate_connected<R: Rng>(
    generator: &mut MazeGenerator<R>,
    config: &GenerationConfig,
) -> Result<GeneratedMaze, GenerationError> {
    let goal = config.goal();
    MazeGenerator::<R>::check_layout(config.width, config.height, &goal)?;

    let mut attempts = 0;
    loop {
        if config.max_attempts.is_some_and(|max| attempts >= max) {
            tracing::warn!(attempts, "giving up on maze generation");
            return Err(GenerationError::AttemptsExhausted { attempts });
        }
        attempts += 1;

        let walls = generator.generate_candidate(config.width, config.height, &goal)?;
        if is_fully_connected(&walls, Point::new(0, 0)) {
            tracing::debug!(attempts, "accepted connected maze");
            return Ok(GeneratedMaze {
                walls,
                goal,
                attempts,
            });
        }
        tracing::debug!(attempt = attempts, "candidate disconnected, regenerating");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walls::WallSource;

    #[test]
    fn generated_mazes_satisfy_all_rules() {
        let config = GenerationConfig::default();
        for seed in 0..100 {
            let mut gen = MazeGenerator::new(Some(seed));
            let maze = generate_connected(&mut gen, &config).unwrap();
            let grid = &maze.walls;

            assert!(maze
                .goal
                .interior_walls()
                .iter()
                .all(|&w| !grid.is_present(w)));
            let entrances = maze
                .goal
                .perimeter()
                .iter()
                .filter(|&&w| !grid.is_present(w))
                .count();
            assert_eq!(entrances, 1, "seed {seed}");
            assert_eq!(grid.cell_walls(Point::new(0, 0)).open_sides(), 1);
            assert!(is_fully_connected(grid, Point::new(0, 0)));
            assert!(maze.attempts >= 1);
        }
    }

    #[test]
    fn other_sizes_and_goal_positions() {
        let config = GenerationConfig {
            width: 7,
            height: 5,
            goal: Some(GoalRegion::at(Point::new(1, 2))),
            max_attempts: None,
        };
        let mut gen = MazeGenerator::new(Some(1));
        let maze = generate_connected(&mut gen, &config).unwrap();
        assert_eq!(maze.walls.width(), 7);
        assert_eq!(maze.walls.height(), 5);
        assert!(is_fully_connected(&maze.walls, Point::new(0, 0)));
    }

    #[test]
    fn zero_attempt_cap_fails() {
        let config = GenerationConfig {
            max_attempts: Some(0),
            ..Default::default()
        };
        let mut gen = MazeGenerator::new(Some(0));
        assert_eq!(
            generate_connected(&mut gen, &config).unwrap_err(),
            GenerationError::AttemptsExhausted { attempts: 0 }
        );
    }

    #[test]
    fn invalid_layout_fails_before_generating() {
        let config = GenerationConfig {
            width: 10,
            height: 1,
            ..Default::default()
        };
        let mut gen = MazeGenerator::new(Some(0));
        assert!(matches!(
            generate_connected(&mut gen, &config),
            Err(GenerationError::InvalidDimensions { .. })
        ));
    }
}
