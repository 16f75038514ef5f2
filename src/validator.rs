//! Connectivity check for generated and loaded mazes

use std::collections::VecDeque;

use crate::walls::{Direction, Point, WallSource};

/// Cells reachable from `start` without crossing a wall, as `[y][x]`.
///
/// Breadth-first; every cell is queued at most once.
pub fn reachable<M: WallSource + ?Sized>(maze: &M, start: Point) -> Vec<Vec<bool>> {
    let mut seen = vec![vec![false; maze.width()]; maze.height()];
    if !maze.contains(start) {
        return seen;
    }
    let mut queue = VecDeque::from([start]);
    seen[start.y][start.x] = true;

    while let Some(cell) = queue.pop_front() {
        for dir in Direction::ALL {
            if maze.has_wall(cell, dir) {
                continue;
            }
            if let Some(next) = maze.neighbor(cell, dir) {
                if !seen[next.y][next.x] {
                    seen[next.y][next.x] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    seen
}

/// Number of cells reachable from `start`
pub fn reachable_count<M: WallSource + ?Sized>(maze: &M, start: Point) -> usize {
    reachable(maze, start)
        .iter()
        .flatten()
        .filter(|&&seen| seen)
        .count()
}

/// Whether every cell of the maze can be reached from `start`
pub fn is_fully_connected<M: WallSource + ?Sized>(maze: &M, start: Point) -> bool {
    reachable_count(maze, start) == maze.width() * maze.height()
}
