//! `.maz` maze files
//!
//! One line per cell, `x y n e s w`, where each of the last four fields is
//! `1` if that side of the cell is walled and `0` if it is open. Directions
//! are absolute and boundary walls are written out explicitly.
//!
//! When reading, cells that are not listed are treated as fully walled, and
//! if a cell is listed more than once the last line wins.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;

use crate::walls::{CellWalls, Direction, Point, WallSource};

/// Errors from reading or writing maze files
#[derive(Debug, Error)]
pub enum MazeFileError {
    #[error("cannot access maze file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: expected 6 fields `x y n e s w`, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: invalid value `{value}`")]
    InvalidValue { line: usize, value: String },
    #[error("line {line}: cell ({x},{y}) is outside the {width}x{height} maze")]
    OutOfRange {
        line: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Per-cell walls as read from a maze file
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MazeLayout {
    width: usize,
    height: usize,
    /// `cells[y][x]`
    cells: Vec<Vec<CellWalls>>,
}

impl MazeLayout {
    /// Layout of `width` × `height` cells, all fully walled
    pub fn closed(width: usize, height: usize) -> Self {
        MazeLayout {
            width,
            height,
            cells: vec![vec![CellWalls::CLOSED; width]; height],
        }
    }

    /// Snapshot of any wall source
    pub fn from_walls<M: WallSource + ?Sized>(maze: &M) -> Self {
        let mut layout = Self::closed(maze.width(), maze.height());
        for y in 0..maze.height() {
            for x in 0..maze.width() {
                layout.cells[y][x] = maze.cell_walls(Point::new(x, y));
            }
        }
        layout
    }

    /// Parse the contents of a maze file for a `width` × `height` maze
    pub fn parse(text: &str, width: usize, height: usize) -> Result<Self, MazeFileError> {
        let mut layout = Self::closed(width, height);

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let fields = line.split_whitespace().collect_vec();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != 6 {
                return Err(MazeFileError::FieldCount {
                    line: line_no,
                    found: fields.len(),
                });
            }

            let coord = |value: &str| {
                value.parse::<usize>().map_err(|_| MazeFileError::InvalidValue {
                    line: line_no,
                    value: value.to_string(),
                })
            };
            let (x, y) = (coord(fields[0])?, coord(fields[1])?);
            if x >= width || y >= height {
                return Err(MazeFileError::OutOfRange {
                    line: line_no,
                    x,
                    y,
                    width,
                    height,
                });
            }

            let mut walls = CellWalls::CLOSED;
            for (dir, value) in Direction::ALL.into_iter().zip(&fields[2..]) {
                let present = match *value {
                    "1" => true,
                    "0" => false,
                    other => {
                        return Err(MazeFileError::InvalidValue {
                            line: line_no,
                            value: other.to_string(),
                        })
                    }
                };
                walls.set(dir, present);
            }
            layout.cells[y][x] = walls;
        }
        Ok(layout)
    }

    /// Read a maze file from disk
    pub fn load(path: &Path, width: usize, height: usize) -> Result<Self, MazeFileError> {
        let text = fs::read_to_string(path).map_err(|source| MazeFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, width, height)
    }

    /// Sides where the two neighbouring cells disagree about a shared wall.
    ///
    /// Each contradiction is reported once, from the south/west cell.
    pub fn inconsistencies(&self) -> Vec<(Point, Direction)> {
        let mut found = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let here = Point::new(x, y);
                for dir in [Direction::North, Direction::East] {
                    if let Some(there) = self.neighbor(here, dir) {
                        if self.has_wall(here, dir) != self.has_wall(there, dir.opposite()) {
                            found.push((here, dir));
                        }
                    }
                }
            }
        }
        found
    }
}

impl WallSource for MazeLayout {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    /// Wall as stored for this cell; anything outside the maze is walled
    fn has_wall(&self, at: Point, dir: Direction) -> bool {
        if !self.contains(at) {
            return true;
        }
        self.cells[at.y][at.x].get(dir)
    }
}

/// Lines of the `.maz` representation of `maze`, column by column
pub fn maz_lines<M: WallSource + ?Sized>(maze: &M) -> impl Iterator<Item = String> + '_ {
    (0..maze.width())
        .cartesian_product(0..maze.height())
        .map(move |(x, y)| {
            let walls = maze.cell_walls(Point::new(x, y));
            let bits = Direction::ALL
                .into_iter()
                .map(|dir| u8::from(walls.get(dir)))
                .join(" ");
            format!("{x} {y} {bits}")
        })
}

/// Write `maze` in `.maz` format
pub fn write_maze<M: WallSource + ?Sized, W: Write>(maze: &M, out: &mut W) -> io::Result<()> {
    for line in maz_lines(maze) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// `.maz` text for `maze`
pub fn to_maz_string<M: WallSource + ?Sized>(maze: &M) -> String {
    maz_lines(maze).map(|line| line + "\n").collect()
}

/// Write `maze` to `path`, replacing any existing file
pub fn save_maze<M: WallSource + ?Sized>(maze: &M, path: &Path) -> Result<(), MazeFileError> {
    fs::write(path, to_maz_string(maze)).map_err(|source| MazeFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{generate_connected, GenerationConfig};
    use crate::maze_generator::MazeGenerator;
    use crate::walls::{WallGrid, WallId};

    fn sample_grid() -> WallGrid {
        let mut gen = MazeGenerator::new(Some(2024));
        generate_connected(&mut gen, &GenerationConfig::default())
            .unwrap()
            .walls
    }

    #[test]
    fn writes_one_line_per_cell_with_boundaries() {
        let mut grid = WallGrid::new(2, 2);
        grid.open(WallId::vertical(0, 0));
        let text = to_maz_string(&grid);
        assert_eq!(
            text,
            "0 0 1 0 1 1\n0 1 1 1 1 1\n1 0 1 1 1 0\n1 1 1 1 1 1\n"
        );
    }

    #[test]
    fn round_trip_preserves_every_cell() {
        let grid = sample_grid();
        let layout = MazeLayout::parse(&to_maz_string(&grid), 10, 10).unwrap();
        for p in grid.cells() {
            assert_eq!(layout.cell_walls(p), grid.cell_walls(p), "cell {p}");
        }
        assert_eq!(layout, MazeLayout::from_walls(&grid));
    }

    #[test]
    fn exported_walls_agree_from_both_sides() {
        let grid = sample_grid();
        let layout = MazeLayout::parse(&to_maz_string(&grid), 10, 10).unwrap();
        assert!(layout.inconsistencies().is_empty());
    }

    #[test]
    fn detects_one_sided_walls() {
        let text = "0 0 1 0 1 1\n1 0 1 1 1 1\n";
        let layout = MazeLayout::parse(text, 2, 1).unwrap();
        assert_eq!(
            layout.inconsistencies(),
            vec![(Point::new(0, 0), Direction::East)]
        );
    }

    #[test]
    fn missing_cells_are_closed() {
        let layout = MazeLayout::parse("0 0 0 0 1 1\n", 3, 3).unwrap();
        assert!(!layout.has_wall(Point::new(0, 0), Direction::North));
        assert_eq!(layout.cell_walls(Point::new(2, 2)), CellWalls::CLOSED);
        assert_eq!(layout.cell_walls(Point::new(0, 1)), CellWalls::CLOSED);
    }

    #[test]
    fn blank_lines_skipped_and_last_duplicate_wins() {
        let text = "\n0 0 1 1 1 1\n\n0 0 0 1 1 1\n";
        let layout = MazeLayout::parse(text, 1, 1).unwrap();
        assert!(!layout.has_wall(Point::new(0, 0), Direction::North));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            MazeLayout::parse("0 0 1 1 1\n", 2, 2),
            Err(MazeFileError::FieldCount { line: 1, found: 5 })
        ));
        assert!(matches!(
            MazeLayout::parse("0 0 1 1 1 1\n0 1 1 2 1 1\n", 2, 2),
            Err(MazeFileError::InvalidValue { line: 2, .. })
        ));
        assert!(matches!(
            MazeLayout::parse("a 0 1 1 1 1\n", 2, 2),
            Err(MazeFileError::InvalidValue { line: 1, .. })
        ));
        assert!(matches!(
            MazeLayout::parse("2 0 1 1 1 1\n", 2, 2),
            Err(MazeFileError::OutOfRange { line: 1, x: 2, .. })
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.maz");
        let grid = sample_grid();
        save_maze(&grid, &path).unwrap();
        let layout = MazeLayout::load(&path, 10, 10).unwrap();
        assert_eq!(layout, MazeLayout::from_walls(&grid));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MazeLayout::load(&dir.path().join("nope.maz"), 10, 10).unwrap_err();
        assert!(matches!(err, MazeFileError::Io { .. }));
    }
}
