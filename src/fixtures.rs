//! Hand-built mazes shared by the tests

use crate::walls::{WallGrid, WallId};

/// 10×10 maze whose only passages form an L: up column 0 from the start to
/// `(0,4)`, then east along row 4 into the goal cell `(4,4)`
pub fn l_corridor() -> WallGrid {
    let mut grid = WallGrid::new(10, 10);
    for y in 0..4 {
        grid.open(WallId::horizontal(0, y));
    }
    for x in 0..4 {
        grid.open(WallId::vertical(x, 4));
    }
    grid
}

/// Commands that drive a solver through [l_corridor] to the goal and back,
/// with 16 forward moves
pub fn l_corridor_round_trip() -> Vec<&'static str> {
    let mut script = Vec::new();
    script.extend(["moveForward"; 4]);
    script.push("turnRight");
    script.extend(["moveForward"; 4]);
    script.extend(["turnLeft", "turnLeft"]);
    script.extend(["moveForward"; 4]);
    script.push("turnLeft");
    script.extend(["moveForward"; 4]);
    script
}
