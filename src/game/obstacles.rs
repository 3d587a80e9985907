//! Maze (level 3) obstacle layout.
//!
//! Computed from the grid dimensions on demand, never stored: two horizontal
//! bars around the vertical centre plus an L-shaped wall in every corner.

use super::types::{Grid, Position};
use crate::core::constants::*;
use std::collections::HashSet;

/// All obstacle cells for the maze level on the given grid.
pub fn maze_obstacles(grid: Grid) -> HashSet<Position> {
    let mut cells = HashSet::new();
    let center = grid.center();

    // Horizontal bars
    let bar_width = (grid.width as f64 * OBSTACLE_BAR_WIDTH_RATIO).floor() as i32;
    let bar_start = (grid.width - bar_width) / 2;
    for row in [
        center.y - OBSTACLE_BAR_ROW_OFFSET,
        center.y + OBSTACLE_BAR_ROW_OFFSET,
    ] {
        for x in bar_start..bar_start + bar_width {
            cells.insert(Position::new(x, row));
        }
    }

    // Corner L walls: (corner cell, horizontal step, vertical step)
    let inset = OBSTACLE_CORNER_INSET;
    let right = grid.width - 1 - inset;
    let bottom = grid.height - 1 - inset;
    let corners = [
        (Position::new(inset, inset), 1, 1),
        (Position::new(right, inset), -1, 1),
        (Position::new(inset, bottom), 1, -1),
        (Position::new(right, bottom), -1, -1),
    ];
    for (corner, step_x, step_y) in corners {
        for i in 0..OBSTACLE_CORNER_ARM_X {
            cells.insert(Position::new(corner.x + i * step_x, corner.y));
        }
        for i in 0..OBSTACLE_CORNER_ARM_Y {
            cells.insert(Position::new(corner.x, corner.y + i * step_y));
        }
    }

    cells.retain(|&p| grid.contains(p));
    cells
}
