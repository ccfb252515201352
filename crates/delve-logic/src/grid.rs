//! Occupancy grid over dungeon cells.
//!
//! A cell is occupied when a room stands on it or a connector has claimed it
//! as its forward exit. The center cell is always occupied by the start room.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Square boolean occupancy map, indexed `[x][z]` in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonGrid {
    size: i32,
    cells: Vec<bool>,
}

impl DungeonGrid {
    /// A fresh grid with only the center occupied.
    pub fn new(size: u32) -> Self {
        let mut grid = Self {
            size: 0,
            cells: Vec::new(),
        };
        grid.reset(size);
        grid
    }

    /// Clear every cell, resize, and re-mark the center.
    pub fn reset(&mut self, size: u32) {
        self.size = size as i32;
        self.cells = vec![false; (size * size) as usize];
        let (cx, cz) = self.center();
        self.occupy(cx, cz);
    }

    pub fn size(&self) -> u32 {
        self.size as u32
    }

    /// Center cell; the start room always sits here.
    pub fn center(&self) -> (i32, i32) {
        (self.size / 2, self.size / 2)
    }

    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && x < self.size && z >= 0 && z < self.size
    }

    /// Strictly inside the grid, not on its border.
    pub fn is_interior(&self, x: i32, z: i32) -> bool {
        x > 0 && x < self.size - 1 && z > 0 && z < self.size - 1
    }

    /// Whether a cell is claimed. Cells outside the grid report `false`;
    /// check [`in_bounds`](Self::in_bounds) first.
    pub fn is_occupied(&self, x: i32, z: i32) -> bool {
        self.index(x, z).is_some_and(|i| self.cells[i])
    }

    /// Mark a cell as claimed. Returns `false` if the cell is off the grid.
    pub fn occupy(&mut self, x: i32, z: i32) -> bool {
        match self.index(x, z) {
            Some(i) => {
                self.cells[i] = true;
                true
            }
            None => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if self.in_bounds(x, z) {
            Some((x * self.size + z) as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for DungeonGrid {
    /// North is drawn at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for z in (0..self.size).rev() {
            for x in 0..self.size {
                let c = if self.is_occupied(x, z) { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
