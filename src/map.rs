use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::common::Position;
use crate::error::ValidationError;

// Up, left, down, right. Exploration order of every strategy depends on it.
const DIRECTIONS: [(isize, isize); 4] = [(0, -1), (-1, 0), (0, 1), (1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
}

impl Cell {
    pub fn is_passable(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Immutable occupancy grid, stored row-major (`y * cols + x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from a 0/1 matrix, one inner vector per row, `1` marking a wall.
    pub fn from_matrix(matrix: &[Vec<u8>]) -> Result<Self, ValidationError> {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, |row| row.len());
        if rows == 0 || cols == 0 {
            return Err(ValidationError::MalformedGrid(format!(
                "grid must have at least one row and one column, got {rows}x{cols}"
            )));
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (y, row) in matrix.iter().enumerate() {
            if row.len() != cols {
                return Err(ValidationError::MalformedGrid(format!(
                    "row {y} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            for (x, &value) in row.iter().enumerate() {
                let cell = match value {
                    0 => Cell::Empty,
                    1 => Cell::Wall,
                    other => {
                        return Err(ValidationError::MalformedGrid(format!(
                            "cell ({x}, {y}) has value {other}, expected 0 or 1"
                        )))
                    }
                };
                cells.push(cell);
            }
        }

        let walls = cells.iter().filter(|cell| !cell.is_passable()).count();
        debug!("grid {rows}x{cols} with {walls} wall cell(s)");
        Ok(Grid { rows, cols, cells })
    }

    /// Builds a `rows x cols` grid with the given wall cells.
    pub fn from_walls(
        rows: usize,
        cols: usize,
        walls: impl IntoIterator<Item = Position>,
    ) -> Result<Self, ValidationError> {
        if rows == 0 || cols == 0 {
            return Err(ValidationError::MalformedGrid(format!(
                "grid must have at least one row and one column, got {rows}x{cols}"
            )));
        }

        let mut grid = Grid {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        };
        for wall in walls {
            let index = grid.index(wall).ok_or_else(|| {
                ValidationError::MalformedGrid(format!("wall {wall:?} lies outside the grid"))
            })?;
            grid.cells[index] = Cell::Wall;
        }

        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, (x, y): Position) -> bool {
        x < self.cols && y < self.rows
    }

    pub fn index(&self, position: Position) -> Option<usize> {
        self.in_bounds(position)
            .then(|| position.1 * self.cols + position.0)
    }

    pub fn position(&self, index: usize) -> Position {
        (index % self.cols, index / self.cols)
    }

    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.index(position).map(|index| self.cells[index])
    }

    /// False for out-of-bounds positions and walls.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(|cell| cell.is_passable())
    }

    /// Walkable 4-neighbors of `position`, always in up, left, down, right order.
    pub fn neighbors(&self, (x, y): Position) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(DIRECTIONS.len());

        for &(dx, dy) in &DIRECTIONS {
            let (Some(new_x), Some(new_y)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
            else {
                continue;
            };
            if self.is_walkable((new_x, new_y)) {
                neighbors.push((new_x, new_y));
            }
        }

        neighbors
    }

    /// Every position reachable from `start`, `start` included when walkable.
    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        let mut reached = HashSet::new();
        if !self.is_walkable(start) {
            return reached;
        }

        let mut queue = VecDeque::from([start]);
        reached.insert(start);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(current) {
                if reached.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        reached
    }
}
