use std::fs::File;
use std::io::{BufRead, BufReader};

use tracing::debug;

use crate::algorithm::Algorithm;
use crate::common::Position;
use crate::error::MazeFileError;
use crate::map::Grid;
use crate::solver::Problem;

const DIMENSION_RANGE: std::ops::RangeInclusive<usize> = 5..=50;

/// Maze in the text format:
///
/// ```text
/// [rows,cols]
/// (startX,startY)
/// (gX,gY)|(gX,gY)|...
/// (x,y,a,b)        one wall rectangle per line
/// ```
///
/// A wall rectangle covers `(x + i, y + j)` for `i < a`, `j < b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeFile {
    pub rows: usize,
    pub cols: usize,
    pub start: Position,
    pub goals: Vec<Position>,
    pub walls: Vec<Position>,
}

impl MazeFile {
    pub fn from_file(path: &str) -> Result<Self, MazeFileError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        let maze = Self::parse(lines.iter().map(String::as_str))?;
        debug!(
            "loaded maze {path}: {}x{}, {} goal(s), {} wall cell(s)",
            maze.rows,
            maze.cols,
            maze.goals.len(),
            maze.walls.len()
        );
        Ok(maze)
    }

    pub fn parse_str(content: &str) -> Result<Self, MazeFileError> {
        Self::parse(content.lines())
    }

    fn parse<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Self, MazeFileError> {
        let mut lines = lines.enumerate().map(|(index, line)| (index + 1, line));

        let (line, size) = next_line(&mut lines, 1, "size")?;
        let [rows, cols] = numbers::<2>(line, size)?;
        for dimension in [rows, cols] {
            if !DIMENSION_RANGE.contains(&dimension) {
                return Err(MazeFileError::DimensionOutOfRange(dimension));
            }
        }

        let (line, start) = next_line(&mut lines, 2, "start")?;
        let [start_x, start_y] = numbers::<2>(line, start)?;

        let (line, goals) = next_line(&mut lines, 3, "goals")?;
        let goals = goals
            .split('|')
            .map(|part| numbers::<2>(line, part).map(|[x, y]| (x, y)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut walls = Vec::new();
        for (line, block) in lines.filter(|(_, line)| !line.trim().is_empty()) {
            let [x, y, width, height] = numbers::<4>(line, block)?;
            let fits = |origin: usize, extent: usize, limit: usize| {
                origin
                    .checked_add(extent)
                    .is_some_and(|end| origin < limit && end <= limit)
            };
            if !fits(x, width, cols) || !fits(y, height, rows) {
                return Err(MazeFileError::Malformed {
                    line,
                    reason: format!(
                        "wall ({x},{y},{width},{height}) does not fit in a {rows}x{cols} maze"
                    ),
                });
            }
            for i in 0..width {
                for j in 0..height {
                    walls.push((x + i, y + j));
                }
            }
        }

        Ok(MazeFile {
            rows,
            cols,
            start: (start_x, start_y),
            goals,
            walls,
        })
    }

    pub fn grid(&self) -> Result<Grid, MazeFileError> {
        Ok(Grid::from_walls(self.rows, self.cols, self.walls.iter().copied())?)
    }

    pub fn into_problem(
        self,
        algorithm: Algorithm,
        depth_limit: Option<usize>,
    ) -> Result<Problem, MazeFileError> {
        let grid = self.grid()?;
        Ok(Problem::new(
            grid,
            self.start,
            self.goals,
            algorithm,
            depth_limit,
        )?)
    }
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    line: usize,
    what: &str,
) -> Result<(usize, &'a str), MazeFileError> {
    lines.next().ok_or_else(|| MazeFileError::Malformed {
        line,
        reason: format!("missing {what} line"),
    })
}

/// Exactly `N` unsigned integers found in `text`, ignoring any punctuation.
fn numbers<const N: usize>(line: usize, text: &str) -> Result<[usize; N], MazeFileError> {
    let values = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<usize>().map_err(|err| MazeFileError::Malformed {
                line,
                reason: format!("bad number '{token}': {err}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    values.try_into().map_err(|values: Vec<usize>| MazeFileError::Malformed {
        line,
        reason: format!("expected {N} numbers in '{}', found {}", text.trim(), values.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_read_maze_file() {
        let maze = MazeFile::from_file("maze_file/sample.txt").unwrap();

        assert_eq!(maze.rows, 5);
        assert_eq!(maze.cols, 11);
        assert_eq!(maze.start, (0, 1));
        assert_eq!(maze.goals, vec![(7, 0), (10, 3)]);
        assert_eq!(maze.walls.len(), 15);
        assert!(maze.walls.contains(&(2, 0)));
        assert!(maze.walls.contains(&(3, 1)));

        let grid = maze.grid().unwrap();
        assert!(!grid.is_walkable((2, 0)));
        assert!(grid.is_walkable((0, 1)));
    }

    #[test]
    fn test_wall_rectangle_extent() {
        let maze = MazeFile::parse_str("[5,5]\n(0,0)\n(4,4)\n(1,2,2,3)\n").unwrap();
        assert_eq!(
            maze.walls,
            vec![(1, 2), (1, 3), (1, 4), (2, 2), (2, 3), (2, 4)]
        );
    }

    #[test]
    fn test_dimension_out_of_range() {
        assert!(matches!(
            MazeFile::parse_str("[4,10]\n(0,0)\n(1,1)\n"),
            Err(MazeFileError::DimensionOutOfRange(4))
        ));
        assert!(matches!(
            MazeFile::parse_str("[10,51]\n(0,0)\n(1,1)\n"),
            Err(MazeFileError::DimensionOutOfRange(51))
        ));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            MazeFile::parse_str("[5,5]\n(0,0)\n"),
            Err(MazeFileError::Malformed { line: 3, .. })
        ));
        assert!(matches!(
            MazeFile::parse_str("[5,5]\n(0)\n(1,1)\n"),
            Err(MazeFileError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            MazeFile::parse_str("[5,5]\n(0,0)\n(1,1)\n(1,1,1)\n"),
            Err(MazeFileError::Malformed { line: 4, .. })
        ));
    }

    #[test]
    fn test_wall_outside_grid() {
        for wall in [
            "(4,4,2,1)",
            "(5,0,1,1)",
            "(18446744073709551615,0,2,1)",
            "(0,18446744073709551615,1,1)",
            "(0,0,4000000000,4000000000)",
        ] {
            let content = format!("[5,5]\n(0,0)\n(1,1)\n(0,0,1,1)\n{wall}\n");
            assert!(
                matches!(
                    MazeFile::parse_str(&content),
                    Err(MazeFileError::Malformed { line: 5, .. })
                ),
                "{wall}"
            );
        }

        let maze = MazeFile::parse_str("[5,5]\n(0,0)\n(1,1)\n(3,4,2,1)\n").unwrap();
        assert_eq!(maze.walls, vec![(3, 4), (4, 4)]);
    }

    #[test]
    fn test_into_problem_validates_positions() {
        let maze = MazeFile::parse_str("[5,5]\n(0,0)\n(2,2)\n(2,2,1,1)\n").unwrap();
        assert!(matches!(
            maze.into_problem(Algorithm::Bfs, None),
            Err(MazeFileError::Invalid(ValidationError::GoalIsWall { index: 0, .. }))
        ));
    }
}
