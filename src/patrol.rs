//! Guard patrol on an obstacle grid.
//!
//! The guard walks straight until the cell ahead is an obstacle, then turns
//! right in place. [`GridSimulator::coverage`] steps one cell at a time;
//! [`GridSimulator::would_loop`] jumps from corner to corner using per-row
//! and per-column sorted obstacle indexes.

use std::ops::Deref;

use bitvec::prelude::*;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use tracing::{debug, info, instrument, trace};

use crate::error::GridError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {Empty, Obstacle, StartingGuard}

impl Cell {
    fn from_char(c: char) -> Option<Cell> {
        match c {'.' => Some(Cell::Empty), '#' => Some(Cell::Obstacle), '^' => Some(Cell::StartingGuard), _ => None}
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {Up, Right, Down, Left}

impl Direction {
    pub fn turn_right(self) -> Direction {
        match self {
            Direction::Up => Direction::Right, Direction::Right => Direction::Down,
            Direction::Down => Direction::Left, Direction::Left => Direction::Up,
        }
    }
}

/// A guard's cell and facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
    pub dir: Direction,
}

impl Position {
    pub fn turn_right(self) -> Position {
        Position {dir: self.dir.turn_right(), ..self}
    }

    pub fn cell(self) -> (usize, usize) {(self.row, self.col)}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSimulator {
    height: usize,
    width: usize,
    /// row-major
    cells: Vec<Cell>,
    /// For each column, the sorted rows holding an obstacle.
    by_col: Vec<Vec<usize>>,
    /// For each row, the sorted columns holding an obstacle.
    by_row: Vec<Vec<usize>>,
    start: Position,
}

impl GridSimulator {
    /// Trims the puzzle text and builds the board from its lines.
    pub fn parse(input: &str) -> Result<GridSimulator, GridError> {
        GridSimulator::build(input.trim().lines())
    }

    /// Builds the board from equal-width rows of `.`, `#` and exactly one `^`.
    /// The guard starts on the `^` facing up.
    #[instrument(skip_all)]
    pub fn build<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Result<GridSimulator, GridError> {
        let mut cells = vec![];
        let mut width = None;
        let mut height = 0;
        let mut start = None;
        for (row, line) in lines.into_iter().enumerate() {
            let mut found = 0;
            for (col, c) in line.as_ref().chars().enumerate() {
                let cell = Cell::from_char(c).ok_or(GridError::InvalidChar {row, col, found: c})?;
                if cell == Cell::StartingGuard {
                    if let Some(first) = start {
                        return Err(GridError::MultipleGuards {first, second: (row, col)});
                    }
                    start = Some((row, col));
                }
                cells.push(cell);
                found += 1;
            }
            let expected = *width.get_or_insert(found);
            if found != expected {
                return Err(GridError::UnequalWidth {row, expected, found});
            }
            height = row + 1;
        }
        let width = width.unwrap_or(0);
        if height == 0 || width == 0 {return Err(GridError::Empty)}
        let (row, col) = start.ok_or(GridError::NoGuard)?;

        // row-major scan pushes both indexes in ascending order
        let mut by_col = vec![vec![]; width];
        let mut by_row = vec![vec![]; height];
        for (ix, &cell) in cells.iter().enumerate() {
            if cell == Cell::Obstacle {
                by_col[ix % width].push(ix / width);
                by_row[ix / width].push(ix % width);
            }
        }
        debug!(height, width, obstacles = by_row.iter().map(Vec::len).sum::<usize>(), "board built");

        Ok(GridSimulator {height, width, cells, by_col, by_row, start: Position {row, col, dir: Direction::Up}})
    }

    pub fn height(&self) -> usize {self.height}
    pub fn width(&self) -> usize {self.width}
    pub fn start(&self) -> Position {self.start}

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.width + col]
    }

    /// The cell one step ahead, or `None` if that step leaves the board.
    fn ahead(&self, pos: Position) -> Option<(usize, usize)> {
        let (row, col) = match pos.dir {
            Direction::Up => (pos.row.checked_sub(1)?, pos.col),
            Direction::Right => (pos.row, pos.col + 1),
            Direction::Down => (pos.row + 1, pos.col),
            Direction::Left => (pos.row, pos.col.checked_sub(1)?),
        };
        (row < self.height && col < self.width).then_some((row, col))
    }

    /// Walks the unmodified patrol one cell at a time and returns every cell
    /// the guard stands on before leaving the board.
    ///
    /// Fails with [`GridError::PatrolLoops`] if a (cell, direction) state
    /// repeats, i.e. the guard would never leave.
    #[instrument(skip(self))]
    pub fn coverage(&self) -> Result<FxHashSet<(usize, usize)>, GridError> {
        let mut seen = bitvec![0; self.height * self.width * 4];
        let mut visited = FxHashSet::default();
        let mut pos = self.start;
        loop {
            let state = (pos.row * self.width + pos.col) * 4 + pos.dir as usize;
            if seen.replace(state, true) {return Err(GridError::PatrolLoops)}
            visited.insert(pos.cell());
            let Some((row, col)) = self.ahead(pos) else {break};
            pos = match self.cell(row, col) {
                Cell::Obstacle => pos.turn_right(),
                _ => Position {row, col, ..pos},
            };
        }
        debug!(cells = visited.len(), "guard left the board");
        Ok(visited)
    }

    /// The cell just before the nearest obstacle strictly ahead, keeping the
    /// facing. `None` if nothing blocks the guard before the edge.
    fn jump(&self, pos: Position) -> Option<Position> {
        let Position {row, col, dir} = pos;
        match dir {
            Direction::Up => {
                let rows = &self.by_col[col];
                let blocker = rows[.. rows.partition_point(|&r| r < row)].last()?;
                Some(Position {row: blocker + 1, ..pos})
            }
            Direction::Down => {
                let rows = &self.by_col[col];
                let blocker = rows.get(rows.partition_point(|&r| r <= row))?;
                Some(Position {row: blocker - 1, ..pos})
            }
            Direction::Left => {
                let cols = &self.by_row[row];
                let blocker = cols[.. cols.partition_point(|&c| c < col)].last()?;
                Some(Position {col: blocker + 1, ..pos})
            }
            Direction::Right => {
                let cols = &self.by_row[row];
                let blocker = cols.get(cols.partition_point(|&c| c <= col))?;
                Some(Position {col: blocker - 1, ..pos})
            }
        }
    }

    /// Jumps corner to corner from the start. A corner seen twice (with the
    /// same facing) means the guard is stuck.
    fn jump_walk_loops(&self) -> bool {
        let mut corners = FxHashSet::default();
        let mut pos = self.start;
        while corners.insert(pos) {
            match self.jump(pos) {
                Some(corner) => pos = corner.turn_right(),
                None => return false,
            }
        }
        true
    }

    /// Places a temporary obstacle that is removed again when the returned
    /// guard is dropped.
    pub fn place_obstacle(&mut self, row: usize, col: usize) -> Result<ExtraObstacle<'_>, GridError> {
        if row >= self.height || col >= self.width {
            return Err(GridError::OutOfBounds {row, col});
        }
        match self.cell(row, col) {
            Cell::StartingGuard => Err(GridError::ObstacleOnStart {row, col}),
            Cell::Obstacle => Err(GridError::AlreadyObstacle {row, col}),
            Cell::Empty => {
                self.insert_obstacle(row, col);
                Ok(ExtraObstacle {board: self, row, col})
            }
        }
    }

    fn insert_obstacle(&mut self, row: usize, col: usize) {
        self.cells[row * self.width + col] = Cell::Obstacle;
        let rows = &mut self.by_col[col];
        rows.insert(rows.partition_point(|&r| r < row), row);
        let cols = &mut self.by_row[row];
        cols.insert(cols.partition_point(|&c| c < col), col);
    }

    fn remove_obstacle(&mut self, row: usize, col: usize) {
        self.cells[row * self.width + col] = Cell::Empty;
        let rows = &mut self.by_col[col];
        if let Ok(ix) = rows.binary_search(&row) {rows.remove(ix);}
        let cols = &mut self.by_row[row];
        if let Ok(ix) = cols.binary_search(&col) {cols.remove(ix);}
    }

    /// Would one extra obstacle at `target` trap the guard in a loop?
    ///
    /// The board is left exactly as it was, whatever the outcome.
    #[instrument(level = "trace", skip(self))]
    pub fn would_loop(&mut self, target: (usize, usize)) -> Result<bool, GridError> {
        let (row, col) = target;
        let board = self.place_obstacle(row, col)?;
        let looped = board.jump_walk_loops();
        trace!(row, col, looped, "tried extra obstacle");
        Ok(looped)
    }

    /// Every patrolled cell other than the start where an extra obstacle
    /// traps the guard, in row-major order. Cells off the patrol can't change
    /// it, so they are never tried.
    #[instrument(skip(self))]
    pub fn loop_obstacles(&mut self) -> Result<Vec<(usize, usize)>, GridError> {
        let start = self.start.cell();
        let candidates = self.coverage()?.into_iter()
            .filter(|&cell| cell != start)
            .sorted_unstable()
            .collect_vec();
        let tried = candidates.len();
        let found: Vec<_> = candidates.into_iter()
            .map(|cell| self.would_loop(cell).map(|looped| looped.then_some(cell)))
            .filter_map_ok(|cell| cell)
            .collect::<Result<_, _>>()?;
        info!(tried, found = found.len(), "swept extra obstacles");
        Ok(found)
    }

    pub fn count_loop_obstacles(&mut self) -> Result<usize, GridError> {
        Ok(self.loop_obstacles()?.len())
    }
}

/// A board with one extra obstacle in place. Dropping it takes the obstacle
/// out of the grid and both indexes again.
pub struct ExtraObstacle<'a> {
    board: &'a mut GridSimulator,
    row: usize,
    col: usize,
}

impl Deref for ExtraObstacle<'_> {
    type Target = GridSimulator;
    fn deref(&self) -> &GridSimulator {&*self.board}
}

impl Drop for ExtraObstacle<'_> {
    fn drop(&mut self) {
        self.board.remove_obstacle(self.row, self.col);
    }
}
