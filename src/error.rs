use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,

    #[error("expected every row to be {expected} wide, but row {row} is {found} wide")]
    UnequalWidth { row: usize, expected: usize, found: usize },

    #[error("unexpected board cell {found:?} at ({row}, {col})")]
    InvalidChar { row: usize, col: usize, found: char },

    #[error("no guard '^' on the board")]
    NoGuard,

    #[error("guard appears at both {first:?} and {second:?}")]
    MultipleGuards { first: (usize, usize), second: (usize, usize) },

    #[error("guard patrol never leaves the board")]
    PatrolLoops,

    #[error("({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("cannot place an obstacle on the guard's starting cell ({row}, {col})")]
    ObstacleOnStart { row: usize, col: usize },

    #[error("({row}, {col}) already holds an obstacle")]
    AlreadyObstacle { row: usize, col: usize },
}
