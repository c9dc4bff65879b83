/// Reasons an initial placement is rejected by [`BoardState::new`](crate::BoardState::new).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConstructionError {
    #[display("board must have a positive size, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[display("tile {name} has no cells ({width}x{height})")]
    EmptyTile {
        name: String,
        width: usize,
        height: usize,
    },
    #[display("tile {name} appears more than once")]
    DuplicateTile { name: String },
    #[display("{count} tiles do not fit in one puzzle (at most {max})")]
    TooManyTiles { count: usize, max: usize },
    #[display("tile {name} at {at:?} does not fit inside the {width}x{height} board")]
    OutOfBounds {
        name: String,
        at: (usize, usize),
        width: usize,
        height: usize,
    },
    #[display("tiles {first} and {second} both cover cell {cell:?}")]
    Overlap {
        first: String,
        second: String,
        cell: (usize, usize),
    },
}

/// Failures of a single move or lookup on an existing board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("no tile named {name} in this puzzle")]
    UnknownTile { name: String },
    #[display("tile {name} cannot move {direction}")]
    IllegalMove {
        name: String,
        direction: crate::Direction,
    },
}

/// Errors from reading a puzzle drawn as rows of characters.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum LayoutError {
    #[display("layout has no rows")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("cells of tile {tile} do not form a filled rectangle")]
    NotRectangular { tile: char },
    #[display("no built-in puzzle named {name}")]
    UnknownPuzzle { name: String },
    #[display("invalid layout: {_0}")]
    Construction(#[from] ConstructionError),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown search method {input:?}, expected `bfs` or `dfs`")]
pub struct ParseMethodError {
    input: String,
}

impl ParseMethodError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown tile mode {input:?}, expected `distinct` or `interchangeable`")]
pub struct ParseModeError {
    input: String,
}

impl ParseModeError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown direction {input:?}, expected one of N, E, S, W")]
pub struct ParseDirectionError {
    input: String,
}

impl ParseDirectionError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }
}
