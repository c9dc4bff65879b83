use std::{
    fmt::{self, Display, Write},
    hash::{Hash, Hasher},
    ops::Index,
    str::FromStr,
    sync::Arc,
};

use itertools::Itertools;
use pathfinding::directed::bfs::bfs_reach;
use smallvec::SmallVec;

use crate::{BoardError, ConstructionError, Direction, Move, ParseModeError, Tile};

/// Largest number of tiles one puzzle can hold; cell identifiers are a single byte.
pub const MAX_TILES: usize = u8::MAX as usize;

const EMPTY: u8 = 0;

// symbol for cell identifier `i` is SYMBOLS[i]
const SYMBOLS: &[u8] = b".123456789abcdefghijklmnopqrstuvwxyz";

/// How the search decides whether two boards are the same position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileMode {
    /// Every tile has its own identity.
    #[default]
    Distinct,
    /// Tiles of equal `(width, height)` can stand in for each other.
    ///
    /// This is a puzzle-wide policy. A goal that names one of several
    /// same-shape tiles can be missed, because positions that differ only
    /// in which of those tiles sits where are explored once.
    Interchangeable,
}

impl Display for TileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TileMode::Distinct => "distinct",
            TileMode::Interchangeable => "interchangeable",
        })
    }
}

impl FromStr for TileMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distinct" => Ok(TileMode::Distinct),
            "interchangeable" | "shape" => Ok(TileMode::Interchangeable),
            _ => Err(ParseModeError::new(s)),
        }
    }
}

/// Content-derived identity of a board, used to deduplicate search states.
///
/// It is the occupancy grid with each cell holding either the tile's rank
/// (for [`TileMode::Distinct`]) or the tile's shape class
/// (for [`TileMode::Interchangeable`]).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey(Box<[u8]>);

impl CanonicalKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// the part of a puzzle shared by all of its states
#[derive(Debug, PartialEq, Eq, Hash)]
struct Frame {
    width: usize,
    height: usize,
    mode: TileMode,
    // sorted by name; a tile's rank here is its cell identifier minus one
    tiles: Vec<Tile>,
    // cell identifier -> shape class, with EMPTY mapping to EMPTY
    classes: Vec<u8>,
}

/// One configuration of a puzzle.
///
/// A `BoardState` is never changed once built: moves produce new states, so
/// snapshots can be kept around by the search without copying.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardState {
    frame: Arc<Frame>,
    positions: Vec<(usize, usize)>,
    cells: Vec<u8>,
}

impl BoardState {
    /// Builds the initial state of a puzzle from tiles and their top-left cells.
    ///
    /// The order of `tiles` does not matter; tiles are ranked by name.
    pub fn new<I>(
        tiles: I,
        width: usize,
        height: usize,
        mode: TileMode,
    ) -> Result<BoardState, ConstructionError>
    where
        I: IntoIterator<Item = (Tile, (usize, usize))>,
    {
        if width == 0 || height == 0 {
            return Err(ConstructionError::EmptyBoard { width, height });
        }

        let mut placed: Vec<(Tile, (usize, usize))> = tiles.into_iter().collect();
        if placed.len() > MAX_TILES {
            return Err(ConstructionError::TooManyTiles {
                count: placed.len(),
                max: MAX_TILES,
            });
        }

        placed.sort_by(|a, b| a.0.name().cmp(b.0.name()));
        if let Some((name, _)) = placed
            .iter()
            .map(|(tile, _)| tile.name())
            .tuple_windows()
            .find(|(a, b)| a == b)
        {
            return Err(ConstructionError::DuplicateTile {
                name: name.to_owned(),
            });
        }

        let mut cells = vec![EMPTY; width * height];
        for (index, (tile, (x, y))) in placed.iter().enumerate() {
            if tile.width() == 0 || tile.height() == 0 {
                return Err(ConstructionError::EmptyTile {
                    name: tile.name().to_owned(),
                    width: tile.width(),
                    height: tile.height(),
                });
            }

            let fits = |start: usize, len: usize, limit: usize| {
                start.checked_add(len).map_or(false, |end| end <= limit)
            };
            if !fits(*x, tile.width(), width) || !fits(*y, tile.height(), height) {
                return Err(ConstructionError::OutOfBounds {
                    name: tile.name().to_owned(),
                    at: (*x, *y),
                    width,
                    height,
                });
            }

            for cell in rectangle(*x, *y, tile.width(), tile.height()) {
                let slot = &mut cells[cell.1 * width + cell.0];
                if *slot != EMPTY {
                    return Err(ConstructionError::Overlap {
                        first: placed[usize::from(*slot) - 1].0.name().to_owned(),
                        second: tile.name().to_owned(),
                        cell,
                    });
                }
                *slot = cell_id(index);
            }
        }

        let shapes: Vec<(usize, usize)> = placed
            .iter()
            .map(|(tile, _)| tile.shape())
            .sorted()
            .dedup()
            .collect();
        let classes = std::iter::once(EMPTY)
            .chain(placed.iter().map(|(tile, _)| {
                // shape classes are numbered from 1 in ascending (width, height) order
                let class = shapes.binary_search(&tile.shape()).unwrap_or_else(|i| i);
                cell_id(class)
            }))
            .collect();

        let (tiles, positions) = placed.into_iter().unzip();
        Ok(BoardState {
            frame: Arc::new(Frame {
                width,
                height,
                mode,
                tiles,
                classes,
            }),
            positions,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.frame.width
    }

    pub fn height(&self) -> usize {
        self.frame.height
    }

    pub fn mode(&self) -> TileMode {
        self.frame.mode
    }

    /// Tiles in name order.
    pub fn tiles(&self) -> &[Tile] {
        &self.frame.tiles
    }

    /// Every tile with its top-left cell, in name order.
    pub fn placement(&self) -> impl Iterator<Item = (&Tile, (usize, usize))> + '_ {
        self.frame.tiles.iter().zip(self.positions.iter().copied())
    }

    pub fn tile_location(&self, name: &str) -> Result<(usize, usize), BoardError> {
        self.index_of(name).map(|index| self.positions[index])
    }

    /// The tile covering `cell`, if any. Cells off the board are empty.
    pub fn occupant(&self, (x, y): (usize, usize)) -> Option<&Tile> {
        if x >= self.frame.width || y >= self.frame.height {
            return None;
        }
        match self[(x, y)] {
            EMPTY => None,
            id => self.frame.tiles.get(usize::from(id) - 1),
        }
    }

    /// Whether `name` can take one step towards `direction`.
    ///
    /// The cells the tile already covers never block it; only the strip of
    /// cells it would newly enter has to be free and on the board.
    pub fn movable(&self, name: &str, direction: Direction) -> bool {
        self.index_of(name)
            .map_or(false, |index| self.destination(index, direction).is_some())
    }

    /// Every legal move, tiles in name order and directions in N, E, S, W order.
    pub fn generate_possible_moves(&self) -> SmallVec<[Move; 8]> {
        self.frame
            .tiles
            .iter()
            .enumerate()
            .cartesian_product(Direction::ALL)
            .filter(|((index, _), direction)| self.destination(*index, *direction).is_some())
            .map(|((_, tile), direction)| Move {
                tile: tile.shared_name().clone(),
                direction,
            })
            .collect()
    }

    /// The state after moving `name` one step. `self` is left untouched.
    pub fn move_tile(&self, name: &str, direction: Direction) -> Result<BoardState, BoardError> {
        let index = self.index_of(name)?;
        self.step(index, direction)
            .ok_or_else(|| BoardError::IllegalMove {
                name: name.to_owned(),
                direction,
            })
    }

    pub fn apply(&self, m: &Move) -> Result<BoardState, BoardError> {
        self.move_tile(&m.tile, m.direction)
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        match self.frame.mode {
            TileMode::Distinct => CanonicalKey(self.cells.as_slice().into()),
            TileMode::Interchangeable => CanonicalKey(
                self.cells
                    .iter()
                    .map(|&c| self.frame.classes[usize::from(c)])
                    .collect(),
            ),
        }
    }

    /// Draws the grid one row per line: `.` for empty cells, then `1`-`9`
    /// and `a`-`z` for tiles in name order.
    ///
    /// With `legend`, a blank line follows and then one `symbol: name` line
    /// per tile.
    pub fn render(&self, legend: bool) -> String {
        let mut out = self.to_string();
        if legend {
            out.push_str("\n\n");
            let lines = self
                .frame
                .tiles
                .iter()
                .enumerate()
                .map(|(index, tile)| format!("{}: {}", symbol(cell_id(index)), tile.name()))
                .join("\n");
            out.push_str(&lines);
        }
        out
    }

    /// Number of distinct positions (by canonical key) reachable from this one,
    /// this one included.
    pub fn count_reachable(&self) -> usize {
        bfs_reach(Keyed::new(self.clone()), |node: &Keyed| {
            node.state.successors().map(Keyed::new).collect::<Vec<_>>()
        })
        .count()
    }

    // every successor, in move generation order
    pub(crate) fn successors(&self) -> impl Iterator<Item = BoardState> + '_ {
        (0..self.frame.tiles.len())
            .cartesian_product(Direction::ALL)
            .filter_map(move |(index, direction)| self.step(index, direction))
    }

    fn index_of(&self, name: &str) -> Result<usize, BoardError> {
        self.frame
            .tiles
            .binary_search_by(|tile| tile.name().cmp(name))
            .map_err(|_| BoardError::UnknownTile {
                name: name.to_owned(),
            })
    }

    // top-left corner after one step, or None when the step is blocked
    fn destination(&self, index: usize, direction: Direction) -> Option<(usize, usize)> {
        let (x, y) = self.positions[index];
        let tile = &self.frame.tiles[index];
        let (dx, dy) = direction.delta();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        if nx + tile.width() > self.frame.width || ny + tile.height() > self.frame.height {
            return None;
        }

        edge(x, y, tile.width(), tile.height(), direction)
            .all(|cell| self[cell] == EMPTY)
            .then_some((nx, ny))
    }

    fn step(&self, index: usize, direction: Direction) -> Option<BoardState> {
        let (nx, ny) = self.destination(index, direction)?;
        let (x, y) = self.positions[index];
        let (w, h) = self.frame.tiles[index].shape();
        let id = cell_id(index);

        let mut next = self.clone();
        for cell in edge(x, y, w, h, direction) {
            next.set(cell, id);
        }
        // the strip left behind sits just outside the moved tile, on the trailing side
        for cell in edge(nx, ny, w, h, -direction) {
            next.set(cell, EMPTY);
        }
        next.positions[index] = (nx, ny);
        Some(next)
    }

    fn set(&mut self, (x, y): (usize, usize), id: u8) {
        self.cells[y * self.frame.width + x] = id;
    }
}

/// Cell identifiers: 0 is empty, otherwise the 1-based rank of the tile in name order.
impl Index<(usize, usize)> for BoardState {
    type Output = u8;
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.cells[y * self.frame.width + x]
    }
}

impl Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in self.cells.chunks(self.frame.width) {
            if !first {
                f.write_char('\n')?;
            } else {
                first = false;
            }

            for c in line {
                f.write_char(symbol(*c))?;
            }
        }

        Ok(())
    }
}

/// A board that hashes and compares by its canonical key, so that generic
/// graph algorithms deduplicate positions the same way the solver does.
#[derive(Clone, Debug)]
pub(crate) struct Keyed {
    pub(crate) key: CanonicalKey,
    pub(crate) state: BoardState,
}

impl Keyed {
    pub(crate) fn new(state: BoardState) -> Keyed {
        Keyed {
            key: state.canonical_key(),
            state,
        }
    }
}

impl PartialEq for Keyed {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Keyed {}

impl Hash for Keyed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

fn cell_id(rank: usize) -> u8 {
    // ranks are bounded by MAX_TILES at construction
    (rank + 1) as u8
}

fn symbol(id: u8) -> char {
    SYMBOLS.get(usize::from(id)).map_or('?', |&b| b as char)
}

fn rectangle(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    (y..y + h).flat_map(move |cy| (x..x + w).map(move |cx| (cx, cy)))
}

// the strip of cells just outside one side of a rectangle; callers make sure it is on the board
#[auto_enums::auto_enum(Iterator)]
fn edge(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    side: Direction,
) -> impl Iterator<Item = (usize, usize)> {
    match side {
        Direction::North => (x..x + w).map(move |cx| (cx, y - 1)),
        Direction::South => (x..x + w).map(move |cx| (cx, y + h)),
        Direction::West => (y..y + h).map(move |cy| (x - 1, cy)),
        Direction::East => (y..y + h).map(move |cy| (x + w, cy)),
    }
}
