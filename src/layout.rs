use std::collections::BTreeMap;

use crate::{BoardState, Goal, LayoutError, Tile, TileMode};

/// Reads a board drawn as rows of characters.
///
/// `.` is an empty cell; any other character names a tile, and all cells
/// carrying that character must form one filled rectangle. Blank lines and
/// surrounding whitespace are ignored.
///
/// ```text
/// AA11
/// AA22
/// 34..
/// ```
pub fn parse_layout(text: &str, mode: TileMode) -> Result<BoardState, LayoutError> {
    let rows: Vec<Vec<char>> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().collect())
        .collect();

    let width = rows.first().map(Vec::len).ok_or(LayoutError::Empty)?;
    if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(LayoutError::RaggedRows {
            row,
            expected: width,
            found: cells.len(),
        });
    }

    // per tile: top-left, bottom-right and number of cells seen
    let mut extents: BTreeMap<char, ((usize, usize), (usize, usize), usize)> = BTreeMap::new();
    for (y, row) in rows.iter().enumerate() {
        for (x, &c) in row.iter().enumerate() {
            if c == '.' {
                continue;
            }
            let entry = extents.entry(c).or_insert(((x, y), (x, y), 0));
            entry.0 = (entry.0 .0.min(x), entry.0 .1.min(y));
            entry.1 = (entry.1 .0.max(x), entry.1 .1.max(y));
            entry.2 += 1;
        }
    }

    let mut tiles = Vec::with_capacity(extents.len());
    for (c, ((x0, y0), (x1, y1), count)) in extents {
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
        if w * h != count {
            return Err(LayoutError::NotRectangular { tile: c });
        }
        tiles.push((Tile::new(c.to_string(), w, h), (x0, y0)));
    }

    Ok(BoardState::new(tiles, width, rows.len(), mode)?)
}

/// A ready-made puzzle: a starting board and the goal to reach.
#[derive(Clone, Debug)]
pub struct Puzzle {
    name: &'static str,
    initial: BoardState,
    goal: Goal,
}

impl Puzzle {
    /// Names accepted by [`Puzzle::by_name`].
    pub const NAMES: [&'static str; 3] = ["huarongdao", "simple", "warmup"];

    pub fn by_name(name: &str, mode: TileMode) -> Result<Puzzle, LayoutError> {
        match name {
            "huarongdao" => Puzzle::huarongdao(mode),
            "simple" => Puzzle::simple(mode),
            "warmup" => Puzzle::warmup(mode),
            _ => Err(LayoutError::UnknownPuzzle {
                name: name.to_owned(),
            }),
        }
    }

    /// The classic layout: Cao Cao behind Guan Yu, four generals and four
    /// soldiers on a 4x5 board. Cao Cao has to reach the exit at the bottom.
    pub fn huarongdao(mode: TileMode) -> Result<Puzzle, LayoutError> {
        let setup = [
            (Tile::new("cao", 2, 2), (1, 0)),
            (Tile::new("guan", 2, 1), (1, 2)),
            (Tile::new("zhang", 1, 2), (0, 0)),
            (Tile::new("zhao", 1, 2), (0, 2)),
            (Tile::new("ma", 1, 2), (3, 0)),
            (Tile::new("huang", 1, 2), (3, 2)),
            (Tile::new("zz1", 1, 1), (0, 4)),
            (Tile::new("zz2", 1, 1), (1, 3)),
            (Tile::new("zz3", 1, 1), (2, 3)),
            (Tile::new("zz4", 1, 1), (3, 4)),
        ];
        Ok(Puzzle {
            name: "huarongdao",
            initial: BoardState::new(setup, 4, 5, mode)?,
            goal: Goal::new("cao", (1, 3)),
        })
    }

    pub fn simple(mode: TileMode) -> Result<Puzzle, LayoutError> {
        const LAYOUT: &str = "
AA11
AA22
34..
5677
5688
";
        Ok(Puzzle {
            name: "simple",
            initial: parse_layout(LAYOUT, mode)?,
            goal: Goal::new("A", (0, 3)),
        })
    }

    /// A single 2x2 block on a 3x3 board, to be moved to the far corner.
    pub fn warmup(mode: TileMode) -> Result<Puzzle, LayoutError> {
        Ok(Puzzle {
            name: "warmup",
            initial: BoardState::new([(Tile::new("cao", 2, 2), (0, 0))], 3, 3, mode)?,
            goal: Goal::new("cao", (1, 1)),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn initial(&self) -> &BoardState {
        &self.initial
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ConstructionError;

    #[test]
    fn parses_tiles_and_gaps() {
        let board = parse_layout(
            "
            AA1
            AA1
            .2.
            ",
            TileMode::Distinct,
        )
        .unwrap();
        assert_eq!((board.width(), board.height()), (3, 3));
        assert_eq!(board.tile_location("A"), Ok((0, 0)));
        assert_eq!(board.tile_location("1"), Ok((2, 0)));
        assert_eq!(board.tile_location("2"), Ok((1, 2)));
        let shapes: Vec<_> = board.tiles().iter().map(Tile::shape).collect();
        assert_eq!(shapes, [(1, 2), (1, 1), (2, 2)]);
    }

    #[test]
    fn rejects_bad_layouts() {
        assert_eq!(
            parse_layout("\n\n", TileMode::Distinct).unwrap_err(),
            LayoutError::Empty
        );
        assert_eq!(
            parse_layout("AA\nA", TileMode::Distinct).unwrap_err(),
            LayoutError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            parse_layout("AA\nA.", TileMode::Distinct).unwrap_err(),
            LayoutError::NotRectangular { tile: 'A' }
        );
        assert_eq!(
            parse_layout("A.A", TileMode::Distinct).unwrap_err(),
            LayoutError::NotRectangular { tile: 'A' }
        );
    }

    #[test]
    fn catalogue_is_valid() {
        for name in Puzzle::NAMES {
            for mode in [TileMode::Distinct, TileMode::Interchangeable] {
                let puzzle = Puzzle::by_name(name, mode).unwrap();
                assert_eq!(puzzle.name(), name);
                assert_eq!(puzzle.initial().mode(), mode);
                assert!(puzzle.initial().tile_location(&puzzle.goal().tile).is_ok());
            }
        }
        assert!(matches!(
            Puzzle::by_name("nope", TileMode::Distinct),
            Err(LayoutError::UnknownPuzzle { .. })
        ));
    }

    #[test]
    fn simple_layout_matches_drawing() {
        let puzzle = Puzzle::simple(TileMode::Distinct).unwrap();
        assert_eq!(
            puzzle.initial().render(false),
            "9911\n9922\n34..\n5677\n5688"
        );
    }

    #[test]
    fn construction_errors_pass_through() {
        let err = LayoutError::from(ConstructionError::EmptyBoard {
            width: 0,
            height: 0,
        });
        assert!(err.to_string().starts_with("invalid layout"));
    }
}
