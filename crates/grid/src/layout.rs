//! Board layouts.
//!
//! Layouts are plain text, one character per cell:
//!
//! ```text
//! %  wall          .  food         o  capsule
//! P  pacman start  G  ghost start     (space) empty
//! ```

use std::fmt;

use ghostplan_core::{GhostplanError, Result};
use serde::{Deserialize, Serialize};

use crate::Direction;

const TEST_CLASSIC: &str = "\
%%%%%
% . %
%.G.%
% . %
%. .%
%   %
%  .%
%   %
%P .%
%%%%%";

const SMALL_CLASSIC: &str = "\
%%%%%%%%%%%%%%%%%%%%
%......%G  G%......%
%.%%...%%  %%...%%.%
%.%o.%........%.o%.%
%.%%.%.%%%%%%.%.%%.%
%........P.........%
%%%%%%%%%%%%%%%%%%%%";

const OPEN_HUNT: &str = "\
%%%%%%%%%
%.......%
%.%%.%%.%
%...G...%
%.%%.%%.%
%...P..o%
%%%%%%%%%";

/// A cell on the board, row 0 at the top.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to `other`.
    pub fn distance(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Static board description: walls and the starting contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    food: Vec<Position>,
    capsules: Vec<Position>,
    pacman_start: Position,
    ghost_starts: Vec<Position>,
}

impl Layout {
    /// Names accepted by [`Layout::named`].
    pub const NAMES: [&'static str; 3] = ["testClassic", "smallClassic", "openHunt"];

    /// Parse a layout from text.
    ///
    /// Blank lines are ignored. All remaining rows must have the same width
    /// and there must be exactly one `P`.
    ///
    /// # Errors
    /// Returns `GhostplanError::InvalidLayout` describing the first problem.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(GhostplanError::InvalidLayout("layout is empty".to_string()));
        }

        let mut walls = Vec::with_capacity(width * height);
        let mut food = Vec::new();
        let mut capsules = Vec::new();
        let mut pacman_start = None;
        let mut ghost_starts = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let row_width = line.chars().count();
            if row_width != width {
                return Err(GhostplanError::InvalidLayout(format!(
                    "row {} has width {}, expected {}",
                    row, row_width, width
                )));
            }

            for (col, cell) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                walls.push(cell == '%');
                match cell {
                    '%' | ' ' => {}
                    '.' => food.push(pos),
                    'o' => capsules.push(pos),
                    'G' => ghost_starts.push(pos),
                    'P' => {
                        if pacman_start.replace(pos).is_some() {
                            return Err(GhostplanError::InvalidLayout(format!(
                                "second pacman at {}",
                                pos
                            )));
                        }
                    }
                    other => {
                        return Err(GhostplanError::InvalidLayout(format!(
                            "unknown cell {:?} at {}",
                            other, pos
                        )));
                    }
                }
            }
        }

        let pacman_start = pacman_start
            .ok_or_else(|| GhostplanError::InvalidLayout("no pacman start".to_string()))?;

        Ok(Self {
            width,
            height,
            walls,
            food,
            capsules,
            pacman_start,
            ghost_starts,
        })
    }

    /// Look up a built-in layout by name.
    ///
    /// Accepts the camelCase names in [`Layout::NAMES`] and their snake_case
    /// forms (`small_classic`), matching the constructor names.
    ///
    /// # Errors
    /// Returns `GhostplanError::InvalidLayout` for an unknown name.
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "testClassic" | "test_classic" => Self::parse(TEST_CLASSIC),
            "smallClassic" | "small_classic" => Self::parse(SMALL_CLASSIC),
            "openHunt" | "open_hunt" => Self::parse(OPEN_HUNT),
            other => Err(GhostplanError::InvalidLayout(format!(
                "unknown layout {:?}, expected one of {:?}",
                other,
                Self::NAMES
            ))),
        }
    }

    /// Narrow 3-wide maze with a single ghost.
    pub fn test_classic() -> Self {
        Self::parse(TEST_CLASSIC).expect("built-in layout is valid")
    }

    /// Two ghosts, two capsules.
    pub fn small_classic() -> Self {
        Self::parse(SMALL_CLASSIC).expect("built-in layout is valid")
    }

    /// Open board with one ghost in the middle.
    pub fn open_hunt() -> Self {
        Self::parse(OPEN_HUNT).expect("built-in layout is valid")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True for walls and for anything outside the board.
    pub fn is_wall(&self, pos: Position) -> bool {
        if pos.row >= self.height || pos.col >= self.width {
            return true;
        }
        self.walls[pos.row * self.width + pos.col]
    }

    /// Cell reached by moving one step from `pos`, unless it is a wall.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        (!self.is_wall(next)).then_some(next)
    }

    pub fn food(&self) -> &[Position] {
        &self.food
    }

    pub fn capsules(&self) -> &[Position] {
        &self.capsules
    }

    pub fn pacman_start(&self) -> Position {
        self.pacman_start
    }

    pub fn ghost_starts(&self) -> &[Position] {
        &self.ghost_starts
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = Position::new(row, col);
                let cell = if self.is_wall(pos) {
                    '%'
                } else if pos == self.pacman_start {
                    'P'
                } else if self.ghost_starts.contains(&pos) {
                    'G'
                } else if self.capsules.contains(&pos) {
                    'o'
                } else if self.food.contains(&pos) {
                    '.'
                } else {
                    ' '
                };
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_test_classic() {
        let layout = Layout::test_classic();
        assert_eq!(layout.width(), 5);
        assert_eq!(layout.height(), 10);
        assert_eq!(layout.pacman_start(), Position::new(8, 1));
        assert_eq!(layout.ghost_starts(), &[Position::new(2, 2)]);
        assert_eq!(layout.food().len(), 8);
        assert!(layout.capsules().is_empty());
    }

    #[test]
    fn test_all_named_layouts_parse() {
        for name in Layout::NAMES {
            assert!(Layout::named(name).is_ok(), "{name}");
        }
        assert!(Layout::named("mediumClassic").is_err());
    }

    #[test]
    fn test_named_accepts_snake_case() {
        assert_eq!(Layout::named("test_classic").unwrap(), Layout::test_classic());
        assert_eq!(Layout::named("small_classic").unwrap(), Layout::small_classic());
        assert_eq!(Layout::named("open_hunt").unwrap(), Layout::open_hunt());
        assert!(Layout::named("Small_Classic").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let layout = Layout::small_classic();
        let reparsed = Layout::parse(&layout.to_string()).unwrap();
        assert_eq!(reparsed, layout);
    }

    #[test]
    fn test_neighbor_respects_walls() {
        let layout = Layout::parse("%%%%\n%P %\n%%%%").unwrap();
        let start = layout.pacman_start();

        assert_eq!(
            layout.neighbor(start, Direction::East),
            Some(Position::new(1, 2))
        );
        assert_eq!(layout.neighbor(start, Direction::West), None);
        assert_eq!(layout.neighbor(start, Direction::North), None);
        assert_eq!(layout.neighbor(start, Direction::Stop), Some(start));
    }

    #[test]
    fn test_unbordered_edges_are_walls() {
        let layout = Layout::parse("P.").unwrap();
        assert_eq!(layout.neighbor(Position::new(0, 0), Direction::West), None);
        assert_eq!(layout.neighbor(Position::new(0, 0), Direction::North), None);
        assert_eq!(layout.neighbor(Position::new(0, 1), Direction::East), None);
        assert!(layout.is_wall(Position::new(5, 5)));
    }

    #[test]
    fn test_invalid_layouts() {
        let cases = [
            ("", "empty"),
            ("%%%\n%.%\n%%%", "no pacman"),
            ("%%%\n%PP\n%%%", "second pacman"),
            ("%%%\n%P%%\n%%%", "width"),
            ("%%%\n%Px\n%%%", "unknown cell"),
        ];

        for (text, expected) in cases {
            match Layout::parse(text) {
                Err(GhostplanError::InvalidLayout(msg)) => {
                    assert!(msg.contains(expected), "{msg:?} lacks {expected:?}")
                }
                other => panic!("expected InvalidLayout for {text:?}, got {other:?}"),
            }
        }
    }
}
