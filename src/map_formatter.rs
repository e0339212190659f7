use std::fmt::{self, Debug, Display, Formatter};

use crate::data::{MapCell, Pos};
use crate::grid::Grid;
use crate::state::BoxSet;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Contents {
    Empty,
    Box,
    Player,
}

/// Renders a grid (optionally with boxes and the agent) in XSB.
pub struct MapFormatter<'a> {
    grid: &'a Grid,
    state: Option<(&'a BoxSet, Pos)>,
}

impl<'a> MapFormatter<'a> {
    pub(crate) fn new(grid: &'a Grid, state: Option<(&'a BoxSet, Pos)>) -> Self {
        Self { grid, state }
    }

    fn contents(&self, pos: Pos) -> Contents {
        match self.state {
            Some((_, agent)) if agent == pos => Contents::Player,
            Some((boxes, _)) if boxes.has_box(pos) => Contents::Box,
            _ => Contents::Empty,
        }
    }

    fn write_to_formatter(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..self.grid.height() as i32 {
            // don't print trailing empty cells to match the input level strings
            let mut width = 0;
            for x in 0..self.grid.width() as i32 {
                let pos = Pos::new(x, y);
                let cell = self.grid.cell(pos);
                let blank = cell == MapCell::Ground || cell == MapCell::Air;
                if !blank || self.contents(pos) != Contents::Empty {
                    width = x + 1;
                }
            }

            for x in 0..width {
                let pos = Pos::new(x, y);
                Self::write_cell(self.grid.cell(pos), self.contents(pos), f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_cell(cell: MapCell, contents: Contents, f: &mut Formatter<'_>) -> fmt::Result {
        match (cell, contents) {
            (MapCell::Ground, Contents::Empty) | (MapCell::Air, Contents::Empty) => write!(f, " "),
            (MapCell::Ground, Contents::Box) => write!(f, "$"),
            (MapCell::Ground, Contents::Player) => write!(f, "@"),
            (MapCell::Target, Contents::Empty) => write!(f, "."),
            (MapCell::Target, Contents::Box) => write!(f, "*"),
            (MapCell::Target, Contents::Player) => write!(f, "+"),
            (MapCell::Wall, Contents::Empty) => write!(f, "#"),
            (MapCell::Wall, _) => unreachable!("Wall with non-empty contents"),
            (MapCell::Air, _) => unreachable!("Air with non-empty contents"),
        }
    }
}

impl<'a> Display for MapFormatter<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_to_formatter(f)
    }
}

impl<'a> Debug for MapFormatter<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
