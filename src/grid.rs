use std::fmt::{self, Debug, Display, Formatter};

use crate::data::{MapCell, Pos};
use crate::level::LevelErr;
use crate::map_formatter::MapFormatter;
use crate::vec2d::Vec2d;

/// The static part of a level - walls, floor and targets.
///
/// All queries accept any position, positions outside the grid behave like `Air`.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec2d<MapCell>,
    targets: Vec<Pos>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<MapCell>>) -> Result<Grid, LevelErr> {
        let width = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(LevelErr::Empty),
        };
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LevelErr::RowLength(i));
            }
        }

        let cells = Vec2d::from_rows(rows);
        let targets = cells
            .positions()
            .filter(|&pos| cells[pos] == MapCell::Target)
            .collect();
        Ok(Grid { cells, targets })
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(pos)
    }

    pub fn cell(&self, pos: Pos) -> MapCell {
        self.cells.get(pos).cloned().unwrap_or(MapCell::Air)
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.cell(pos) == MapCell::Wall
    }

    pub fn is_target(&self, pos: Pos) -> bool {
        self.cell(pos) == MapCell::Target
    }

    /// A tile the agent can stand on and a box can be pushed onto.
    pub fn is_floor(&self, pos: Pos) -> bool {
        match self.cell(pos) {
            MapCell::Ground | MapCell::Target => true,
            MapCell::Wall | MapCell::Air => false,
        }
    }

    /// Row-major order
    pub fn targets(&self) -> &[Pos] {
        &self.targets
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        self.cells.positions()
    }

    pub fn scratchpad<U: Clone + Default>(&self) -> Vec2d<U> {
        self.cells.scratchpad()
    }

    pub fn scratchpad_with_default<U: Clone>(&self, default: U) -> Vec2d<U> {
        self.cells.scratchpad_with_default(default)
    }

    /// Turns `Air` reachable from `start` into `Ground`.
    ///
    /// Only walls stop the flood - boxes don't matter here. Whatever `Air` remains afterwards
    /// is outside the level and never becomes floor.
    pub(crate) fn mark_interior(&mut self, start: Pos) -> usize {
        let mut visited: Vec2d<bool> = self.cells.scratchpad();
        let mut to_visit = vec![start];
        visited[start] = true;

        let mut reclassified = 0;
        while let Some(cur) = to_visit.pop() {
            if self.cells[cur] == MapCell::Air {
                self.cells[cur] = MapCell::Ground;
                reclassified += 1;
            }

            for &next in &cur.neighbors() {
                if self.contains(next) && !visited[next] && self.cells[next] != MapCell::Wall {
                    visited[next] = true;
                    to_visit.push(next);
                }
            }
        }
        reclassified
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", MapFormatter::new(self, None))
    }
}

impl Debug for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
