use crate::data::Pos;
use crate::grid::Grid;
use crate::vec2d::Vec2d;

/// Box positions kept both as an occupancy matrix (O(1) lookups)
/// and as an ordered list (iteration).
///
/// The two always describe the same set of positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxSet {
    occupied: Vec2d<bool>,
    list: Vec<Pos>,
}

impl BoxSet {
    /// Positions must be inside the grid and unique - checked by `Level::new`.
    pub fn new(grid: &Grid, positions: &[Pos]) -> Self {
        let mut occupied: Vec2d<bool> = grid.scratchpad();
        for &pos in positions {
            occupied[pos] = true;
        }
        BoxSet {
            occupied,
            list: positions.to_vec(),
        }
    }

    pub fn has_box(&self, pos: Pos) -> bool {
        self.occupied.get(pos).cloned().unwrap_or(false)
    }

    pub fn positions(&self) -> &[Pos] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn occupancy(&self) -> &Vec2d<bool> {
        &self.occupied
    }

    /// Keeps the box's index in the list.
    pub(crate) fn move_box(&mut self, from: Pos, to: Pos) {
        let index = self
            .list
            .iter()
            .position(|&b| b == from)
            .unwrap_or_else(|| panic!("No box at {}", from));
        debug_assert!(!self.occupied[to]);
        self.list[index] = to;
        self.occupied[from] = false;
        self.occupied[to] = true;
    }

    /// Removes the boxes at `positions` - they are what the solver moves,
    /// everything left behaves like walls.
    pub(crate) fn without(&self, positions: &[Pos]) -> BoxSet {
        let mut rest = self.clone();
        for pos in positions {
            rest.occupied[*pos] = false;
        }
        rest.list.retain(|b| !positions.contains(b));
        rest
    }
}
