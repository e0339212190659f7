use std::collections::VecDeque;

use crate::data::{Dir, Pos, DIRECTIONS};
use crate::grid::Grid;
use crate::vec2d::Vec2d;

/// What stops the agent besides non-floor tiles.
#[derive(Debug, Clone, Copy)]
pub enum Obstacles<'a> {
    Walls,
    WallsAndBoxes(&'a Vec2d<bool>),
}

impl Obstacles<'_> {
    fn blocks(&self, grid: &Grid, pos: Pos) -> bool {
        if !grid.is_floor(pos) {
            return true;
        }
        match *self {
            Obstacles::Walls => false,
            Obstacles::WallsAndBoxes(boxes) => boxes[pos],
        }
    }
}

/// Result of a BFS over floor tiles from one source tile.
///
/// Only valid for the box layout it was computed with - recompute after every move.
#[derive(Debug, Clone)]
pub struct Reachability {
    source: Pos,
    reached: Vec2d<bool>,
    dists: Vec2d<i32>,
    /// direction of the last step into each reached tile
    preds: Vec2d<Option<Dir>>,
    tiles: Vec<Pos>,
}

impl Reachability {
    pub fn compute(grid: &Grid, obstacles: Obstacles<'_>, source: Pos) -> Self {
        let mut reached: Vec2d<bool> = grid.scratchpad();
        let mut dists = grid.scratchpad_with_default(-1);
        let mut preds = grid.scratchpad_with_default(None);
        let mut tiles = vec![source];

        reached[source] = true;
        dists[source] = 0;

        let mut to_visit = VecDeque::new();
        to_visit.push_back(source);
        while let Some(cur) = to_visit.pop_front() {
            let cur_dist = dists[cur];
            for &dir in &DIRECTIONS {
                let next = cur + dir;
                if obstacles.blocks(grid, next) || reached[next] {
                    continue;
                }
                reached[next] = true;
                dists[next] = cur_dist + 1;
                preds[next] = Some(dir);
                tiles.push(next);
                to_visit.push_back(next);
            }
        }

        Reachability {
            source,
            reached,
            dists,
            preds,
            tiles,
        }
    }

    pub fn source(&self) -> Pos {
        self.source
    }

    pub fn is_reached(&self, pos: Pos) -> bool {
        self.reached.get(pos).cloned().unwrap_or(false)
    }

    pub fn reached(&self) -> &Vec2d<bool> {
        &self.reached
    }

    /// Reached tiles in BFS order, starting with the source.
    pub fn tiles(&self) -> &[Pos] {
        &self.tiles
    }

    /// Number of steps from the source. `pos` must have been reached.
    pub fn distance(&self, pos: Pos) -> u32 {
        assert!(self.is_reached(pos), "Distance to unreached {}", pos);
        self.dists[pos] as u32
    }

    /// Steps leading from the source to `dest`. `dest` must have been reached.
    pub fn shortest_path(&self, dest: Pos) -> Vec<Dir> {
        assert!(self.is_reached(dest), "Path to unreached {}", dest);

        let mut path = Vec::with_capacity(self.dists[dest] as usize);
        let mut cur = dest;
        while cur != self.source {
            let dir = self.preds[cur].expect("Every reached tile except source has a predecessor");
            path.push(dir);
            cur = cur - dir;
        }
        path.reverse();
        path
    }
}

/// First tile (row-major) of the region reachable from `source`.
///
/// Two agent positions with the same region have the same pushes available
/// so this identifies search states regardless of where exactly the agent stands.
pub(crate) fn canonical_position(grid: &Grid, boxes: &Vec2d<bool>, source: Pos) -> Pos {
    let obstacles = Obstacles::WallsAndBoxes(boxes);
    let key = |pos: Pos| (pos.y, pos.x);

    let mut visited: Vec2d<bool> = grid.scratchpad();
    visited[source] = true;
    let mut best = source;

    let mut to_visit = vec![source];
    while let Some(cur) = to_visit.pop() {
        if key(cur) < key(best) {
            best = cur;
        }
        for &next in &cur.neighbors() {
            if !obstacles.blocks(grid, next) && !visited[next] {
                visited[next] = true;
                to_visit.push(next);
            }
        }
    }
    best
}
