use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};

use prettytable::{format, Cell, Row, Table};
use separator::Separatable;

use crate::data::Pos;
use crate::moves::Push;

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Stats {
    created_states: Vec<u64>,
    explored_states: Vec<u64>,
    duplicate_states: Vec<u64>,
    pruned_states: Vec<u64>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_created(&self) -> u64 {
        self.created_states.iter().sum()
    }

    pub fn total_explored(&self) -> u64 {
        self.explored_states.iter().sum()
    }

    pub fn total_duplicates(&self) -> u64 {
        self.duplicate_states.iter().sum()
    }

    pub fn total_pruned(&self) -> u64 {
        self.pruned_states.iter().sum()
    }

    /// Depth is the number of pushes. Returns true if this depth is reached for the first time.
    pub(crate) fn add_created(&mut self, depth: usize) -> bool {
        Self::add(&mut self.created_states, depth)
    }

    pub(crate) fn add_explored(&mut self, depth: usize) -> bool {
        Self::add(&mut self.explored_states, depth)
    }

    pub(crate) fn add_duplicate(&mut self, depth: usize) -> bool {
        Self::add(&mut self.duplicate_states, depth)
    }

    pub(crate) fn add_pruned(&mut self, depth: usize) -> bool {
        Self::add(&mut self.pruned_states, depth)
    }

    fn add(counts: &mut Vec<u64>, depth: usize) -> bool {
        let mut ret = false;

        // while because some depths might be skipped
        while depth >= counts.len() {
            counts.push(0);
            ret = true;
        }
        counts[depth] += 1;
        ret
    }

    fn at(counts: &[u64], depth: usize) -> u64 {
        counts.get(depth).cloned().unwrap_or(0)
    }
}

impl Debug for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "created by depth: {:?}", self.created_states)?;
        writeln!(f, "explored by depth: {:?}", self.explored_states)?;
        writeln!(f, "reached duplicates by depth: {:?}", self.duplicate_states)?;
        writeln!(f, "pruned by depth: {:?}", self.pruned_states)
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "States created total: {}", self.total_created().separated_string())?;
        writeln!(f, "Explored total: {}", self.total_explored().separated_string())?;
        writeln!(f, "Reached duplicates total: {}", self.total_duplicates().separated_string())?;
        writeln!(f, "Pruned as lost total: {}", self.total_pruned().separated_string())?;
        writeln!(f)?;

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.set_titles(Row::new(
            ["Depth", "Created", "Explored", "Duplicates", "Pruned"]
                .iter()
                .map(|title| Cell::new(title))
                .collect(),
        ));
        // created states go at least as deep as any other count
        let depths = self
            .created_states
            .len()
            .max(self.explored_states.len())
            .max(self.duplicate_states.len());
        for depth in 0..depths {
            let counts = [
                Self::at(&self.created_states, depth),
                Self::at(&self.explored_states, depth),
                Self::at(&self.duplicate_states, depth),
                Self::at(&self.pruned_states, depth),
            ];
            let mut cells = vec![Cell::new(&format!("{}:", depth))];
            cells.extend(counts.iter().map(|c| Cell::new(&c.separated_string())));
            table.add_row(Row::new(cells));
        }
        write!(f, "{}", table)
    }
}

/// A state in the explored tree. Lives in the solver's arena.
#[derive(Debug)]
pub(crate) struct SearchNode<'a> {
    /// Sorted positions of the boxes the solver may move.
    pub(crate) boxes: Vec<Pos>,
    /// Where the agent actually stands (not normalized).
    pub(crate) player_pos: Pos,
    pub(crate) prev: Option<&'a SearchNode<'a>>,
    /// The push which created this state from `prev`.
    pub(crate) push: Option<Push>,
    /// Moves (steps + pushes) from the initial state.
    pub(crate) dist: u64,
    /// Pushes from the initial state.
    pub(crate) depth: usize,
}

impl<'a> SearchNode<'a> {
    pub(crate) fn root(boxes: Vec<Pos>, player_pos: Pos) -> Self {
        SearchNode {
            boxes,
            player_pos,
            prev: None,
            push: None,
            dist: 0,
            depth: 0,
        }
    }

    pub(crate) fn child(&'a self, boxes: Vec<Pos>, push: Push, cost: u64) -> Self {
        SearchNode {
            boxes,
            player_pos: push.box_pos,
            prev: Some(self),
            push: Some(push),
            dist: self.dist + cost,
            depth: self.depth + 1,
        }
    }
}

/// Priority queue entry: lowest `cost` first, then lowest `dist`, then oldest.
#[derive(Debug)]
pub(crate) struct QueueItem<'a> {
    pub(crate) cost: u64,
    pub(crate) seq: u64,
    pub(crate) node: &'a SearchNode<'a>,
}

impl QueueItem<'_> {
    fn key(&self) -> (u64, u64, u64) {
        (self.cost, self.node.dist, self.seq)
    }
}

impl PartialEq for QueueItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueItem<'_> {}

impl PartialOrd for QueueItem<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // intentionally reversed for BinaryHeap
        other.key().cmp(&self.key())
    }
}
