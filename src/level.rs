use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use log::debug;

use crate::config::Config;
use crate::data::{Dir, Highlight, Pos, DIRECTIONS};
use crate::grid::Grid;
use crate::map_formatter::MapFormatter;
use crate::moves::{Moves, Push};
use crate::reachability::{Obstacles, Reachability};
use crate::solution_formatter::SolutionFormatter;
use crate::solver::interrupt::Interrupt;
use crate::solver::preprocessing::find_dead_ends;
use crate::solver::{self, Goal, Problem, SolverErr, SolverOk, TranslateErr};
use crate::state::BoxSet;
use crate::vec2d::Vec2d;

/// The pieces don't form a playable level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelErr {
    Empty,
    /// Index of the first row with a different length than the first one.
    RowLength(usize),
    AgentOutOfBounds(Pos),
    AgentOnWall(Pos),
    /// Box on a wall or outside the interior.
    BoxNotOnFloor(Pos),
    DuplicateBox(Pos),
    BoxUnderAgent(Pos),
}

impl Display for LevelErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            LevelErr::Empty => write!(f, "Empty level"),
            LevelErr::RowLength(row) => write!(f, "Row {} has a different length", row),
            LevelErr::AgentOutOfBounds(pos) => write!(f, "Player at {} is outside the map", pos),
            LevelErr::AgentOnWall(pos) => write!(f, "Player at {} is on a wall", pos),
            LevelErr::BoxNotOnFloor(pos) => write!(f, "Box at {} is not on floor", pos),
            LevelErr::DuplicateBox(pos) => write!(f, "Multiple boxes at {}", pos),
            LevelErr::BoxUnderAgent(pos) => write!(f, "Box at {} is under the player", pos),
        }
    }
}

impl Error for LevelErr {}

/// Result of trying to move the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// Nothing happened - wall, air or a box which can't move.
    Idle,
    Moving,
    Pushing,
}

#[derive(Debug, Clone)]
struct Snapshot {
    boxes: BoxSet,
    agent: Pos,
    num_moves: usize,
}

/// A loaded level and the live game state on top of it.
#[derive(Clone)]
pub struct Level {
    title: Option<String>,
    grid: Grid,
    dead_ends: Vec2d<bool>,
    boxes: BoxSet,
    agent: Pos,
    num_moves: usize,
    history: Vec<Snapshot>,
    highlights: Vec2d<Highlight>,
    selected: Option<Pos>,
    /// Cleared by every change of `boxes` or `agent`.
    reach: Option<Reachability>,
}

impl Level {
    /// Reclassifies interior air to ground and finds dead ends, this is done exactly once per level.
    pub fn new(mut grid: Grid, agent: Pos, boxes: Vec<Pos>) -> Result<Level, LevelErr> {
        if !grid.contains(agent) {
            return Err(LevelErr::AgentOutOfBounds(agent));
        }
        if grid.is_wall(agent) {
            return Err(LevelErr::AgentOnWall(agent));
        }

        let reclassified = grid.mark_interior(agent);
        debug!("Reclassified {} interior tiles as ground", reclassified);

        let mut occupied: Vec2d<bool> = grid.scratchpad();
        for &b in &boxes {
            if !grid.is_floor(b) {
                return Err(LevelErr::BoxNotOnFloor(b));
            }
            if occupied[b] {
                return Err(LevelErr::DuplicateBox(b));
            }
            if b == agent {
                return Err(LevelErr::BoxUnderAgent(b));
            }
            occupied[b] = true;
        }

        let dead_ends = find_dead_ends(&grid);
        let boxes = BoxSet::new(&grid, &boxes);
        let highlights = grid.scratchpad();
        Ok(Level {
            title: None,
            grid,
            dead_ends,
            boxes,
            agent,
            num_moves: 0,
            history: Vec::new(),
            highlights,
            selected: None,
            reach: None,
        })
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_ref().map(String::as_str)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dead_ends(&self) -> &Vec2d<bool> {
        &self.dead_ends
    }

    pub fn boxes(&self) -> &BoxSet {
        &self.boxes
    }

    pub fn agent(&self) -> Pos {
        self.agent
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    pub fn highlights(&self) -> &Vec2d<Highlight> {
        &self.highlights
    }

    pub fn has_win(&self) -> bool {
        self.boxes.positions().iter().all(|&b| self.grid.is_target(b))
    }

    /// Some box can never reach a target anymore. Doesn't detect all such situations.
    pub fn is_lost(&self) -> bool {
        solver::is_lost(
            &self.grid,
            &self.dead_ends,
            self.boxes.occupancy(),
            self.boxes.positions(),
        )
    }

    /// Floor without a box.
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.grid.is_floor(pos) && !self.boxes.has_box(pos)
    }

    pub fn move_agent(&mut self, dir: Dir) -> MoveStatus {
        let next = self.agent + dir;
        if !self.grid.is_floor(next) {
            return MoveStatus::Idle;
        }

        let status = if self.boxes.has_box(next) {
            let beyond = next + dir;
            if !self.is_empty(beyond) {
                return MoveStatus::Idle;
            }
            self.history.push(Snapshot {
                boxes: self.boxes.clone(),
                agent: self.agent,
                num_moves: self.num_moves,
            });
            self.boxes.move_box(next, beyond);
            MoveStatus::Pushing
        } else {
            MoveStatus::Moving
        };

        self.agent = next;
        self.num_moves += 1;
        self.reach = None;
        status
    }

    /// Returns to the state before the last push. Returns false if there was nothing to cancel.
    pub fn cancel_last_change(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.boxes = snapshot.boxes;
                self.agent = snapshot.agent;
                self.num_moves = snapshot.num_moves;
                self.reach = None;
                true
            }
            None => false,
        }
    }

    pub fn has_cancelable(&self) -> bool {
        !self.history.is_empty()
    }

    /// Where the agent can walk right now. Cached until the next change.
    pub fn reachability(&mut self) -> &Reachability {
        if self.reach.is_none() {
            self.reach = Some(self.compute_reachability());
        }
        match self.reach {
            Some(ref reach) => reach,
            None => unreachable!(),
        }
    }

    /// Same as `reachability` but never touches the cache.
    pub fn compute_reachability(&self) -> Reachability {
        Reachability::compute(
            &self.grid,
            Obstacles::WallsAndBoxes(self.boxes.occupancy()),
            self.agent,
        )
    }

    /// Shortest walk to `dest`, `None` if it's not reachable.
    pub fn path_to(&mut self, dest: Pos) -> Option<Vec<Dir>> {
        let reach = self.reachability();
        if reach.is_reached(dest) {
            Some(reach.shortest_path(dest))
        } else {
            None
        }
    }

    /// Tiles the box at `box_pos` can be pushed to by a single push right now.
    pub fn box_successors(&mut self, box_pos: Pos) -> Vec<Pos> {
        if !self.boxes.has_box(box_pos) {
            return Vec::new();
        }
        self.reachability();
        let reach = match self.reach {
            Some(ref reach) => reach,
            None => unreachable!(),
        };
        DIRECTIONS
            .iter()
            .filter(|&&dir| {
                reach.is_reached(box_pos - dir)
                    && self.grid.is_floor(box_pos + dir)
                    && !self.boxes.has_box(box_pos + dir)
            })
            .map(|&dir| box_pos + dir)
            .collect()
    }

    pub fn boxes_successors(&mut self) -> Vec<(Pos, Vec<Pos>)> {
        let positions = self.boxes.positions().to_vec();
        positions
            .into_iter()
            .map(|b| (b, self.box_successors(b)))
            .collect()
    }

    pub fn reset_highlight(&mut self) {
        self.highlights = self.grid.scratchpad();
        self.selected = None;
    }

    pub fn highlight(&mut self, positions: &[Pos], kind: Highlight) {
        for &pos in positions {
            if self.grid.contains(pos) {
                self.highlights[pos] = kind;
            }
        }
    }

    /// Selection survives `update_visual`, `None` clears it.
    pub fn select(&mut self, pos: Option<Pos>) {
        if let Some(old) = self.selected.take() {
            self.highlights[old] = Highlight::None;
        }
        let pos = pos.filter(|&pos| self.grid.contains(pos));
        if let Some(pos) = pos {
            self.highlights[pos] = Highlight::Selected;
            self.selected = Some(pos);
        }
    }

    /// Marks where the agent can walk, where boxes can be pushed and dead floor.
    ///
    /// Dead floor wins over the other two.
    pub fn update_visual(&mut self) {
        let selected = self.selected;
        self.reset_highlight();

        let reached = self.reachability().tiles().to_vec();
        self.highlight(&reached, Highlight::Attainable);

        let pushable: Vec<_> = self
            .boxes_successors()
            .into_iter()
            .flat_map(|(_, succs)| succs)
            .collect();
        self.highlight(&pushable, Highlight::Pushable);

        let dead: Vec<_> = self
            .grid
            .positions()
            .filter(|&pos| self.grid.is_floor(pos) && self.dead_ends[pos])
            .collect();
        self.highlight(&dead, Highlight::Error);

        self.select(selected);
    }

    /// Plays all the moves or none of them.
    ///
    /// Fails with the index of the first move which can't be made as described.
    pub fn apply(&mut self, moves: &Moves) -> Result<(), usize> {
        let mut copy = self.clone();
        for (i, mov) in moves.iter().enumerate() {
            let expected = if mov.is_push {
                MoveStatus::Pushing
            } else {
                MoveStatus::Moving
            };
            if copy.move_agent(mov.dir) != expected {
                return Err(i);
            }
        }
        *self = copy;
        Ok(())
    }

    /// Gets every box onto a target.
    pub fn solve_all_boxes<I: Interrupt + ?Sized>(
        &self,
        config: &Config,
        interrupt: &mut I,
    ) -> SolverOk {
        let problem = Problem {
            grid: &self.grid,
            dead_ends: &self.dead_ends,
            fixed: self.boxes.without(self.boxes.positions()),
            movable: self.boxes.positions().to_vec(),
            player_pos: self.agent,
            goal: Goal::AllTargets,
        };
        solver::search(&problem, config, interrupt)
    }

    /// Gets the box at `source` onto any free target, other boxes stay where they are.
    pub fn solve_one_box<I: Interrupt + ?Sized>(
        &self,
        source: Pos,
        config: &Config,
        interrupt: &mut I,
    ) -> Result<SolverOk, SolverErr> {
        let problem = self.one_box_problem(source, Goal::AllTargets)?;
        let mut solution = solver::search(&problem, config, interrupt);
        if let solver::Outcome::Solved(ref mut pushes) = solution.outcome {
            solver::improve(&self.grid, &problem.fixed, pushes);
        }
        Ok(solution)
    }

    /// Gets the box at `source` to `dest`, other boxes stay where they are.
    pub fn move_one_box<I: Interrupt + ?Sized>(
        &self,
        source: Pos,
        dest: Pos,
        config: &Config,
        interrupt: &mut I,
    ) -> Result<SolverOk, SolverErr> {
        if dest != source && !self.is_empty(dest) {
            return Err(SolverErr::DestinationNotEmpty(dest));
        }
        let problem = self.one_box_problem(source, Goal::Destination(dest))?;
        Ok(solver::search(&problem, config, interrupt))
    }

    fn one_box_problem(&self, source: Pos, goal: Goal) -> Result<Problem<'_>, SolverErr> {
        if !self.boxes.has_box(source) {
            return Err(SolverErr::NoBox(source));
        }
        Ok(Problem {
            grid: &self.grid,
            dead_ends: &self.dead_ends,
            fixed: self.boxes.without(&[source]),
            movable: vec![source],
            player_pos: self.agent,
            goal,
        })
    }

    /// Board after each push (or each move with `include_steps`) of `moves`.
    pub fn xsb_solution<'a>(
        &'a self,
        moves: &'a Moves,
        include_steps: bool,
    ) -> SolutionFormatter<'a> {
        SolutionFormatter::new(&self.grid, &self.boxes, self.agent, moves, include_steps)
    }

    /// Single tile moves which perform `pushes` starting from the current state.
    pub fn moves_for(&self, pushes: &[Push]) -> Result<Moves, TranslateErr> {
        solver::pushes_to_moves(&self.grid, &self.boxes, self.agent, pushes)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", MapFormatter::new(&self.grid, Some((&self.boxes, self.agent))))
    }
}

impl Debug for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
