pub mod interrupt;
pub mod preprocessing;

mod a_star;
mod backtracking;

use std::collections::BinaryHeap;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::time::{Duration, Instant};

use fnv::FnvHashSet;
use log::{debug, info};
use separator::Separatable;
use typed_arena::Arena;

use crate::config::{Config, Heuristic};
use crate::data::{Dir, Pos, DIRECTIONS};
use crate::grid::Grid;
use crate::moves::Push;
use crate::reachability::{canonical_position, Obstacles, Reachability};
use crate::state::BoxSet;
use crate::vec2d::Vec2d;

use self::a_star::{QueueItem, SearchNode};
use self::backtracking::backtrack_pushes;
use self::interrupt::{Interrupt, Progress};
use self::preprocessing::find_dead_ends_towards;

pub use self::a_star::Stats;
pub use self::backtracking::{pushes_to_moves, TranslateErr};

/// A solve can't even start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverErr {
    NoBox(Pos),
    DestinationNotEmpty(Pos),
}

impl Display for SolverErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SolverErr::NoBox(pos) => write!(f, "No box at {}", pos),
            SolverErr::DestinationNotEmpty(pos) => {
                write!(f, "Destination {} is not an empty floor tile", pos)
            }
        }
    }
}

impl Error for SolverErr {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved(Vec<Push>),
    /// Every reachable state was explored - there is no solution.
    Exhausted,
    /// The interrupt asked to stop. Says nothing about solvability.
    Cancelled,
}

#[derive(Clone)]
pub struct SolverOk {
    pub outcome: Outcome,
    pub stats: Stats,
    pub elapsed: Duration,
}

impl SolverOk {
    fn new(outcome: Outcome, stats: Stats, elapsed: Duration) -> Self {
        Self {
            outcome,
            stats,
            elapsed,
        }
    }

    pub fn pushes(&self) -> Option<&[Push]> {
        match self.outcome {
            Outcome::Solved(ref pushes) => Some(pushes),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.pushes().is_some()
    }
}

impl Display for SolverOk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let explored = self.stats.total_explored().separated_string();
        match self.outcome {
            Outcome::Solved(_) => write!(
                f,
                "Solution found after exploring {} states in {:.2} s",
                explored,
                self.elapsed.as_secs_f64()
            ),
            Outcome::Exhausted => write!(
                f,
                "Failed after exploring {} states (no solution possible)",
                explored
            ),
            Outcome::Cancelled => write!(f, "Cancelled after exploring {} states", explored),
        }
    }
}

impl Debug for SolverOk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)?;
        if let Outcome::Solved(ref pushes) = self.outcome {
            writeln!(f, "Pushes: {}", pushes.len())?;
        }
        write!(f, "{}", self.stats)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Goal {
    /// Every movable box on a target.
    AllTargets,
    /// The only movable box on this tile.
    Destination(Pos),
}

/// Everything a solve needs. Borrowed from the live level which stays untouched.
#[derive(Debug)]
pub(crate) struct Problem<'a> {
    pub(crate) grid: &'a Grid,
    /// Dead ends relative to the level's targets.
    pub(crate) dead_ends: &'a Vec2d<bool>,
    /// Boxes the solver may not move - they behave like walls.
    pub(crate) fixed: BoxSet,
    pub(crate) movable: Vec<Pos>,
    pub(crate) player_pos: Pos,
    pub(crate) goal: Goal,
}

impl Problem<'_> {
    fn is_goal_tile(&self, pos: Pos) -> bool {
        match self.goal {
            Goal::AllTargets => self.grid.is_target(pos),
            Goal::Destination(dest) => pos == dest,
        }
    }

    fn is_solved(&self, boxes: &[Pos]) -> bool {
        boxes.iter().all(|&b| self.is_goal_tile(b))
    }

    /// Target the heuristic measures against.
    ///
    /// With multiple targets this is just the lower-right-most one
    /// so the heuristic only orders states, it doesn't estimate anything.
    fn reference_target(&self) -> Option<Pos> {
        match self.goal {
            Goal::Destination(dest) => Some(dest),
            Goal::AllTargets => self.grid.targets().iter().cloned().max_by_key(|p| (p.y, p.x)),
        }
    }

    fn occupancy(&self, boxes: &[Pos]) -> Vec2d<bool> {
        let mut occupied = self.fixed.occupancy().clone();
        for &b in boxes {
            occupied[b] = true;
        }
        occupied
    }
}

pub(crate) fn search<I: Interrupt + ?Sized>(
    problem: &Problem<'_>,
    config: &Config,
    interrupt: &mut I,
) -> SolverOk {
    let started = Instant::now();
    let mut stats = Stats::new();
    let grid = problem.grid;

    let mut initial_boxes = problem.movable.clone();
    initial_boxes.sort();
    stats.add_created(0);

    if problem.is_solved(&initial_boxes) {
        info!("Already solved");
        return SolverOk::new(Outcome::Solved(Vec::new()), stats, started.elapsed());
    }

    // dead ends towards some other tile than targets have to be computed for this solve
    let own_dead_ends;
    let dead_ends = match problem.goal {
        Goal::AllTargets => problem.dead_ends,
        Goal::Destination(dest) => {
            own_dead_ends = find_dead_ends_towards(grid, &[dest]);
            &own_dead_ends
        }
    };

    let reference = problem.reference_target();
    let surface = (grid.width() * grid.height()) as u64;
    let estimate = |boxes: &[Pos]| heuristic(config.heuristic(), surface, reference, boxes);

    debug!(
        "Search called: {} movable boxes, goal {:?}, heuristic {}",
        initial_boxes.len(),
        problem.goal,
        config.heuristic()
    );

    let arena = Arena::new();
    let mut seen = FnvHashSet::default();
    let mut to_visit = BinaryHeap::new();
    let mut seq = 0;

    let root_occupied = problem.occupancy(&initial_boxes);
    let root_key = canonical_position(grid, &root_occupied, problem.player_pos);
    seen.insert((initial_boxes.clone(), root_key));
    let root: &SearchNode<'_> = arena.alloc(SearchNode::root(initial_boxes, problem.player_pos));
    to_visit.push(QueueItem {
        cost: estimate(&root.boxes),
        seq,
        node: root,
    });

    let mut explored = 0;
    while let Some(QueueItem { node, .. }) = to_visit.pop() {
        if explored % config.yield_interval() == 0 {
            let progress = Progress {
                explored,
                elapsed: started.elapsed(),
            };
            if interrupt.check(&progress) {
                info!("Cancelled: {}", progress);
                return SolverOk::new(Outcome::Cancelled, stats, started.elapsed());
            }
        }
        explored += 1;
        if stats.add_explored(node.depth) {
            debug!("Explored new depth: {}", node.depth);
        }

        let mut occupied = problem.occupancy(&node.boxes);
        let reach = Reachability::compute(
            grid,
            Obstacles::WallsAndBoxes(&occupied),
            node.player_pos,
        );

        for (index, &box_pos) in node.boxes.iter().enumerate() {
            for &dir in &DIRECTIONS {
                let push_from = box_pos - dir;
                let dest = box_pos + dir;
                if !reach.is_reached(push_from) || !grid.is_floor(dest) || occupied[dest] {
                    continue;
                }

                let push = Push::new(box_pos, dir);
                let mut new_boxes = node.boxes.clone();
                new_boxes[index] = dest;

                occupied[box_pos] = false;
                occupied[dest] = true;
                let player_key = canonical_position(grid, &occupied, box_pos);
                let lost = is_lost_towards(grid, dead_ends, &occupied, &new_boxes, |pos| {
                    problem.is_goal_tile(pos)
                });
                occupied[dest] = false;
                occupied[box_pos] = true;

                new_boxes.sort();
                let depth = node.depth + 1;
                stats.add_created(depth);
                if !seen.insert((new_boxes.clone(), player_key)) {
                    stats.add_duplicate(depth);
                    continue;
                }

                let cost = u64::from(reach.distance(push_from)) + 1;
                let child: &SearchNode<'_> = arena.alloc(node.child(new_boxes, push, cost));

                if problem.is_solved(&child.boxes) {
                    let pushes = backtrack_pushes(child);
                    info!(
                        "Solved: {} pushes, {} moves, explored {} states",
                        pushes.len(),
                        child.dist,
                        explored
                    );
                    return SolverOk::new(Outcome::Solved(pushes), stats, started.elapsed());
                }

                if lost {
                    stats.add_pruned(depth);
                    continue;
                }

                seq += 1;
                to_visit.push(QueueItem {
                    cost: child.dist + estimate(&child.boxes),
                    seq,
                    node: child,
                });
            }
        }
    }

    info!("No solution after exploring {} states", explored);
    SolverOk::new(Outcome::Exhausted, stats, started.elapsed())
}

fn heuristic(kind: Heuristic, surface: u64, reference: Option<Pos>, boxes: &[Pos]) -> u64 {
    let reference = match reference {
        Some(pos) => pos,
        None => return 0,
    };
    boxes
        .iter()
        .map(|b| {
            let m = u64::from(b.dist(reference));
            match kind {
                Heuristic::Labyrinth => (surface * m).saturating_sub(m * (m + 1) / 2),
                Heuristic::Manhattan => m,
                Heuristic::Zero => 0,
            }
        })
        .sum()
}

/// Going around a box, every two consecutive directions are perpendicular.
const AROUND: [Dir; 5] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left, Dir::Up];

/// True if some box which is not on a target can never be moved onto one.
///
/// `occupied` contains all boxes, `boxes` are the ones to check.
/// Only detects dead ends, boxes stuck in corners and pairs of boxes stuck along walls
/// (two boxes next to each other with walls on the same side).
pub fn is_lost(grid: &Grid, dead_ends: &Vec2d<bool>, occupied: &Vec2d<bool>, boxes: &[Pos]) -> bool {
    is_lost_towards(grid, dead_ends, occupied, boxes, |pos| grid.is_target(pos))
}

fn is_lost_towards<F>(
    grid: &Grid,
    dead_ends: &Vec2d<bool>,
    occupied: &Vec2d<bool>,
    boxes: &[Pos],
    is_goal_tile: F,
) -> bool
where
    F: Fn(Pos) -> bool,
{
    let blocked = |pos: Pos| !grid.is_floor(pos);

    for &b in boxes {
        if is_goal_tile(b) {
            continue;
        }
        if dead_ends[b] {
            return true;
        }

        for pair in AROUND.windows(2) {
            if blocked(b + pair[0]) && blocked(b + pair[1]) {
                return true;
            }
        }

        for &dir in &DIRECTIONS {
            let side = b + dir;
            if !grid.is_floor(side) || !occupied[side] {
                continue;
            }
            let d1 = dir.rotate();
            let d2 = d1.inverse();
            if (blocked(b + d1) && blocked(side + d1)) || (blocked(b + d2) && blocked(side + d2)) {
                return true;
            }
        }
    }
    false
}

/// Moves the box a bit further if it ended right next to more targets.
///
/// Only for single box solutions, the box is at the destination of the last push
/// and `fixed` are all the other boxes.
pub(crate) fn improve(grid: &Grid, fixed: &BoxSet, pushes: &mut Vec<Push>) {
    let last = match pushes.last() {
        Some(&push) => push,
        None => return,
    };

    let mut occupied = fixed.occupancy().clone();
    let mut box_pos = last.dest();
    let mut player_pos = last.box_pos;
    occupied[box_pos] = true;

    let before = pushes.len();
    let empty = |occupied: &Vec2d<bool>, pos: Pos| grid.is_floor(pos) && !occupied[pos];

    let mut dir = last.dir;
    loop {
        // keep going in the same direction
        loop {
            let next = box_pos + dir;
            if !empty(&occupied, next) || !grid.is_target(next) {
                break;
            }
            pushes.push(Push::new(box_pos, dir));
            occupied[box_pos] = false;
            occupied[next] = true;
            player_pos = box_pos;
            box_pos = next;
        }

        // then try turning once
        if dir != last.dir {
            break;
        }
        let side = dir.rotate();
        let reach = Reachability::compute(grid, Obstacles::WallsAndBoxes(&occupied), player_pos);
        let turn = [side, side.inverse()].iter().cloned().find(|&d| {
            let to = box_pos + d;
            let from = box_pos - d;
            grid.is_target(to) && empty(&occupied, to) && empty(&occupied, from) && reach.is_reached(from)
        });
        match turn {
            Some(d) => dir = d,
            None => break,
        }
    }

    if pushes.len() > before {
        debug!("Improved by {} pushes", pushes.len() - before);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::Dir::*;
    use crate::level::Level;
    use crate::solver::interrupt::{CancelToken, NeverCancel};

    fn solve(level: &Level) -> SolverOk {
        level.solve_all_boxes(&Config::default(), &mut NeverCancel)
    }

    #[test]
    fn straight_down() {
        let level: Level = r"
-----
--@--
--$--
-----
--.--
"
        .parse()
        .unwrap();
        let solution = solve(&level);
        assert_eq!(
            solution.outcome,
            Outcome::Solved(vec![
                Push::new(Pos::new(2, 2), Down),
                Push::new(Pos::new(2, 3), Down),
            ])
        );
        assert!(solution.to_string().starts_with("Solution found after exploring 2 states in"));
    }

    #[test]
    fn wall_in_the_way() {
        let level: Level = r"
#####
##@##
##$##
#####
##.##
"
        .parse()
        .unwrap();
        let solution = solve(&level);
        assert_eq!(solution.outcome, Outcome::Exhausted);
        assert_eq!(solution.stats.total_explored(), 1);
        assert_eq!(
            solution.to_string(),
            "Failed after exploring 1 states (no solution possible)"
        );
    }

    #[test]
    fn box_in_corner() {
        let level: Level = r"
#####
#$  #
#  .#
#@  #
#####
"
        .parse()
        .unwrap();
        assert!(level.is_lost());
        assert!(is_lost(
            level.grid(),
            level.dead_ends(),
            level.boxes().occupancy(),
            level.boxes().positions()
        ));
        assert_eq!(solve(&level).outcome, Outcome::Exhausted);
    }

    #[test]
    fn corner_on_target_is_fine() {
        let level: Level = r"
#####
#*  #
#  $#
#@ .#
#####
"
        .parse()
        .unwrap();
        assert!(!level.is_lost());
    }

    #[test]
    fn frozen_pair() {
        let level: Level = r"
#######
#.$$..#
#     #
#  @  #
#######
"
        .parse()
        .unwrap();
        // neither box is on a dead end or in a corner
        assert!(!level.dead_ends()[Pos::new(2, 1)]);
        assert!(level.is_lost());

        let level: Level = r"
#######
#     #
# $$  #
#  .. #
#  @  #
#######
"
        .parse()
        .unwrap();
        assert!(!level.is_lost());
    }

    #[test]
    fn cancel_immediately() {
        let level: Level = r"
-----
--@--
--$--
-----
--.--
"
        .parse()
        .unwrap();
        let before = level.clone();

        let mut calls = 0;
        let solution = level.solve_all_boxes(&Config::default(), &mut |progress: &Progress| {
            calls += 1;
            assert_eq!(progress.explored, 0);
            true
        });
        assert_eq!(calls, 1);
        assert_eq!(solution.outcome, Outcome::Cancelled);
        assert_eq!(solution.stats.total_explored(), 0);
        assert_eq!(solution.to_string(), "Cancelled after exploring 0 states");
        assert_eq!(level.boxes(), before.boxes());
        assert_eq!(level.agent(), before.agent());
        assert_eq!(level.grid(), before.grid());

        let token = CancelToken::new();
        token.cancel();
        let solution = level.solve_all_boxes(&Config::default(), &mut token.clone());
        assert_eq!(solution.outcome, Outcome::Cancelled);
    }

    #[test]
    fn interrupt_interval() {
        let level: Level = r"
#######
#     #
# $$  #
# ..  #
#  @  #
#######
"
        .parse()
        .unwrap();
        let config = Config::new(2, Heuristic::Zero).unwrap();
        let mut checked = Vec::new();
        let solution = level.solve_all_boxes(&config, &mut |p: &Progress| {
            checked.push(p.explored);
            false
        });
        assert!(solution.is_solved());
        for (i, &explored) in checked.iter().enumerate() {
            assert_eq!(explored, i * 2);
        }
    }

    #[test]
    fn already_solved() {
        let level: Level = r"
#####
#@*.#
#####
"
        .parse()
        .unwrap();
        let solution = solve(&level);
        assert_eq!(solution.outcome, Outcome::Solved(Vec::new()));
        assert_eq!(solution.stats.total_explored(), 0);
    }

    #[test]
    fn two_boxes() {
        let mut level: Level = r"
######
#    #
# $$ #
# .. #
#  @ #
######
"
        .parse()
        .unwrap();
        for &heuristic in &[Heuristic::Labyrinth, Heuristic::Manhattan, Heuristic::Zero] {
            let config = Config::new(31, heuristic).unwrap();
            let solution = level.solve_all_boxes(&config, &mut NeverCancel);
            let pushes = solution.pushes().unwrap();
            assert_eq!(pushes.len(), 2);
            let moves = level.moves_for(pushes).unwrap();
            let mut copy = level.clone();
            copy.apply(&moves).unwrap();
            assert!(copy.has_win());
        }

        let solution = solve(&level);
        let moves = level.moves_for(solution.pushes().unwrap()).unwrap();
        level.apply(&moves).unwrap();
        assert!(level.has_win());
    }

    #[test]
    fn search_terminates() {
        // 3 boxes, 2 targets
        let level: Level = r"
#####
#@  #
# $$#
# $.#
#  .#
#####
"
        .parse()
        .unwrap();
        let solution = solve(&level);
        assert_eq!(solution.outcome, Outcome::Exhausted);
        // 12 floor tiles: at most C(12, 3) box layouts times 12 player regions
        assert!(solution.stats.total_explored() <= 220 * 12);
        assert!(solution.stats.total_explored() > 0);
    }

    #[test]
    fn dead_ends_agree_with_search() {
        let room = [
            "#######", //
            "#     #",
            "#  .  #",
            "#     #",
            "#######",
        ];
        let template: Level = r"
#######
#@    #
#  .  #
#     #
#######
"
        .parse()
        .unwrap();
        let dead_ends = template.dead_ends().clone();

        for y in 1..4 {
            for x in 1..6 {
                let box_pos = Pos::new(x, y);
                let agent = if box_pos == Pos::new(1, 1) {
                    Pos::new(5, 3)
                } else {
                    Pos::new(1, 1)
                };

                let mut rows: Vec<Vec<char>> = room.iter().map(|r| r.chars().collect()).collect();
                let cell = &mut rows[y as usize][x as usize];
                *cell = if *cell == '.' { '*' } else { '$' };
                rows[agent.y as usize][agent.x as usize] = '@';
                let text: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
                let level: Level = text.join("\n").parse().unwrap();

                let solved = solve(&level).is_solved();
                assert_eq!(solved, !dead_ends[box_pos], "box at {}", box_pos);
            }
        }
    }

    #[test]
    fn heuristics() {
        let boxes = [Pos::new(0, 0), Pos::new(2, 1)];
        let reference = Some(Pos::new(2, 2));
        assert_eq!(heuristic(Heuristic::Manhattan, 25, reference, &boxes), 4 + 1);
        assert_eq!(heuristic(Heuristic::Labyrinth, 25, reference, &boxes), (100 - 10) + (25 - 1));
        assert_eq!(heuristic(Heuristic::Zero, 25, reference, &boxes), 0);
        assert_eq!(heuristic(Heuristic::Manhattan, 25, None, &boxes), 0);
    }
}
