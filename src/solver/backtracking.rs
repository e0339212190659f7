use std::error::Error;
use std::fmt::{self, Display, Formatter};

use log::trace;

use crate::data::Pos;
use crate::grid::Grid;
use crate::moves::{Move, Moves, Push};
use crate::reachability::{Obstacles, Reachability};
use crate::state::BoxSet;

use super::a_star::SearchNode;

// Terminology:
// move = changing player position by one cell
// push = a move that changes a box position
// step = a move that doesn't change a box position

/// Pushes leading from the root of the search tree to `final_node`.
pub(crate) fn backtrack_pushes(final_node: &SearchNode<'_>) -> Vec<Push> {
    let mut pushes = Vec::with_capacity(final_node.depth);
    let mut cur = final_node;
    while let (Some(push), Some(prev)) = (cur.push, cur.prev) {
        pushes.push(push);
        cur = prev;
    }
    pushes.reverse();
    pushes
}

/// The pushes don't fit the board they're replayed on.
///
/// Pushes found by the solver always fit so this means a bug, not bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateErr {
    NoBox(Pos),
    Blocked(Pos),
    Unreachable { from: Pos, to: Pos },
}

impl Display for TranslateErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            TranslateErr::NoBox(pos) => write!(f, "No box to push at {}", pos),
            TranslateErr::Blocked(pos) => write!(f, "Box can't be pushed onto {}", pos),
            TranslateErr::Unreachable { from, to } => {
                write!(f, "Can't walk from {} to {} to push", from, to)
            }
        }
    }
}

impl Error for TranslateErr {}

/// Expands pushes into single-tile moves - walking to the right side of each box, then pushing it.
pub fn pushes_to_moves(
    grid: &Grid,
    boxes: &BoxSet,
    player_pos: Pos,
    pushes: &[Push],
) -> Result<Moves, TranslateErr> {
    let mut boxes = boxes.clone();
    let mut player_pos = player_pos;
    let mut moves = Moves::default();

    for &push in pushes {
        if !boxes.has_box(push.box_pos) {
            return Err(TranslateErr::NoBox(push.box_pos));
        }
        let dest = push.dest();
        if !grid.is_floor(dest) || boxes.has_box(dest) {
            return Err(TranslateErr::Blocked(dest));
        }

        let reach = Reachability::compute(
            grid,
            Obstacles::WallsAndBoxes(boxes.occupancy()),
            player_pos,
        );
        let push_from = push.player_pos();
        if !reach.is_reached(push_from) {
            return Err(TranslateErr::Unreachable {
                from: player_pos,
                to: push_from,
            });
        }

        let steps = reach.shortest_path(push_from);
        trace!("{} steps then push {}", steps.len(), push);
        for dir in steps {
            moves.add(Move::new(dir, false));
        }
        moves.add(Move::new(push.dir, true));

        boxes.move_box(push.box_pos, dest);
        player_pos = push.box_pos;
    }

    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::Dir::*;
    use crate::level::Level;

    #[test]
    fn walking_between_pushes() {
        let level: Level = r"
#######
#@    #
# $ $ #
#  .. #
#######
"
        .parse()
        .unwrap();
        let pushes = [
            Push::new(Pos::new(4, 2), Down),
            Push::new(Pos::new(2, 2), Right),
            Push::new(Pos::new(3, 2), Down),
        ];
        let moves = level.moves_for(&pushes).unwrap();
        let text = moves.to_string();
        assert!(text.starts_with("rrrD"));
        assert!(text.ends_with("RurD"));
        assert_eq!(moves.move_cnt(), 13);
        assert_eq!(moves.push_cnt(), 3);

        let mut level = level;
        level.apply(&moves).unwrap();
        assert!(level.has_win());
    }

    #[test]
    fn inconsistent_pushes() {
        let level: Level = r"
######
#@$ .#
######
"
        .parse()
        .unwrap();

        assert_eq!(
            level.moves_for(&[Push::new(Pos::new(3, 1), Right)]),
            Err(TranslateErr::NoBox(Pos::new(3, 1)))
        );
        assert_eq!(
            level.moves_for(&[Push::new(Pos::new(2, 1), Up)]),
            Err(TranslateErr::Blocked(Pos::new(2, 0)))
        );
        assert_eq!(
            level.moves_for(&[Push::new(Pos::new(2, 1), Left)]),
            Err(TranslateErr::Unreachable {
                from: Pos::new(1, 1),
                to: Pos::new(3, 1),
            })
        );

        let moves = level
            .moves_for(&[Push::new(Pos::new(2, 1), Right), Push::new(Pos::new(3, 1), Right)])
            .unwrap();
        assert_eq!(moves.to_string(), "RR");
    }

    #[test]
    fn unreachable_push_side() {
        let level: Level = r"
#######
#@$$ .#
#######
"
        .parse()
        .unwrap();
        assert_eq!(
            level.moves_for(&[Push::new(Pos::new(3, 1), Right)]),
            Err(TranslateErr::Unreachable {
                from: Pos::new(1, 1),
                to: Pos::new(2, 1),
            })
        );
    }
}
