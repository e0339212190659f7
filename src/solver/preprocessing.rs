use std::collections::VecDeque;

use log::debug;

use crate::data::{Pos, DIRECTIONS};
use crate::grid::Grid;
use crate::vec2d::Vec2d;

/// Marks tiles from which a lone box can never reach any target.
///
/// Works backwards from targets: a box on `n` can be pushed onto `t` if the agent
/// can stand on the tile behind `n`. Other boxes are ignored so this can't detect
/// deadlocks caused by boxes blocking each other.
///
/// Everything which isn't floor (walls, air) is marked dead too.
pub fn find_dead_ends(grid: &Grid) -> Vec2d<bool> {
    find_dead_ends_towards(grid, grid.targets())
}

/// Same as `find_dead_ends` but with arbitrary goal tiles instead of the level's targets.
pub fn find_dead_ends_towards(grid: &Grid, goals: &[Pos]) -> Vec2d<bool> {
    let mut dead_ends = grid.scratchpad_with_default(true);

    // LIFO would work too, the order doesn't matter
    let mut to_visit = VecDeque::new();
    for &target in goals {
        dead_ends[target] = false;
        to_visit.push_back(target);
    }

    while let Some(cur) = to_visit.pop_front() {
        for &dir in &DIRECTIONS {
            let box_pos = cur + dir;
            if !grid.is_floor(box_pos) || !dead_ends[box_pos] {
                continue;
            }
            let player_pos = box_pos + dir;
            if !grid.is_floor(player_pos) {
                continue;
            }

            dead_ends[box_pos] = false;
            to_visit.push_back(box_pos);
        }
    }

    debug!(
        "Found {} dead floor tiles",
        grid.positions()
            .filter(|&pos| grid.is_floor(pos) && dead_ends[pos])
            .count()
    );

    dead_ends
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::level::Level;

    #[test]
    fn dead_ends_one_target() {
        let level: Level = r"
#####
##@##
##$##
#  .#
#####"
            .parse()
            .unwrap();
        let expected = r"
11111
11111
11011
11001
11111
"
        .trim_start_matches('\n');
        assert_eq!(find_dead_ends(level.grid()).to_string(), expected);
        assert_eq!(level.dead_ends().to_string(), expected);
    }

    #[test]
    fn dead_ends_room() {
        // boxes along walls can never leave them
        let level: Level = r"
#######
# @   #
#  .  #
#    $#
#######"
            .parse()
            .unwrap();
        let expected = r"
1111111
1111111
1100011
1111111
1111111
"
        .trim_start_matches('\n');
        assert_eq!(level.dead_ends().to_string(), expected);
    }

    #[test]
    fn dead_ends_targets_along_wall() {
        let level: Level = r"
#######
#.@   #
#     #
#   $ #
#######"
            .parse()
            .unwrap();
        let expected = r"
1111111
1000011
1000011
1111111
1111111
"
        .trim_start_matches('\n');
        assert_eq!(level.dead_ends().to_string(), expected);
    }

    #[test]
    fn reload_is_deterministic() {
        let text = r"
    #####
    #   #
    #$  #
  ###  $##
  #  $ $ #
### # ## #   ######
#   # ## #####  ..#
# $  $          ..#
##### ### #@##  ..#
    #     #########
    #######
";
        let first: Level = text.parse().unwrap();
        let second: Level = text.parse().unwrap();
        assert_eq!(first.grid(), second.grid());
        assert_eq!(first.dead_ends(), second.dead_ends());
    }

    #[test]
    fn dead_ends_towards_destination() {
        let level: Level = r"
#######
#@$   #
#######"
            .parse()
            .unwrap();
        // no targets at all
        assert_eq!(level.dead_ends().to_string(), "1111111\n1111111\n1111111\n");

        let towards = find_dead_ends_towards(level.grid(), &[Pos::new(4, 1)]);
        assert_eq!(towards.to_string(), "1111111\n1100011\n1111111\n");
    }
}
