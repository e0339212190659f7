use std::fmt::{self, Debug, Display, Formatter};

use crate::data::Pos;
use crate::grid::Grid;
use crate::map_formatter::MapFormatter;
use crate::moves::Moves;
use crate::state::BoxSet;

/// Replays moves and prints the board after each push (or each move).
///
/// The moves must be valid for the starting state.
pub struct SolutionFormatter<'a> {
    grid: &'a Grid,
    boxes: &'a BoxSet,
    player_pos: Pos,
    moves: &'a Moves,
    include_steps: bool,
}

impl<'a> SolutionFormatter<'a> {
    pub(crate) fn new(
        grid: &'a Grid,
        boxes: &'a BoxSet,
        player_pos: Pos,
        moves: &'a Moves,
        include_steps: bool,
    ) -> Self {
        Self {
            grid,
            boxes,
            player_pos,
            moves,
            include_steps,
        }
    }
}

impl Display for SolutionFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut boxes = self.boxes.clone();
        let mut player_pos = self.player_pos;
        writeln!(f, "{}", MapFormatter::new(self.grid, Some((&boxes, player_pos))))?;

        for mov in self.moves {
            let new_player_pos = player_pos + mov.dir;
            if boxes.has_box(new_player_pos) {
                boxes.move_box(new_player_pos, new_player_pos + mov.dir);
            }
            player_pos = new_player_pos;
            if mov.is_push || self.include_steps {
                writeln!(f, "{}", MapFormatter::new(self.grid, Some((&boxes, player_pos))))?;
            }
        }
        Ok(())
    }
}

impl Debug for SolutionFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::level::Level;
    use crate::moves::Push;
    use crate::data::{Dir, Pos};

    #[test]
    fn pushes_only_and_all_steps() {
        let level: Level = r"
######
#@ $.#
######
"
        .parse()
        .unwrap();
        let moves = level.moves_for(&[Push::new(Pos::new(3, 1), Dir::Right)]).unwrap();
        assert_eq!(moves.to_string(), "rR");

        let pushes = r"
######
#@ $.#
######

######
#  @*#
######

"
        .trim_start_matches('\n');
        assert_eq!(level.xsb_solution(&moves, false).to_string(), pushes);

        let steps = r"
######
#@ $.#
######

######
# @$.#
######

######
#  @*#
######

"
        .trim_start_matches('\n');
        assert_eq!(level.xsb_solution(&moves, true).to_string(), steps);
    }
}
