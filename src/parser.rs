use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::data::{MapCell, Pos};
use crate::grid::Grid;
use crate::level::{Level, LevelErr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErr {
    /// Unknown symbol at (row, column).
    Pos(usize, usize),
    MultiplePlayers,
    NoPlayer,
    Level(LevelErr),
}

impl Display for ParserErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ParserErr::Pos(r, c) => write!(f, "Invalid cell at pos: [{}, {}]", r, c),
            ParserErr::MultiplePlayers => write!(f, "More than one player"),
            ParserErr::NoPlayer => write!(f, "No player"),
            ParserErr::Level(ref err) => write!(f, "Invalid level: {}", err),
        }
    }
}

impl Error for ParserErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ParserErr::Level(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<LevelErr> for ParserErr {
    fn from(err: LevelErr) -> Self {
        ParserErr::Level(err)
    }
}

impl FromStr for Level {
    type Err = ParserErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses (a subset of) the format described [here](http://www.sokobano.de/wiki/index.php?title=Level_format)
pub fn parse(level: &str) -> Result<Level, ParserErr> {
    // trim so we can specify levels using raw strings more easily
    let level = level.trim_matches('\n').trim_end();

    let mut rows = Vec::new();
    let mut boxes = Vec::new();
    let mut player_pos = None;

    for (r, line) in level.lines().enumerate() {
        let mut row = Vec::new();
        for (c, cur_char) in line.chars().enumerate() {
            let pos = Pos::new(c as i32, r as i32);

            let cell = match cur_char {
                '#' => MapCell::Wall,
                // blank might be outside - it's reclassified later
                ' ' => MapCell::Air,
                '-' | '_' => MapCell::Ground,
                '.' => MapCell::Target,
                'b' | '$' => {
                    boxes.push(pos);
                    MapCell::Ground
                }
                'B' | '*' => {
                    boxes.push(pos);
                    MapCell::Target
                }
                'p' | '@' => {
                    if player_pos.is_some() {
                        return Err(ParserErr::MultiplePlayers);
                    }
                    player_pos = Some(pos);
                    MapCell::Ground
                }
                'P' | '+' => {
                    if player_pos.is_some() {
                        return Err(ParserErr::MultiplePlayers);
                    }
                    player_pos = Some(pos);
                    MapCell::Target
                }
                _ => return Err(ParserErr::Pos(r, c)),
            };
            row.push(cell);
        }
        rows.push(row);
    }

    let player_pos = player_pos.ok_or(ParserErr::NoPlayer)?;

    // level files usually don't pad rows with trailing blanks
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, MapCell::Air);
    }

    let grid = Grid::new(rows)?;
    Ok(Level::new(grid, player_pos, boxes)?)
}

/// One level cut out of a pack file, not parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSource {
    pub title: Option<String>,
    pub text: String,
}

impl LevelSource {
    pub fn parse(&self) -> Result<Level, ParserErr> {
        let level = parse(&self.text)?;
        Ok(match self.title {
            Some(ref title) => level.with_title(title.as_str()),
            None => level,
        })
    }
}

const BOARD_SYMBOLS: &str = "#$.*@+-_pPbB";

fn is_board_line(line: &str) -> bool {
    let line = line.trim_end();
    !line.is_empty() && line.chars().all(|c| c == ' ' || BOARD_SYMBOLS.contains(c))
}

/// Splits a pack into levels.
///
/// Levels are separated by blank lines, `;` starts a comment line,
/// `Title: ...` names the level being read (or the next one) and other text is skipped.
pub fn parse_pack(text: &str) -> Vec<LevelSource> {
    let mut sources = Vec::new();
    let mut title = None;
    let mut board: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !board.is_empty() {
                sources.push(LevelSource {
                    title: title.take(),
                    text: board.join("\n"),
                });
                board.clear();
            }
        } else if trimmed.starts_with(';') {
            continue;
        } else if is_board_line(line) {
            board.push(line.trim_end());
        } else if trimmed.starts_with("Title:") {
            title = Some(trimmed["Title:".len()..].trim().to_string());
        }
    }
    if !board.is_empty() {
        sources.push(LevelSource {
            title,
            text: board.join("\n"),
        });
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols() {
        let level: Level = "#-_.$*@ #".parse().unwrap();
        let grid = level.grid();
        assert_eq!(grid.cell(Pos::new(1, 0)), MapCell::Ground);
        assert_eq!(grid.cell(Pos::new(2, 0)), MapCell::Ground);
        assert_eq!(grid.cell(Pos::new(3, 0)), MapCell::Target);
        assert_eq!(grid.cell(Pos::new(4, 0)), MapCell::Ground);
        assert_eq!(grid.cell(Pos::new(5, 0)), MapCell::Target);
        assert_eq!(grid.cell(Pos::new(6, 0)), MapCell::Ground);
        // reachable blank
        assert_eq!(grid.cell(Pos::new(7, 0)), MapCell::Ground);
        assert_eq!(level.boxes().positions(), &[Pos::new(4, 0), Pos::new(5, 0)]);
        assert_eq!(level.agent(), Pos::new(6, 0));

        let level: Level = "#+b#B".parse().unwrap();
        assert_eq!(level.agent(), Pos::new(1, 0));
        assert_eq!(level.grid().cell(Pos::new(1, 0)), MapCell::Target);
        assert_eq!(level.boxes().len(), 2);
    }

    #[test]
    fn errors() {
        assert_eq!("#@x#".parse::<Level>().unwrap_err(), ParserErr::Pos(0, 2));
        assert_eq!("#@\n#@#".parse::<Level>().unwrap_err(), ParserErr::MultiplePlayers);
        assert_eq!("#@+#".parse::<Level>().unwrap_err(), ParserErr::MultiplePlayers);
        assert_eq!("#$.#".parse::<Level>().unwrap_err(), ParserErr::NoPlayer);
        assert_eq!("".parse::<Level>().unwrap_err(), ParserErr::NoPlayer);
        assert_eq!(
            ParserErr::from(LevelErr::Empty).to_string(),
            "Invalid level: Empty level"
        );
    }

    #[test]
    fn pack() {
        let text = r"
; a comment
Title: First
####
#@$.#
####

Author: somebody
-----
-@$.-
-----
Title: Second


; trailing comment
";
        let sources = parse_pack(text);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title.as_ref().map(String::as_str), Some("First"));
        assert_eq!(sources[0].text, "####\n#@$.#\n####");
        assert_eq!(sources[1].title.as_ref().map(String::as_str), Some("Second"));

        let level = sources[0].parse().unwrap();
        assert_eq!(level.title(), Some("First"));
        assert_eq!(level.boxes().positions(), &[Pos::new(2, 1)]);
        let level = sources[1].parse().unwrap();
        assert_eq!(level.agent(), Pos::new(1, 1));
    }

    #[test]
    fn pack_without_titles() {
        let sources = parse_pack("#@$.#\n\n\n#.$@#\n");
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.title.is_none()));
        assert_eq!(sources[1].text, "#.$@#");
    }
}
