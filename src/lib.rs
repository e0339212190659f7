// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused)]

pub mod config;
pub mod data;
pub mod grid;
pub mod level;
pub mod map_formatter;
pub mod moves;
pub mod parser;
pub mod reachability;
pub mod solution_formatter;
pub mod solver;
pub mod state;
pub mod vec2d;

mod fs;

use std::error::Error;

use crate::config::Config;
use crate::level::Level;
use crate::solver::interrupt::Interrupt;
use crate::solver::SolverOk;

pub use crate::fs::read_file;

pub trait LoadLevel {
    /// Loads the first level of a level or pack file.
    fn load_level(&self) -> Result<Level, Box<dyn Error>>;
}

impl LoadLevel for str {
    fn load_level(&self) -> Result<Level, Box<dyn Error>> {
        let text = read_file(self)?;
        let source = parser::parse_pack(&text)
            .into_iter()
            .next()
            .ok_or_else(|| format!("No level in {}", self))?;
        Ok(source.parse()?)
    }
}

pub trait Solve {
    fn solve<I: Interrupt + ?Sized>(&self, config: &Config, interrupt: &mut I) -> SolverOk;
}

impl Solve for Level {
    fn solve<I: Interrupt + ?Sized>(&self, config: &Config, interrupt: &mut I) -> SolverOk {
        self.solve_all_boxes(config, interrupt)
    }
}
