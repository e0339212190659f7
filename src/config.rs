use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// How the solver estimates the remaining cost of a state.
///
/// None of them is a lower bound on the remaining pushes when several boxes move,
/// they only decide which states get explored first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heuristic {
    /// Sum over boxes of `surface * m - m * (m + 1) / 2`
    /// where `m` is the manhattan distance to the reference target.
    /// Strongly prefers getting boxes close, works well in labyrinth-like levels.
    Labyrinth,
    /// Sum over boxes of the manhattan distance to the reference target.
    Manhattan,
    /// Uniform cost search.
    Zero,
}

impl Display for Heuristic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Heuristic::Labyrinth => write!(f, "labyrinth"),
            Heuristic::Manhattan => write!(f, "manhattan"),
            Heuristic::Zero => write!(f, "zero"),
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "labyrinth" => Ok(Heuristic::Labyrinth),
            "manhattan" => Ok(Heuristic::Manhattan),
            "zero" => Ok(Heuristic::Zero),
            _ => Err(format!("Unknown heuristic: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErr {
    ZeroInterval,
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigErr::ZeroInterval => write!(f, "Yield interval must be positive"),
        }
    }
}

impl Error for ConfigErr {}

/// Settings passed explicitly to every solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Never 0, `new` is the only way to set it.
    yield_interval: usize,
    heuristic: Heuristic,
}

impl Config {
    pub fn new(yield_interval: usize, heuristic: Heuristic) -> Result<Self, ConfigErr> {
        if yield_interval == 0 {
            return Err(ConfigErr::ZeroInterval);
        }
        Ok(Config {
            yield_interval,
            heuristic,
        })
    }

    pub fn with_heuristic(self, heuristic: Heuristic) -> Self {
        Config { heuristic, ..self }
    }

    /// The interrupt is checked before the first expansion and then
    /// after every `yield_interval` expanded states.
    pub fn yield_interval(&self) -> usize {
        self.yield_interval
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            yield_interval: 31,
            heuristic: Heuristic::Labyrinth,
        }
    }
}
