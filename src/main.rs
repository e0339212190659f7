// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused)]

use std::env;
use std::error::Error;
use std::process;
use std::time::Duration;

use clap::{App, Arg, ArgMatches};
use log::debug;

use sokoban_engine::config::{Config, Heuristic};
use sokoban_engine::data::Pos;
use sokoban_engine::level::Level;
use sokoban_engine::parser;
use sokoban_engine::read_file;
use sokoban_engine::solver::interrupt::{Deadline, Interrupt, Progress};
use sokoban_engine::solver::{Outcome, SolverOk};

fn main() {
    env_logger::init();

    let matches = App::new("sokoban-engine")
        .author("martin-t")
        .version("0.1")
        .about("Solves sokoban levels in XSB format")
        .arg(
            Arg::with_name("level")
                .long("--level")
                .takes_value(true)
                .value_name("N")
                .help("which level of a pack to solve, starting at 1"),
        )
        .arg(
            Arg::with_name("box")
                .long("--box")
                .takes_value(true)
                .value_name("X,Y")
                .help("move only this box, other boxes stay in place"),
        )
        .arg(
            Arg::with_name("dest")
                .long("--dest")
                .takes_value(true)
                .value_name("X,Y")
                .requires("box")
                .help("move the box to this tile instead of a target"),
        )
        .arg(
            Arg::with_name("heuristic")
                .long("--heuristic")
                .takes_value(true)
                .possible_values(&["labyrinth", "manhattan", "zero"])
                .default_value("labyrinth"),
        )
        .arg(
            Arg::with_name("interval")
                .long("--interval")
                .takes_value(true)
                .value_name("STATES")
                .help("how often the solver yields to report progress"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("--timeout")
                .takes_value(true)
                .value_name("SECS")
                .help("give up after this many seconds"),
        )
        .arg(
            Arg::with_name("steps")
                .long("--steps")
                .help("print the board after every move, not just after pushes"),
        )
        .arg(Arg::with_name("file").required(true))
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches<'_>) -> Result<(), Box<dyn Error>> {
    // clap makes sure required args are present
    let path = matches.value_of("file").unwrap_or_default();
    let level = load(path, matches.value_of("level"))?;

    let heuristic: Heuristic = matches.value_of("heuristic").unwrap_or("labyrinth").parse()?;
    let config = match matches.value_of("interval") {
        Some(interval) => Config::new(interval.parse()?, heuristic)?,
        None => Config::default().with_heuristic(heuristic),
    };

    let mut deadline = match matches.value_of("timeout") {
        Some(secs) => {
            // rejects negative, NaN and too large values
            let limit = Duration::try_from_secs_f64(secs.parse()?)
                .map_err(|err| format!("Invalid timeout {}: {}", secs, err))?;
            Some(Deadline::new(limit))
        }
        None => None,
    };
    let mut interrupt = |progress: &Progress| {
        debug!("{}", progress);
        match deadline {
            Some(ref mut deadline) => deadline.check(progress),
            None => false,
        }
    };

    println!("Solving {}...", path);
    let solver_ok = match matches.value_of("box") {
        Some(source) => {
            let source = parse_pos(source)?;
            match matches.value_of("dest") {
                Some(dest) => {
                    let dest = parse_pos(dest)?;
                    level.move_one_box(source, dest, &config, &mut interrupt)?
                }
                None => level.solve_one_box(source, &config, &mut interrupt)?,
            }
        }
        None => level.solve_all_boxes(&config, &mut interrupt),
    };
    print_solution(&level, &solver_ok, matches.is_present("steps"))
}

fn load(path: &str, index: Option<&str>) -> Result<Level, Box<dyn Error>> {
    let text = read_file(path).map_err(|err| {
        let current_dir = env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        format!("Can't read file {} in {}: {}", path, current_dir, err)
    })?;

    let index = match index {
        Some(index) => index.parse::<usize>()?,
        None => 1,
    };
    let sources = parser::parse_pack(&text);
    let source = index
        .checked_sub(1)
        .and_then(|i| sources.get(i))
        .ok_or_else(|| format!("No level {} in {} ({} levels)", index, path, sources.len()))?;
    if let Some(ref title) = source.title {
        debug!("Level {}: {}", index, title);
    }
    source
        .parse()
        .map_err(|err| format!("Failed to parse: {}", err).into())
}

fn parse_pos(s: &str) -> Result<Pos, Box<dyn Error>> {
    let mut parts = s.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => Ok(Pos::new(x.parse()?, y.parse()?)),
        _ => Err(format!("Expected X,Y, got {}", s).into()),
    }
}

fn print_solution(level: &Level, solver_ok: &SolverOk, steps: bool) -> Result<(), Box<dyn Error>> {
    println!("{}", solver_ok);
    println!("{}", solver_ok.stats);
    match solver_ok.outcome {
        Outcome::Solved(ref pushes) => {
            let moves = level.moves_for(pushes)?;
            println!("Found solution:");
            print!("{}", level.xsb_solution(&moves, steps));
            println!("{}", moves);
            println!("Moves: {}", moves.move_cnt());
            println!("Pushes: {}", moves.push_cnt());
        }
        Outcome::Exhausted => println!("No solution"),
        Outcome::Cancelled => println!("Cancelled"),
    }
    Ok(())
}
