use assert_cmd::prelude::*;
use std::process::Command;

// the status line contains the elapsed time so whole outputs can't be compared
fn run(args: &[&str]) -> String {
    let output = Command::cargo_bin("sokoban-engine")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn run_one_way() {
    let stdout = run(&["levels/custom/02-one-way.txt"]);
    let solution = r"Found solution:
###
#.#
# #
# #
#$#
#@#
###

###
#.#
# #
#$#
#@#
# #
###

###
#.#
#$#
#@#
# #
# #
###

###
#*#
#@#
# #
# #
# #
###

UUU
Moves: 3
Pushes: 3
";
    assert!(stdout.starts_with(
        "Solving levels/custom/02-one-way.txt...\nSolution found after exploring "
    ));
    assert!(stdout.contains("States created total: "));
    assert!(stdout.ends_with(solution), "{}", stdout);
}

#[test]
fn run_no_solution() {
    let stdout = run(&["levels/custom/no-solution.txt"]);
    assert!(stdout.contains("(no solution possible)"));
    assert!(stdout.ends_with("No solution\n"), "{}", stdout);
}

#[test]
fn run_one_box_to_destination() {
    let stdout = run(&["--box", "2,1", "--dest", "3,1", "levels/custom/01-simplest.txt"]);
    let solution = r"Found solution:
#####
#@$.#
#####

#####
# @*#
#####

R
Moves: 1
Pushes: 1
";
    assert!(stdout.ends_with(solution), "{}", stdout);
}

#[test]
fn run_pack_level() {
    let stdout = run(&["--level", "3", "--heuristic", "manhattan", "levels/packs/tutorial.txt"]);
    assert!(stdout.contains("Found solution:"));
    assert!(stdout.ends_with("Pushes: 2\n"), "{}", stdout);
}

#[test]
fn run_timeout() {
    let stdout = run(&[
        "--timeout",
        "0",
        "--interval",
        "1",
        "levels/custom/microban-1.txt",
    ]);
    assert!(stdout.contains("Cancelled after exploring 0 states"));
    assert!(stdout.ends_with("Cancelled\n"), "{}", stdout);
}

#[test]
fn run_bad_args() {
    let cases: &[&[&str]] = &[
        &["--heuristic", "fastest", "levels/custom/01-simplest.txt"],
        &["--dest", "3,1", "levels/custom/01-simplest.txt"],
        &["--interval", "0", "levels/custom/01-simplest.txt"],
        &["--timeout", "1e30", "levels/custom/01-simplest.txt"],
        &["--timeout=-1", "levels/custom/01-simplest.txt"],
        &["--level", "4", "levels/packs/tutorial.txt"],
        &["levels/custom/does-not-exist.txt"],
    ];
    for args in cases {
        // clap's messages go to stderr, so do ours
        Command::cargo_bin("sokoban-engine")
            .unwrap()
            .args(*args)
            .assert()
            .failure()
            .stdout("");
    }
}

#[test]
fn run_no_box_at_source() {
    Command::cargo_bin("sokoban-engine")
        .unwrap()
        .args(&["--box", "3,1", "levels/custom/01-simplest.txt"])
        .assert()
        .failure();
}
