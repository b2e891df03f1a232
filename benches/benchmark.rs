use criterion::{criterion_group, criterion_main, Criterion};

use sudoku_logic::Board;
use sudoku_logic::constraint::ConstraintSet;
use sudoku_logic::solver::{Outcome, Session, SolveOptions};

// Explanation of benchmark classes:
//
// ladder: The technique ladder alone, on a board it can finish.
// search: The backtracking search with cheap propagation between guesses.
// counting: Solution counting up to a limit.

// A full valid 9x9 solution with the main diagonal removed, solvable by
// naked singles alone.
const FORCED_9X9: &str = "3x3;\
    ,2,3,4,5,6,7,8,9,\
    4,,6,7,8,9,1,2,3,\
    7,8,,1,2,3,4,5,6,\
    2,3,1,,6,4,8,9,7,\
    5,6,4,8,,7,2,3,1,\
    8,9,7,2,3,,5,6,4,\
    3,1,2,6,4,5,,7,8,\
    6,4,5,9,7,8,3,,2,\
    9,7,8,3,1,2,6,4,";

// The same solution with the top three rows removed, which requires search.
const TOP_ROWS_MISSING_9X9: &str = "3x3;\
    ,,,,,,,,,\
    ,,,,,,,,,\
    ,,,,,,,,,\
    2,3,1,5,6,4,8,9,7,\
    5,6,4,8,9,7,2,3,1,\
    8,9,7,2,3,1,5,6,4,\
    3,1,2,6,4,5,9,7,8,\
    6,4,5,9,7,8,3,1,2,\
    9,7,8,3,1,2,6,4,5";

fn session_of(code: &str, constraints: ConstraintSet) -> Session {
    Session::new(Board::parse(code).unwrap(), constraints).unwrap()
}

fn solve(session: &Session, options: &SolveOptions) {
    let outcome = session.clone().solve(options);
    assert_eq!(Outcome::Solved, outcome);
}

fn benchmark_ladder(c: &mut Criterion) {
    let session = session_of(FORCED_9X9, ConstraintSet::new());
    let options = SolveOptions {
        logic_only: true,
        ..SolveOptions::default()
    };

    c.bench_function("ladder naked singles",
        |b| b.iter(|| solve(&session, &options)));
}

fn benchmark_search_classic(c: &mut Criterion) {
    let session = session_of(TOP_ROWS_MISSING_9X9, ConstraintSet::new());
    let options = SolveOptions {
        brute_force: true,
        ..SolveOptions::default()
    };

    c.bench_function("search classic",
        |b| b.iter(|| solve(&session, &options)));
}

fn benchmark_search_diagonals(c: &mut Criterion) {
    let mut constraints = ConstraintSet::new();
    constraints.set_diagonals(true);
    let session = Session::empty(3, 3, constraints).unwrap();
    let options = SolveOptions {
        brute_force: true,
        ..SolveOptions::default()
    };

    c.bench_function("search diagonals",
        |b| b.iter(|| solve(&session, &options)));
}

fn benchmark_counting(c: &mut Criterion) {
    let session = Session::empty(2, 2, ConstraintSet::new()).unwrap();

    c.bench_function("counting 4x4",
        |b| b.iter(|| session.count_solutions(100)));
}

criterion_group!(all,
    benchmark_ladder,
    benchmark_search_classic,
    benchmark_search_diagonals,
    benchmark_counting
);

criterion_main!(all);
