//! The backtracking engine behind [Session::solve](crate::Session::solve)
//! and [Session::count_solutions](crate::Session::count_solutions). Between
//! guesses only the cheap tier of the technique ladder runs, which keeps a
//! single engine useful both for finishing a logic solve and for counting
//! solutions of a riddle.

use std::time::Instant;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Board, CellRef};
use crate::locked::LockedSet;
use crate::solver::{
    Outcome,
    Session,
    SolutionCount,
    SolveOptions,
    StepOptions
};

/// One decision point of the search. The board and the locked sets are
/// snapshotted before the first candidate is tried, so backtracking is a
/// plain restore instead of an incremental undo.
struct Frame {
    board: Board,
    locked_sets: Vec<LockedSet>,
    cell: CellRef,
    candidates: Vec<usize>,
    next: usize
}

/// Runs cheap propagation to a fixed point. Returns `false` if the position
/// is provably dead.
fn propagate(session: &mut Session) -> bool {
    let options = StepOptions {
        difficulty_limit: 1,
        brute_force: true
    };

    loop {
        session.refresh_locked_sets();

        if session.obvious_impossibility().is_some() {
            return false;
        }

        if session.board.is_full() {
            return true;
        }

        if !session.apply_step(&options).changed {
            return true;
        }
    }
}

fn branch_cell(session: &Session) -> CellRef {
    session.board.empty_cells()
        .into_iter()
        .min_by_key(|&(column, row)|
            session.board.candidates(column, row).unwrap().len())
        .unwrap()
}

/// Depth-first search over the remaining choices. With `limit` of `None`,
/// the first solution is left on the session and reported as
/// [Outcome::Solved]. With a limit, solutions are counted up to it; the
/// session ends up in an unspecified intermediate state, so counting callers
/// work on a copy.
fn explore<R: Rng>(session: &mut Session, options: &SolveOptions,
        rng: &mut R, limit: Option<usize>) -> (Outcome, usize) {
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);
    let mut stack: Vec<Frame> = Vec::new();
    let mut found = 0;
    let mut descend = true;

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                session.board.clear_working_state();
                session.refresh_locked_sets();
                return (Outcome::Cancelled, found);
            }
        }

        if descend && propagate(session) {
            if session.board.is_full() {
                // Propagation places naked singles without revisiting every
                // rule, so a completed grid is re-checked before it counts.
                if session.is_valid() {
                    found += 1;

                    if limit.map_or(true, |cap| found >= cap) {
                        return (Outcome::Solved, found);
                    }
                }
            }
            else {
                let cell = branch_cell(session);
                let mut candidates: Vec<usize> = session.board
                    .candidates(cell.0, cell.1)
                    .unwrap()
                    .iter()
                    .collect();

                if options.random {
                    candidates.shuffle(rng);
                }

                stack.push(Frame {
                    board: session.board.clone(),
                    locked_sets: session.locked_sets.clone(),
                    cell,
                    candidates,
                    next: 0
                });
            }
        }

        descend = false;

        while let Some(frame) = stack.last_mut() {
            session.board = frame.board.clone();
            session.locked_sets = frame.locked_sets.clone();

            match frame.candidates.get(frame.next).copied() {
                None => {
                    stack.pop();
                },
                Some(digit) => {
                    frame.next += 1;
                    let cell = frame.cell;
                    session.set_value(cell, digit).unwrap();
                    descend = true;
                    break;
                }
            }
        }

        if !descend {
            return (Outcome::Impossible, found);
        }
    }
}

/// Finishes a solve by search, leaving the first solution on the session.
pub(crate) fn run<R: Rng>(session: &mut Session, options: &SolveOptions,
        rng: &mut R) -> Outcome {
    explore(session, options, rng, None).0
}

/// Counts the solutions of the session's board, up to `limit`. The limit is
/// expected to be positive.
pub(crate) fn count(session: &mut Session, limit: usize) -> SolutionCount {
    let options = SolveOptions::default();
    let (outcome, found) =
        explore(session, &options, &mut rand::thread_rng(), Some(limit));

    match outcome {
        Outcome::Solved => SolutionCount::AtLeast(limit),
        Outcome::Cancelled => SolutionCount::AtLeast(found),
        _ => SolutionCount::Exact(found)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use std::time::Duration;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::constraint::ConstraintSet;

    // A full valid 9x9 solution with the top three rows removed.
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

    fn session_of(code: &str) -> Session {
        Session::new(Board::parse(code).unwrap(), ConstraintSet::new())
            .unwrap()
    }

    fn search_options() -> SolveOptions {
        SolveOptions {
            brute_force: true,
            ..SolveOptions::default()
        }
    }

    #[test]
    fn search_completes_partial_classic_board() {
        let mut session = session_of(TOP_ROWS_MISSING_9X9);
        let outcome = run(&mut session, &search_options(),
            &mut rand::thread_rng());

        assert_eq!(Outcome::Solved, outcome);
        assert!(session.board().is_full());
        assert!(session.is_valid());
    }

    #[test]
    fn contradictory_givens_exhaust_the_search() {
        let mut session = session_of("2x2;\
            1, ,1, ,\
             , , , ,\
             , , , ,\
             , , , ");
        let outcome = run(&mut session, &search_options(),
            &mut rand::thread_rng());

        assert_eq!(Outcome::Impossible, outcome);
    }

    #[test]
    fn zero_time_limit_cancels_and_clears_the_board() {
        let mut session = Session::empty(3, 3, ConstraintSet::new()).unwrap();
        let options = SolveOptions {
            brute_force: true,
            time_limit: Some(Duration::from_secs(0)),
            ..SolveOptions::default()
        };
        let outcome = run(&mut session, &options, &mut rand::thread_rng());

        assert_eq!(Outcome::Cancelled, outcome);
        assert!(session.board().is_empty());
    }

    #[test]
    fn random_search_fills_an_empty_board() {
        let mut session = Session::empty(3, 3, ConstraintSet::new()).unwrap();
        let options = SolveOptions {
            brute_force: true,
            random: true,
            ..SolveOptions::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(87);
        let outcome = run(&mut session, &options, &mut rng);

        assert_eq!(Outcome::Solved, outcome);
        assert!(session.board().is_full());
        assert!(session.is_valid());
    }

    #[test]
    fn counting_stops_at_the_limit() {
        let mut session = Session::empty(2, 2, ConstraintSet::new()).unwrap();

        assert_eq!(SolutionCount::AtLeast(3),
            count(&mut session, 3));
    }

    #[test]
    fn counting_is_exact_below_the_limit() {
        // Fully forced riddle with a single solution.
        let mut session = session_of("2x2;\
             , , ,4,\
             ,4,3, ,\
             ,3, , ,\
             , ,1, ");

        assert_eq!(SolutionCount::Exact(1), count(&mut session, 10));
    }
}
