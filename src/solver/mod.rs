//! This module contains the solving machinery of this crate. A [Session]
//! bundles a [Board] with a [ConstraintSet] and keeps the derived state the
//! solver works on, namely the locked sets and the achievable-sum tables for
//! the board's size.
//!
//! Solving happens on two levels. [Session::apply_step] performs a single
//! deduction from a tiered ladder of human-style techniques and describes it
//! in prose. [Session::solve] runs the ladder to a fixed point and, unless
//! configured otherwise, falls back to a backtracking search.
//!
//! # Example
//!
//! ```
//! use sudoku_logic::Board;
//! use sudoku_logic::constraint::ConstraintSet;
//! use sudoku_logic::solver::{Outcome, Session, SolveOptions};
//!
//! let board = Board::parse("2x2;1, , , , ,2, , , , ,3, , , , ,4").unwrap();
//! let mut session = Session::new(board, ConstraintSet::new()).unwrap();
//! let outcome = session.solve(&SolveOptions::default());
//!
//! assert_eq!(Outcome::Solved, outcome);
//! assert!(session.board().is_full());
//! ```

pub(crate) mod search;
pub(crate) mod technique;

use crate::{Board, CellRef};
use crate::constraint::{Constraint, ConstraintSet};
use crate::error::SudokuResult;
use crate::feasibility::{self, PlacementOptions};
use crate::locked::{self, LockedSet, SumTable};
use crate::util::DigitSet;

use rand::Rng;

use std::collections::HashSet;
use std::time::Duration;

/// The result of a [Session::solve] call. Outcomes are ordinary values, not
/// errors; a puzzle without a solution is a valid answer to the question the
/// solver was asked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {

    /// The board was filled completely without violating any rule.
    Solved,

    /// The solver stopped without filling the board, because it was asked
    /// for a single step or for logical deductions only.
    Done,

    /// The board or its constraints were broken before solving started, for
    /// example by a given digit that violates a rule.
    Invalid,

    /// The board has no solution.
    Impossible,

    /// The wall-clock budget ran out during search. The board's working
    /// state has been cleared, only the given digits remain.
    Cancelled
}

/// The result of a [Session::count_solutions] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolutionCount {

    /// The exact number of solutions, which is less than the requested
    /// limit.
    Exact(usize),

    /// The search stopped after finding as many solutions as the limit
    /// allowed. The true number may be higher.
    AtLeast(usize)
}

/// Options for a single [Session::apply_step] call.
#[derive(Clone, Copy, Debug)]
pub struct StepOptions {

    /// The highest technique tier the ladder may attempt, from 1 (singles)
    /// to 4 (short contradiction chains).
    pub difficulty_limit: usize,

    /// In brute-force mode the ladder is capped at tier 1 regardless of
    /// `difficulty_limit`, since the search engine only needs cheap
    /// propagation between guesses.
    pub brute_force: bool
}

impl Default for StepOptions {

    fn default() -> StepOptions {
        StepOptions {
            difficulty_limit: 4,
            brute_force: false
        }
    }
}

/// The description of a single ladder step returned by
/// [Session::apply_step].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepReport {

    /// Whether the step changed the board.
    pub changed: bool,

    /// The tier of the technique that fired, or 0 if nothing changed.
    pub tier: usize,

    /// A human-readable description of the deduction, such as
    /// `"Naked single; r3c4 → 7"`. Empty if nothing changed.
    pub description: String
}

impl StepReport {

    pub(crate) fn unchanged() -> StepReport {
        StepReport {
            changed: false,
            tier: 0,
            description: String::new()
        }
    }
}

/// Options for a [Session::solve] call.
#[derive(Clone, Debug)]
pub struct SolveOptions {

    /// Stop after the technique ladder reaches a fixed point instead of
    /// falling back to backtracking search. The outcome is then
    /// [Outcome::Done] unless the ladder alone solved or refuted the board.
    pub logic_only: bool,

    /// Apply at most one ladder step, then return [Outcome::Done].
    pub one_step: bool,

    /// The highest technique tier the ladder may attempt.
    pub difficulty_limit: usize,

    /// Skip the more expensive tiers and lean on the search engine. Used by
    /// solution counting, where deductions beyond singles rarely pay off.
    pub brute_force: bool,

    /// Shuffle the candidate order of every search decision. With this, a
    /// board with several solutions yields a random one.
    pub random: bool,

    /// A wall-clock budget for the search phase. When it runs out, solving
    /// stops with [Outcome::Cancelled] and a cleared board.
    pub time_limit: Option<Duration>
}

impl Default for SolveOptions {

    fn default() -> SolveOptions {
        SolveOptions {
            logic_only: false,
            one_step: false,
            difficulty_limit: 4,
            brute_force: false,
            random: false,
            time_limit: None
        }
    }
}

pub(crate) fn cell_name(cell: CellRef) -> String {
    format!("r{}c{}", cell.1 + 1, cell.0 + 1)
}

/// A solving session over one board and one rule set. The session keeps the
/// locked sets and achievable-sum tables up to date as the board changes, so
/// both the technique ladder and the search engine can rely on them.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) board: Board,
    pub(crate) constraints: ConstraintSet,
    pub(crate) locked_sets: Vec<LockedSet>,
    pub(crate) sums: SumTable
}

impl Session {

    /// Creates a session over the given board and rule set. Quadruple clues
    /// that declare all four digits immediately restrict the candidates of
    /// their cells.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidConstraint`: If a constraint instance is
    /// structurally broken for the board's size.
    /// * `SudokuError::OutOfBounds`: If a constraint references a cell
    /// outside the board.
    pub fn new(board: Board, constraints: ConstraintSet)
            -> SudokuResult<Session> {
        constraints.validate_for(&board)?;
        let sums = SumTable::new(board.size());
        let mut session = Session {
            board,
            constraints,
            locked_sets: Vec::new(),
            sums
        };
        session.restrict_full_quadruples()?;
        session.refresh_locked_sets();
        Ok(session)
    }

    /// Creates a session over an empty board with the given block
    /// dimensions.
    ///
    /// # Errors
    ///
    /// As [Session::new], plus `SudokuError::InvalidDimensions` for block
    /// dimensions that are zero or yield an unsupported grid size.
    pub fn empty(block_width: usize, block_height: usize,
            constraints: ConstraintSet) -> SudokuResult<Session> {
        Session::new(Board::new(block_width, block_height)?, constraints)
    }

    fn restrict_full_quadruples(&mut self) -> SudokuResult<()> {
        let size = self.board.size();
        let quadruples: Vec<(Vec<CellRef>, Vec<usize>)> = self.constraints
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::Quadruple { cells, digits }
                        if digits.len() == 4 =>
                    Some((cells.clone(), digits.clone())),
                _ => None
            })
            .collect();

        for (cells, declared) in quadruples {
            // The declared digits were validated against the board size.
            let mut allowed = DigitSet::new(size).unwrap();

            for digit in declared {
                allowed.insert(digit).unwrap();
            }

            for (column, row) in cells {
                if self.board.value(column, row)?.is_none() {
                    let candidates = self.board.candidates(column, row)?;
                    self.board.set_candidates(column, row,
                        candidates & &allowed)?;
                }
            }
        }

        Ok(())
    }

    /// The current board state.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The rule set of this session.
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// The locked sets derived from the current board state.
    pub fn locked_sets(&self) -> &[LockedSet] {
        &self.locked_sets
    }

    pub(crate) fn refresh_locked_sets(&mut self) {
        self.locked_sets = locked::discover(&self.board, &self.constraints);
    }

    /// Assigns the given digit to the given cell. Palindrome counterparts
    /// and clone partners of the cell receive the same digit, transitively
    /// along the mirror graph; a visited set guards against cycles. Mirrors
    /// that already hold a digit are left untouched.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds`: If the cell lies outside the board.
    /// * `SudokuError::InvalidNumber`: If `digit` is zero or greater than
    /// the grid size.
    /// * `SudokuError::LockedCell`: If the cell holds a given digit.
    pub fn set_value(&mut self, cell: CellRef, digit: usize)
            -> SudokuResult<()> {
        self.board.set_value(cell.0, cell.1, digit)?;

        let mut queue = vec![cell];
        let mut visited = HashSet::new();
        visited.insert(cell);

        while let Some(current) = queue.pop() {
            for mirror in self.constraints.mirrors_of(current) {
                if visited.insert(mirror)
                        && self.board.value(mirror.0, mirror.1)?.is_none() {
                    self.board.set_value(mirror.0, mirror.1, digit)?;
                    queue.push(mirror);
                }
            }
        }

        locked::reduce(&mut self.locked_sets, &self.board);
        Ok(())
    }

    /// Replaces the candidate set of the given cell, which must be empty.
    ///
    /// # Errors
    ///
    /// As [Board::set_candidates].
    pub fn set_candidates(&mut self, cell: CellRef, candidates: DigitSet)
            -> SudokuResult<()> {
        self.board.set_candidates(cell.0, cell.1, candidates)?;
        locked::reduce(&mut self.locked_sets, &self.board);
        Ok(())
    }

    /// Restores the candidate sets of all empty cells. With `keep_marks`,
    /// cells with declared candidate marks get those back; otherwise every
    /// empty cell returns to the full digit range.
    pub fn reset_candidates(&mut self, keep_marks: bool) {
        if keep_marks {
            self.board.reset_candidates();
        }
        else {
            let size = self.board.size();

            for (column, row) in self.board.empty_cells() {
                self.board.set_candidates(column, row,
                    DigitSet::full(size).unwrap()).unwrap();
            }
        }

        self.refresh_locked_sets();
    }

    /// Checks whether the board and its rule set are consistent: the
    /// constraints pass their structural checks against the board and every
    /// digit already on the board could still be placed under the full rule
    /// sequence.
    pub fn is_valid(&self) -> bool {
        if !self.constraints.is_valid_for(&self.board) {
            return false;
        }

        let size = self.board.size();

        for row in 0..size {
            for column in 0..size {
                if let Some(digit) = self.board.value(column, row).unwrap() {
                    let feasible = feasibility::can_place(&self.board,
                        &self.constraints, &self.sums, (column, row), digit,
                        PlacementOptions::search());

                    if !feasible {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Checks for cheap, immediately visible contradictions: an empty cell
    /// without candidates, or a locked set whose digit has no home left.
    /// Returns a description of the first one found.
    pub fn obvious_impossibility(&self) -> Option<String> {
        for (column, row) in self.board.empty_cells() {
            if self.board.candidates(column, row).unwrap().is_empty() {
                return Some(format!("No candidates left in {}",
                    cell_name((column, row))));
            }
        }

        for set in &self.locked_sets {
            if set.cells.is_empty() {
                return Some(format!("No home left for {} in {}", set.digit,
                    set.location));
            }
        }

        None
    }

    /// Applies a single step of the technique ladder: the first rule of the
    /// lowest tier that changes the board wins, and the ladder stops there.
    /// Returns a report naming the deduction, or an unchanged report if no
    /// tier within the difficulty limit found anything.
    pub fn apply_step(&mut self, options: &StepOptions) -> StepReport {
        technique::apply(self, options)
    }

    /// Solves the board. The technique ladder runs to a fixed point first;
    /// unless [SolveOptions::logic_only] is set, a backtracking search
    /// finishes the job. See [SolveOptions] for the available knobs.
    ///
    /// Search decisions use the thread-local random number generator when
    /// [SolveOptions::random] is set; [Session::solve_with] accepts a
    /// caller-provided one.
    pub fn solve(&mut self, options: &SolveOptions) -> Outcome {
        self.solve_with(options, &mut rand::thread_rng())
    }

    /// As [Session::solve], with an explicit random number generator for
    /// reproducible randomized search.
    pub fn solve_with<R: Rng>(&mut self, options: &SolveOptions,
            rng: &mut R) -> Outcome {
        if !self.is_valid() {
            return Outcome::Invalid;
        }

        let step_options = StepOptions {
            difficulty_limit: options.difficulty_limit,
            brute_force: options.brute_force
        };

        loop {
            self.refresh_locked_sets();

            if self.obvious_impossibility().is_some() {
                return Outcome::Impossible;
            }

            if self.board.is_full() {
                return Outcome::Solved;
            }

            let report = self.apply_step(&step_options);

            if options.one_step {
                return if self.board.is_full() {
                    Outcome::Solved
                }
                else {
                    Outcome::Done
                };
            }

            if !report.changed {
                break;
            }
        }

        if options.logic_only {
            return Outcome::Done;
        }

        search::run(self, options, rng)
    }

    /// Counts the solutions of the board, up to the given limit. The session
    /// itself is left untouched; counting works on an internal copy.
    pub fn count_solutions(&self, limit: usize) -> SolutionCount {
        if limit == 0 {
            return SolutionCount::AtLeast(0);
        }

        let mut probe = self.clone();

        if !probe.is_valid() {
            return SolutionCount::Exact(0);
        }

        search::count(&mut probe, limit)
    }
}
