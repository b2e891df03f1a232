//! This module defines the constraint vocabulary of this crate. A
//! [ConstraintSet] holds all rules that apply to a board: grid-wide flags
//! such as anti-knight or nonconsecutive, negative flags for pair
//! constraints and a list of [Constraint] instances with cell references.
//! Row, column and region uniqueness are always active and need not be
//! declared.
//!
//! Constraints are plain data. Their semantics live in the
//! [feasibility](crate::feasibility) and [locked](crate::locked) modules,
//! which match exhaustively over the [Constraint] enum.
//!
//! # Example
//!
//! A killer cage of sum 7 over two cells in the top-left corner:
//!
//! ```
//! use sudoku_logic::constraint::{Constraint, ConstraintSet};
//!
//! let mut constraints = ConstraintSet::new();
//! constraints.push(Constraint::Killer {
//!     cells: vec![(0, 0), (1, 0)],
//!     sum: 7
//! }).unwrap();
//! assert_eq!(1, constraints.iter().count());
//! ```

use crate::{Board, CellRef};
use crate::error::{SudokuError, SudokuResult};
use crate::util::contains_duplicate;
use crate::visibility;

use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::slice::Iter;

/// A reference to one full row or column of the grid, used by clues that
/// attach to a line rather than to cells, such as sandwich sums.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum LineRef {

    /// The row with the given zero-based index.
    Row(usize),

    /// The column with the given zero-based index.
    Column(usize)
}

/// A single constraint instance attached to specific cells of the board.
/// Grid-wide rules without cell references (anti-knight, nonconsecutive,
/// diagonals, disjoint groups) are flags on the [ConstraintSet] instead.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Constraint {

    /// The marked cell must contain an odd digit.
    Odd {
        /// The marked cell.
        cell: CellRef
    },

    /// The marked cell must contain an even digit.
    Even {
        /// The marked cell.
        cell: CellRef
    },

    /// The cells form an additional region in which no digit may repeat.
    ExtraRegion {
        /// The cells of the region. Must be as many as the grid size.
        cells: Vec<CellRef>
    },

    /// The cells form a cage in which no digit may repeat and whose digits
    /// add up to `sum`.
    Killer {
        /// The cells of the cage.
        cells: Vec<CellRef>,

        /// The required sum of all digits in the cage.
        sum: usize
    },

    /// The digits along the given diagonal path add up to `sum`. Digits may
    /// repeat where ordinary visibility allows it.
    LittleKiller {
        /// The cells of the diagonal, in clue order.
        cells: Vec<CellRef>,

        /// The required sum of all digits on the diagonal.
        sum: usize
    },

    /// The digits strictly between the 1 and the highest digit of the
    /// referenced line add up to `sum`.
    Sandwich {
        /// The row or column the clue applies to.
        line: LineRef,

        /// The required sum of the digits between the crusts.
        sum: usize
    },

    /// Digits along the line must strictly increase from the first cell.
    Thermometer {
        /// The cells of the thermometer, starting at the bulb.
        line: Vec<CellRef>
    },

    /// Digits along the line read the same from both ends.
    Palindrome {
        /// The cells of the line.
        line: Vec<CellRef>
    },

    /// The two cells differ by exactly `value` (a white Kropki-style dot).
    Difference {
        /// The two marked cells.
        cells: [CellRef; 2],

        /// The required difference, classically 1.
        value: usize
    },

    /// One of the two cells is exactly `value` times the other (a black
    /// Kropki-style dot).
    Ratio {
        /// The two marked cells.
        cells: [CellRef; 2],

        /// The required ratio, classically 2.
        value: usize
    },

    /// Two areas of identical shape that must hold identical digits.
    /// `cells[i]` always mirrors `partners[i]`.
    Clone {
        /// The cells of the first area.
        cells: Vec<CellRef>,

        /// The cells of the second area, in matching order.
        partners: Vec<CellRef>
    },

    /// The digits along each line add up to the digit in the head cell.
    Arrow {
        /// The cell holding the sum.
        head: CellRef,

        /// The lines emanating from the head, each excluding the head
        /// itself.
        lines: Vec<Vec<CellRef>>
    },

    /// The digits strictly between the line's two end cells must lie
    /// strictly between the digits of those end cells.
    Between {
        /// The cells of the line, including both end cells.
        line: Vec<CellRef>
    },

    /// The marked cell must be smaller than all orthogonally adjacent
    /// unmarked cells.
    Minimum {
        /// The marked cell.
        cell: CellRef
    },

    /// The marked cell must be greater than all orthogonally adjacent
    /// unmarked cells.
    Maximum {
        /// The marked cell.
        cell: CellRef
    },

    /// The two cells add up to `sum`, which is 10 for an X clue and 5 for a
    /// V clue.
    Xv {
        /// The two marked cells.
        cells: [CellRef; 2],

        /// The required sum, 5 or 10.
        sum: usize
    },

    /// The four cells around a grid point must contain all listed digits.
    Quadruple {
        /// The four cells around the corner point, in left-to-right,
        /// top-to-bottom order.
        cells: Vec<CellRef>,

        /// The digits that must appear, at most four. Digits may repeat.
        digits: Vec<usize>
    }
}

impl Constraint {

    /// A short, human-readable name of this constraint kind, used in step
    /// descriptions.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constraint::Odd { .. } => "Odd",
            Constraint::Even { .. } => "Even",
            Constraint::ExtraRegion { .. } => "Extra Region",
            Constraint::Killer { .. } => "Killer Cage",
            Constraint::LittleKiller { .. } => "Little Killer",
            Constraint::Sandwich { .. } => "Sandwich Sum",
            Constraint::Thermometer { .. } => "Thermometer",
            Constraint::Palindrome { .. } => "Palindrome",
            Constraint::Difference { .. } => "Difference",
            Constraint::Ratio { .. } => "Ratio",
            Constraint::Clone { .. } => "Clone",
            Constraint::Arrow { .. } => "Arrow",
            Constraint::Between { .. } => "Between Line",
            Constraint::Minimum { .. } => "Minimum",
            Constraint::Maximum { .. } => "Maximum",
            Constraint::Xv { .. } => "XV",
            Constraint::Quadruple { .. } => "Quadruple"
        }
    }

    fn validate(&self, size: usize) -> SudokuResult<()> {
        let all_in_bounds = |cells: &[CellRef]| {
            if cells.iter().all(|&(column, row)| column < size && row < size) {
                Ok(())
            }
            else {
                Err(SudokuError::OutOfBounds)
            }
        };

        match self {
            Constraint::Odd { cell } | Constraint::Even { cell }
                    | Constraint::Minimum { cell }
                    | Constraint::Maximum { cell } =>
                all_in_bounds(std::slice::from_ref(cell)),
            Constraint::ExtraRegion { cells } => {
                if cells.len() != size || contains_duplicate(cells.iter()) {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            },
            Constraint::Killer { cells, .. } => {
                // A cage larger than the grid size cannot hold distinct
                // digits.
                if cells.is_empty() || cells.len() > size
                        || contains_duplicate(cells.iter()) {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            },
            Constraint::LittleKiller { cells, .. } => {
                if cells.is_empty() {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            },
            Constraint::Sandwich { line, .. } => {
                let index = match line {
                    LineRef::Row(row) => *row,
                    LineRef::Column(column) => *column
                };

                if index >= size {
                    return Err(SudokuError::OutOfBounds);
                }

                Ok(())
            },
            Constraint::Thermometer { line } => {
                if line.len() < 2 || line.len() > size {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(line)
            },
            Constraint::Palindrome { line } => {
                if line.len() < 2 {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(line)
            },
            Constraint::Difference { cells, value } => {
                if *value == 0 {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            },
            Constraint::Ratio { cells, value } => {
                // A ratio of 1 would require two touching cells to repeat a
                // digit, which no placement can satisfy.
                if *value < 2 {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            },
            Constraint::Clone { cells, partners } => {
                if cells.is_empty() || cells.len() != partners.len() {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)?;
                all_in_bounds(partners)
            },
            Constraint::Arrow { head, lines } => {
                if lines.is_empty() || lines.iter().any(|l| l.is_empty()) {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(std::slice::from_ref(head))?;

                for line in lines {
                    all_in_bounds(line)?;
                }

                Ok(())
            },
            Constraint::Between { line } => {
                if line.len() < 3 {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(line)
            },
            Constraint::Xv { cells, sum } => {
                if *sum != 5 && *sum != 10 {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            },
            Constraint::Quadruple { cells, digits } => {
                if cells.len() != 4 || digits.is_empty() || digits.len() > 4
                        || digits.iter().any(|&d| d == 0 || d > size) {
                    return Err(SudokuError::InvalidConstraint);
                }

                all_in_bounds(cells)
            }
        }
    }
}

/// The complete rule set of a puzzle: grid-wide flags, negative flags for
/// pair constraints and the list of [Constraint] instances.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    diagonal_positive: bool,
    diagonal_negative: bool,
    antiknight: bool,
    antiking: bool,
    nonconsecutive: bool,
    disjoint_groups: bool,
    negative_ratio: bool,
    negative_xv: bool
}

impl ConstraintSet {

    /// Creates a new constraint set without any variant rules, i.e. classic
    /// Sudoku.
    pub fn new() -> ConstraintSet {
        ConstraintSet::default()
    }

    /// Adds the given constraint instance without validating its cell
    /// references against any particular grid size. Prefer
    /// [ConstraintSet::push_for] where the board is known.
    ///
    /// # Errors
    ///
    /// `SudokuError::InvalidConstraint` if the instance is structurally
    /// broken independently of the grid, such as a killer cage without cells
    /// or a ratio clue with value 1.
    pub fn push(&mut self, constraint: Constraint) -> SudokuResult<()> {
        self.push_checked(constraint, crate::util::MAX_DIGIT)
    }

    /// Adds the given constraint instance, validating its structure and that
    /// all cell references lie within the given board.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidConstraint`: If the instance is structurally
    /// broken, such as a killer cage without cells or a ratio clue with
    /// value 1.
    /// * `SudokuError::OutOfBounds`: If any referenced cell lies outside the
    /// board.
    pub fn push_for(&mut self, constraint: Constraint, board: &Board)
            -> SudokuResult<()> {
        self.push_checked(constraint, board.size())
    }

    fn push_checked(&mut self, constraint: Constraint, size: usize)
            -> SudokuResult<()> {
        constraint.validate(size)?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// An iterator over all constraint instances in declaration order.
    pub fn iter(&self) -> Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Re-validates every constraint instance against the given board.
    /// Necessary when instances were added with [ConstraintSet::push], which
    /// cannot check cell references against a grid size.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidConstraint`: If an instance is structurally
    /// broken for the board's size, such as a quadruple clue listing a digit
    /// greater than the size.
    /// * `SudokuError::OutOfBounds`: If any referenced cell lies outside the
    /// board.
    pub fn validate_for(&self, board: &Board) -> SudokuResult<()> {
        for constraint in &self.constraints {
            constraint.validate(board.size())?;
        }

        Ok(())
    }

    /// Enables or disables the rule that both main diagonals may not contain
    /// repeated digits.
    pub fn set_diagonals(&mut self, active: bool) {
        self.diagonal_positive = active;
        self.diagonal_negative = active;
    }

    /// Whether the diagonal from bottom-left to top-right may not contain
    /// repeated digits.
    pub fn diagonal_positive(&self) -> bool {
        self.diagonal_positive
    }

    /// Whether the diagonal from top-left to bottom-right may not contain
    /// repeated digits.
    pub fn diagonal_negative(&self) -> bool {
        self.diagonal_negative
    }

    /// Enables or disables the rule that cells a knight's move apart may not
    /// contain the same digit.
    pub fn set_antiknight(&mut self, active: bool) {
        self.antiknight = active;
    }

    /// Whether cells a knight's move apart may not contain the same digit.
    pub fn antiknight(&self) -> bool {
        self.antiknight
    }

    /// Enables or disables the rule that diagonally adjacent cells may not
    /// contain the same digit.
    pub fn set_antiking(&mut self, active: bool) {
        self.antiking = active;
    }

    /// Whether diagonally adjacent cells may not contain the same digit.
    pub fn antiking(&self) -> bool {
        self.antiking
    }

    /// Enables or disables the rule that orthogonally adjacent cells may not
    /// contain consecutive digits. Pairs covered by an explicit
    /// [Constraint::Difference] or [Constraint::Ratio] clue are exempt.
    pub fn set_nonconsecutive(&mut self, active: bool) {
        self.nonconsecutive = active;
    }

    /// Whether orthogonally adjacent cells may not contain consecutive
    /// digits.
    pub fn nonconsecutive(&self) -> bool {
        self.nonconsecutive
    }

    /// Enables or disables the rule that cells in the same position of
    /// different blocks may not contain the same digit.
    pub fn set_disjoint_groups(&mut self, active: bool) {
        self.disjoint_groups = active;
    }

    /// Whether cells in the same position of different blocks may not
    /// contain the same digit.
    pub fn disjoint_groups(&self) -> bool {
        self.disjoint_groups
    }

    /// Enables or disables the negative ratio rule: orthogonally adjacent
    /// pairs without a [Constraint::Ratio] or [Constraint::Difference] clue
    /// may not be in any of the declared ratios (or 1:2 if none are
    /// declared).
    pub fn set_negative_ratio(&mut self, active: bool) {
        self.negative_ratio = active;
    }

    /// Whether the negative ratio rule is active.
    pub fn negative_ratio(&self) -> bool {
        self.negative_ratio
    }

    /// Enables or disables the negative XV rule: orthogonally adjacent pairs
    /// without an [Constraint::Xv] clue may not sum to 5 or 10.
    pub fn set_negative_xv(&mut self, active: bool) {
        self.negative_xv = active;
    }

    /// Whether the negative XV rule is active.
    pub fn negative_xv(&self) -> bool {
        self.negative_xv
    }

    /// The set of ratio values against which the negative ratio rule tests
    /// unmarked pairs. These are the values of all declared
    /// [Constraint::Ratio] clues, or `{2}` if there are none.
    pub fn disallowed_ratios(&self) -> HashSet<usize> {
        let mut result: HashSet<usize> = self.constraints.iter()
            .filter_map(|c| match c {
                Constraint::Ratio { value, .. } => Some(*value),
                _ => None
            })
            .collect();

        if result.is_empty() {
            result.insert(2);
        }

        result
    }

    fn pair_matches(cells: &[CellRef; 2], a: CellRef, b: CellRef) -> bool {
        (cells[0] == a && cells[1] == b) || (cells[0] == b && cells[1] == a)
    }

    /// Indicates whether a [Constraint::Difference] clue covers the given
    /// pair of cells, in either order.
    pub fn difference_on(&self, a: CellRef, b: CellRef) -> bool {
        self.constraints.iter().any(|c| match c {
            Constraint::Difference { cells, .. } =>
                ConstraintSet::pair_matches(cells, a, b),
            _ => false
        })
    }

    /// Indicates whether a [Constraint::Ratio] clue covers the given pair of
    /// cells, in either order.
    pub fn ratio_on(&self, a: CellRef, b: CellRef) -> bool {
        self.constraints.iter().any(|c| match c {
            Constraint::Ratio { cells, .. } =>
                ConstraintSet::pair_matches(cells, a, b),
            _ => false
        })
    }

    /// Indicates whether an [Constraint::Xv] clue covers the given pair of
    /// cells, in either order.
    pub fn xv_on(&self, a: CellRef, b: CellRef) -> bool {
        self.constraints.iter().any(|c| match c {
            Constraint::Xv { cells, .. } =>
                ConstraintSet::pair_matches(cells, a, b),
            _ => false
        })
    }

    /// Returns all cells that mirror the given cell, i.e. must always hold
    /// the same digit: palindrome counterparts and clone partners. The
    /// centre cell of an odd palindrome does not mirror itself.
    pub fn mirrors_of(&self, cell: CellRef) -> Vec<CellRef> {
        let mut result = Vec::new();

        for constraint in &self.constraints {
            match constraint {
                Constraint::Palindrome { line } => {
                    for (i, &c) in line.iter().enumerate() {
                        let j = line.len() - i - 1;

                        if c == cell && i != j {
                            result.push(line[j]);
                        }
                    }
                },
                Constraint::Clone { cells, partners } => {
                    for (i, &c) in cells.iter().enumerate() {
                        if c == cell {
                            result.push(partners[i]);
                        }
                    }

                    for (i, &c) in partners.iter().enumerate() {
                        if c == cell {
                            result.push(cells[i]);
                        }
                    }
                },
                _ => {}
            }
        }

        result
    }

    /// Performs the structural validity checks that depend on the board:
    ///
    /// * every region identifier in `0..size` covers exactly `size` cells or
    /// none at all,
    /// * no palindrome cell sees its own mirror counterpart,
    /// * no two sandwich clues with different sums share a line,
    /// * no clone cell sees its partner.
    ///
    /// Whether the given digits themselves are feasible is checked by
    /// [Session::is_valid](crate::solver::Session::is_valid), which also
    /// calls this method.
    pub fn is_valid_for(&self, board: &Board) -> bool {
        let size = board.size();

        for region in 0..size {
            let count = board.region_cells(region).len();

            if count != 0 && count != size {
                return false;
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::Palindrome { line } => {
                    for i in 0..line.len() / 2 {
                        let mirror = line[line.len() - i - 1];

                        if visibility::sees(board, self, line[i], mirror) {
                            return false;
                        }
                    }
                },
                Constraint::Clone { cells, partners } => {
                    for (&cell, &partner) in cells.iter().zip(partners.iter()) {
                        if visibility::sees(board, self, cell, partner) {
                            return false;
                        }
                    }
                },
                Constraint::Sandwich { line, sum } => {
                    let conflicting = self.constraints.iter().any(|other|
                        match other {
                            Constraint::Sandwich {
                                line: other_line,
                                sum: other_sum
                            } => other_line == line && other_sum != sum,
                            _ => false
                        });

                    if conflicting {
                        return false;
                    }
                },
                _ => {}
            }
        }

        true
    }
}
