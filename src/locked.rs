//! This module contains the locked-set machinery: the [SumTable] of
//! achievable digit combinations, which backs killer and sandwich reasoning,
//! and [LockedSet]s, which track where an unplaced digit can still go within
//! a region. Locked sets power hidden singles, pointing eliminations and the
//! quick impossibility check of the search engine.

use crate::{Board, CellRef};
use crate::constraint::{Constraint, ConstraintSet};
use crate::util::DigitSet;
use crate::visibility;

/// Precomputed combinations of distinct digits for one grid size. For every
/// sum `s` and combination length `k`, the table holds all sets of `k`
/// distinct digits in `1..=size` that add up to `s`.
#[derive(Clone, Debug)]
pub struct SumTable {
    size: usize,
    combinations: Vec<Vec<Vec<DigitSet>>>
}

impl SumTable {

    /// Builds the table for the given grid size. The size must have been
    /// validated by the board constructor.
    pub fn new(size: usize) -> SumTable {
        let max_sum = size * (size + 1) / 2;
        let mut combinations =
            vec![vec![Vec::new(); size + 1]; max_sum + 1];

        // The empty combination achieves sum 0 with 0 cells.
        combinations[0][0].push(DigitSet::new(size).unwrap());

        for k in 1..=size {
            let mut digits: Vec<usize> = (1..=k).collect();

            loop {
                let sum: usize = digits.iter().sum();
                let mut set = DigitSet::new(size).unwrap();

                for &digit in &digits {
                    set.insert(digit).unwrap();
                }

                combinations[sum][k].push(set);

                if !next_combination(&mut digits, size) {
                    break;
                }
            }
        }

        SumTable {
            size,
            combinations
        }
    }

    /// The grid size this table was built for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The smallest sum achievable with `n` distinct digits, i.e.
    /// `1 + 2 + … + n`.
    pub fn min_in_cells(&self, n: usize) -> usize {
        n * (n + 1) / 2
    }

    /// The largest sum achievable with `n` distinct digits of this grid
    /// size, i.e. `size + (size - 1) + … + (size - n + 1)`.
    pub fn max_in_cells(&self, n: usize) -> usize {
        ((2 * self.size + 1) * n - n * n) / 2
    }

    /// All sets of `len` distinct digits that add up to `sum`. The slice is
    /// empty if no such combination exists.
    pub fn combinations(&self, sum: usize, len: usize) -> &[DigitSet] {
        self.combinations.get(sum)
            .and_then(|by_len| by_len.get(len))
            .map(|sets| sets.as_slice())
            .unwrap_or(&[])
    }

    /// All digit sets of any length that add up to `sum` without using the
    /// digits 1 and `size`, i.e. the possible fillings between the crusts of
    /// a sandwich. For `sum = 0` this contains only the empty set.
    pub fn sandwich_fillings(&self, sum: usize) -> Vec<DigitSet> {
        let mut result = Vec::new();

        for len in 0..self.size {
            for set in self.combinations(sum, len) {
                if !set.contains(1) && !set.contains(self.size) {
                    result.push(*set);
                }
            }
        }

        result
    }
}

fn next_combination(digits: &mut [usize], max: usize) -> bool {
    let len = digits.len();

    for i in (0..len).rev() {
        if digits[i] < max - (len - i - 1) {
            digits[i] += 1;

            for j in (i + 1)..len {
                digits[j] = digits[j - 1] + 1;
            }

            return true;
        }
    }

    false
}

/// A set of cells within one region that are the only remaining homes of a
/// digit. Any cell outside the set that sees all of its members cannot hold
/// the digit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockedSet {

    /// The digit confined to the member cells.
    pub digit: usize,

    /// The cells that can still hold the digit.
    pub cells: Vec<CellRef>,

    /// A human-readable name of the region the set was derived from, used in
    /// step descriptions.
    pub location: String
}

fn locked_sets_of_group(board: &Board, group: &[CellRef], location: &str,
        result: &mut Vec<LockedSet>) {
    let size = board.size();

    for digit in 1..=size {
        let placed = group.iter()
            .any(|&(column, row)|
                board.value(column, row).unwrap() == Some(digit));

        if placed {
            continue;
        }

        let cells: Vec<CellRef> = group.iter()
            .filter(|&&(column, row)|
                board.value(column, row).unwrap().is_none()
                    && board.candidates(column, row).unwrap()
                        .contains(digit))
            .copied()
            .collect();

        let set = LockedSet {
            digit,
            cells,
            location: location.to_owned()
        };

        if !result.contains(&set) {
            result.push(set);
        }
    }
}

// Index pairs of corner-adjacent cells within the four cells of a quadruple,
// which are ordered left-to-right, top-to-bottom.
const QUADRUPLE_PAIRS: [(usize, usize); 4] = [(0, 1), (1, 3), (2, 3), (0, 2)];

fn locked_sets_of_quadruple(board: &Board, cells: &[CellRef],
        digits: &[usize], result: &mut Vec<LockedSet>) {
    for &digit in digits {
        let occurrences = digits.iter().filter(|&&d| d == digit).count();
        let placed = cells.iter()
            .filter(|&&(column, row)|
                board.value(column, row).unwrap() == Some(digit))
            .count();

        let candidate_cells = |group: &[CellRef]| -> Vec<CellRef> {
            group.iter()
                .filter(|&&(column, row)|
                    board.value(column, row).unwrap().is_none()
                        && board.candidates(column, row).unwrap()
                            .contains(digit))
                .copied()
                .collect()
        };

        if occurrences == 1 {
            if placed > 0 {
                continue;
            }

            let set = LockedSet {
                digit,
                cells: candidate_cells(cells),
                location: String::from("Quadruple")
            };

            if !result.contains(&set) {
                result.push(set);
            }
        }
        else if placed < occurrences {
            // A digit required twice must occupy two corner-adjacent cells,
            // so each such pair is a locked home of the digit.
            for &(i, j) in &QUADRUPLE_PAIRS {
                let pair = [cells[i], cells[j]];

                if pair.iter().any(|&(column, row)|
                        board.value(column, row).unwrap() == Some(digit)) {
                    continue;
                }

                let set = LockedSet {
                    digit,
                    cells: candidate_cells(&pair),
                    location: String::from("Quadruple")
                };

                if !result.contains(&set) {
                    result.push(set);
                }
            }
        }
    }
}

/// Derives all locked sets of the current board state: for every row,
/// column, region, active diagonal, disjoint group and extra region, one set
/// per unplaced digit over the empty cells that still hold it as a
/// candidate, plus the sets implied by quadruple clues.
pub fn discover(board: &Board, constraints: &ConstraintSet)
        -> Vec<LockedSet> {
    let size = board.size();
    let mut result = Vec::new();

    for row in 0..size {
        let group: Vec<CellRef> = (0..size).map(|column| (column, row))
            .collect();
        locked_sets_of_group(board, &group, &format!("Row {}", row + 1),
            &mut result);
    }

    for column in 0..size {
        let group: Vec<CellRef> = (0..size).map(|row| (column, row))
            .collect();
        locked_sets_of_group(board, &group,
            &format!("Column {}", column + 1), &mut result);
    }

    for region in 0..size {
        let group = board.region_cells(region);

        if !group.is_empty() {
            locked_sets_of_group(board, &group,
                &format!("Box {}", region + 1), &mut result);
        }
    }

    if constraints.diagonal_negative() {
        let group: Vec<CellRef> = (0..size).map(|i| (i, i)).collect();
        locked_sets_of_group(board, &group, "Negative Diagonal",
            &mut result);
    }

    if constraints.diagonal_positive() {
        let group: Vec<CellRef> = (0..size).map(|i| (i, size - i - 1))
            .collect();
        locked_sets_of_group(board, &group, "Positive Diagonal",
            &mut result);
    }

    if constraints.disjoint_groups() {
        let block_width = board.block_width();
        let block_height = board.block_height();

        for position in 0..size {
            let column_in_block = position % block_width;
            let row_in_block = position / block_width;
            let mut group = Vec::with_capacity(size);

            for block_row in 0..block_width {
                for block_column in 0..block_height {
                    group.push((
                        block_column * block_width + column_in_block,
                        block_row * block_height + row_in_block));
                }
            }

            locked_sets_of_group(board, &group,
                &format!("Disjoint Group {}", position + 1), &mut result);
        }
    }

    for constraint in constraints.iter() {
        match constraint {
            Constraint::ExtraRegion { cells } =>
                locked_sets_of_group(board, cells, "Extra Region",
                    &mut result),
            Constraint::Quadruple { cells, digits } =>
                locked_sets_of_quadruple(board, cells, digits, &mut result),
            _ => {}
        }
    }

    result
}

/// Prunes the given locked sets against the current board state: sets whose
/// digit has been placed in one of their cells are dropped, and the
/// remaining sets lose all cells that are filled or no longer hold the digit
/// as a candidate. A surviving set with no cells left signals that the board
/// is unsolvable.
pub fn reduce(sets: &mut Vec<LockedSet>, board: &Board) {
    sets.retain(|set| !set.cells.iter()
        .any(|&(column, row)|
            board.value(column, row).unwrap() == Some(set.digit)));

    for set in sets.iter_mut() {
        let digit = set.digit;
        set.cells.retain(|&(column, row)|
            board.value(column, row).unwrap().is_none()
                && board.candidates(column, row).unwrap()
                    .contains(digit));
    }
}

/// Removes the set's digit from the candidates of every empty cell that sees
/// all member cells. Returns the cells whose candidates changed.
pub fn eliminate(board: &mut Board, constraints: &ConstraintSet,
        set: &LockedSet) -> Vec<CellRef> {
    let mut changed = Vec::new();

    if set.cells.is_empty() {
        return changed;
    }

    for (column, row) in visibility::seen_by_all(board, constraints,
            &set.cells) {
        if board.value(column, row).unwrap().is_none()
                && board.remove_candidate(column, row, set.digit).unwrap() {
            changed.push((column, row));
        }
    }

    changed
}
