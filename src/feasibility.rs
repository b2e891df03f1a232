//! This module answers the central question of the solver: can a digit
//! still be placed in a cell? [can_place] runs a fixed sequence of checks,
//! one per active rule, and fails fast on the first violation. Techniques
//! and the search engine prune candidates by calling it for every digit of
//! a cell.
//!
//! The check order is part of the crate's semantics: direct visibility
//! first, then the cheap cell-local rules, then the sum and line rules.
//! Mirror rules (palindromes and clones) recurse into the partner cell one
//! level deep; the recursion is cut off with an internal flag.

use crate::{Board, CellRef};
use crate::constraint::{Constraint, ConstraintSet, LineRef};
use crate::locked::SumTable;
use crate::visibility::{self, orthogonal_neighbours};

/// Options controlling a [can_place] query.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlacementOptions {

    /// During backtracking the solver re-validates digits it has placed
    /// itself, so a filled cell is checked against all rules instead of
    /// being compared against its current value.
    pub during_search: bool,

    stop_loops: bool
}

impl PlacementOptions {

    /// Options that re-validate filled cells against all rules, as used by
    /// the search engine and the validity check.
    pub fn search() -> PlacementOptions {
        PlacementOptions {
            during_search: true,
            stop_loops: false
        }
    }

    fn stopped(self) -> PlacementOptions {
        PlacementOptions {
            stop_loops: true,
            ..self
        }
    }
}

fn min_of(board: &Board, cell: CellRef) -> usize {
    let cell = board.cell(cell.0, cell.1).unwrap();

    match cell.value() {
        Some(value) => value,
        None => cell.candidates().min().unwrap_or(board.size() + 1)
    }
}

fn max_of(board: &Board, cell: CellRef) -> usize {
    let cell = board.cell(cell.0, cell.1).unwrap();

    match cell.value() {
        Some(value) => value,
        None => cell.candidates().max().unwrap_or(0)
    }
}

fn value_of(board: &Board, cell: CellRef) -> Option<usize> {
    board.value(cell.0, cell.1).unwrap()
}

pub(crate) fn line_cells(line: LineRef, size: usize) -> Vec<CellRef> {
    match line {
        LineRef::Row(row) => (0..size).map(|column| (column, row)).collect(),
        LineRef::Column(column) => (0..size).map(|row| (column, row)).collect()
    }
}

fn check_direct_visibility(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    visibility::seen_by(board, constraints, cell).into_iter()
        .all(|c| value_of(board, c) != Some(digit))
}

fn check_nonconsecutive(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    if !constraints.nonconsecutive() {
        return true;
    }

    for neighbour in orthogonal_neighbours(cell, board.size()) {
        if let Some(value) = value_of(board, neighbour) {
            let consecutive = value + 1 == digit || digit + 1 == value;
            let whitelisted = constraints.difference_on(cell, neighbour)
                || constraints.ratio_on(cell, neighbour);

            if consecutive && !whitelisted {
                return false;
            }
        }
    }

    true
}

fn check_parity(constraints: &ConstraintSet, cell: CellRef, digit: usize)
        -> bool {
    for constraint in constraints.iter() {
        match constraint {
            Constraint::Odd { cell: c } if *c == cell && digit % 2 == 0 =>
                return false,
            Constraint::Even { cell: c } if *c == cell && digit % 2 == 1 =>
                return false,
            _ => {}
        }
    }

    true
}

fn check_thermometers(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    let size = board.size();

    for constraint in constraints.iter() {
        let line = match constraint {
            Constraint::Thermometer { line } => line,
            _ => continue
        };

        for (index, _) in line.iter().enumerate().filter(|(_, &c)| c == cell) {
            if digit < index + 1 {
                return false;
            }

            if digit > size - (line.len() - index - 1) {
                return false;
            }

            for &later in &line[index + 1..] {
                let blocked = match value_of(board, later) {
                    Some(value) => value <= digit,
                    None => board.candidates(later.0, later.1).unwrap()
                        .iter().all(|c| c <= digit)
                };

                if blocked {
                    return false;
                }
            }

            for &earlier in &line[..index] {
                let blocked = match value_of(board, earlier) {
                    Some(value) => value >= digit,
                    None => board.candidates(earlier.0, earlier.1).unwrap()
                        .iter().all(|c| c >= digit)
                };

                if blocked {
                    return false;
                }
            }
        }
    }

    true
}

fn check_palindromes(board: &Board, constraints: &ConstraintSet,
        sums: &SumTable, cell: CellRef, digit: usize,
        options: PlacementOptions) -> bool {
    for constraint in constraints.iter() {
        let line = match constraint {
            Constraint::Palindrome { line } => line,
            _ => continue
        };

        for (index, _) in line.iter().enumerate().filter(|(_, &c)| c == cell) {
            let mirror = line[line.len() - index - 1];

            if mirror == cell {
                continue;
            }

            match value_of(board, mirror) {
                Some(value) if value != digit => return false,
                Some(_) => {},
                None => {
                    if !can_place(board, constraints, sums, mirror, digit,
                            options.stopped()) {
                        return false;
                    }
                }
            }
        }
    }

    true
}

fn check_killer_cages(board: &Board, constraints: &ConstraintSet,
        sums: &SumTable, cell: CellRef, digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (cells, cage_sum) = match constraint {
            Constraint::Killer { cells, sum } => (cells, *sum),
            _ => continue
        };

        if !cells.contains(&cell) {
            continue;
        }

        let mut sum = digit;
        let mut empty_cells = 0;

        for &other in cells.iter().filter(|&&c| c != cell) {
            match value_of(board, other) {
                Some(value) => sum += value,
                None => empty_cells += 1
            }
        }

        if cage_sum < sums.min_in_cells(empty_cells)
                || sum > cage_sum - sums.min_in_cells(empty_cells) {
            return false;
        }

        if cage_sum >= sums.max_in_cells(empty_cells)
                && sum < cage_sum - sums.max_in_cells(empty_cells) {
            return false;
        }
    }

    true
}

fn check_little_killers(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (cells, clue_sum) = match constraint {
            Constraint::LittleKiller { cells, sum } => (cells, *sum),
            _ => continue
        };

        if !cells.contains(&cell) {
            continue;
        }

        let min_sum: usize = cells.iter()
            .filter(|&&c| c != cell)
            .map(|&c| min_of(board, c))
            .sum();
        let max_sum: usize = cells.iter()
            .filter(|&&c| c != cell)
            .map(|&c| max_of(board, c))
            .sum();

        if min_sum + digit > clue_sum || max_sum + digit < clue_sum {
            return false;
        }
    }

    true
}

fn check_sandwiches(board: &Board, constraints: &ConstraintSet,
        sums: &SumTable, cell: CellRef, digit: usize) -> bool {
    let size = board.size();

    for constraint in constraints.iter() {
        let (line, clue_sum) = match constraint {
            Constraint::Sandwich { line, sum } => (*line, *sum),
            _ => continue
        };

        let cells = line_cells(line, size);
        let index = match cells.iter().position(|&c| c == cell) {
            Some(index) => index,
            None => continue
        };

        let fillings = sums.sandwich_fillings(clue_sum);

        if fillings.is_empty() {
            return false;
        }

        let min_distance = fillings.iter().map(|f| f.len()).min().unwrap();
        let max_distance = fillings.iter().map(|f| f.len()).max().unwrap();
        let crust = digit == 1 || digit == size;

        if crust && index < min_distance + 1
                && index + min_distance + 2 > size {
            return false;
        }

        let mut values: Vec<Option<usize>> = cells.iter()
            .map(|&c| value_of(board, c))
            .collect();
        values[index] = Some(digit);

        let mut ends: Vec<usize> = cells.iter().enumerate()
            .filter(|&(i, &c)| i != index
                && matches!(value_of(board, c), Some(v) if v == 1 || v == size))
            .map(|(i, _)| i)
            .collect();

        if crust {
            ends.push(index);
        }

        if ends.len() < 2 {
            continue;
        }

        let end_1 = *ends.iter().min().unwrap();
        let end_2 = *ends.iter().max().unwrap();

        if end_1 == end_2 {
            continue;
        }

        let distance = end_2 - end_1 - 1;

        if crust && (distance < min_distance || distance > max_distance) {
            return false;
        }

        let mut sum = 0;
        let mut empty_cells = 0;

        for value in &values[end_1 + 1..end_2] {
            match value {
                Some(value) => sum += value,
                None => empty_cells += 1
            }
        }

        // The filling digits exclude the 1, so the tightest bounds shift by
        // one per empty cell compared to the plain killer bounds.
        let min_remaining = sums.min_in_cells(empty_cells) + empty_cells;
        let max_remaining = sums.max_in_cells(empty_cells) - empty_cells;

        if clue_sum < min_remaining || sum > clue_sum - min_remaining {
            return false;
        }

        if clue_sum >= max_remaining && sum < clue_sum - max_remaining {
            return false;
        }
    }

    true
}

fn check_differences(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (cells, value) = match constraint {
            Constraint::Difference { cells, value } => (cells, *value),
            _ => continue
        };

        let opposite = if cells[0] == cell {
            cells[1]
        }
        else if cells[1] == cell {
            cells[0]
        }
        else {
            continue;
        };

        if let Some(opposite_value) = value_of(board, opposite) {
            let difference = if opposite_value > digit {
                opposite_value - digit
            }
            else {
                digit - opposite_value
            };

            if difference != value {
                return false;
            }
        }
    }

    true
}

fn in_ratio(a: usize, b: usize, ratio: usize) -> bool {
    a == b * ratio || b == a * ratio
}

fn check_ratios(board: &Board, constraints: &ConstraintSet, cell: CellRef,
        digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (cells, value) = match constraint {
            Constraint::Ratio { cells, value } => (cells, *value),
            _ => continue
        };

        let opposite = if cells[0] == cell {
            cells[1]
        }
        else if cells[1] == cell {
            cells[0]
        }
        else {
            continue;
        };

        if let Some(opposite_value) = value_of(board, opposite) {
            if !in_ratio(opposite_value, digit, value) {
                return false;
            }
        }
    }

    if constraints.negative_ratio() {
        let disallowed = constraints.disallowed_ratios();

        for neighbour in orthogonal_neighbours(cell, board.size()) {
            if constraints.ratio_on(cell, neighbour)
                    || constraints.difference_on(cell, neighbour) {
                continue;
            }

            if let Some(value) = value_of(board, neighbour) {
                if disallowed.iter().any(|&r| in_ratio(value, digit, r)) {
                    return false;
                }
            }
        }
    }

    true
}

fn check_clones(board: &Board, constraints: &ConstraintSet, sums: &SumTable,
        cell: CellRef, digit: usize, options: PlacementOptions) -> bool {
    for constraint in constraints.iter() {
        let (cells, partners) = match constraint {
            Constraint::Clone { cells, partners } => (cells, partners),
            _ => continue
        };

        for i in 0..cells.len() {
            if cells[i] != cell && partners[i] != cell {
                continue;
            }

            for &member in &[cells[i], partners[i]] {
                match value_of(board, member) {
                    Some(value) if value != digit => return false,
                    Some(_) => {},
                    None => {
                        if !can_place(board, constraints, sums, member,
                                digit, options.stopped()) {
                            return false;
                        }
                    }
                }
            }
        }
    }

    true
}

fn check_arrows(board: &Board, constraints: &ConstraintSet, cell: CellRef,
        digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (head, lines) = match constraint {
            Constraint::Arrow { head, lines } => (*head, lines),
            _ => continue
        };

        if head == cell {
            for line in lines {
                let min_sum: usize = line.iter()
                    .map(|&c| min_of(board, c))
                    .sum();
                let max_sum: usize = line.iter()
                    .map(|&c| max_of(board, c))
                    .sum();

                if min_sum > digit || max_sum < digit {
                    return false;
                }
            }

            continue;
        }

        let head_min = min_of(board, head);
        let head_max = max_of(board, head);

        for line in lines {
            for (index, _) in line.iter().enumerate()
                    .filter(|(_, &c)| c == cell) {
                let min_sum: usize = line.iter().enumerate()
                    .filter(|&(i, _)| i != index)
                    .map(|(_, &c)| min_of(board, c))
                    .sum();
                let max_sum: usize = line.iter().enumerate()
                    .filter(|&(i, _)| i != index)
                    .map(|(_, &c)| max_of(board, c))
                    .sum();

                if min_sum + digit > head_max || max_sum + digit < head_min {
                    return false;
                }
            }
        }
    }

    true
}

fn sign(a: usize, b: usize) -> i32 {
    if a > b {
        1
    }
    else if a < b {
        -1
    }
    else {
        0
    }
}

fn check_between_lines(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    for constraint in constraints.iter() {
        let line = match constraint {
            Constraint::Between { line } => line,
            _ => continue
        };

        let index = match line.iter().position(|&c| c == cell) {
            Some(index) => index,
            None => continue
        };

        let last = line.len() - 1;

        if index > 0 && index < last {
            let first_min = min_of(board, line[0]);
            let first_max = max_of(board, line[0]);
            let last_min = min_of(board, line[last]);
            let last_max = max_of(board, line[last]);

            let ascending = digit > first_min && digit < last_max;
            let descending = digit < first_max && digit > last_min;

            if !ascending && !descending {
                return false;
            }
        }
        else {
            let opposite = if index == 0 { line[last] } else { line[0] };
            let middle = &line[1..last];

            let all_below = middle.iter()
                .all(|&c| min_of(board, c) < digit);
            let all_above = middle.iter()
                .all(|&c| max_of(board, c) > digit);

            if !all_below && !all_above {
                return false;
            }

            if let Some(opposite_value) = value_of(board, opposite) {
                for &mid in middle {
                    if let Some(mid_value) = value_of(board, mid) {
                        if sign(opposite_value, mid_value)
                                != sign(mid_value, digit) {
                            return false;
                        }
                    }
                }
            }
        }
    }

    true
}

fn is_minimum(constraints: &ConstraintSet, cell: CellRef) -> bool {
    constraints.iter().any(|c| matches!(c,
        Constraint::Minimum { cell: m } if *m == cell))
}

fn is_maximum(constraints: &ConstraintSet, cell: CellRef) -> bool {
    constraints.iter().any(|c| matches!(c,
        Constraint::Maximum { cell: m } if *m == cell))
}

fn check_extremes(board: &Board, constraints: &ConstraintSet, cell: CellRef,
        digit: usize) -> bool {
    let neighbours = orthogonal_neighbours(cell, board.size());

    if is_minimum(constraints, cell) {
        for &neighbour in &neighbours {
            if !is_minimum(constraints, neighbour) {
                if let Some(value) = value_of(board, neighbour) {
                    if value <= digit {
                        return false;
                    }
                }
            }
        }
    }
    else {
        for &neighbour in &neighbours {
            if is_minimum(constraints, neighbour)
                    && min_of(board, neighbour) >= digit {
                return false;
            }
        }
    }

    if is_maximum(constraints, cell) {
        for &neighbour in &neighbours {
            if !is_maximum(constraints, neighbour) {
                if let Some(value) = value_of(board, neighbour) {
                    if value >= digit {
                        return false;
                    }
                }
            }
        }
    }
    else {
        for &neighbour in &neighbours {
            if is_maximum(constraints, neighbour)
                    && max_of(board, neighbour) <= digit {
                return false;
            }
        }
    }

    true
}

fn check_xvs(board: &Board, constraints: &ConstraintSet, cell: CellRef,
        digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (cells, sum) = match constraint {
            Constraint::Xv { cells, sum } => (cells, *sum),
            _ => continue
        };

        let opposite = if cells[0] == cell {
            cells[1]
        }
        else if cells[1] == cell {
            cells[0]
        }
        else {
            continue;
        };

        if let Some(opposite_value) = value_of(board, opposite) {
            if opposite_value + digit != sum {
                return false;
            }
        }
    }

    if constraints.negative_xv() {
        for neighbour in orthogonal_neighbours(cell, board.size()) {
            if constraints.xv_on(cell, neighbour) {
                continue;
            }

            if let Some(value) = value_of(board, neighbour) {
                if value + digit == 5 || value + digit == 10 {
                    return false;
                }
            }
        }
    }

    true
}

fn check_quadruples(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, digit: usize) -> bool {
    for constraint in constraints.iter() {
        let (cells, digits) = match constraint {
            Constraint::Quadruple { cells, digits } => (cells, digits),
            _ => continue
        };

        if !cells.contains(&cell) {
            continue;
        }

        let used: Vec<usize> = cells.iter()
            .filter_map(|&c| if c == cell {
                Some(digit)
            }
            else {
                value_of(board, c)
            })
            .collect();
        let left_to_place = digits.iter()
            .filter(|d| !used.contains(d))
            .count();

        if left_to_place > 4 - used.len() {
            return false;
        }
    }

    true
}

/// Determines whether the given digit can be placed in the given cell
/// without violating any rule against the current board state. The checks
/// run in a fixed order and the first violation decides.
///
/// Outside of search mode, a filled cell accepts exactly its current digit.
/// With [PlacementOptions::during_search] the full check sequence runs even
/// for filled cells, which is how the search engine and the validity test
/// re-validate placements.
pub fn can_place(board: &Board, constraints: &ConstraintSet,
        sums: &SumTable, cell: CellRef, digit: usize,
        options: PlacementOptions) -> bool {
    if digit == 0 || digit > board.size() {
        return false;
    }

    if !options.during_search {
        if let Some(value) = value_of(board, cell) {
            return value == digit;
        }
    }

    check_direct_visibility(board, constraints, cell, digit)
        && check_nonconsecutive(board, constraints, cell, digit)
        && check_parity(constraints, cell, digit)
        && check_thermometers(board, constraints, cell, digit)
        && (options.stop_loops
            || check_palindromes(board, constraints, sums, cell, digit,
                options))
        && check_killer_cages(board, constraints, sums, cell, digit)
        && check_little_killers(board, constraints, cell, digit)
        && check_sandwiches(board, constraints, sums, cell, digit)
        && check_differences(board, constraints, cell, digit)
        && check_ratios(board, constraints, cell, digit)
        && (options.stop_loops
            || check_clones(board, constraints, sums, cell, digit, options))
        && check_arrows(board, constraints, cell, digit)
        && check_between_lines(board, constraints, cell, digit)
        && check_extremes(board, constraints, cell, digit)
        && check_xvs(board, constraints, cell, digit)
        && check_quadruples(board, constraints, cell, digit)
}

#[cfg(test)]
mod tests {

    use super::*;

    fn fixture(board: &Board) -> SumTable {
        SumTable::new(board.size())
    }

    fn place(board: &Board, constraints: &ConstraintSet, sums: &SumTable,
            cell: CellRef, digit: usize) -> bool {
        can_place(board, constraints, sums, cell, digit,
            PlacementOptions::default())
    }

    #[test]
    fn out_of_range_digits_are_rejected() {
        let board = Board::new(2, 2).unwrap();
        let constraints = ConstraintSet::new();
        let sums = fixture(&board);

        assert!(!place(&board, &constraints, &sums, (0, 0), 0));
        assert!(!place(&board, &constraints, &sums, (0, 0), 5));
        assert!(place(&board, &constraints, &sums, (0, 0), 4));
    }

    #[test]
    fn filled_cell_accepts_only_its_value() {
        let mut board = Board::new(2, 2).unwrap();
        let constraints = ConstraintSet::new();
        let sums = fixture(&board);
        board.set_value(0, 0, 2).unwrap();

        assert!(place(&board, &constraints, &sums, (0, 0), 2));
        assert!(!place(&board, &constraints, &sums, (0, 0), 3));
    }

    #[test]
    fn direct_visibility_blocks_row_column_and_block() {
        let mut board = Board::new(3, 3).unwrap();
        let constraints = ConstraintSet::new();
        let sums = fixture(&board);
        board.set_value(0, 0, 5).unwrap();

        assert!(!place(&board, &constraints, &sums, (8, 0), 5));
        assert!(!place(&board, &constraints, &sums, (0, 8), 5));
        assert!(!place(&board, &constraints, &sums, (2, 2), 5));
        assert!(place(&board, &constraints, &sums, (3, 3), 5));
    }

    #[test]
    fn nonconsecutive_blocks_neighbours() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.set_nonconsecutive(true);
        let sums = fixture(&board);
        board.set_value(4, 4, 5).unwrap();

        assert!(!place(&board, &constraints, &sums, (4, 3), 4));
        assert!(!place(&board, &constraints, &sums, (5, 4), 6));
        assert!(place(&board, &constraints, &sums, (4, 3), 7));
        // Diagonal neighbours are unaffected.
        assert!(place(&board, &constraints, &sums, (5, 5), 4));
    }

    #[test]
    fn difference_clue_whitelists_nonconsecutive_pair() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.set_nonconsecutive(true);
        constraints.push(Constraint::Difference {
            cells: [(4, 4), (4, 3)],
            value: 1
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(4, 4, 5).unwrap();

        assert!(place(&board, &constraints, &sums, (4, 3), 4));
    }

    #[test]
    fn parity_restricts_marked_cells() {
        let board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Odd { cell: (0, 0) }).unwrap();
        constraints.push(Constraint::Even { cell: (1, 0) }).unwrap();
        let sums = fixture(&board);

        assert!(place(&board, &constraints, &sums, (0, 0), 3));
        assert!(!place(&board, &constraints, &sums, (0, 0), 4));
        assert!(place(&board, &constraints, &sums, (1, 0), 4));
        assert!(!place(&board, &constraints, &sums, (1, 0), 3));
    }

    #[test]
    fn thermometer_positional_bounds() {
        let board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Thermometer {
            line: vec![(0, 0), (1, 0), (2, 0), (3, 0)]
        }).unwrap();
        let sums = fixture(&board);

        // The second cell must be at least 2 and at most 7.
        assert!(!place(&board, &constraints, &sums, (1, 0), 1));
        assert!(place(&board, &constraints, &sums, (1, 0), 2));
        assert!(place(&board, &constraints, &sums, (1, 0), 7));
        assert!(!place(&board, &constraints, &sums, (1, 0), 8));
    }

    #[test]
    fn thermometer_respects_filled_cells() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Thermometer {
            line: vec![(0, 0), (1, 0), (2, 0)]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(1, 0, 5).unwrap();

        assert!(place(&board, &constraints, &sums, (0, 0), 4));
        assert!(!place(&board, &constraints, &sums, (0, 0), 5));
        assert!(place(&board, &constraints, &sums, (2, 0), 6));
    }

    #[test]
    fn palindrome_mirrors_filled_partner() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Palindrome {
            line: vec![(0, 0), (1, 1), (4, 2), (5, 3)]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(5, 3, 7).unwrap();

        assert!(place(&board, &constraints, &sums, (0, 0), 7));
        assert!(!place(&board, &constraints, &sums, (0, 0), 6));
    }

    #[test]
    fn palindrome_mirrors_partner_candidates() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Palindrome {
            line: vec![(0, 0), (4, 2)]
        }).unwrap();
        let sums = fixture(&board);

        // A 7 elsewhere in the mirror's row makes 7 impossible here too.
        board.set_value(8, 2, 7).unwrap();

        assert!(!place(&board, &constraints, &sums, (0, 0), 7));
        assert!(place(&board, &constraints, &sums, (0, 0), 6));
    }

    #[test]
    fn killer_cage_partial_sum_bounds() {
        let board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Killer {
            cells: vec![(0, 0), (1, 0)],
            sum: 3
        }).unwrap();
        let sums = fixture(&board);

        assert!(place(&board, &constraints, &sums, (0, 0), 1));
        assert!(place(&board, &constraints, &sums, (0, 0), 2));
        assert!(!place(&board, &constraints, &sums, (0, 0), 3));
    }

    #[test]
    fn killer_cage_lower_bound() {
        let board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Killer {
            cells: vec![(0, 0), (1, 0)],
            sum: 17
        }).unwrap();
        let sums = fixture(&board);

        assert!(place(&board, &constraints, &sums, (0, 0), 8));
        assert!(!place(&board, &constraints, &sums, (0, 0), 7));
    }

    #[test]
    fn little_killer_bounds() {
        let mut board = Board::new(2, 2).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::LittleKiller {
            cells: vec![(0, 0), (1, 1), (2, 2), (3, 3)],
            sum: 5
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(1, 1, 1).unwrap();
        board.set_value(2, 2, 1).unwrap();

        // 5 - 1 - 1 leaves 3 for the two remaining cells.
        assert!(place(&board, &constraints, &sums, (0, 0), 2));
        assert!(!place(&board, &constraints, &sums, (0, 0), 3));
    }

    #[test]
    fn sandwich_crust_needs_room() {
        let board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Sandwich {
            line: LineRef::Row(0),
            sum: 35
        }).unwrap();
        let sums = fixture(&board);

        // A sum of 35 requires all seven filling digits, so the crusts must
        // sit at the very ends of the row.
        assert!(place(&board, &constraints, &sums, (0, 0), 1));
        assert!(place(&board, &constraints, &sums, (8, 0), 9));
        assert!(!place(&board, &constraints, &sums, (4, 0), 1));
        assert!(place(&board, &constraints, &sums, (4, 0), 5));
    }

    #[test]
    fn sandwich_inner_sum_bounds() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Sandwich {
            line: LineRef::Row(0),
            sum: 8
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(2, 0, 1).unwrap();
        board.set_value(4, 0, 9).unwrap();

        // One filling cell between the crusts, so it must be exactly 8.
        assert!(place(&board, &constraints, &sums, (3, 0), 8));
        assert!(!place(&board, &constraints, &sums, (3, 0), 7));
    }

    #[test]
    fn difference_pair() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Difference {
            cells: [(0, 0), (1, 0)],
            value: 3
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(0, 0, 5).unwrap();

        assert!(place(&board, &constraints, &sums, (1, 0), 2));
        assert!(place(&board, &constraints, &sums, (1, 0), 8));
        assert!(!place(&board, &constraints, &sums, (1, 0), 4));
    }

    #[test]
    fn ratio_pair() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Ratio {
            cells: [(0, 0), (1, 0)],
            value: 2
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(0, 0, 4).unwrap();

        assert!(place(&board, &constraints, &sums, (1, 0), 2));
        assert!(place(&board, &constraints, &sums, (1, 0), 8));
        assert!(!place(&board, &constraints, &sums, (1, 0), 3));
    }

    #[test]
    fn negative_ratio_scan() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.set_negative_ratio(true);
        let sums = fixture(&board);
        board.set_value(4, 4, 4).unwrap();

        assert!(!place(&board, &constraints, &sums, (4, 3), 2));
        assert!(!place(&board, &constraints, &sums, (4, 3), 8));
        assert!(place(&board, &constraints, &sums, (4, 3), 3));
    }

    #[test]
    fn clone_partner_must_match() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Clone {
            cells: vec![(0, 0)],
            partners: vec![(4, 4)]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(4, 4, 6).unwrap();

        assert!(place(&board, &constraints, &sums, (0, 0), 6));
        assert!(!place(&board, &constraints, &sums, (0, 0), 5));
    }

    #[test]
    fn arrow_head_bounds() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Arrow {
            head: (0, 0),
            lines: vec![vec![(1, 1), (2, 2)]]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(1, 1, 3).unwrap();
        board.set_value(2, 2, 4).unwrap();

        assert!(place(&board, &constraints, &sums, (0, 0), 7));
        assert!(!place(&board, &constraints, &sums, (0, 0), 8));
    }

    #[test]
    fn arrow_line_cell_bounds() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Arrow {
            head: (0, 0),
            lines: vec![vec![(1, 1), (2, 2)]]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(0, 0, 5).unwrap();
        board.set_value(1, 1, 3).unwrap();

        assert!(place(&board, &constraints, &sums, (2, 2), 2));
        assert!(!place(&board, &constraints, &sums, (2, 2), 1));
        assert!(!place(&board, &constraints, &sums, (2, 2), 4));
    }

    #[test]
    fn between_line_middle_cells() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Between {
            line: vec![(0, 0), (1, 1), (2, 2)]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(0, 0, 3).unwrap();
        board.set_value(2, 2, 7).unwrap();

        assert!(place(&board, &constraints, &sums, (1, 1), 5));
        assert!(!place(&board, &constraints, &sums, (1, 1), 3));
        assert!(!place(&board, &constraints, &sums, (1, 1), 8));
    }

    #[test]
    fn between_line_endpoint_direction() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Between {
            line: vec![(0, 0), (1, 1), (2, 2)]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(1, 1, 5).unwrap();
        board.set_value(2, 2, 8).unwrap();

        // 8 on the far end means the middle 5 must exceed this end.
        assert!(place(&board, &constraints, &sums, (0, 0), 2));
        assert!(!place(&board, &constraints, &sums, (0, 0), 6));
    }

    #[test]
    fn minimum_cell_constraints() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Minimum { cell: (4, 4) }).unwrap();
        let sums = fixture(&board);
        board.set_value(4, 3, 5).unwrap();

        // The marked cell must stay below its filled neighbour.
        assert!(place(&board, &constraints, &sums, (4, 4), 4));
        assert!(!place(&board, &constraints, &sums, (4, 4), 5));
        assert!(!place(&board, &constraints, &sums, (4, 4), 6));
    }

    #[test]
    fn neighbour_of_minimum_cell() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Minimum { cell: (4, 4) }).unwrap();
        let sums = fixture(&board);
        board.set_value(4, 4, 3).unwrap();

        assert!(place(&board, &constraints, &sums, (4, 5), 4));
        assert!(!place(&board, &constraints, &sums, (4, 5), 3));
        assert!(!place(&board, &constraints, &sums, (4, 5), 2));
    }

    #[test]
    fn xv_pair_sums() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Xv {
            cells: [(0, 0), (1, 0)],
            sum: 10
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(0, 0, 4).unwrap();

        assert!(place(&board, &constraints, &sums, (1, 0), 6));
        assert!(!place(&board, &constraints, &sums, (1, 0), 5));
    }

    #[test]
    fn negative_xv_scan() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.set_negative_xv(true);
        let sums = fixture(&board);
        board.set_value(4, 4, 4).unwrap();

        assert!(!place(&board, &constraints, &sums, (4, 3), 6));
        assert!(!place(&board, &constraints, &sums, (4, 3), 1));
        assert!(place(&board, &constraints, &sums, (4, 3), 2));
    }

    #[test]
    fn quadruple_leaves_room_for_required_digits() {
        let mut board = Board::new(3, 3).unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Quadruple {
            cells: vec![(4, 4), (5, 4), (4, 5), (5, 5)],
            digits: vec![1, 2, 3]
        }).unwrap();
        let sums = fixture(&board);
        board.set_value(5, 4, 1).unwrap();

        // With a 1 placed, the remaining three cells must cover 2 and 3, so
        // at most one free digit remains.
        assert!(place(&board, &constraints, &sums, (4, 4), 2));
        assert!(place(&board, &constraints, &sums, (4, 4), 9));

        board.set_value(5, 5, 8).unwrap();

        // Now only two cells remain for both 2 and 3.
        assert!(place(&board, &constraints, &sums, (4, 4), 2));
        assert!(!place(&board, &constraints, &sums, (4, 4), 9));
    }

    #[test]
    fn search_mode_revalidates_filled_cells() {
        let mut board = Board::new(3, 3).unwrap();
        let constraints = ConstraintSet::new();
        let sums = fixture(&board);
        board.set_value(0, 0, 5).unwrap();
        board.set_value(8, 0, 5).unwrap();

        let search = PlacementOptions {
            during_search: true,
            ..PlacementOptions::default()
        };

        assert!(!can_place(&board, &constraints, &sums, (0, 0), 5, search));
    }
}
