//! This module resolves which cells "see" each other, i.e. may never contain
//! the same digit. Visibility is derived from the always-active row and
//! column rules, cell regions, the grid-wide flags of a
//! [ConstraintSet](crate::constraint::ConstraintSet) (diagonals, anti-knight,
//! anti-king, disjoint groups) and membership in extra regions and killer
//! cages.
//!
//! Palindrome counterparts and clone partners are required to hold the same
//! digit, so visibility flows through them: a cell sees everything its
//! mirrors see, while the mirrors themselves are never seen. All entry
//! points here resolve the transitive mirror closure of their arguments
//! first.
//!
//! [sees] answers the question for a single pair of cells and short-circuits
//! on the first witness. [seen_by] materializes the full list for a cell and
//! [seen_by_all] intersects the lists of several cells, which is what
//! pointing-set eliminations work on.

use crate::{Board, CellRef};
use crate::constraint::{Constraint, ConstraintSet};

use std::collections::HashSet;

const KNIGHT_MOVES: [(isize, isize); 8] = [
    (-1, -2), (1, -2), (-2, -1), (2, -1),
    (-2, 1), (2, 1), (-1, 2), (1, 2)
];

const DIAGONAL_MOVES: [(isize, isize); 4] = [
    (-1, -1), (1, -1), (-1, 1), (1, 1)
];

const ORTHOGONAL_MOVES: [(isize, isize); 4] = [
    (0, -1), (-1, 0), (1, 0), (0, 1)
];

fn offset_cell(cell: CellRef, offset: (isize, isize), size: usize)
        -> Option<CellRef> {
    let column = cell.0 as isize + offset.0;
    let row = cell.1 as isize + offset.1;

    if column < 0 || row < 0 || column >= size as isize
            || row >= size as isize {
        None
    }
    else {
        Some((column as usize, row as usize))
    }
}

/// Returns all cells within the grid that are reachable from `cell` by one
/// of the given offsets.
pub(crate) fn reachable_cells(cell: CellRef, offsets: &[(isize, isize)],
        size: usize) -> Vec<CellRef> {
    offsets.iter()
        .filter_map(|&offset| offset_cell(cell, offset, size))
        .collect()
}

/// Returns the orthogonal neighbours of `cell` within the grid.
pub fn orthogonal_neighbours(cell: CellRef, size: usize) -> Vec<CellRef> {
    reachable_cells(cell, &ORTHOGONAL_MOVES, size)
}

fn on_negative_diagonal(cell: CellRef) -> bool {
    cell.0 == cell.1
}

fn on_positive_diagonal(cell: CellRef, size: usize) -> bool {
    cell.0 + cell.1 == size - 1
}

fn in_group(cells: &[CellRef], a: CellRef, b: CellRef) -> bool {
    cells.contains(&a) && cells.contains(&b)
}

/// The transitive closure of a cell over palindrome counterparts and clone
/// partners, starting with the cell itself. All members are forced to hold
/// the same digit.
pub(crate) fn mirror_closure(constraints: &ConstraintSet, cell: CellRef)
        -> Vec<CellRef> {
    let mut result = vec![cell];
    let mut visited = HashSet::new();
    visited.insert(cell);
    let mut queue = vec![cell];

    while let Some(current) = queue.pop() {
        for mirror in constraints.mirrors_of(current) {
            if visited.insert(mirror) {
                result.push(mirror);
                queue.push(mirror);
            }
        }
    }

    result
}

/// Determines whether the two given cells see each other under the given
/// rule set, i.e. may never contain the same digit. Since mirrors share
/// their digit, it suffices that any mirror of `a` directly sees any mirror
/// of `b`. A cell does not see itself.
pub fn sees(board: &Board, constraints: &ConstraintSet, a: CellRef,
        b: CellRef) -> bool {
    if a == b {
        return false;
    }

    if sees_directly(board, constraints, a, b) {
        return true;
    }

    let mirrors_a = mirror_closure(constraints, a);
    let mirrors_b = mirror_closure(constraints, b);

    if mirrors_a.len() == 1 && mirrors_b.len() == 1 {
        return false;
    }

    mirrors_a.iter().any(|&mirror_a| mirrors_b.iter()
        .any(|&mirror_b| mirror_a != mirror_b
            && sees_directly(board, constraints, mirror_a, mirror_b)))
}

fn sees_directly(board: &Board, constraints: &ConstraintSet, a: CellRef,
        b: CellRef) -> bool {
    if a == b {
        return false;
    }

    let size = board.size();

    if a.0 == b.0 || a.1 == b.1 {
        return true;
    }

    let region_a = board.cell(a.0, a.1).ok().and_then(|c| c.region());
    let region_b = board.cell(b.0, b.1).ok().and_then(|c| c.region());

    if region_a.is_some() && region_a == region_b {
        return true;
    }

    if constraints.diagonal_negative() && on_negative_diagonal(a)
            && on_negative_diagonal(b) {
        return true;
    }

    if constraints.diagonal_positive() && on_positive_diagonal(a, size)
            && on_positive_diagonal(b, size) {
        return true;
    }

    let column_distance = (a.0 as isize - b.0 as isize).abs();
    let row_distance = (a.1 as isize - b.1 as isize).abs();

    if constraints.antiknight() && column_distance + row_distance == 3
            && column_distance != 0 && row_distance != 0 {
        return true;
    }

    if constraints.antiking() && column_distance == 1 && row_distance == 1 {
        return true;
    }

    if constraints.disjoint_groups()
            && a.0 % board.block_width() == b.0 % board.block_width()
            && a.1 % board.block_height() == b.1 % board.block_height() {
        return true;
    }

    constraints.iter().any(|constraint| match constraint {
        Constraint::ExtraRegion { cells } => in_group(cells, a, b),
        Constraint::Killer { cells, .. } => in_group(cells, a, b),
        _ => false
    })
}

/// Returns all cells that see the given cell under the given rule set, in an
/// unspecified but deterministic order. The union over the cell's mirror
/// closure is returned, since a digit excluded next to a mirror is excluded
/// from the cell as well. Neither the cell itself nor its mirrors are
/// included.
pub fn seen_by(board: &Board, constraints: &ConstraintSet, cell: CellRef)
        -> Vec<CellRef> {
    let closure = mirror_closure(constraints, cell);
    let mut result = Vec::new();
    let mut known: HashSet<CellRef> = closure.iter().copied().collect();

    for &member in &closure {
        directly_seen_by(board, constraints, member, &mut known,
            &mut result);
    }

    result
}

fn directly_seen_by(board: &Board, constraints: &ConstraintSet,
        cell: CellRef, known: &mut HashSet<CellRef>,
        result: &mut Vec<CellRef>) {
    let size = board.size();

    let mut push = |c: CellRef, result: &mut Vec<CellRef>| {
        if known.insert(c) {
            result.push(c);
        }
    };

    for i in 0..size {
        push((i, cell.1), result);
        push((cell.0, i), result);
    }

    if let Some(region) = board.cell(cell.0, cell.1).ok()
            .and_then(|c| c.region()) {
        for c in board.region_cells(region) {
            push(c, result);
        }
    }

    if constraints.diagonal_negative() && on_negative_diagonal(cell) {
        for i in 0..size {
            push((i, i), result);
        }
    }

    if constraints.diagonal_positive() && on_positive_diagonal(cell, size) {
        for i in 0..size {
            push((i, size - i - 1), result);
        }
    }

    if constraints.antiknight() {
        for c in reachable_cells(cell, &KNIGHT_MOVES, size) {
            push(c, result);
        }
    }

    if constraints.antiking() {
        for c in reachable_cells(cell, &DIAGONAL_MOVES, size) {
            push(c, result);
        }
    }

    if constraints.disjoint_groups() {
        let column_in_block = cell.0 % board.block_width();
        let row_in_block = cell.1 % board.block_height();

        for block_row in 0..board.block_width() {
            for block_column in 0..board.block_height() {
                push((block_column * board.block_width() + column_in_block,
                    block_row * board.block_height() + row_in_block),
                    result);
            }
        }
    }

    for constraint in constraints.iter() {
        match constraint {
            Constraint::ExtraRegion { cells }
                    | Constraint::Killer { cells, .. } => {
                if cells.contains(&cell) {
                    for &c in cells {
                        push(c, result);
                    }
                }
            },
            _ => {}
        }
    }
}

/// Returns all cells that see every one of the given cells. Mirrors of the
/// given cells are never part of the result, since they may have to repeat
/// the digit of their counterpart. For an empty slice, the result is empty.
pub fn seen_by_all(board: &Board, constraints: &ConstraintSet,
        cells: &[CellRef]) -> Vec<CellRef> {
    let mut iter = cells.iter();
    let first = match iter.next() {
        Some(&first) => first,
        None => return Vec::new()
    };

    let excluded: HashSet<CellRef> = cells.iter()
        .flat_map(|&c| mirror_closure(constraints, c))
        .collect();

    seen_by(board, constraints, first).into_iter()
        .filter(|&candidate| !excluded.contains(&candidate)
            && iter.clone()
                .all(|&c| sees(board, constraints, candidate, c)))
        .collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    fn classic_board() -> Board {
        Board::new(3, 3).unwrap()
    }

    #[test]
    fn row_column_and_block_visibility() {
        let board = classic_board();
        let constraints = ConstraintSet::new();

        assert!(sees(&board, &constraints, (0, 0), (5, 0)));
        assert!(sees(&board, &constraints, (0, 0), (0, 7)));
        assert!(sees(&board, &constraints, (0, 0), (2, 2)));
        assert!(!sees(&board, &constraints, (0, 0), (3, 3)));
        assert!(!sees(&board, &constraints, (4, 4), (4, 4)));
    }

    #[test]
    fn seen_by_classic_count() {
        let board = classic_board();
        let constraints = ConstraintSet::new();

        // 8 in the row, 8 in the column and 4 block cells not already
        // counted.
        assert_eq!(20, seen_by(&board, &constraints, (4, 4)).len());
    }

    #[test]
    fn diagonal_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.set_diagonals(true);

        assert!(sees(&board, &constraints, (0, 0), (5, 5)));
        assert!(sees(&board, &constraints, (8, 0), (0, 8)));
        assert!(!sees(&board, &constraints, (1, 0), (5, 4)));
    }

    #[test]
    fn knight_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.set_antiknight(true);

        assert!(sees(&board, &constraints, (4, 4), (5, 6)));
        assert!(sees(&board, &constraints, (4, 4), (2, 3)));
        assert!(!sees(&board, &constraints, (4, 4), (6, 6)));
    }

    #[test]
    fn king_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.set_antiking(true);

        assert!(sees(&board, &constraints, (4, 4), (5, 5)));
        assert!(sees(&board, &constraints, (4, 4), (3, 5)));
        assert!(!sees(&board, &constraints, (4, 4), (6, 5)));
    }

    #[test]
    fn disjoint_group_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.set_disjoint_groups(true);

        // Top-left cells of two different blocks.
        assert!(sees(&board, &constraints, (0, 0), (3, 3)));
        assert!(!sees(&board, &constraints, (0, 0), (4, 3)));
    }

    #[test]
    fn killer_cage_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Killer {
            cells: vec![(0, 0), (0, 1), (1, 1), (1, 2)],
            sum: 20
        }).unwrap();

        assert!(sees(&board, &constraints, (0, 0), (1, 2)));
        assert!(!sees(&board, &constraints, (0, 0), (2, 3)));
    }

    #[test]
    fn palindrome_mirror_extends_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Palindrome {
            line: vec![(0, 0), (8, 8)]
        }).unwrap();

        // (0, 0) repeats at (8, 8), so it also sees row 9 and column 9.
        assert!(sees(&board, &constraints, (0, 0), (4, 8)));
        assert!(sees(&board, &constraints, (8, 4), (0, 0)));
        assert!(!sees(&board, &constraints, (0, 0), (8, 8)));

        let seen = seen_by(&board, &constraints, (0, 0));
        assert!(seen.contains(&(4, 8)));
        assert!(seen.contains(&(8, 4)));
        assert!(seen.contains(&(5, 0)));
        assert!(!seen.contains(&(8, 8)));
    }

    #[test]
    fn clone_partner_extends_visibility() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Clone {
            cells: vec![(0, 0)],
            partners: vec![(4, 4)]
        }).unwrap();

        assert!(sees(&board, &constraints, (0, 0), (4, 7)));
        assert!(!sees(&board, &constraints, (0, 0), (4, 4)));
        assert!(!sees(&board, &constraints, (0, 0), (7, 7)));
    }

    #[test]
    fn seen_by_all_excludes_mirrors() {
        let board = classic_board();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Palindrome {
            line: vec![(0, 0), (8, 8)]
        }).unwrap();

        let common = seen_by_all(&board, &constraints, &[(0, 0), (1, 0)]);
        assert!(common.contains(&(5, 0)));
        assert!(!common.contains(&(8, 8)));
    }

    #[test]
    fn seen_by_all_intersection() {
        let board = classic_board();
        let constraints = ConstraintSet::new();

        let common = seen_by_all(&board, &constraints, &[(0, 0), (1, 0)]);

        // The rest of the shared row and the rest of the shared block.
        assert!(common.contains(&(5, 0)));
        assert!(common.contains(&(2, 1)));
        assert!(!common.contains(&(0, 5)));
        assert!(!common.contains(&(0, 0)));
        assert!(!common.contains(&(1, 0)));
    }

    #[test]
    fn seen_by_all_empty_input() {
        let board = classic_board();
        let constraints = ConstraintSet::new();
        assert!(seen_by_all(&board, &constraints, &[]).is_empty());
    }
}
