//! The tiered ladder of human-style solving techniques. The ladder is a
//! strictly ordered catalogue: within one [apply] call, the first rule that
//! changes the board wins and the ladder stops there, so a caller stepping
//! repeatedly always sees the cheapest available deduction first.
//!
//! Tier 1 holds candidate eliminations and singles, tier 2 subsets and the
//! variant-specific interactions, tier 3 fish patterns and wings, and tier 4
//! short contradiction chains. The difficulty of a puzzle is the highest
//! tier the ladder needed to solve it.

use crate::{Board, CellRef};
use crate::constraint::{Constraint, ConstraintSet, LineRef};
use crate::feasibility::{self, PlacementOptions};
use crate::locked;
use crate::solver::{cell_name, Session, StepOptions, StepReport};
use crate::util::DigitSet;
use crate::visibility;

type Rule = fn(&mut Session) -> Option<StepReport>;

/// Applies the first rule of the lowest tier that changes the board, up to
/// the difficulty limit of the given options.
pub(crate) fn apply(session: &mut Session, options: &StepOptions)
        -> StepReport {
    session.refresh_locked_sets();

    let limit = if options.brute_force {
        1
    }
    else {
        options.difficulty_limit
    };

    let rules: &[(usize, Rule)] = &[
        (1, eliminations),
        (1, naked_single),
        (1, hidden_single),
        (2, naked_subsets),
        (2, pointing_sets),
        (2, killer_combinations),
        (2, sandwich_fillings),
        (2, pair_reductions),
        (2, negative_pair_pointing),
        (3, fish),
        (3, y_wing),
        (3, skyscraper),
        (3, unorthodox_subsets),
        (4, contradiction_chain)
    ];

    for &(tier, rule) in rules {
        if tier > limit {
            break;
        }

        if let Some(found) = rule(session) {
            return found;
        }
    }

    StepReport::unchanged()
}

fn report(tier: usize, description: String) -> StepReport {
    StepReport {
        changed: true,
        tier,
        description
    }
}

fn digit_list(digits: &DigitSet) -> String {
    digits.iter()
        .map(|digit| digit.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

fn line_name(line: LineRef) -> String {
    match line {
        LineRef::Row(row) => format!("Row {}", row + 1),
        LineRef::Column(column) => format!("Column {}", column + 1)
    }
}

/// The groups in which every digit must appear exactly once: rows, columns,
/// complete regions, extra regions, active diagonals and disjoint groups.
/// The latter two consist of `size` pairwise-seeing cells, so they are
/// permutations of the digits just like a row.
fn structural_groups(board: &Board, constraints: &ConstraintSet)
        -> Vec<(String, Vec<CellRef>)> {
    let size = board.size();
    let mut groups: Vec<(String, Vec<CellRef>)> = Vec::new();

    for row in 0..size {
        groups.push((format!("Row {}", row + 1),
            (0..size).map(|column| (column, row)).collect()));
    }

    for column in 0..size {
        groups.push((format!("Column {}", column + 1),
            (0..size).map(|row| (column, row)).collect()));
    }

    for region in 0..size {
        let cells = board.region_cells(region);

        if !cells.is_empty() {
            groups.push((format!("Box {}", region + 1), cells));
        }
    }

    for constraint in constraints.iter() {
        if let Constraint::ExtraRegion { cells } = constraint {
            groups.push((String::from("Extra Region"), cells.clone()));
        }
    }

    if constraints.diagonal_negative() {
        groups.push((String::from("Negative Diagonal"),
            (0..size).map(|i| (i, i)).collect()));
    }

    if constraints.diagonal_positive() {
        groups.push((String::from("Positive Diagonal"),
            (0..size).map(|i| (i, size - i - 1)).collect()));
    }

    if constraints.disjoint_groups() {
        let block_width = board.block_width();
        let block_height = board.block_height();

        for position in 0..size {
            let column_in_block = position % block_width;
            let row_in_block = position / block_width;
            let mut cells = Vec::with_capacity(size);

            for block_row in 0..block_width {
                for block_column in 0..block_height {
                    cells.push((
                        block_column * block_width + column_in_block,
                        block_row * block_height + row_in_block));
                }
            }

            groups.push((format!("Disjoint Group {}", position + 1), cells));
        }
    }

    groups
}

/// Groups in which digits may not repeat but need not all appear: killer
/// cages.
fn unorthodox_groups(constraints: &ConstraintSet)
        -> Vec<(String, Vec<CellRef>)> {
    let mut groups: Vec<(String, Vec<CellRef>)> = Vec::new();

    for constraint in constraints.iter() {
        if let Constraint::Killer { cells, .. } = constraint {
            groups.push((String::from("Killer Cage"), cells.clone()));
        }
    }

    groups
}

fn eliminations(session: &mut Session) -> Option<StepReport> {
    let mut removed = 0;

    for (column, row) in session.board.empty_cells() {
        let candidates = session.board.candidates(column, row).unwrap();

        for digit in candidates.iter() {
            let feasible = feasibility::can_place(&session.board,
                &session.constraints, &session.sums, (column, row), digit,
                PlacementOptions::default());

            if !feasible {
                session.board.remove_candidate(column, row, digit).unwrap();
                removed += 1;
            }
        }
    }

    if removed == 0 {
        return None;
    }

    locked::reduce(&mut session.locked_sets, &session.board);
    Some(report(1, format!("Basic eliminations; {} candidates removed",
        removed)))
}

fn naked_single(session: &mut Session) -> Option<StepReport> {
    for (column, row) in session.board.empty_cells() {
        if let Some(digit) =
                session.board.candidates(column, row).unwrap().only() {
            session.set_value((column, row), digit).unwrap();
            return Some(report(1, format!("Naked single; {} → {}",
                cell_name((column, row)), digit)));
        }
    }

    None
}

#[derive(Clone)]
enum Location {
    None,
    One(CellRef),
    Multiple
}

impl Location {

    fn union(&self, cell: CellRef) -> Location {
        match self {
            Location::None => Location::One(cell),
            _ => Location::Multiple
        }
    }
}

fn hidden_single(session: &mut Session) -> Option<StepReport> {
    let size = session.board.size();
    let groups = structural_groups(&session.board, &session.constraints);

    for (name, cells) in groups {
        if cells.len() < size {
            // For smaller groups, there is no guarantee that all digits are
            // present.
            continue;
        }

        let mut locations = vec![Location::None; size + 1];
        let mut placed = vec![false; size + 1];

        for &(column, row) in &cells {
            match session.board.value(column, row).unwrap() {
                Some(digit) => placed[digit] = true,
                None => {
                    let candidates =
                        session.board.candidates(column, row).unwrap();

                    for digit in candidates.iter() {
                        locations[digit] =
                            locations[digit].union((column, row));
                    }
                }
            }
        }

        for (digit, location) in locations.into_iter().enumerate() {
            if digit == 0 || placed[digit] {
                continue;
            }

            if let Location::One(cell) = location {
                session.set_value(cell, digit).unwrap();
                return Some(report(1, format!("Hidden single; {} in {} at {}",
                    digit, name, cell_name(cell))));
            }
        }
    }

    None
}

#[derive(Clone)]
struct Tuple {
    cells: Vec<CellRef>,
    digits: DigitSet
}

impl Tuple {

    fn new(size: usize) -> Tuple {
        Tuple {
            cells: Vec::new(),
            digits: DigitSet::new(size).unwrap()
        }
    }

    fn with_cell(&self, board: &Board, cell: CellRef) -> Tuple {
        let mut next = self.clone();
        let candidates = board.candidates(cell.0, cell.1).unwrap();
        next.cells.push(cell);
        next.digits.union_assign(&candidates).unwrap();
        next
    }

    fn is_full(&self) -> bool {
        let len = self.digits.len();
        len >= 2 && len <= self.cells.len()
    }
}

fn find_tuples(board: &Board, rest: &[CellRef], max_size: usize,
        current: Tuple, accumulator: &mut Vec<Tuple>) {
    if current.digits.len() > max_size {
        return;
    }

    if current.is_full() {
        accumulator.push(current);
        return;
    }

    if let Some((&cell, tail)) = rest.split_first() {
        find_tuples(board, tail, max_size, current.clone(), accumulator);
        find_tuples(board, tail, max_size, current.with_cell(board, cell),
            accumulator);
    }
}

fn subsets_in_groups(session: &mut Session,
        groups: &[(String, Vec<CellRef>)], tier: usize, label: &str)
        -> Option<StepReport> {
    let size = session.board.size();

    for (name, cells) in groups {
        let empty: Vec<CellRef> = cells.iter()
            .copied()
            .filter(|&(column, row)|
                session.board.value(column, row).unwrap().is_none())
            .collect();

        if empty.len() < 3 {
            continue;
        }

        // A subset of more than half the group always has a complement of
        // at most half the size that yields the same eliminations.
        let max_size = (empty.len() - 1).min(size / 2);
        let mut tuples = Vec::new();
        find_tuples(&session.board, &empty, max_size, Tuple::new(size),
            &mut tuples);

        for tuple in tuples {
            let mut removed = 0;

            for &(column, row) in empty.iter()
                    .filter(|cell| !tuple.cells.contains(*cell)) {
                for digit in tuple.digits.iter() {
                    if session.board.remove_candidate(column, row, digit)
                            .unwrap() {
                        removed += 1;
                    }
                }
            }

            if removed > 0 {
                locked::reduce(&mut session.locked_sets, &session.board);
                return Some(report(tier,
                    format!("{}; {{{}}} in {}; {} candidates removed", label,
                        digit_list(&tuple.digits), name, removed)));
            }
        }
    }

    None
}

fn naked_subsets(session: &mut Session) -> Option<StepReport> {
    let groups = structural_groups(&session.board, &session.constraints);
    subsets_in_groups(session, &groups, 2, "Naked subset")
}

fn unorthodox_subsets(session: &mut Session) -> Option<StepReport> {
    let groups = unorthodox_groups(&session.constraints);
    subsets_in_groups(session, &groups, 3, "Unorthodox subset")
}

fn pointing_sets(session: &mut Session) -> Option<StepReport> {
    let sets = session.locked_sets.clone();

    for set in &sets {
        if set.cells.len() < 2 {
            continue;
        }

        let changed = locked::eliminate(&mut session.board,
            &session.constraints, set);

        if !changed.is_empty() {
            locked::reduce(&mut session.locked_sets, &session.board);
            return Some(report(2,
                format!("Locked candidates; {} in {} removed from {} cells",
                    set.digit, set.location, changed.len())));
        }
    }

    None
}

fn killer_combinations(session: &mut Session) -> Option<StepReport> {
    let size = session.board.size();
    let cages: Vec<(Vec<CellRef>, usize)> = session.constraints.iter()
        .filter_map(|constraint| match constraint {
            Constraint::Killer { cells, sum } => Some((cells.clone(), *sum)),
            _ => None
        })
        .collect();

    for (cells, sum) in cages {
        let mut placed = DigitSet::new(size).unwrap();
        let mut placed_sum = 0;
        let mut empty = Vec::new();

        for &(column, row) in &cells {
            match session.board.value(column, row).unwrap() {
                Some(digit) => {
                    placed.insert(digit).unwrap();
                    placed_sum += digit;
                },
                None => empty.push((column, row))
            }
        }

        if empty.is_empty() || placed_sum >= sum {
            continue;
        }

        let target = sum - placed_sum;
        let mut cage_candidates = DigitSet::new(size).unwrap();

        for &(column, row) in &empty {
            let candidates = session.board.candidates(column, row).unwrap();
            cage_candidates.union_assign(&candidates).unwrap();
        }

        let mut allowed = DigitSet::new(size).unwrap();

        for combination in session.sums.combinations(target, empty.len()) {
            let viable = combination.iter()
                .all(|digit| !placed.contains(digit)
                    && cage_candidates.contains(digit));

            if viable {
                allowed.union_assign(combination).unwrap();
            }
        }

        let mut removed = 0;

        for &(column, row) in &empty {
            let candidates = session.board.candidates(column, row).unwrap();

            for digit in candidates.iter() {
                if !allowed.contains(digit) {
                    session.board.remove_candidate(column, row, digit)
                        .unwrap();
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            locked::reduce(&mut session.locked_sets, &session.board);
            return Some(report(2,
                format!("Killer cage; cage of {} keeps only digits of \
                    achievable combinations; {} candidates removed", sum,
                    removed)));
        }
    }

    None
}

fn sandwich_fillings(session: &mut Session) -> Option<StepReport> {
    let size = session.board.size();
    let clues: Vec<(LineRef, usize)> = session.constraints.iter()
        .filter_map(|constraint| match constraint {
            Constraint::Sandwich { line, sum } => Some((*line, *sum)),
            _ => None
        })
        .collect();

    for (line, sum) in clues {
        let cells = feasibility::line_cells(line, size);
        let crusts: Vec<usize> = cells.iter()
            .enumerate()
            .filter(|&(_, &(column, row))|
                matches!(session.board.value(column, row).unwrap(),
                    Some(digit) if digit == 1 || digit == size))
            .map(|(index, _)| index)
            .collect();

        if crusts.len() != 2 {
            continue;
        }

        let distance = crusts[1] - crusts[0] - 1;
        let inner = &cells[crusts[0] + 1..crusts[1]];
        let mut placed = DigitSet::new(size).unwrap();

        for &(column, row) in inner {
            if let Some(digit) = session.board.value(column, row).unwrap() {
                placed.insert(digit).unwrap();
            }
        }

        let mut allowed = DigitSet::new(size).unwrap();

        for filling in session.sums.sandwich_fillings(sum) {
            if filling.len() == distance && placed.is_subset(&filling) {
                allowed.union_assign(&filling).unwrap();
            }
        }

        let mut removed = 0;

        for &(column, row) in inner {
            if session.board.value(column, row).unwrap().is_some() {
                continue;
            }

            let candidates = session.board.candidates(column, row).unwrap();

            for digit in candidates.iter() {
                if !allowed.contains(digit) {
                    session.board.remove_candidate(column, row, digit)
                        .unwrap();
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            locked::reduce(&mut session.locked_sets, &session.board);
            return Some(report(2,
                format!("Sandwich sum; filling of {} limited to achievable \
                    sets; {} candidates removed", line_name(line), removed)));
        }
    }

    None
}

enum PairKind {
    Difference(usize),
    Ratio(usize),
    Xv(usize)
}

impl PairKind {

    fn satisfied_by(&self, a: usize, b: usize) -> bool {
        match self {
            PairKind::Difference(value) => a + *value == b || b + *value == a,
            PairKind::Ratio(value) => a == b * *value || b == a * *value,
            PairKind::Xv(sum) => a + b == *sum
        }
    }
}

fn pair_reductions(session: &mut Session) -> Option<StepReport> {
    let size = session.board.size();
    let clues: Vec<(&'static str, [CellRef; 2], PairKind)> =
        session.constraints.iter()
            .filter_map(|constraint| match constraint {
                Constraint::Difference { cells, value } =>
                    Some(("Difference", *cells,
                        PairKind::Difference(*value))),
                Constraint::Ratio { cells, value } =>
                    Some(("Ratio", *cells, PairKind::Ratio(*value))),
                Constraint::Xv { cells, sum } =>
                    Some(("XV", *cells, PairKind::Xv(*sum))),
                _ => None
            })
            .collect();

    for (kind, cells, relation) in clues {
        for &(target, other) in &[(cells[0], cells[1]),
                (cells[1], cells[0])] {
            if session.board.value(target.0, target.1).unwrap().is_some() {
                continue;
            }

            let partner_digits =
                match session.board.value(other.0, other.1).unwrap() {
                    Some(digit) => DigitSet::singleton(size, digit).unwrap(),
                    None => session.board.candidates(other.0, other.1)
                        .unwrap()
                };

            let candidates =
                session.board.candidates(target.0, target.1).unwrap();
            let mut removed = 0;

            for digit in candidates.iter() {
                let supported = partner_digits.iter()
                    .any(|partner| relation.satisfied_by(digit, partner));

                if !supported {
                    session.board.remove_candidate(target.0, target.1, digit)
                        .unwrap();
                    removed += 1;
                }
            }

            if removed > 0 {
                locked::reduce(&mut session.locked_sets, &session.board);
                return Some(report(2,
                    format!("{} pair; {} candidates removed from {}", kind,
                        removed, cell_name(target))));
            }
        }
    }

    None
}

fn negative_pair_pointing(session: &mut Session) -> Option<StepReport> {
    let nonconsecutive = session.constraints.nonconsecutive();
    let negative_ratio = session.constraints.negative_ratio();
    let negative_xv = session.constraints.negative_xv();

    if !nonconsecutive && !negative_ratio && !negative_xv {
        return None;
    }

    let size = session.board.size();
    let disallowed = session.constraints.disallowed_ratios();

    for (column, row) in session.board.empty_cells() {
        let target = (column, row);
        let candidates = session.board.candidates(column, row).unwrap();

        for digit in candidates.iter() {
            for neighbour in visibility::orthogonal_neighbours(target, size) {
                if session.board.value(neighbour.0, neighbour.1).unwrap()
                        .is_some() {
                    // Filled neighbours are handled by basic eliminations.
                    continue;
                }

                let options = session.board
                    .candidates(neighbour.0, neighbour.1).unwrap();

                if options.is_empty() {
                    continue;
                }

                let pair_clued = session.constraints
                        .difference_on(target, neighbour)
                    || session.constraints.ratio_on(target, neighbour);

                let consecutive_blocked = nonconsecutive && !pair_clued
                    && options.iter()
                        .all(|s| s + 1 == digit || digit + 1 == s);
                let ratio_blocked = negative_ratio && !pair_clued
                    && options.iter()
                        .all(|s| disallowed.iter()
                            .any(|&r| s == digit * r || digit == s * r));
                let xv_blocked = negative_xv
                    && !session.constraints.xv_on(target, neighbour)
                    && options.iter()
                        .all(|s| s + digit == 5 || s + digit == 10);

                if consecutive_blocked || ratio_blocked || xv_blocked {
                    session.board.remove_candidate(column, row, digit)
                        .unwrap();
                    locked::reduce(&mut session.locked_sets, &session.board);

                    let rule = if consecutive_blocked {
                        "Nonconsecutive pointing"
                    }
                    else if ratio_blocked {
                        "Negative ratio pointing"
                    }
                    else {
                        "Negative XV pointing"
                    };

                    return Some(report(2, format!("{}; {} removed from {}",
                        rule, digit, cell_name(target))));
                }
            }
        }
    }

    None
}

/// The candidate positions of `digit` along all base lines of one axis.
/// Lines where the digit is placed or has fewer than two or more than
/// `max_positions` homes are excluded.
fn fish_base_lines(board: &Board, digit: usize, columns_as_base: bool,
        max_positions: usize) -> Vec<(usize, Vec<usize>)> {
    let size = board.size();
    let mut result = Vec::new();

    for base in 0..size {
        let mut positions = Vec::new();
        let mut placed = false;

        for cover in 0..size {
            let (column, row) = if columns_as_base {
                (base, cover)
            }
            else {
                (cover, base)
            };

            match board.value(column, row).unwrap() {
                Some(value) if value == digit => placed = true,
                Some(_) => {},
                None => {
                    if board.candidates(column, row).unwrap()
                            .contains(digit) {
                        positions.push(cover);
                    }
                }
            }
        }

        if !placed && positions.len() >= 2
                && positions.len() <= max_positions {
            result.push((base, positions));
        }
    }

    result
}

fn collect_combinations(count: usize, n: usize, start: usize,
        current: &mut Vec<usize>, result: &mut Vec<Vec<usize>>) {
    if current.len() == n {
        result.push(current.clone());
        return;
    }

    for i in start..count {
        current.push(i);
        collect_combinations(count, n, i + 1, current, result);
        current.pop();
    }
}

fn fish_of_size(session: &mut Session, digit: usize, columns_as_base: bool,
        bases: &[(usize, Vec<usize>)], n: usize) -> Option<StepReport> {
    let size = session.board.size();
    let eligible: Vec<(usize, Vec<usize>)> = bases.iter()
        .filter(|(_, positions)| positions.len() <= n)
        .cloned()
        .collect();

    let mut selections = Vec::new();
    collect_combinations(eligible.len(), n, 0, &mut Vec::new(),
        &mut selections);

    for selection in selections {
        let mut base_lines = Vec::new();
        let mut covers: Vec<usize> = Vec::new();

        for &index in &selection {
            let (base, positions) = &eligible[index];
            base_lines.push(*base);

            for &position in positions {
                if !covers.contains(&position) {
                    covers.push(position);
                }
            }
        }

        if covers.len() > n {
            continue;
        }

        let mut removed = 0;

        for &cover in &covers {
            for other in (0..size).filter(|o| !base_lines.contains(o)) {
                let (column, row) = if columns_as_base {
                    (other, cover)
                }
                else {
                    (cover, other)
                };

                if session.board.value(column, row).unwrap().is_none()
                        && session.board.remove_candidate(column, row, digit)
                            .unwrap() {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            locked::reduce(&mut session.locked_sets, &session.board);

            let label = match n {
                2 => "X-Wing",
                3 => "Swordfish",
                4 => "Jellyfish",
                _ => "Fish"
            };
            let axis = if columns_as_base { "columns" } else { "rows" };
            let names = base_lines.iter()
                .map(|base| (base + 1).to_string())
                .collect::<Vec<String>>()
                .join("/");

            return Some(report(3,
                format!("{}; {} in {} {}; {} candidates removed", label,
                    digit, axis, names, removed)));
        }
    }

    None
}

fn fish(session: &mut Session) -> Option<StepReport> {
    let size = session.board.size();
    // Beyond half the grid size, the complementary fish on the other axis
    // covers the same eliminations.
    let max_size = size / 2;

    for digit in 1..=size {
        for &columns_as_base in &[false, true] {
            let bases = fish_base_lines(&session.board, digit,
                columns_as_base, max_size);

            for n in 2..=max_size {
                let result = fish_of_size(session, digit, columns_as_base,
                    &bases, n);

                if result.is_some() {
                    return result;
                }
            }
        }
    }

    None
}

fn y_wing(session: &mut Session) -> Option<StepReport> {
    let empty = session.board.empty_cells();

    for &pivot in &empty {
        let pivot_digits = session.board.candidates(pivot.0, pivot.1)
            .unwrap();

        if pivot_digits.len() != 2 {
            continue;
        }

        let mut iter = pivot_digits.iter();
        let a = iter.next().unwrap();
        let b = iter.next().unwrap();

        let pincers: Vec<(CellRef, DigitSet)> =
            visibility::seen_by(&session.board, &session.constraints, pivot)
                .into_iter()
                .filter(|&(column, row)|
                    session.board.value(column, row).unwrap().is_none())
                .map(|(column, row)|
                    ((column, row),
                        session.board.candidates(column, row).unwrap()))
                .filter(|(_, digits)| digits.len() == 2)
                .collect();

        for (i, &(pincer_1, digits_1)) in pincers.iter().enumerate() {
            for &(pincer_2, digits_2) in &pincers[i + 1..] {
                for &(first, second) in &[(a, b), (b, a)] {
                    if !digits_1.contains(first) {
                        continue;
                    }

                    let common = match digits_1.iter()
                            .find(|&digit| digit != first) {
                        Some(digit) => digit,
                        None => continue
                    };

                    if common == second || !digits_2.contains(second)
                            || !digits_2.contains(common) {
                        continue;
                    }

                    let victims = visibility::seen_by_all(&session.board,
                        &session.constraints, &[pincer_1, pincer_2]);
                    let mut removed = 0;

                    for (column, row) in victims {
                        if session.board.value(column, row).unwrap().is_none()
                                && session.board
                                    .remove_candidate(column, row, common)
                                    .unwrap() {
                            removed += 1;
                        }
                    }

                    if removed > 0 {
                        locked::reduce(&mut session.locked_sets,
                            &session.board);
                        return Some(report(3,
                            format!("Y-Wing; pivot {} removes {} from {} \
                                cells", cell_name(pivot), common, removed)));
                    }
                }
            }
        }
    }

    None
}

fn skyscraper(session: &mut Session) -> Option<StepReport> {
    let size = session.board.size();

    for digit in 1..=size {
        for &columns_as_base in &[false, true] {
            let lines: Vec<(usize, Vec<usize>)> =
                fish_base_lines(&session.board, digit, columns_as_base, 2)
                    .into_iter()
                    .filter(|(_, positions)| positions.len() == 2)
                    .collect();

            for (i, (base_1, positions_1)) in lines.iter().enumerate() {
                for (base_2, positions_2) in &lines[i + 1..] {
                    let common: Vec<usize> = positions_1.iter()
                        .copied()
                        .filter(|position| positions_2.contains(position))
                        .collect();

                    if common.len() != 1 {
                        continue;
                    }

                    let roof_1 = *positions_1.iter()
                        .find(|&&position| position != common[0]).unwrap();
                    let roof_2 = *positions_2.iter()
                        .find(|&&position| position != common[0]).unwrap();

                    let roof_cells = if columns_as_base {
                        [(*base_1, roof_1), (*base_2, roof_2)]
                    }
                    else {
                        [(roof_1, *base_1), (roof_2, *base_2)]
                    };

                    let victims = visibility::seen_by_all(&session.board,
                        &session.constraints, &roof_cells);
                    let mut removed = 0;

                    for (column, row) in victims {
                        if session.board.value(column, row).unwrap().is_none()
                                && session.board
                                    .remove_candidate(column, row, digit)
                                    .unwrap() {
                            removed += 1;
                        }
                    }

                    if removed > 0 {
                        locked::reduce(&mut session.locked_sets,
                            &session.board);
                        return Some(report(3,
                            format!("Skyscraper; {} removed from {} cells",
                                digit, removed)));
                    }
                }
            }
        }
    }

    None
}

/// Tentatively assigns the digit and propagates cheap deductions for up to
/// two rounds. If this provably leads to a dead end, the naked singles that
/// were forced along the way are returned in order, so the step report can
/// retrace the chain.
fn leads_to_contradiction(session: &Session, cell: CellRef, digit: usize)
        -> Option<Vec<(CellRef, usize)>> {
    let mut probe = session.clone();
    let mut forced = Vec::new();

    if probe.set_value(cell, digit).is_err() {
        return Some(forced);
    }

    for _ in 0..2 {
        for (column, row) in probe.board.empty_cells() {
            let candidates = probe.board.candidates(column, row).unwrap();

            for candidate in candidates.iter() {
                let feasible = feasibility::can_place(&probe.board,
                    &probe.constraints, &probe.sums, (column, row),
                    candidate, PlacementOptions::default());

                if !feasible {
                    probe.board.remove_candidate(column, row, candidate)
                        .unwrap();
                }
            }
        }

        probe.refresh_locked_sets();

        if probe.obvious_impossibility().is_some() {
            return Some(forced);
        }

        let mut placed = false;

        for (column, row) in probe.board.empty_cells() {
            if probe.board.value(column, row).unwrap().is_some() {
                // Filled by mirror propagation of an earlier single.
                continue;
            }

            if let Some(single) =
                    probe.board.candidates(column, row).unwrap().only() {
                let feasible = feasibility::can_place(&probe.board,
                    &probe.constraints, &probe.sums, (column, row), single,
                    PlacementOptions::default());

                if !feasible {
                    return Some(forced);
                }

                probe.set_value((column, row), single).unwrap();
                forced.push(((column, row), single));
                placed = true;
            }
        }

        if !placed {
            return None;
        }
    }

    probe.refresh_locked_sets();

    if probe.obvious_impossibility().is_some() {
        Some(forced)
    }
    else {
        None
    }
}

fn contradiction_chain(session: &mut Session) -> Option<StepReport> {
    for (column, row) in session.board.empty_cells() {
        let candidates = session.board.candidates(column, row).unwrap();

        for digit in candidates.iter() {
            let chain = match leads_to_contradiction(session, (column, row),
                    digit) {
                Some(chain) => chain,
                None => continue
            };

            session.board.remove_candidate(column, row, digit).unwrap();
            locked::reduce(&mut session.locked_sets, &session.board);

            let assumption = format!("assuming {} = {}",
                cell_name((column, row)), digit);
            let description = if chain.is_empty() {
                format!("Contradiction chain; {} fails, candidate removed",
                    assumption)
            }
            else {
                let steps = chain.iter()
                    .map(|&(cell, digit)|
                        format!("{} = {}", cell_name(cell), digit))
                    .collect::<Vec<String>>()
                    .join(", ");
                format!("Contradiction chain; {} forces {}, then fails, \
                    candidate removed", assumption, steps)
            };

            return Some(report(4, description));
        }
    }

    None
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::Board;
    use crate::digits;

    fn session_9x9() -> Session {
        Session::new(Board::new(3, 3).unwrap(), ConstraintSet::new())
            .unwrap()
    }

    fn session_with(constraints: ConstraintSet) -> Session {
        Session::new(Board::new(3, 3).unwrap(), constraints).unwrap()
    }

    fn step(session: &mut Session, difficulty_limit: usize) -> StepReport {
        apply(session, &StepOptions {
            difficulty_limit,
            brute_force: false
        })
    }

    #[test]
    fn eliminations_come_first() {
        let mut session = session_9x9();
        session.set_value((0, 0), 5).unwrap();

        let result = step(&mut session, 4);

        assert!(result.changed);
        assert_eq!(1, result.tier);
        assert!(result.description.contains("eliminations"));
        assert!(!session.board().candidates(5, 0).unwrap().contains(5));
    }

    #[test]
    fn naked_single_is_found_and_described() {
        let mut session = Session::new(
            Board::parse("3x3;\
                1,2,3,4,5,6,7,8,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,").unwrap(),
            ConstraintSet::new()).unwrap();

        // First the eliminations prune the last cell of the row to {9}, then
        // the naked single fires.
        let first = step(&mut session, 4);
        assert!(first.description.contains("eliminations"));

        let second = step(&mut session, 4);
        assert_eq!(1, second.tier);
        assert!(second.description.contains("Naked single"));
        assert!(second.description.contains("r1c9"));
        assert_eq!(Some(9), session.board().value(8, 0).unwrap());
    }

    #[test]
    fn hidden_single_in_row() {
        // The 5s confine the digit 5 within the first row to r1c3.
        let mut session = Session::new(
            Board::parse("3x3;\
                ,,,,,,,,,\
                ,,,5,,,,,,\
                ,,,,,,5,,,\
                5,,,,,,,,,\
                ,5,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,,\
                ,,,,,,,,").unwrap(),
            ConstraintSet::new()).unwrap();

        let first = step(&mut session, 4);
        assert!(first.description.contains("eliminations"));

        let second = step(&mut session, 4);
        assert_eq!(1, second.tier);
        assert!(second.description.contains("Hidden single"));
        assert!(second.description.contains("Row 1"));
        assert_eq!(Some(5), session.board().value(2, 0).unwrap());
    }

    #[test]
    fn naked_pair_in_row() {
        let mut session = session_9x9();
        session.set_candidates((0, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((1, 0), digits!(9; 1, 2)).unwrap();

        let result = step(&mut session, 2);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("Naked subset"));
        assert!(result.description.contains("Row 1"));
        assert!(!session.board().candidates(5, 0).unwrap().contains(1));
        assert!(!session.board().candidates(5, 0).unwrap().contains(2));
        assert!(session.board().candidates(0, 0).unwrap().contains(1));
    }

    #[test]
    fn pointing_pair_clears_rest_of_row() {
        let mut session = session_9x9();

        // Confine the 5 in the top-left box to r1c1 and r1c2.
        for &cell in &[(2, 0), (0, 1), (1, 1), (2, 1), (0, 2), (1, 2),
                (2, 2)] {
            let mut candidates = DigitSet::full(9).unwrap();
            candidates.remove(5).unwrap();
            session.set_candidates(cell, candidates).unwrap();
        }

        let result = step(&mut session, 2);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("Locked candidates"));
        assert!(result.description.contains("Box 1"));
        assert!(!session.board().candidates(4, 0).unwrap().contains(5));
        assert!(session.board().candidates(0, 0).unwrap().contains(5));
    }

    #[test]
    fn killer_cage_digits_follow_combinations() {
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Killer {
            cells: vec![(0, 0), (1, 0), (2, 0)],
            sum: 9
        }).unwrap();
        let mut session = session_with(constraints);

        // Without the 1, only the combination 2+3+4 reaches the sum.
        for column in 0..3 {
            session.set_candidates((column, 0), digits!(9; 2, 3, 4, 5, 6))
                .unwrap();
        }

        // The sum bounds alone already exclude the 6, but not the 5.
        while step(&mut session, 1).changed {}

        let result = step(&mut session, 2);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("Killer cage"));
        assert_eq!(digits!(9; 2, 3, 4),
            session.board().candidates(0, 0).unwrap());
    }

    #[test]
    fn sandwich_filling_digits_follow_achievable_sets() {
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Sandwich {
            line: LineRef::Row(1),
            sum: 10
        }).unwrap();
        let mut session = session_with(constraints);
        session.set_value((2, 1), 1).unwrap();
        session.set_value((6, 1), 9).unwrap();

        // Prune to the sum bounds first.
        while step(&mut session, 1).changed {}

        let result = step(&mut session, 2);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("Sandwich sum"));
        assert!(result.description.contains("Row 2"));
        // The only filling of length three summing to 10 is 2+3+5.
        assert_eq!(digits!(9; 2, 3, 5),
            session.board().candidates(3, 1).unwrap());
    }

    #[test]
    fn xv_pair_restricts_both_cells() {
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Xv {
            cells: [(0, 0), (1, 0)],
            sum: 5
        }).unwrap();
        let mut session = session_with(constraints);

        let result = step(&mut session, 2);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("XV pair"));
        assert_eq!(digits!(9; 1, 2, 3, 4),
            session.board().candidates(0, 0).unwrap());
    }

    #[test]
    fn nonconsecutive_pointing_on_restricted_neighbour() {
        let mut constraints = ConstraintSet::new();
        constraints.set_nonconsecutive(true);
        let mut session = session_with(constraints);
        session.set_candidates((0, 0), digits!(9; 4, 6)).unwrap();

        let result = step(&mut session, 2);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("Nonconsecutive pointing"));
        assert!(!session.board().candidates(1, 0).unwrap().contains(5));
    }

    #[test]
    fn x_wing_on_two_rows() {
        let mut session = session_9x9();

        // The digit 5 is confined to columns 3 and 8 in rows 2 and 5.
        for &row in &[1, 4] {
            for column in (0..9).filter(|&c| c != 2 && c != 7) {
                let mut candidates = DigitSet::full(9).unwrap();
                candidates.remove(5).unwrap();
                session.set_candidates((column, row), candidates).unwrap();
            }
        }

        let result = step(&mut session, 3);

        assert_eq!(3, result.tier);
        assert!(result.description.contains("X-Wing"));
        assert!(!session.board().candidates(2, 0).unwrap().contains(5));
        assert!(!session.board().candidates(7, 6).unwrap().contains(5));
        assert!(session.board().candidates(2, 1).unwrap().contains(5));
    }

    #[test]
    fn y_wing_removes_common_candidate() {
        let mut session = session_9x9();
        session.set_candidates((0, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((5, 0), digits!(9; 1, 3)).unwrap();
        session.set_candidates((0, 5), digits!(9; 2, 3)).unwrap();

        let result = step(&mut session, 3);

        assert_eq!(3, result.tier);
        assert!(result.description.contains("Y-Wing"));
        assert!(result.description.contains("r1c1"));
        assert!(!session.board().candidates(5, 5).unwrap().contains(3));
    }

    #[test]
    fn skyscraper_removes_from_shared_views() {
        let mut session = session_9x9();

        // The digit 5 has exactly two homes in rows 3 and 5, sharing
        // column 2.
        for column in (0..9).filter(|&c| c != 1 && c != 4) {
            let mut candidates = DigitSet::full(9).unwrap();
            candidates.remove(5).unwrap();
            session.set_candidates((column, 2), candidates).unwrap();
        }

        for column in (0..9).filter(|&c| c != 1 && c != 5) {
            let mut candidates = DigitSet::full(9).unwrap();
            candidates.remove(5).unwrap();
            session.set_candidates((column, 4), candidates).unwrap();
        }

        let result = step(&mut session, 3);

        assert_eq!(3, result.tier);
        assert!(result.description.contains("Skyscraper"));
        assert!(!session.board().candidates(4, 3).unwrap().contains(5));
        assert!(!session.board().candidates(4, 5).unwrap().contains(5));
    }

    #[test]
    fn hidden_single_on_diagonal() {
        let mut constraints = ConstraintSet::new();
        constraints.set_diagonals(true);
        let mut session = session_with(constraints);

        // The 5 keeps a single home on the negative diagonal.
        for i in (0..9).filter(|&i| i != 4) {
            let mut candidates = DigitSet::full(9).unwrap();
            candidates.remove(5).unwrap();
            session.set_candidates((i, i), candidates).unwrap();
        }

        let result = step(&mut session, 4);

        assert_eq!(1, result.tier);
        assert!(result.description.contains("Hidden single"));
        assert!(result.description.contains("Negative Diagonal"));
        assert_eq!(Some(5), session.board().value(4, 4).unwrap());
    }

    #[test]
    fn naked_pair_on_diagonal() {
        let mut constraints = ConstraintSet::new();
        constraints.set_diagonals(true);
        let mut session = session_with(constraints);
        session.set_candidates((0, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((4, 4), digits!(9; 1, 2)).unwrap();

        let result = step(&mut session, 3);

        assert_eq!(2, result.tier);
        assert!(result.description.contains("Naked subset"));
        assert!(result.description.contains("Negative Diagonal"));
        assert!(!session.board().candidates(8, 8).unwrap().contains(1));
        assert!(!session.board().candidates(8, 8).unwrap().contains(2));
    }

    #[test]
    fn unorthodox_pair_in_killer_cage() {
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::Killer {
            cells: vec![(2, 2), (3, 3), (4, 4), (5, 5)],
            sum: 14
        }).unwrap();
        let mut session = session_with(constraints);
        session.set_candidates((2, 2), digits!(9; 1, 2)).unwrap();
        session.set_candidates((3, 3), digits!(9; 1, 2)).unwrap();

        // The cage cells share no row, column or box, so only the cage
        // itself carries the pair.
        while step(&mut session, 2).changed {}

        let result = step(&mut session, 3);

        assert_eq!(3, result.tier);
        assert!(result.description.contains("Unorthodox subset"));
        assert!(result.description.contains("Killer Cage"));
        assert!(!session.board().candidates(4, 4).unwrap().contains(1));
        assert!(!session.board().candidates(4, 4).unwrap().contains(2));
    }

    #[test]
    fn jellyfish_on_four_rows() {
        let mut session = session_9x9();

        // The digit 5 is confined to columns 2, 4, 6 and 8 in rows 1, 3, 5
        // and 7.
        for &row in &[0, 2, 4, 6] {
            for column in (0..9).filter(|c| ![1, 3, 5, 7].contains(c)) {
                let mut candidates = DigitSet::full(9).unwrap();
                candidates.remove(5).unwrap();
                session.set_candidates((column, row), candidates).unwrap();
            }
        }

        let result = step(&mut session, 3);

        assert_eq!(3, result.tier);
        assert!(result.description.contains("Jellyfish"));
        assert!(!session.board().candidates(1, 1).unwrap().contains(5));
        assert!(!session.board().candidates(7, 8).unwrap().contains(5));
        assert!(session.board().candidates(0, 1).unwrap().contains(5));
        assert!(session.board().candidates(1, 0).unwrap().contains(5));
    }

    #[test]
    fn contradiction_chain_removes_refuted_candidate() {
        let mut session = session_9x9();
        session.set_candidates((0, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((1, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((2, 0), digits!(9; 1, 2)).unwrap();

        // Three cells of one row restricted to the same two digits cannot
        // all be filled; every assumption in them collapses.
        let result = contradiction_chain(&mut session).unwrap();

        assert_eq!(4, result.tier);
        assert!(result.description.contains("Contradiction chain"));
        assert_eq!(1, session.board().candidates(0, 0).unwrap().len());
    }

    #[test]
    fn contradiction_chain_reports_forced_cells() {
        let mut session = session_9x9();
        session.set_candidates((0, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((1, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((2, 0), digits!(9; 1, 2)).unwrap();

        let result = contradiction_chain(&mut session).unwrap();

        // A 1 in r1c1 forces the 2 into r1c2 before r1c3 runs dry.
        assert!(result.description.contains("assuming r1c1 = 1"));
        assert!(result.description.contains("forces r1c2 = 2"));
    }

    #[test]
    fn ladder_respects_difficulty_limit() {
        let mut session = session_9x9();
        session.set_candidates((0, 0), digits!(9; 1, 2)).unwrap();
        session.set_candidates((1, 0), digits!(9; 1, 2)).unwrap();

        let result = step(&mut session, 1);

        assert!(!result.changed);
        assert_eq!(0, result.tier);
    }
}
