// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(broken_intra_doc_links)]
#![warn(missing_docs)]
#![warn(missing_crate_level_docs)]
#![warn(invalid_codeblock_attributes)]

//! This crate implements a constraint solver for variant Sudoku. It supports
//! the following key features:
//!
//! * Parsing and printing boards
//! * A rich set of constraint types: killer cages, thermometers, palindromes,
//! clones, arrows, sandwich and little-killer sums, XV and Kropki-style
//! pairs, anti-knight and anti-king moves, and more
//! * A tiered ladder of human-style solving techniques, each producing a
//! readable description of the deduction it made
//! * A backtracking search with snapshot-based undo, wall-clock budgets and
//! solution counting
//!
//! Note in this introduction we will mostly be using 4x4 boards due to their
//! simpler nature. These are divided in 4 2x2 blocks, each with the digits 1
//! to 4, just like each row and column.
//!
//! # Parsing and printing boards
//!
//! See [Board::parse] for the exact format of a board code.
//!
//! Codes can be used to exchange boards, while pretty prints can be used to
//! display a board in a clearer manner. An example of how to parse and
//! display a board is provided below.
//!
//! ```
//! use sudoku_logic::Board;
//!
//! let board = Board::parse("2x2;2, ,3, , ,1, , ,1, , ,4, ,2, ,3").unwrap();
//! println!("{}", board);
//! ```
//!
//! # Solving
//!
//! A [Session](solver::Session) bundles a board with a
//! [ConstraintSet](constraint::ConstraintSet) and offers logical stepping,
//! full solving and solution counting.
//!
//! ```
//! use sudoku_logic::Board;
//! use sudoku_logic::constraint::ConstraintSet;
//! use sudoku_logic::solver::{Outcome, Session, SolveOptions};
//!
//! // A riddle with a unique solution:
//! // ╔═══╤═══╦═══╤═══╗
//! // ║   │   ║   │ 4 ║
//! // ╟───┼───╫───┼───╢
//! // ║   │ 4 ║ 3 │   ║
//! // ╠═══╪═══╬═══╪═══╣
//! // ║   │ 3 ║   │   ║
//! // ╟───┼───╫───┼───╢
//! // ║   │   ║ 1 │   ║
//! // ╚═══╧═══╩═══╧═══╝
//! let board = Board::parse("2x2; , , ,4, ,4,3, , ,3, , , , ,1, ").unwrap();
//! let mut session = Session::new(board, ConstraintSet::new()).unwrap();
//!
//! assert_eq!(Outcome::Solved, session.solve(&SolveOptions::default()));
//! assert_eq!(Some(3), session.board().value(0, 0).unwrap());
//! ```
//!
//! # Note regarding performance
//!
//! Solving larger boards with heavy variant rule sets can be expensive. It is
//! strongly recommended to use at least `opt-level = 2`, even in tests.

pub mod constraint;
pub mod error;
pub mod feasibility;
pub mod locked;
pub mod solver;
pub mod util;
pub mod visibility;

use error::{SudokuError, SudokuParseError, SudokuParseResult, SudokuResult};
use util::{DigitSet, MAX_DIGIT};

use serde::{Deserialize, Serialize};

use std::fmt::{self, Display, Error, Formatter};

/// The coordinates of a cell as a `(column, row)` pair, both zero-based.
pub type CellRef = (usize, usize);

/// A single cell of a [Board]. It holds the assigned digit, if any, the set
/// of remaining candidate digits, whether the digit was part of the original
/// puzzle and the identifier of the region the cell belongs to.
///
/// The invariant `value = Some(d)` implies `candidates = {d}` is maintained
/// by all [Board] operations.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Cell {
    value: Option<usize>,
    candidates: DigitSet,
    given: bool,
    given_candidates: Option<DigitSet>,
    region: Option<usize>
}

impl Cell {

    fn empty(size: usize, region: Option<usize>) -> Cell {
        // The size has been validated by the board constructor.
        Cell {
            value: None,
            candidates: DigitSet::full(size).unwrap(),
            given: false,
            given_candidates: None,
            region
        }
    }

    /// The digit assigned to this cell, or `None` if it is empty.
    pub fn value(&self) -> Option<usize> {
        self.value
    }

    /// The set of candidate digits still considered possible for this cell.
    /// For a filled cell this is the singleton set of its value.
    pub fn candidates(&self) -> &DigitSet {
        &self.candidates
    }

    /// Indicates whether the digit in this cell was part of the original
    /// puzzle.
    pub fn given(&self) -> bool {
        self.given
    }

    /// The candidate marks declared with the puzzle, if any. When present,
    /// resetting candidates restores these instead of the full digit range.
    pub fn given_candidates(&self) -> Option<&DigitSet> {
        self.given_candidates.as_ref()
    }

    /// The identifier of the region this cell belongs to, or `None` if it is
    /// not part of any region.
    pub fn region(&self) -> Option<usize> {
        self.region
    }
}

/// A board is composed of cells that are organized into blocks of a given
/// width and height in a way that makes the entire grid a square.
/// Consequently, the number of blocks in a row is equal to the block height
/// and vice versa.
///
/// In ordinary Sudoku, the block width and height are both 3. Here, more
/// exotic variants are permitted, for example 4x2 blocks. By default every
/// cell's region is the block it lies in, but regions can be reassigned for
/// irregular puzzles with [Board::set_region].
///
/// `Board` implements `Display`, but only grids with a size (that is, width
/// or height) of less than or equal to 9 can be displayed with digits 1 to 9.
/// Boards of all other sizes will raise an error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    block_width: usize,
    block_height: usize,
    size: usize,
    cells: Vec<Cell>
}

fn to_char(cell: Option<usize>) -> char {
    if let Some(n) = cell {
        (b'0' + n as u8) as char
    }
    else {
        ' '
    }
}

fn line(board: &Board, start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> char, pad: char, end: char, newline: bool) -> String {
    let size = board.size();
    let mut result = String::new();

    for x in 0..size {
        if x == 0 {
            result.push(start);
        }
        else if x % board.block_width == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push(segment(x));
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row(board: &Board) -> String {
    line(board, '╔', '╦', '╤', |_| '═', '═', '╗', true)
}

fn thin_separator_line(board: &Board) -> String {
    line(board, '╟', '╫', '┼', |_| '─', '─', '╢', true)
}

fn thick_separator_line(board: &Board) -> String {
    line(board, '╠', '╬', '╪', |_| '═', '═', '╣', true)
}

fn bottom_row(board: &Board) -> String {
    line(board, '╚', '╩', '╧', |_| '═', '═', '╝', false)
}

fn content_row(board: &Board, y: usize) -> String {
    line(board, '║', '║', '│', |x| to_char(board.value(x, y).unwrap()), ' ',
        '║', true)
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let size = self.size();

        if size > 9 {
            return Err(Error::default());
        }

        let top_row = top_row(self);
        let thin_separator_line = thin_separator_line(self);
        let thick_separator_line = thick_separator_line(self);
        let bottom_row = bottom_row(self);

        for y in 0..size {
            if y == 0 {
                f.write_str(top_row.as_str())?;
            }
            else if y % self.block_height == 0 {
                f.write_str(thick_separator_line.as_str())?;
            }
            else {
                f.write_str(thin_separator_line.as_str())?;
            }

            f.write_str(content_row(self, y).as_str())?;
        }

        f.write_str(bottom_row.as_str())?;
        Ok(())
    }
}

fn to_string(cell: &Option<usize>) -> String {
    if let Some(number) = cell {
        number.to_string()
    }
    else {
        String::from("")
    }
}

pub(crate) fn index(column: usize, row: usize, size: usize) -> usize {
    row * size + column
}

fn parse_dimensions(code: &str) -> Result<(usize, usize), SudokuParseError> {
    let parts: Vec<&str> = code.split('x').collect();

    if parts.len() != 2 {
        return Err(SudokuParseError::MalformedDimensions);
    }

    Ok((parts[0].parse()?, parts[1].parse()?))
}

impl Board {

    /// Creates a new, empty board where the blocks have the given dimensions.
    /// The total width and height of the grid will be equal to the product of
    /// `block_width` and `block_height`. Every cell starts empty with a full
    /// candidate set and its block as its region.
    ///
    /// # Arguments
    ///
    /// * `block_width`: The horizontal dimension of one sub-block of the
    /// grid. To ensure a square grid, this is also the number of blocks that
    /// compose the grid vertically. For an ordinary Sudoku grid, this is 3.
    /// Must be greater than 0.
    /// * `block_height`: The vertical dimension of one sub-block of the grid.
    /// To ensure a square grid, this is also the number of blocks that
    /// compose the grid horizontally. For an ordinary Sudoku grid, this is 3.
    /// Must be greater than 0.
    ///
    /// # Errors
    ///
    /// If `block_width` or `block_height` is invalid (zero), or their product
    /// exceeds [MAX_DIGIT].
    pub fn new(block_width: usize, block_height: usize) -> SudokuResult<Board> {
        if block_width == 0 || block_height == 0 {
            return Err(SudokuError::InvalidDimensions);
        }

        let size = block_width * block_height;

        if size > MAX_DIGIT {
            return Err(SudokuError::InvalidDimensions);
        }

        let mut cells = Vec::with_capacity(size * size);

        for row in 0..size {
            for column in 0..size {
                let block = (row / block_height) * block_height
                    + column / block_width;
                cells.push(Cell::empty(size, Some(block)));
            }
        }

        Ok(Board {
            block_width,
            block_height,
            size,
            cells
        })
    }

    /// Parses a code encoding a board. The code has to be of the format
    /// `<block_width>x<block_height>;<cells>` where `<cells>` is a
    /// comma-separated list of entries, which are either empty or a digit.
    /// The entries are assigned left-to-right, top-to-bottom, where each row
    /// is completed before the next one is started. Whitespace in the entries
    /// is ignored to allow for more intuitive formatting. The number of
    /// entries must match the amount of cells in a grid with the given
    /// dimensions, i.e. it must be `(block_width · block_height)²`.
    ///
    /// Filled entries become givens. As an example, the code
    /// `2x2;1, ,2, , ,3, ,4, , , ,3, ,1, ,2` will parse to the following
    /// board:
    ///
    /// ```text
    /// ╔═══╤═══╦═══╤═══╗
    /// ║ 1 │   ║ 2 │   ║
    /// ╟───┼───╫───┼───╢
    /// ║   │ 3 ║   │ 4 ║
    /// ╠═══╪═══╬═══╪═══╣
    /// ║   │   ║   │ 3 ║
    /// ╟───┼───╫───┼───╢
    /// ║   │ 1 ║   │ 2 ║
    /// ╚═══╧═══╩═══╧═══╝
    /// ```
    ///
    /// # Errors
    ///
    /// Any specialization of [SudokuParseError], depending on the fault in
    /// the code.
    pub fn parse(code: &str) -> SudokuParseResult<Board> {
        let parts: Vec<&str> = code.split(';').collect();

        if parts.len() != 2 {
            return Err(SudokuParseError::WrongNumberOfParts);
        }

        let (block_width, block_height) = parse_dimensions(parts[0])?;
        let mut board = Board::new(block_width, block_height)
            .map_err(|_| SudokuParseError::InvalidDimensions)?;
        let size = board.size();
        let entries: Vec<&str> = parts[1].split(',').collect();

        if entries.len() != size * size {
            return Err(SudokuParseError::WrongNumberOfCells);
        }

        for (i, entry) in entries.iter().enumerate() {
            let entry = entry.trim();

            if entry.is_empty() {
                continue;
            }

            let digit: usize = entry.parse()?;

            if digit == 0 || digit > size {
                return Err(SudokuParseError::InvalidNumber);
            }

            let cell = &mut board.cells[i];
            cell.value = Some(digit);
            cell.given = true;
            cell.candidates = DigitSet::singleton(size, digit).unwrap();
        }

        Ok(board)
    }

    /// Converts this board into a code that can be parsed with [Board::parse]
    /// into an equivalent board. Candidate state and regions are not encoded,
    /// only assigned digits.
    pub fn to_parseable_string(&self) -> String {
        let mut result = format!("{}x{};", self.block_width, self.block_height);
        let cells: Vec<String> = self.cells.iter()
            .map(|c| to_string(&c.value))
            .collect();
        result.push_str(cells.join(",").as_str());
        result
    }

    /// The horizontal dimension of one sub-block of the grid.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// The vertical dimension of one sub-block of the grid.
    pub fn block_height(&self) -> usize {
        self.block_height
    }

    /// The width and height of the grid, which is equal to the product of
    /// [Board::block_width] and [Board::block_height].
    pub fn size(&self) -> usize {
        self.size
    }

    fn check_bounds(&self, column: usize, row: usize) -> SudokuResult<()> {
        if column >= self.size || row >= self.size {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(())
        }
    }

    fn check_digit(&self, digit: usize) -> SudokuResult<()> {
        if digit == 0 || digit > self.size {
            Err(SudokuError::InvalidNumber)
        }
        else {
            Ok(())
        }
    }

    /// Gets a reference to the [Cell] at the given position.
    ///
    /// # Errors
    ///
    /// If `column` or `row` are not less than the grid size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn cell(&self, column: usize, row: usize) -> SudokuResult<&Cell> {
        self.check_bounds(column, row)?;
        Ok(&self.cells[index(column, row, self.size)])
    }

    fn cell_mut(&mut self, column: usize, row: usize)
            -> SudokuResult<&mut Cell> {
        self.check_bounds(column, row)?;
        let size = self.size;
        Ok(&mut self.cells[index(column, row, size)])
    }

    /// Gets the digit assigned to the cell at the given position, or `None`
    /// if it is empty.
    ///
    /// # Errors
    ///
    /// If `column` or `row` are not less than the grid size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn value(&self, column: usize, row: usize)
            -> SudokuResult<Option<usize>> {
        Ok(self.cell(column, row)?.value)
    }

    /// Assigns the given digit to the cell at the given position. The cell's
    /// candidate set collapses to the singleton set of the digit. Given
    /// cells cannot be overwritten this way; use
    /// [clear_value](Board::clear_value) first to edit a given.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds`: If `column` or `row` are not less than
    /// the grid size.
    /// * `SudokuError::InvalidNumber`: If `digit` is zero or greater than the
    /// grid size.
    /// * `SudokuError::LockedCell`: If the cell holds a given digit.
    pub fn set_value(&mut self, column: usize, row: usize, digit: usize)
            -> SudokuResult<()> {
        self.check_digit(digit)?;
        let size = self.size;
        let cell = self.cell_mut(column, row)?;

        if cell.given {
            return Err(SudokuError::LockedCell);
        }

        cell.value = Some(digit);
        cell.candidates = DigitSet::singleton(size, digit)
            .map_err(|_| SudokuError::InvalidNumber)?;
        Ok(())
    }

    /// Clears the digit of the cell at the given position and restores its
    /// candidate set to the full digit range (or the declared candidate marks
    /// if present). Does nothing if the cell is already empty.
    ///
    /// # Errors
    ///
    /// If `column` or `row` are not less than the grid size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn clear_value(&mut self, column: usize, row: usize)
            -> SudokuResult<()> {
        let size = self.size;
        let cell = self.cell_mut(column, row)?;
        cell.value = None;
        cell.given = false;
        cell.candidates = cell.given_candidates
            .unwrap_or_else(|| DigitSet::full(size).unwrap());
        Ok(())
    }

    /// Gets the candidate set of the cell at the given position.
    ///
    /// # Errors
    ///
    /// If `column` or `row` are not less than the grid size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn candidates(&self, column: usize, row: usize)
            -> SudokuResult<DigitSet> {
        Ok(self.cell(column, row)?.candidates)
    }

    /// Replaces the candidate set of the cell at the given position. The cell
    /// must be empty, since filled cells always carry the singleton set of
    /// their digit.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds`: If `column` or `row` are not less than
    /// the grid size.
    /// * `SudokuError::InvalidNumber`: If the cell is filled.
    pub fn set_candidates(&mut self, column: usize, row: usize,
            candidates: DigitSet) -> SudokuResult<()> {
        let cell = self.cell_mut(column, row)?;

        if cell.value.is_some() {
            return Err(SudokuError::InvalidNumber);
        }

        cell.candidates = candidates;
        Ok(())
    }

    /// Removes the given digit from the candidate set of the cell at the
    /// given position. Returns `true` if the candidate was present before.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds`: If `column` or `row` are not less than
    /// the grid size.
    /// * `SudokuError::InvalidNumber`: If `digit` is zero or greater than the
    /// grid size.
    pub fn remove_candidate(&mut self, column: usize, row: usize,
            digit: usize) -> SudokuResult<bool> {
        self.check_digit(digit)?;
        let cell = self.cell_mut(column, row)?;
        cell.candidates.remove(digit)
            .map_err(|_| SudokuError::InvalidNumber)
    }

    /// Declares candidate marks for the cell at the given position, which are
    /// restored instead of the full digit range whenever candidates are
    /// reset.
    ///
    /// # Errors
    ///
    /// If `column` or `row` are not less than the grid size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn set_given_candidates(&mut self, column: usize, row: usize,
            candidates: DigitSet) -> SudokuResult<()> {
        let cell = self.cell_mut(column, row)?;
        cell.given_candidates = Some(candidates);
        Ok(())
    }

    /// Restores the candidate set of every empty cell to the full digit range
    /// or, where declared, its candidate marks. Filled cells keep the
    /// singleton set of their digit.
    pub fn reset_candidates(&mut self) {
        let size = self.size;

        for cell in self.cells.iter_mut() {
            match cell.value {
                Some(digit) =>
                    cell.candidates = DigitSet::singleton(size, digit).unwrap(),
                None =>
                    cell.candidates = cell.given_candidates
                        .unwrap_or_else(|| DigitSet::full(size).unwrap())
            }
        }
    }

    /// Assigns the region of the cell at the given position. `None` removes
    /// the cell from all regions.
    ///
    /// # Errors
    ///
    /// If `column` or `row` are not less than the grid size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn set_region(&mut self, column: usize, row: usize,
            region: Option<usize>) -> SudokuResult<()> {
        self.cell_mut(column, row)?.region = region;
        Ok(())
    }

    /// Returns the positions of all cells that belong to the region with the
    /// given identifier, in left-to-right, top-to-bottom order.
    pub fn region_cells(&self, region: usize) -> Vec<CellRef> {
        let mut result = Vec::new();

        for row in 0..self.size {
            for column in 0..self.size {
                if self.cells[index(column, row, self.size)].region
                        == Some(region) {
                    result.push((column, row));
                }
            }
        }

        result
    }

    /// Returns the positions of all empty cells, in left-to-right,
    /// top-to-bottom order.
    pub fn empty_cells(&self) -> Vec<CellRef> {
        let mut result = Vec::new();

        for row in 0..self.size {
            for column in 0..self.size {
                if self.cells[index(column, row, self.size)].value.is_none() {
                    result.push((column, row));
                }
            }
        }

        result
    }

    /// Counts the number of filled cells.
    pub fn count_clues(&self) -> usize {
        self.cells.iter().filter(|c| c.value.is_some()).count()
    }

    /// Indicates whether all cells are filled.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.value.is_some())
    }

    /// Indicates whether all cells are empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.value.is_none())
    }

    /// Clears the digit and candidate state of every non-given cell. Given
    /// digits and declared candidate marks are kept.
    pub fn clear_working_state(&mut self) {
        let size = self.size;

        for cell in self.cells.iter_mut() {
            if !cell.given {
                cell.value = None;
            }

            match cell.value {
                Some(digit) =>
                    cell.candidates = DigitSet::singleton(size, digit).unwrap(),
                None =>
                    cell.candidates = cell.given_candidates
                        .unwrap_or_else(|| DigitSet::full(size).unwrap())
            }
        }
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
