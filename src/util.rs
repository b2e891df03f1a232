//! This module contains utility functionality needed for this crate. Most
//! prominently, it contains the definition of the [DigitSet] used for storing
//! the candidate digits of a cell.

use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::hash::Hash;
use std::ops::{
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Sub,
    SubAssign
};

/// The highest grid size, and therefore the highest digit, a [DigitSet] can
/// hold. All sets are backed by a single 16-bit word.
pub const MAX_DIGIT: usize = 16;

/// A set of digits in the range `1..=size` for some grid size of at most
/// [MAX_DIGIT], implemented as a single-word bit set. All membership
/// operations are constant-time and sets can be copied freely.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DigitSet {
    size: u8,
    bits: u16
}

/// An enumeration of the errors that can happen when using a [DigitSet].
#[derive(Debug, Eq, PartialEq)]
pub enum DigitSetError {

    /// Indicates that the size provided in the constructor is zero or greater
    /// than [MAX_DIGIT].
    InvalidSize,

    /// Indicates that an operation was performed on two or more `DigitSet`s
    /// with different sizes.
    DifferentSizes,

    /// Indicates that a digit that was queried to be inserted or removed is
    /// outside the range `1..=size` of the `DigitSet` in question.
    OutOfRange
}

/// Syntactic sugar for `Result<V, DigitSetError>`.
pub type DigitSetResult<V> = Result<V, DigitSetError>;

impl DigitSet {

    /// Creates a new, empty `DigitSet` for digits in the range `1..=size`.
    ///
    /// # Errors
    ///
    /// If `size` is zero or greater than [MAX_DIGIT]. In that case, a
    /// `DigitSetError::InvalidSize` is returned.
    pub fn new(size: usize) -> DigitSetResult<DigitSet> {
        if size == 0 || size > MAX_DIGIT {
            Err(DigitSetError::InvalidSize)
        }
        else {
            Ok(DigitSet {
                size: size as u8,
                bits: 0
            })
        }
    }

    /// Creates a new singleton `DigitSet` for digits in the range `1..=size`
    /// which contains only `digit`.
    ///
    /// # Errors
    ///
    /// * `DigitSetError::InvalidSize`: If `size` is zero or greater than
    /// [MAX_DIGIT].
    /// * `DigitSetError::OutOfRange`: If `digit` is zero or greater than
    /// `size`.
    pub fn singleton(size: usize, digit: usize) -> DigitSetResult<DigitSet> {
        let mut result = DigitSet::new(size)?;
        result.insert(digit)?;
        Ok(result)
    }

    /// Creates a new `DigitSet` that contains all digits in the range
    /// `1..=size`.
    ///
    /// # Errors
    ///
    /// If `size` is zero or greater than [MAX_DIGIT]. In that case, a
    /// `DigitSetError::InvalidSize` is returned.
    pub fn full(size: usize) -> DigitSetResult<DigitSet> {
        let mut result = DigitSet::new(size)?;
        result.bits = ((1u32 << size) - 1) as u16;
        Ok(result)
    }

    fn mask(&self, digit: usize) -> DigitSetResult<u16> {
        if digit == 0 || digit > self.size as usize {
            Err(DigitSetError::OutOfRange)
        }
        else {
            Ok(1u16 << (digit - 1))
        }
    }

    /// Returns the grid size this set was created for, i.e. the highest digit
    /// it can contain.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Indicates whether this set contains the given digit, in which case
    /// this method returns `true`. If it is not contained or out of range,
    /// `false` will be returned.
    pub fn contains(&self, digit: usize) -> bool {
        if let Ok(mask) = self.mask(digit) {
            self.bits & mask > 0
        }
        else {
            false
        }
    }

    /// Inserts the given digit into this set, such that [DigitSet::contains]
    /// returns `true` for it afterwards.
    ///
    /// This method returns `true` if the set has changed (i.e. the digit was
    /// not present before) and `false` otherwise.
    ///
    /// # Errors
    ///
    /// If `digit` is zero or greater than [DigitSet::size]. In that case,
    /// `DigitSetError::OutOfRange` is returned.
    pub fn insert(&mut self, digit: usize) -> DigitSetResult<bool> {
        let mask = self.mask(digit)?;
        let changed = self.bits & mask == 0;
        self.bits |= mask;
        Ok(changed)
    }

    /// Removes the given digit from this set, such that [DigitSet::contains]
    /// returns `false` for it afterwards.
    ///
    /// This method returns `true` if the set has changed (i.e. the digit was
    /// present before) and `false` otherwise.
    ///
    /// # Errors
    ///
    /// If `digit` is zero or greater than [DigitSet::size]. In that case,
    /// `DigitSetError::OutOfRange` is returned.
    pub fn remove(&mut self, digit: usize) -> DigitSetResult<bool> {
        let mask = self.mask(digit)?;
        let changed = self.bits & mask > 0;
        self.bits &= !mask;
        Ok(changed)
    }

    /// Removes all digits from this set, such that [DigitSet::is_empty] will
    /// return `true` afterwards.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Returns an iterator over the digits contained in this set in ascending
    /// order.
    pub fn iter(&self) -> DigitSetIter {
        DigitSetIter {
            bits: self.bits
        }
    }

    /// Indicates whether this set is empty, i.e. contains no digits.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the number of digits contained in this set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns the lowest digit contained in this set, or `None` if it is
    /// empty.
    pub fn min(&self) -> Option<usize> {
        if self.bits == 0 {
            None
        }
        else {
            Some(self.bits.trailing_zeros() as usize + 1)
        }
    }

    /// Returns the highest digit contained in this set, or `None` if it is
    /// empty.
    pub fn max(&self) -> Option<usize> {
        if self.bits == 0 {
            None
        }
        else {
            Some(16 - self.bits.leading_zeros() as usize)
        }
    }

    /// Returns the only digit contained in this set, or `None` if it does not
    /// contain exactly one digit.
    pub fn only(&self) -> Option<usize> {
        if self.len() == 1 {
            self.min()
        }
        else {
            None
        }
    }

    /// Indicates whether this set is a subset of the given set, i.e. all
    /// digits contained in this set are also contained in `other`. Sizes are
    /// not required to match for this query.
    pub fn is_subset(&self, other: &DigitSet) -> bool {
        self.bits & !other.bits == 0
    }

    fn op_assign(&mut self, other: &DigitSet, op: impl Fn(u16, u16) -> u16)
            -> DigitSetResult<bool> {
        if self.size != other.size {
            Err(DigitSetError::DifferentSizes)
        }
        else {
            let before = self.bits;
            self.bits = op(before, other.bits);
            Ok(before != self.bits)
        }
    }

    /// Computes the set union between this and the given set and stores the
    /// result in this set. The sizes of this set and `other` must be equal.
    ///
    /// `DigitSet` implements [BitOrAssign] as syntactic sugar for this
    /// operation. Note that that implementation panics instead of returning
    /// potential errors.
    ///
    /// # Returns
    ///
    /// True, if and only if this set changed as a result of the operation.
    ///
    /// # Errors
    ///
    /// If the sizes of this set and `other` are different. In that case,
    /// `DigitSetError::DifferentSizes` is returned.
    pub fn union_assign(&mut self, other: &DigitSet) -> DigitSetResult<bool> {
        self.op_assign(other, |a, b| a | b)
    }

    /// Computes the set intersection between this and the given set and
    /// stores the result in this set. The sizes of this set and `other` must
    /// be equal.
    ///
    /// `DigitSet` implements [BitAndAssign] as syntactic sugar for this
    /// operation. Note that that implementation panics instead of returning
    /// potential errors.
    ///
    /// # Returns
    ///
    /// True, if and only if this set changed as a result of the operation.
    ///
    /// # Errors
    ///
    /// If the sizes of this set and `other` are different. In that case,
    /// `DigitSetError::DifferentSizes` is returned.
    pub fn intersect_assign(&mut self, other: &DigitSet)
            -> DigitSetResult<bool> {
        self.op_assign(other, |a, b| a & b)
    }

    /// Computes the set difference between this and the given set and stores
    /// the result in this set. The sizes of this set and `other` must be
    /// equal. `other` acts as the right-hand-side, meaning its digits are
    /// removed from the result.
    ///
    /// `DigitSet` implements [SubAssign] as syntactic sugar for this
    /// operation. Note that that implementation panics instead of returning
    /// potential errors.
    ///
    /// # Returns
    ///
    /// True, if and only if this set changed as a result of the operation.
    ///
    /// # Errors
    ///
    /// If the sizes of this set and `other` are different. In that case,
    /// `DigitSetError::DifferentSizes` is returned.
    pub fn difference_assign(&mut self, other: &DigitSet)
            -> DigitSetResult<bool> {
        self.op_assign(other, |a, b| a & !b)
    }

    /// Computes the symmetric set difference between this and the given set
    /// and stores the result in this set. The sizes of this set and `other`
    /// must be equal.
    ///
    /// `DigitSet` implements [BitXorAssign] as syntactic sugar for this
    /// operation. Note that that implementation panics instead of returning
    /// potential errors.
    ///
    /// # Returns
    ///
    /// True, if and only if this set changed as a result of the operation.
    ///
    /// # Errors
    ///
    /// If the sizes of this set and `other` are different. In that case,
    /// `DigitSetError::DifferentSizes` is returned.
    pub fn symmetric_difference_assign(&mut self, other: &DigitSet)
            -> DigitSetResult<bool> {
        self.op_assign(other, |a, b| a ^ b)
    }
}

/// An iterator over the digits of a [DigitSet] in ascending order.
pub struct DigitSetIter {
    bits: u16
}

impl Iterator for DigitSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            None
        }
        else {
            let digit = self.bits.trailing_zeros() as usize + 1;
            self.bits &= self.bits - 1;
            Some(digit)
        }
    }
}

impl IntoIterator for &DigitSet {
    type Item = usize;
    type IntoIter = DigitSetIter;

    fn into_iter(self) -> DigitSetIter {
        self.iter()
    }
}

/// Creates a new [DigitSet] that contains the specified digits. First, the
/// grid size must be specified. Then, after a semicolon, a comma-separated
/// list of the contained digits must be provided. For empty sets,
/// [DigitSet::new] can be used.
///
/// An example usage of this macro looks as follows:
///
/// ```
/// use sudoku_logic::digits;
///
/// let set = digits!(9; 2, 4);
/// assert_eq!(9, set.size());
/// assert!(set.contains(2));
/// assert!(!set.contains(3));
/// ```
#[macro_export]
macro_rules! digits {
    ($size:expr; $($es:expr),+) => {
        {
            let mut set = $crate::util::DigitSet::new($size).unwrap();
            $(set.insert($es).unwrap();)+
            set
        }
    };
}

impl BitAnd<&DigitSet> for DigitSet {
    type Output = DigitSet;

    fn bitand(mut self, rhs: &DigitSet) -> DigitSet {
        self.intersect_assign(rhs).unwrap();
        self
    }
}

impl BitOr<&DigitSet> for DigitSet {
    type Output = DigitSet;

    fn bitor(mut self, rhs: &DigitSet) -> DigitSet {
        self.union_assign(rhs).unwrap();
        self
    }
}

impl Sub<&DigitSet> for DigitSet {
    type Output = DigitSet;

    fn sub(mut self, rhs: &DigitSet) -> DigitSet {
        self.difference_assign(rhs).unwrap();
        self
    }
}

impl BitXor<&DigitSet> for DigitSet {
    type Output = DigitSet;

    fn bitxor(mut self, rhs: &DigitSet) -> DigitSet {
        self.symmetric_difference_assign(rhs).unwrap();
        self
    }
}

impl BitAndAssign<&DigitSet> for DigitSet {
    fn bitand_assign(&mut self, rhs: &DigitSet) {
        self.intersect_assign(rhs).unwrap();
    }
}

impl BitOrAssign<&DigitSet> for DigitSet {
    fn bitor_assign(&mut self, rhs: &DigitSet) {
        self.union_assign(rhs).unwrap();
    }
}

impl SubAssign<&DigitSet> for DigitSet {
    fn sub_assign(&mut self, rhs: &DigitSet) {
        self.difference_assign(rhs).unwrap();
    }
}

impl BitXorAssign<&DigitSet> for DigitSet {
    fn bitxor_assign(&mut self, rhs: &DigitSet) {
        self.symmetric_difference_assign(rhs).unwrap();
    }
}

/// Determines whether the given iterator contains at least two equal elements
/// as defined by the [Eq](std::cmp::Eq) trait. The duplication detection is
/// implemented with a [HashSet](std::collections::HashSet), so it is required
/// that the item type implements the [Hash](std::hash::Hash) trait in a
/// consistent way.
pub(crate) fn contains_duplicate<I>(mut iter: I) -> bool
where
    I: Iterator,
    I::Item: Hash + Eq
{
    let mut set = HashSet::new();
    iter.any(|e| !set.insert(e))
}
