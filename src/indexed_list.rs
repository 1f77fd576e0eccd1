use core::fmt;

use alloc::vec::Vec;

use crate::error::ListError;

/// A sequence addressed by position, with a sorted-insert helper.
///
/// Unlike [`RbTree`](crate::RbTree), [`insert_sorted`](IndexedList::insert_sorted) rejects
/// values that are already present. Positional inserts do not keep the list sorted;
/// `insert_sorted` places a value before the first element that is not less than it.
///
/// The [`Display`](fmt::Display) output separates items with a space and reads `Empty`
/// for an empty list.
///
/// # Examples
///
/// ```
/// use akakuro::{IndexedList, ListError};
///
/// let mut list = IndexedList::new();
/// assert_eq!(list.insert_sorted(5), Ok(0));
/// assert_eq!(list.insert_sorted(2), Ok(0));
/// assert_eq!(list.insert_sorted(9), Ok(2));
/// assert_eq!(list.insert_sorted(5), Err(ListError::DuplicateValue));
/// assert_eq!(list.to_string(), "2 5 9");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexedList<T> {
    items: Vec<T>,
}

impl<T> IndexedList<T> {
    /// Makes a new, empty list.
    #[must_use]
    pub const fn new() -> Self {
        IndexedList { items: Vec::new() }
    }

    /// Returns the number of items in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list holds no items.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::IndexedList;
    ///
    /// let mut list = IndexedList::new();
    /// assert!(list.is_empty());
    /// list.insert_sorted(3).unwrap();
    /// assert!(!list.is_empty());
    /// assert_eq!(list.len(), 1);
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts `value` so that it ends up at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::IndexOutOfBounds`] if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::{IndexedList, ListError};
    ///
    /// let mut list = IndexedList::new();
    /// list.insert_at(0, 'b').unwrap();
    /// list.insert_at(0, 'a').unwrap();
    /// list.insert_at(2, 'c').unwrap();
    /// assert_eq!(list.insert_at(5, 'z'), Err(ListError::IndexOutOfBounds { index: 5, len: 3 }));
    /// assert_eq!(list.to_string(), "a b c");
    /// ```
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), ListError> {
        self.check_index(index, self.items.len() + 1)?;
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::IndexOutOfBounds`] if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, ListError> {
        self.check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::IndexOutOfBounds`] if `index >= len`.
    pub fn find_at(&self, index: usize) -> Result<&T, ListError> {
        self.items.get(index).ok_or(ListError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        })
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates over the elements front to back.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<(), ListError> {
        if index < bound {
            Ok(())
        } else {
            Err(ListError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl<T: Ord> IndexedList<T> {
    /// Inserts `value` before the first element not less than it and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::DuplicateValue`] if an equal value is already in the list.
    pub fn insert_sorted(&mut self, value: T) -> Result<usize, ListError> {
        if self.items.contains(&value) {
            return Err(ListError::DuplicateValue);
        }

        let index = self.items.iter().position(|item| *item >= value).unwrap_or(self.items.len());
        self.items.insert(index, value);
        Ok(index)
    }
}

impl<T: fmt::Display> fmt::Display for IndexedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = self.items.iter();
        let Some(first) = items.next() else {
            return f.write_str("Empty");
        };

        write!(f, "{first}")?;
        for item in items {
            write!(f, " {item}")?;
        }
        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a IndexedList<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
