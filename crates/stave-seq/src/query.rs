//! Element access and linear queries.

use stave_core::StaveError;
use stave_raw::SlotAllocator;

use crate::stave::Stave;

impl<T, A: SlotAllocator> Stave<T, A> {
    /// The element at `index`.
    pub fn at(&self, index: usize) -> Result<&T, StaveError> {
        let len = self.len();
        self.as_slice()
            .get(index)
            .ok_or(StaveError::OutOfBounds { index, len })
    }

    /// The element at `index`, mutably.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, StaveError> {
        let len = self.len();
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(StaveError::OutOfBounds { index, len })
    }

    /// The first element.
    pub fn front(&self) -> Result<&T, StaveError> {
        self.as_slice().first().ok_or(StaveError::Empty)
    }

    /// The last element.
    pub fn back(&self) -> Result<&T, StaveError> {
        self.as_slice().last().ok_or(StaveError::Empty)
    }

    /// The last element, viewed as the top of a stack.
    pub fn top(&self) -> Result<&T, StaveError> {
        self.back()
    }

    /// The last element, mutably.
    pub fn top_mut(&mut self) -> Result<&mut T, StaveError> {
        self.as_mut_slice().last_mut().ok_or(StaveError::Empty)
    }

    /// Index of the first element equal to `item`.
    pub fn find(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_if(|v| v == item)
    }

    /// Index of the first element matching `pred`.
    pub fn find_if<F: FnMut(&T) -> bool>(&self, pred: F) -> Option<usize> {
        self.as_slice().iter().position(pred)
    }

    /// Number of elements equal to `item`.
    pub fn count(&self, item: &T) -> usize
    where
        T: PartialEq,
    {
        self.count_if(|v| v == item)
    }

    /// Number of elements matching `pred`.
    pub fn count_if<F: FnMut(&T) -> bool>(&self, mut pred: F) -> usize {
        self.as_slice().iter().filter(|v| pred(*v)).count()
    }

    /// Whether an element equal to `item` is present.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.find(item).is_some()
    }

    /// Whether any element matches `pred`.
    pub fn contains_if<F: FnMut(&T) -> bool>(&self, pred: F) -> bool {
        self.find_if(pred).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_access() {
        let mut s = Stave::from_slice(&[10, 20, 30]).unwrap();
        assert_eq!(*s.at(1).unwrap(), 20);
        assert_eq!(
            s.at(3).unwrap_err(),
            StaveError::OutOfBounds { index: 3, len: 3 }
        );
        *s.at_mut(0).unwrap() = 11;
        assert_eq!(*s.front().unwrap(), 11);
        assert_eq!(*s.back().unwrap(), 30);
        *s.top_mut().unwrap() += 1;
        assert_eq!(*s.top().unwrap(), 31);
    }

    #[test]
    fn empty_accessors_report_empty() {
        let mut s: Stave<u8> = Stave::new();
        assert_eq!(s.front().unwrap_err(), StaveError::Empty);
        assert_eq!(s.back().unwrap_err(), StaveError::Empty);
        assert_eq!(s.top_mut().unwrap_err(), StaveError::Empty);
    }

    #[test]
    fn find_and_count() {
        let s = Stave::from_slice(&[3, 1, 3, 2]).unwrap();
        assert_eq!(s.find(&3), Some(0));
        assert_eq!(s.find(&7), None);
        assert_eq!(s.find_if(|v| *v < 3), Some(1));
        assert_eq!(s.count(&3), 2);
        assert_eq!(s.count_if(|v| *v > 1), 3);
        assert!(s.contains(&2));
        assert!(!s.contains_if(|v| *v > 3));
    }
}
