use std::fmt;
use std::fmt::Debug;

use itertools::Itertools;

use super::domain::Domain;
use super::domain::DomainCursor;
use crate::gherkin_assert_simple;

/// A domain backed by a plain list, for value types without interval structure.
///
/// Values keep their insertion order and duplicates are not rejected. Absent values can be
/// modelled by using `ListDomain<Option<T>>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListDomain<T> {
    values: Vec<T>,
}

impl<T: Clone + PartialEq + Debug> ListDomain<T> {
    /// Creates an empty domain.
    pub fn new() -> ListDomain<T> {
        ListDomain { values: Vec::new() }
    }

    /// Creates a domain holding the single given value.
    pub fn singleton(value: T) -> ListDomain<T> {
        ListDomain {
            values: vec![value],
        }
    }

    /// Creates a domain holding the given values in order.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> ListDomain<T> {
        ListDomain {
            values: values.into_iter().collect(),
        }
    }

    /// Replaces the value at `index`. Panics when `index >= len`.
    pub fn set(&mut self, index: usize, value: T) {
        gherkin_assert_simple!(
            index < self.values.len(),
            "index {index} out of range for a domain of size {}",
            self.values.len()
        );
        self.values[index] = value;
    }
}

impl<T: Clone + PartialEq + Debug> Domain for ListDomain<T> {
    type Value = T;

    type CursorMut<'a>
        = ListDomainCursor<'a, T>
    where
        Self: 'a;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> T {
        gherkin_assert_simple!(
            index < self.values.len(),
            "index {index} out of range for a domain of size {}",
            self.values.len()
        );
        self.values[index].clone()
    }

    fn position_of(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|candidate| candidate == value)
    }

    fn insert(&mut self, value: T) {
        self.values.push(value);
    }

    fn remove_value(&mut self, value: &T) -> bool {
        match self.position_of(value) {
            Some(index) => {
                let _ = self.values.remove(index);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, index: usize) -> T {
        gherkin_assert_simple!(
            index < self.values.len(),
            "index {index} out of range for a domain of size {}",
            self.values.len()
        );
        self.values.remove(index)
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().cloned()
    }

    fn cursor_mut(&mut self) -> ListDomainCursor<'_, T> {
        ListDomainCursor {
            domain: self,
            index: -1,
        }
    }
}

impl<T: fmt::Display> fmt::Display for ListDomain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.values.iter().join(", "))
    }
}

impl<T: Clone + PartialEq + Debug> FromIterator<T> for ListDomain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> ListDomain<T> {
        ListDomain::from_values(values)
    }
}

/// The removing cursor of a [`ListDomain`]; removal shifts the tail left and steps the cursor
/// back so that the following advance yields the value after the removed one.
#[derive(Debug)]
pub struct ListDomainCursor<'a, T> {
    domain: &'a mut ListDomain<T>,
    index: isize,
}

impl<T: Clone + PartialEq + Debug> DomainCursor for ListDomainCursor<'_, T> {
    type Value = T;

    fn advance(&mut self) -> Option<T> {
        if self.index + 1 >= self.domain.values.len() as isize {
            return None;
        }
        self.index += 1;
        Some(self.domain.values[self.index as usize].clone())
    }

    fn current_index(&self) -> Option<usize> {
        (self.index >= 0).then_some(self.index as usize)
    }

    fn remove(&mut self) {
        gherkin_assert_simple!(
            self.index >= 0,
            "cursor removal before the first advance"
        );
        let _ = self.domain.values.remove(self.index as usize);
        self.index -= 1;
    }

    fn reset(&mut self) {
        self.index = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let domain = ListDomain::from_values(["c", "a", "b"]);

        assert_eq!(domain.len(), 3);
        assert_eq!(domain.get(0), "c");
        assert_eq!(domain.position_of(&"b"), Some(2));
        assert_eq!(domain.to_string(), "[c, a, b]");
    }

    #[test]
    fn remove_value_drops_the_first_occurrence() {
        let mut domain = ListDomain::from_values([1, 2, 1, 3]);

        assert!(domain.remove_value(&1));
        assert_eq!(domain.iter().collect::<Vec<_>>(), vec![2, 1, 3]);
        assert!(!domain.remove_value(&9));
    }

    #[test]
    fn optional_values_can_hold_a_null_sentinel() {
        let mut domain = ListDomain::from_values([Some(1), None, Some(2)]);

        assert_eq!(domain.position_of(&None), Some(1));
        assert!(domain.remove_value(&None));
        assert_eq!(domain.len(), 2);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut domain = ListDomain::from_values([1, 2, 3]);
        domain.set(1, 9);
        assert_eq!(domain.get(1), 9);
    }

    #[test]
    fn cursor_removal_resumes_with_the_following_value() {
        let mut domain = ListDomain::from_values([10, 20, 30]);
        let mut cursor = domain.cursor_mut();

        assert_eq!(cursor.advance(), Some(10));
        assert_eq!(cursor.advance(), Some(20));
        cursor.remove();

        assert_eq!(cursor.advance(), Some(30));
        assert_eq!(cursor.advance(), None);
        assert_eq!(domain.len(), 2);
    }

    #[test]
    #[should_panic(expected = "before the first advance")]
    fn cursor_removal_before_advancing_panics() {
        let mut domain = ListDomain::from_values([1]);
        domain.cursor_mut().remove();
    }
}
