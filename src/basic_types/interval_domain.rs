use std::fmt;

use itertools::Itertools;

use super::domain::Domain;
use super::domain::DomainCursor;
use crate::gherkin_assert_extreme;
use crate::gherkin_assert_simple;

/// A closed interval `[lower, upper]` of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Interval {
    lower: i32,
    upper: i32,
}

impl Interval {
    fn singleton(value: i32) -> Interval {
        Interval {
            lower: value,
            upper: value,
        }
    }

    fn len(&self) -> usize {
        (self.upper as i64 - self.lower as i64 + 1) as usize
    }

    fn contains(&self, value: i32) -> bool {
        self.lower <= value && value <= self.upper
    }

    fn get(&self, offset: usize) -> i32 {
        self.lower + offset as i32
    }

    fn position_of(&self, value: i32) -> Option<usize> {
        self.contains(value)
            .then(|| (value - self.lower) as usize)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lower == self.upper {
            write!(f, "{{{}}}", self.lower)
        } else {
            write!(f, "[{}..{}]", self.lower, self.upper)
        }
    }
}

/// How removing a single value reshaped the interval list; the removing cursor uses this to
/// re-anchor itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemovalImpact {
    DeletedInterval,
    ShrunkLower,
    ShrunkUpper,
    Split,
}

/// A set of integers stored as an ordered union of disjoint, non-adjacent closed intervals.
///
/// The interval list is canonical: intervals are sorted by lower bound, consecutive intervals are
/// separated by a gap of at least one value, and within each interval `lower <= upper`. Two
/// domains holding the same values therefore always have equal interval lists, which is what makes
/// the derived equality and hashing correct.
///
/// Insertion merges with adjacent intervals, removal shrinks or splits the containing interval.
/// Both are `O(intervals)` in the worst case due to the shifting of the interval list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntervalDomain {
    intervals: Vec<Interval>,
    len: usize,
}

impl IntervalDomain {
    /// Creates an empty domain.
    pub fn new() -> IntervalDomain {
        IntervalDomain::default()
    }

    /// Creates a domain holding the single given value.
    pub fn singleton(value: i32) -> IntervalDomain {
        IntervalDomain {
            intervals: vec![Interval::singleton(value)],
            len: 1,
        }
    }

    /// Creates a domain holding every value in `[lower, upper]`, bounds included.
    ///
    /// Panics when `upper < lower`.
    pub fn range(lower: i32, upper: i32) -> IntervalDomain {
        gherkin_assert_simple!(
            lower <= upper,
            "invalid interval: upper bound {upper} is smaller than lower bound {lower}"
        );
        let interval = Interval { lower, upper };
        IntervalDomain {
            len: interval.len(),
            intervals: vec![interval],
        }
    }

    /// The smallest value of the domain. Panics when the domain is empty.
    pub fn min(&self) -> i32 {
        gherkin_assert_simple!(!self.intervals.is_empty(), "min of an empty domain");
        self.intervals[0].lower
    }

    /// The largest value of the domain. Panics when the domain is empty.
    pub fn max(&self) -> i32 {
        gherkin_assert_simple!(!self.intervals.is_empty(), "max of an empty domain");
        self.intervals[self.intervals.len() - 1].upper
    }

    /// The index of the first interval whose upper bound is at least `value`, or the interval
    /// count when every interval lies below `value`.
    fn interval_candidate(&self, value: i32) -> usize {
        self.intervals
            .partition_point(|interval| interval.upper < value)
    }

    /// The index of the interval containing `value`, if any.
    fn interval_of(&self, value: i32) -> Option<usize> {
        let candidate = self.interval_candidate(value);
        (candidate < self.intervals.len() && self.intervals[candidate].contains(value))
            .then_some(candidate)
    }

    /// Removes `value` from the interval at `interval`, which must contain it.
    fn remove_in_interval(&mut self, value: i32, interval: usize) -> RemovalImpact {
        self.len -= 1;
        let found = self.intervals[interval];
        let impact = if found.len() == 1 {
            let _ = self.intervals.remove(interval);
            RemovalImpact::DeletedInterval
        } else if found.lower == value {
            self.intervals[interval].lower += 1;
            RemovalImpact::ShrunkLower
        } else if found.upper == value {
            self.intervals[interval].upper -= 1;
            RemovalImpact::ShrunkUpper
        } else {
            self.intervals[interval].upper = value - 1;
            self.intervals.insert(
                interval + 1,
                Interval {
                    lower: value + 1,
                    upper: found.upper,
                },
            );
            RemovalImpact::Split
        };
        self.debug_assert_invariants();
        impact
    }

    fn debug_assert_invariants(&self) {
        gherkin_assert_extreme!(
            self.intervals
                .iter()
                .all(|interval| interval.lower <= interval.upper),
            "interval with inverted bounds in {self}"
        );
        gherkin_assert_extreme!(
            self.intervals
                .windows(2)
                .all(|pair| pair[1].lower as i64 >= pair[0].upper as i64 + 2),
            "touching or unordered intervals in {self}"
        );
        gherkin_assert_extreme!(
            self.len == self.intervals.iter().map(Interval::len).sum::<usize>(),
            "cached size {} does not match the intervals of {self}",
            self.len
        );
    }
}

impl Domain for IntervalDomain {
    type Value = i32;

    type CursorMut<'a>
        = IntervalDomainCursor<'a>
    where
        Self: 'a;

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> i32 {
        gherkin_assert_simple!(
            index < self.len,
            "index {index} out of range for a domain of size {}",
            self.len
        );
        let mut offset = 0;
        for interval in &self.intervals {
            let relative = index - offset;
            if relative < interval.len() {
                return interval.get(relative);
            }
            offset += interval.len();
        }
        unreachable!("index {index} in range but not covered by {self}");
    }

    fn position_of(&self, value: &i32) -> Option<usize> {
        let value = *value;
        if self.intervals.is_empty() || value < self.min() || self.max() < value {
            return None;
        }
        let mut offset = 0;
        for interval in &self.intervals {
            if let Some(relative) = interval.position_of(value) {
                return Some(offset + relative);
            }
            offset += interval.len();
        }
        None
    }

    fn insert(&mut self, value: i32) {
        // Start the scan one interval before the binary-search candidate so that extending the
        // previous interval's upper bound (the "right before" case) is considered first.
        let start = self.interval_candidate(value).saturating_sub(1);
        for i in start..self.intervals.len() {
            if value < self.intervals[i].lower {
                if value == self.intervals[i].lower - 1 {
                    self.intervals[i].lower -= 1;
                } else {
                    self.intervals.insert(i, Interval::singleton(value));
                }
                self.len += 1;
                self.debug_assert_invariants();
                return;
            }
            if self.intervals[i].contains(value) {
                return;
            }
            if value - 1 == self.intervals[i].upper {
                self.intervals[i].upper += 1;
                // The extension may have closed the gap to the next interval.
                if i + 1 < self.intervals.len()
                    && self.intervals[i].upper + 1 == self.intervals[i + 1].lower
                {
                    self.intervals[i].upper = self.intervals[i + 1].upper;
                    let _ = self.intervals.remove(i + 1);
                }
                self.len += 1;
                self.debug_assert_invariants();
                return;
            }
        }
        // Beyond the last interval, or into an empty domain.
        self.intervals.push(Interval::singleton(value));
        self.len += 1;
        self.debug_assert_invariants();
    }

    fn remove_value(&mut self, value: &i32) -> bool {
        match self.interval_of(*value) {
            Some(interval) => {
                let _ = self.remove_in_interval(*value, interval);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, index: usize) -> i32 {
        gherkin_assert_simple!(
            index < self.len,
            "index {index} out of range for a domain of size {}",
            self.len
        );
        let mut offset = 0;
        for i in 0..self.intervals.len() {
            let relative = index - offset;
            if relative < self.intervals[i].len() {
                let removed = self.intervals[i].get(relative);
                let _ = self.remove_in_interval(removed, i);
                return removed;
            }
            offset += self.intervals[i].len();
        }
        unreachable!("index {index} in range but not covered by {self}");
    }

    fn clear(&mut self) {
        self.intervals.clear();
        self.len = 0;
    }

    fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals
            .iter()
            .flat_map(|interval| interval.lower..=interval.upper)
    }

    fn cursor_mut(&mut self) -> IntervalDomainCursor<'_> {
        IntervalDomainCursor {
            domain: self,
            index: -1,
            interval: -1,
            offset: -1,
        }
    }
}

impl fmt::Display for IntervalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "{}", self.intervals.iter().join("U"))
        }
    }
}

impl FromIterator<i32> for IntervalDomain {
    fn from_iter<I: IntoIterator<Item = i32>>(values: I) -> IntervalDomain {
        let mut domain = IntervalDomain::new();
        for value in values {
            domain.insert(value);
        }
        domain
    }
}

/// The removing cursor of an [`IntervalDomain`].
///
/// Tracks the global index alongside the (interval, offset) pair so that stepping is `O(1)` and
/// removal can re-anchor onto the value preceding the removed one regardless of whether the
/// removal deleted an interval, shrank one of its bounds, or split it in two.
#[derive(Debug)]
pub struct IntervalDomainCursor<'a> {
    domain: &'a mut IntervalDomain,
    /// Global index of the value the cursor rests on; `-1` before the first advance.
    index: isize,
    /// Index of the interval holding the current value; `-1` before the first advance.
    interval: isize,
    /// Offset of the current value within its interval; `-1` before the first advance.
    offset: isize,
}

impl IntervalDomainCursor<'_> {
    fn last_offset_of_current_interval(&self) -> isize {
        if self.interval >= 0 {
            self.domain.intervals[self.interval as usize].len() as isize - 1
        } else {
            -1
        }
    }
}

impl DomainCursor for IntervalDomainCursor<'_> {
    type Value = i32;

    fn advance(&mut self) -> Option<i32> {
        if self.index + 1 >= self.domain.len as isize {
            return None;
        }
        self.index += 1;
        self.offset += 1;
        if self.interval < 0
            || self.offset as usize == self.domain.intervals[self.interval as usize].len()
        {
            self.interval += 1;
            self.offset = 0;
        }
        Some(self.domain.intervals[self.interval as usize].get(self.offset as usize))
    }

    fn current_index(&self) -> Option<usize> {
        (self.index >= 0).then_some(self.index as usize)
    }

    fn remove(&mut self) {
        gherkin_assert_simple!(
            self.index >= 0,
            "cursor removal before the first advance"
        );
        let interval = self.interval as usize;
        let value = self.domain.intervals[interval].get(self.offset as usize);
        match self.domain.remove_in_interval(value, interval) {
            RemovalImpact::DeletedInterval | RemovalImpact::ShrunkLower => {
                // The preceding value lives at the end of the previous interval.
                self.interval -= 1;
                self.offset = self.last_offset_of_current_interval();
            }
            RemovalImpact::ShrunkUpper | RemovalImpact::Split => {
                // The preceding value is now the last value of the current interval.
                self.offset = self.last_offset_of_current_interval();
            }
        }
        self.index -= 1;
    }

    fn reset(&mut self) {
        self.index = -1;
        self.interval = -1;
        self.offset = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(domain: &IntervalDomain) -> Vec<i32> {
        domain.iter().collect()
    }

    #[test]
    fn inserts_merge_into_a_single_interval() {
        let mut domain = IntervalDomain::new();
        domain.insert(3);
        domain.insert(5);
        domain.insert(4);

        assert_eq!(domain.to_string(), "[3..5]");
        assert_eq!(domain.len(), 3);
        assert!(domain.contains(&4));
    }

    #[test]
    fn removals_split_intervals() {
        let mut domain = IntervalDomain::range(1, 7);
        assert!(domain.remove_value(&5));
        assert!(domain.remove_value(&3));

        assert_eq!(domain.to_string(), "[1..2]U{4}U[6..7]");
        assert_eq!(domain.len(), 5);
        assert!(!domain.remove_value(&3));
    }

    #[test]
    fn inserts_around_negative_bounds() {
        let mut domain = IntervalDomain::range(-3, 2);
        domain.insert(5);
        domain.insert(4);
        domain.insert(-5);
        domain.insert(-4);

        assert_eq!(domain.to_string(), "[-5..2]U[4..5]");
        assert_eq!(domain.len(), 9);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut domain = IntervalDomain::range(0, 4);
        domain.insert(2);
        domain.insert(0);
        domain.insert(4);

        assert_eq!(domain.to_string(), "[0..4]");
        assert_eq!(domain.len(), 5);
    }

    #[test]
    fn insert_closes_a_single_value_gap() {
        let mut domain = IntervalDomain::range(1, 2);
        domain.insert(4);
        assert_eq!(domain.to_string(), "[1..2]U{4}");

        domain.insert(3);
        assert_eq!(domain.to_string(), "[1..4]");
        assert_eq!(domain.len(), 4);
    }

    #[test]
    fn empty_domain_displays_as_brackets() {
        let mut domain = IntervalDomain::singleton(7);
        assert_eq!(domain.to_string(), "{7}");

        assert_eq!(domain.remove_at(0), 7);
        assert!(domain.is_empty());
        assert_eq!(domain.to_string(), "[]");
    }

    #[test]
    fn indexed_access_crosses_intervals() {
        let domain: IntervalDomain = [1, 2, 3, 7, 9, 10].into_iter().collect();

        assert_eq!(domain.to_string(), "[1..3]U{7}U[9..10]");
        for index in 0..domain.len() {
            assert_eq!(domain.position_of(&domain.get(index)), Some(index));
        }
        assert_eq!(domain.position_of(&8), None);
        assert_eq!(domain.position_of(&0), None);
        assert_eq!(domain.position_of(&11), None);
    }

    #[test]
    fn min_and_max_come_from_the_outer_intervals() {
        let domain: IntervalDomain = [4, -2, 9].into_iter().collect();
        assert_eq!(domain.min(), -2);
        assert_eq!(domain.max(), 9);
    }

    #[test]
    #[should_panic(expected = "min of an empty domain")]
    fn min_of_empty_domain_panics() {
        let _ = IntervalDomain::new().min();
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_past_the_end_panics() {
        let _ = IntervalDomain::range(1, 3).get(3);
    }

    #[test]
    fn insert_all_is_set_union() {
        let mut left: IntervalDomain = [1, 2, 3, 8].into_iter().collect();
        let right: IntervalDomain = [3, 4, 5, 10].into_iter().collect();

        left.insert_all(&right);

        assert_eq!(collect(&left), vec![1, 2, 3, 4, 5, 8, 10]);
    }

    #[test]
    fn remove_at_returns_the_removed_value() {
        let mut domain: IntervalDomain = [1, 2, 3, 7].into_iter().collect();

        assert_eq!(domain.remove_at(3), 7);
        assert_eq!(domain.remove_at(1), 2);
        assert_eq!(domain.to_string(), "{1}U{3}");
    }

    #[test]
    fn clear_empties_the_domain() {
        let mut domain = IntervalDomain::range(1, 10);
        domain.clear();
        assert!(domain.is_empty());
        assert!(!domain.contains(&5));
    }

    #[test]
    fn equal_values_mean_equal_domains() {
        let built: IntervalDomain = [3, 1, 2].into_iter().collect();
        assert_eq!(built, IntervalDomain::range(1, 3));
        assert_ne!(built, IntervalDomain::range(1, 4));
    }

    #[test]
    fn cursor_yields_values_in_ascending_order() {
        let mut domain: IntervalDomain = [2, 3, 5, 9, 10].into_iter().collect();
        let expected = collect(&domain);

        let mut cursor = domain.cursor_mut();
        assert_eq!(cursor.current_index(), None);
        for (index, value) in expected.iter().enumerate() {
            assert_eq!(cursor.advance(), Some(*value));
            assert_eq!(cursor.current_index(), Some(index));
        }
        assert_eq!(cursor.advance(), None);

        cursor.reset();
        assert_eq!(cursor.advance(), Some(2));
    }

    #[test]
    fn cursor_removal_of_a_middle_value_splits_and_resumes() {
        let mut domain = IntervalDomain::range(1, 3);
        let mut cursor = domain.cursor_mut();

        assert_eq!(cursor.advance(), Some(1));
        assert_eq!(cursor.advance(), Some(2));
        cursor.remove();

        assert_eq!(cursor.advance(), Some(3));
        assert_eq!(cursor.advance(), None);
        assert_eq!(domain.to_string(), "{1}U{3}");
    }

    #[test]
    fn cursor_removal_of_an_upper_bound_resumes_at_the_next_interval() {
        let mut domain: IntervalDomain = [1, 2, 3, 5, 6].into_iter().collect();
        let mut cursor = domain.cursor_mut();

        assert_eq!(cursor.advance(), Some(1));
        assert_eq!(cursor.advance(), Some(2));
        assert_eq!(cursor.advance(), Some(3));
        cursor.remove();

        assert_eq!(cursor.advance(), Some(5));
        assert_eq!(domain.to_string(), "[1..2]U[5..6]");
    }

    #[test]
    fn cursor_removal_of_a_lower_bound_resumes_correctly() {
        let mut domain = IntervalDomain::range(1, 3);
        let mut cursor = domain.cursor_mut();

        assert_eq!(cursor.advance(), Some(1));
        cursor.remove();

        assert_eq!(cursor.advance(), Some(2));
        assert_eq!(cursor.advance(), Some(3));
        assert_eq!(cursor.advance(), None);
        assert_eq!(domain.to_string(), "[2..3]");
    }

    #[test]
    fn cursor_removal_of_a_singleton_interval_resumes_correctly() {
        let mut domain: IntervalDomain = [1, 3, 4].into_iter().collect();
        let mut cursor = domain.cursor_mut();

        assert_eq!(cursor.advance(), Some(1));
        cursor.remove();

        assert_eq!(cursor.advance(), Some(3));
        assert_eq!(cursor.advance(), Some(4));
        assert_eq!(domain.to_string(), "[3..4]");
    }

    #[test]
    fn cursor_can_drain_the_whole_domain() {
        let mut domain: IntervalDomain = [1, 2, 4, 7, 8].into_iter().collect();
        let mut cursor = domain.cursor_mut();
        while cursor.advance().is_some() {
            cursor.remove();
        }
        assert!(domain.is_empty());
    }

    #[test]
    #[should_panic(expected = "before the first advance")]
    fn cursor_removal_before_advancing_panics() {
        let mut domain = IntervalDomain::range(1, 3);
        domain.cursor_mut().remove();
    }
}
