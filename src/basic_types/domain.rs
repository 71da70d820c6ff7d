use std::fmt::Debug;

/// A finite, ordered collection of candidate values for a single variable.
///
/// A domain supports indexed access in iteration order, membership queries, idempotent insertion
/// and removal by value or by position. The two implementations are [`IntervalDomain`] for
/// integers (stored as a union of closed intervals) and [`ListDomain`] for arbitrary value types
/// (stored as a plain list).
///
/// [`IntervalDomain`]: crate::IntervalDomain
/// [`ListDomain`]: crate::ListDomain
pub trait Domain {
    /// The type of the values held by the domain.
    type Value: Clone + PartialEq + Debug;

    /// The removing cursor type handed out by [`Domain::cursor_mut`].
    type CursorMut<'a>: DomainCursor<Value = Self::Value>
    where
        Self: 'a;

    /// The number of values in the domain.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `index` in iteration order. Panics when `index >= len`.
    fn get(&self, index: usize) -> Self::Value;

    /// The position of `value` in iteration order, or `None` when absent.
    fn position_of(&self, value: &Self::Value) -> Option<usize>;

    fn contains(&self, value: &Self::Value) -> bool {
        self.position_of(value).is_some()
    }

    /// Inserts `value`; inserting a value which is already present is a no-op.
    fn insert(&mut self, value: Self::Value);

    /// Removes `value` and reports whether it was present.
    fn remove_value(&mut self, value: &Self::Value) -> bool;

    /// Removes and returns the value at `index`. Panics when `index >= len`.
    fn remove_at(&mut self, index: usize) -> Self::Value;

    fn clear(&mut self);

    /// Iterates the values in domain order.
    fn iter(&self) -> impl Iterator<Item = Self::Value> + '_;

    /// Inserts every value of `other` into this domain.
    fn insert_all(&mut self, other: &Self)
    where
        Self: Sized,
    {
        // The borrows do not overlap: `other` is a different domain instance.
        let values = other.iter().collect::<Vec<_>>();
        for value in values {
            self.insert(value);
        }
    }

    /// A forward cursor which additionally supports removing the values it yields.
    fn cursor_mut(&mut self) -> Self::CursorMut<'_>;
}

/// A resettable forward cursor over a [`Domain`] which supports removal during iteration.
///
/// After [`DomainCursor::remove`], the cursor is repositioned such that the following
/// [`DomainCursor::advance`] yields the value which logically followed the removed one, no matter
/// how the removal reshaped the underlying storage.
pub trait DomainCursor {
    type Value;

    /// Steps to the next value and returns it, or returns `None` when the cursor is at the last
    /// value. A `None` does not move the cursor.
    fn advance(&mut self) -> Option<Self::Value>;

    /// The position of the value the cursor currently rests on, or `None` before the first
    /// [`DomainCursor::advance`].
    fn current_index(&self) -> Option<usize>;

    /// Removes the value the cursor currently rests on.
    ///
    /// Panics when the cursor has not yielded a value yet.
    fn remove(&mut self);

    /// Returns the cursor to the before-first position.
    fn reset(&mut self);
}
