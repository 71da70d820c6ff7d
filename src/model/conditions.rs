//! Ready-made constraint conditions for the common equality comparisons.
//!
//! Each function returns a fresh closure suitable for any of the `constrain_*` builder methods;
//! the unary conditions compare the tuple's single value against a fixed value, the binary ones
//! compare the tuple's two values with each other.

use crate::basic_types::ScopedAssignments;

/// A unary condition: the value equals `value`.
pub fn equal_to<T, V>(value: T) -> impl Fn(&ScopedAssignments<'_, T, V>) -> bool
where
    T: PartialEq + Send + Sync + 'static,
{
    move |assignments| *assignments.value(0) == value
}

/// A unary condition: the value differs from `value`.
pub fn not_equal_to<T, V>(value: T) -> impl Fn(&ScopedAssignments<'_, T, V>) -> bool
where
    T: PartialEq + Send + Sync + 'static,
{
    move |assignments| *assignments.value(0) != value
}

/// A binary condition: both values are equal.
pub fn equal<T, V>() -> impl Fn(&ScopedAssignments<'_, T, V>) -> bool
where
    T: PartialEq,
{
    |assignments| assignments.value(0) == assignments.value(1)
}

/// A binary condition: the two values differ.
pub fn not_equal<T, V>() -> impl Fn(&ScopedAssignments<'_, T, V>) -> bool
where
    T: PartialEq,
{
    |assignments| assignments.value(0) != assignments.value(1)
}
