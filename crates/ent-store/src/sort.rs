//! Ordering rules applied to listings.
//!
//! A strategy round-trips through a listing parameter token: an order marker
//! (`+` ascending, `-` descending) followed by a criterion (`key` or
//! `lastModified`). The empty token is the no-op strategy.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};
use crate::traits::FileMeta;

pub const ORDER_ASCENDING: char = '+';
pub const ORDER_DESCENDING: char = '-';
pub const CRITERION_KEY: &str = "key";
pub const CRITERION_LAST_MODIFIED: &str = "lastModified";

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    pub fn marker(&self) -> char {
        match self {
            Self::Ascending => ORDER_ASCENDING,
            Self::Descending => ORDER_DESCENDING,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// How a listing is ordered before it is truncated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortStrategy {
    /// Keep whatever order the backend produced. That order is unspecified.
    #[default]
    NoOp,
    /// Lexicographic byte order of keys.
    ByKey(Order),
    /// Chronological order of modification times.
    ByLastModified(Order),
}

impl SortStrategy {
    /// Decode a listing parameter. The empty string is [`SortStrategy::NoOp`].
    ///
    /// An unknown order marker, a missing criterion, or an unknown criterion
    /// is `InvalidParam`.
    pub fn parse_param(value: &str) -> StoreResult<Self> {
        let mut chars = value.chars();
        let order = match chars.next() {
            None => return Ok(Self::NoOp),
            Some(ORDER_ASCENDING) => Order::Ascending,
            Some(ORDER_DESCENDING) => Order::Descending,
            Some(other) => {
                return Err(StoreError::InvalidParam(format!(
                    "sort {value:?}: order must start with '+' or '-', got {other:?}"
                )))
            }
        };

        match chars.as_str() {
            "" => Err(StoreError::InvalidParam(format!(
                "sort {value:?}: missing criterion"
            ))),
            CRITERION_KEY => Ok(Self::ByKey(order)),
            CRITERION_LAST_MODIFIED => Ok(Self::ByLastModified(order)),
            criterion => Err(StoreError::InvalidParam(format!(
                "sort {value:?}: unknown criterion {criterion:?}"
            ))),
        }
    }

    /// The canonical listing parameter. Empty for [`SortStrategy::NoOp`].
    pub fn encode_param(&self) -> String {
        match self {
            Self::NoOp => String::new(),
            Self::ByKey(order) => format!("{}{CRITERION_KEY}", order.marker()),
            Self::ByLastModified(order) => format!("{}{CRITERION_LAST_MODIFIED}", order.marker()),
        }
    }

    /// Whether `a` sorts before `b`.
    ///
    /// Descending by key treats equal keys as "not less than" (`a >= b`),
    /// matching listings produced by earlier releases.
    pub fn less<T: FileMeta + ?Sized>(&self, a: &T, b: &T) -> bool {
        match self {
            Self::NoOp => false,
            Self::ByKey(Order::Ascending) => a.key() < b.key(),
            Self::ByKey(Order::Descending) => a.key() >= b.key(),
            Self::ByLastModified(Order::Ascending) => a.last_modified() < b.last_modified(),
            Self::ByLastModified(Order::Descending) => a.last_modified() > b.last_modified(),
        }
    }

    /// Total order used by [`SortStrategy::sort`].
    ///
    /// Agrees with [`SortStrategy::less`] on every pair of distinct keys;
    /// ties compare equal so the sort stays stable.
    pub fn compare<T: FileMeta + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        match self {
            Self::NoOp => Ordering::Equal,
            Self::ByKey(order) => order.apply(a.key().cmp(b.key())),
            Self::ByLastModified(order) => order.apply(a.last_modified().cmp(&b.last_modified())),
        }
    }

    /// Sort in place. A no-op strategy leaves the slice untouched.
    pub fn sort<T: FileMeta>(&self, files: &mut [T]) {
        if matches!(self, Self::NoOp) {
            return;
        }
        files.sort_by(|a, b| self.compare(a, b));
    }
}

impl FromStr for SortStrategy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_param(s)
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_param())
    }
}
