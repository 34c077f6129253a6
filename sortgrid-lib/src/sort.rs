//! Sort direction and sort state transitions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::GridError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Natural order of the column comparator.
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    /// Exact inverse of the natural order.
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl Direction {
    /// Wire form used in queries: `asc` or `desc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }

    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    /// Applies the direction to a natural-order comparison result.
    ///
    /// Descending is always the reversal of the same comparison, never a
    /// separate comparator.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Ascending),
            "desc" => Ok(Direction::Descending),
            other => Err(GridError::InvalidDirection(other.to_string())),
        }
    }
}

/// What a repeated click on the sorted column does after `Descending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortPolicy {
    /// `true`: asc → desc → unsorted. `false`: asc → desc → asc.
    #[serde(default)]
    pub cycle_through_unsorted: bool,
}

impl SortPolicy {
    /// Policy that returns to the server default order on the third click.
    pub fn cycling() -> Self {
        Self {
            cycle_through_unsorted: true,
        }
    }

    /// Policy that only toggles between ascending and descending.
    pub fn two_state() -> Self {
        Self {
            cycle_through_unsorted: false,
        }
    }
}

/// Current sort of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortState {
    /// No sort applied: the source's default order.
    #[default]
    Unsorted,
    /// Sorted by one column.
    SortedBy {
        /// Column id.
        column: String,
        /// Direction.
        direction: Direction,
    },
}

impl SortState {
    /// Creates a sorted state.
    pub fn sorted_by(column: impl Into<String>, direction: Direction) -> Self {
        SortState::SortedBy {
            column: column.into(),
            direction,
        }
    }

    /// Returns the sorted column id, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            SortState::Unsorted => None,
            SortState::SortedBy { column, .. } => Some(column),
        }
    }

    /// Returns the direction, if sorted.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            SortState::Unsorted => None,
            SortState::SortedBy { direction, .. } => Some(*direction),
        }
    }

    /// Returns `true` unless the state is `Unsorted`.
    pub fn is_sorted(&self) -> bool {
        !matches!(self, SortState::Unsorted)
    }

    /// State after a sort request on `column`.
    ///
    /// The column must already be validated as sortable.
    pub fn toggled(&self, column: &str, policy: SortPolicy) -> SortState {
        match self {
            SortState::SortedBy {
                column: current,
                direction: Direction::Ascending,
            } if current == column => SortState::sorted_by(column, Direction::Descending),
            SortState::SortedBy {
                column: current,
                direction: Direction::Descending,
            } if current == column => {
                if policy.cycle_through_unsorted {
                    SortState::Unsorted
                } else {
                    SortState::sorted_by(column, Direction::Ascending)
                }
            }
            _ => SortState::sorted_by(column, Direction::Ascending),
        }
    }

    /// `(column, direction)` pair for queries.
    pub fn as_pair(&self) -> Option<(&str, Direction)> {
        match self {
            SortState::Unsorted => None,
            SortState::SortedBy { column, direction } => Some((column, *direction)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_sorts_ascending() {
        let next = SortState::Unsorted.toggled("price", SortPolicy::default());
        assert_eq!(next, SortState::sorted_by("price", Direction::Ascending));
    }

    #[test]
    fn test_second_request_sorts_descending() {
        let state = SortState::sorted_by("price", Direction::Ascending);
        let next = state.toggled("price", SortPolicy::default());
        assert_eq!(next, SortState::sorted_by("price", Direction::Descending));
    }

    #[test]
    fn test_other_column_restarts_ascending() {
        let state = SortState::sorted_by("price", Direction::Descending);
        let next = state.toggled("title", SortPolicy::cycling());
        assert_eq!(next, SortState::sorted_by("title", Direction::Ascending));
    }

    #[test]
    fn test_third_request_two_state_policy() {
        let state = SortState::sorted_by("price", Direction::Descending);
        let next = state.toggled("price", SortPolicy::two_state());
        assert_eq!(next, SortState::sorted_by("price", Direction::Ascending));
    }

    #[test]
    fn test_third_request_cycling_policy() {
        let state = SortState::sorted_by("price", Direction::Descending);
        assert_eq!(state.toggled("price", SortPolicy::cycling()), SortState::Unsorted);
        assert_eq!(
            SortState::Unsorted.toggled("price", SortPolicy::cycling()),
            SortState::sorted_by("price", Direction::Ascending)
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Ascending);
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Descending);
        assert!(matches!(
            "up".parse::<Direction>(),
            Err(GridError::InvalidDirection(s)) if s == "up"
        ));
    }

    #[test]
    fn test_direction_apply_is_inverse() {
        for ord in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            assert_eq!(Direction::Descending.apply(ord), Direction::Ascending.apply(ord).reverse());
        }
    }
}
