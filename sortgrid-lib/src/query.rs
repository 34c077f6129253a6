//! Query handed to a data source.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;

use crate::sort::Direction;

/// Parameters for one fetch.
///
/// The grid owns `sort`, `offset` and `limit`. Everything else travels in
/// `params` untouched, so sibling widgets (a date range picker, say) can
/// narrow the data without the grid knowing what the parameters mean.
///
/// # Example
///
/// ```
/// use sortgrid_lib::query::Query;
/// use sortgrid_lib::sort::Direction;
///
/// let query = Query::new()
///     .with_sort("title", Direction::Descending)
///     .with_page(30, 30)
///     .with_param("category", "sofas");
///
/// let pairs = query.to_pairs();
/// assert_eq!(pairs[0], ("_sort".to_string(), "title".to_string()));
/// assert_eq!(pairs[3], ("_end".to_string(), "60".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Sort column and direction, if sorted.
    pub sort: Option<(String, Direction)>,
    /// First row to return.
    pub offset: usize,
    /// Maximum number of rows to return.
    pub limit: usize,
    /// Caller-supplied passthrough parameters.
    pub params: BTreeMap<String, String>,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort.
    pub fn with_sort(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.sort = Some((column.into(), direction));
        self
    }

    /// Sets offset and limit.
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Adds a passthrough parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Adds `from`/`to` passthrough parameters as RFC 3339 timestamps.
    pub fn with_range(self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        let (from, to) = range_params(from, to);
        self.with_param("from", from).with_param("to", to)
    }

    /// Sort column, if sorted.
    pub fn sort_column(&self) -> Option<&str> {
        self.sort.as_ref().map(|(column, _)| column.as_str())
    }

    /// Sort direction, if sorted.
    pub fn sort_direction(&self) -> Option<Direction> {
        self.sort.as_ref().map(|(_, direction)| *direction)
    }

    /// Key/value pairs in the backend's query-string convention.
    ///
    /// `_sort` and `_order` (only when sorted), `_start` and `_end`
    /// (exclusive), then passthrough parameters in key order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(4 + self.params.len());
        if let Some((column, direction)) = &self.sort {
            pairs.push(("_sort".to_string(), column.clone()));
            pairs.push(("_order".to_string(), direction.as_str().to_string()));
        }
        pairs.push(("_start".to_string(), self.offset.to_string()));
        pairs.push((
            "_end".to_string(),
            self.offset.saturating_add(self.limit).to_string(),
        ));
        pairs.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Formats a date range the way range pickers pass it along.
pub fn range_params(from: DateTime<Utc>, to: DateTime<Utc>) -> (String, String) {
    (
        from.to_rfc3339_opts(SecondsFormat::Millis, true),
        to.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}
