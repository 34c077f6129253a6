//! Grid configuration.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::column::ColumnConfig;
use crate::column::ColumnRegistry;
use crate::error::GridError;
use crate::model::Row;
use crate::sort::Direction;
use crate::sort::SortPolicy;
use crate::source::DataSource;

/// Rows per fetch unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Where sorting happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Sort the loaded rows in memory; no network call.
    Local,
    /// Ask the data source for sorted rows and replace the store.
    #[default]
    Remote,
}

/// Options for constructing a [`GridController`](crate::GridController).
///
/// # Example
///
/// ```
/// use sortgrid_lib::config::{GridOptions, SortMode};
/// use sortgrid_lib::sort::Direction;
///
/// let options = GridOptions::new()
///     .with_mode(SortMode::Local)
///     .with_initial_sort("title", Direction::Ascending)
///     .with_cycle_through_unsorted(true);
/// ```
#[derive(Clone)]
pub struct GridOptions {
    /// Local or remote sorting.
    pub mode: SortMode,
    /// Rows requested per fetch.
    pub page_size: usize,
    /// Offset of the first load.
    pub initial_offset: usize,
    /// Sort applied at construction.
    pub initial_sort: Option<(String, Direction)>,
    /// Third-click behaviour.
    pub policy: SortPolicy,
    /// Row provider, required in remote mode.
    pub source: Option<Arc<dyn DataSource>>,
    /// Rows supplied up front, used in local mode.
    pub rows: Vec<Row>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            mode: SortMode::default(),
            page_size: DEFAULT_PAGE_SIZE,
            initial_offset: 0,
            initial_sort: None,
            policy: SortPolicy::default(),
            source: None,
            rows: Vec::new(),
        }
    }
}

impl GridOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort mode.
    pub fn with_mode(mut self, mode: SortMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the page size. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the offset of the first load.
    pub fn with_initial_offset(mut self, offset: usize) -> Self {
        self.initial_offset = offset;
        self
    }

    /// Sets the initial sort.
    pub fn with_initial_sort(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.initial_sort = Some((column.into(), direction));
        self
    }

    /// Chooses whether a third click returns to the unsorted order.
    pub fn with_cycle_through_unsorted(mut self, cycle: bool) -> Self {
        self.policy.cycle_through_unsorted = cycle;
        self
    }

    /// Sets the data source.
    pub fn with_source(mut self, source: impl DataSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets a shared data source.
    pub fn with_shared_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the rows for a local grid.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }
}

impl fmt::Debug for GridOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridOptions")
            .field("mode", &self.mode)
            .field("page_size", &self.page_size)
            .field("initial_offset", &self.initial_offset)
            .field("initial_sort", &self.initial_sort)
            .field("policy", &self.policy)
            .field("source", &self.source.as_ref().map(|_| ".."))
            .field("rows", &self.rows.len())
            .finish()
    }
}

/// Initial sort as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub id: String,
    #[serde(default)]
    pub order: Direction,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Persisted grid configuration.
///
/// ```json
/// {
///   "mode": "remote",
///   "pageSize": 30,
///   "sorted": { "id": "title", "order": "asc" },
///   "columns": [
///     { "id": "title", "title": "Name", "sortable": true },
///     { "id": "price", "title": "Price", "sortable": true, "sortType": "number" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default)]
    pub mode: SortMode,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub initial_offset: usize,
    #[serde(default)]
    pub sorted: Option<SortConfig>,
    #[serde(default)]
    pub cycle_through_unsorted: bool,
    pub columns: Vec<ColumnConfig>,
}

impl GridConfig {
    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        serde_json::from_str(json).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Builds the column registry and options. The data source is left unset.
    pub fn into_parts(self) -> Result<(ColumnRegistry, GridOptions), GridError> {
        let registry = ColumnRegistry::new(self.columns.into_iter().map(Into::into))?;

        let mut options = GridOptions::new()
            .with_mode(self.mode)
            .with_page_size(self.page_size)
            .with_initial_offset(self.initial_offset)
            .with_cycle_through_unsorted(self.cycle_through_unsorted);
        if let Some(sorted) = self.sorted {
            options = options.with_initial_sort(sorted.id, sorted.order);
        }

        Ok((registry, options))
    }
}
