//! Column definitions, renderers and comparator resolution.

mod compare;
mod registry;

pub use compare::*;
pub use registry::*;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Value;

/// Shared cell comparator.
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// How a column's values are ordered.
#[derive(Clone, Default)]
pub enum SortType {
    /// Locale-style string collation.
    #[default]
    String,
    /// Numeric ordering, NaN last in ascending order.
    Number,
    /// Caller-supplied comparator, used as-is.
    Custom(CompareFn),
}

impl SortType {
    /// Creates a custom sort type from a closure.
    pub fn custom<F>(compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        SortType::Custom(Arc::new(compare))
    }

    /// Returns the natural-order comparator for this sort type.
    pub fn comparator(&self) -> CompareFn {
        match self {
            SortType::String => Arc::new(compare_text),
            SortType::Number => Arc::new(compare_numeric),
            SortType::Custom(compare) => Arc::clone(compare),
        }
    }
}

impl fmt::Debug for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortType::String => f.write_str("String"),
            SortType::Number => f.write_str("Number"),
            SortType::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Turns a cell value into display text.
pub trait Renderer: Send + Sync {
    /// Renders one cell.
    fn render(&self, value: &Value) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn render(&self, value: &Value) -> String {
        self(value)
    }
}

/// Renderer used when a column does not provide one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl Renderer for DefaultRenderer {
    fn render(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Column configuration.
///
/// Columns default to not sortable, string ordering and the default renderer.
///
/// # Examples
///
/// ```
/// use sortgrid_lib::column::Column;
///
/// let columns = vec![
///     Column::new("images", "Image"),
///     Column::new("title", "Name").sortable(),
///     Column::new("price", "Price").sortable().number(),
///     Column::new("status", "Status")
///         .renderer(|v: &sortgrid_lib::model::Value| {
///             if v.as_f64() == Some(1.0) { "Active".into() } else { "Inactive".into() }
///         }),
/// ];
/// ```
#[derive(Clone)]
pub struct Column {
    /// Unique id, also the row field the column reads.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Whether sort requests are accepted.
    pub sortable: bool,
    /// Ordering used for sorting.
    pub sort_type: SortType,
    /// Display transform. `None` means [`DefaultRenderer`].
    pub renderer: Option<Arc<dyn Renderer>>,
}

impl Column {
    /// Creates a column with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sortable: false,
            sort_type: SortType::default(),
            renderer: None,
        }
    }

    /// Makes the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Sets the sort type.
    pub fn sort_type(mut self, sort_type: SortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    /// Shorthand for numeric ordering.
    pub fn number(self) -> Self {
        self.sort_type(SortType::Number)
    }

    /// Shorthand for a custom comparator.
    pub fn custom<F>(self, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.sort_type(SortType::custom(compare))
    }

    /// Sets the cell renderer.
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("sort_type", &self.sort_type)
            .field("renderer", &self.renderer.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Sort types that can be named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    #[default]
    String,
    Number,
}

/// Declarative column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default, rename = "sortType", alias = "sort_type")]
    pub sort_type: SortKind,
}

impl From<ColumnConfig> for Column {
    fn from(config: ColumnConfig) -> Self {
        let column = Column::new(config.id, config.title);
        let column = match config.sort_type {
            SortKind::String => column,
            SortKind::Number => column.number(),
        };
        if config.sortable { column.sortable() } else { column }
    }
}
