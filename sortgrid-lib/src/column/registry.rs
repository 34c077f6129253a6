//! Column registry and comparator resolution.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Column;
use super::CompareFn;
use super::DefaultRenderer;
use super::Renderer;
use crate::error::GridError;
use crate::model::Row;
use crate::model::Value;
use crate::sort::Direction;

struct ColumnEntry {
    column: Column,
    renderer: Arc<dyn Renderer>,
}

/// Immutable set of columns, looked up by id.
///
/// Renderers are resolved once here; rendering a cell never has to decide
/// between a custom and the default renderer again.
#[derive(Clone)]
pub struct ColumnRegistry {
    entries: Arc<Vec<ColumnEntry>>,
    index: Arc<HashMap<String, usize>>,
}

impl ColumnRegistry {
    /// Builds a registry. Fails with `DuplicateColumn` if two ids collide.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self, GridError> {
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for column in columns {
            if index.contains_key(&column.id) {
                return Err(GridError::DuplicateColumn(column.id));
            }
            index.insert(column.id.clone(), entries.len());

            let renderer = column
                .renderer
                .clone()
                .unwrap_or_else(|| Arc::new(DefaultRenderer));
            entries.push(ColumnEntry { column, renderer });
        }

        Ok(Self {
            entries: Arc::new(entries),
            index: Arc::new(index),
        })
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.entries.iter().map(|e| &e.column)
    }

    /// Looks up a column by id.
    pub fn column(&self, id: &str) -> Result<&Column, GridError> {
        self.entry(id).map(|e| &e.column)
    }

    fn entry(&self, id: &str) -> Result<&ColumnEntry, GridError> {
        self.index
            .get(id)
            .and_then(|&i| self.entries.get(i))
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))
    }

    /// Fails unless `id` names a sortable column.
    pub fn validate_sortable(&self, id: &str) -> Result<(), GridError> {
        let column = self.column(id)?;
        if !column.sortable {
            return Err(GridError::NotSortable(id.to_string()));
        }
        Ok(())
    }

    /// Resolves the row comparator for a column.
    ///
    /// Sortability is not checked here; see [`validate_sortable`](Self::validate_sortable).
    pub fn resolve(&self, id: &str) -> Result<RowComparator, GridError> {
        let column = self.column(id)?;
        Ok(RowComparator {
            column: column.id.clone(),
            compare: column.sort_type.comparator(),
        })
    }

    /// Renders one cell of `row`.
    pub fn render(&self, row: &Row, id: &str) -> Result<String, GridError> {
        let entry = self.entry(id)?;
        Ok(entry.renderer.render(row.value(id)))
    }

    /// Renders every cell of `row` in column order.
    pub fn render_row(&self, row: &Row) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.renderer.render(row.value(&e.column.id)))
            .collect()
    }
}

impl fmt::Debug for ColumnRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns()).finish()
    }
}

/// Comparator bound to one column.
#[derive(Clone)]
pub struct RowComparator {
    column: String,
    compare: CompareFn,
}

impl RowComparator {
    /// Column this comparator reads.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Natural-order comparison of two cell values.
    pub fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        (self.compare)(a, b)
    }

    /// Compares two rows in the given direction.
    pub fn compare(&self, a: &Row, b: &Row, direction: Direction) -> Ordering {
        direction.apply(self.compare_values(a.value(&self.column), b.value(&self.column)))
    }

    /// Stable in-place sort.
    pub fn sort(&self, rows: &mut [Row], direction: Direction) {
        rows.sort_by(|a, b| self.compare(a, b, direction));
    }
}

impl fmt::Debug for RowComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowComparator")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::SortType;

    fn registry() -> ColumnRegistry {
        ColumnRegistry::new([
            Column::new("title", "Name").sortable(),
            Column::new("price", "Price").sortable().number(),
            Column::new("images", "Image"),
            Column::new("len", "Length")
                .sortable()
                .sort_type(SortType::custom(|a, b| {
                    a.to_string().len().cmp(&b.to_string().len())
                })),
        ])
        .unwrap()
    }

    fn rows(prices: &[f64]) -> Vec<Row> {
        prices.iter().map(|p| Row::new().set("price", *p)).collect()
    }

    fn prices(rows: &[Row]) -> Vec<f64> {
        rows.iter().filter_map(|r| r.value("price").as_f64()).collect()
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = ColumnRegistry::new([Column::new("a", "A"), Column::new("a", "B")]).unwrap_err();
        assert!(matches!(err, GridError::DuplicateColumn(id) if id == "a"));
    }

    #[test]
    fn test_resolve_unknown_column() {
        let err = registry().resolve("missing").unwrap_err();
        assert!(matches!(err, GridError::UnknownColumn(id) if id == "missing"));
    }

    #[test]
    fn test_validate_sortable() {
        let registry = registry();
        assert!(registry.validate_sortable("price").is_ok());
        assert!(matches!(
            registry.validate_sortable("images"),
            Err(GridError::NotSortable(_))
        ));
        assert!(matches!(
            registry.validate_sortable("nope"),
            Err(GridError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_descending_is_reverse_of_ascending() {
        let cmp = registry().resolve("price").unwrap();
        let mut asc = rows(&[3.0, 1.0, 20.0, 2.5]);
        let mut desc = asc.clone();
        cmp.sort(&mut asc, Direction::Ascending);
        cmp.sort(&mut desc, Direction::Descending);

        assert_eq!(prices(&asc), vec![1.0, 2.5, 3.0, 20.0]);
        let mut reversed = desc.clone();
        reversed.reverse();
        assert_eq!(asc, reversed);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let cmp = registry().resolve("price").unwrap();
        let mut once = rows(&[5.0, 4.0, 9.0]);
        cmp.sort(&mut once, Direction::Descending);
        let mut twice = once.clone();
        cmp.sort(&mut twice, Direction::Descending);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nan_last_ascending_first_descending() {
        let cmp = registry().resolve("price").unwrap();
        let mut data = vec![
            Row::new().set("price", "n/a"),
            Row::new().set("price", 1.0),
            Row::new().set("price", 0.5),
        ];
        cmp.sort(&mut data, Direction::Ascending);
        assert_eq!(data[2].value("price"), &Value::from("n/a"));
        cmp.sort(&mut data, Direction::Descending);
        assert_eq!(data[0].value("price"), &Value::from("n/a"));
    }

    #[test]
    fn test_custom_comparator_used_as_is() {
        let cmp = registry().resolve("len").unwrap();
        let mut data = vec![
            Row::new().set("len", "ccc"),
            Row::new().set("len", "a"),
            Row::new().set("len", "bb"),
        ];
        cmp.sort(&mut data, Direction::Ascending);
        let order: Vec<String> = data.iter().map(|r| r.value("len").to_string()).collect();
        assert_eq!(order, vec!["a", "bb", "ccc"]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let cmp = registry().resolve("price").unwrap();
        let mut data = vec![
            Row::new().with_key("first").set("price", 1.0),
            Row::new().with_key("second").set("price", 1.0),
            Row::new().with_key("third").set("price", 0.0),
        ];
        cmp.sort(&mut data, Direction::Ascending);
        let keys: Vec<_> = data.iter().filter_map(|r| r.key()).collect();
        assert_eq!(keys, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_render_uses_resolved_renderer() {
        let registry = ColumnRegistry::new([
            Column::new("title", "Name"),
            Column::new("price", "Price").renderer(|v: &Value| format!("${}", v)),
        ])
        .unwrap();
        let row = Row::new().set("title", "Sofa").set("price", 10i64);
        assert_eq!(registry.render_row(&row), vec!["Sofa", "$10"]);
        assert_eq!(registry.render(&row, "price").unwrap(), "$10");
    }
}
