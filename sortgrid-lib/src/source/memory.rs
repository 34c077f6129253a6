//! In-memory data source.

use async_trait::async_trait;

use super::DataSource;
use crate::column::ColumnRegistry;
use crate::error::FetchError;
use crate::model::Row;
use crate::query::Query;

/// Serves a fixed row set as if it were a paginated backend.
///
/// Sorting uses the registry's comparators, so a remote-mode grid over a
/// `MemorySource` orders rows exactly like a local-mode grid would.
/// Passthrough parameters are treated as equality filters on fields.
#[derive(Debug, Clone)]
pub struct MemorySource {
    registry: ColumnRegistry,
    rows: Vec<Row>,
}

impl MemorySource {
    /// Creates a source over `rows`.
    pub fn new(registry: ColumnRegistry, rows: Vec<Row>) -> Self {
        Self { registry, rows }
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no rows are held.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matches(row: &Row, query: &Query) -> bool {
        query
            .params
            .iter()
            .all(|(field, expected)| row.get(field).is_none_or(|v| v.to_string() == *expected))
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, FetchError> {
        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| Self::matches(row, query))
            .cloned()
            .collect();

        if let Some((column, direction)) = &query.sort {
            let comparator = self
                .registry
                .resolve(column)
                .map_err(|e| FetchError::Source(e.to_string()))?;
            comparator.sort(&mut rows, *direction);
        }

        Ok(rows.into_iter().skip(query.offset).take(query.limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::sort::Direction;

    fn source() -> MemorySource {
        let registry = ColumnRegistry::new([Column::new("n", "N").sortable().number()]).unwrap();
        let rows = (1..=10i64)
            .map(|n| Row::new().set("n", n).set("parity", if n % 2 == 0 { "even" } else { "odd" }))
            .collect();
        MemorySource::new(registry, rows)
    }

    fn numbers(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .filter_map(|r| r.value("n").as_f64())
            .map(|n| n as i64)
            .collect()
    }

    #[tokio::test]
    async fn test_pages() {
        let source = source();
        let page = source.fetch(&Query::new().with_page(8, 5)).await.unwrap();
        assert_eq!(numbers(&page), vec![9, 10]);
        let past_end = source.fetch(&Query::new().with_page(10, 5)).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_sorted_descending() {
        let query = Query::new()
            .with_sort("n", Direction::Descending)
            .with_page(0, 3);
        let page = source().fetch(&query).await.unwrap();
        assert_eq!(numbers(&page), vec![10, 9, 8]);
    }

    #[tokio::test]
    async fn test_params_filter() {
        let query = Query::new().with_page(0, 10).with_param("parity", "even");
        let page = source().fetch(&query).await.unwrap();
        assert_eq!(numbers(&page), vec![2, 4, 6, 8, 10]);
    }

    #[tokio::test]
    async fn test_unknown_sort_column() {
        let query = Query::new().with_sort("x", Direction::Ascending).with_page(0, 1);
        assert!(matches!(
            source().fetch(&query).await,
            Err(FetchError::Source(_))
        ));
    }
}
