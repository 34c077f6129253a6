//! Ordered row storage.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::Row;

/// Ordered rows shown by the grid.
///
/// Rows are held behind an `Arc` so readers get a snapshot without copying;
/// a mutation while a snapshot is alive copies once (copy-on-write).
/// Each row also remembers when it arrived, which lets a local grid go back
/// to arrival order when the sort is cleared.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Arc<Vec<Row>>,
    arrival: Vec<u64>,
    next_seq: u64,
}

impl RowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `rows` in the given order.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        let mut store = Self::new();
        store.replace(rows);
        store
    }

    /// Shared snapshot of the current rows.
    pub fn snapshot(&self) -> Arc<Vec<Row>> {
        Arc::clone(&self.rows)
    }

    /// Rows as a slice.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds a row by its key.
    pub fn find(&self, key: &str) -> Option<(usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.key() == Some(key))
    }

    /// Discards every row and stores `rows` instead.
    pub fn replace(&mut self, rows: Vec<Row>) {
        self.next_seq = rows.len() as u64;
        self.arrival = (0..self.next_seq).collect();
        self.rows = Arc::new(rows);
    }

    /// Adds `rows` after the existing ones, keeping their order.
    pub fn append(&mut self, rows: Vec<Row>) {
        let start = self.next_seq;
        self.next_seq += rows.len() as u64;
        self.arrival.extend(start..self.next_seq);
        Arc::make_mut(&mut self.rows).extend(rows);
    }

    /// Reorders rows in place with a stable sort.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        let rows = &self.rows;
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&a, &b| compare(&rows[a], &rows[b]));
        self.permute(&order);
    }

    /// Restores the order in which rows arrived.
    pub fn restore_arrival_order(&mut self) {
        let arrival = &self.arrival;
        let mut order: Vec<usize> = (0..arrival.len()).collect();
        order.sort_by_key(|&i| arrival[i]);
        self.permute(&order);
    }

    fn permute(&mut self, order: &[usize]) {
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            return;
        }
        let rows: Vec<Row> = order.iter().map(|&i| self.rows[i].clone()).collect();
        self.arrival = order.iter().map(|&i| self.arrival[i]).collect();
        self.rows = Arc::new(rows);
    }
}
