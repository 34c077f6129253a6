//! Grid controller: sort requests, scroll signals and fetch orchestration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::DateTime;
use chrono::Utc;
use log::{debug, trace, warn};

use crate::column::ColumnRegistry;
use crate::config::GridOptions;
use crate::config::SortMode;
use crate::cursor::FetchKind;
use crate::cursor::FetchTicket;
use crate::cursor::PaginationCursor;
use crate::error::GridError;
use crate::model::Row;
use crate::query::Query;
use crate::query::range_params;
use crate::signal::Invalidation;
use crate::sort::Direction;
use crate::sort::SortPolicy;
use crate::sort::SortState;
use crate::source::DataSource;
use crate::store::RowStore;

/// Result of an operation that may fetch or reorder rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The store was replaced with this many rows.
    Replaced(usize),
    /// This many rows were appended.
    Appended(usize),
    /// An incremental fetch returned nothing; no more pages will be requested.
    EndReached,
    /// Loaded rows were reordered in memory.
    Reordered,
    /// Nothing was done: a fetch is in flight, the end was reached, the
    /// view is not near the end, or there is no data source.
    Skipped,
    /// The result arrived after a reset superseded it and was dropped.
    Discarded,
}

#[derive(Debug)]
struct GridInner {
    sort: SortState,
    cursor: PaginationCursor,
    store: RowStore,
    params: BTreeMap<String, String>,
    /// Set once rows were supplied or a first page landed.
    loaded: bool,
}

/// State engine behind a sortable, incrementally loaded table.
///
/// `GridController` owns the sort state, the pagination cursor and the row
/// store, and talks to a [`DataSource`]. It is cheap to clone; clones share
/// state, so one clone can drive scroll signals while another handles
/// header clicks.
///
/// Locks are never held across an `await`: a fetch is issued under a
/// [`FetchTicket`] and its result is applied only if the ticket's generation
/// is still current when it lands.
///
/// # Example
///
/// ```ignore
/// let registry = ColumnRegistry::new([
///     Column::new("title", "Name").sortable(),
///     Column::new("price", "Price").sortable().number(),
/// ])?;
/// let source = HttpSource::new(HttpSourceConfig::new(url))?;
/// let grid = GridController::open(registry, GridOptions::new().with_source(source)).await?;
///
/// grid.request_sort("price").await?;          // ascending, page 0 replaced
/// grid.on_scroll_proximity(true).await?;      // next page appended
/// for cells in grid.render_rows() {
///     println!("{}", cells.join(" | "));
/// }
/// ```
#[derive(Clone)]
pub struct GridController {
    registry: ColumnRegistry,
    mode: SortMode,
    policy: SortPolicy,
    source: Option<Arc<dyn DataSource>>,
    inner: Arc<RwLock<GridInner>>,
    invalidation: Invalidation,
}

impl GridController {
    /// Creates a controller without fetching.
    ///
    /// Fails with `InvalidSort` if the initial sort names an unknown or
    /// non-sortable column, and with `MissingDataSource` in remote mode
    /// without a source. In local mode the supplied rows are sorted by the
    /// initial sort right away.
    pub fn new(registry: ColumnRegistry, options: GridOptions) -> Result<Self, GridError> {
        let sort = match options.initial_sort {
            Some((column, direction)) => {
                registry
                    .validate_sortable(&column)
                    .map_err(|e| GridError::invalid_sort(&column, e))?;
                SortState::sorted_by(column, direction)
            }
            None => SortState::Unsorted,
        };

        if options.mode == SortMode::Remote && options.source.is_none() {
            return Err(GridError::MissingDataSource);
        }

        let controller = Self {
            registry,
            mode: options.mode,
            policy: options.policy,
            source: options.source,
            inner: Arc::new(RwLock::new(GridInner {
                sort,
                cursor: PaginationCursor::with_initial_offset(
                    options.page_size,
                    options.initial_offset,
                ),
                loaded: !options.rows.is_empty(),
                store: RowStore::with_rows(options.rows),
                params: BTreeMap::new(),
            })),
            invalidation: Invalidation::new(),
        };

        if controller.mode == SortMode::Local {
            let mut inner = controller.write();
            controller.sort_locally(&mut inner)?;
        }

        Ok(controller)
    }

    /// Creates a controller and, in remote mode, performs the initial fetch.
    ///
    /// A failed initial fetch is returned as an error. To keep the grid
    /// after such a failure, use [`new`](Self::new) followed by
    /// [`load`](Self::load).
    pub async fn open(registry: ColumnRegistry, options: GridOptions) -> Result<Self, GridError> {
        let controller = Self::new(registry, options)?;
        if controller.mode == SortMode::Remote {
            controller.load().await?;
        }
        Ok(controller)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, GridInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GridInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Column registry.
    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    /// Sort mode.
    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Third-click policy.
    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    /// Render invalidation signal for the view layer.
    pub fn invalidation(&self) -> &Invalidation {
        &self.invalidation
    }

    /// Current rows in display order. Shares storage with the grid.
    pub fn rows(&self) -> Arc<Vec<Row>> {
        self.read().store.snapshot()
    }

    /// Number of loaded rows.
    pub fn len(&self) -> usize {
        self.read().store.len()
    }

    /// Returns `true` if no rows are loaded.
    pub fn is_empty(&self) -> bool {
        self.read().store.is_empty()
    }

    /// Current sort state.
    pub fn sort_state(&self) -> SortState {
        self.read().sort.clone()
    }

    /// `true` once the source ran out of rows.
    pub fn end_reached(&self) -> bool {
        self.read().cursor.end_reached()
    }

    /// `true` while a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.read().cursor.fetch_in_flight()
    }

    /// Passthrough parameters sent with every fetch.
    pub fn params(&self) -> BTreeMap<String, String> {
        self.read().params.clone()
    }

    /// Query for the page at the cursor's current offset.
    pub fn query(&self) -> Query {
        let inner = self.read();
        self.build_query(&inner, inner.cursor.offset(), inner.cursor.page_size())
    }

    /// Every loaded row rendered through the column renderers.
    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.read()
            .store
            .rows()
            .iter()
            .map(|row| self.registry.render_row(row))
            .collect()
    }

    /// Whether a scroll signal would start a fetch right now.
    pub fn should_fetch_more(&self, near_end: impl FnOnce() -> bool) -> bool {
        self.source.is_some() && self.read().cursor.should_fetch_more(near_end)
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Header click on `column`: advances the sort state and re-sorts.
    ///
    /// Fails with `UnknownColumn` or `NotSortable` without touching any state.
    pub async fn request_sort(&self, column: &str) -> Result<FetchOutcome, GridError> {
        self.registry.validate_sortable(column)?;
        self.apply_sort(|current| current.toggled(column, self.policy))
            .await
    }

    /// Sorts by `column` in an explicit direction.
    pub async fn sort_by(
        &self,
        column: &str,
        direction: Direction,
    ) -> Result<FetchOutcome, GridError> {
        self.registry.validate_sortable(column)?;
        self.apply_sort(|_| SortState::sorted_by(column, direction))
            .await
    }

    /// Returns to the unsorted order.
    pub async fn clear_sort(&self) -> Result<FetchOutcome, GridError> {
        self.apply_sort(|_| SortState::Unsorted).await
    }

    async fn apply_sort(
        &self,
        next: impl FnOnce(&SortState) -> SortState,
    ) -> Result<FetchOutcome, GridError> {
        let (ticket, query) = {
            let mut inner = self.write();
            let sort = next(&inner.sort);
            debug!("Sort {:?} -> {:?}", inner.sort, sort);
            inner.sort = sort;

            if self.mode == SortMode::Local {
                self.sort_locally(&mut inner)?;
                drop(inner);
                self.invalidation.invalidate();
                return Ok(FetchOutcome::Reordered);
            }

            inner.cursor.reset();
            self.begin(&mut inner, FetchKind::Replace)
        };
        self.run(ticket, query).await
    }

    fn sort_locally(&self, inner: &mut GridInner) -> Result<(), GridError> {
        match inner.sort.as_pair() {
            Some((column, direction)) => {
                let comparator = self.registry.resolve(column)?;
                inner
                    .store
                    .sort_by(|a, b| comparator.compare(a, b, direction));
            }
            None => inner.store.restore_arrival_order(),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Loads the first page at the configured initial offset.
    ///
    /// Once rows are loaded this is a [`reload`](Self::reload): the cursor
    /// has moved on and only a reset brings it back to the first page.
    pub async fn load(&self) -> Result<FetchOutcome, GridError> {
        if self.source.is_none() {
            return Ok(FetchOutcome::Skipped);
        }
        if self.read().loaded {
            return self.reload().await;
        }
        let (ticket, query) = {
            let mut inner = self.write();
            if inner.cursor.fetch_in_flight() {
                return Ok(FetchOutcome::Skipped);
            }
            self.begin(&mut inner, FetchKind::Replace)
        };
        self.run(ticket, query).await
    }

    /// Resets pagination and replaces the rows with a fresh first page.
    pub async fn reload(&self) -> Result<FetchOutcome, GridError> {
        if self.source.is_none() {
            return Ok(FetchOutcome::Skipped);
        }
        let (ticket, query) = {
            let mut inner = self.write();
            inner.cursor.reset();
            self.begin(&mut inner, FetchKind::Replace)
        };
        self.run(ticket, query).await
    }

    /// Scroll signal from the view. `near_end` is the view's verdict on
    /// whether the viewport is close enough to the last row.
    ///
    /// Starts at most one fetch; signals while a fetch is in flight or after
    /// the end was reached are dropped.
    pub async fn on_scroll_proximity(&self, near_end: bool) -> Result<FetchOutcome, GridError> {
        if self.source.is_none() {
            return Ok(FetchOutcome::Skipped);
        }
        let (ticket, query) = {
            let mut inner = self.write();
            if !inner.cursor.should_fetch_more(|| near_end) {
                trace!("Scroll signal dropped");
                return Ok(FetchOutcome::Skipped);
            }
            let ticket = inner.cursor.begin_fetch();
            let query = self.build_query(&inner, ticket.offset(), ticket.limit());
            (ticket, query)
        };
        self.run(ticket, query).await
    }

    /// Sets one passthrough parameter and reloads.
    pub async fn set_param(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<FetchOutcome, GridError> {
        self.set_params([(key.into(), value.into())]).await
    }

    /// Merges passthrough parameters and reloads with the current sort.
    pub async fn set_params<I, K, V>(&self, params: I) -> Result<FetchOutcome, GridError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        {
            let mut inner = self.write();
            inner
                .params
                .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        self.reload().await
    }

    /// Narrows the data to a date range (`from`/`to` parameters) and reloads.
    pub async fn set_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<FetchOutcome, GridError> {
        let (from, to) = range_params(from, to);
        self.set_params([("from", from), ("to", to)]).await
    }

    /// Replaces the rows directly (local data supply).
    ///
    /// Outstanding fetches are superseded; in local mode the current sort is
    /// applied to the new rows.
    pub fn set_rows(&self, rows: Vec<Row>) -> Result<(), GridError> {
        {
            let mut inner = self.write();
            inner.cursor.reset();
            inner.store.replace(rows);
            inner.loaded = true;
            if self.mode == SortMode::Local {
                self.sort_locally(&mut inner)?;
            }
        }
        self.invalidation.invalidate();
        Ok(())
    }

    fn begin(&self, inner: &mut GridInner, kind: FetchKind) -> (FetchTicket, Query) {
        let ticket = match kind {
            FetchKind::Replace => inner.cursor.begin_reload(),
            FetchKind::Append => inner.cursor.begin_fetch(),
        };
        let query = self.build_query(inner, ticket.offset(), ticket.limit());
        (ticket, query)
    }

    fn build_query(&self, inner: &GridInner, offset: usize, limit: usize) -> Query {
        let mut query = Query::new().with_page(offset, limit);
        if self.mode == SortMode::Remote
            && let Some((column, direction)) = inner.sort.as_pair()
        {
            query = query.with_sort(column, direction);
        }
        query.params = inner.params.clone();
        query
    }

    async fn run(&self, ticket: FetchTicket, query: Query) -> Result<FetchOutcome, GridError> {
        let source = self.source.as_ref().ok_or(GridError::MissingDataSource)?;
        debug!(
            "Fetch {:?} generation={} offset={} limit={}",
            ticket.kind(),
            ticket.generation(),
            ticket.offset(),
            ticket.limit()
        );

        let result = source.fetch(&query).await;

        let mut inner = self.write();
        if !inner.cursor.is_current(&ticket) {
            debug!(
                "Discarding stale fetch generation={} (current {})",
                ticket.generation(),
                inner.cursor.generation()
            );
            return Ok(FetchOutcome::Discarded);
        }

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                inner.cursor.fail_fetch(&ticket);
                drop(inner);
                warn!("Fetch at offset {} failed: {}", ticket.offset(), e);
                if ticket.kind() == FetchKind::Replace {
                    self.invalidation.invalidate();
                }
                return Err(e.into());
            }
        };

        let count = rows.len();
        inner.cursor.complete_fetch(count);
        let outcome = match ticket.kind() {
            FetchKind::Replace => {
                inner.store.replace(rows);
                inner.loaded = true;
                if self.mode == SortMode::Local {
                    self.sort_locally(&mut inner)?;
                }
                FetchOutcome::Replaced(count)
            }
            FetchKind::Append if inner.cursor.end_reached() => {
                debug!("End of data at offset {}", ticket.offset());
                FetchOutcome::EndReached
            }
            FetchKind::Append => {
                inner.store.append(rows);
                FetchOutcome::Appended(count)
            }
        };
        drop(inner);

        self.invalidation.invalidate();
        Ok(outcome)
    }
}

impl fmt::Debug for GridController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("GridController")
            .field("mode", &self.mode)
            .field("sort", &inner.sort)
            .field("cursor", &inner.cursor)
            .field("rows", &inner.store.len())
            .finish()
    }
}
