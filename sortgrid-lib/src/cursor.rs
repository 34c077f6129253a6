//! Pagination cursor and single-flight fetch guard.

/// What a completed fetch does to the row store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page after a reset: replaces all rows.
    Replace,
    /// Next page: appended after the existing rows.
    Append,
}

/// Handle for one issued fetch.
///
/// The generation ties the fetch to the cursor state it was issued under;
/// after a `reset()` the ticket is stale and its result must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    offset: usize,
    limit: usize,
    kind: FetchKind,
}

impl FetchTicket {
    /// Cursor generation at issue time.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// First row requested.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of rows requested.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Replace or append.
    pub fn kind(&self) -> FetchKind {
        self.kind
    }
}

/// Offset tracking for incremental loading.
///
/// `offset` is the start of the most recently requested page. It only grows,
/// except for `reset()`, which returns it to 0 and starts a new generation.
/// At most one fetch is in flight; signals that arrive meanwhile are dropped.
#[derive(Debug, Clone)]
pub struct PaginationCursor {
    offset: usize,
    page_size: usize,
    end_reached: bool,
    in_flight: bool,
    generation: u64,
    /// Set when the last fetch failed: the next begin repeats it.
    retry: Option<FetchKind>,
}

impl PaginationCursor {
    /// Creates a cursor at offset 0.
    pub fn new(page_size: usize) -> Self {
        Self::with_initial_offset(page_size, 0)
    }

    /// Creates a cursor whose first load starts at `offset`.
    pub fn with_initial_offset(page_size: usize, offset: usize) -> Self {
        Self {
            offset,
            page_size: page_size.max(1),
            end_reached: false,
            in_flight: false,
            generation: 0,
            retry: None,
        }
    }

    /// Start of the most recently requested page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `true` once an incremental fetch came back empty.
    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    /// `true` while a fetch is outstanding.
    pub fn fetch_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` if the ticket was issued under the current generation.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Returns to offset 0 and invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.end_reached = false;
        self.in_flight = false;
        self.retry = None;
        self.generation += 1;
    }

    /// Whether a scroll signal should start a fetch.
    ///
    /// The proximity predicate is only evaluated when the guards pass.
    pub fn should_fetch_more(&self, near_end: impl FnOnce() -> bool) -> bool {
        !self.in_flight && !self.end_reached && near_end()
    }

    /// Starts the next incremental fetch.
    ///
    /// Advances the offset by one page, unless the previous fetch failed, in
    /// which case the same request is repeated.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let kind = match self.retry.take() {
            Some(kind) => kind,
            None => {
                self.offset += self.page_size;
                FetchKind::Append
            }
        };
        self.in_flight = true;
        self.ticket(kind)
    }

    /// Starts a replacing fetch at the current offset.
    pub fn begin_reload(&mut self) -> FetchTicket {
        self.retry = None;
        self.in_flight = true;
        self.ticket(FetchKind::Replace)
    }

    fn ticket(&self, kind: FetchKind) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            offset: self.offset,
            limit: self.page_size,
            kind,
        }
    }

    /// Records a successful fetch of `result_count` rows.
    pub fn complete_fetch(&mut self, result_count: usize) {
        self.in_flight = false;
        if result_count == 0 && self.offset > 0 {
            self.end_reached = true;
        }
    }

    /// Records a failed fetch. Releases the guard so a later signal retries.
    pub fn fail_fetch(&mut self, ticket: &FetchTicket) {
        self.in_flight = false;
        self.retry = Some(ticket.kind);
    }
}
