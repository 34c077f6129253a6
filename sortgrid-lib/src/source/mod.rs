//! Data sources the grid pulls rows from.
//!
//! The grid only ever has one fetch outstanding per generation and never
//! cancels a request; a source that needs a deadline enforces it itself and
//! reports [`FetchError::Timeout`].

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::Row;
use crate::query::Query;

/// Provider of rows for a remote-mode grid.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use sortgrid_lib::error::FetchError;
/// use sortgrid_lib::model::Row;
/// use sortgrid_lib::query::Query;
/// use sortgrid_lib::source::DataSource;
///
/// struct Products;
///
/// #[async_trait]
/// impl DataSource for Products {
///     async fn fetch(&self, query: &Query) -> Result<Vec<Row>, FetchError> {
///         load_products(query.offset, query.limit).await
///     }
/// }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the rows described by `query`.
    ///
    /// Returning fewer than `query.limit` rows is fine; an empty result past
    /// the first page marks the end of the data.
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, FetchError>;
}
