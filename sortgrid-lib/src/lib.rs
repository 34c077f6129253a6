//! Sortable, incrementally loaded grid engine
//!
//! The data and state half of a table widget: column registry and
//! comparators, sort state, pagination cursor with a single-flight fetch
//! guard, and a row store that is replaced on sort and appended on scroll.
//! Rendering, DOM or terminal wiring and transport details stay outside;
//! the view layer feeds in sort requests and scroll-proximity signals and
//! re-reads state whenever the [`signal::Invalidation`] fires.

pub mod column;
pub mod config;
pub mod cursor;
pub mod error;
pub mod model;
pub mod query;
pub mod shared;
pub mod signal;
pub mod sort;
pub mod source;
pub mod store;

mod controller;

pub use controller::*;
