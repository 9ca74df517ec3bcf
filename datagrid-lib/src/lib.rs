//! Data-state engine for tabular grids
//!
//! Holds the rows behind a grid and everything a user does to them: search,
//! per-column filters, single-column sort, pagination and selection. Rows
//! come either from a static dataset, processed entirely in memory, or from
//! an HTTP endpoint paged with continuation tokens. Rendering is left to the
//! host, which observes the grid through [`grid::GridEvent`]s.

pub mod api;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod query;

mod client;

pub use client::*;
pub use config::GridConfig;
pub use error::Error;
pub use grid::Grid;
