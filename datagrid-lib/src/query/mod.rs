//! Local query pipeline: search, filter and sort over in-memory rows.

mod compare;
mod filter;
mod order;
mod search;

pub use compare::*;
pub use filter::*;
pub use order::*;
pub use search::*;
