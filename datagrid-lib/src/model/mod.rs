//! Row, value and column models

mod column;
pub(crate) mod date;
mod row;
mod row_serde;
mod value;

pub use column::*;
pub use row::*;
pub use value::*;
