//! Grid state engine
//!
//! A [`Grid`] owns one [`GridState`]. Every user action is a [`GridAction`]
//! reduced against that state; actions that need server data return
//! [`Effect::Load`], which [`Grid::apply`] runs and [`Grid::dispatch`]
//! leaves to the caller.

mod action;
mod engine;
mod events;
mod identity;
mod pagination;
mod reducer;
mod selection;
mod state;

pub use action::*;
pub use engine::*;
pub use events::*;
pub use identity::*;
pub use pagination::*;
pub use reducer::Transition;
pub use selection::*;
pub use state::*;
