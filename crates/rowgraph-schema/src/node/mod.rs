//! Entity graph model.
//!
//! Built by the processors during one round, then only read. Associations
//! refer to their target by `TypeRef`; the target definition is always looked
//! up through `EntityGraphs`.

mod association;
mod entity;
mod graphs;

pub use association::*;
pub use entity::*;
pub use graphs::*;
