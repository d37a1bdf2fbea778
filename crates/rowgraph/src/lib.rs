//! ## Crate layout
//! - `build`: mapping plans, the reference interpreter, and code rendering.
//! - `config`: the `rowgraph.toml` loader used by build scripts.
//! - `core`: runtime types generated functions are written against.
//! - `schema`: metadata model, processors, and the entity graph.
//!
//! Generated mapping functions only name items re-exported at the crate root.

pub use rowgraph_build as build;
pub use rowgraph_config_build as config;
pub use rowgraph_core as core;
pub use rowgraph_schema as schema;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Runtime
//

pub use rowgraph_core::{FromRow, FromValue, MemRow, RootMap, Row, Value};

//
// Macros
//

pub use rowgraph_build::build;

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
}
