//! Runtime contract for rowgraph-generated mapping functions: scalar values,
//! row access, entity decoding, and the insertion-ordered root map.
#![warn(unreachable_pub)]

pub mod root_map;
pub mod row;
pub mod value;

pub use root_map::RootMap;
pub use row::{FromRow, MemRow, Row};
pub use value::{FromValue, Value};

///
/// Prelude
///
/// Vocabulary needed by generated code and hand-written `FromRow` impls.
///

pub mod prelude {
    pub use crate::{
        root_map::RootMap,
        row::{FromRow, Row},
        value::{FromValue, Value},
    };
}
