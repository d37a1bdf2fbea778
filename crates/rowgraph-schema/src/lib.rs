pub mod build;
pub mod error;
pub mod meta;
pub mod node;
pub mod process;
pub mod types;
pub mod validate;

use crate::{error::ErrorTree, meta::ElementKind, types::TypeRef};
use thiserror::Error as ThisError;

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, err,
        error::ErrorTree,
        meta::{AnnotationEnvironment, Element, FieldElement, TypeDesc, TypeElement},
        node::*,
        types::{ColumnRef, Primitive, TypeRef},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///
/// Every failure here is a build-time failure. The round that hit it emits
/// nothing.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("element '{element}': expected {expected}, found {found}")]
    ElementKindMismatch {
        element: String,
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("entity not mapped: {target}")]
    EntityNotMapped { target: TypeRef },

    #[error("relation field '{owner}.{field}' does not resolve to an entity type")]
    UnresolvedRelationType { owner: TypeRef, field: String },

    #[error("column field '{owner}.{field}' is not a scalar type")]
    UnsupportedColumnType { owner: TypeRef, field: String },

    #[error("entity '{entity}' has no id field")]
    MissingId { entity: TypeRef },

    #[error("entity '{entity}' declares more than one id field: {fields:?}")]
    DuplicateId { entity: TypeRef, fields: Vec<String> },

    #[error("entity '{entity}' is declared more than once")]
    DuplicateEntity { entity: TypeRef },

    #[error("many-to-many relation '{owner}.{field}' has no join table")]
    MissingJoinTable { owner: TypeRef, field: String },

    #[error("invalid metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("validation failed: {0}")]
    Validation(ErrorTree),
}
