//! Mapping plans: the abstract statement form of a generated mapping function.
//!
//! A plan says what the function does, not how it is spelled. `render` turns
//! it into Rust tokens and `exec` runs it directly over in-memory rows.

mod generate;

pub use generate::MappingGenerator;

use derive_more::Display;
use rowgraph_config_build::Lookup;
use rowgraph_schema::types::{ColumnRef, Primitive, TypeRef};
use serde::Serialize;

///
/// Var
/// Local variable of a generated function.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Var(String);

impl Var {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Fixed locals shared by every plan.
pub const ROWS: &str = "rows";
pub const ROW: &str = "row";
pub const ROOTS: &str = "roots";
pub const ROOT: &str = "root";
pub const ROOT_ID: &str = "root_id";

///
/// MappingFn
///
/// `rows -> RootMap<key, entity>` for one entity.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MappingFn {
    pub entity: TypeRef,
    pub name: String,

    /// Companion returning the roots as a list, if configured.
    pub list_name: Option<String>,

    pub key: Primitive,
    pub rows: Var,
    pub body: Vec<Stmt>,
}

impl MappingFn {
    /// Names of the mapping functions this one calls.
    #[must_use]
    pub fn calls(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for stmt in &self.body {
            stmt.collect_calls(&mut out);
        }

        out
    }
}

///
/// Stmt
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Stmt {
    /// `let mut var = value;`
    Let { var: Var, value: Expr },

    /// Bind the present value of `value` or skip to the next iteration.
    LetOrSkip { var: Var, value: Expr },

    /// Run `body` with `var` bound, if `value` is present.
    IfSome {
        var: Var,
        value: Expr,
        body: Vec<Stmt>,
    },

    /// Iterate the function's row source.
    ForEachRow { row: Var, body: Vec<Stmt> },

    /// Iterate a root map with mutable access to every entity.
    ForEachRoot {
        map: Var,
        key: Var,
        value: Var,
        body: Vec<Stmt>,
    },

    /// Insert or overwrite `map[key]`.
    Insert { map: Var, key: Var, value: Expr },

    /// Union keyed `items` into the set `acc[key]`, creating it if absent.
    Union { acc: Var, key: Var, items: Expr },

    /// Append `items` to a collection field of `target`.
    Extend {
        target: Var,
        field: String,
        items: Expr,
    },

    Return(Var),
}

impl Stmt {
    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Let { value, .. } => value.collect_calls(out),
            Self::IfSome { body, .. }
            | Self::ForEachRow { body, .. }
            | Self::ForEachRoot { body, .. } => {
                for stmt in body {
                    stmt.collect_calls(out);
                }
            }
            _ => {}
        }
    }
}

///
/// Expr
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Expr {
    Var(Var),

    /// Empty id→entity map.
    NewRootMap { key: Primitive, entity: TypeRef },

    /// Empty root id → (target id → target) accumulator.
    NewAccumulator {
        key: Primitive,
        target_key: Primitive,
        target: TypeRef,
    },

    /// Another entity's mapping function over the same rows.
    CallMapping {
        entity: TypeRef,
        function: String,
        rows: Var,
    },

    /// Optional typed id read from a row.
    ReadId {
        row: Var,
        column: ColumnRef,
        ty: Primitive,
    },

    /// Plain-column decode of an entity from one row.
    Decode { row: Var, entity: TypeRef },

    /// Optional copy of `map[key]`.
    GetRoot { map: Var, key: Var },

    UnwrapOrElse {
        value: Box<Expr>,
        fallback: Box<Expr>,
    },

    IsPresent(Box<Expr>),

    IfElse {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    Some(Box<Expr>),
    None,

    /// Conversion into the field's representation (e.g. boxing).
    Into(Box<Expr>),

    /// Copy of `base` with the listed relation fields replaced.
    Embed {
        entity: TypeRef,
        base: Var,
        fields: Vec<(String, Var)>,
    },

    /// Zero or one `(key, entity)` pairs of `map` whose key equals `key`.
    Select { map: Var, key: Var, lookup: Lookup },

    /// `items` with each entity's `field` pointing at `value`.
    BackRef {
        items: Box<Expr>,
        field: String,
        nullable: bool,
        value: Var,
    },

    /// Remove and return `acc[key]`, if present.
    Take { acc: Var, key: Var },

    /// Entities of a keyed set, in insertion order.
    Values(Var),
}

impl Expr {
    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Self::CallMapping { function, .. } = self {
            out.push(function);
        }
    }
}
