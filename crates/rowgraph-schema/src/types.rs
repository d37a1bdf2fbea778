use crate::prelude::*;
use derive_more::{Display, FromStr};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use std::borrow::Borrow;

///
/// TypeRef
///
/// Identity of an entity type: its fully-qualified Rust path, e.g.
/// `crate::model::Customer`. The package is everything before the last `::`.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn package(&self) -> &str {
        self.0.rsplit_once("::").map_or("", |(package, _)| package)
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once("::").map_or(&self.0, |(_, name)| name)
    }
}

impl Borrow<str> for TypeRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

///
/// ColumnRef
///
/// A column as it appears in a result row: table (or join alias) plus name.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{table}.{column}")]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

///
/// Primitive
///
/// Scalar types allowed for ids and plain columns.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum Primitive {
    Blob,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Nat8,
    Nat16,
    Nat32,
    Nat64,
    Text,
}

impl Primitive {
    /// Rust type used for this primitive in generated code.
    #[must_use]
    pub fn as_type(self) -> TokenStream {
        match self {
            Self::Blob => quote!(::std::vec::Vec<u8>),
            Self::Bool => quote!(bool),
            Self::Int8 => quote!(i8),
            Self::Int16 => quote!(i16),
            Self::Int32 => quote!(i32),
            Self::Int64 => quote!(i64),
            Self::Nat8 => quote!(u8),
            Self::Nat16 => quote!(u16),
            Self::Nat32 => quote!(u32),
            Self::Nat64 => quote!(u64),
            Self::Text => quote!(::std::string::String),
        }
    }
}

impl ToTokens for Primitive {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(self.as_type());
    }
}
