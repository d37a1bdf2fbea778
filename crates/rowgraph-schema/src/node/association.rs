use crate::prelude::*;
use derive_more::Display;

///
/// AssociationKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationKind {
    #[display("ONE_TO_ONE")]
    OneToOne,
    #[display("ONE_TO_MANY")]
    OneToMany,
    #[display("MANY_TO_ONE")]
    ManyToOne,
    #[display("MANY_TO_MANY")]
    ManyToMany,
}

impl AssociationKind {
    /// Target appears at most once per row and is embedded by value.
    #[must_use]
    pub const fn is_to_one(self) -> bool {
        matches!(self, Self::OneToOne | Self::ManyToOne)
    }

    /// Target is collected across rows into a collection field.
    #[must_use]
    pub const fn is_to_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

///
/// AssociationDefinition
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AssociationDefinition {
    pub name: String,
    pub kind: AssociationKind,
    pub target: TypeRef,
    pub nullable: bool,

    /// True when this side declares the foreign key.
    pub mapped: bool,

    /// Owning association on the target, when this is the inverse side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,

    /// Join alias the target's columns appear under (self-referential only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl AssociationDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AssociationKind, target: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind,
            target,
            nullable: false,
            mapped: true,
            mapped_by: None,
            join_table: None,
            alias: None,
        }
    }

    #[must_use]
    pub fn is_self_referential(&self, owner: &TypeRef) -> bool {
        &self.target == owner
    }

    /// Table (or alias) the target's own columns are read from.
    #[must_use]
    pub fn target_table<'a>(&'a self, target: &'a EntityDefinition) -> &'a str {
        self.alias.as_deref().unwrap_or(&target.table)
    }

    /// Id column of the target as it appears in a row.
    #[must_use]
    pub fn target_id_column(&self, target: &EntityDefinition) -> ColumnRef {
        ColumnRef::new(self.target_table(target), &target.id.column)
    }

    /// Join-table column holding the target id (many-to-many only).
    #[must_use]
    pub fn join_target_column(&self, target: &EntityDefinition) -> Option<ColumnRef> {
        let join_table = self.join_table.as_deref()?;

        Some(ColumnRef::new(
            join_table,
            format!("{}_target_id", target.snake_name()),
        ))
    }
}
