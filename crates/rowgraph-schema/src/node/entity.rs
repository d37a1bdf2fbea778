use crate::prelude::*;
use convert_case::{Case, Casing};

///
/// EntityDefinition
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityDefinition {
    pub ty: TypeRef,
    pub name: String,
    pub package: String,
    pub table: String,
    pub id: IdDefinition,

    /// Plain columns in declaration order; the id is not repeated here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<AssociationDefinition>,
}

impl EntityDefinition {
    /// New entity with the default (snake_case) table name.
    #[must_use]
    pub fn new(ty: TypeRef, id: IdDefinition) -> Self {
        let name = ty.simple_name().to_string();
        let table = name.to_case(Case::Snake);

        Self {
            package: ty.package().to_string(),
            ty,
            name,
            table,
            id,
            columns: Vec::new(),
            associations: Vec::new(),
        }
    }

    #[must_use]
    pub fn snake_name(&self) -> String {
        self.name.to_case(Case::Snake)
    }

    #[must_use]
    pub fn id_column(&self) -> ColumnRef {
        ColumnRef::new(&self.table, &self.id.column)
    }

    // add_association
    // replaces an association with the same name so reprocessing is idempotent
    pub fn add_association(&mut self, association: AssociationDefinition) {
        match self
            .associations
            .iter_mut()
            .find(|a| a.name == association.name)
        {
            Some(existing) => *existing = association,
            None => self.associations.push(association),
        }
    }

    #[must_use]
    pub fn get_association(&self, name: &str) -> Option<&AssociationDefinition> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// The owning to-one association on this entity that points back at
    /// `owner`, i.e. the back-reference a collection on `owner` fills in.
    #[must_use]
    pub fn inverse_of(
        &self,
        owner: &TypeRef,
        mapped_by: Option<&str>,
    ) -> Option<&AssociationDefinition> {
        self.associations.iter().find(|a| {
            a.target == *owner
                && a.kind.is_to_one()
                && a.mapped
                && mapped_by.is_none_or(|name| a.name == name)
        })
    }
}

///
/// IdDefinition
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdDefinition {
    pub name: String,
    pub column: String,
    pub ty: Primitive,

    /// Value is assigned by the database.
    #[serde(default)]
    pub generated: bool,
}

impl IdDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Primitive) -> Self {
        let name = name.into();

        Self {
            column: name.clone(),
            name,
            ty,
            generated: false,
        }
    }
}

///
/// ColumnDefinition
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub column: String,
    pub ty: Primitive,

    #[serde(default)]
    pub nullable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parking_spot() -> EntityDefinition {
        EntityDefinition::new(
            TypeRef::new("app::model::ParkingSpot"),
            IdDefinition::new("id", Primitive::Int64),
        )
    }

    #[test]
    fn defaults_come_from_the_type_path() {
        let entity = parking_spot();

        assert_eq!(entity.name, "ParkingSpot");
        assert_eq!(entity.package, "app::model");
        assert_eq!(entity.table, "parking_spot");
        assert_eq!(entity.id_column().to_string(), "parking_spot.id");
    }

    #[test]
    fn re_adding_an_association_replaces_it() {
        let mut entity = parking_spot();
        let target = TypeRef::new("app::model::Employee");

        entity.add_association(AssociationDefinition::new(
            "employee",
            AssociationKind::OneToOne,
            target.clone(),
        ));
        let mut again = AssociationDefinition::new("employee", AssociationKind::OneToOne, target);
        again.nullable = true;
        entity.add_association(again);

        assert_eq!(entity.associations.len(), 1);
        assert!(entity.associations[0].nullable);
    }
}
