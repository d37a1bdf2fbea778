use crate::prelude::*;
use std::collections::BTreeMap;

///
/// EntityGraph
/// All entities of one package, keyed by type.
///

pub type EntityGraph = BTreeMap<TypeRef, EntityDefinition>;

///
/// EntityGraphs
///
/// Package-grouped registry of every entity known to the round. The only
/// structure association targets are resolved through.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityGraphs {
    packages: BTreeMap<String, EntityGraph>,
}

impl EntityGraphs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityDefinition) -> Result<(), Error> {
        let graph = self.packages.entry(entity.package.clone()).or_default();
        if graph.contains_key(&entity.ty) {
            return Err(Error::DuplicateEntity { entity: entity.ty });
        }
        graph.insert(entity.ty.clone(), entity);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, ty: &TypeRef) -> Option<&EntityDefinition> {
        self.packages.get(ty.package())?.get(ty)
    }

    pub fn get_mut(&mut self, ty: &TypeRef) -> Option<&mut EntityDefinition> {
        self.packages.get_mut(ty.package())?.get_mut(ty)
    }

    /// Look up `ty`, failing with `EntityNotMapped`.
    pub fn resolve(&self, ty: &TypeRef) -> Result<&EntityDefinition, Error> {
        self.get(ty)
            .ok_or_else(|| Error::EntityNotMapped { target: ty.clone() })
    }

    pub fn resolve_mut(&mut self, ty: &TypeRef) -> Result<&mut EntityDefinition, Error> {
        self.get_mut(ty)
            .ok_or_else(|| Error::EntityNotMapped { target: ty.clone() })
    }

    #[must_use]
    pub fn package(&self, name: &str) -> Option<&EntityGraph> {
        self.packages.get(name)
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &EntityGraph)> {
        self.packages.iter().map(|(name, graph)| (name.as_str(), graph))
    }

    /// Every entity, ordered by package then type path.
    pub fn entities(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.packages.values().flat_map(BTreeMap::values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(path: &str) -> EntityDefinition {
        EntityDefinition::new(TypeRef::new(path), IdDefinition::new("id", Primitive::Int64))
    }

    #[test]
    fn resolves_across_packages() {
        let mut graphs = EntityGraphs::new();
        graphs.insert(entity("app::sales::Customer")).unwrap();
        graphs.insert(entity("app::hr::Employee")).unwrap();

        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs.packages().count(), 2);
        assert!(graphs.resolve(&TypeRef::new("app::hr::Employee")).is_ok());
    }

    #[test]
    fn unknown_type_is_not_mapped() {
        let graphs = EntityGraphs::new();
        let err = graphs
            .resolve(&TypeRef::new("app::Ghost"))
            .expect_err("empty graph resolves nothing");

        assert!(matches!(err, Error::EntityNotMapped { target } if target.path() == "app::Ghost"));
    }

    #[test]
    fn duplicate_entity_is_rejected() {
        let mut graphs = EntityGraphs::new();
        graphs.insert(entity("app::Customer")).unwrap();

        assert!(matches!(
            graphs.insert(entity("app::Customer")),
            Err(Error::DuplicateEntity { .. })
        ));
    }
}
