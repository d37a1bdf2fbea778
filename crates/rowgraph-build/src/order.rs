//! Call order of mapping functions.
//!
//! A function calls the mapping of every non-self collection target, so the
//! call graph must be acyclic.

use crate::BuildError;
use rowgraph_schema::{
    node::{EntityDefinition, EntityGraphs},
    types::TypeRef,
};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Entities whose mapping functions `entity`'s function calls.
#[must_use]
pub fn dependencies(entity: &EntityDefinition) -> Vec<&TypeRef> {
    entity
        .associations
        .iter()
        .filter(|a| a.kind.is_to_many() && !a.is_self_referential(&entity.ty))
        .map(|a| &a.target)
        .collect()
}

/// Every entity, each after the entities its function calls.
pub fn generation_order(graphs: &EntityGraphs) -> Result<Vec<TypeRef>, BuildError> {
    let mut marks = BTreeMap::new();
    let mut stack = Vec::new();
    let mut order = Vec::with_capacity(graphs.len());

    for entity in graphs.entities() {
        visit(graphs, &entity.ty, &mut marks, &mut stack, &mut order)?;
    }

    Ok(order)
}

fn visit(
    graphs: &EntityGraphs,
    ty: &TypeRef,
    marks: &mut BTreeMap<TypeRef, Mark>,
    stack: &mut Vec<TypeRef>,
    order: &mut Vec<TypeRef>,
) -> Result<(), BuildError> {
    match marks.get(ty) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|t| t == ty).unwrap_or_default();
            let mut path = stack[start..].to_vec();
            path.push(ty.clone());

            return Err(BuildError::DependencyCycle { path });
        }
        None => {}
    }

    let entity = graphs.resolve(ty)?;
    marks.insert(ty.clone(), Mark::Visiting);
    stack.push(ty.clone());

    for dep in dependencies(entity) {
        visit(graphs, dep, marks, stack, order)?;
    }

    stack.pop();
    marks.insert(ty.clone(), Mark::Done);
    order.push(ty.clone());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgraph_schema::{
        node::{AssociationDefinition, AssociationKind, IdDefinition},
        types::Primitive,
    };

    fn entity(path: &str, many: &[&str]) -> EntityDefinition {
        let mut entity =
            EntityDefinition::new(TypeRef::new(path), IdDefinition::new("id", Primitive::Int64));
        for target in many {
            entity.add_association(AssociationDefinition::new(
                target.to_lowercase(),
                AssociationKind::OneToMany,
                TypeRef::new(*target),
            ));
        }

        entity
    }

    fn graphs(entities: Vec<EntityDefinition>) -> EntityGraphs {
        let mut graphs = EntityGraphs::new();
        for entity in entities {
            graphs.insert(entity).unwrap();
        }
        graphs
    }

    #[test]
    fn callees_come_first() {
        let graphs = graphs(vec![
            entity("a::A", &["b::B"]),
            entity("b::B", &["c::C"]),
            entity("c::C", &[]),
        ]);

        let order = generation_order(&graphs).unwrap();
        let names: Vec<_> = order.iter().map(TypeRef::path).collect();
        assert_eq!(names, vec!["c::C", "b::B", "a::A"]);
    }

    #[test]
    fn self_reference_is_not_a_dependency() {
        let graphs = graphs(vec![entity("a::Tree", &["a::Tree"])]);

        assert_eq!(generation_order(&graphs).unwrap().len(), 1);
    }

    #[test]
    fn mutual_collections_are_a_cycle() {
        let graphs = graphs(vec![entity("a::A", &["a::B"]), entity("a::B", &["a::A"])]);

        let err = generation_order(&graphs).expect_err("A and B call each other");
        let BuildError::DependencyCycle { path } = err else {
            panic!("expected a cycle, got {err}");
        };
        assert_eq!(path.first(), path.last(), "cycle path is closed");
        assert_eq!(path.len(), 3);
    }
}
