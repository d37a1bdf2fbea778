use crate::prelude::*;

// Check every association of one entity against the rest of the graph.
pub fn validate_entity_relations(
    graphs: &EntityGraphs,
    entity: &EntityDefinition,
    errs: &mut ErrorTree,
) {
    for association in &entity.associations {
        let route = format!("{}.{}", entity.ty, association.name);

        let Some(target) = graphs.get(&association.target) else {
            errs.add_for(route, format!("entity not mapped: {}", association.target));
            continue;
        };

        if association.kind == AssociationKind::ManyToMany && association.join_table.is_none() {
            errs.add_for(route.clone(), "many-to-many relation has no join table");
        }

        if association.is_self_referential(&entity.ty) && association.alias.is_none() {
            errs.add_for(route.clone(), "self-referential relation has no join alias");
        }

        if let Some(mapped_by) = &association.mapped_by {
            match target.get_association(mapped_by) {
                None => errs.add_for(
                    route,
                    format!("mapped_by '{mapped_by}' is not an association on '{}'", target.ty),
                ),
                Some(inverse) if inverse.target != entity.ty => errs.add_for(
                    route,
                    format!(
                        "mapped_by '{mapped_by}' on '{}' points at '{}', not back here",
                        target.ty, inverse.target
                    ),
                ),
                Some(_) => {}
            }
        }
    }
}
