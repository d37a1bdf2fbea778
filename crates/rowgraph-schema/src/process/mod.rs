//! Processors turning raw metadata into the entity graph.
//!
//! `EntityProcessor` runs first and creates every definition; the association
//! processors then attach one association per relation field. All of them are
//! idempotent over the same environment.

mod entity;
mod many_to_many;
mod many_to_one;
mod one_to_many;
mod one_to_one;

pub use entity::EntityProcessor;
pub use many_to_many::ManyToManyProcessor;
pub use many_to_one::ManyToOneProcessor;
pub use one_to_many::OneToManyProcessor;
pub use one_to_one::OneToOneProcessor;

use crate::{meta::TypeEnvironment, prelude::*};
use tracing::debug;

///
/// ElementProcessor
///

pub trait ElementProcessor {
    fn process(&self, graphs: &mut EntityGraphs) -> Result<(), Error>;
}

// process_elements
// resolve owner and target for each relation field, build, then attach
pub(crate) fn process_elements<F>(
    elements: &[Element],
    types: &dyn TypeEnvironment,
    graphs: &mut EntityGraphs,
    mut build: F,
) -> Result<(), Error>
where
    F: FnMut(&EntityDefinition, &FieldElement, &EntityDefinition) -> Result<AssociationDefinition, Error>,
{
    for element in elements {
        let field = element.as_field()?;

        let association = {
            let owner = graphs.resolve(&field.enclosing)?;
            let target_ty =
                types
                    .relation_target(&field.ty)
                    .ok_or_else(|| Error::UnresolvedRelationType {
                        owner: field.enclosing.clone(),
                        field: field.name.clone(),
                    })?;
            let target = graphs.resolve(target_ty)?;

            build(owner, field, target)?
        };

        debug!(
            owner = %field.enclosing,
            association = %association.name,
            kind = %association.kind,
            target = %association.target,
            "attached association"
        );

        graphs
            .resolve_mut(&field.enclosing)?
            .add_association(association);
    }

    Ok(())
}

// Fields shared by every association kind.
pub(crate) fn base_association(
    owner: &EntityDefinition,
    field: &FieldElement,
    target: &EntityDefinition,
    kind: AssociationKind,
) -> AssociationDefinition {
    let mut association = AssociationDefinition::new(&field.name, kind, target.ty.clone());
    association.nullable = field.nullable();
    association.mapped_by.clone_from(&field.annotations.mapped_by);

    if owner.ty == target.ty {
        association.alias = Some(
            field
                .annotations
                .alias
                .clone()
                .unwrap_or_else(|| format!("{}_{}", owner.table, field.name)),
        );
    }

    association
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::meta::Annotations;

    pub fn named(path: &str) -> TypeDesc {
        TypeDesc::Named(TypeRef::new(path))
    }

    pub fn list(path: &str) -> TypeDesc {
        TypeDesc::List(Box::new(named(path)))
    }

    pub fn entity_element(path: &str) -> Element {
        Element::Type(TypeElement {
            qualified_name: TypeRef::new(path),
            table: None,
            fields: vec![],
        })
    }

    pub fn field(owner: &str, name: &str, ty: TypeDesc) -> FieldElement {
        FieldElement {
            name: name.to_string(),
            enclosing: TypeRef::new(owner),
            ty,
            annotations: Annotations::default(),
        }
    }

    pub fn id_element(owner: &str) -> Element {
        Element::Field(field(owner, "id", TypeDesc::Scalar(Primitive::Int64)))
    }
}
