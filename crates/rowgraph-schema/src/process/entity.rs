use crate::{process::ElementProcessor, prelude::*};
use std::collections::BTreeSet;
use tracing::debug;

///
/// EntityProcessor
///
/// Creates one EntityDefinition per entity type from the entity, id,
/// generated-value and column lists. Re-running it refreshes the plain parts
/// of an existing definition and keeps its associations.
///

pub struct EntityProcessor<'a> {
    env: &'a AnnotationEnvironment,
}

impl<'a> EntityProcessor<'a> {
    #[must_use]
    pub const fn new(env: &'a AnnotationEnvironment) -> Self {
        Self { env }
    }

    fn build_entity(
        &self,
        element: &TypeElement,
        ids: &[&FieldElement],
        gen_values: &[&FieldElement],
        columns: &[&FieldElement],
    ) -> Result<EntityDefinition, Error> {
        let ty = &element.qualified_name;

        let id_field = match ids
            .iter()
            .filter(|f| f.enclosing == *ty)
            .collect::<Vec<_>>()
            .as_slice()
        {
            [] => return Err(Error::MissingId { entity: ty.clone() }),
            [one] => **one,
            many => {
                return Err(Error::DuplicateId {
                    entity: ty.clone(),
                    fields: many.iter().map(|f| f.name.clone()).collect(),
                });
            }
        };

        let mut id = IdDefinition::new(&id_field.name, scalar_of(id_field)?);
        id.column = id_field.column_name().to_string();
        id.generated = gen_values
            .iter()
            .any(|f| f.enclosing == *ty && f.name == id_field.name);

        let mut entity = EntityDefinition::new(ty.clone(), id);
        if let Some(table) = &element.table {
            entity.table.clone_from(table);
        }

        for field in columns
            .iter()
            .filter(|f| f.enclosing == *ty && f.name != id_field.name)
        {
            entity.columns.push(ColumnDefinition {
                name: field.name.clone(),
                column: field.column_name().to_string(),
                ty: scalar_of(field)?,
                nullable: field.nullable(),
            });
        }

        // declaration order, when the front end lists it
        if !element.fields.is_empty() {
            entity.columns.sort_by_key(|c| {
                element
                    .fields
                    .iter()
                    .position(|f| *f == c.name)
                    .unwrap_or(usize::MAX)
            });
        }

        Ok(entity)
    }
}

impl ElementProcessor for EntityProcessor<'_> {
    fn process(&self, graphs: &mut EntityGraphs) -> Result<(), Error> {
        let ids = fields(&self.env.ids)?;
        let gen_values = fields(&self.env.gen_values)?;
        let columns = fields(&self.env.columns)?;

        let mut seen = BTreeSet::new();
        for element in &self.env.entities {
            let element = element.as_type()?;
            if !seen.insert(&element.qualified_name) {
                return Err(Error::DuplicateEntity {
                    entity: element.qualified_name.clone(),
                });
            }

            let entity = self.build_entity(element, &ids, &gen_values, &columns)?;
            debug!(
                entity = %entity.ty,
                table = %entity.table,
                columns = entity.columns.len(),
                "registered entity"
            );

            match graphs.get_mut(&entity.ty) {
                Some(existing) => {
                    existing.table = entity.table;
                    existing.id = entity.id;
                    existing.columns = entity.columns;
                }
                None => graphs.insert(entity)?,
            }
        }

        Ok(())
    }
}

fn fields(elements: &[Element]) -> Result<Vec<&FieldElement>, Error> {
    elements.iter().map(Element::as_field).collect()
}

fn scalar_of(field: &FieldElement) -> Result<Primitive, Error> {
    field.ty.scalar().ok_or_else(|| Error::UnsupportedColumnType {
        owner: field.enclosing.clone(),
        field: field.name.clone(),
    })
}
