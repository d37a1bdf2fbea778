use crate::{
    meta::TypeEnvironment,
    prelude::*,
    process::{ElementProcessor, base_association, process_elements},
};

///
/// ManyToManyProcessor
///

pub struct ManyToManyProcessor<'a> {
    types: &'a dyn TypeEnvironment,
    env: &'a AnnotationEnvironment,
}

impl<'a> ManyToManyProcessor<'a> {
    #[must_use]
    pub const fn new(types: &'a dyn TypeEnvironment, env: &'a AnnotationEnvironment) -> Self {
        Self { types, env }
    }
}

impl ElementProcessor for ManyToManyProcessor<'_> {
    fn process(&self, graphs: &mut EntityGraphs) -> Result<(), Error> {
        process_elements(&self.env.many_to_many, self.types, graphs, |owner, field, target| {
            let join_table =
                field
                    .annotations
                    .join_table
                    .clone()
                    .ok_or_else(|| Error::MissingJoinTable {
                        owner: owner.ty.clone(),
                        field: field.name.clone(),
                    })?;

            let mut association =
                base_association(owner, field, target, AssociationKind::ManyToMany);
            association.mapped = field.annotations.mapped_by.is_none();
            association.join_table = Some(join_table);

            Ok(association)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{EntityProcessor, fixtures::*};

    fn env(join_table: Option<&str>) -> AnnotationEnvironment {
        let mut groups = field("app::User", "groups", list("app::Group"));
        groups.annotations.join_table = join_table.map(ToString::to_string);

        AnnotationEnvironment {
            entities: vec![entity_element("app::User"), entity_element("app::Group")],
            ids: vec![id_element("app::User"), id_element("app::Group")],
            many_to_many: vec![Element::Field(groups)],
            ..Default::default()
        }
    }

    fn run(env: &AnnotationEnvironment) -> Result<EntityGraphs, Error> {
        let mut graphs = EntityGraphs::new();
        EntityProcessor::new(env).process(&mut graphs)?;
        ManyToManyProcessor::new(&crate::meta::StaticTypes, env).process(&mut graphs)?;

        Ok(graphs)
    }

    #[test]
    fn records_join_table_and_target_column() {
        let graphs = run(&env(Some("user_groups"))).unwrap();
        let user = graphs.resolve(&TypeRef::new("app::User")).unwrap();
        let group = graphs.resolve(&TypeRef::new("app::Group")).unwrap();
        let groups = user.get_association("groups").unwrap();

        assert_eq!(groups.join_table.as_deref(), Some("user_groups"));
        assert_eq!(
            groups.join_target_column(group).map(|c| c.to_string()),
            Some("user_groups.group_target_id".to_string())
        );
    }

    #[test]
    fn missing_join_table_fails() {
        let err = run(&env(None)).expect_err("join table is required");

        assert!(matches!(err, Error::MissingJoinTable { field, .. } if field == "groups"));
    }
}
