use crate::{
    meta::TypeEnvironment,
    prelude::*,
    process::{ElementProcessor, base_association, process_elements},
};

///
/// OneToManyProcessor
///
/// A collection carrying `mapped_by` is the inverse of a to-one on the
/// target; without it the collection side owns the foreign key.
///

pub struct OneToManyProcessor<'a> {
    types: &'a dyn TypeEnvironment,
    env: &'a AnnotationEnvironment,
}

impl<'a> OneToManyProcessor<'a> {
    #[must_use]
    pub const fn new(types: &'a dyn TypeEnvironment, env: &'a AnnotationEnvironment) -> Self {
        Self { types, env }
    }
}

impl ElementProcessor for OneToManyProcessor<'_> {
    fn process(&self, graphs: &mut EntityGraphs) -> Result<(), Error> {
        process_elements(&self.env.one_to_many, self.types, graphs, |owner, field, target| {
            let mut association =
                base_association(owner, field, target, AssociationKind::OneToMany);
            association.mapped = field.annotations.mapped_by.is_none();

            Ok(association)
        })
    }
}
