use crate::{
    meta::TypeEnvironment,
    prelude::*,
    process::{ElementProcessor, base_association, process_elements},
};

///
/// OneToOneProcessor
///
/// The side carrying `mapped_by` is the inverse; the other side owns the
/// foreign key.
///

pub struct OneToOneProcessor<'a> {
    types: &'a dyn TypeEnvironment,
    env: &'a AnnotationEnvironment,
}

impl<'a> OneToOneProcessor<'a> {
    #[must_use]
    pub const fn new(types: &'a dyn TypeEnvironment, env: &'a AnnotationEnvironment) -> Self {
        Self { types, env }
    }
}

impl ElementProcessor for OneToOneProcessor<'_> {
    fn process(&self, graphs: &mut EntityGraphs) -> Result<(), Error> {
        process_elements(&self.env.one_to_one, self.types, graphs, |owner, field, target| {
            let mut association =
                base_association(owner, field, target, AssociationKind::OneToOne);
            association.mapped = field.annotations.mapped_by.is_none();

            Ok(association)
        })
    }
}
