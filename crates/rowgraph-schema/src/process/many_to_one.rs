use crate::{
    meta::TypeEnvironment,
    prelude::*,
    process::{ElementProcessor, base_association, process_elements},
};

///
/// ManyToOneProcessor
/// Many-to-one is always the owning side.
///

pub struct ManyToOneProcessor<'a> {
    types: &'a dyn TypeEnvironment,
    env: &'a AnnotationEnvironment,
}

impl<'a> ManyToOneProcessor<'a> {
    #[must_use]
    pub const fn new(types: &'a dyn TypeEnvironment, env: &'a AnnotationEnvironment) -> Self {
        Self { types, env }
    }
}

impl ElementProcessor for ManyToOneProcessor<'_> {
    fn process(&self, graphs: &mut EntityGraphs) -> Result<(), Error> {
        process_elements(&self.env.many_to_one, self.types, graphs, |owner, field, target| {
            let mut association =
                base_association(owner, field, target, AssociationKind::ManyToOne);
            association.mapped = true;
            association.mapped_by = None;

            Ok(association)
        })
    }
}
