//! One processing round: raw metadata in, frozen entity graph out.

use crate::{
    meta::TypeEnvironment,
    prelude::*,
    process::{
        ElementProcessor, EntityProcessor, ManyToManyProcessor, ManyToOneProcessor,
        OneToManyProcessor, OneToOneProcessor,
    },
    validate::validate_graphs,
};
use tracing::info;

/// Run every processor in order, then validate the result.
///
/// The returned graph is complete; nothing downstream mutates it.
pub fn build_graphs(
    env: &AnnotationEnvironment,
    types: &dyn TypeEnvironment,
) -> Result<EntityGraphs, Error> {
    let mut graphs = EntityGraphs::new();

    let processors: [&dyn ElementProcessor; 5] = [
        &EntityProcessor::new(env),
        &OneToOneProcessor::new(types, env),
        &OneToManyProcessor::new(types, env),
        &ManyToOneProcessor::new(types, env),
        &ManyToManyProcessor::new(types, env),
    ];
    for processor in processors {
        processor.process(&mut graphs)?;
    }

    validate_graphs(&graphs).map_err(Error::Validation)?;

    info!(
        entities = graphs.len(),
        packages = graphs.packages().count(),
        "entity graph built"
    );

    Ok(graphs)
}
