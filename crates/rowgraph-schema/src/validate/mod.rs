//! Graph validation run once every processor has finished.

pub mod naming;
pub mod relation;

use crate::prelude::*;

/// Validate a fully processed graph, collecting every problem.
pub fn validate_graphs(graphs: &EntityGraphs) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();

    // Phase 1: per-entity checks.
    for entity in graphs.entities() {
        naming::validate_entity_name(entity, &mut errs);
        relation::validate_entity_relations(graphs, entity, &mut errs);
    }

    // Phase 2: graph-wide checks.
    naming::validate_unique_tables(graphs, &mut errs);

    errs.result()
}
