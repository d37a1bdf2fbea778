use crate::{MAX_ENTITY_NAME_LEN, prelude::*};
use std::collections::BTreeMap;

/// Entity names feed generated identifiers, so they must be short ASCII idents.
pub fn validate_entity_name(entity: &EntityDefinition, errs: &mut ErrorTree) {
    let name = &entity.name;
    let route = entity.ty.to_string();

    if name.is_empty() {
        errs.add_for(route, "entity name is empty");
        return;
    }
    if name.len() > MAX_ENTITY_NAME_LEN {
        errs.add_for(
            route,
            format!("entity name '{name}' exceeds max length {MAX_ENTITY_NAME_LEN}"),
        );
        return;
    }
    if !name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
        || name.starts_with(|c: char| c.is_ascii_digit())
    {
        errs.add_for(route, format!("entity name '{name}' is not an ASCII identifier"));
    }
}

/// Two entities reading the same table would read each other's columns.
pub fn validate_unique_tables(graphs: &EntityGraphs, errs: &mut ErrorTree) {
    let mut by_table: BTreeMap<&str, &TypeRef> = BTreeMap::new();

    for entity in graphs.entities() {
        if let Some(prev) = by_table.insert(&entity.table, &entity.ty) {
            err!(
                errs,
                "duplicate table '{}' for '{prev}' and '{}'",
                entity.table,
                entity.ty
            );
        }
    }
}
