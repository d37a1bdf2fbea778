use crate::{
    BuildError, order,
    plan::{Expr, MappingFn, ROOT, ROOT_ID, ROOTS, ROW, ROWS, Stmt, Var},
};
use rowgraph_config_build::GenerateConfig;
use rowgraph_schema::{
    Error,
    node::{AssociationDefinition, AssociationKind, EntityDefinition, EntityGraphs},
    types::ColumnRef,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

///
/// MappingGenerator
///
/// Builds one mapping plan per entity of a graph. Plans only read the graph,
/// so a generator can be reused for any number of entities.
///

pub struct MappingGenerator<'a> {
    graphs: &'a EntityGraphs,
    config: &'a GenerateConfig,
}

impl<'a> MappingGenerator<'a> {
    #[must_use]
    pub const fn new(graphs: &'a EntityGraphs, config: &'a GenerateConfig) -> Self {
        Self { graphs, config }
    }

    /// Plans for every entity, callees before callers.
    ///
    /// Fails as a whole: either every plan is produced or none is.
    pub fn generate_all(&self) -> Result<Vec<MappingFn>, BuildError> {
        let order = order::generation_order(self.graphs)?;

        let mut names = BTreeMap::new();
        for ty in &order {
            let entity = self.graphs.resolve(ty)?;
            let name = self.config.function_name(&entity.name);
            if let Some(first) = names.insert(name.clone(), ty) {
                return Err(BuildError::DuplicateFunction {
                    function: name,
                    first: first.clone(),
                    second: ty.clone(),
                });
            }
        }

        let plans = order
            .iter()
            .map(|ty| self.generate(self.graphs.resolve(ty)?))
            .collect::<Result<Vec<_>, _>>()?;
        info!(functions = plans.len(), "generated mapping plans");

        Ok(plans)
    }

    /// Plan for a single entity.
    pub fn generate(&self, entity: &EntityDefinition) -> Result<MappingFn, BuildError> {
        let mut to_one = Vec::new();
        let mut to_many = Vec::new();

        for association in &entity.associations {
            let target = self.graphs.resolve(&association.target)?;
            let self_ref = association.is_self_referential(&entity.ty);

            if association.kind.is_to_many() {
                to_many.push(self.to_many(entity, association, target, self_ref)?);
            } else if self_ref {
                // filled in by the inverse collection's back-reference
                warn!(
                    entity = %entity.ty,
                    association = %association.name,
                    "skipping self-referential to-one"
                );
            } else {
                to_one.push(ToOne {
                    association,
                    target,
                    id_column: association.target_id_column(target),
                });
            }
        }

        let mut body = setup(entity, &to_many);
        body.push(first_pass(entity, &to_one));
        if !to_many.is_empty() {
            body.push(self.second_pass(entity, &to_many));
            body.push(third_pass(&to_many));
        }
        body.push(Stmt::Return(Var::new(ROOTS)));

        debug!(
            entity = %entity.ty,
            to_one = to_one.len(),
            to_many = to_many.len(),
            "planned mapping function"
        );

        Ok(MappingFn {
            entity: entity.ty.clone(),
            name: self.config.function_name(&entity.name),
            list_name: self
                .config
                .list_functions
                .then(|| self.config.list_function_name(&entity.name)),
            key: entity.id.ty,
            rows: Var::new(ROWS),
            body,
        })
    }

    fn to_many<'e>(
        &self,
        owner: &EntityDefinition,
        association: &'e AssociationDefinition,
        target: &'e EntityDefinition,
        self_ref: bool,
    ) -> Result<ToMany<'e>, BuildError> {
        let id_column = match association.kind {
            AssociationKind::ManyToMany => {
                association
                    .join_target_column(target)
                    .ok_or_else(|| Error::MissingJoinTable {
                        owner: owner.ty.clone(),
                        field: association.name.clone(),
                    })?
            }
            _ => association.target_id_column(target),
        };

        let back_ref = match association.kind {
            AssociationKind::OneToMany => target
                .inverse_of(&owner.ty, association.mapped_by.as_deref())
                .map(|inverse| (inverse.name.clone(), inverse.nullable)),
            _ => None,
        };

        Ok(ToMany {
            association,
            target,
            self_ref,
            id_column,
            back_ref,
            function: self.config.function_name(&target.name),
        })
    }

    // second_pass
    // gather every collection's targets per root, deduplicated by target id
    fn second_pass(&self, entity: &EntityDefinition, to_many: &[ToMany<'_>]) -> Stmt {
        let mut body = vec![Stmt::LetOrSkip {
            var: Var::new(ROOT_ID),
            value: read_id(entity.id_column(), entity),
        }];

        if to_many.iter().any(|many| many.back_ref.is_some()) {
            body.push(Stmt::LetOrSkip {
                var: Var::new(ROOT),
                value: Expr::GetRoot {
                    map: Var::new(ROOTS),
                    key: Var::new(ROOT_ID),
                },
            });
        }

        for many in to_many {
            let target_id = many.target_id();
            let source = if many.self_ref {
                Var::new(ROOTS)
            } else {
                many.map()
            };

            let mut items = Expr::Select {
                map: source,
                key: target_id.clone(),
                lookup: self.config.lookup,
            };
            if let Some((field, nullable)) = &many.back_ref {
                items = Expr::BackRef {
                    items: Box::new(items),
                    field: field.clone(),
                    nullable: *nullable,
                    value: Var::new(ROOT),
                };
            }

            body.push(Stmt::IfSome {
                var: target_id,
                value: read_id(many.id_column.clone(), many.target),
                body: vec![Stmt::Union {
                    acc: many.acc(),
                    key: Var::new(ROOT_ID),
                    items,
                }],
            });
        }

        Stmt::ForEachRow {
            row: Var::new(ROW),
            body,
        }
    }
}

///
/// ToOne
///

struct ToOne<'e> {
    association: &'e AssociationDefinition,
    target: &'e EntityDefinition,
    id_column: ColumnRef,
}

impl ToOne<'_> {
    fn value(&self) -> Var {
        Var::new(format!("{}_value", self.association.name))
    }
}

///
/// ToMany
///

struct ToMany<'e> {
    association: &'e AssociationDefinition,
    target: &'e EntityDefinition,
    self_ref: bool,

    /// Where the target id is read from in a row.
    id_column: ColumnRef,

    /// `(field, nullable)` of the target's to-one pointing back at the owner.
    back_ref: Option<(String, bool)>,

    function: String,
}

impl ToMany<'_> {
    fn acc(&self) -> Var {
        Var::new(format!("{}_acc", self.association.name))
    }

    fn map(&self) -> Var {
        Var::new(format!("{}_map", self.association.name))
    }

    fn target_id(&self) -> Var {
        Var::new(format!("{}_id", self.association.name))
    }

    fn items(&self) -> Var {
        Var::new(format!("{}_items", self.association.name))
    }
}

fn read_id(column: ColumnRef, entity: &EntityDefinition) -> Expr {
    Expr::ReadId {
        row: Var::new(ROW),
        column,
        ty: entity.id.ty,
    }
}

// setup
// empty root map, one accumulator per collection, one map per foreign target
fn setup(entity: &EntityDefinition, to_many: &[ToMany<'_>]) -> Vec<Stmt> {
    let mut stmts = vec![Stmt::Let {
        var: Var::new(ROOTS),
        value: Expr::NewRootMap {
            key: entity.id.ty,
            entity: entity.ty.clone(),
        },
    }];

    for many in to_many {
        stmts.push(Stmt::Let {
            var: many.acc(),
            value: Expr::NewAccumulator {
                key: entity.id.ty,
                target_key: many.target.id.ty,
                target: many.target.ty.clone(),
            },
        });
    }

    for many in to_many.iter().filter(|many| !many.self_ref) {
        stmts.push(Stmt::Let {
            var: many.map(),
            value: Expr::CallMapping {
                entity: many.target.ty.clone(),
                function: many.function.clone(),
                rows: Var::new(ROWS),
            },
        });
    }

    stmts
}

// first_pass
// one root per distinct id, to-one targets decoded from the same row
fn first_pass(entity: &EntityDefinition, to_one: &[ToOne<'_>]) -> Stmt {
    let mut body = vec![
        Stmt::LetOrSkip {
            var: Var::new(ROOT_ID),
            value: read_id(entity.id_column(), entity),
        },
        Stmt::Let {
            var: Var::new(ROOT),
            value: Expr::UnwrapOrElse {
                value: Box::new(Expr::GetRoot {
                    map: Var::new(ROOTS),
                    key: Var::new(ROOT_ID),
                }),
                fallback: Box::new(Expr::Decode {
                    row: Var::new(ROW),
                    entity: entity.ty.clone(),
                }),
            },
        },
    ];

    for one in to_one {
        let decoded = Expr::Into(Box::new(Expr::Decode {
            row: Var::new(ROW),
            entity: one.target.ty.clone(),
        }));

        let value = if one.association.nullable {
            Expr::IfElse {
                cond: Box::new(Expr::IsPresent(Box::new(read_id(
                    one.id_column.clone(),
                    one.target,
                )))),
                then: Box::new(Expr::Some(Box::new(decoded))),
                otherwise: Box::new(Expr::None),
            }
        } else {
            decoded
        };

        body.push(Stmt::Let {
            var: one.value(),
            value,
        });
    }

    let root = if to_one.is_empty() {
        Expr::Var(Var::new(ROOT))
    } else {
        Expr::Embed {
            entity: entity.ty.clone(),
            base: Var::new(ROOT),
            fields: to_one
                .iter()
                .map(|one| (one.association.name.clone(), one.value()))
                .collect(),
        }
    };

    body.push(Stmt::Insert {
        map: Var::new(ROOTS),
        key: Var::new(ROOT_ID),
        value: root,
    });

    Stmt::ForEachRow {
        row: Var::new(ROW),
        body,
    }
}

// third_pass
// move each accumulated set into its root's collection field
fn third_pass(to_many: &[ToMany<'_>]) -> Stmt {
    let body = to_many
        .iter()
        .map(|many| Stmt::IfSome {
            var: many.items(),
            value: Expr::Take {
                acc: many.acc(),
                key: Var::new(ROOT_ID),
            },
            body: vec![Stmt::Extend {
                target: Var::new(ROOT),
                field: many.association.name.clone(),
                items: Expr::Values(many.items()),
            }],
        })
        .collect();

    Stmt::ForEachRoot {
        map: Var::new(ROOTS),
        key: Var::new(ROOT_ID),
        value: Var::new(ROOT),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgraph_schema::{
        node::IdDefinition,
        types::{Primitive, TypeRef},
    };

    fn entity(path: &str) -> EntityDefinition {
        EntityDefinition::new(TypeRef::new(path), IdDefinition::new("id", Primitive::Int64))
    }

    fn graphs(entities: Vec<EntityDefinition>) -> EntityGraphs {
        let mut graphs = EntityGraphs::new();
        for entity in entities {
            graphs.insert(entity).unwrap();
        }
        graphs
    }

    fn plan(graphs: &EntityGraphs, path: &str) -> MappingFn {
        let config = GenerateConfig::default();
        MappingGenerator::new(graphs, &config)
            .generate(graphs.resolve(&TypeRef::new(path)).unwrap())
            .unwrap()
    }

    #[test]
    fn plain_entity_has_a_single_pass() {
        let graphs = graphs(vec![entity("app::Tag")]);
        let plan = plan(&graphs, "app::Tag");

        assert_eq!(plan.name, "to_tag_map");
        assert_eq!(plan.list_name.as_deref(), Some("to_tag_list"));
        assert_eq!(plan.body.len(), 3, "roots, pass 1, return");
        assert!(plan.calls().is_empty());
    }

    #[test]
    fn collections_call_the_target_mapping() {
        let mut customer = entity("app::Customer");
        customer.add_association(AssociationDefinition::new(
            "phones",
            AssociationKind::OneToMany,
            TypeRef::new("app::Phone"),
        ));
        let graphs = graphs(vec![customer, entity("app::Phone")]);

        let plan = plan(&graphs, "app::Customer");
        assert_eq!(plan.calls(), vec!["to_phone_map"]);
        assert!(matches!(plan.body.last(), Some(Stmt::Return(var)) if var.as_str() == ROOTS));
    }

    #[test]
    fn self_referential_collections_read_from_roots() {
        let mut tree = entity("app::Tree");
        let mut children =
            AssociationDefinition::new("children", AssociationKind::OneToMany, tree.ty.clone());
        children.alias = Some("tree_children".to_string());
        tree.add_association(children);
        let graphs = graphs(vec![tree]);

        let plan = plan(&graphs, "app::Tree");
        assert!(plan.calls().is_empty(), "no call to itself");

        let mut passes = plan
            .body
            .iter()
            .filter(|stmt| matches!(stmt, Stmt::ForEachRow { .. }));
        let Some(Stmt::ForEachRow { body, .. }) = passes.nth(1) else {
            panic!("second pass expected in {:?}", plan.body);
        };
        let Some(Stmt::IfSome { value, body, .. }) = body.last() else {
            panic!("collection step expected");
        };
        assert!(
            matches!(value, Expr::ReadId { column, .. } if column.to_string() == "tree_children.id"),
            "child id comes through the alias: {value:?}"
        );
        assert!(matches!(
            &body[0],
            Stmt::Union { items: Expr::Select { map, .. }, .. } if map.as_str() == ROOTS
        ));
    }

    #[test]
    fn only_nullable_to_one_checks_the_target_id() {
        let mut order = entity("app::Order");
        order.add_association(AssociationDefinition::new(
            "customer",
            AssociationKind::ManyToOne,
            TypeRef::new("app::Customer"),
        ));
        let mut coupon =
            AssociationDefinition::new("coupon", AssociationKind::OneToOne, TypeRef::new("app::Coupon"));
        coupon.nullable = true;
        order.add_association(coupon);
        let graphs = graphs(vec![order, entity("app::Customer"), entity("app::Coupon")]);

        let plan = plan(&graphs, "app::Order");
        let Some(Stmt::ForEachRow { body, .. }) = plan
            .body
            .iter()
            .find(|stmt| matches!(stmt, Stmt::ForEachRow { .. }))
        else {
            panic!("first pass expected in {:?}", plan.body);
        };
        let value_of = |name: &str| {
            body.iter().find_map(|stmt| match stmt {
                Stmt::Let { var, value } if var.as_str() == name => Some(value),
                _ => None,
            })
        };

        assert!(
            matches!(
                value_of("customer_value"),
                Some(Expr::Into(decode)) if matches!(&**decode, Expr::Decode { entity, .. } if entity.path() == "app::Customer")
            ),
            "required target is decoded unconditionally"
        );
        assert!(matches!(value_of("coupon_value"), Some(Expr::IfElse { .. })));
    }

    #[test]
    fn many_to_many_without_join_table_fails() {
        let mut post = entity("app::Post");
        post.add_association(AssociationDefinition::new(
            "tags",
            AssociationKind::ManyToMany,
            TypeRef::new("app::Tag"),
        ));
        let graphs = graphs(vec![post, entity("app::Tag")]);
        let config = GenerateConfig::default();

        let err = MappingGenerator::new(&graphs, &config)
            .generate(graphs.resolve(&TypeRef::new("app::Post")).unwrap())
            .expect_err("join table is required");
        assert!(matches!(err, BuildError::Schema(Error::MissingJoinTable { .. })));
    }

    #[test]
    fn duplicate_function_names_fail() {
        let graphs = graphs(vec![entity("app::a::Tag"), entity("app::b::Tag")]);
        let config = GenerateConfig::default();

        let err = MappingGenerator::new(&graphs, &config)
            .generate_all()
            .expect_err("both are to_tag_map");
        assert!(matches!(err, BuildError::DuplicateFunction { function, .. } if function == "to_tag_map"));
    }
}
