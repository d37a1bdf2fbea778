use rowgraph_schema::{
    Error,
    build::build_graphs,
    meta::{AnnotationEnvironment, StaticTypes},
    node::AssociationKind,
    types::TypeRef,
};

const CUSTOMER_METADATA: &str = r#"{
    "entities": [
        { "kind": "type", "qualified_name": "shop::Customer" },
        { "kind": "type", "qualified_name": "shop::Phone" },
        { "kind": "type", "qualified_name": "shop::geo::Address", "table": "addresses" }
    ],
    "ids": [
        { "kind": "field", "name": "id", "enclosing": "shop::Customer", "ty": { "scalar": "Int64" } },
        { "kind": "field", "name": "id", "enclosing": "shop::Phone", "ty": { "scalar": "Int64" } },
        { "kind": "field", "name": "id", "enclosing": "shop::geo::Address", "ty": { "scalar": "Int64" } }
    ],
    "gen_values": [
        { "kind": "field", "name": "id", "enclosing": "shop::Customer", "ty": { "scalar": "Int64" } }
    ],
    "columns": [
        { "kind": "field", "name": "name", "enclosing": "shop::Customer", "ty": { "scalar": "Text" } },
        { "kind": "field", "name": "number", "enclosing": "shop::Phone", "ty": { "scalar": "Text" } },
        { "kind": "field", "name": "city", "enclosing": "shop::geo::Address", "ty": { "scalar": "Text" } }
    ],
    "one_to_one": [
        {
            "kind": "field", "name": "address", "enclosing": "shop::Customer",
            "ty": { "option": { "named": "shop::geo::Address" } }
        }
    ],
    "one_to_many": [
        {
            "kind": "field", "name": "phones", "enclosing": "shop::Customer",
            "ty": { "list": { "named": "shop::Phone" } },
            "annotations": { "mapped_by": "customer" }
        }
    ],
    "many_to_one": [
        {
            "kind": "field", "name": "customer", "enclosing": "shop::Phone",
            "ty": { "option": { "named": "shop::Customer" } }
        }
    ]
}"#;

#[test]
fn builds_cross_package_graph() {
    let env = AnnotationEnvironment::from_json(CUSTOMER_METADATA).expect("valid metadata");
    let graphs = build_graphs(&env, &StaticTypes).expect("graph should build");

    assert_eq!(graphs.len(), 3);
    assert_eq!(graphs.packages().count(), 2, "shop and shop::geo");

    let customer = graphs.resolve(&TypeRef::new("shop::Customer")).unwrap();
    assert!(customer.id.generated);

    let address = customer.get_association("address").unwrap();
    assert_eq!(address.kind, AssociationKind::OneToOne);
    assert!(address.nullable && address.mapped);

    let phones = customer.get_association("phones").unwrap();
    assert!(!phones.mapped, "phones is the inverse of Phone.customer");

    let phone = graphs.resolve(&TypeRef::new("shop::Phone")).unwrap();
    let inverse = phone
        .inverse_of(&customer.ty, phones.mapped_by.as_deref())
        .expect("Phone.customer points back");
    assert_eq!(inverse.kind, AssociationKind::ManyToOne);

    let address = graphs.resolve(&TypeRef::new("shop::geo::Address")).unwrap();
    assert_eq!(address.table, "addresses");
}

#[test]
fn build_is_repeatable() {
    let env = AnnotationEnvironment::from_json(CUSTOMER_METADATA).unwrap();

    let first = build_graphs(&env, &StaticTypes).unwrap();
    let second = build_graphs(&env, &StaticTypes).unwrap();

    assert_eq!(first, second);
}

#[test]
fn unmapped_target_aborts_the_round() {
    let metadata = CUSTOMER_METADATA.replace(
        r#"{ "kind": "type", "qualified_name": "shop::Phone" },"#,
        "",
    );
    let env = AnnotationEnvironment::from_json(&metadata).unwrap();
    let err = build_graphs(&env, &StaticTypes).expect_err("Phone is gone");

    // the Phone id now belongs to no entity, but the relation fails first
    assert!(
        matches!(&err, Error::EntityNotMapped { target } if target.path() == "shop::Phone"),
        "unexpected error: {err}"
    );
}
