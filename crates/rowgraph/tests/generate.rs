use rowgraph::{FromRow, MemRow, Row, config::Config};

const METADATA: &str = r#"{
    "entities": [
        { "kind": "type", "qualified_name": "crate::model::Tree" }
    ],
    "ids": [
        { "kind": "field", "name": "id", "enclosing": "crate::model::Tree", "ty": { "scalar": "Nat32" } }
    ],
    "columns": [
        { "kind": "field", "name": "label", "enclosing": "crate::model::Tree", "ty": { "scalar": "Text" } }
    ],
    "one_to_many": [
        {
            "kind": "field", "name": "children", "enclosing": "crate::model::Tree",
            "ty": { "list": { "named": "crate::model::Tree" } },
            "annotations": { "mapped_by": "parent" }
        }
    ],
    "many_to_one": [
        {
            "kind": "field", "name": "parent", "enclosing": "crate::model::Tree",
            "ty": { "option": { "named": "crate::model::Tree" } }
        }
    ]
}"#;

#[test]
fn generated_module_parses() {
    let source = rowgraph::build::generate(METADATA, &Config::default()).expect("generation");
    let file = syn::parse_file(&source).expect("generated source must parse");

    let functions: Vec<_> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(functions, vec!["to_tree_map", "to_tree_list"]);
}

#[test]
fn config_controls_function_names() {
    let config = Config::from_toml(
        r#"
        [generate]
        function_prefix = "map_"
        function_suffix = "_by_id"
        list_functions = false
        "#,
    )
    .unwrap();

    let source = rowgraph::build::generate(METADATA, &config).unwrap();
    assert!(source.contains("map_tree_by_id"));
    assert!(!source.contains("_list"));
}

// Shape a generated function expects of a hand-written entity.
#[derive(Clone, Debug, PartialEq)]
struct Tree {
    id: u32,
    label: String,
}

impl FromRow for Tree {
    fn from_row<R: Row + ?Sized>(row: &R) -> Self {
        Self {
            id: row.get("tree", "id").unwrap_or_default(),
            label: row.get("tree", "label").unwrap_or_default(),
        }
    }
}

#[test]
fn hand_written_from_row_reads_plain_columns() {
    let row = MemRow::new()
        .with("tree", "id", 4_u32)
        .with("tree", "label", "oak")
        .with("tree_children", "id", 5_u32);

    assert_eq!(
        Tree::from_row(&row),
        Tree {
            id: 4,
            label: "oak".into()
        }
    );
}
