use crate::mappings::*;
use rowgraph::MemRow;

fn category_row(id: u32, child: Option<u32>) -> MemRow {
    MemRow::new()
        .with("category", "id", id)
        .with("category", "name", format!("category {id}"))
        .with("category_children", "id", child)
}

#[test]
fn self_referential_tree_links_children_and_parent() {
    let rows = [
        category_row(1, Some(2)),
        category_row(1, Some(3)),
        category_row(2, None),
        category_row(3, None),
    ];
    let categories = to_category_map(&rows);
    assert_eq!(categories.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

    let root = &categories[&1];
    assert_eq!(root.children.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(root.children[0].name, "category 2");
    for child in &root.children {
        assert_eq!(child.parent.as_ref().map(|p| p.id), Some(1));
    }
    assert!(root.parent.is_none());
    assert!(categories[&2].children.is_empty());
}

#[test]
fn missing_child_rows_leave_no_children() {
    // child 4 is referenced but never appears as a row of its own
    let rows = [category_row(1, Some(4))];

    assert!(to_category_map(&rows)[&1].children.is_empty());
}
