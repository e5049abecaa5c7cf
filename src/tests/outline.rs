use super::{HoistEntry, Outline, OutlineStore};

fn headlines(outline: &Outline, positions: &[super::Position]) -> Vec<String> {
    positions
        .iter()
        .map(|p| outline.headline(p).unwrap().to_string())
        .collect()
}

#[test]
fn test_preorder_traversal() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let a1 = outline.add_child(&a, "A1").unwrap();
    outline.add_child(&a1, "A1a").unwrap();
    outline.add_child(&a, "A2").unwrap();
    outline.add_top_level("B");

    let all = outline.all_positions();
    assert_eq!(headlines(&outline, &all), ["A", "A1", "A1a", "A2", "B"]);
    assert_eq!(all[2].path(), [0, 0, 0]);
    assert_eq!(all[2].level(), 2);
}

#[test]
fn test_clones_are_visited_once_by_unique_traversal() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let shared = outline.add_child(&a, "Shared").unwrap();
    outline.add_child(&shared, "Leaf").unwrap();
    let b = outline.add_top_level("B");
    let clone = outline.clone_as_child(&b, &shared).unwrap();

    assert_eq!(clone.node(), shared.node());
    assert_ne!(clone, shared);
    assert_eq!(outline.all_positions().len(), 6);
    assert_eq!(
        headlines(&outline, &outline.all_unique_positions()),
        ["A", "Shared", "Leaf", "B"]
    );
}

#[test]
fn test_clone_rejects_cycles() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let child = outline.add_child(&a, "Child").unwrap();
    assert!(outline.clone_as_child(&child, &a).is_none());
    assert!(outline.clone_as_child(&a, &a).is_none());
}

#[test]
fn test_positions_go_stale_after_edits() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let b = outline.add_top_level("B");
    let b1 = outline.add_child(&b, "B1").unwrap();

    assert!(outline.position_exists(&b1, None));
    assert!(outline.remove(&a));

    // Same paths now resolve to different nodes, or to nothing.
    assert!(!outline.position_exists(&b, None));
    assert!(!outline.position_exists(&b1, None));
    assert_eq!(outline.headline(&a), None);
    assert_eq!(outline.find_by_headline("B").map(|p| p.node()), Some(b.node()));
    assert_eq!(outline.headline(&b1), None);
}

#[test]
fn test_scoped_existence() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let a1 = outline.add_child(&a, "A1").unwrap();
    let b = outline.add_top_level("B");

    assert!(outline.position_exists(&a1, Some(&a)));
    assert!(outline.position_exists(&a, Some(&a)));
    assert!(!outline.position_exists(&b, Some(&a)));
    assert!(!outline.position_exists(&a, Some(&a1)));
}

#[test]
fn test_subtree_and_siblings() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let a1 = outline.add_child(&a, "A1").unwrap();
    outline.add_child(&a1, "A1a").unwrap();
    let a2 = outline.add_child(&a, "A2").unwrap();
    outline.add_top_level("B");

    assert_eq!(
        headlines(&outline, &outline.self_and_subtree(&a1)),
        ["A1", "A1a"]
    );
    assert_eq!(headlines(&outline, &outline.siblings(&a2)), ["A1", "A2"]);
    assert_eq!(headlines(&outline, &outline.siblings(&a)), ["A", "B"]);
    assert_eq!(outline.first_child(&a), Some(a1));
    assert!(!outline.has_children(&a2));
}

#[test]
fn test_move_keeps_identity() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let marker = outline.add_child(&a, "@chapter Moved").unwrap();
    outline.add_top_level("B");

    let moved = outline.move_to_top_level(&marker).unwrap();
    assert_eq!(moved.node(), marker.node());
    assert_eq!(moved.path(), [2]);
    assert!(!outline.position_exists(&marker, None));
    assert_eq!(outline.find_by_headline("@chapter Moved"), Some(moved));
}

#[test]
fn test_hoist_stack_is_lifo() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    let b = outline.add_top_level("B");
    outline.push_hoist(HoistEntry {
        root: a.clone(),
        expanded: true,
    });
    outline.push_hoist(HoistEntry {
        root: b.clone(),
        expanded: false,
    });
    assert_eq!(outline.hoist_stack().len(), 2);
    assert_eq!(outline.pop_hoist().unwrap().root, b);
    assert_eq!(outline.pop_hoist().unwrap().root, a);
    assert!(outline.pop_hoist().is_none());
}

#[test]
fn test_set_current_does_not_touch_hoist() {
    let mut outline = Outline::new();
    let a = outline.add_top_level("A");
    outline.set_current_position(&a);
    assert_eq!(outline.current_position(), Some(a));
    assert!(outline.hoist_stack().is_empty());
}
