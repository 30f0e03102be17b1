//! Tests for category tree assembly and re-parenting rules

use uuid::Uuid;

use shared::models::{build_category_tree, descendant_ids, parent_options, Category, CategoryNode};

fn cat(id: Uuid, parent_id: Option<Uuid>, name: &str) -> Category {
    Category {
        id,
        parent_id,
        name: name.to_string(),
    }
}

/// A fixture forest:
///
/// Resins
/// ├── Natural
/// │   └── Pine
/// └── Synthetic
/// Solvents
fn fixture() -> (Vec<Category>, [Uuid; 5]) {
    let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let [resins, natural, pine, synthetic, solvents] = ids;
    let categories = vec![
        cat(solvents, None, "Solvents"),
        cat(pine, Some(natural), "Pine"),
        cat(natural, Some(resins), "Natural"),
        cat(synthetic, Some(resins), "Synthetic"),
        cat(resins, None, "Resins"),
    ];
    (categories, ids)
}

fn find<'a>(nodes: &'a [CategoryNode], name: &str) -> &'a CategoryNode {
    nodes
        .iter()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("node {name} missing"))
}

fn count_nodes(nodes: &[CategoryNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

#[test]
fn tree_has_expected_shape() {
    let (categories, _) = fixture();
    let tree = build_category_tree(&categories);

    // Roots sorted by name
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].name, "Resins");
    assert_eq!(tree[1].name, "Solvents");

    let resins = find(&tree, "Resins");
    assert_eq!(resins.children.len(), 2);
    assert_eq!(resins.children[0].name, "Natural");
    assert_eq!(resins.children[1].name, "Synthetic");

    let natural = find(&resins.children, "Natural");
    assert_eq!(natural.children.len(), 1);
    assert_eq!(natural.children[0].name, "Pine");
    assert!(natural.children[0].children.is_empty());
}

/// Every category appears in the forest exactly once.
#[test]
fn every_category_appears_exactly_once() {
    let (categories, _) = fixture();
    let tree = build_category_tree(&categories);
    assert_eq!(count_nodes(&tree), categories.len());
}

#[test]
fn empty_input_builds_empty_forest() {
    assert!(build_category_tree(&[]).is_empty());
}

/// A category pointing at a parent that is not in the set is shown as
/// a root rather than dropped.
#[test]
fn orphans_surface_as_roots() {
    let orphan = cat(Uuid::new_v4(), Some(Uuid::new_v4()), "Waxes");
    let tree = build_category_tree(&[orphan.clone()]);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id, orphan.id);
}

#[test]
fn descendants_cover_the_whole_subtree() {
    let (categories, [resins, natural, pine, synthetic, solvents]) = fixture();

    let below_resins = descendant_ids(&categories, resins);
    assert_eq!(below_resins.len(), 3);
    assert!(below_resins.contains(&natural));
    assert!(below_resins.contains(&pine));
    assert!(below_resins.contains(&synthetic));
    assert!(!below_resins.contains(&resins));
    assert!(!below_resins.contains(&solvents));

    assert!(descendant_ids(&categories, pine).is_empty());
}

/// When re-parenting a category, neither itself nor anything beneath
/// it may be offered; the rest of the forest may.
#[test]
fn parent_options_exclude_self_and_subtree() {
    let (categories, [resins, natural, pine, synthetic, solvents]) = fixture();

    let options = parent_options(&categories, resins);
    let ids: Vec<Uuid> = options.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![solvents]);

    // A mid-tree node may move anywhere except under its own subtree
    let options = parent_options(&categories, natural);
    let ids: Vec<Uuid> = options.iter().map(|c| c.id).collect();
    assert!(ids.contains(&resins));
    assert!(ids.contains(&synthetic));
    assert!(ids.contains(&solvents));
    assert!(!ids.contains(&natural));
    assert!(!ids.contains(&pine));
}

/// A parent cycle in stored data must not hang the walk.
#[test]
fn cyclic_parents_terminate() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let categories = vec![cat(a, Some(b), "A"), cat(b, Some(a), "B")];

    let below_a = descendant_ids(&categories, a);
    assert!(below_a.contains(&b));
    assert!(below_a.len() <= 2);
}
