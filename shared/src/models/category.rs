//! Category models and tree assembly

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A flat category row; `parent_id == None` marks a root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
}

/// A category with its direct descendants resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: Uuid,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

/// Assemble a flat category list into a forest.
///
/// Each node's `children` contains only its direct descendants, ordered by
/// name. A node whose parent is not in the input set is treated as a root
/// so that every input node appears exactly once.
pub fn build_category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut children_of: HashMap<Option<Uuid>, Vec<&Category>> = HashMap::new();
    for category in categories {
        let key = category.parent_id.filter(|parent| ids.contains(parent));
        children_of.entry(key).or_default().push(category);
    }
    for siblings in children_of.values_mut() {
        siblings.sort_by(|a, b| a.name.cmp(&b.name));
    }
    build_level(None, &children_of)
}

fn build_level(
    parent: Option<Uuid>,
    children_of: &HashMap<Option<Uuid>, Vec<&Category>>,
) -> Vec<CategoryNode> {
    children_of
        .get(&parent)
        .map(|siblings| {
            siblings
                .iter()
                .map(|category| CategoryNode {
                    id: category.id,
                    name: category.name.clone(),
                    children: build_level(Some(category.id), children_of),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// All ids in `root`'s subtree, excluding `root` itself
pub fn descendant_ids(categories: &[Category], root: Uuid) -> HashSet<Uuid> {
    let mut children_of: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for category in categories {
        if let Some(parent) = category.parent_id {
            children_of.entry(parent).or_default().push(category.id);
        }
    }

    let mut found = HashSet::new();
    let mut queue = vec![root];
    while let Some(current) = queue.pop() {
        if let Some(children) = children_of.get(&current) {
            for child in children {
                // A malformed parent chain must not loop forever
                if found.insert(*child) {
                    queue.push(*child);
                }
            }
        }
    }
    found
}

/// Candidate parents when editing `editing`: everything except the category
/// itself and its descendants, so a category can never become its own
/// ancestor.
pub fn parent_options(categories: &[Category], editing: Uuid) -> Vec<Category> {
    let excluded = descendant_ids(categories, editing);
    categories
        .iter()
        .filter(|category| category.id != editing && !excluded.contains(&category.id))
        .cloned()
        .collect()
}
