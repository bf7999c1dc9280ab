mod builder;
mod tree;

pub use builder::build_leaves;
pub use tree::{DataEntry, NodeId, Tree};

use crate::common::Rid;

/// A built index: the tree plus the relation and column it covers.
pub struct Index {
    relation: String,
    column: usize,
    tree: Tree,
}

impl Index {
    /// Bulk-loads an index of the given order from `(key, rid)` pairs.
    pub fn build(
        relation: impl Into<String>,
        column: usize,
        order: usize,
        pairs: Vec<(i32, Rid)>,
    ) -> Self {
        let tree = Tree::bulk_load(order, build_leaves(pairs, order));
        Self {
            relation: relation.into(),
            column,
            tree,
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn search(&self, key: i32) -> Option<&[Rid]> {
        self.tree.search(key)
    }
}
