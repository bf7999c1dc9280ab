use std::sync::Arc;

use crate::common::{DbError, Result};
use crate::index::Index;
use crate::record::{ColumnType, RelationSchema};

/// In-memory catalog: every relation schema plus every built index.
///
/// File indices are assigned in registration order, so the n-th
/// relation created lives in `rel_n.tbl`.
pub struct Catalog {
    relations: Vec<Arc<RelationSchema>>,
    indexes: Vec<Index>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            relations: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, columns: Vec<ColumnType>) -> Result<Arc<RelationSchema>> {
        if self.relations.iter().any(|s| s.name() == name) {
            return Err(DbError::RelationExists(name.to_string()));
        }
        let file_idx = self.relations.len() as u32;
        let schema = Arc::new(RelationSchema::new(name, columns, file_idx));
        self.relations.push(schema.clone());
        Ok(schema)
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<RelationSchema>> {
        self.relations
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| DbError::RelationNotFound(name.to_string()))
    }

    pub fn relation_names(&self) -> Vec<String> {
        self.relations.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Installs `index`, replacing any previous index on the same
    /// relation and column.
    pub fn add_index(&mut self, index: Index) {
        self.indexes
            .retain(|i| !(i.relation() == index.relation() && i.column() == index.column()));
        self.indexes.push(index);
    }

    pub fn index_for(&self, relation: &str, column: usize) -> Result<&Index> {
        self.indexes
            .iter()
            .find(|i| i.relation() == relation && i.column() == column)
            .ok_or_else(|| DbError::IndexNotFound {
                relation: relation.to_string(),
                column,
            })
    }

    pub fn clear(&mut self) {
        self.relations.clear();
        self.indexes.clear();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
