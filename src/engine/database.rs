use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::buffer::BufferPool;
use crate::common::{DbError, Result, Rid, DEFAULT_FRAME_COUNT};
use crate::engine::Catalog;
use crate::index::Index;
use crate::record::{ColumnType, Record, RelationSchema};
use crate::storage::disk::DiskManager;
use crate::storage::heap::HeapFile;

/// Top-level engine facade owning the disk manager, the buffer pool,
/// and the catalog. All operations on relations go through it.
pub struct Database {
    pool: Arc<BufferPool>,
    catalog: Catalog,
}

impl Database {
    /// Opens a database rooted at `base_dir` with an explicit buffer
    /// pool size.
    pub fn with_frame_count(base_dir: impl AsRef<Path>, frame_count: usize) -> Result<Self> {
        let disk = Arc::new(DiskManager::new(base_dir)?);
        let pool = Arc::new(BufferPool::new(frame_count, disk));
        Ok(Self {
            pool,
            catalog: Catalog::new(),
        })
    }

    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_frame_count(base_dir, DEFAULT_FRAME_COUNT)
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    pub fn relation_names(&self) -> Vec<String> {
        self.catalog.relation_names()
    }

    pub fn schema_of(&self, relation: &str) -> Result<Arc<RelationSchema>> {
        Ok(self.catalog.lookup(relation)?.clone())
    }

    fn heap(&self, relation: &str) -> Result<HeapFile> {
        let schema = self.catalog.lookup(relation)?.clone();
        Ok(HeapFile::new(schema, self.pool.clone()))
    }

    /// Creates a relation and its empty heap file on disk.
    pub fn create_relation(&mut self, name: &str, columns: Vec<ColumnType>) -> Result<()> {
        let schema = self.catalog.register(name, columns)?;
        let heap = HeapFile::new(schema, self.pool.clone());
        heap.create_on_disk()?;
        info!("created relation {}", name);
        Ok(())
    }

    /// Validates `values` against the relation's schema and stores
    /// them as a new record. Nothing is written when validation fails.
    pub fn insert(&self, relation: &str, values: Vec<String>) -> Result<Rid> {
        let heap = self.heap(relation)?;
        heap.schema().validate_values(&values)?;
        let record = Record::new(heap.schema().clone(), values);
        heap.insert(&record)
    }

    pub fn scan_all(&self, relation: &str) -> Result<Vec<Record>> {
        self.heap(relation)?.scan_all()
    }

    /// Records whose stored value in `column` equals `value`. The
    /// comparison is on the deserialized printable form, so fixed
    /// string columns compare including their trailing padding.
    pub fn scan_where(&self, relation: &str, column: usize, value: &str) -> Result<Vec<Record>> {
        let heap = self.heap(relation)?;
        heap.schema().column(column)?;
        let records = heap.scan_all()?;
        Ok(records
            .into_iter()
            .filter(|r| r.value(column) == Some(value))
            .collect())
    }

    /// Deletes every record matching the predicate, returning how
    /// many were removed.
    pub fn delete_where(&self, relation: &str, column: usize, value: &str) -> Result<usize> {
        let heap = self.heap(relation)?;
        heap.schema().column(column)?;
        let matches = self.scan_where(relation, column, value)?;
        let mut deleted = 0;
        for record in matches {
            if let Some(rid) = record.rid() {
                heap.delete(rid)?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Bulk-loads a B+tree over `column`, replacing any index the
    /// relation already has on it. Every stored value in the column
    /// must parse as an integer.
    pub fn build_index(&mut self, relation: &str, column: usize, order: usize) -> Result<()> {
        let heap = self.heap(relation)?;
        heap.schema().column(column)?;
        let records = heap.scan_all()?;
        let mut pairs = Vec::with_capacity(records.len());
        for record in records {
            let (Some(text), Some(rid)) = (record.value(column), record.rid()) else {
                continue;
            };
            let key: i32 = text.parse().map_err(|_| {
                DbError::SchemaMismatch(format!(
                    "column {} of {}: {:?} is not an indexable int",
                    column, relation, text
                ))
            })?;
            pairs.push((key, rid));
        }
        info!(
            "built index on {}.{} over {} records",
            relation,
            column,
            pairs.len()
        );
        self.catalog
            .add_index(Index::build(relation, column, order, pairs));
        Ok(())
    }

    /// Point lookup through a previously built index. An absent key
    /// yields an empty result.
    pub fn lookup_by_index(&self, relation: &str, column: usize, key: i32) -> Result<Vec<Record>> {
        let index = self.catalog.index_for(relation, column)?;
        let Some(rids) = index.search(key) else {
            return Ok(Vec::new());
        };
        let mut rids = rids.to_vec();
        rids.sort();
        self.heap(relation)?.fetch_by_rids(&rids)
    }

    /// Page-at-a-time nested-loop equi-join. For each data page of
    /// the left relation, the right relation is scanned in full and
    /// matching value lists are concatenated left-then-right.
    pub fn equi_join(
        &self,
        left: &str,
        left_column: usize,
        right: &str,
        right_column: usize,
    ) -> Result<Vec<Vec<String>>> {
        let left_heap = self.heap(left)?;
        let right_heap = self.heap(right)?;
        left_heap.schema().column(left_column)?;
        right_heap.schema().column(right_column)?;

        let mut rows = Vec::new();
        let mut page_idx = 1;
        while let Some(outer) = left_heap.scan_page(page_idx)? {
            if !outer.is_empty() {
                let inner = right_heap.scan_all()?;
                for outer_record in &outer {
                    for inner_record in &inner {
                        if outer_record.value(left_column) == inner_record.value(right_column) {
                            let mut row = outer_record.values().to_vec();
                            row.extend(inner_record.values().iter().cloned());
                            rows.push(row);
                        }
                    }
                }
            }
            page_idx += 1;
        }
        Ok(rows)
    }

    /// Writes every dirty page back to disk and empties the pool.
    pub fn flush_and_close(&self) -> Result<()> {
        self.pool.flush_all()
    }

    /// Drops all cached pages without flushing, removes every
    /// relation file on disk, and clears the catalog.
    pub fn reset_database(&mut self) -> Result<()> {
        self.pool.clear();
        self.pool.disk().purge_all()?;
        self.catalog.clear();
        info!("database reset");
        Ok(())
    }
}
