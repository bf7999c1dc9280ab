use crate::common::{DbError, Result, PAGE_SIZE};
use crate::record::ColumnType;

/// Schema of a relation: an ordered list of fixed-width columns plus
/// the layout constants derived from them.
///
/// A relation's records all have the same size, so every data page of
/// its heap file holds the same number of slots. One byte of bytemap
/// is reserved per slot, which gives the capacity formula
/// `PAGE_SIZE / (record_size + 1)`.
#[derive(Debug)]
pub struct RelationSchema {
    name: String,
    columns: Vec<ColumnType>,
    file_idx: u32,
    record_size: usize,
    slot_capacity: usize,
}

impl RelationSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnType>, file_idx: u32) -> Self {
        let record_size: usize = columns.iter().map(ColumnType::byte_size).sum();
        let slot_capacity = PAGE_SIZE / (record_size + 1);
        Self {
            name: name.into(),
            columns,
            file_idx,
            record_size,
            slot_capacity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnType] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Result<ColumnType> {
        self.columns
            .get(idx)
            .copied()
            .ok_or(DbError::ColumnOutOfRange {
                column: idx,
                count: self.columns.len(),
            })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn file_idx(&self) -> u32 {
        self.file_idx
    }

    /// Size of one record in bytes.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Number of record slots per data page.
    pub fn slot_capacity(&self) -> usize {
        self.slot_capacity
    }

    /// Byte offset within a data page where slot `slot` begins. The
    /// first `slot_capacity` bytes of the page are the bytemap.
    pub fn slot_offset(&self, slot: usize) -> usize {
        self.slot_capacity + self.record_size * slot
    }

    /// Inverse of [`slot_offset`](Self::slot_offset).
    pub fn slot_of_offset(&self, offset: usize) -> usize {
        (offset - self.slot_capacity) / self.record_size
    }

    /// Checks that `values` can be stored under this schema: the value
    /// count matches the column count, numeric values parse, and no
    /// string exceeds its declared width.
    pub fn validate_values(&self, values: &[String]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(DbError::SchemaMismatch(format!(
                "relation {} expects {} values, got {}",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }
        for (idx, (ty, value)) in self.columns.iter().zip(values).enumerate() {
            match ty {
                ColumnType::Int => {
                    if value.parse::<i32>().is_err() {
                        return Err(DbError::SchemaMismatch(format!(
                            "column {} of {}: {:?} is not an int",
                            idx, self.name, value
                        )));
                    }
                }
                ColumnType::Float => {
                    if value.parse::<f32>().is_err() {
                        return Err(DbError::SchemaMismatch(format!(
                            "column {} of {}: {:?} is not a float",
                            idx, self.name, value
                        )));
                    }
                }
                ColumnType::Str(n) => {
                    if value.encode_utf16().count() > *n {
                        return Err(DbError::ValueTooLong {
                            column: idx,
                            max: *n,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
