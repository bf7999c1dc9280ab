use std::sync::Arc;

use bytes::{Buf, BufMut};

use crate::common::{DbError, Result, Rid};
use crate::record::{ColumnType, RelationSchema};

/// A materialized record: its values in printable form plus, once it
/// has been stored or read, the [`Rid`] locating it on disk.
///
/// All columns serialize big-endian. String fields write only the
/// characters actually present and leave the rest of the field region
/// untouched, so a short string read back from a fresh page carries
/// trailing NULs while one read from a reused slot carries whatever
/// the previous occupant left there. Reads always consume the full
/// declared width.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<RelationSchema>,
    values: Vec<String>,
    rid: Option<Rid>,
}

impl Record {
    pub fn new(schema: Arc<RelationSchema>, values: Vec<String>) -> Self {
        Self {
            schema,
            values,
            rid: None,
        }
    }

    pub fn schema(&self) -> &Arc<RelationSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    pub fn rid(&self) -> Option<Rid> {
        self.rid
    }

    pub fn set_rid(&mut self, rid: Rid) {
        self.rid = Some(rid);
    }

    /// Serializes the record into `slot`, which must be exactly
    /// `record_size` bytes. Values must already have passed
    /// [`RelationSchema::validate_values`].
    pub fn write_to(&self, slot: &mut [u8]) -> Result<()> {
        debug_assert_eq!(slot.len(), self.schema.record_size());
        let mut offset = 0;
        for (idx, (ty, value)) in self.schema.columns().iter().zip(&self.values).enumerate() {
            let width = ty.byte_size();
            let mut field = &mut slot[offset..offset + width];
            match ty {
                ColumnType::Int => {
                    let v: i32 = value.parse().map_err(|_| {
                        DbError::SchemaMismatch(format!("column {}: {:?} is not an int", idx, value))
                    })?;
                    field.put_i32(v);
                }
                ColumnType::Float => {
                    let v: f32 = value.parse().map_err(|_| {
                        DbError::SchemaMismatch(format!(
                            "column {}: {:?} is not a float",
                            idx, value
                        ))
                    })?;
                    field.put_f32(v);
                }
                ColumnType::Str(n) => {
                    if value.encode_utf16().count() > *n {
                        return Err(DbError::ValueTooLong {
                            column: idx,
                            max: *n,
                        });
                    }
                    for unit in value.encode_utf16() {
                        field.put_u16(unit);
                    }
                }
            }
            offset += width;
        }
        Ok(())
    }

    /// Deserializes a record from `slot` (exactly `record_size` bytes).
    pub fn read_from(schema: Arc<RelationSchema>, slot: &[u8], rid: Rid) -> Self {
        debug_assert_eq!(slot.len(), schema.record_size());
        let mut values = Vec::with_capacity(schema.column_count());
        let mut offset = 0;
        for ty in schema.columns() {
            let width = ty.byte_size();
            let mut field = &slot[offset..offset + width];
            match ty {
                ColumnType::Int => values.push(field.get_i32().to_string()),
                ColumnType::Float => values.push(field.get_f32().to_string()),
                ColumnType::Str(n) => {
                    let units: Vec<u16> = (0..*n).map(|_| field.get_u16()).collect();
                    values.push(String::from_utf16_lossy(&units));
                }
            }
            offset += width;
        }
        Self {
            schema,
            values,
            rid: Some(rid),
        }
    }
}
