mod column_type;
mod record;
mod schema;

pub use column_type::ColumnType;
pub use record::Record;
pub use schema::RelationSchema;
