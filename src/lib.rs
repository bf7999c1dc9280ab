//! Reldb - a minimal single-node relational storage engine in Rust
//!
//! This crate provides the core components of a disk-oriented storage
//! engine: relations are stored as heap files of fixed-size records,
//! all page access goes through a buffer pool with CLOCK replacement,
//! and point lookups can be served by bulk-loaded B+tree indexes.
//!
//! # Architecture
//!
//! The system is organized into several layers:
//!
//! - **Storage Layer** (`storage`): Disk I/O and page organization
//!   - `DiskManager`: Reads and writes 4 KiB pages per relation file
//!   - `HeaderPage`/`DataPage`: Typed views over raw page bytes
//!   - `HeapFile`: Slotted heap file of fixed-size records
//!
//! - **Buffer Pool** (`buffer`): Memory management for database pages
//!   - `BufferPool`: Caches pages in frames, CLOCK eviction
//!   - `Frame`: Per-frame metadata and data storage
//!   - `PageGuard`: RAII guard that unpins its page on drop
//!
//! - **Records** (`record`): Schemas and the on-disk record codec
//!   - `ColumnType`/`RelationSchema`: Fixed-width column layouts
//!   - `Record`: Big-endian serialization of typed values
//!
//! - **Index** (`index`): Bulk-loaded static B+tree over integer keys
//!
//! - **Engine** (`engine`): `Catalog` and the `Database` facade
//!
//! # Example
//!
//! ```rust,no_run
//! use reldb::engine::Database;
//! use reldb::record::ColumnType;
//!
//! let mut db = Database::open("data").unwrap();
//! db.create_relation("users", vec![ColumnType::Int, ColumnType::Str(8)])
//!     .unwrap();
//! db.insert("users", vec!["1".into(), "alice".into()]).unwrap();
//!
//! db.build_index("users", 0, 2).unwrap();
//! let hits = db.lookup_by_index("users", 0, 1).unwrap();
//! assert_eq!(hits.len(), 1);
//!
//! db.flush_and_close().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod engine;
pub mod index;
pub mod record;
pub mod storage;

pub use common::{DbError, PageId, Result, Rid};
