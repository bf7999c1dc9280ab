mod config;
mod error;
mod types;

pub use config::{COUNTER_SIZE, DEFAULT_FRAME_COUNT, PAGE_SIZE};
pub use error::{DbError, Result};
pub use types::{PageId, Rid};
