mod buffer_pool;
mod frame;
mod page_guard;

pub use buffer_pool::BufferPool;
pub use frame::Frame;
pub use page_guard::PageGuard;
