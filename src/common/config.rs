/// Size of a page in bytes (4 KB)
pub const PAGE_SIZE: usize = 4096;

/// Width of one header-page counter in bytes (big-endian i32)
pub const COUNTER_SIZE: usize = 4;

/// Default number of frames in the buffer pool
pub const DEFAULT_FRAME_COUNT: usize = 8;
