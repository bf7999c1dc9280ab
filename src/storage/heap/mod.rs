mod heap_file;

pub use heap_file::HeapFile;
