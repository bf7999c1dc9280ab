mod data_page;
mod header_page;

pub use data_page::{DataPage, DataPageMut};
pub use header_page::{HeaderPage, HeaderPageMut};
