use crate::common::{DbError, Result, COUNTER_SIZE, PAGE_SIZE};

fn read_counter(data: &[u8], idx: usize) -> i32 {
    let start = idx * COUNTER_SIZE;
    let bytes: [u8; 4] = data[start..start + COUNTER_SIZE]
        .try_into()
        .unwrap_or([0; 4]);
    i32::from_be_bytes(bytes)
}

fn write_counter(data: &mut [u8], idx: usize, value: i32) {
    let start = idx * COUNTER_SIZE;
    data[start..start + COUNTER_SIZE].copy_from_slice(&value.to_be_bytes());
}

/// Read-only view over the header page of a heap file.
///
/// Byte layout: a big-endian `i32` at offset 0 holds the number of
/// data pages in the file; for data page `n` (1-based), the `i32` at
/// offset `4 * n` holds that page's free-slot count.
pub struct HeaderPage<'a> {
    data: &'a [u8],
}

impl<'a> HeaderPage<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Self { data }
    }

    pub fn data_page_count(&self) -> u32 {
        read_counter(self.data, 0).max(0) as u32
    }

    /// Free-slot count recorded for data page `page_idx` (1-based).
    pub fn free_slots(&self, page_idx: u32) -> u32 {
        read_counter(self.data, page_idx as usize).max(0) as u32
    }
}

/// Mutable view over a header page.
pub struct HeaderPageMut<'a> {
    data: &'a mut [u8],
}

impl<'a> HeaderPageMut<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Self { data }
    }

    pub fn data_page_count(&self) -> u32 {
        read_counter(self.data, 0).max(0) as u32
    }

    pub fn free_slots(&self, page_idx: u32) -> u32 {
        read_counter(self.data, page_idx as usize).max(0) as u32
    }

    pub fn set_free_slots(&mut self, page_idx: u32, free: u32) {
        write_counter(self.data, page_idx as usize, free as i32);
    }

    /// Records a newly allocated data page with `free` free slots and
    /// bumps the page count. Fails with [`DbError::HeaderFull`] when
    /// the header has no room left for another counter.
    pub fn register_data_page(&mut self, file_idx: u32, free: u32) -> Result<u32> {
        let page_idx = self.data_page_count() + 1;
        if (page_idx as usize + 1) * COUNTER_SIZE > PAGE_SIZE {
            return Err(DbError::HeaderFull(file_idx));
        }
        write_counter(self.data, 0, page_idx as i32);
        write_counter(self.data, page_idx as usize, free as i32);
        Ok(page_idx)
    }
}
