use crate::common::PAGE_SIZE;

/// Read-only view over a data page of a heap file.
///
/// The first `slot_capacity` bytes are a bytemap, one byte per slot
/// (`1` = occupied, `0` = free). The fixed-size record slots follow,
/// slot `s` starting at `slot_capacity + record_size * s`.
pub struct DataPage<'a> {
    data: &'a [u8],
    record_size: usize,
    slot_capacity: usize,
}

impl<'a> DataPage<'a> {
    pub fn new(data: &'a [u8], record_size: usize, slot_capacity: usize) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Self {
            data,
            record_size,
            slot_capacity,
        }
    }

    pub fn slot_capacity(&self) -> usize {
        self.slot_capacity
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        debug_assert!(slot < self.slot_capacity);
        self.data[slot] != 0
    }

    pub fn occupied_count(&self) -> usize {
        (0..self.slot_capacity).filter(|&s| self.is_occupied(s)).count()
    }

    pub fn record(&self, slot: usize) -> &[u8] {
        let start = self.slot_capacity + self.record_size * slot;
        &self.data[start..start + self.record_size]
    }
}

/// Mutable view over a data page.
pub struct DataPageMut<'a> {
    data: &'a mut [u8],
    record_size: usize,
    slot_capacity: usize,
}

impl<'a> DataPageMut<'a> {
    pub fn new(data: &'a mut [u8], record_size: usize, slot_capacity: usize) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Self {
            data,
            record_size,
            slot_capacity,
        }
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        debug_assert!(slot < self.slot_capacity);
        self.data[slot] != 0
    }

    pub fn set_occupied(&mut self, slot: usize, occupied: bool) {
        debug_assert!(slot < self.slot_capacity);
        self.data[slot] = occupied as u8;
    }

    /// First free slot in ascending order, if any.
    pub fn first_free_slot(&self) -> Option<usize> {
        (0..self.slot_capacity).find(|&s| !self.is_occupied(s))
    }

    pub fn record_mut(&mut self, slot: usize) -> &mut [u8] {
        let start = self.slot_capacity + self.record_size * slot;
        &mut self.data[start..start + self.record_size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD_SIZE: usize = 12;
    const SLOT_CAPACITY: usize = PAGE_SIZE / (RECORD_SIZE + 1);

    #[test]
    fn test_bytemap_tracks_occupancy() {
        let mut data = vec![0u8; PAGE_SIZE];
        let mut page = DataPageMut::new(&mut data, RECORD_SIZE, SLOT_CAPACITY);
        assert_eq!(page.first_free_slot(), Some(0));

        page.set_occupied(0, true);
        page.set_occupied(1, true);
        assert_eq!(page.first_free_slot(), Some(2));

        page.set_occupied(0, false);
        assert_eq!(page.first_free_slot(), Some(0));

        let view = DataPage::new(&data, RECORD_SIZE, SLOT_CAPACITY);
        assert!(!view.is_occupied(0));
        assert!(view.is_occupied(1));
        assert_eq!(view.occupied_count(), 1);
    }

    #[test]
    fn test_record_slices_do_not_overlap() {
        let mut data = vec![0u8; PAGE_SIZE];
        let mut page = DataPageMut::new(&mut data, RECORD_SIZE, SLOT_CAPACITY);
        page.record_mut(0).fill(0xAA);
        page.record_mut(1).fill(0xBB);

        let view = DataPage::new(&data, RECORD_SIZE, SLOT_CAPACITY);
        assert!(view.record(0).iter().all(|&b| b == 0xAA));
        assert!(view.record(1).iter().all(|&b| b == 0xBB));
        assert_eq!(view.record(0).len(), RECORD_SIZE);
    }

    #[test]
    fn test_full_page_has_no_free_slot() {
        let mut data = vec![0u8; PAGE_SIZE];
        let mut page = DataPageMut::new(&mut data, RECORD_SIZE, SLOT_CAPACITY);
        for slot in 0..SLOT_CAPACITY {
            page.set_occupied(slot, true);
        }
        assert_eq!(page.first_free_slot(), None);
    }
}
