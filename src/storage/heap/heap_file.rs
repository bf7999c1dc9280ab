use std::sync::Arc;

use log::debug;

use crate::buffer::BufferPool;
use crate::common::{DbError, Result, PageId, Rid, COUNTER_SIZE, PAGE_SIZE};
use crate::record::{Record, RelationSchema};
use crate::storage::page::{DataPage, DataPageMut, HeaderPage, HeaderPageMut};

/// Heap file storing the records of one relation.
///
/// Page 0 of the file is the header page; data pages follow with
/// 1-based indices. All page access goes through the buffer pool, and
/// at most one page is pinned at a time.
pub struct HeapFile {
    schema: Arc<RelationSchema>,
    pool: Arc<BufferPool>,
}

impl HeapFile {
    pub fn new(schema: Arc<RelationSchema>, pool: Arc<BufferPool>) -> Self {
        Self { schema, pool }
    }

    pub fn schema(&self) -> &Arc<RelationSchema> {
        &self.schema
    }

    fn header_page_id(&self) -> PageId {
        PageId::new(self.schema.file_idx(), 0)
    }

    /// Creates the backing file with an empty header page. Truncates
    /// any previous contents.
    pub fn create_on_disk(&self) -> Result<()> {
        let file_idx = self.schema.file_idx();
        let disk = self.pool.disk();
        disk.create_file(file_idx)?;
        let header = disk.allocate_page(file_idx)?;
        debug_assert_eq!(header.page_idx, 0);
        debug!("created heap file for relation {}", self.schema.name());
        Ok(())
    }

    /// Appends a fresh data page to the file and registers it in the
    /// header with all slots free. Returns the new page's index.
    pub fn allocate_data_page(&self) -> Result<u32> {
        let file_idx = self.schema.file_idx();
        let mut guard = self.pool.fetch(self.header_page_id())?;
        {
            let data = guard.data();
            let header = HeaderPage::new(&data[..]);
            let next = header.data_page_count() as usize + 1;
            if (next + 1) * COUNTER_SIZE > PAGE_SIZE {
                return Err(DbError::HeaderFull(file_idx));
            }
        }
        let page_id = self.pool.disk().allocate_page(file_idx)?;
        let mut data = guard.data_mut();
        let mut header = HeaderPageMut::new(&mut data[..]);
        let page_idx = header.register_data_page(file_idx, self.schema.slot_capacity() as u32)?;
        debug_assert_eq!(page_idx, page_id.page_idx);
        Ok(page_idx)
    }

    /// First data page with at least one free slot, allocating a new
    /// one when every existing page is full.
    fn find_free_page(&self) -> Result<u32> {
        let found = {
            let guard = self.pool.fetch(self.header_page_id())?;
            let data = guard.data();
            let header = HeaderPage::new(&data[..]);
            (1..=header.data_page_count()).find(|&idx| header.free_slots(idx) > 0)
        };
        match found {
            Some(idx) => Ok(idx),
            None => self.allocate_data_page(),
        }
    }

    fn bump_free_slots(&self, page_idx: u32, delta: i64) -> Result<()> {
        let mut guard = self.pool.fetch(self.header_page_id())?;
        let mut data = guard.data_mut();
        let mut header = HeaderPageMut::new(&mut data[..]);
        let free = header.free_slots(page_idx) as i64 + delta;
        header.set_free_slots(page_idx, free.max(0) as u32);
        Ok(())
    }

    /// Stores `record` in the first free slot of the first non-full
    /// page, first-fit in both dimensions. Returns the record's
    /// location; its `record_offset` is the byte offset of the slot
    /// within the page.
    pub fn insert(&self, record: &Record) -> Result<Rid> {
        let page_idx = self.find_free_page()?;
        let page_id = PageId::new(self.schema.file_idx(), page_idx);
        let slot = {
            let mut guard = self.pool.fetch(page_id)?;
            let mut data = guard.data_mut();
            let mut page = DataPageMut::new(
                &mut data[..],
                self.schema.record_size(),
                self.schema.slot_capacity(),
            );
            let slot = page
                .first_free_slot()
                .ok_or(DbError::CorruptPage(page_id))?;
            record.write_to(page.record_mut(slot))?;
            page.set_occupied(slot, true);
            slot
        };
        self.bump_free_slots(page_idx, -1)?;
        Ok(Rid::new(page_id, self.schema.slot_offset(slot) as u32))
    }

    /// Frees the slot holding `rid`. The record payload itself is left
    /// in place; only the bytemap bit and the header counter change.
    /// Deleting an already-free slot is a no-op.
    pub fn delete(&self, rid: Rid) -> Result<()> {
        let slot = self.schema.slot_of_offset(rid.record_offset as usize);
        let was_occupied = {
            let mut guard = self.pool.fetch(rid.page_id)?;
            let mut data = guard.data_mut();
            let mut page = DataPageMut::new(
                &mut data[..],
                self.schema.record_size(),
                self.schema.slot_capacity(),
            );
            let occupied = page.is_occupied(slot);
            if occupied {
                page.set_occupied(slot, false);
            }
            occupied
        };
        if was_occupied {
            self.bump_free_slots(rid.page_id.page_idx, 1)?;
        }
        Ok(())
    }

    /// Snapshot of the header counters: data page count plus the
    /// free-slot count of each data page, indexed from 1.
    fn header_snapshot(&self) -> Result<(u32, Vec<u32>)> {
        let guard = self.pool.fetch(self.header_page_id())?;
        let data = guard.data();
        let header = HeaderPage::new(&data[..]);
        let count = header.data_page_count();
        let free: Vec<u32> = (1..=count).map(|idx| header.free_slots(idx)).collect();
        Ok((count, free))
    }

    fn records_of_page(&self, page_idx: u32) -> Result<Vec<Record>> {
        let page_id = PageId::new(self.schema.file_idx(), page_idx);
        let guard = self.pool.fetch(page_id)?;
        let data = guard.data();
        let page = DataPage::new(
            &data[..],
            self.schema.record_size(),
            self.schema.slot_capacity(),
        );
        let mut records = Vec::new();
        for slot in 0..self.schema.slot_capacity() {
            if page.is_occupied(slot) {
                let rid = Rid::new(page_id, self.schema.slot_offset(slot) as u32);
                records.push(Record::read_from(self.schema.clone(), page.record(slot), rid));
            }
        }
        Ok(records)
    }

    /// All live records of the relation, in page order and ascending
    /// slot order within each page. Pages the header marks as entirely
    /// free are skipped without being fetched.
    pub fn scan_all(&self) -> Result<Vec<Record>> {
        let (count, free) = self.header_snapshot()?;
        let mut records = Vec::new();
        for page_idx in 1..=count {
            if free[(page_idx - 1) as usize] as usize == self.schema.slot_capacity() {
                continue;
            }
            records.extend(self.records_of_page(page_idx)?);
        }
        Ok(records)
    }

    /// Live records of data page `page_idx` (1-based). Returns `None`
    /// when the index is past the last data page, and `Some` of an
    /// empty vector for a page whose slots are all free.
    pub fn scan_page(&self, page_idx: u32) -> Result<Option<Vec<Record>>> {
        let (count, _) = self.header_snapshot()?;
        if page_idx == 0 || page_idx > count {
            return Ok(None);
        }
        Ok(Some(self.records_of_page(page_idx)?))
    }

    /// Materializes the records at `rids`, which must be sorted by
    /// page so that each page is fetched once.
    pub fn fetch_by_rids(&self, rids: &[Rid]) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(rids.len());
        let mut i = 0;
        while i < rids.len() {
            let page_id = rids[i].page_id;
            let guard = self.pool.fetch(page_id)?;
            let data = guard.data();
            let page = DataPage::new(
                &data[..],
                self.schema.record_size(),
                self.schema.slot_capacity(),
            );
            while i < rids.len() && rids[i].page_id == page_id {
                let slot = self.schema.slot_of_offset(rids[i].record_offset as usize);
                records.push(Record::read_from(
                    self.schema.clone(),
                    page.record(slot),
                    rids[i],
                ));
                i += 1;
            }
        }
        Ok(records)
    }
}
