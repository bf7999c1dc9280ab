use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;

use crate::common::{DbError, PageId, Result};
use crate::storage::disk::DiskManager;

use super::{Frame, PageGuard};

/// Page table and replacement state, guarded as one unit so the frame a
/// page maps to can never change between lookup and pin.
struct PoolInner {
    /// Maps page ids to frame indices
    page_table: HashMap<PageId, usize>,
    /// Frames not currently holding any page
    free_list: VecDeque<usize>,
    /// Current CLOCK sweep position
    clock_hand: usize,
}

/// BufferPool presents at most `frame_count` pages in memory at a time,
/// hiding disk latency behind a cache and evicting with the CLOCK policy
/// when full. Pages are handed out as pinned [`PageGuard`]s; a frame is
/// never evicted while its pin count is above zero.
pub struct BufferPool {
    frames: Vec<Arc<Frame>>,
    inner: Mutex<PoolInner>,
    disk: Arc<DiskManager>,
}

impl BufferPool {
    pub fn new(frame_count: usize, disk: Arc<DiskManager>) -> Self {
        assert!(frame_count > 0, "buffer pool needs at least one frame");

        let frames = (0..frame_count).map(|i| Arc::new(Frame::new(i))).collect();
        let inner = PoolInner {
            page_table: HashMap::new(),
            free_list: (0..frame_count).collect(),
            clock_hand: 0,
        };

        Self {
            frames,
            inner: Mutex::new(inner),
            disk,
        }
    }

    /// Returns a pinned guard for the requested page, loading it from disk
    /// on a miss. On a hit the existing frame is re-pinned; on a miss a
    /// free frame is taken, or a victim is chosen by CLOCK (its contents
    /// flushed first if dirty).
    pub fn fetch(&self, page_id: PageId) -> Result<PageGuard> {
        let mut inner = self.inner.lock();

        if let Some(&idx) = inner.page_table.get(&page_id) {
            let frame = &self.frames[idx];
            frame.pin();
            trace!("fetch hit: {} in frame {}", page_id, idx);
            return Ok(PageGuard::new(page_id, Arc::clone(frame)));
        }

        let idx = match inner.free_list.pop_front() {
            Some(idx) => idx,
            None => self.evict(&mut inner)?,
        };
        let frame = &self.frames[idx];

        // Load before handing the page out. Pre-zero so a short read of a
        // freshly allocated page yields a deterministic all-zero page.
        {
            let mut data = frame.data.write();
            data.fill(0);
            if let Err(e) = self.disk.read_page(page_id, &mut data[..]) {
                inner.free_list.push_back(idx);
                return Err(e);
            }
        }

        frame.set_page_id(Some(page_id));
        frame.set_dirty(false);
        frame.set_ref_bit(false);
        frame.pin();
        inner.page_table.insert(page_id, idx);
        trace!("fetch miss: {} loaded into frame {}", page_id, idx);

        Ok(PageGuard::new(page_id, Arc::clone(frame)))
    }

    /// CLOCK replacement: sweep frames in fixed index order from the hand.
    /// Pinned frames are skipped; an unpinned frame with its reference bit
    /// set gets the bit cleared and survives one more sweep; an unpinned
    /// frame with a clear bit is the victim. The sweep is bounded at two
    /// full passes - the first pass can at most clear every reference bit,
    /// so a third would revisit identical state. Finding no victim means
    /// every frame is pinned and the caller gets a recoverable error.
    fn evict(&self, inner: &mut PoolInner) -> Result<usize> {
        let frame_count = self.frames.len();

        for _ in 0..(2 * frame_count) {
            let idx = inner.clock_hand;
            inner.clock_hand = (inner.clock_hand + 1) % frame_count;

            let frame = &self.frames[idx];
            if frame.pin_count() > 0 {
                continue;
            }
            if frame.ref_bit() {
                frame.set_ref_bit(false);
                continue;
            }

            if let Some(old_page_id) = frame.page_id() {
                if frame.is_dirty() {
                    let data = frame.data.read();
                    self.disk.write_page(old_page_id, &data[..])?;
                }
                inner.page_table.remove(&old_page_id);
                debug!("evicting {} from frame {}", old_page_id, idx);
            }
            frame.set_dirty(false);
            return Ok(idx);
        }

        Err(DbError::PoolExhausted)
    }

    /// Writes every dirty frame to disk, then drops all frames.
    /// Used on clean shutdown.
    pub fn flush_all(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        for (&page_id, &idx) in inner.page_table.iter() {
            let frame = &self.frames[idx];
            if frame.is_dirty() {
                let data = frame.data.read();
                self.disk.write_page(page_id, &data[..])?;
                frame.set_dirty(false);
                debug!("flushed {} from frame {}", page_id, idx);
            }
        }

        self.drop_all_frames(&mut inner);
        Ok(())
    }

    /// Discards every frame WITHOUT flushing. Only valid after an explicit
    /// durable reset of the on-disk state; this is not a crash-safe path.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        self.drop_all_frames(&mut inner);
    }

    fn drop_all_frames(&self, inner: &mut PoolInner) {
        for frame in &self.frames {
            frame.reset();
        }
        inner.page_table.clear();
        inner.free_list = (0..self.frames.len()).collect();
        inner.clock_hand = 0;
    }

    /// The disk manager backing this pool.
    pub fn disk(&self) -> &Arc<DiskManager> {
        &self.disk
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn free_frame_count(&self) -> usize {
        self.inner.lock().free_list.len()
    }

    /// Pin count of a resident page, None if the page is not in the pool.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let inner = self.inner.lock();
        inner
            .page_table
            .get(&page_id)
            .map(|&idx| self.frames[idx].pin_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PAGE_SIZE;
    use tempfile::TempDir;

    fn create_pool(frame_count: usize) -> (BufferPool, TempDir) {
        let dir = TempDir::new().unwrap();
        let disk = Arc::new(DiskManager::new(dir.path()).unwrap());
        disk.create_file(0).unwrap();
        let pool = BufferPool::new(frame_count, disk);
        (pool, dir)
    }

    fn new_page(pool: &BufferPool) -> PageId {
        pool.disk().allocate_page(0).unwrap()
    }

    #[test]
    fn test_fetch_pins_and_drop_releases() {
        let (pool, _dir) = create_pool(4);
        let page_id = new_page(&pool);

        {
            let guard = pool.fetch(page_id).unwrap();
            assert_eq!(pool.pin_count(guard.page_id()), Some(1));

            let guard2 = pool.fetch(page_id).unwrap();
            assert_eq!(pool.pin_count(guard2.page_id()), Some(2));
        }
        assert_eq!(pool.pin_count(page_id), Some(0));
    }

    #[test]
    fn test_write_read_roundtrip() {
        let (pool, _dir) = create_pool(4);
        let page_id = new_page(&pool);

        {
            let mut guard = pool.fetch(page_id).unwrap();
            guard.data_mut()[0] = 42;
            guard.data_mut()[100] = 255;
        }
        {
            let guard = pool.fetch(page_id).unwrap();
            assert_eq!(guard.data()[0], 42);
            assert_eq!(guard.data()[100], 255);
        }
    }

    #[test]
    fn test_dirty_victim_written_back() {
        let (pool, _dir) = create_pool(1);
        let page_a = new_page(&pool);
        let page_b = new_page(&pool);

        {
            let mut guard = pool.fetch(page_a).unwrap();
            guard.data_mut()[0] = 7;
        }
        // evicts page_a, forcing the dirty write-back
        {
            let _guard = pool.fetch(page_b).unwrap();
        }

        let mut data = [0u8; PAGE_SIZE];
        pool.disk().read_page(page_a, &mut data).unwrap();
        assert_eq!(data[0], 7);
    }

    #[test]
    fn test_dirty_flag_is_sticky() {
        let (pool, _dir) = create_pool(1);
        let page_a = new_page(&pool);
        let page_b = new_page(&pool);

        {
            let mut guard = pool.fetch(page_a).unwrap();
            guard.data_mut()[0] = 7;
        }
        // a clean re-fetch and release must not clear the dirty flag
        {
            let guard = pool.fetch(page_a).unwrap();
            assert_eq!(guard.data()[0], 7);
        }
        {
            let _guard = pool.fetch(page_b).unwrap();
        }

        let mut data = [0u8; PAGE_SIZE];
        pool.disk().read_page(page_a, &mut data).unwrap();
        assert_eq!(data[0], 7);
    }

    #[test]
    fn test_all_pinned_is_recoverable_error() {
        let (pool, _dir) = create_pool(2);
        let page_a = new_page(&pool);
        let page_b = new_page(&pool);
        let page_c = new_page(&pool);

        let _guard_a = pool.fetch(page_a).unwrap();
        let _guard_b = pool.fetch(page_b).unwrap();

        assert!(matches!(pool.fetch(page_c), Err(DbError::PoolExhausted)));

        // releasing one frame makes the pool usable again
        drop(_guard_a);
        assert!(pool.fetch(page_c).is_ok());
    }

    #[test]
    fn test_clear_discards_without_flushing() {
        let (pool, _dir) = create_pool(2);
        let page_id = new_page(&pool);

        {
            let mut guard = pool.fetch(page_id).unwrap();
            guard.data_mut()[0] = 9;
        }
        pool.clear();

        let mut data = [0u8; PAGE_SIZE];
        pool.disk().read_page(page_id, &mut data).unwrap();
        assert_eq!(data[0], 0);
        assert_eq!(pool.free_frame_count(), 2);
    }

    #[test]
    fn test_flush_all_persists_and_drops() {
        let (pool, _dir) = create_pool(2);
        let page_id = new_page(&pool);

        {
            let mut guard = pool.fetch(page_id).unwrap();
            guard.data_mut()[0] = 9;
        }
        pool.flush_all().unwrap();
        assert_eq!(pool.free_frame_count(), 2);

        let mut data = [0u8; PAGE_SIZE];
        pool.disk().read_page(page_id, &mut data).unwrap();
        assert_eq!(data[0], 9);
    }
}
