use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::common::{PageId, PAGE_SIZE};

/// Frame holds one page-sized buffer plus the bookkeeping the pool needs:
/// the page currently loaded, a pin count, a dirty flag, and the CLOCK
/// reference bit. Frame contents become invalid the moment the pool
/// reassigns the frame to a different page.
pub struct Frame {
    /// Index of this frame in the pool's frame array
    frame_id: usize,
    /// The page currently held, None while the frame is free
    page_id: RwLock<Option<PageId>>,
    /// Number of outstanding holders; never evicted while > 0
    pin_count: AtomicU32,
    /// Whether the page was modified since it was read from disk.
    /// Sticky: once set it stays set until the frame is flushed or reset.
    dirty: AtomicBool,
    /// CLOCK reference bit, set when the last holder releases the frame
    ref_bit: AtomicBool,
    /// The page bytes (pub(crate) for guard access)
    pub(crate) data: RwLock<Box<[u8; PAGE_SIZE]>>,
}

impl Frame {
    pub fn new(frame_id: usize) -> Self {
        Self {
            frame_id,
            page_id: RwLock::new(None),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
            ref_bit: AtomicBool::new(false),
            data: RwLock::new(Box::new([0u8; PAGE_SIZE])),
        }
    }

    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    pub fn page_id(&self) -> Option<PageId> {
        *self.page_id.read()
    }

    pub fn set_page_id(&self, page_id: Option<PageId>) {
        *self.page_id.write() = page_id;
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    /// Increments the pin count and returns the new value.
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrements the pin count and returns the new value.
    /// Returns None if the pin count was already 0.
    pub fn unpin(&self) -> Option<u32> {
        loop {
            let current = self.pin_count.load(Ordering::Acquire);
            if current == 0 {
                return None;
            }
            if self
                .pin_count
                .compare_exchange(current, current - 1, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return Some(current - 1);
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    pub fn ref_bit(&self) -> bool {
        self.ref_bit.load(Ordering::Acquire)
    }

    pub fn set_ref_bit(&self, value: bool) {
        self.ref_bit.store(value, Ordering::Release);
    }

    /// Returns the frame to its free state.
    pub fn reset(&self) {
        *self.page_id.write() = None;
        self.pin_count.store(0, Ordering::Release);
        self.dirty.store(false, Ordering::Release);
        self.ref_bit.store(false, Ordering::Release);
        self.data.write().fill(0);
    }
}
