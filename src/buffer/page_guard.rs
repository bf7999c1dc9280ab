use std::sync::Arc;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{PageId, PAGE_SIZE};

use super::Frame;

/// RAII handle to a pinned page. Holding the guard keeps the page pinned;
/// dropping it releases the pin exactly once on every exit path, which is
/// what keeps the pool from leaking frame slots. Borrowing the bytes
/// through `data_mut` marks the guard modified, and the modification flag
/// is folded into the frame's sticky dirty bit on drop.
pub struct PageGuard {
    page_id: PageId,
    frame: Arc<Frame>,
    modified: bool,
}

impl PageGuard {
    pub(crate) fn new(page_id: PageId, frame: Arc<Frame>) -> Self {
        Self {
            page_id,
            frame,
            modified: false,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Read access to the page bytes.
    pub fn data(&self) -> RwLockReadGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.frame.data.read()
    }

    /// Write access to the page bytes; marks the page as modified.
    pub fn data_mut(&mut self) -> RwLockWriteGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.modified = true;
        self.frame.data.write()
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.modified {
            self.frame.set_dirty(true);
        }
        // last holder out marks the frame recently used for CLOCK
        if self.frame.unpin() == Some(0) {
            self.frame.set_ref_bit(true);
        }
    }
}
