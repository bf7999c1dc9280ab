use std::fmt;

/// Page identifier type - uniquely identifies a page across the whole engine.
/// Each relation owns one file; pages are numbered from 0 within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    /// File index of the relation the page belongs to
    pub file_idx: u32,
    /// Zero-based page index within that file (page 0 is the header page)
    pub page_idx: u32,
}

impl PageId {
    pub fn new(file_idx: u32, page_idx: u32) -> Self {
        Self { file_idx, page_idx }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageId({}, {})", self.file_idx, self.page_idx)
    }
}

/// Record identifier - locates a record payload on a data page.
///
/// `record_offset` is the BYTE OFFSET of the payload within its page, not a
/// slot number: `slot_capacity + record_size * slot`. The offset form is what
/// gets embedded in index entries, so it must never be reinterpreted as a
/// slot index; recover the slot with
/// `(record_offset - slot_capacity) / record_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rid {
    pub page_id: PageId,
    pub record_offset: u32,
}

impl Rid {
    pub fn new(page_id: PageId, record_offset: u32) -> Self {
        Self {
            page_id,
            record_offset,
        }
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rid({}, +{})", self.page_id, self.record_offset)
    }
}
