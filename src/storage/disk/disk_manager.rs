use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

use crate::common::{PageId, Result, PAGE_SIZE};

/// DiskManager translates `(file_idx, page_idx)` into byte ranges of
/// per-relation files and performs raw page reads and writes. It keeps no
/// cache and knows nothing about records; every relation gets one file in
/// the base directory, named from its file index.
pub struct DiskManager {
    /// Directory holding the relation files
    base_dir: PathBuf,
    /// Open file handles, keyed by file index
    files: Mutex<HashMap<u32, File>>,
}

impl DiskManager {
    /// Creates a DiskManager rooted at the given directory.
    /// The directory is created if it does not exist.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            files: Mutex::new(HashMap::new()),
        })
    }

    fn file_path(&self, file_idx: u32) -> PathBuf {
        self.base_dir.join(format!("rel_{}.tbl", file_idx))
    }

    /// Creates the file for a relation. Recreating an existing file
    /// truncates it - creation is not idempotent.
    pub fn create_file(&self, file_idx: u32) -> Result<()> {
        let path = self.file_path(file_idx);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        debug!("created relation file {}", path.display());
        self.files.lock().insert(file_idx, file);
        Ok(())
    }

    /// Runs `f` with the open handle for `file_idx`, opening it on demand.
    /// A missing file surfaces as an I/O error - disk failures are fatal to
    /// the triggering operation and are never retried.
    fn with_file<T>(&self, file_idx: u32, f: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        use std::collections::hash_map::Entry;

        let mut files = self.files.lock();
        let file = match files.entry(file_idx) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(self.file_path(file_idx))?;
                entry.insert(file)
            }
        };
        f(file)
    }

    /// Extends the relation file by exactly one page and returns the new
    /// page's id. Pages are zero-indexed, appended monotonically, and never
    /// reused by this layer.
    pub fn allocate_page(&self, file_idx: u32) -> Result<PageId> {
        self.with_file(file_idx, |file| {
            let len = file.metadata()?.len();
            let page_idx = (len / PAGE_SIZE as u64) as u32;
            file.set_len(len + PAGE_SIZE as u64)?;
            Ok(PageId::new(file_idx, page_idx))
        })
    }

    /// Reads a page from disk into the provided buffer.
    /// The buffer must be exactly PAGE_SIZE bytes. A short read at the file
    /// boundary leaves the remainder of the buffer untouched, so callers
    /// must pre-zero buffers for pages they expect to be fresh.
    pub fn read_page(&self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE, "Buffer must be PAGE_SIZE bytes");

        self.with_file(page_id.file_idx, |file| {
            let offset = (page_id.page_idx as u64) * (PAGE_SIZE as u64);
            file.seek(SeekFrom::Start(offset))?;

            let mut filled = 0;
            while filled < PAGE_SIZE {
                let n = file.read(&mut data[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            Ok(())
        })
    }

    /// Writes a page to disk from the provided buffer.
    /// The buffer must be exactly PAGE_SIZE bytes.
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE, "Buffer must be PAGE_SIZE bytes");

        self.with_file(page_id.file_idx, |file| {
            let offset = (page_id.page_idx as u64) * (PAGE_SIZE as u64);
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(data)?;
            file.flush()?;
            Ok(())
        })
    }

    /// Returns the number of pages currently allocated in a relation file.
    pub fn page_count(&self, file_idx: u32) -> Result<u32> {
        self.with_file(file_idx, |file| {
            Ok((file.metadata()?.len() / PAGE_SIZE as u64) as u32)
        })
    }

    /// Deletes every relation file in the base directory. Used only by the
    /// database reset path.
    pub fn purge_all(&self) -> Result<()> {
        self.files.lock().clear();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "tbl") {
                debug!("purging relation file {}", path.display());
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl Drop for DiskManager {
    fn drop(&mut self) {
        for file in self.files.get_mut().values() {
            let _ = file.sync_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disk_manager_allocate_page() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(dir.path()).unwrap();
        dm.create_file(0).unwrap();

        assert_eq!(dm.allocate_page(0).unwrap(), PageId::new(0, 0));
        assert_eq!(dm.allocate_page(0).unwrap(), PageId::new(0, 1));
        assert_eq!(dm.page_count(0).unwrap(), 2);
    }

    #[test]
    fn test_disk_manager_read_write() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(dir.path()).unwrap();
        dm.create_file(3).unwrap();

        let page_id = dm.allocate_page(3).unwrap();

        let mut write_data = [0u8; PAGE_SIZE];
        write_data[0] = 42;
        write_data[PAGE_SIZE - 1] = 128;
        dm.write_page(page_id, &write_data).unwrap();

        let mut read_data = [0u8; PAGE_SIZE];
        dm.read_page(page_id, &mut read_data).unwrap();

        assert_eq!(read_data[0], 42);
        assert_eq!(read_data[PAGE_SIZE - 1], 128);
    }

    #[test]
    fn test_disk_manager_files_independent() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(dir.path()).unwrap();
        dm.create_file(0).unwrap();
        dm.create_file(1).unwrap();

        let p0 = dm.allocate_page(0).unwrap();
        let p1 = dm.allocate_page(1).unwrap();
        assert_eq!(p0, PageId::new(0, 0));
        assert_eq!(p1, PageId::new(1, 0));

        dm.write_page(p0, &[7u8; PAGE_SIZE]).unwrap();
        let mut data = [0u8; PAGE_SIZE];
        dm.read_page(p1, &mut data).unwrap();
        assert_eq!(data[0], 0);
    }

    #[test]
    fn test_disk_manager_create_truncates() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(dir.path()).unwrap();
        dm.create_file(0).unwrap();
        dm.allocate_page(0).unwrap();
        assert_eq!(dm.page_count(0).unwrap(), 1);

        dm.create_file(0).unwrap();
        assert_eq!(dm.page_count(0).unwrap(), 0);
    }

    #[test]
    fn test_disk_manager_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(dir.path()).unwrap();

        let mut data = [0u8; PAGE_SIZE];
        assert!(dm.read_page(PageId::new(9, 0), &mut data).is_err());
    }

    #[test]
    fn test_disk_manager_purge_all() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(dir.path()).unwrap();
        dm.create_file(0).unwrap();
        dm.create_file(1).unwrap();

        dm.purge_all().unwrap();

        let mut data = [0u8; PAGE_SIZE];
        assert!(dm.read_page(PageId::new(0, 0), &mut data).is_err());
    }
}
