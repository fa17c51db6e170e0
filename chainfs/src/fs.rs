use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::alloc::FreeBitmap;
use crate::chain::ChainTable;
use crate::io::{BlockDevice, FileBlockDevice, FileBlockDeviceBuilder};
use crate::table::FileTable;

/// Size of one backing-store block in bytes.
pub const BLOCK_SIZE: usize = 128;
/// Maximum number of live files.
pub const MAX_FILES: usize = 5;
/// Maximum filename length in characters.
pub const MAX_NAME_LEN: usize = 11;

/// Everything an operation can fail with. The protocol adapter at the
/// network boundary is responsible for turning these into response text; the
/// engine never formats user-facing strings or logs.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("filename too long (max 11 characters)")]
    FilenameTooLong,
    #[error("file {0} already exists")]
    FileAlreadyExists(String),
    #[error("maximum number of files reached")]
    MaxFilesReached,
    #[error("not enough free space")]
    InsufficientSpace,
    #[error("file {0} does not exist")]
    FileNotFound(String),
    #[error("backing store access failed")]
    Io(#[from] std::io::Error),
}

/// All state the coarse lock guards: the directory, the chain table, the
/// free bitmap, and the backing store handle itself. Physical I/O only
/// happens through here, so it never interleaves across operations.
struct Inner<D> {
    dev: D,
    table: FileTable,
    chains: ChainTable,
    bitmap: FreeBitmap,
}

impl<D: BlockDevice> Inner<D> {
    /// Tears down a chain: every block it referenced is zeroed on the device
    /// and returned to the free pool, every node reset.
    fn release_chain(&mut self, head: Option<usize>) -> std::io::Result<()> {
        for blocknr in self.chains.unlink(head) {
            self.dev.zero_block(blocknr)?;
            self.bitmap.release(blocknr);
        }
        Ok(())
    }

    fn write_payload(&self, blocks: &[usize], data: &[u8]) -> std::io::Result<()> {
        for (i, &blocknr) in blocks.iter().enumerate() {
            let start = i * BLOCK_SIZE;
            let end = data.len().min(start + BLOCK_SIZE);
            // Fresh blocks are zero-filled, so a partial final chunk leaves
            // the block's tail zeroed.
            self.dev.write_block(blocknr, &data[start..end])?;
        }
        Ok(())
    }
}

/// The file store. One instance per backing store, shared by reference
/// between connection handlers; a single readers-writer lock serializes
/// mutations against everything else while letting reads run concurrently.
///
/// There is no per-file locking: a write to one file blocks reads of every
/// other file. Known scalability limit, acceptable at five files.
pub struct StorageEngine<D> {
    inner: RwLock<Inner<D>>,
}

impl StorageEngine<FileBlockDevice> {
    /// Creates the engine over a backing file at `path`, sized and
    /// zero-filled to hold `total_size / BLOCK_SIZE` blocks. Called once at
    /// startup; any previous content of the file is destroyed.
    pub fn init<P: AsRef<Path>>(path: P, total_size: usize) -> Result<Self, FsError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let dev = FileBlockDeviceBuilder::from(file)
            .with_block_count(total_size / BLOCK_SIZE)
            .build()?;
        Ok(StorageEngine::new(dev))
    }
}

impl<D: BlockDevice> StorageEngine<D> {
    pub fn new(dev: D) -> Self {
        let blocks = dev.block_count();
        StorageEngine {
            inner: RwLock::new(Inner {
                dev,
                table: FileTable::new(),
                chains: ChainTable::new(blocks),
                bitmap: FreeBitmap::new(blocks),
            }),
        }
    }

    /// Creates an empty file. No blocks are allocated until the first write.
    pub fn create(&self, name: &str) -> Result<(), FsError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.table.insert(name)?;
        Ok(())
    }

    /// Returns the file's full content.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, FsError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let slot = inner
            .table
            .find(name)
            .ok_or_else(|| FsError::FileNotFound(name.to_string()))?;

        let record = inner.table.get(slot);
        let mut content = vec![0u8; record.size];
        let mut copied = 0;
        let mut block = [0u8; BLOCK_SIZE];
        for blocknr in inner.chains.blocks(record.head) {
            if copied == record.size {
                break;
            }
            inner.dev.read_block(blocknr, &mut block)?;
            let take = BLOCK_SIZE.min(record.size - copied);
            content[copied..copied + take].copy_from_slice(&block[..take]);
            copied += take;
        }
        Ok(content)
    }

    /// Replaces the file's entire content, returning the byte count written.
    ///
    /// The new chain is allocated and filled before the old one is touched;
    /// a failure anywhere rolls the new blocks back and leaves the previous
    /// content committed. Free-space accounting does not treat the file's
    /// own current blocks as reclaimable, so a rewrite needs headroom for
    /// old and new content at once.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<usize, FsError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = inner
            .table
            .find(name)
            .ok_or_else(|| FsError::FileNotFound(name.to_string()))?;

        let needed = (data.len() + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let new_blocks = inner
            .bitmap
            .allocate(needed)
            .ok_or(FsError::InsufficientSpace)?;

        if let Err(err) = inner.write_payload(&new_blocks, data) {
            // The new blocks were never reachable; scrub them and put them
            // back. The write failure is the error reported even if the
            // scrub fails too.
            for &blocknr in &new_blocks {
                let _ = inner.dev.zero_block(blocknr);
                inner.bitmap.release(blocknr);
            }
            return Err(err.into());
        }

        // Commit point: swap in the new chain, then release the old one.
        let new_head = inner.chains.link(&new_blocks);
        let record = inner.table.get_mut(slot);
        let old_head = record.head.take();
        record.head = new_head;
        record.size = data.len();
        inner.release_chain(old_head)?;
        Ok(data.len())
    }

    /// Deletes the file, zeroing and freeing every block of its chain. The
    /// name becomes reusable immediately.
    pub fn delete(&self, name: &str) -> Result<(), FsError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = inner
            .table
            .find(name)
            .ok_or_else(|| FsError::FileNotFound(name.to_string()))?;

        let head = inner.table.get(slot).head;
        inner.release_chain(head)?;
        inner.table.remove(slot);
        Ok(())
    }

    /// Snapshot of live filenames in directory slot order.
    pub fn list(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.table.names()
    }
}
