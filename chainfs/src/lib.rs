//! A minimal file store over a single fixed-size backing file divided into
//! equal blocks. Each file's content is a singly linked chain of blocks; a
//! free bitmap tracks allocation and freed blocks are zeroed before they
//! return to the pool. One coarse readers-writer lock guards all metadata and
//! the backing store handle.

mod alloc;
mod chain;
mod table;

pub mod fs;
pub mod io;

pub use crate::fs::{FsError, StorageEngine, BLOCK_SIZE, MAX_FILES, MAX_NAME_LEN};
pub use crate::io::{BlockDevice, FileBlockDevice, FileBlockDeviceBuilder};
