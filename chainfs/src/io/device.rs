use std::fs::File;
use std::io::prelude::*;
use std::io::{BufWriter, ErrorKind};
use std::os::unix::fs::FileExt;

use log::debug;

use crate::fs::BLOCK_SIZE;
use crate::io::block::{BlockDevice, BlockNumber};

/// Presents a flat file as fixed-size block storage. The file is pre-sized to
/// `block_count * BLOCK_SIZE` bytes at build time so every block offset is
/// addressable from the start.
pub struct FileBlockDevice {
    fd: File,
    block_count: usize,
}

impl FileBlockDevice {
    /// Returns ownership of the underlying file descriptor to the caller.
    pub fn into_file(self) -> File {
        self.fd
    }

    fn check_range(&self, blocknr: BlockNumber) -> std::io::Result<()> {
        if blocknr >= self.block_count {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                "block out of range",
            ));
        }
        Ok(())
    }
}

impl BlockDevice for FileBlockDevice {
    fn block_count(&self) -> usize {
        self.block_count
    }

    fn read_block(&self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()> {
        self.check_range(blocknr)?;
        if buf.len() < BLOCK_SIZE {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                "buffer does not contain enough space to read block",
            ));
        }

        self.fd
            .read_exact_at(&mut buf[..BLOCK_SIZE], (blocknr * BLOCK_SIZE) as u64)
    }

    fn write_block(&self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()> {
        self.check_range(blocknr)?;

        let max = BLOCK_SIZE.min(buf.len());
        self.fd
            .write_all_at(&buf[..max], (blocknr * BLOCK_SIZE) as u64)
    }

    fn sync(&self) -> std::io::Result<()> {
        self.fd.sync_all()
    }
}

pub struct FileBlockDeviceBuilder {
    fd: File,
    block_count: usize,
}

impl From<File> for FileBlockDeviceBuilder {
    fn from(fd: File) -> Self {
        FileBlockDeviceBuilder { fd, block_count: 0 }
    }
}

impl FileBlockDeviceBuilder {
    /// Sets the number of blocks the backing file holds.
    pub fn with_block_count(mut self, blocks: usize) -> Self {
        self.block_count = blocks;
        self
    }

    /// Sizes the file to exactly `block_count` blocks and zero-fills every
    /// block. The builder takes ownership of the file descriptor; whatever
    /// the file held before is destroyed.
    pub fn build(mut self) -> std::io::Result<FileBlockDevice> {
        debug_assert!(self.block_count > 0);
        self.fd.set_len((self.block_count * BLOCK_SIZE) as u64)?;
        self.zero_store()?;
        debug!(
            "backing store sized to {} blocks of {} bytes",
            self.block_count, BLOCK_SIZE
        );
        Ok(FileBlockDevice {
            fd: self.fd,
            block_count: self.block_count,
        })
    }

    fn zero_store(&mut self) -> std::io::Result<()> {
        self.fd.seek(std::io::SeekFrom::Start(0))?;
        let mut bfd = BufWriter::new(&self.fd);
        // Buffer each block write to keep initialization to a few syscalls.
        for _ in 0..self.block_count {
            bfd.write_all(&[0u8; BLOCK_SIZE])?;
        }
        bfd.flush()
    }
}
