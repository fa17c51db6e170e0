use crate::fs::BLOCK_SIZE;

/// The block number to access ranging from 0 (the first block) to n - 1 (the last
/// block) where n is number of blocks available.
pub type BlockNumber = usize;

/// A fixed-capacity block-addressable medium. Methods take `&self` and use
/// positioned I/O so readers holding a shared lock can access the store
/// without a seek cursor to race on.
pub trait BlockDevice {
    /// The total number of blocks the device holds.
    fn block_count(&self) -> usize;

    /// Reads one full block into the provided buffer, which must hold at
    /// least `BLOCK_SIZE` bytes.
    ///
    /// # Errors
    ///
    /// Attempting to read a block out of range will return an error.
    fn read_block(&self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()>;

    /// Writes the buffer at the start of the specified block. Buffers shorter
    /// than `BLOCK_SIZE` leave the block's trailing bytes untouched; longer
    /// buffers are truncated to the block.
    ///
    /// # Errors
    ///
    /// Attempting to write a block out of range will return an error.
    fn write_block(&self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()>;

    /// Overwrites the entire block with zeroes.
    fn zero_block(&self, blocknr: BlockNumber) -> std::io::Result<()> {
        self.write_block(blocknr, &[0u8; BLOCK_SIZE])
    }

    /// Flush any buffered disk IO from memory. This is useful if it must be
    /// guaranteed the writes actually reached the medium.
    fn sync(&self) -> std::io::Result<()>;
}
