/// One slot of the chain table. A node in use points at its physical block
/// and at the next node of the file's chain; `None` terminates the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainNode {
    pub block: Option<usize>,
    pub next: Option<usize>,
}

/// A parallel array of chain nodes, one slot per physical block. The slot
/// chosen for a block is the slot whose index equals the block index, so the
/// table never runs out of nodes while blocks remain. Chains are acyclic by
/// construction: `link` is the only way to form one.
pub struct ChainTable {
    nodes: Vec<ChainNode>,
}

impl ChainTable {
    pub fn new(slots: usize) -> Self {
        Self {
            nodes: vec![ChainNode::default(); slots],
        }
    }

    /// Links the given blocks into a chain in order, each node's `next`
    /// pointing at the following block's node. Returns the head node index,
    /// or `None` for an empty block list.
    pub fn link(&mut self, blocks: &[usize]) -> Option<usize> {
        let mut iter = blocks.iter().peekable();
        while let Some(&slot) = iter.next() {
            debug_assert!(self.nodes[slot].block.is_none());
            self.nodes[slot] = ChainNode {
                block: Some(slot),
                next: iter.peek().map(|&&next| next),
            };
        }
        blocks.first().copied()
    }

    /// Iterates the physical block indices of a chain in order, lazily.
    pub fn blocks(&self, head: Option<usize>) -> ChainBlocks<'_> {
        ChainBlocks {
            nodes: &self.nodes,
            cursor: head,
        }
    }

    /// Walks a chain resetting every visited node to empty and returns the
    /// block indices it referenced, in chain order. The caller owns zeroing
    /// those blocks and returning them to the free bitmap.
    pub fn unlink(&mut self, head: Option<usize>) -> Vec<usize> {
        let mut freed = Vec::new();
        let mut cursor = head;
        while let Some(slot) = cursor {
            let node = std::mem::take(&mut self.nodes[slot]);
            if let Some(blocknr) = node.block {
                freed.push(blocknr);
            }
            cursor = node.next;
        }
        freed
    }
}

/// Lazy iterator over a chain's block indices.
pub struct ChainBlocks<'a> {
    nodes: &'a [ChainNode],
    cursor: Option<usize>,
}

impl<'a> Iterator for ChainBlocks<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = &self.nodes[slot];
        self.cursor = node.next;
        node.block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linking_blocks_builds_an_ordered_chain() {
        let mut table = ChainTable::new(8);

        let head = table.link(&[3, 5, 1]);
        assert_eq!(head, Some(3));
        assert_eq!(table.blocks(head).collect::<Vec<_>>(), vec![3, 5, 1]);
    }

    #[test]
    fn empty_block_list_has_no_head() {
        let mut table = ChainTable::new(4);

        assert_eq!(table.link(&[]), None);
        assert_eq!(table.blocks(None).count(), 0);
    }

    #[test]
    fn unlink_returns_blocks_and_resets_nodes() {
        let mut table = ChainTable::new(8);
        let head = table.link(&[2, 6, 0]);

        assert_eq!(table.unlink(head), vec![2, 6, 0]);
        // The slots are reusable afterwards.
        let head = table.link(&[0, 2]);
        assert_eq!(table.blocks(head).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn chains_of_distinct_blocks_do_not_interfere() {
        let mut table = ChainTable::new(8);
        let a = table.link(&[0, 1]);
        let b = table.link(&[4, 3]);

        assert_eq!(table.blocks(a).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(table.blocks(b).collect::<Vec<_>>(), vec![4, 3]);

        table.unlink(a);
        assert_eq!(table.blocks(b).collect::<Vec<_>>(), vec![4, 3]);
    }
}
