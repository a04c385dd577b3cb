use std::ptr::NonNull;

/// A block acquired from a [`BlockPool`][crate::BlockPool].
///
/// The handle is the caller's proof of ownership over one block of the pool's region. It cannot
/// be copied or cloned, and handing it back via [`BlockPool::release()`][crate::BlockPool::release]
/// consumes it, so the same block cannot be released twice from safe code.
///
/// Dropping the handle without releasing it leaks the block for the lifetime of the pool (or
/// until the next [`reset()`][crate::BlockPool::reset]).
///
/// # Accessing the memory
///
/// Use [`BlockPool::get()`][crate::BlockPool::get] and
/// [`BlockPool::get_mut()`][crate::BlockPool::get_mut] for safe access. Alternatively,
/// [`ptr()`](Self::ptr) exposes the block's first byte for use from unsafe code; the pool never
/// creates references to acquired blocks, so such out of band access is valid while the block
/// remains acquired and the pool is alive.
#[derive(Debug)]
#[must_use = "dropping a block without releasing it leaks the block until the pool is reset"]
pub struct Block {
    index: usize,
    ptr: NonNull<u8>,
    len: usize,

    /// Epoch of the pool at the time of acquisition. Used to reject handles that belong to a
    /// different pool or predate a reset.
    epoch: u64,
}

impl Block {
    pub(crate) fn new(index: usize, ptr: NonNull<u8>, len: usize, epoch: u64) -> Self {
        Self {
            index,
            ptr,
            len,
            epoch,
        }
    }

    /// Index of the block within the pool's region. Block `i` starts `i * block_size` bytes
    /// after the start of the region.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Pointer to the first byte of the block.
    ///
    /// The pointer is valid for reads and writes of [`len()`](Self::len) bytes for as long as
    /// the block remains acquired and the pool is neither dropped nor reset. The block is only
    /// aligned to the largest power of two dividing the block size (capped at the alignment of
    /// `usize`), so typed access may need unaligned reads and writes.
    ///
    /// Writing through the pointer must leave the bytes initialized if the block is later
    /// accessed through [`BlockPool::get()`][crate::BlockPool::get].
    #[must_use]
    pub fn ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Number of usable bytes in the block, equal to the pool's block size.
    #[must_use]
    #[allow(clippy::len_without_is_empty, reason = "blocks are never empty")]
    pub fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }
}

// SAFETY: The handle only carries metadata about a block. Touching the block's memory requires
// either the owning pool (which enforces borrowing rules) or unsafe code through `ptr()`, whose
// caller takes responsibility for synchronization.
unsafe impl Send for Block {}

// SAFETY: See above. Shared access to the handle only exposes copies of its metadata.
unsafe impl Sync for Block {}

#[cfg(test)]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(Block: Send, Sync, std::fmt::Debug);
    assert_not_impl_any!(Block: Clone, Copy);

    #[test]
    fn accessors_return_parts() {
        let mut backing = [0_u8; 16];
        let ptr = NonNull::from(&mut backing).cast::<u8>();

        let block = Block::new(3, ptr, 16, 7);

        assert_eq!(block.index(), 3);
        assert_eq!(block.ptr(), ptr);
        assert_eq!(block.len(), 16);
        assert_eq!(block.epoch(), 7);
    }
}
