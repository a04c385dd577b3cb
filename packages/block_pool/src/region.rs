use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::mem;
use std::ptr::NonNull;

use crate::{Error, Result};

/// Alignment of the backing region. Blocks start at multiples of the block size from the
/// region start, so only block 0 is guaranteed to share this alignment.
const REGION_ALIGN: usize = mem::align_of::<usize>();

/// Number of bytes at the start of a free block that hold the index of the next free block.
pub(crate) const LINK_SIZE: usize = mem::size_of::<usize>();

/// One contiguous, zero-initialized allocation divided into equally sized blocks.
///
/// The region knows nothing about which blocks are free. It only offers addressing and the
/// raw link accessors that the pool uses to thread its free list through vacant blocks.
///
/// # Out of band access
///
/// The region never creates references to its memory on its own, so callers holding block
/// pointers may access block memory from unsafe code without borrowing the region.
#[derive(Debug)]
pub(crate) struct Region {
    first_byte_ptr: NonNull<u8>,

    layout: Layout,

    block_size: usize,

    /// Number of whole blocks that fit into the region. Any remainder bytes at the end of the
    /// region are never handed out.
    block_count: usize,
}

impl Region {
    /// Allocates a zeroed region of `capacity_bytes` and divides it into blocks of `block_size`.
    ///
    /// The caller is expected to have validated that `block_size` can hold a link and that
    /// at least one block fits; both are asserted here.
    pub(crate) fn allocate(block_size: usize, capacity_bytes: usize) -> Result<Self> {
        assert!(
            block_size >= LINK_SIZE,
            "block size {block_size} cannot hold a free list link of {LINK_SIZE} bytes"
        );

        let block_count = capacity_bytes
            .checked_div(block_size)
            .expect("guarded by the block size assertion above");

        assert!(
            block_count > 0,
            "region of {capacity_bytes} bytes cannot hold a single block of {block_size} bytes"
        );

        let layout = Layout::from_size_align(capacity_bytes, REGION_ALIGN).map_err(|e| {
            Error::invalid_configuration(format!(
                "region of {capacity_bytes} bytes cannot be described as a memory layout: {e}"
            ))
        })?;

        // SAFETY: The layout is not zero-sized because it holds at least one block and blocks
        // are at least LINK_SIZE bytes, both asserted above.
        let first_byte_ptr = NonNull::new(unsafe { alloc_zeroed(layout) })
            .ok_or(Error::AllocationFailed { capacity_bytes })?;

        Ok(Self {
            first_byte_ptr,
            layout,
            block_size,
            block_count,
        })
    }

    #[must_use]
    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub(crate) fn block_count(&self) -> usize {
        self.block_count
    }

    #[must_use]
    pub(crate) fn capacity_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Bytes at the end of the region that do not form a whole block.
    #[must_use]
    pub(crate) fn unusable_bytes(&self) -> usize {
        self.capacity_bytes()
            .checked_rem(self.block_size)
            .expect("block size is never zero")
    }

    /// Returns a pointer to the first byte of the block at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub(crate) fn block_ptr(&self, index: usize) -> NonNull<u8> {
        assert!(
            index < self.block_count,
            "block {index} index out of bounds in region of {} blocks",
            self.block_count
        );

        // Cannot overflow because the bounds check above keeps the offset inside the region,
        // whose size fit into a valid Layout.
        let offset = index.wrapping_mul(self.block_size);

        // SAFETY: The offset stays within the allocation thanks to the bounds check above.
        unsafe { self.first_byte_ptr.add(offset) }
    }

    /// Reads the free list link stored at the start of the block at `index`.
    ///
    /// The result is only meaningful for blocks that are currently vacant.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub(crate) fn read_link(&self, index: usize) -> usize {
        let link_ptr = self.block_ptr(index).cast::<usize>();

        // SAFETY: The block is at least LINK_SIZE bytes long, lies within our allocation and the
        // allocation was zero-initialized, so the bytes are always initialized. Blocks need not
        // be aligned for usize, hence the unaligned read.
        unsafe { link_ptr.read_unaligned() }
    }

    /// Stores a free list link at the start of the block at `index`, overwriting whatever the
    /// previous owner of the block left there.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[expect(clippy::needless_pass_by_ref_mut, reason = "mutates memory behind the pointer")]
    pub(crate) fn write_link(&mut self, index: usize, next_free_index: usize) {
        let link_ptr = self.block_ptr(index).cast::<usize>();

        // SAFETY: The block is at least LINK_SIZE bytes long and lies within our allocation.
        // Blocks need not be aligned for usize, hence the unaligned write.
        unsafe {
            link_ptr.write_unaligned(next_free_index);
        }
    }

    /// Threads every block into one chain in ascending address order, with the last block
    /// pointing at the `block_count` sentinel.
    pub(crate) fn link_all(&mut self) {
        for index in 0..self.block_count {
            // Cannot overflow, as that would imply the region is longer than virtual memory.
            self.write_link(index, index.wrapping_add(1));
        }
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: We allocated this memory in allocate() with the same layout and it has not
        // been deallocated since.
        unsafe {
            dealloc(self.first_byte_ptr.as_ptr(), self.layout);
        }
    }
}

// SAFETY: The region exclusively owns its allocation and holds no thread-local state, so it
// can move between threads. It is not Sync because writes happen through &mut self only.
unsafe impl Send for Region {}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::indexing_slicing,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use std::slice;

    use super::*;

    #[test]
    fn divides_region_into_blocks() {
        let region = Region::allocate(32, 4096).unwrap();

        assert_eq!(region.block_size(), 32);
        assert_eq!(region.block_count(), 128);
        assert_eq!(region.capacity_bytes(), 4096);
        assert_eq!(region.unusable_bytes(), 0);
    }

    #[test]
    fn remainder_is_excluded() {
        let region = Region::allocate(24, 100).unwrap();

        assert_eq!(region.block_count(), 4);
        assert_eq!(region.unusable_bytes(), 4);
    }

    #[test]
    fn blocks_are_contiguous_and_ascending() {
        let region = Region::allocate(16, 64).unwrap();

        let base = region.block_ptr(0).as_ptr() as usize;

        for index in 0..region.block_count() {
            assert_eq!(region.block_ptr(index).as_ptr() as usize, base + index * 16);
        }
    }

    #[test]
    fn starts_zeroed() {
        let region = Region::allocate(16, 64).unwrap();

        for index in 0..region.block_count() {
            let bytes = unsafe { slice::from_raw_parts(region.block_ptr(index).as_ptr(), 16) };
            assert!(bytes.iter().all(|b| *b == 0));
        }
    }

    #[test]
    fn link_all_chains_in_order() {
        let mut region = Region::allocate(16, 64).unwrap();
        region.link_all();

        assert_eq!(region.read_link(0), 1);
        assert_eq!(region.read_link(1), 2);
        assert_eq!(region.read_link(2), 3);
        assert_eq!(region.read_link(3), 4);
    }

    #[test]
    fn links_survive_unaligned_blocks() {
        // 9-byte blocks put every odd block at an address that is not usize-aligned.
        let mut region = Region::allocate(9, 45).unwrap();

        region.write_link(1, 0xDEAD_BEEF);
        region.write_link(3, 7);

        assert_eq!(region.read_link(1), 0xDEAD_BEEF);
        assert_eq!(region.read_link(3), 7);
    }

    #[test]
    #[should_panic]
    fn block_ptr_out_of_bounds_panics() {
        let region = Region::allocate(16, 64).unwrap();
        _ = region.block_ptr(4);
    }

    #[test]
    #[should_panic]
    fn block_smaller_than_link_panics() {
        _ = Region::allocate(LINK_SIZE - 1, 64);
    }

    #[test]
    #[should_panic]
    fn region_smaller_than_block_panics() {
        _ = Region::allocate(64, 32);
    }

    #[test]
    fn oversized_region_is_invalid_configuration() {
        let result = Region::allocate(LINK_SIZE, usize::MAX);

        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }
}
