use std::ptr::NonNull;
use std::slice;
use std::sync::atomic::{self, AtomicU64};
use std::thread;

use tracing::{debug, trace};

use crate::region::{LINK_SIZE, Region};
use crate::{Block, BlockPoolBuilder, DropPolicy, Error, Result};

/// Source of process-unique pool epochs. Every pool initialization and every reset draws a new
/// value, which is stamped into the blocks acquired afterwards.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(0);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, atomic::Ordering::Relaxed)
}

/// A pool of fixed-size memory blocks carved out of one pre-allocated region.
///
/// The pool divides a region of `capacity_bytes` into `capacity_bytes / block_size` blocks and
/// serves them from a free list that is threaded through the vacant blocks themselves: the first
/// bytes of every free block hold the index of the next free block. Acquired blocks carry no
/// pool metadata at all - every byte belongs to the caller until the block is released.
///
/// Acquiring pops the head of the free list and releasing pushes onto it, so both are O(1) and
/// the most recently released block is the next one handed out.
///
/// The pool never grows. Once every block is acquired, [`acquire()`](Self::acquire) returns
/// [`Error::PoolExhausted`] until a block is released.
///
/// # Example
///
/// ```
/// use block_pool::BlockPool;
///
/// let mut pool = BlockPool::new(32, 4096).unwrap();
/// assert_eq!(pool.block_count(), 128);
///
/// let block = pool.acquire(20).unwrap();
/// pool.get_mut(&block)[..5].copy_from_slice(b"hello");
/// assert_eq!(&pool.get(&block)[..5], b"hello");
///
/// pool.release(block);
/// assert_eq!(pool.free_count(), 128);
/// ```
///
/// # Thread safety
///
/// The pool is thread-mobile ([`Send`]) but not thread-safe ([`Sync`]). Wrap it in a mutex to
/// share it between threads.
#[derive(Debug)]
pub struct BlockPool {
    region: Region,

    /// Head of the intrusive free list. Points at the `block_count` sentinel when every block
    /// is acquired.
    next_free_index: usize,

    /// Number of blocks on the free list.
    free_count: usize,

    /// Stamped into every acquired block so that handles from other pools, or from before
    /// the latest reset, are recognized as foreign.
    epoch: u64,

    drop_policy: DropPolicy,
}

impl BlockPool {
    /// Creates a pool of blocks of `block_size` bytes in a region of `capacity_bytes`.
    ///
    /// Every block starts out free, threaded into the free list in ascending address order. If
    /// `capacity_bytes` is not a multiple of `block_size`, the remainder is never handed out.
    ///
    /// Use [`builder()`](Self::builder) to customize other aspects of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either size is zero, if `block_size` is too
    /// small to hold a free list link (the size of `usize`) or if the region cannot hold
    /// even one block.
    ///
    /// Returns [`Error::AllocationFailed`] if the region cannot be allocated.
    pub fn new(block_size: usize, capacity_bytes: usize) -> Result<Self> {
        Self::builder()
            .block_size(block_size)
            .capacity_bytes(capacity_bytes)
            .build()
    }

    /// Starts configuring a new pool.
    ///
    /// # Example
    ///
    /// ```
    /// use block_pool::BlockPool;
    ///
    /// // The region is one page (4096 bytes) unless specified otherwise.
    /// let pool = BlockPool::builder().block_size(64).build().unwrap();
    /// assert_eq!(pool.block_count(), 64);
    /// ```
    pub fn builder() -> BlockPoolBuilder {
        BlockPoolBuilder::new()
    }

    pub(crate) fn new_inner(
        block_size: usize,
        capacity_bytes: usize,
        drop_policy: DropPolicy,
    ) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::invalid_configuration("block size must be non-zero"));
        }

        if capacity_bytes == 0 {
            return Err(Error::invalid_configuration("capacity must be non-zero"));
        }

        if block_size < LINK_SIZE {
            return Err(Error::invalid_configuration(format!(
                "block size {block_size} is smaller than the {LINK_SIZE} bytes needed for a free list link"
            )));
        }

        if capacity_bytes < block_size {
            return Err(Error::invalid_configuration(format!(
                "capacity of {capacity_bytes} bytes cannot hold a single block of {block_size} bytes"
            )));
        }

        let mut region = Region::allocate(block_size, capacity_bytes)?;
        region.link_all();

        let pool = Self {
            next_free_index: 0,
            free_count: region.block_count(),
            region,
            epoch: next_epoch(),
            drop_policy,
        };

        debug!(
            block_size,
            capacity_bytes,
            block_count = pool.block_count(),
            unusable_bytes = pool.region.unusable_bytes(),
            "block pool initialized"
        );

        Ok(pool)
    }

    /// Size of every block in the pool, in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.region.block_size()
    }

    /// Size of the backing region, in bytes. This includes any remainder that is too small to
    /// form a block.
    #[must_use]
    pub fn capacity_bytes(&self) -> usize {
        self.region.capacity_bytes()
    }

    /// Total number of blocks in the pool, free or acquired.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.region.block_count()
    }

    /// Number of blocks that can be acquired before the pool is exhausted.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Number of blocks currently acquired.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinite loops in callers that drain the pool.
    pub fn len(&self) -> usize {
        self.block_count()
            .checked_sub(self.free_count)
            .expect("free count never exceeds block count")
    }

    /// Whether no block is currently acquired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free_count == self.block_count()
    }

    /// Whether every block is acquired, so the next acquisition would fail.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_count == 0
    }

    /// Index of the block that the next successful [`acquire()`](Self::acquire) will return,
    /// or `None` if every block is acquired.
    #[must_use]
    pub fn free_head(&self) -> Option<usize> {
        (self.next_free_index < self.block_count()).then_some(self.next_free_index)
    }

    /// Address of the block that the next successful [`acquire()`](Self::acquire) will return,
    /// or `None` if every block is acquired.
    #[must_use]
    pub fn free_head_ptr(&self) -> Option<NonNull<u8>> {
        self.free_head().map(|index| self.region.block_ptr(index))
    }

    /// Takes a block off the free list for the caller to use.
    ///
    /// `requested_size` is the number of bytes the caller intends to use. The returned block is
    /// always [`block_size()`](Self::block_size) bytes long. Its contents are unspecified: the
    /// first bytes typically hold the stale free list link.
    ///
    /// No other acquisition returns the same block until it is passed to
    /// [`release()`](Self::release).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] if every block is already acquired.
    ///
    /// Returns [`Error::BlockTooSmall`] if `requested_size` exceeds the block size.
    ///
    /// The pool is left unchanged when an error is returned.
    pub fn acquire(&mut self, requested_size: usize) -> Result<Block> {
        if self.is_full() {
            trace!(
                requested_size,
                block_count = self.block_count(),
                "block pool exhausted"
            );

            return Err(Error::PoolExhausted {
                block_count: self.block_count(),
            });
        }

        let block_size = self.block_size();

        if requested_size > block_size {
            trace!(requested_size, block_size, "requested size exceeds block size");

            return Err(Error::BlockTooSmall {
                requested_size,
                block_size,
            });
        }

        // Pop the next free index from the stack of free blocks.
        let index = self.next_free_index;
        self.next_free_index = self.region.read_link(index);

        self.free_count = self
            .free_count
            .checked_sub(1)
            .expect("guarded by the exhaustion check above");

        #[cfg(debug_assertions)]
        self.integrity_check();

        Ok(Block::new(
            index,
            self.region.block_ptr(index),
            block_size,
            self.epoch,
        ))
    }

    /// Hands a block back to the pool, making it the next block to be acquired.
    ///
    /// The start of the block is overwritten with the free list link, so any data the caller
    /// stored there is lost.
    ///
    /// # Panics
    ///
    /// Panics if the block was acquired from a different pool or before the latest
    /// [`reset()`](Self::reset) of this pool. The free list is not modified in that case.
    pub fn release(&mut self, block: Block) {
        self.assert_owned(&block);

        let index = block.index();

        // Push the released block onto the stack of free blocks.
        self.region.write_link(index, self.next_free_index);
        self.next_free_index = index;

        // Cannot overflow because an owned handle means the block was not on the free list.
        self.free_count = self.free_count.wrapping_add(1);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Returns every block to the free list, as if the pool had just been created with the
    /// same configuration.
    ///
    /// Outstanding [`Block`] handles are invalidated: passing them to [`release()`](Self::release),
    /// [`get()`](Self::get) or [`get_mut()`](Self::get_mut) panics. Pointers previously obtained
    /// from them remain dereferenceable but the memory may be handed out again, so the caller
    /// must stop using them.
    pub fn reset(&mut self) {
        self.region.link_all();
        self.next_free_index = 0;
        self.free_count = self.block_count();
        self.epoch = next_epoch();

        debug!(
            block_size = self.block_size(),
            block_count = self.block_count(),
            "block pool reset"
        );
    }

    /// Returns the contents of an acquired block.
    ///
    /// # Panics
    ///
    /// Panics if the block was acquired from a different pool or before the latest
    /// [`reset()`](Self::reset) of this pool.
    #[must_use]
    pub fn get(&self, block: &Block) -> &[u8] {
        self.assert_owned(block);

        let ptr = self.region.block_ptr(block.index());

        // SAFETY: The block lies within our region and is block_size bytes long. The region was
        // zero-initialized and only ever receives initialized bytes (links, or caller writes that
        // are required to keep the bytes initialized). The handle proves the block is acquired, so
        // the pool does not touch it, and the shared borrow of the pool prevents get_mut() for
        // the lifetime of the slice.
        unsafe { slice::from_raw_parts(ptr.as_ptr(), self.block_size()) }
    }

    /// Returns the contents of an acquired block for modification.
    ///
    /// # Panics
    ///
    /// Panics if the block was acquired from a different pool or before the latest
    /// [`reset()`](Self::reset) of this pool.
    #[must_use]
    #[expect(
        clippy::needless_pass_by_ref_mut,
        reason = "hands out exclusive access to pool memory"
    )]
    pub fn get_mut(&mut self, block: &Block) -> &mut [u8] {
        self.assert_owned(block);

        let ptr = self.region.block_ptr(block.index());

        // SAFETY: As in get(), plus the exclusive borrow of the pool guarantees that no other
        // slice into the region exists for the lifetime of the returned one.
        unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.block_size()) }
    }

    fn assert_owned(&self, block: &Block) {
        assert!(
            block.epoch() == self.epoch,
            "block {} does not belong to this pool of {} blocks or was acquired before a reset",
            block.index(),
            self.block_count()
        );
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    /// Walks the free list and verifies that it visits distinct, in-bounds blocks and that
    /// their number matches the free count.
    ///
    /// This method is only available in debug builds and is used for testing and validation.
    #[allow(
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "integrity check needs array access"
    )]
    pub(crate) fn integrity_check(&self) {
        let block_count = self.block_count();
        let mut visited = vec![false; block_count];
        let mut observed_free_count: usize = 0;

        let mut index = self.next_free_index;

        while index != block_count {
            assert!(
                index < block_count,
                "free list link {index} is out of bounds in pool of {block_count} blocks"
            );

            assert!(
                !visited[index],
                "free list visits block {index} twice in pool of {block_count} blocks"
            );

            visited[index] = true;
            observed_free_count += 1;

            index = self.region.read_link(index);
        }

        assert!(
            self.free_count == observed_free_count,
            "self.free_count {} does not match the observed free list length {} in pool of {block_count} blocks",
            self.free_count,
            observed_free_count,
        );
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if !thread::panicking() && matches!(self.drop_policy, DropPolicy::MustNotDropBlocks) {
            assert!(
                self.is_empty(),
                "dropped a BlockPool with {} acquired blocks - this is forbidden by DropPolicy::MustNotDropBlocks",
                self.len()
            );
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "test code doesn't need the same rigor as production code"
)]
mod tests {
    use std::collections::HashSet;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::{Arc, Mutex};

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(BlockPool: Send, std::fmt::Debug);
    assert_not_impl_any!(BlockPool: Sync);

    #[test]
    fn smoke_test() {
        let mut pool = BlockPool::new(16, 48).unwrap();

        let a = pool.acquire(4).unwrap();
        let b = pool.acquire(8).unwrap();
        let c = pool.acquire(16).unwrap();

        pool.get_mut(&a).fill(0xAA);
        pool.get_mut(&b).fill(0xBB);
        pool.get_mut(&c).fill(0xCC);

        assert!(pool.get(&a).iter().all(|x| *x == 0xAA));
        assert!(pool.get(&b).iter().all(|x| *x == 0xBB));
        assert!(pool.get(&c).iter().all(|x| *x == 0xCC));

        assert_eq!(pool.len(), 3);
        assert!(pool.is_full());

        pool.release(b);

        assert_eq!(pool.len(), 2);

        let d = pool.acquire(1).unwrap();
        pool.get_mut(&d).fill(0xDD);

        assert!(pool.get(&a).iter().all(|x| *x == 0xAA));
        assert!(pool.get(&c).iter().all(|x| *x == 0xCC));
        assert!(pool.get(&d).iter().all(|x| *x == 0xDD));

        pool.release(a);
        pool.release(c);
        pool.release(d);

        assert!(pool.is_empty());
    }

    #[test]
    fn new_pool_is_all_free() {
        let pool = BlockPool::new(32, 4096).unwrap();

        assert_eq!(pool.block_size(), 32);
        assert_eq!(pool.capacity_bytes(), 4096);
        assert_eq!(pool.block_count(), 128);
        assert_eq!(pool.free_count(), 128);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.free_head(), Some(0));
        assert!(pool.is_empty());
        assert!(!pool.is_full());
    }

    #[test]
    fn acquires_in_ascending_address_order() {
        let mut pool = BlockPool::new(32, 256).unwrap();

        let blocks: Vec<_> = (0..8).map(|_| pool.acquire(32).unwrap()).collect();

        for (expected_index, block) in blocks.iter().enumerate() {
            assert_eq!(block.index(), expected_index);
            assert_eq!(block.len(), 32);
        }

        for pair in blocks.windows(2) {
            let first = pair[0].ptr().as_ptr() as usize;
            let second = pair[1].ptr().as_ptr() as usize;
            assert_eq!(second - first, 32);
        }

        for block in blocks {
            pool.release(block);
        }
    }

    #[test]
    fn zero_sizes_are_invalid() {
        assert!(matches!(
            BlockPool::new(0, 4096),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            BlockPool::new(32, 0),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn unobtainable_region_is_allocation_failure() {
        // Describable as a Layout, but no allocator can provide half the address space.
        let capacity_bytes = isize::MAX.unsigned_abs() & !(LINK_SIZE - 1);

        let result = BlockPool::new(LINK_SIZE, capacity_bytes);

        assert!(matches!(
            result,
            Err(Error::AllocationFailed { capacity_bytes: reported }) if reported == capacity_bytes
        ));
    }

    #[test]
    fn block_smaller_than_link_is_invalid() {
        assert!(matches!(
            BlockPool::new(LINK_SIZE - 1, 4096),
            Err(Error::InvalidConfiguration { .. })
        ));

        BlockPool::new(LINK_SIZE, 4096).unwrap();
    }

    #[test]
    fn capacity_smaller_than_block_is_invalid() {
        assert!(matches!(
            BlockPool::new(64, 63),
            Err(Error::InvalidConfiguration { .. })
        ));

        let pool = BlockPool::new(64, 64).unwrap();
        assert_eq!(pool.block_count(), 1);
    }

    #[test]
    fn partial_trailing_block_is_never_served() {
        let mut pool = BlockPool::new(24, 100).unwrap();
        assert_eq!(pool.block_count(), 4);
        assert_eq!(pool.capacity_bytes(), 100);

        let blocks: Vec<_> = (0..4).map(|_| pool.acquire(24).unwrap()).collect();
        assert!(matches!(
            pool.acquire(1),
            Err(Error::PoolExhausted { block_count: 4 })
        ));

        for block in blocks {
            pool.release(block);
        }
    }

    #[test]
    fn oversized_request_leaves_pool_unchanged() {
        let mut pool = BlockPool::new(32, 128).unwrap();

        let result = pool.acquire(33);

        assert!(matches!(
            result,
            Err(Error::BlockTooSmall {
                requested_size: 33,
                block_size: 32
            })
        ));
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.free_head(), Some(0));
    }

    #[test]
    fn zero_sized_request_is_served() {
        let mut pool = BlockPool::new(16, 32).unwrap();

        let block = pool.acquire(0).unwrap();
        assert_eq!(block.len(), 16);

        pool.release(block);
    }

    #[test]
    fn exhausted_pool_reports_error_before_size_check() {
        let mut pool = BlockPool::new(16, 16).unwrap();
        let block = pool.acquire(16).unwrap();

        assert!(matches!(
            pool.acquire(17),
            Err(Error::PoolExhausted { .. })
        ));
        assert_eq!(pool.free_head(), None);
        assert_eq!(pool.free_head_ptr(), None);

        pool.release(block);
    }

    #[test]
    fn release_makes_block_next_to_acquire() {
        let mut pool = BlockPool::new(16, 64).unwrap();

        let a = pool.acquire(16).unwrap();
        let b = pool.acquire(16).unwrap();
        let b_index = b.index();

        let b_ptr = b.ptr();

        pool.release(b);
        assert_eq!(pool.free_head(), Some(b_index));
        assert_eq!(pool.free_head_ptr(), Some(b_ptr));

        let again = pool.acquire(16).unwrap();
        assert_eq!(again.index(), b_index);

        pool.release(a);
        pool.release(again);
    }

    #[test]
    fn release_overwrites_start_of_block() {
        let mut pool = BlockPool::new(16, 16).unwrap();

        let block = pool.acquire(16).unwrap();
        pool.get_mut(&block).fill(0xFF);
        pool.release(block);

        let block = pool.acquire(16).unwrap();
        let bytes = pool.get(&block);

        // The link of the only block points at the sentinel, which is the block count.
        assert_eq!(bytes[..LINK_SIZE], 1_usize.to_ne_bytes());
        assert!(bytes[LINK_SIZE..].iter().all(|x| *x == 0xFF));

        pool.release(block);
    }

    #[test]
    fn reset_returns_all_blocks() {
        let mut pool = BlockPool::new(16, 64).unwrap();

        let a = pool.acquire(1).unwrap();
        let b = pool.acquire(1).unwrap();
        pool.release(a);

        pool.reset();

        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.free_head(), Some(0));
        assert!(pool.is_empty());

        // The stale handle is simply forgotten; it must not be released.
        drop(b);

        let indexes: Vec<_> = (0..4).map(|_| pool.acquire(1).unwrap().index()).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn release_after_reset_panics() {
        let mut pool = BlockPool::new(16, 64).unwrap();

        let block = pool.acquire(1).unwrap();
        pool.reset();

        pool.release(block);
    }

    #[test]
    #[should_panic]
    fn release_into_other_pool_panics() {
        let mut pool_a = BlockPool::new(16, 64).unwrap();
        let mut pool_b = BlockPool::new(16, 64).unwrap();

        let block = pool_a.acquire(1).unwrap();

        pool_b.release(block);
    }

    #[test]
    fn foreign_release_does_not_corrupt_free_list() {
        let mut pool_a = BlockPool::new(16, 64).unwrap();
        let mut pool_b = BlockPool::new(16, 64).unwrap();

        let block = pool_a.acquire(1).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pool_b.release(block);
        }));
        assert!(result.is_err());

        assert_eq!(pool_b.free_count(), 4);
        assert_eq!(pool_b.free_head(), Some(0));

        let indexes: Vec<_> = (0..4).map(|_| pool_b.acquire(1).unwrap().index()).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn get_from_other_pool_panics() {
        let mut pool_a = BlockPool::new(16, 64).unwrap();
        let pool_b = BlockPool::new(16, 64).unwrap();

        let block = pool_a.acquire(1).unwrap();

        _ = pool_b.get(&block);
    }

    #[test]
    fn outstanding_blocks_never_alias() {
        let mut pool = BlockPool::new(8, 512).unwrap();

        let mut outstanding = Vec::new();

        // Churn with an uneven pattern of acquisitions and releases.
        for round in 0..200_usize {
            if round % 3 == 2 && !outstanding.is_empty() {
                let victim = outstanding.swap_remove(round % outstanding.len());
                pool.release(victim);
            } else if let Ok(block) = pool.acquire(8) {
                outstanding.push(block);
            }

            let unique: HashSet<_> = outstanding.iter().map(Block::index).collect();
            assert_eq!(unique.len(), outstanding.len());
            assert_eq!(pool.free_count() + outstanding.len(), pool.block_count());
        }

        for block in outstanding {
            pool.release(block);
        }
    }

    #[test]
    fn unaligned_block_size_works() {
        let mut pool = BlockPool::new(LINK_SIZE + 1, (LINK_SIZE + 1) * 5).unwrap();

        let blocks: Vec<_> = (0..5).map(|_| pool.acquire(1).unwrap()).collect();

        for block in blocks.into_iter().rev() {
            pool.release(block);
        }

        let order: Vec<_> = (0..5).map(|_| pool.acquire(1).unwrap().index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn must_not_drop_blocks_panics_with_outstanding_block() {
        let mut pool = BlockPool::builder()
            .block_size(16)
            .capacity_bytes(64)
            .drop_policy(DropPolicy::MustNotDropBlocks)
            .build()
            .unwrap();

        _ = pool.acquire(1).unwrap();

        drop(pool);
    }

    #[test]
    fn must_not_drop_blocks_allows_empty_pool() {
        let mut pool = BlockPool::builder()
            .block_size(16)
            .capacity_bytes(64)
            .drop_policy(DropPolicy::MustNotDropBlocks)
            .build()
            .unwrap();

        let block = pool.acquire(1).unwrap();
        pool.release(block);

        drop(pool);
    }

    #[test]
    fn multithreaded_via_mutex() {
        let pool = Arc::new(Mutex::new(BlockPool::new(16, 64).unwrap()));

        let (a, b) = {
            let mut pool = pool.lock().unwrap();
            (pool.acquire(16).unwrap(), pool.acquire(16).unwrap())
        };

        pool.lock().unwrap().get_mut(&a).fill(42);

        let pool_clone = Arc::clone(&pool);
        let handle = thread::spawn(move || {
            let mut pool = pool_clone.lock().unwrap();

            pool.release(b);

            let c = pool.acquire(16).unwrap();
            assert_eq!(c.index(), 1);
            assert!(pool.get(&a).iter().all(|x| *x == 42));

            pool.release(c);
            pool.release(a);
        });

        handle.join().unwrap();

        assert!(pool.lock().unwrap().is_empty());
    }
}
