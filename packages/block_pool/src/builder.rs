use std::cell::Cell;
use std::marker::PhantomData;

use crate::{BlockPool, DropPolicy, Error, Result};

/// Size of the backing region when none is specified: one 4 KiB page.
pub const DEFAULT_CAPACITY_BYTES: usize = 4096;

/// Builder for creating an instance of [`BlockPool`].
///
/// The block size is mandatory, whereas other settings are optional. The region defaults to
/// [`DEFAULT_CAPACITY_BYTES`].
///
/// # Examples
///
/// ```
/// use block_pool::{BlockPool, DropPolicy};
///
/// let pool = BlockPool::builder()
///     .block_size(32)
///     .capacity_bytes(1024)
///     .drop_policy(DropPolicy::MustNotDropBlocks)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.block_count(), 32);
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing pool configuration to happen on different threads than where the pool is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct BlockPoolBuilder {
    block_size: Option<usize>,
    capacity_bytes: usize,
    drop_policy: DropPolicy,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl BlockPoolBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            block_size: None,
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            drop_policy: DropPolicy::default(),
            _not_sync: PhantomData,
        }
    }

    /// Sets the size of every block served by the pool, in bytes.
    ///
    /// The block size must be at least the size of `usize`, because free blocks store the free
    /// list link in their own memory.
    #[inline]
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = Some(block_size);
        self
    }

    /// Sets the size of the backing region, in bytes.
    ///
    /// If this is not a multiple of the block size, the remainder is left unused.
    #[inline]
    pub fn capacity_bytes(mut self, capacity_bytes: usize) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how to treat blocks that
    /// are still acquired when the pool is dropped.
    #[inline]
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if no block size was set or if the sizes do not
    /// describe a usable pool (see [`BlockPool::new()`]).
    ///
    /// Returns [`Error::AllocationFailed`] if the region cannot be allocated.
    pub fn build(self) -> Result<BlockPool> {
        let block_size = self.block_size.ok_or_else(|| {
            Error::invalid_configuration(
                "block size must be set using .block_size() before calling .build()",
            )
        })?;

        BlockPool::new_inner(block_size, self.capacity_bytes, self.drop_policy)
    }
}
