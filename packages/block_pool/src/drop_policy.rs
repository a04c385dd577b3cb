/// Determines how a [`BlockPool`][crate::BlockPool] treats blocks that are still acquired
/// when the pool is dropped.
///
/// By default, the pool frees its region regardless of outstanding blocks.
///
/// # Examples
///
/// ```
/// use block_pool::{BlockPool, DropPolicy};
///
/// let pool = BlockPool::builder()
///     .block_size(32)
///     .drop_policy(DropPolicy::MustNotDropBlocks)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool frees its region even if some blocks are still acquired. This is the default.
    ///
    /// Pointers obtained from outstanding blocks dangle once the pool is gone.
    #[default]
    MayDropBlocks,

    /// The pool will panic if any block is still acquired when it is dropped.
    ///
    /// This may be valuable if unsafe code holds pointers into pool blocks and the pool is
    /// expected to outlive all of them.
    MustNotDropBlocks,
}
