use thiserror::Error;

/// Errors that can occur when creating a [`BlockPool`][crate::BlockPool] or acquiring
/// blocks from it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool was configured with parameters that cannot describe a usable pool.
    ///
    /// The pool is not created. The caller may retry with valid parameters.
    #[error("invalid block pool configuration: {problem}")]
    InvalidConfiguration {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// The memory allocator could not provide the backing region for the pool.
    #[error("failed to allocate a backing region of {capacity_bytes} bytes")]
    AllocationFailed {
        /// Size of the region that was requested from the allocator.
        capacity_bytes: usize,
    },

    /// Every block in the pool is currently acquired.
    ///
    /// The pool remains usable. Releasing a block makes room for another acquisition.
    #[error("all {block_count} blocks of the pool are in use")]
    PoolExhausted {
        /// Total number of blocks in the pool.
        block_count: usize,
    },

    /// The caller asked for more bytes than a single block of the pool can hold.
    #[error("requested {requested_size} bytes but blocks in this pool are {block_size} bytes")]
    BlockTooSmall {
        /// Number of bytes the caller asked for.
        requested_size: usize,

        /// Size of every block in the pool.
        block_size: usize,
    },
}

impl Error {
    pub(crate) fn invalid_configuration(problem: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            problem: problem.into(),
        }
    }
}

/// A specialized `Result` type for block pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
