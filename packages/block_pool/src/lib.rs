//! A fixed-size block pool that serves uniformly sized blocks from one pre-allocated region.
//!
//! This crate provides [`BlockPool`], which carves a single contiguous region into blocks of
//! equal size and hands them out from a free list threaded through the unused blocks
//! themselves. Besides the free list head and a counter, the pool keeps no per-block metadata:
//! a free block stores the index of the next free block in its first bytes, and an acquired
//! block belongs entirely to the caller.
//!
//! # Key Features
//!
//! - **O(1) acquire and release**: Acquiring pops the free list head, releasing pushes onto it
//! - **LIFO reuse**: The most recently released block is the next one handed out
//! - **Fixed capacity**: The pool never grows; exhaustion is reported as [`Error::PoolExhausted`]
//! - **Ownership-checked handles**: A [`Block`] is consumed on release and is rejected by any
//!   pool other than the one (and the reset generation) that produced it
//! - **Out of band access**: Block memory can be used through raw pointers from unsafe code
//!
//! # Example
//!
//! ```
//! use block_pool::{BlockPool, Error};
//!
//! let mut pool = BlockPool::new(32, 128).unwrap();
//!
//! let a = pool.acquire(5).unwrap();
//! let b = pool.acquire(10).unwrap();
//! let c = pool.acquire(15).unwrap();
//! let d = pool.acquire(20).unwrap();
//!
//! assert!(matches!(pool.acquire(1), Err(Error::PoolExhausted { .. })));
//!
//! let c_index = c.index();
//! pool.release(a);
//! pool.release(c);
//!
//! // Released blocks are reused most recent first.
//! let e = pool.acquire(25).unwrap();
//! assert_eq!(e.index(), c_index);
//!
//! # pool.release(b);
//! # pool.release(d);
//! # pool.release(e);
//! ```

mod block;
mod builder;
mod drop_policy;
mod error;
mod pool;
mod region;

pub use block::Block;
pub use builder::*;
pub use drop_policy::*;
pub use error::*;
pub use pool::BlockPool;
