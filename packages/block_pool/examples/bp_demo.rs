//! Walks through the life of a one-page pool of 32-byte blocks:
//!
//! * Acquiring four blocks of increasing requested sizes.
//! * Releasing the first and third block.
//! * Acquiring two more blocks, which reuse the released ones most recent first.
//!
//! Pool initialization is logged at debug level.

use block_pool::BlockPool;
use tracing::Level;

fn main() -> Result<(), block_pool::Error> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let mut pool = BlockPool::builder().block_size(32).build()?;

    println!(
        "Pool of {} blocks of {} bytes, {} free",
        pool.block_count(),
        pool.block_size(),
        pool.free_count()
    );

    let p1 = pool.acquire(5)?;
    println!("p1 -> {:p}", p1.ptr());
    let p2 = pool.acquire(10)?;
    println!("p2 -> {:p}", p2.ptr());
    let p3 = pool.acquire(15)?;
    println!("p3 -> {:p}", p3.ptr());
    let p4 = pool.acquire(20)?;
    println!("p4 -> {:p}", p4.ptr());

    pool.release(p1);
    print_free_head(&pool);
    pool.release(p3);
    print_free_head(&pool);

    // The most recently released block (p3) comes back first, then p1.
    let p5 = pool.acquire(25)?;
    println!("p5 -> {:p}", p5.ptr());
    let p6 = pool.acquire(30)?;
    println!("p6 -> {:p}", p6.ptr());

    println!("{} blocks free", pool.free_count());

    for block in [p2, p4, p5, p6] {
        pool.release(block);
    }

    Ok(())
}

fn print_free_head(pool: &BlockPool) {
    match (pool.free_head(), pool.free_head_ptr()) {
        (Some(index), Some(ptr)) => println!("free head -> {ptr:p} (block {index})"),
        _ => println!("free head -> none"),
    }
}
