//! Behavioral properties of `BlockPool` exercised through the public API only.
#![allow(
    clippy::indexing_slicing,
    reason = "test code doesn't need the same rigor as production code"
)]

use std::collections::HashSet;

use block_pool::{Block, BlockPool, Error};

#[test]
fn capacity_is_conserved_through_churn() {
    let mut pool = BlockPool::new(16, 16 * 20).unwrap();
    let block_count = pool.block_count();

    let mut outstanding: Vec<Block> = Vec::new();

    for step in 0..500_usize {
        // Deterministic but irregular mix, biased towards acquiring.
        let acquire = step.wrapping_mul(7919) % 5 < 3;

        if acquire {
            match pool.acquire(step % 17) {
                Ok(block) => outstanding.push(block),
                Err(Error::PoolExhausted { .. }) => assert_eq!(outstanding.len(), block_count),
                Err(other) => panic!("unexpected error: {other}"),
            }
        } else if !outstanding.is_empty() {
            let victim = outstanding.swap_remove(step % outstanding.len());
            pool.release(victim);
        }

        assert_eq!(pool.free_count() + outstanding.len(), block_count);
        assert_eq!(pool.len(), outstanding.len());

        let distinct: HashSet<usize> = outstanding.iter().map(Block::index).collect();
        assert_eq!(distinct.len(), outstanding.len());
    }

    for block in outstanding {
        pool.release(block);
    }

    assert!(pool.is_empty());
}

#[test]
fn exhaustion_after_block_count_acquisitions() {
    let mut pool = BlockPool::new(32, 512).unwrap();

    let blocks: Vec<_> = (0..pool.block_count())
        .map(|_| pool.acquire(32).unwrap())
        .collect();

    assert_eq!(blocks.len(), 16);
    assert_eq!(pool.free_count(), 0);
    assert!(matches!(
        pool.acquire(1),
        Err(Error::PoolExhausted { block_count: 16 })
    ));

    for block in blocks {
        pool.release(block);
    }
}

#[test]
fn recovers_after_exhaustion() {
    let mut pool = BlockPool::new(32, 128).unwrap();

    let mut blocks: Vec<_> = (0..4).map(|_| pool.acquire(8).unwrap()).collect();
    assert!(pool.acquire(8).is_err());

    let released = blocks.pop().unwrap();
    let released_index = released.index();
    pool.release(released);

    let block = pool.acquire(8).unwrap();
    assert_eq!(block.index(), released_index);
    assert_eq!(block.len(), 32);

    pool.get_mut(&block).fill(7);
    assert!(pool.get(&block).iter().all(|x| *x == 7));

    blocks.push(block);
    for block in blocks {
        pool.release(block);
    }
}

#[test]
fn oversized_request_is_rejected_without_side_effects() {
    let mut pool = BlockPool::new(32, 4096).unwrap();
    let held = pool.acquire(32).unwrap();

    let free_before = pool.free_count();
    let head_before = pool.free_head();

    let result = pool.acquire(33);

    assert!(matches!(
        result,
        Err(Error::BlockTooSmall {
            requested_size: 33,
            block_size: 32
        })
    ));
    assert_eq!(pool.free_count(), free_before);
    assert_eq!(pool.free_head(), head_before);

    pool.release(held);
}

#[test]
fn reuse_is_lifo() {
    let mut pool = BlockPool::new(16, 256).unwrap();

    let a = pool.acquire(1).unwrap();
    let b = pool.acquire(1).unwrap();
    let c = pool.acquire(1).unwrap();
    let d = pool.acquire(1).unwrap();

    let a_ptr = a.ptr();
    let c_ptr = c.ptr();

    pool.release(a);
    pool.release(c);

    let first = pool.acquire(1).unwrap();
    let second = pool.acquire(1).unwrap();

    assert_eq!(first.ptr(), c_ptr);
    assert_eq!(second.ptr(), a_ptr);

    for block in [b, d, first, second] {
        pool.release(block);
    }
}

#[test]
fn one_page_with_32_byte_blocks() {
    let mut pool = BlockPool::new(32, 4096).unwrap();
    assert_eq!(pool.free_count(), 128);

    let p1 = pool.acquire(5).unwrap();
    let p2 = pool.acquire(10).unwrap();
    let p3 = pool.acquire(15).unwrap();
    let p4 = pool.acquire(20).unwrap();

    assert_eq!(pool.free_count(), 124);

    let addresses: Vec<usize> = [&p1, &p2, &p3, &p4]
        .iter()
        .map(|block| block.ptr().as_ptr() as usize)
        .collect();

    for pair in addresses.windows(2) {
        assert_eq!(pair[1] - pair[0], 32);
    }

    assert_eq!(
        [p1.index(), p2.index(), p3.index(), p4.index()],
        [0, 1, 2, 3]
    );

    let p1_ptr = p1.ptr();
    let p3_ptr = p3.ptr();
    let p3_index = p3.index();

    pool.release(p1);
    pool.release(p3);

    assert_eq!(pool.free_count(), 126);
    assert_eq!(pool.free_head(), Some(p3_index));
    assert_eq!(pool.free_head_ptr(), Some(p3_ptr));

    let p5 = pool.acquire(25).unwrap();
    let p6 = pool.acquire(30).unwrap();

    assert_eq!(p5.ptr(), p3_ptr);
    assert_eq!(p6.ptr(), p1_ptr);
    assert_eq!(pool.free_count(), 124);

    for block in [p2, p4, p5, p6] {
        pool.release(block);
    }
}

#[test]
fn reset_restores_all_free_state() {
    let mut pool = BlockPool::new(32, 4096).unwrap();

    let blocks: Vec<_> = (0..50).map(|_| pool.acquire(1).unwrap()).collect();
    let first_ptr = blocks[0].ptr();

    // Handles from before the reset are invalid afterwards and must not be released.
    drop(blocks);

    pool.reset();

    assert_eq!(pool.free_count(), 128);
    assert_eq!(pool.free_head(), Some(0));

    let block = pool.acquire(1).unwrap();
    assert_eq!(block.ptr(), first_ptr);
    pool.release(block);
}

#[test]
fn data_written_to_blocks_is_preserved_until_release() {
    let mut pool = BlockPool::new(64, 64 * 8).unwrap();

    let blocks: Vec<_> = (0..8).map(|_| pool.acquire(64).unwrap()).collect();

    for (i, block) in blocks.iter().enumerate() {
        pool.get_mut(block).fill(u8::try_from(i).unwrap());
    }

    for (i, block) in blocks.iter().enumerate() {
        let expected = u8::try_from(i).unwrap();
        assert!(pool.get(block).iter().all(|x| *x == expected));
    }

    for block in blocks {
        pool.release(block);
    }
}

#[test]
fn out_of_band_access_through_pointer() {
    let mut pool = BlockPool::new(16, 64).unwrap();

    let block = pool.acquire(8).unwrap();

    // SAFETY: The block is acquired and at least 8 bytes long; blocks of this pool start at
    // multiples of 16 bytes from a usize-aligned region, so a u64 fits with unaligned access.
    unsafe {
        block
            .ptr()
            .cast::<u64>()
            .write_unaligned(0x0123_4567_89AB_CDEF);
    }

    assert_eq!(pool.get(&block)[..8], 0x0123_4567_89AB_CDEF_u64.to_ne_bytes());

    pool.release(block);
}
