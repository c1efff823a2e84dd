//! Channel Block Collector
//!
//! Accumulates the audio callback's arbitrary-length chunks into fixed-size
//! sample blocks and hands completed blocks to the UI side.
//!
//! # Architecture
//!
//! ```text
//!            push(chunk)                         pop() / recycle()
//! Audio ──▶ BlockCollector ──rtrb: full blocks──▶ BlockReceiver ──▶ analyzer
//!               ▲                                      │
//!               └────────rtrb: empty blocks────────────┘
//! ```
//!
//! Every block is allocated up front. The audio side swaps a filled block for
//! an empty one from the return queue, so `push` never allocates or frees.
//! When the UI side falls behind, completed blocks are discarded and counted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{AnalysisError, AnalysisResult};
use crate::fifo::{fifo, FifoReader, FifoWriter};

/// One channel's worth of consecutive samples, `block_size` long
pub type SampleBlock = Box<[f32]>;

/// Create a connected collector/receiver pair for one channel.
///
/// `capacity` is the number of completed blocks that can wait for the
/// consumer before new ones are dropped.
pub fn block_channel(
    block_size: usize,
    capacity: usize,
) -> AnalysisResult<(BlockCollector, BlockReceiver)> {
    if block_size == 0 {
        return Err(AnalysisError::InvalidBlockSize {
            got: block_size,
            max: usize::MAX,
        });
    }

    let (full_tx, full_rx) = fifo::<SampleBlock>(capacity)?;
    let (mut empty_tx, empty_rx) = fifo::<SampleBlock>(capacity)?;

    for _ in 0..capacity {
        empty_tx.write(vec![0.0; block_size].into_boxed_slice());
    }

    let dropped = Arc::new(AtomicUsize::new(0));

    let collector = BlockCollector {
        current: vec![0.0; block_size].into_boxed_slice(),
        fill: 0,
        output: full_tx,
        spares: empty_rx,
        dropped: Arc::clone(&dropped),
    };

    let receiver = BlockReceiver {
        input: full_rx,
        spares: empty_tx,
        dropped,
        block_size,
    };

    Ok((collector, receiver))
}

/// Audio-thread half of a block channel
pub struct BlockCollector {
    current: SampleBlock,
    fill: usize,
    output: FifoWriter<SampleBlock>,
    spares: FifoReader<SampleBlock>,
    dropped: Arc<AtomicUsize>,
}

impl BlockCollector {
    /// Append a chunk of samples, publishing every block it completes
    ///
    /// # Real-time Safety
    /// - No allocations
    /// - No locks
    /// - O(n) where n = chunk length
    #[inline]
    pub fn push(&mut self, samples: &[f32]) {
        let mut remaining = samples;
        while !remaining.is_empty() {
            let space = self.current.len() - self.fill;
            let take = space.min(remaining.len());
            self.current[self.fill..self.fill + take].copy_from_slice(&remaining[..take]);
            self.fill += take;
            remaining = &remaining[take..];

            if self.fill == self.current.len() {
                self.publish();
            }
        }
    }

    fn publish(&mut self) {
        self.fill = 0;

        if self.output.is_full() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let Some(spare) = self.spares.read() else {
            // Consumer is still holding every spare block
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let full = std::mem::replace(&mut self.current, spare);
        if let Err(full) = self.output.try_write(full) {
            // Unreachable with a single producer: the queue was not full above
            self.current = full;
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn block_size(&self) -> usize {
        self.current.len()
    }

    /// Samples accumulated towards the next block
    pub fn pending(&self) -> usize {
        self.fill
    }
}

/// UI-side half of a block channel
pub struct BlockReceiver {
    input: FifoReader<SampleBlock>,
    spares: FifoWriter<SampleBlock>,
    dropped: Arc<AtomicUsize>,
    block_size: usize,
}

impl BlockReceiver {
    /// Take the oldest completed block.
    ///
    /// Hand it back with [`BlockReceiver::recycle`] once done; a block that is
    /// never returned permanently shrinks the pool.
    pub fn pop(&mut self) -> Option<SampleBlock> {
        self.input.read()
    }

    /// Return a consumed block to the collector
    pub fn recycle(&mut self, block: SampleBlock) {
        debug_assert_eq!(block.len(), self.block_size, "Foreign block recycled");
        if block.len() == self.block_size {
            // The pool never holds more blocks than the return queue's capacity
            self.spares.write(block);
        }
    }

    /// Visit every available block in order, recycling each one
    pub fn drain(&mut self, mut visit: impl FnMut(&[f32])) -> usize {
        let mut count = 0;
        while let Some(block) = self.pop() {
            visit(&block);
            self.recycle(block);
            count += 1;
        }
        count
    }

    pub fn available(&self) -> usize {
        self.input.available_for_read()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total blocks discarded on the audio side since creation
    pub fn dropped_blocks(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(block_channel(0, 4).is_err());
        assert!(block_channel(64, 0).is_err());
    }

    #[test]
    fn test_blocks_assemble_across_chunks() {
        let (mut collector, mut receiver) = block_channel(4, 4).unwrap();

        collector.push(&[1.0, 2.0, 3.0]);
        assert_eq!(receiver.available(), 0);
        assert_eq!(collector.pending(), 3);

        collector.push(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(receiver.available(), 2);
        assert_eq!(collector.pending(), 1);

        let first = receiver.pop().unwrap();
        assert_eq!(&first[..], &[1.0, 2.0, 3.0, 4.0]);
        let second = receiver.pop().unwrap();
        assert_eq!(&second[..], &[5.0, 6.0, 7.0, 8.0]);
        assert!(receiver.pop().is_none());
    }

    #[test]
    fn test_overflow_drops_newest_blocks() {
        let (mut collector, mut receiver) = block_channel(2, 2).unwrap();

        // Five complete blocks into a queue of two
        collector.push(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
        assert_eq!(receiver.available(), 2);
        assert_eq!(receiver.dropped_blocks(), 3);

        let mut firsts = Vec::new();
        receiver.drain(|block| firsts.push(block[0]));
        assert_eq!(firsts, vec![0.0, 1.0]);
    }

    #[test]
    fn test_recycling_keeps_pool_alive() {
        let (mut collector, mut receiver) = block_channel(8, 2).unwrap();
        let chunk = [0.25; 8];

        for _ in 0..100 {
            collector.push(&chunk);
            assert_eq!(receiver.drain(|block| assert_eq!(block, &chunk)), 1);
        }
        assert_eq!(receiver.dropped_blocks(), 0);
    }

    #[test]
    fn test_unreturned_blocks_starve_collector() {
        let (mut collector, mut receiver) = block_channel(1, 2).unwrap();

        collector.push(&[1.0, 2.0]);
        let held_a = receiver.pop().unwrap();
        let held_b = receiver.pop().unwrap();

        // Queue is empty but no spare block exists
        collector.push(&[3.0]);
        assert_eq!(receiver.available(), 0);
        assert_eq!(receiver.dropped_blocks(), 1);

        receiver.recycle(held_a);
        receiver.recycle(held_b);
        collector.push(&[4.0]);
        assert_eq!(receiver.pop().as_deref(), Some(&[4.0][..]));
    }

    #[test]
    fn test_threaded_stream_stays_contiguous() {
        let (mut collector, mut receiver) = block_channel(64, 8).unwrap();
        const TOTAL: usize = 64 * 500;

        let audio = thread::spawn(move || {
            let samples: Vec<f32> = (0..TOTAL).map(|i| i as f32).collect();
            // Irregular callback sizes
            for chunk in samples.chunks(37) {
                collector.push(chunk);
            }
        });

        let mut blocks_seen = 0;
        let mut check = |block: &[f32]| {
            // Each block holds consecutive sample indices
            for pair in block.windows(2) {
                assert_eq!(pair[1] - pair[0], 1.0);
            }
            assert_eq!(block[0] as usize % 64, 0);
            blocks_seen += 1;
        };

        while !audio.is_finished() {
            receiver.drain(&mut check);
            thread::yield_now();
        }
        audio.join().unwrap();
        receiver.drain(&mut check);

        assert_eq!(blocks_seen + receiver.dropped_blocks(), TOTAL / 64);
    }
}
