//! Single-Producer/Single-Consumer FIFO
//!
//! Fixed-capacity queue used wherever data crosses from the audio thread to
//! the UI refresh tick, and between the stages of the analyzer pipeline.
//!
//! # Real-time Safety
//!
//! Backed by `rtrb`: every operation is wait-free, O(1), and never allocates
//! or locks. When the queue is full the *newest* item is rejected; unread
//! items are never overwritten, so whatever is eventually read arrives in
//! write order.

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::error::{AnalysisError, AnalysisResult};

/// Create a FIFO holding up to `capacity` items
pub fn fifo<T>(capacity: usize) -> AnalysisResult<(FifoWriter<T>, FifoReader<T>)> {
    if capacity == 0 {
        return Err(AnalysisError::ZeroCapacity);
    }
    let (producer, consumer) = RingBuffer::<T>::new(capacity);
    Ok((FifoWriter { producer }, FifoReader { consumer }))
}

/// Producer half. Exactly one thread may own it.
pub struct FifoWriter<T> {
    producer: Producer<T>,
}

impl<T> FifoWriter<T> {
    /// Push `item`; returns false (and drops the item) when the FIFO is full.
    ///
    /// Dropping a heap-owning item deallocates. Audio-thread callers holding
    /// such items use [`FifoWriter::try_write`] instead.
    #[inline]
    pub fn write(&mut self, item: T) -> bool {
        self.try_write(item).is_ok()
    }

    /// Push `item`, handing it back when the FIFO is full
    #[inline]
    pub fn try_write(&mut self, item: T) -> Result<(), T> {
        self.producer.push(item).map_err(|PushError::Full(item)| item)
    }

    /// Free slots (conservative: the consumer may free more concurrently)
    #[inline]
    pub fn available_for_write(&self) -> usize {
        self.producer.slots()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.producer.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.producer.buffer().capacity()
    }
}

/// Consumer half. Exactly one thread may own it.
pub struct FifoReader<T> {
    consumer: Consumer<T>,
}

impl<T> FifoReader<T> {
    /// Pop the oldest item, `None` when empty
    #[inline]
    pub fn read(&mut self) -> Option<T> {
        self.consumer.pop().ok()
    }

    /// Readable items (conservative: the producer may add more concurrently)
    #[inline]
    pub fn available_for_read(&self) -> usize {
        self.consumer.slots()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Drain everything currently available, keeping only the newest item
    pub fn read_latest(&mut self) -> Option<T> {
        let mut latest = None;
        while let Some(item) = self.read() {
            latest = Some(item);
        }
        latest
    }

    pub fn capacity(&self) -> usize {
        self.consumer.buffer().capacity()
    }
}
