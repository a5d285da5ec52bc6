//! Lock-free single-producer / single-consumer byte FIFO.
//!
//! `RingBuffer<N>` sits between the refill interrupt (producer, reads from
//! storage) and the sample interrupt (consumer, feeds the DAC). Each side
//! owns one cursor:
//!
//! - the write cursor is only advanced through a [`Producer`],
//! - the read cursor is only advanced through a [`Consumer`].
//!
//! Both handles borrow the buffer mutably, so the borrow checker rules out a
//! second writer of either cursor. Cursors are atomics with acquire/release
//! ordering: a byte becomes visible to the consumer only after it has been
//! stored.
//!
//! # Constraints
//!
//! - `N` must be a power of two and at least 2 (checked at compile time).
//! - One slot is reserved to tell full from empty, so at most `N - 1` bytes
//!   are held at once.
//! - No allocation; the storage is an inline array.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Push on a full buffer. Carries the rejected byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overflow(pub u8);

impl core::fmt::Display for Overflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ring buffer full, byte {:#04x} rejected", self.0)
    }
}

/// Fixed-capacity byte FIFO with separate read and write cursors.
#[derive(Debug)]
pub struct RingBuffer<const N: usize> {
    buf: UnsafeCell<[u8; N]>,
    /// Next slot to read. Written only by the consumer.
    read: AtomicUsize,
    /// Next slot to write. Written only by the producer.
    write: AtomicUsize,
}

// SAFETY: the producer only writes slots in the free region and the consumer
// only reads slots in the filled region. The regions are disjoint and
// published through release stores of the cursors.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = {
        assert!(N >= 2 && N.is_power_of_two(), "capacity must be a power of two >= 2");
        N.wrapping_sub(1)
    };

    /// Create an empty buffer.
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buf: UnsafeCell::new([0; N]),
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
        }
    }

    /// Maximum number of bytes held at once (`N - 1`).
    pub const fn capacity(&self) -> usize {
        Self::MASK
    }

    /// Bytes currently buffered.
    pub fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read) & Self::MASK
    }

    /// `true` when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when a push would be rejected.
    pub fn is_full(&self) -> bool {
        self.len() == Self::MASK
    }

    /// Bytes that can be pushed before the buffer is full.
    pub fn free_space(&self) -> usize {
        Self::MASK.saturating_sub(self.len())
    }

    /// Push one byte, or hand it back when full.
    pub fn push(&mut self, byte: u8) -> Result<(), Overflow> {
        self.producer().push(byte)
    }

    /// Pop the oldest byte.
    pub fn pop(&mut self) -> Option<u8> {
        self.consumer().pop()
    }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) {
        let write = self.write.load(Ordering::Acquire);
        self.read.store(write, Ordering::Release);
    }

    /// Producer-side handle.
    pub fn producer(&mut self) -> Producer<'_, N> {
        Producer { rb: self }
    }

    /// Consumer-side handle.
    pub fn consumer(&mut self) -> Consumer<'_, N> {
        Consumer { rb: self }
    }

    /// Split into both handles at once.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let rb: &Self = self;
        (Producer { rb }, Consumer { rb })
    }

    fn slot_ptr(&self, index: usize) -> *mut u8 {
        // Offsetting within the array; callers mask `index` first.
        self.buf.get().cast::<u8>().wrapping_add(index & Self::MASK)
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write side of a [`RingBuffer`]. Advances only the write cursor.
pub struct Producer<'a, const N: usize> {
    rb: &'a RingBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Bytes that can be pushed before the buffer is full.
    pub fn free_space(&self) -> usize {
        self.rb.free_space()
    }

    /// Bytes currently buffered.
    pub fn len(&self) -> usize {
        self.rb.len()
    }

    /// `true` when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }

    /// Push one byte at the write cursor.
    pub fn push(&mut self, byte: u8) -> Result<(), Overflow> {
        let write = self.rb.write.load(Ordering::Relaxed);
        let read = self.rb.read.load(Ordering::Acquire);
        if write.wrapping_add(1) & RingBuffer::<N>::MASK == read {
            warn!("push rejected, buffer full");
            return Err(Overflow(byte));
        }
        // SAFETY: `write` is in the free region (not equal to `read - 1`
        // after the check above) and only this producer writes there.
        unsafe { self.rb.slot_ptr(write).write(byte) };
        self.rb
            .write
            .store(write.wrapping_add(1) & RingBuffer::<N>::MASK, Ordering::Release);
        Ok(())
    }

    /// Fill up to `max_bytes` of free space straight from `read`.
    ///
    /// `read` is called with a slice of the free region and returns how many
    /// bytes it stored there. The free region may wrap past the end of the
    /// backing array, so at most two calls are made: the first from the
    /// write cursor to the physical end, the second from index 0. A short
    /// first read ends the refill. Returns the number of bytes added; an
    /// error from `read` is returned after publishing nothing from that call.
    pub fn refill_from<E, R>(&mut self, max_bytes: usize, mut read: R) -> Result<usize, E>
    where
        R: FnMut(&mut [u8]) -> Result<usize, E>,
    {
        let want = self.free_space().min(max_bytes);
        if want == 0 {
            return Ok(0);
        }
        let write = self.rb.write.load(Ordering::Relaxed);
        let first_len = want.min(N.saturating_sub(write));
        let second_len = want.saturating_sub(first_len);

        let got = self.fill_region(write, first_len, &mut read)?;
        if got < first_len || second_len == 0 {
            return Ok(got);
        }
        let wrapped = self.fill_region(0, second_len, &mut read)?;
        Ok(got.saturating_add(wrapped))
    }

    /// Hand `len` free slots starting at `start` to `read`, then publish
    /// what it stored.
    fn fill_region<E, R>(&mut self, start: usize, len: usize, read: &mut R) -> Result<usize, E>
    where
        R: FnMut(&mut [u8]) -> Result<usize, E>,
    {
        // SAFETY: `start..start + len` lies within the array (callers split at
        // the physical end) and within the free region (`len` never exceeds
        // free space), so the consumer does not touch it until the write
        // cursor is published below.
        let region = unsafe { core::slice::from_raw_parts_mut(self.rb.slot_ptr(start), len) };
        let n = read(region)?.min(len);
        self.rb
            .write
            .store(start.wrapping_add(n) & RingBuffer::<N>::MASK, Ordering::Release);
        Ok(n)
    }
}

/// Read side of a [`RingBuffer`]. Advances only the read cursor.
pub struct Consumer<'a, const N: usize> {
    rb: &'a RingBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Pop the oldest byte, or `None` when empty.
    pub fn pop(&mut self) -> Option<u8> {
        let read = self.rb.read.load(Ordering::Relaxed);
        if read == self.rb.write.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `read != write`, so the slot holds a byte the producer has
        // published, and only this consumer reads it.
        let byte = unsafe { self.rb.slot_ptr(read).read() };
        self.rb
            .read
            .store(read.wrapping_add(1) & RingBuffer::<N>::MASK, Ordering::Release);
        Some(byte)
    }

    /// Bytes currently buffered.
    pub fn len(&self) -> usize {
        self.rb.len()
    }

    /// `true` when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }
}
