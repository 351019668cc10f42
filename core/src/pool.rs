//! Reusable scratch buffers for draining response bodies.
//!
//! # Design
//! A `BufferPool` keeps a mutex-guarded free list. `acquire` pops a buffer
//! (or allocates one) and hands it out inside a `PooledBuffer` guard; dropping
//! the guard clears the buffer and pushes it back. A buffer is owned by
//! exactly one guard at a time, and every buffer is empty when handed out.
//! Buffers that grew past the retention limit are shrunk back before they
//! re-enter the pool, so one large body does not pin its memory.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use log::trace;

/// Capacity of freshly allocated buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Idle buffers retained by a default pool.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Largest capacity an idle buffer may keep; bigger ones are shrunk on release.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Shared pool of scratch buffers used to drain response bodies.
///
/// Safe to share across threads; `acquire` never hands the same buffer to
/// two holders.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    buffer_capacity: usize,
    max_idle: usize,
    max_retained_capacity: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_IDLE)
    }

    /// Pool allocating buffers of `buffer_capacity` bytes and retaining at
    /// most `max_idle` of them between uses.
    pub fn with_capacity(buffer_capacity: usize, max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            buffer_capacity,
            max_idle,
            max_retained_capacity: DEFAULT_MAX_RETAINED_CAPACITY.max(buffer_capacity),
        }
    }

    /// Cap the capacity an idle buffer keeps. Never below the allocation
    /// capacity.
    pub fn with_max_retained_capacity(mut self, bytes: usize) -> Self {
        self.max_retained_capacity = bytes.max(self.buffer_capacity);
        self
    }

    pub fn acquire(&self) -> PooledBuffer<'_> {
        let reused = self.lock().pop();
        let mut buf = match reused {
            Some(buf) => {
                trace!("reusing pooled buffer with capacity {}", buf.capacity());
                buf
            }
            None => Vec::with_capacity(self.buffer_capacity),
        };
        buf.clear();
        PooledBuffer { buf, pool: self }
    }

    /// Number of buffers currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        buf.clear();
        if buf.capacity() > self.max_retained_capacity {
            trace!("shrinking pooled buffer from {} bytes", buf.capacity());
            buf.shrink_to(self.buffer_capacity);
        }
        let mut free = self.lock();
        if free.len() < self.max_idle {
            free.push(buf);
        }
    }

    // A panic while holding the lock cannot leave the free list inconsistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffer on loan from a `BufferPool`. Returned to the pool on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
