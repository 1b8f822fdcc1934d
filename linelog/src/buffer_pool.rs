//! Reusable byte buffers for document assembly
//!
//! A buffer is leased for the whole assemble/hook/write sequence of one emission and goes back to
//! the pool when the lease is dropped, including when unwinding. Idle buffers are kept per
//! capacity class so that a large document does not pin a large buffer for small ones forever.
use std::{
    ops::{Deref, DerefMut},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

const CAPACITY_CLASSES: [usize; 4] = [256, 1024, 4096, 16 * 1024];
const NB_CLASSES: usize = CAPACITY_CLASSES.len();
/// Buffers that grew past this are released to the allocator instead of being kept.
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;
const MAX_IDLE_PER_CLASS: usize = 64;

static GLOBAL_POOL: BufferPool = BufferPool::new();

/// Counters describing how the pool has been used so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocations: u64,
    pub reuses: u64,
    pub discards: u64,
    pub idle_buffers: usize,
}

pub struct BufferPool {
    classes: [Mutex<Vec<Vec<u8>>>; NB_CLASSES],
    allocations: AtomicU64,
    reuses: AtomicU64,
    discards: AtomicU64,
}

fn class_for_request(min_capacity: usize) -> usize {
    CAPACITY_CLASSES
        .iter()
        .position(|class_capacity| *class_capacity >= min_capacity)
        .unwrap_or(NB_CLASSES - 1)
}

fn class_for_release(capacity: usize) -> usize {
    CAPACITY_CLASSES
        .iter()
        .rposition(|class_capacity| *class_capacity <= capacity)
        .unwrap_or(0)
}

impl BufferPool {
    pub const fn new() -> Self {
        Self {
            classes: [const { Mutex::new(Vec::new()) }; NB_CLASSES],
            allocations: AtomicU64::new(0),
            reuses: AtomicU64::new(0),
            discards: AtomicU64::new(0),
        }
    }

    /// Process-wide pool used by every emitter.
    pub fn global() -> &'static BufferPool {
        &GLOBAL_POOL
    }

    /// Leases an empty buffer with at least `min_capacity` bytes of capacity.
    pub fn acquire(&self, min_capacity: usize) -> PooledBuffer<'_> {
        let first_class = class_for_request(min_capacity);
        for class in &self.classes[first_class..] {
            let recycled = class
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop();
            if let Some(mut buffer) = recycled {
                self.reuses.fetch_add(1, Ordering::Relaxed);
                buffer.reserve(min_capacity);
                return PooledBuffer { buffer, pool: self };
            }
        }
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let capacity = CAPACITY_CLASSES[first_class].max(min_capacity);
        PooledBuffer {
            buffer: Vec::with_capacity(capacity),
            pool: self,
        }
    }

    fn release(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            self.discards.fetch_add(1, Ordering::Relaxed);
            return;
        }
        buffer.clear();
        let mut idle = self.classes[class_for_release(buffer.capacity())]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_PER_CLASS {
            idle.push(buffer);
        } else {
            drop(idle);
            self.discards.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            reuses: self.reuses.load(Ordering::Relaxed),
            discards: self.discards.load(Ordering::Relaxed),
            idle_buffers: self
                .classes
                .iter()
                .map(|class| class.lock().unwrap_or_else(PoisonError::into_inner).len())
                .sum(),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive lease on a pooled buffer, returned to its pool on drop.
pub struct PooledBuffer<'p> {
    buffer: Vec<u8>,
    pool: &'p BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
