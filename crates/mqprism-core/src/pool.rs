//! Process-global buffer pool and per-operation rental scope.
//!
//! Converting one carrier message can need several short-lived buffers
//! (unescaped string payloads). `BufferPool` recycles that storage
//! across operations; `PoolScope` bounds each rental to a single
//! conversion and optionally zeroes storage on return. A `PooledBuf`
//! borrows its scope, so no rented buffer can outlive the conversion.

use std::ops::Deref;
use std::sync::Mutex;

use bytes::BytesMut;

/// Buffers above this capacity are dropped instead of recycled.
const MAX_POOLED_CAPACITY: usize = 1 << 20;

/// Upper bound on idle buffers kept on the shelf.
const MAX_POOLED_BUFFERS: usize = 32;

/// Thread-safe shelf of recycled byte buffers.
pub struct BufferPool {
    shelf: Mutex<Vec<BytesMut>>,
}

impl BufferPool {
    pub const fn new() -> Self {
        BufferPool {
            shelf: Mutex::new(Vec::new()),
        }
    }

    /// The process-wide pool shared by all conversions.
    pub fn global() -> &'static BufferPool {
        static POOL: BufferPool = BufferPool::new();
        &POOL
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BytesMut>> {
        match self.shelf.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn rent(&self, min_capacity: usize) -> BytesMut {
        let mut shelf = self.lock();
        if let Some(pos) = shelf.iter().position(|b| b.capacity() >= min_capacity) {
            return shelf.swap_remove(pos);
        }
        drop(shelf);
        BytesMut::with_capacity(min_capacity)
    }

    fn give_back(&self, mut buf: BytesMut, zero: bool) {
        if zero {
            buf.iter_mut().for_each(|b| *b = 0);
        }
        buf.clear();
        if buf.capacity() == 0 || buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        let mut shelf = self.lock();
        if shelf.len() < MAX_POOLED_BUFFERS {
            shelf.push(buf);
        }
    }

    /// Number of idle buffers currently shelved.
    pub fn idle_buffers(&self) -> usize {
        self.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        BufferPool::new()
    }
}

/// Rental scope for one deserialization operation.
pub struct PoolScope {
    pool: &'static BufferPool,
    clean_on_return: bool,
}

impl PoolScope {
    /// Open a scope on the global pool. `clean_on_return` zeroes each
    /// buffer before it goes back on the shelf.
    pub fn new(clean_on_return: bool) -> Self {
        PoolScope::with_pool(BufferPool::global(), clean_on_return)
    }

    /// Open a scope on a specific pool.
    pub fn with_pool(pool: &'static BufferPool, clean_on_return: bool) -> Self {
        PoolScope {
            pool,
            clean_on_return,
        }
    }

    /// Rent a buffer with at least `min_capacity` bytes of storage.
    /// The buffer returns to the pool when dropped, which the borrow
    /// forces to happen before the scope itself goes away.
    pub fn rent(&self, min_capacity: usize) -> PooledBuf<'_> {
        PooledBuf {
            scope: self,
            buf: Some(self.pool.rent(min_capacity)),
        }
    }
}

/// A buffer rented from a `PoolScope`.
pub struct PooledBuf<'s> {
    scope: &'s PoolScope,
    buf: Option<BytesMut>,
}

impl PooledBuf<'_> {
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        if let Some(buf) = self.buf.as_mut() {
            buf.extend_from_slice(bytes);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.as_ref().map_or(0, |b| b.len())
    }

    pub fn capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, |b| b.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Deref for PooledBuf<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.scope.pool.give_back(buf, self.scope.clean_on_return);
        }
    }
}
