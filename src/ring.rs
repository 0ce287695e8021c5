//! Fixed-capacity double-ended ring queue.
//!
//! Elements live in one flat array; the queue itself may wrap around the end
//! of it. `begin` is the physical slot of the logical first element and `size`
//! counts the valid elements, so the element at logical offset `i` sits in
//! slot `(begin + i) % N`:
//!
//! ```text
//! N = 7, begin = 4, size = 5
//!
//!   [2]  [3]   .    .   [0]  [1]  [2]   <- logical offset
//!    0    1    2    3    4    5    6    <- physical slot
//! ```
//!
//! This layout makes both ends cheap: pushing to the back just moves `begin`
//! one slot left (wrapping to `N - 1` from zero) and nothing is ever shifted
//! except on positional [`RingQueue::remove`].

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue capacity reached")]
    CapacityExceeded,
    #[error("queue is empty")]
    Empty,
    #[error("value not present in the queue")]
    NotFound,
}

#[derive(Clone, Debug)]
pub struct RingQueue<const N: usize> {
    buf: [u32; N],
    begin: usize,
    size: usize,
}

impl<const N: usize> Default for RingQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingQueue<N> {
    pub fn new() -> Self {
        Self {
            buf: [0; N],
            begin: 0,
            size: 0,
        }
    }

    pub const fn len(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Value at logical offset `offset`. The offset must be within bounds.
    pub fn get(&self, offset: usize) -> u32 {
        assert!(offset < self.size, "offset {offset} out of bounds");
        self.buf[(self.begin + offset) % N]
    }

    /// Installs `value` as the new logical offset-0 element. Existing
    /// elements keep their slots; only `begin` moves.
    pub fn push_back(&mut self, value: u32) -> Result<(), QueueError> {
        if self.size == N {
            return Err(QueueError::CapacityExceeded);
        }
        self.begin = if self.begin == 0 { N - 1 } else { self.begin - 1 };
        self.buf[self.begin] = value;
        self.size += 1;
        Ok(())
    }

    /// Removes and returns the offset-0 element, i.e. the most recently
    /// pushed value (LIFO relative to [`RingQueue::push_back`]).
    pub fn pop_back(&mut self) -> Result<u32, QueueError> {
        if self.size == 0 {
            return Err(QueueError::Empty);
        }
        let value = self.buf[self.begin];
        self.begin = if self.begin == N - 1 { 0 } else { self.begin + 1 };
        self.size -= 1;
        Ok(value)
    }

    /// Removes and returns the element at the far end (offset `size - 1`),
    /// i.e. the oldest surviving pushed value (FIFO relative to
    /// [`RingQueue::push_back`]). `begin` does not move; the vacated slot
    /// keeps its stale value.
    pub fn pop_front(&mut self) -> Result<u32, QueueError> {
        if self.size == 0 {
            return Err(QueueError::Empty);
        }
        let value = self.get(self.size - 1);
        self.size -= 1;
        Ok(value)
    }

    /// Lowest logical offset holding `value`.
    pub fn find(&self, value: u32) -> Result<usize, QueueError> {
        (0..self.size)
            .find(|&i| self.get(i) == value)
            .ok_or(QueueError::NotFound)
    }

    /// Deletes the element at `offset`, shifting every element behind it one
    /// position forward. The offset must be within bounds; relative order of
    /// the remaining elements is preserved.
    pub fn remove(&mut self, offset: usize) {
        assert!(offset < self.size, "offset {offset} out of bounds");
        self.size -= 1;
        for i in offset..self.size {
            self.buf[(self.begin + i) % N] = self.buf[(self.begin + i + 1) % N];
        }
    }

    /// Zipper-merges `other` into `self`: merged offsets `2k` / `2k + 1` take
    /// self's / other's element at offset `k` until the shorter queue runs
    /// out, then the longer queue's tail is appended in order. On success
    /// `self` holds the merged sequence (unwrapped, `begin = 0`) and `other`
    /// is emptied; on `CapacityExceeded` both queues are untouched.
    pub fn merge_into(&mut self, other: &mut Self) -> Result<(), QueueError> {
        let total = self.size + other.size;
        if total > N {
            return Err(QueueError::CapacityExceeded);
        }
        let short = self.size.min(other.size);
        let mut merged = [0u32; N];
        for i in 0..short {
            merged[2 * i] = self.get(i);
            merged[2 * i + 1] = other.get(i);
        }
        let long = if self.size >= other.size { &*self } else { &*other };
        for i in short..long.size {
            merged[short + i] = long.get(i);
        }
        self.buf[..total].copy_from_slice(&merged[..total]);
        self.begin = 0;
        self.size = total;
        other.size = 0;
        Ok(())
    }

    /// Writes the logical sequence into `dest[..len]`. A wrapped queue is
    /// copied as two contiguous runs, `[begin, N)` then `[0, rest)`.
    pub fn copy_to(&self, dest: &mut [u32]) {
        assert!(dest.len() >= self.size, "destination too small");
        if self.begin + self.size <= N {
            dest[..self.size].copy_from_slice(&self.buf[self.begin..self.begin + self.size]);
            return;
        }
        let first = N - self.begin;
        let second = self.size - first;
        dest[..first].copy_from_slice(&self.buf[self.begin..]);
        dest[first..self.size].copy_from_slice(&self.buf[..second]);
    }

    pub fn iter(&self) -> RingQueueIterator<'_, N> {
        RingQueueIterator {
            queue: self,
            offset: 0,
        }
    }
}

pub struct RingQueueIterator<'a, const N: usize> {
    queue: &'a RingQueue<N>,
    offset: usize,
}

impl<const N: usize> Iterator for RingQueueIterator<'_, N> {
    type Item = u32;
    fn next(&mut self) -> Option<u32> {
        if self.offset >= self.queue.size {
            return None;
        }
        let value = self.queue.get(self.offset);
        self.offset += 1;
        Some(value)
    }
}
