//! Fixed-Size Circular Buffer for Sample History
//!
//! ## Overview
//!
//! The node keeps its most recent probe samples in a ring whose size is
//! fixed at compile time through const generics. Memory use is known at
//! boot and never grows, which matters on a 264KB part that also buffers
//! serial lines.
//!
//! ## Behaviour
//!
//! - O(1) insertion; once full, each push overwrites the oldest entry
//! - `len()` counts live entries and saturates at `N`
//! - Iteration visits live entries oldest to newest
//!
//! ```text
//! CircularBuffer<T, 4> after 6 pushes (a..f):
//! ┌───┬───┬───┬───┐
//! │ e │ f │ c │ d │   ← physical slots
//! └───┴───┴───┴───┘
//!           ↑
//!           write_pos = 2 (oldest live entry)
//! logical order: c, d, e, f
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use aquanode_core::buffer::CircularBuffer;
//!
//! let mut history: CircularBuffer<u32, 3> = CircularBuffer::new();
//! for ts in [100, 200, 300, 400] {
//!     history.push(ts);
//! }
//!
//! assert_eq!(history.len(), 3);
//! assert_eq!(history.last(), Some(&400));
//! assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![200, 300, 400]);
//! ```

/// Fixed-size ring buffer that overwrites its oldest entry when full
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - slots `0..len` are `Some` until the first wrap, all slots after it
///
/// Not thread-safe; the node touches it from a single cooperative loop.
#[derive(Clone, Debug)]
pub struct CircularBuffer<T: Copy, const N: usize> {
    /// Storage; `None` marks a slot never written
    data: [Option<T>; N],

    /// Index of the next write, wraps to 0 at N
    write_pos: usize,

    /// Live entries, saturates at N
    len: usize,
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    /// Creates an empty buffer
    ///
    /// Const so a history can live in a `static` on targets without a heap.
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Appends an entry, overwriting the oldest one when full
    pub fn push(&mut self, item: T) {
        self.data[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently pushed entry
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx].as_ref()
    }

    /// Iterate over live entries from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Entry by logical index (0 = oldest, len-1 = newest)
    ///
    /// Before the first wrap logical and physical indices match. After it
    /// the oldest entry sits at `write_pos`:
    ///
    /// ```text
    /// physical: [D, E, A, B, C]  write_pos = 2
    /// logical:  [A, B, C, D, E]  logical[i] = physical[(2 + i) % 5]
    /// ```
    fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over circular buffer contents
pub struct CircularBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, T: Copy, const N: usize> ExactSizeIterator for CircularBufferIter<'a, T, N> {}

impl<T: Copy, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
