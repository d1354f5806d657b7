//! FIFO ring buffer, used by the preprocessor to hold the clauses that
//! still have to be checked for subsumption.

use {crate::clause::CRef, std::fmt};

/// Growable ring buffer.
///
/// One slot is always free: `start == end` means empty, and the buffer
/// grows by half as soon as an insertion makes it full.
#[derive(Clone)]
pub struct Queue<T: Copy + Default> {
    buf: Vec<T>,
    start: usize,
    end: usize,
}

pub type ClauseQueue = Queue<CRef>;

impl<T: Copy + Default> Queue<T> {
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Queue {
            buf: vec![T::default(); cap.max(1)],
            start: 0,
            end: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.end < self.start {
            self.buf.len() - self.start + self.end
        } else {
            self.end - self.start
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Append `x` at the back of the queue.
    pub fn insert(&mut self, x: T) {
        self.buf[self.end] = x;
        self.end = (self.end + 1) % self.buf.len();

        if self.end == self.start {
            let old_len = self.buf.len();
            let mut buf = Vec::with_capacity((old_len * 3 + 1) >> 1);
            buf.extend_from_slice(&self.buf[self.start..]);
            buf.extend_from_slice(&self.buf[..self.end]);
            debug_assert_eq!(buf.len(), old_len);
            buf.resize((old_len * 3 + 1) >> 1, T::default());
            self.buf = buf;
            self.start = 0;
            self.end = old_len;
        }
    }

    /// First element. Panics if the queue is empty.
    pub fn front(&self) -> T {
        assert!(!self.is_empty(), "front of an empty queue");
        self.buf[self.start]
    }

    /// Remove and return the first element. Panics if the queue is empty.
    pub fn pop(&mut self) -> T {
        let x = self.front();
        self.buf[self.start] = T::default();
        self.start = (self.start + 1) % self.buf.len();
        x
    }

    /// The `i`-th element from the front. Panics if out of range.
    pub fn get(&self, i: usize) -> T {
        assert!(i < self.len(), "queue index {} out of range", i);
        self.buf[(self.start + i) % self.buf.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Keep the elements for which `f` returns `Some`, replaced by the
    /// returned value, in the same order.
    pub fn retain_map<F>(&mut self, mut f: F)
    where
        F: FnMut(T) -> Option<T>,
    {
        let kept: Vec<T> = self.iter().filter_map(|x| f(x)).collect();
        self.clear();
        for x in kept {
            self.insert(x);
        }
    }

    /// Remove every element. Vacated slots are reset to the default value.
    pub fn clear(&mut self) {
        for x in self.buf.iter_mut() {
            *x = T::default();
        }
        self.buf.truncate(1);
        self.start = 0;
        self.end = 0;
    }
}

impl<T: Copy + Default> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default + fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fifo_order_and_growth() {
        let mut q: Queue<u32> = Queue::new();
        assert!(q.is_empty());
        for i in 1..=10 {
            q.insert(i);
            assert_eq!(q.len(), i as usize);
        }
        assert_eq!(q.front(), 1);
        assert_eq!(q.get(9), 10);
        let all: Vec<u32> = q.iter().collect();
        assert_eq!(all, (1..=10).collect::<Vec<_>>());
        for i in 1..=10 {
            assert_eq!(q.pop(), i);
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_wraparound() {
        let mut q: Queue<u32> = Queue::with_capacity(4);
        q.insert(1);
        q.insert(2);
        q.insert(3);
        assert_eq!(q.pop(), 1);
        assert_eq!(q.pop(), 2);
        // these wrap around the end of the buffer
        q.insert(4);
        q.insert(5);
        assert_eq!(q.len(), 3);
        assert_eq!(q.get(0), 3);
        assert_eq!(q.get(2), 5);
        // full again: grows, keeping the order
        q.insert(6);
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_retain_map_and_clear() {
        let mut q: Queue<u32> = Queue::new();
        for i in 0..6 {
            q.insert(i);
        }
        q.retain_map(|x| if x % 2 == 0 { Some(x * 10) } else { None });
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![0, 20, 40]);
        q.clear();
        assert_eq!(q.len(), 0);
        q.insert(7);
        assert_eq!(q.pop(), 7);
    }

    #[test]
    #[should_panic]
    fn test_pop_empty() {
        let mut q: Queue<CRef> = Queue::new();
        q.pop();
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_range() {
        let mut q: Queue<u32> = Queue::new();
        q.insert(1);
        q.get(1);
    }
}
