//! Indexed min-priority queue with decrease-key
//!
//! Backs the shortest-path solver: vertex indices are the items, tentative
//! distances the keys. The heap is 1-based; `pos` maps each index to its heap
//! slot so a key can be decreased in O(log n).
//!
//! This is an internal structure with assert-level contracts: inserting a
//! contained index, or decreasing an absent one, is a programming error.

pub(crate) struct IndexMinPq {
    n: usize,
    heap: Vec<usize>,
    pos: Vec<usize>,
    keys: Vec<f64>,
}

const ABSENT: usize = usize::MAX;

impl IndexMinPq {
    /// Queue over indices `0..capacity`.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            n: 0,
            heap: vec![0; capacity + 1],
            pos: vec![ABSENT; capacity],
            keys: vec![0.0; capacity],
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        self.pos[index] != ABSENT
    }

    pub(crate) fn insert(&mut self, index: usize, key: f64) {
        debug_assert!(!self.contains(index), "index {index} already queued");
        self.n += 1;
        self.pos[index] = self.n;
        self.heap[self.n] = index;
        self.keys[index] = key;
        self.swim(self.n);
    }

    /// Lower the key of a queued index.
    pub(crate) fn decrease_key(&mut self, index: usize, key: f64) {
        debug_assert!(self.contains(index), "index {index} not queued");
        debug_assert!(key <= self.keys[index]);
        self.keys[index] = key;
        self.swim(self.pos[index]);
    }

    /// Remove and return the index with the smallest key.
    ///
    /// # Panics
    /// Panics if the queue is empty.
    pub(crate) fn del_min(&mut self) -> usize {
        assert!(self.n > 0, "del_min on empty queue");
        let min = self.heap[1];
        self.swap(1, self.n);
        self.n -= 1;
        self.sink(1);
        self.pos[min] = ABSENT;
        min
    }

    fn swim(&mut self, mut k: usize) {
        while k > 1 && self.greater(k / 2, k) {
            self.swap(k / 2, k);
            k /= 2;
        }
    }

    fn sink(&mut self, mut k: usize) {
        while 2 * k <= self.n {
            let mut child = 2 * k;
            if child < self.n && self.greater(child, child + 1) {
                child += 1;
            }
            if !self.greater(k, child) {
                break;
            }
            self.swap(k, child);
            k = child;
        }
    }

    fn greater(&self, i: usize, j: usize) -> bool {
        self.keys[self.heap[i]] > self.keys[self.heap[j]]
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.pos[self.heap[i]] = i;
        self.pos[self.heap[j]] = j;
    }
}
