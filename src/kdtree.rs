//! Balanced multi-dimensional search tree for range queries
//!
//! The tree splits on dimension `depth % K::DIMENSIONS` at each level. The
//! bulk [`KdTree::build`] sorts every candidate subrange on its split
//! dimension and picks the entry closest to the arithmetic mean of that
//! dimension as the subtree root; on real-world coordinate data this pivots
//! near the spread's center, trading perfect balance for locality. The mean
//! is computed with compensated summation so large inputs do not lose
//! low-order bits.
//!
//! The tree is immutable after `build` returns: queries take `&self`, so
//! post-build readers run concurrently without locks. Builders publish their
//! progress through a [`ProgressHandle`].

use crate::key::KdComparable;
use crate::progress::ProgressHandle;
use crate::sort;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

struct Node<K, V> {
    key: K,
    value: V,
    left: Option<Box<Node<K, V>>>,
    right: Option<Box<Node<K, V>>>,
    subtree_size: usize,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
            subtree_size: 1,
        })
    }
}

fn size<K, V>(node: &Option<Box<Node<K, V>>>) -> usize {
    node.as_ref().map_or(0, |n| n.subtree_size)
}

// Key-value pair ordered by its key, so the sort utility can order
// subranges without separating keys from values.
struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K: KdComparable, V> KdComparable for Entry<K, V> {
    const DIMENSIONS: usize = K::DIMENSIONS;

    fn dimension_value(&self, dimension: usize) -> f64 {
        self.key.dimension_value(dimension)
    }

    fn compare_in_dimension(&self, other: &Self, dimension: usize) -> Ordering {
        self.key.compare_in_dimension(&other.key, dimension)
    }
}

/// Balanced K-D tree mapping [`KdComparable`] keys to values.
pub struct KdTree<K, V> {
    root: Option<Box<Node<K, V>>>,
    len: usize,
    max_depth: usize,
    progress: ProgressHandle,
}

impl<K, V> Default for KdTree<K, V> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            max_depth: 0,
            progress: ProgressHandle::new(),
        }
    }
}

impl<K: KdComparable, V> KdTree<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Deepest node depth observed so far. Auxiliary: the closest-to-mean
    /// pivot has no proven balance bound, so callers can watch this against
    /// node count.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Handle on the progress of the current/most recent `build`.
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Insert a single key. Duplicates (equal in the split dimension all the
    /// way down) go right. The production path builds in bulk; this exists
    /// for point-wise insertion and tests.
    pub fn put(&mut self, key: K, value: V) {
        let root = self.root.take();
        self.root = Some(Self::put_node(root, key, value, 0, &mut self.max_depth));
        self.len += 1;
    }

    fn put_node(
        node: Option<Box<Node<K, V>>>,
        key: K,
        value: V,
        depth: usize,
        max_depth: &mut usize,
    ) -> Box<Node<K, V>> {
        match node {
            None => {
                if depth > *max_depth {
                    *max_depth = depth;
                }
                Node::leaf(key, value)
            }
            Some(mut h) => {
                let dim = depth % K::DIMENSIONS;
                match key.compare_in_dimension(&h.key, dim) {
                    Ordering::Less => {
                        h.left = Some(Self::put_node(h.left.take(), key, value, depth + 1, max_depth));
                    }
                    // Equal keys go right.
                    Ordering::Greater | Ordering::Equal => {
                        h.right =
                            Some(Self::put_node(h.right.take(), key, value, depth + 1, max_depth));
                    }
                }
                h.subtree_size = 1 + size(&h.left) + size(&h.right);
                h
            }
        }
    }
}

impl<K: KdComparable + Clone, V: Clone> KdTree<K, V> {
    /// Replace the tree with a balanced tree over all entries of `map`.
    ///
    /// Safe on an empty map (the result is an empty tree). The caller must
    /// not query until this returns; completion is also signalled by the
    /// progress handle reaching 1.0.
    pub fn build(&mut self, map: HashMap<K, V>) {
        self.progress.reset();
        self.root = None;
        self.len = 0;
        self.max_depth = 0;

        let total = map.len();
        if total == 0 {
            self.progress.report(1.0);
            return;
        }

        let mut entries: Vec<Entry<K, V>> = map
            .into_iter()
            .map(|(key, value)| Entry { key, value })
            .collect();

        let mut built = 0usize;
        self.root = Self::build_range(
            &mut entries,
            0,
            total,
            &self.progress,
            &mut built,
            &mut self.max_depth,
        );
        self.len = total;
        self.progress.report(1.0);
    }

    fn build_range(
        entries: &mut [Entry<K, V>],
        depth: usize,
        total: usize,
        progress: &ProgressHandle,
        built: &mut usize,
        max_depth: &mut usize,
    ) -> Option<Box<Node<K, V>>> {
        if entries.is_empty() {
            return None;
        }
        if depth > *max_depth {
            *max_depth = depth;
        }

        let dim = depth % K::DIMENSIONS;
        sort::sort(entries, dim);
        let pivot = find_mean_index(entries, dim);

        *built += 1;
        progress.report(*built as f64 / total as f64);

        let (left_slice, rest) = entries.split_at_mut(pivot);
        let (mid, right_slice) = rest.split_at_mut(1);

        let left = Self::build_range(left_slice, depth + 1, total, progress, built, max_depth);
        let right = Self::build_range(right_slice, depth + 1, total, progress, built, max_depth);
        let subtree_size = 1 + size(&left) + size(&right);

        Some(Box::new(Node {
            key: mid[0].key.clone(),
            value: mid[0].value.clone(),
            left,
            right,
            subtree_size,
        }))
    }
}

impl<K: KdComparable, V: Clone + Eq + Hash> KdTree<K, V> {
    /// Every distinct value whose key lies within `[from, to]` on all
    /// dimensions simultaneously.
    pub fn get_range(&self, from: &K, to: &K) -> HashSet<V> {
        let mut out = HashSet::new();
        Self::range_node(&self.root, from, to, 0, &mut out);
        out
    }

    fn range_node(
        node: &Option<Box<Node<K, V>>>,
        from: &K,
        to: &K,
        depth: usize,
        out: &mut HashSet<V>,
    ) {
        let Some(h) = node else {
            return;
        };
        let dim = depth % K::DIMENSIONS;

        match range_class(&h.key, from, to, dim) {
            // Below the range in the split dimension: everything smaller can
            // be pruned, only the right child may intersect.
            Ordering::Less => Self::range_node(&h.right, from, to, depth + 1, out),
            Ordering::Greater => Self::range_node(&h.left, from, to, depth + 1, out),
            Ordering::Equal => {
                // The tree only bounds the split dimension per level, so a
                // node outside the range in some other dimension can still
                // have descendants inside: descend both children either way.
                let all_in_range = (0..K::DIMENSIONS)
                    .all(|d| range_class(&h.key, from, to, d) == Ordering::Equal);
                if all_in_range {
                    out.insert(h.value.clone());
                }
                Self::range_node(&h.left, from, to, depth + 1, out);
                Self::range_node(&h.right, from, to, depth + 1, out);
            }
        }
    }
}

// Less: key below `from`; Greater: key above `to`; Equal: within bounds.
fn range_class<K: KdComparable>(key: &K, from: &K, to: &K, dimension: usize) -> Ordering {
    if key.compare_in_dimension(from, dimension).is_lt() {
        Ordering::Less
    } else if key.compare_in_dimension(to, dimension).is_gt() {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

// Index of the entry whose value in `dimension` is closest to the arithmetic
// mean of the subrange; an entry matching the mean within epsilon
// short-circuits the scan. The slice must be non-empty.
fn find_mean_index<T: KdComparable>(entries: &[T], dimension: usize) -> usize {
    if entries.len() == 1 {
        return 0;
    }

    let mean = compensated_mean(entries, dimension);

    let first = entries[0].dimension_value(dimension);
    let last = entries[entries.len() - 1].dimension_value(dimension);
    // The subrange is sorted, so the spread bounds any distance to the mean.
    let mut nearest = last - first;
    let mut nearest_index = 0;

    for (i, entry) in entries.iter().enumerate() {
        let distance = (entry.dimension_value(dimension) - mean).abs();
        if distance < crate::key::EPSILON {
            return i;
        }
        if distance < nearest {
            nearest = distance;
            nearest_index = i;
        }
    }

    nearest_index
}

// Kahan summation: the smaller the magnitude spread, the less is lost.
fn compensated_mean<T: KdComparable>(entries: &[T], dimension: usize) -> f64 {
    let mut sum = 0.0;
    let mut carry = 0.0;
    for entry in entries {
        let value = entry.dimension_value(dimension) - carry;
        let total = sum + value;
        carry = (total - sum) - value;
        sum = total;
    }
    sum / entries.len() as f64
}
