//! Randomized quicksort projected onto one dimension of a K-D key
//!
//! Used by the spatial index to order each candidate subrange on the current
//! split dimension during construction. The slice is shuffled before the
//! first partition, giving expected O(n log n) regardless of input order.
//! Stateless and reentrant.

use crate::key::KdComparable;
use rand::Rng;

/// Sort the slice in place by `dimension`.
pub fn sort<T: KdComparable>(a: &mut [T], dimension: usize) {
    if a.len() < 2 {
        return;
    }
    shuffle(a);
    sort_recursive(a, 0, a.len() - 1, dimension);
}

// Quicksort of the inclusive subrange a[lo..=hi].
fn sort_recursive<T: KdComparable>(a: &mut [T], lo: usize, hi: usize, dimension: usize) {
    if hi <= lo {
        return;
    }
    let j = partition(a, lo, hi, dimension);
    if j > lo {
        sort_recursive(a, lo, j - 1, dimension);
    }
    sort_recursive(a, j + 1, hi, dimension);
}

// Hoare partition with a[lo] as pivot: afterwards a[lo..j] <= a[j] <= a[j+1..=hi].
fn partition<T: KdComparable>(a: &mut [T], lo: usize, hi: usize, dimension: usize) -> usize {
    let mut i = lo;
    let mut j = hi + 1;

    loop {
        // Scan right for an item to swap; a[lo] acts as sentinel.
        loop {
            i += 1;
            if !less(&a[i], &a[lo], dimension) || i == hi {
                break;
            }
        }

        // Scan left for an item to swap.
        loop {
            j -= 1;
            if !less(&a[lo], &a[j], dimension) || j == lo {
                break;
            }
        }

        if i >= j {
            break;
        }
        a.swap(i, j);
    }

    a.swap(lo, j);
    j
}

#[inline]
fn less<T: KdComparable>(v: &T, w: &T, dimension: usize) -> bool {
    v.compare_in_dimension(w, dimension).is_lt()
}

/// Fisher–Yates shuffle with a uniform RNG.
fn shuffle<T>(a: &mut [T]) {
    let mut rng = rand::rng();
    for i in 0..a.len() {
        let r = rng.random_range(i..a.len());
        a.swap(i, r);
    }
}

/// Whether the slice is nondecreasing in `dimension`. Used for verification.
pub fn is_sorted<T: KdComparable>(a: &[T], dimension: usize) -> bool {
    a.windows(2).all(|w| !less(&w[1], &w[0], dimension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct TestKey {
        x: f64,
        y: f64,
    }

    impl KdComparable for TestKey {
        const DIMENSIONS: usize = 2;

        fn dimension_value(&self, dimension: usize) -> f64 {
            match dimension {
                0 => self.x,
                1 => self.y,
                _ => panic!("invalid dimension: {dimension}"),
            }
        }

        fn compare_in_dimension(&self, other: &Self, dimension: usize) -> Ordering {
            self.dimension_value(dimension)
                .total_cmp(&other.dimension_value(dimension))
        }
    }

    fn keys(values: &[(f64, f64)]) -> Vec<TestKey> {
        values.iter().map(|&(x, y)| TestKey { x, y }).collect()
    }

    #[test]
    fn sorts_on_requested_dimension_only() {
        let mut a = keys(&[(3.0, 1.0), (1.0, 3.0), (2.0, 2.0)]);
        sort(&mut a, 0);
        assert!(is_sorted(&a, 0));
        assert_eq!(a[0].x, 1.0);
        assert_eq!(a[2].x, 3.0);

        let mut b = keys(&[(3.0, 1.0), (1.0, 3.0), (2.0, 2.0)]);
        sort(&mut b, 1);
        assert!(is_sorted(&b, 1));
        assert_eq!(b[0].y, 1.0);
        assert_eq!(b[2].y, 3.0);
    }

    #[test]
    fn handles_trivial_and_duplicate_slices() {
        let mut empty: Vec<TestKey> = Vec::new();
        sort(&mut empty, 0);
        assert!(is_sorted(&empty, 0));

        let mut single = keys(&[(1.0, 1.0)]);
        sort(&mut single, 0);
        assert!(is_sorted(&single, 0));

        let mut dups = keys(&[(2.0, 0.0), (2.0, 1.0), (2.0, 2.0), (1.0, 3.0)]);
        sort(&mut dups, 0);
        assert!(is_sorted(&dups, 0));
        assert_eq!(dups[0].x, 1.0);
    }

    #[test]
    fn sorts_larger_reversed_input() {
        let mut a: Vec<TestKey> = (0..500)
            .rev()
            .map(|i| TestKey {
                x: i as f64,
                y: -(i as f64),
            })
            .collect();
        assert!(!is_sorted(&a, 0));
        sort(&mut a, 0);
        assert!(is_sorted(&a, 0));
        assert_eq!(a[0].x, 0.0);
        assert_eq!(a[499].x, 499.0);
    }

    #[test]
    fn subrange_sort_leaves_rest_untouched() {
        let mut a = keys(&[(9.0, 0.0), (5.0, 0.0), (4.0, 0.0), (3.0, 0.0), (0.0, 0.0)]);
        sort(&mut a[1..4], 0);
        assert_eq!(a[0].x, 9.0);
        assert_eq!(a[4].x, 0.0);
        assert!(is_sorted(&a[1..4], 0));
    }
}
