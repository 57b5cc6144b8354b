//! In-memory sorting of one run's worth of lines.
//!
//! A run that fits the configured chunk size is sorted entirely in memory.
//! Large slices go through rayon's parallel unstable sort; below the
//! parallel threshold (or with a single worker thread) a hand-rolled
//! introsort runs instead: median-of-three quicksort, insertion sort for
//! sub-slices of at most [`INSERTION_SORT_THRESHOLD`] elements, and a
//! heapsort fallback once the recursion depth exceeds `2 * log2(n)`.
//!
//! Stability is not required: the comparator decides ties identically
//! regardless of input order, so any deterministic unstable sort yields the
//! same output.

use rayon::prelude::*;

/// Sub-slices at or below this length are insertion-sorted.
pub const INSERTION_SORT_THRESHOLD: usize = 32;

/// Slices shorter than this are not worth parallelizing.
const PARALLEL_THRESHOLD: usize = 10_000;

/// Sort `items` in place into non-decreasing order.
///
/// With `parallel` set and a large enough slice, sorting is distributed over
/// the rayon thread pool; otherwise the sequential introsort runs.
pub fn sort_lines<T: Ord + Send>(items: &mut [T], parallel: bool) {
    if parallel && items.len() >= PARALLEL_THRESHOLD {
        items.par_sort_unstable();
    } else {
        introsort(items);
    }
}

fn introsort<T: Ord>(v: &mut [T]) {
    if v.len() <= 1 {
        return;
    }
    let depth_limit = 2 * (usize::BITS - v.len().leading_zeros()) as usize;
    sort_recursive(v, depth_limit);
}

fn sort_recursive<T: Ord>(mut v: &mut [T], mut depth: usize) {
    while v.len() > INSERTION_SORT_THRESHOLD {
        if depth == 0 {
            heapsort(v);
            return;
        }
        depth -= 1;

        let pivot = partition(v);
        let (left, rest) = v.split_at_mut(pivot);
        let right = &mut rest[1..];

        // Recurse into the smaller half, iterate on the larger, keeping the
        // stack depth at O(log n).
        if left.len() < right.len() {
            sort_recursive(left, depth);
            v = right;
        } else {
            sort_recursive(right, depth);
            v = left;
        }
    }
    insertion_sort(v);
}

/// Lomuto partition around a median-of-three pivot.
///
/// Returns the final pivot index; everything left of it is `< pivot` and
/// everything right of it is `>= pivot`.
fn partition<T: Ord>(v: &mut [T]) -> usize {
    let len = v.len();
    let mid = len / 2;

    if v[mid] < v[0] {
        v.swap(mid, 0);
    }
    if v[len - 1] < v[0] {
        v.swap(len - 1, 0);
    }
    if v[len - 1] < v[mid] {
        v.swap(len - 1, mid);
    }
    v.swap(mid, len - 1);

    let mut store = 0;
    for i in 0..len - 1 {
        if v[i] < v[len - 1] {
            v.swap(i, store);
            store += 1;
        }
    }
    v.swap(store, len - 1);
    store
}

fn insertion_sort<T: Ord>(v: &mut [T]) {
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && v[j] < v[j - 1] {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn heapsort<T: Ord>(v: &mut [T]) {
    let n = v.len();
    for start in (0..n / 2).rev() {
        sift_down(v, start, n);
    }
    for end in (1..n).rev() {
        v.swap(0, end);
        sift_down(v, 0, end);
    }
}

fn sift_down<T: Ord>(v: &mut [T], mut root: usize, end: usize) {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return;
        }
        if child + 1 < end && v[child] < v[child + 1] {
            child += 1;
        }
        if v[root] >= v[child] {
            return;
        }
        v.swap(root, child);
        root = child;
    }
}
