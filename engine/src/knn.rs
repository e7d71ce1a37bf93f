// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

type MinHeap<T> = BinaryHeap<Reverse<T>>;

/// An entry of a ranking. The greatest entry is the best one: the highest
/// score, and the lowest id among equal scores.
#[derive(Debug, Clone)]
pub struct Ranked<Id, S>(pub Id, pub S);

impl<Id: Ord, S: PartialOrd> Ord for Ranked<Id, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1
            .partial_cmp(&other.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.0.cmp(&self.0))
    }
}

impl<Id: Ord, S: PartialOrd> PartialOrd for Ranked<Id, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Id: Ord, S: PartialOrd> PartialEq for Ranked<Id, S> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<Id: Ord, S: PartialOrd> Eq for Ranked<Id, S> {}

/// Keeps the k best entries seen so far, the worst of them sits on top of a
/// min heap so it can be replaced in O(log k).
pub struct TopK<Id, S> {
    k: usize,
    min_heap: MinHeap<Ranked<Id, S>>,
}

impl<Id: Ord, S: PartialOrd> TopK<Id, S> {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            min_heap: BinaryHeap::with_capacity(k),
        }
    }

    pub fn push(&mut self, id: Id, score: S) {
        if self.k == 0 {
            return;
        }

        let candidate = Ranked(id, score);
        if self.min_heap.len() < self.k {
            self.min_heap.push(Reverse(candidate));
            return;
        }

        let replaces_worst = match self.min_heap.peek() {
            Some(Reverse(worst)) => candidate > *worst,
            None => false,
        };

        if replaces_worst {
            self.min_heap.pop();
            self.min_heap.push(Reverse(candidate));
        }
    }

    pub fn len(&self) -> usize {
        self.min_heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min_heap.is_empty()
    }

    /// Best entry first
    pub fn into_vec(self) -> Vec<(Id, S)> {
        self.min_heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(Ranked(id, score))| (id, score))
            .collect()
    }
}

impl<Id: Ord, S: PartialOrd> Extend<(Id, S)> for TopK<Id, S> {
    fn extend<T: IntoIterator<Item = (Id, S)>>(&mut self, iter: T) {
        for (id, score) in iter {
            self.push(id, score);
        }
    }
}
