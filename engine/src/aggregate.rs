// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use controller::Ratings;
use num_traits::float::Float;
use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
    ops::AddAssign,
};

/// Sum, item by item, the scores the neighbours gave to items the target
/// user hasn't rated yet.
///
/// Every neighbour contributes a single score per item, so callers must hand
/// over ratings already collapsed to one value per item.
pub fn accumulate_interest<'r, I, V, N>(rated: &HashSet<I>, neighbours: N) -> HashMap<I, V>
where
    I: Hash + Eq + Clone + 'r,
    V: Float + AddAssign + 'r,
    N: IntoIterator<Item = &'r Ratings<I, V>>,
{
    let mut interest = HashMap::new();
    for ratings in neighbours {
        for (item, score) in ratings {
            if rated.contains(item) {
                continue;
            }

            *interest.entry(item.clone()).or_insert_with(V::zero) += *score;
        }
    }

    interest
}
