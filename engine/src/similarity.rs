// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use controller::MapedItems;
use rayon::prelude::*;
use std::{collections::HashSet, hash::Hash};

/// Number of items present in both sets. Walks the shortest set, so an
/// empty one ends right away.
pub fn shared_count<I>(a: &HashSet<I>, b: &HashSet<I>) -> usize
where
    I: Hash + Eq,
{
    let (shortest, longest) = if a.len() > b.len() { (b, a) } else { (a, b) };

    shortest.iter().filter(|item| longest.contains(item)).count()
}

/// Shared count between `target` and every set of the map, in no particular
/// order.
pub fn shared_counts<U, I>(
    target: &HashSet<I>,
    maped_items: MapedItems<U, I>,
    parallel: bool,
) -> Vec<(U, usize)>
where
    U: Hash + Eq + Send,
    I: Hash + Eq + Send + Sync,
{
    if parallel {
        maped_items
            .into_par_iter()
            .map(|(user_id, items)| (user_id, shared_count(target, &items)))
            .collect()
    } else {
        maped_items
            .into_iter()
            .map(|(user_id, items)| (user_id, shared_count(target, &items)))
            .collect()
    }
}
