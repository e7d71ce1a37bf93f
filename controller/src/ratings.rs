// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::Ratings;
use num_traits::float::Float;
use std::{collections::HashMap, hash::Hash};

/// The greatest of two scores, NaN wins over anything else like it does
/// for postgres `max`.
pub fn max_score<V: Float>(a: V, b: V) -> V {
    if a.is_nan() || b.is_nan() {
        V::nan()
    } else {
        a.max(b)
    }
}

/// Collapse raw (key, score) rows into one score per key.
///
/// Stores don't enforce the one-rating-per-(user, item) rule, whenever a key
/// shows up more than once the highest score is the one kept.
pub fn collapse_max<K, V, R>(rows: R) -> Ratings<K, V>
where
    K: Hash + Eq,
    V: Float,
    R: IntoIterator<Item = (K, V)>,
{
    let mut ratings = HashMap::new();
    for (key, score) in rows {
        ratings
            .entry(key)
            .and_modify(|curr: &mut V| *curr = max_score(*curr, score))
            .or_insert(score);
    }

    ratings
}

/// Mean of the scores rounded to one decimal, zero when there are none
pub fn rounded_mean<V: Float>(ratings: impl IntoIterator<Item = V>) -> V {
    let mut total = V::zero();
    let mut n = V::zero();

    for score in ratings {
        total = total + score;
        n = n + V::one();
    }

    if n == V::zero() {
        return V::zero();
    }

    let ten = V::from(10).unwrap_or_else(V::one);
    (total / n * ten).round() / ten
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn duplicated_keys_keep_maximum() {
        let rows = vec![(1, 2.0), (2, 4.5), (1, 3.5), (1, 1.0)];
        let ratings = collapse_max(rows);

        assert_eq!(ratings.len(), 2);
        assert_approx_eq!(ratings[&1], 3.5);
        assert_approx_eq!(ratings[&2], 4.5);
    }

    #[test]
    fn nan_survives_collapsing() {
        let rows = vec![(1, std::f64::NAN), (1, 4.0), (2, 1.0), (2, std::f64::NAN)];
        let ratings = collapse_max(rows);

        assert!(ratings[&1].is_nan());
        assert!(ratings[&2].is_nan());
        assert_approx_eq!(max_score(2.0, 3.0), 3.0);
    }

    #[test]
    fn mean_is_rounded() {
        assert_approx_eq!(rounded_mean(vec![3.0, 3.5, 3.0, 3.0]), 3.1);
        assert_approx_eq!(rounded_mean(vec![5.0]), 5.0);
        assert_approx_eq!(rounded_mean(Vec::<f64>::new()), 0.0);
    }
}
