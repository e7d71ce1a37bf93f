// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of movie-recommend.
//
// movie-recommend is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// movie-recommend is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with movie-recommend.  If not, see <http://www.gnu.org/licenses/>.

pub mod aggregate;
pub mod error;
pub mod knn;
pub mod similarity;

use crate::{
    aggregate::accumulate_interest, error::ErrorKind, knn::TopK, similarity::shared_counts,
};
use anyhow::Error;
use config::Config;
use controller::{eid, ratings::collapse_max, ratings::rounded_mean, Controller, Ratings};
use std::{collections::HashSet, fmt::Display, time::Instant};

/// User based collaborative filtering over a read only controller.
///
/// The engine keeps no state between calls, everything a computation needs
/// is fetched from the controller and passed along explicitly.
pub struct Engine<'a, C: Controller> {
    controller: &'a C,
    config: &'a Config,
}

fn ensure_finite<U, I>(user_id: &U, ratings: &Ratings<I>) -> Result<(), ErrorKind>
where
    U: Display,
    I: Display,
{
    match ratings.iter().find(|(_, score)| !score.is_finite()) {
        Some((item_id, _)) => Err(ErrorKind::NonFiniteScore(
            user_id.to_string(),
            item_id.to_string(),
        )),
        None => Ok(()),
    }
}

impl<'a, C: Controller> Engine<'a, C> {
    pub fn with_controller(controller: &'a C, config: &'a Config) -> Self {
        Self { controller, config }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// The k users sharing the most rated items with `user_id`, ordered by
    /// shared count (descending) and then by id (ascending).
    ///
    /// Users sharing nothing are still candidates, a user without ratings
    /// gets the first k users with a count of zero.
    pub fn similar_users(
        &self,
        user_id: &eid!(C::User),
        k: usize,
    ) -> Result<Vec<(eid!(C::User), usize)>, Error> {
        self.controller.user_by_id(user_id)?;

        let now = Instant::now();
        let rated = self.controller.rated_items(user_id)?;
        let parallel = self.config.engine.parallel;
        let mut knn = TopK::new(k);

        let chunk_size = self
            .config
            .engine
            .partial_users_chunk_size
            .filter(|size| *size > 0);

        if let Some(chunk_size) = chunk_size {
            for user_ids in self.controller.user_ids_by_chunks(chunk_size) {
                let user_ids: Vec<_> = user_ids?
                    .into_iter()
                    .filter(|other| other != user_id)
                    .collect();

                let maped_items = self.controller.users_rated_items(&user_ids)?;
                knn.extend(shared_counts(&rated, maped_items, parallel));
            }
        } else {
            let user_ids = self.controller.user_ids_except(user_id)?;
            let maped_items = self.controller.users_rated_items(&user_ids)?;
            knn.extend(shared_counts(&rated, maped_items, parallel));
        }

        let similar = knn.into_vec();
        log::info!(
            "Found {} similar users to user({}) in {:.3}s",
            similar.len(),
            user_id,
            now.elapsed().as_secs_f64()
        );

        Ok(similar)
    }

    /// The n items with the highest interest for `user_id`, the interest of
    /// an item being the sum of the scores the similar users gave it. Items
    /// already rated by `user_id` are never recommended.
    ///
    /// A similar user listed more than once only counts once.
    pub fn recommend(
        &self,
        user_id: &eid!(C::User),
        similar_users: &[(eid!(C::User), usize)],
        n: usize,
    ) -> Result<Vec<(eid!(C::Item), f64)>, Error> {
        self.controller.user_by_id(user_id)?;

        let now = Instant::now();
        let rated = self.controller.rated_items(user_id)?;

        let mut seen = HashSet::new();
        let mut neighbours = Vec::with_capacity(similar_users.len());
        for (other_id, _) in similar_users {
            if !seen.insert(other_id) {
                continue;
            }

            let ratings = self.controller.user_ratings(other_id)?;
            ensure_finite(other_id, &ratings)?;
            neighbours.push(ratings);
        }

        let interest = accumulate_interest(&rated, &neighbours);
        log::debug!(
            "{} candidate items from {} neighbours of user({})",
            interest.len(),
            neighbours.len(),
            user_id
        );

        let mut top = TopK::new(n);
        top.extend(interest);

        let recommended = top.into_vec();
        log::info!(
            "Recommended {} items to user({}) in {:.3}s",
            recommended.len(),
            user_id,
            now.elapsed().as_secs_f64()
        );

        Ok(recommended)
    }

    /// Similar users and then recommendations, sizes taken from the config
    pub fn recommend_for(
        &self,
        user_id: &eid!(C::User),
    ) -> Result<Vec<(eid!(C::Item), f64)>, Error> {
        let similar = self.similar_users(user_id, self.config.engine.similar_users)?;
        self.recommend(user_id, &similar, self.config.engine.recommendations)
    }

    /// The k targets of the precomputed edges leaving `item_id`, most similar
    /// first. Edges are directional, a -> b says nothing about b -> a.
    ///
    /// Self edges are skipped and repeated targets keep their highest score.
    pub fn similar_movies(
        &self,
        item_id: &eid!(C::Item),
        k: usize,
    ) -> Result<Vec<eid!(C::Item)>, Error> {
        self.controller.item_by_id(item_id)?;

        let edges = self
            .controller
            .similarity_edges(item_id)?
            .into_iter()
            .filter(|(target_id, _)| target_id != item_id);

        let edges = collapse_max(edges);
        if let Some((target_id, _)) = edges.iter().find(|(_, score)| !score.is_finite()) {
            return Err(
                ErrorKind::NonFiniteSimilarity(item_id.to_string(), target_id.to_string()).into(),
            );
        }

        let mut top = TopK::new(k);
        top.extend(edges);

        Ok(top.into_vec().into_iter().map(|(id, _)| id).collect())
    }

    /// The n items rated by the most users
    pub fn popular_movies(&self, n: usize) -> Result<Vec<(eid!(C::Item), usize)>, Error> {
        let mut top = TopK::new(n);
        top.extend(self.controller.items_raters_count()?);

        Ok(top.into_vec())
    }

    /// Mean score of an item rounded to one decimal, 0 when nobody rated it
    pub fn movie_score(&self, item_id: &eid!(C::Item)) -> Result<f64, Error> {
        let ratings = self.controller.item_ratings(item_id)?;
        Ok(rounded_mean(ratings.values().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use assert_approx_eq::assert_approx_eq;
    use config::EngineConfig;
    use controller::error::ErrorKind as ControllerError;
    use in_memory::{models::ratings::Rating, InMemoryController};

    const A: i32 = 1;
    const B: i32 = 2;
    const C: i32 = 3;
    const D: i32 = 4;

    // A{1,2,3}, B{1,2,4}, C{1,5}, D{6}
    fn scenario() -> InMemoryController {
        InMemoryController::from_ratings(vec![
            (A, 1, 4.0),
            (A, 2, 3.0),
            (A, 3, 5.0),
            (B, 1, 5.0),
            (B, 2, 2.0),
            (B, 4, 4.0),
            (C, 1, 3.0),
            (C, 5, 3.5),
            (D, 6, 5.0),
        ])
    }

    fn configs() -> Vec<Config> {
        let mut configs = Vec::new();
        for partial_users_chunk_size in &[None, Some(1), Some(3)] {
            for parallel in &[false, true] {
                configs.push(Config {
                    engine: EngineConfig {
                        partial_users_chunk_size: *partial_users_chunk_size,
                        parallel: *parallel,
                        ..Default::default()
                    },
                });
            }
        }

        configs
    }

    fn not_found(err: &Error) -> Option<&ControllerError> {
        err.downcast_ref::<ControllerError>()
    }

    #[test]
    fn similar_users_truncated_to_k() -> Result<(), Error> {
        let controller = scenario();

        for config in configs() {
            let engine = Engine::with_controller(&controller, &config);

            assert_eq!(engine.similar_users(&A, 2)?, vec![(B, 2), (C, 1)]);
            assert_eq!(engine.similar_users(&A, 4)?, vec![(B, 2), (C, 1), (D, 0)]);
            assert!(engine.similar_users(&A, 0)?.is_empty());
        }

        Ok(())
    }

    #[test]
    fn shared_counts_match_intersections() -> Result<(), Error> {
        let controller = scenario();
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let target = controller.rated_items(&B)?;
        let similar = engine.similar_users(&B, 10)?;

        assert_eq!(similar.len(), 3);
        for window in similar.windows(2) {
            assert!(window[0].1 >= window[1].1);
        }

        for (user_id, count) in similar {
            assert_ne!(user_id, B);
            let other = controller.rated_items(&user_id)?;
            assert_eq!(count, target.intersection(&other).count());
        }

        Ok(())
    }

    #[test]
    fn user_without_ratings_still_gets_neighbours() -> Result<(), Error> {
        let mut controller = scenario();
        controller.insert_user(in_memory::models::users::User::new(9, "Newcomer"));

        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let similar = engine.similar_users(&9, 3)?;
        assert_eq!(similar, vec![(A, 0), (B, 0), (C, 0)]);

        // Degrades to whatever the first users rated
        let recommended = engine.recommend(&9, &similar, 10)?;
        assert_eq!(recommended[0].0, 1);
        assert_approx_eq!(recommended[0].1, 12.0);

        Ok(())
    }

    #[test]
    fn unknown_user_is_not_found() {
        let controller = scenario();
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let err = engine.similar_users(&42, 5).unwrap_err();
        assert_eq!(
            not_found(&err),
            Some(&ControllerError::NotFoundById("42".into()))
        );

        let err = engine.recommend(&42, &[(A, 3)], 5).unwrap_err();
        assert!(not_found(&err).is_some());

        let err = engine.recommend(&A, &[(42, 3)], 5).unwrap_err();
        assert!(not_found(&err).is_some());
    }

    #[test]
    fn recommend_skips_rated_movies() -> Result<(), Error> {
        let controller = scenario();
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let similar = engine.similar_users(&A, 4)?;
        let recommended = engine.recommend(&A, &similar, 10)?;
        let rated = controller.rated_items(&A)?;

        assert_eq!(recommended, vec![(6, 5.0), (4, 4.0), (5, 3.5)]);
        for (movie_id, _) in recommended {
            assert!(!rated.contains(&movie_id));
        }

        Ok(())
    }

    #[test]
    fn interest_is_the_sum_of_scores() -> Result<(), Error> {
        let controller = InMemoryController::from_ratings(vec![
            (A, 1, 5.0),
            (B, 1, 5.0),
            (B, 7, 3.0),
            (C, 1, 4.0),
            (C, 7, 4.0),
            (C, 8, 6.5),
        ]);
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let recommended = engine.recommend(&A, &[(B, 1), (C, 1)], 10)?;

        // Liked by two neighbours beats loved by one
        assert_eq!(recommended[0].0, 7);
        assert_approx_eq!(recommended[0].1, 7.0);
        assert_eq!(recommended[1].0, 8);
        assert_approx_eq!(recommended[1].1, 6.5);

        Ok(())
    }

    #[test]
    fn recommend_truncates_and_tolerates_scarcity() -> Result<(), Error> {
        let controller = scenario();
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let similar = engine.similar_users(&A, 4)?;

        let recommended = engine.recommend(&A, &similar, 2)?;
        assert_eq!(recommended, vec![(6, 5.0), (4, 4.0)]);

        let recommended = engine.recommend(&A, &similar, 100)?;
        assert_eq!(recommended.len(), 3);

        assert!(engine.recommend(&A, &[], 10)?.is_empty());
        assert!(engine.recommend(&A, &similar, 0)?.is_empty());

        Ok(())
    }

    #[test]
    fn recommend_ties_break_by_movie_id() -> Result<(), Error> {
        let controller = InMemoryController::from_ratings(vec![
            (A, 1, 1.0),
            (B, 30, 2.0),
            (B, 20, 2.0),
            (C, 10, 2.0),
        ]);
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let recommended = engine.recommend(&A, &[(C, 0), (B, 0)], 10)?;
        assert_eq!(recommended, vec![(10, 2.0), (20, 2.0), (30, 2.0)]);

        Ok(())
    }

    #[test]
    fn duplicated_ratings_count_once_with_maximum() -> Result<(), Error> {
        let mut controller = InMemoryController::from_ratings(vec![(A, 1, 4.0), (B, 1, 3.0)]);
        controller.insert_rating(Rating::new(B, 1, 2.0))?;
        controller.insert_rating(Rating::new(B, 1, 4.5))?;
        controller.insert_user(in_memory::models::users::User::new(D, "D"));

        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let recommended = engine.recommend(&D, &[(B, 0)], 10)?;
        assert_eq!(recommended.len(), 1);
        assert_approx_eq!(recommended[0].1, 4.5);

        // The same neighbour listed twice doesn't double its scores
        let recommended = engine.recommend(&D, &[(B, 0), (B, 0)], 10)?;
        assert_approx_eq!(recommended[0].1, 4.5);

        Ok(())
    }

    #[test]
    fn non_finite_scores_are_rejected() {
        let controller =
            InMemoryController::from_ratings(vec![(A, 1, 4.0), (B, 2, std::f64::NAN)]);
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let err = engine.recommend(&A, &[(B, 0)], 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::NonFiniteScore("2".into(), "2".into()))
        );
    }

    #[test]
    fn non_finite_duplicates_are_not_hidden() -> Result<(), Error> {
        let mut controller = InMemoryController::from_ratings(vec![
            (A, 1, 4.0),
            (B, 2, std::f64::NAN),
            (B, 2, 4.0),
        ]);
        controller.insert_similarity(1, 2, std::f64::NAN)?;
        controller.insert_similarity(1, 2, 0.5)?;

        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let err = engine.recommend(&A, &[(B, 0)], 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::NonFiniteScore("2".into(), "2".into()))
        );

        let err = engine.similar_movies(&1, 5).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::NonFiniteSimilarity("1".into(), "2".into()))
        );

        Ok(())
    }

    #[test]
    fn recommend_for_uses_configured_sizes() -> Result<(), Error> {
        let controller = scenario();
        let config = Config {
            engine: EngineConfig {
                similar_users: 2,
                recommendations: 1,
                ..Default::default()
            },
        };
        let engine = Engine::with_controller(&controller, &config);

        // Only B and C are neighbours, D's movie 6 is out of reach
        assert_eq!(engine.recommend_for(&A)?, vec![(4, 4.0)]);

        Ok(())
    }

    #[test]
    fn similar_movies_follow_their_source() -> Result<(), Error> {
        let mut controller = scenario();
        controller.insert_similarity(1, 2, 0.4)?;
        controller.insert_similarity(1, 3, 0.9)?;
        controller.insert_similarity(1, 4, 0.4)?;
        controller.insert_similarity(1, 1, 1.0)?;
        controller.insert_similarity(1, 5, 0.1)?;
        controller.insert_similarity(1, 5, 0.7)?;
        controller.insert_similarity(2, 6, 0.99)?;

        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        assert_eq!(engine.similar_movies(&1, 5)?, vec![3, 5, 2, 4]);
        assert_eq!(engine.similar_movies(&1, 2)?, vec![3, 5]);
        assert_eq!(engine.similar_movies(&2, 5)?, vec![6]);

        // Edges are not mirrored
        assert!(engine.similar_movies(&6, 5)?.is_empty());

        let err = engine.similar_movies(&77, 5).unwrap_err();
        assert!(not_found(&err).is_some());

        Ok(())
    }

    #[test]
    fn popular_movies_by_raters() -> Result<(), Error> {
        let controller = scenario();
        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        let popular = engine.popular_movies(3)?;
        assert_eq!(popular, vec![(1, 3), (2, 2), (3, 1)]);

        Ok(())
    }

    #[test]
    fn movie_score_is_a_rounded_mean() -> Result<(), Error> {
        let mut controller = scenario();
        controller.insert_similarity(1, 2, 0.5)?;
        controller.insert_movie(in_memory::models::movies::Movie::new(99, "Unrated", 99));

        let config = Config::default();
        let engine = Engine::with_controller(&controller, &config);

        assert_approx_eq!(engine.movie_score(&1)?, 4.0);
        assert_approx_eq!(engine.movie_score(&2)?, 2.5);
        assert_approx_eq!(engine.movie_score(&99)?, 0.0);
        assert!(engine.movie_score(&100).is_err());

        Ok(())
    }
}
