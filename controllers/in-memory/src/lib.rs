// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod load;
pub mod models;

use crate::models::{
    movies::Movie,
    ratings::{Rating, Similarity},
    users::User,
};
use controller::{
    edges, eid,
    error::ErrorKind,
    rated_items, ratings,
    ratings::{collapse_max, max_score},
    Controller, Result, SearchBy,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A catalog living in memory, useful as a fixture and to work offline with
/// csv dumps of the database.
///
/// Duplicated ratings for the same (user, movie) are kept as they are, reads
/// collapse them to the highest score like the postgres controller does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryController {
    users: BTreeMap<i32, User>,
    movies: BTreeMap<i32, Movie>,
    ratings: BTreeMap<i32, Vec<Rating>>,
    edges: HashMap<i32, Vec<Similarity>>,
}

impl InMemoryController {
    pub fn new() -> Self {
        Default::default()
    }

    /// Build a catalog from (user, movie, score) triples, users and movies
    /// are created as they appear.
    pub fn from_ratings<R>(rows: R) -> Self
    where
        R: IntoIterator<Item = (i32, i32, f64)>,
    {
        let mut controller = Self::new();
        for (user_id, movie_id, score) in rows {
            controller.push_rating(Rating::new(user_id, movie_id, score));
        }

        controller
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating for an existing user and movie
    pub fn insert_rating(&mut self, rating: Rating) -> Result<()> {
        if !self.users.contains_key(&rating.user_id) {
            return Err(ErrorKind::NotFoundById(rating.user_id.to_string()).into());
        }

        if !self.movies.contains_key(&rating.movie_id) {
            return Err(ErrorKind::NotFoundById(rating.movie_id.to_string()).into());
        }

        self.push_rating(rating);
        Ok(())
    }

    /// Insert a directed similarity edge between two existing movies
    pub fn insert_similarity(
        &mut self,
        source_id: i32,
        target_id: i32,
        similarity: f64,
    ) -> Result<()> {
        for id in &[source_id, target_id] {
            if !self.movies.contains_key(id) {
                return Err(ErrorKind::NotFoundById(id.to_string()).into());
            }
        }

        self.edges.entry(source_id).or_default().push(Similarity {
            source_id,
            target_id,
            similarity,
        });

        Ok(())
    }

    pub(crate) fn push_rating(&mut self, rating: Rating) {
        self.users
            .entry(rating.user_id)
            .or_insert_with(|| User::anonymous(rating.user_id));

        self.movies
            .entry(rating.movie_id)
            .or_insert_with(|| Movie::anonymous(rating.movie_id));

        self.ratings.entry(rating.user_id).or_default().push(rating);
    }

    pub(crate) fn ensure_movie(&mut self, id: i32) {
        self.movies.entry(id).or_insert_with(|| Movie::anonymous(id));
    }

    fn ratings_of(&self, user_id: i32) -> Result<&[Rating]> {
        if !self.users.contains_key(&user_id) {
            return Err(ErrorKind::NotFoundById(user_id.to_string()).into());
        }

        Ok(self
            .ratings
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

impl Controller for InMemoryController {
    type User = User;
    type Item = Movie;

    fn user_by_id(&self, id: &eid!(Self::User)) -> Result<Self::User> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()).into())
    }

    fn users_by(&self, by: &SearchBy) -> Result<Vec<Self::User>> {
        let users: Vec<_> = match by {
            SearchBy::Id(id) => {
                let id: i32 = SearchBy::parse_id(id)?;
                self.users.get(&id).cloned().into_iter().collect()
            }

            SearchBy::Name(name) => self
                .users
                .values()
                .filter(|user| &user.name == name)
                .cloned()
                .collect(),

            SearchBy::Custom(..) => Vec::new(),
        };

        if users.is_empty() {
            Err(by.not_found().into())
        } else {
            Ok(users)
        }
    }

    fn item_by_id(&self, id: &eid!(Self::Item)) -> Result<Self::Item> {
        self.movies
            .get(id)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()).into())
    }

    fn items_by(&self, by: &SearchBy) -> Result<Vec<Self::Item>> {
        let movies: Vec<_> = match by {
            SearchBy::Id(id) => {
                let id: i32 = SearchBy::parse_id(id)?;
                self.movies.get(&id).cloned().into_iter().collect()
            }

            SearchBy::Name(name) => self
                .movies
                .values()
                .filter(|movie| &movie.name == name)
                .cloned()
                .collect(),

            SearchBy::Custom(key, val) if key == "imdb_id" => self
                .movies
                .values()
                .filter(|movie| movie.imdb_id.to_string() == *val)
                .cloned()
                .collect(),

            SearchBy::Custom(..) => Vec::new(),
        };

        if movies.is_empty() {
            Err(by.not_found().into())
        } else {
            Ok(movies)
        }
    }

    fn user_ids_except(&self, id: &eid!(Self::User)) -> Result<Vec<eid!(Self::User)>> {
        Ok(self.users.keys().filter(|other| *other != id).copied().collect())
    }

    fn user_ids_offset_limit(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<eid!(Self::User)>> {
        Ok(self.users.keys().skip(offset).take(limit).copied().collect())
    }

    fn rated_items(&self, user_id: &eid!(Self::User)) -> Result<rated_items!(Self::Item)> {
        let rated = self
            .ratings_of(*user_id)?
            .iter()
            .map(|rating| rating.movie_id)
            .collect();

        Ok(rated)
    }

    fn rating_value(
        &self,
        user_id: &eid!(Self::User),
        item_id: &eid!(Self::Item),
    ) -> Result<Option<f64>> {
        let score = self
            .ratings_of(*user_id)?
            .iter()
            .filter(|rating| rating.movie_id == *item_id)
            .map(|rating| rating.score)
            .fold(None, |acc: Option<f64>, score| {
                Some(acc.map_or(score, |acc| max_score(acc, score)))
            });

        Ok(score)
    }

    fn user_ratings(&self, user_id: &eid!(Self::User)) -> Result<ratings!(Self::Item)> {
        let rows = self
            .ratings_of(*user_id)?
            .iter()
            .map(|rating| (rating.movie_id, rating.score));

        Ok(collapse_max(rows))
    }

    fn item_ratings(&self, item_id: &eid!(Self::Item)) -> Result<ratings!(Self::User)> {
        if !self.movies.contains_key(item_id) {
            return Err(ErrorKind::NotFoundById(item_id.to_string()).into());
        }

        let rows = self
            .ratings
            .values()
            .flatten()
            .filter(|rating| rating.movie_id == *item_id)
            .map(|rating| (rating.user_id, rating.score));

        Ok(collapse_max(rows))
    }

    fn items_raters_count(&self) -> Result<HashMap<eid!(Self::Item), usize>> {
        let mut counts = HashMap::new();
        for ratings in self.ratings.values() {
            let rated: HashSet<_> = ratings.iter().map(|rating| rating.movie_id).collect();
            for movie_id in rated {
                *counts.entry(movie_id).or_insert(0) += 1;
            }
        }

        Ok(counts)
    }

    fn similarity_edges(&self, item_id: &eid!(Self::Item)) -> Result<edges!(Self::Item)> {
        let edges = self
            .edges
            .get(item_id)
            .map(|edges| {
                edges
                    .iter()
                    .map(|edge| (edge.target_id, edge.similarity))
                    .collect()
            })
            .unwrap_or_default();

        Ok(edges)
    }
}
