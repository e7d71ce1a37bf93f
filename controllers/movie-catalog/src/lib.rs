// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

#[macro_use]
extern crate diesel;

pub mod models;
pub mod schema;

use crate::models::{movies::Movie, similarities::MovieSimilarity, users::User};
use crate::schema::{movies, ratings, users};
use anyhow::Error;
use controller::{
    edges, eid, error::ErrorKind, maped_items, rated_items, ratings::collapse_max, Controller,
    SearchBy,
};
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::collections::HashMap;

pub fn establish_connection(url: &str) -> Result<PgConnection, Error> {
    Ok(PgConnection::establish(&url)?)
}

/// Postgres backed catalog
pub struct MovieCatalogController {
    pg_conn: PgConnection,
}

impl MovieCatalogController {
    /// Connect using `DATABASE_URL`, read from the environment or a `.env` file
    pub fn new() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let url = dotenv::var("DATABASE_URL")?;
        Self::with_url(&url)
    }

    pub fn with_url(url: &str) -> Result<Self, Error> {
        let pg_conn = establish_connection(url)?;
        Ok(Self { pg_conn })
    }

    fn ensure_user(&self, id: i32) -> Result<(), Error> {
        self.user_by_id(&id).map(|_| ())
    }
}

impl Controller for MovieCatalogController {
    type User = User;
    type Item = Movie;

    fn user_by_id(&self, id: &eid!(Self::User)) -> Result<Self::User, Error> {
        users::table
            .find(*id)
            .first::<User>(&self.pg_conn)
            .optional()?
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()).into())
    }

    fn users_by(&self, by: &SearchBy) -> Result<Vec<Self::User>, Error> {
        let users = match by {
            SearchBy::Id(id) => {
                let id: i32 = SearchBy::parse_id(id)?;
                users::table
                    .filter(users::id.eq(id))
                    .load::<User>(&self.pg_conn)?
            }

            SearchBy::Name(name) => users::table
                .filter(users::name.eq(name))
                .load::<User>(&self.pg_conn)?,

            SearchBy::Custom(k, v) if k == "email" => users::table
                .filter(users::email.eq(v))
                .load::<User>(&self.pg_conn)?,

            SearchBy::Custom(..) => Vec::new(),
        };

        if users.is_empty() {
            Err(by.not_found().into())
        } else {
            Ok(users)
        }
    }

    fn item_by_id(&self, id: &eid!(Self::Item)) -> Result<Self::Item, Error> {
        movies::table
            .find(*id)
            .first::<Movie>(&self.pg_conn)
            .optional()?
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()).into())
    }

    fn items_by(&self, by: &SearchBy) -> Result<Vec<Self::Item>, Error> {
        let movies = match by {
            SearchBy::Id(id) => {
                let id: i32 = SearchBy::parse_id(id)?;
                movies::table
                    .filter(movies::id.eq(id))
                    .load::<Movie>(&self.pg_conn)?
            }

            SearchBy::Name(name) => movies::table
                .filter(movies::name.eq(name))
                .load::<Movie>(&self.pg_conn)?,

            SearchBy::Custom(k, v) if k == "imdb_id" => {
                let imdb_id: i32 = v.parse()?;
                movies::table
                    .filter(movies::imdb_id.eq(imdb_id))
                    .load::<Movie>(&self.pg_conn)?
            }

            SearchBy::Custom(..) => Vec::new(),
        };

        if movies.is_empty() {
            Err(by.not_found().into())
        } else {
            Ok(movies)
        }
    }

    fn user_ids_except(&self, id: &eid!(Self::User)) -> Result<Vec<eid!(Self::User)>, Error> {
        let ids = users::table
            .select(users::id)
            .filter(users::id.ne(*id))
            .order(users::id)
            .load::<i32>(&self.pg_conn)?;

        Ok(ids)
    }

    fn user_ids_offset_limit(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<eid!(Self::User)>, Error> {
        let ids = users::table
            .select(users::id)
            .order(users::id)
            .limit(limit as i64)
            .offset(offset as i64)
            .load::<i32>(&self.pg_conn)?;

        Ok(ids)
    }

    fn rated_items(
        &self,
        user_id: &eid!(Self::User),
    ) -> Result<rated_items!(Self::Item), Error> {
        self.ensure_user(*user_id)?;

        let rated = ratings::table
            .filter(ratings::user_id.eq(*user_id))
            .select(ratings::movie_id)
            .load::<i32>(&self.pg_conn)?
            .into_iter()
            .collect();

        Ok(rated)
    }

    #[allow(clippy::type_complexity)]
    fn users_rated_items(
        &self,
        user_ids: &[eid!(Self::User)],
    ) -> Result<maped_items!(Self::User => Self::Item), Error> {
        let mut maped_items: maped_items!(Self::User => Self::Item) = user_ids
            .iter()
            .map(|id| (*id, Default::default()))
            .collect();

        let pairs = ratings::table
            .filter(ratings::user_id.eq_any(user_ids.to_vec()))
            .select((ratings::user_id, ratings::movie_id))
            .load::<(i32, i32)>(&self.pg_conn)?;

        log::debug!("Loaded {} ratings of {} users", pairs.len(), user_ids.len());
        for (user_id, movie_id) in pairs {
            maped_items
                .entry(user_id)
                .or_insert_with(Default::default)
                .insert(movie_id);
        }

        Ok(maped_items)
    }

    fn rating_value(
        &self,
        user_id: &eid!(Self::User),
        item_id: &eid!(Self::Item),
    ) -> Result<Option<f64>, Error> {
        self.ensure_user(*user_id)?;

        let score = ratings::table
            .filter(ratings::user_id.eq(*user_id))
            .filter(ratings::movie_id.eq(*item_id))
            .select(max(ratings::score))
            .first::<Option<f64>>(&self.pg_conn)?;

        Ok(score)
    }

    fn user_ratings(
        &self,
        user_id: &eid!(Self::User),
    ) -> Result<controller::ratings!(Self::Item), Error> {
        self.ensure_user(*user_id)?;

        let rows = ratings::table
            .filter(ratings::user_id.eq(*user_id))
            .select((ratings::movie_id, ratings::score))
            .load::<(i32, f64)>(&self.pg_conn)?;

        Ok(collapse_max(rows))
    }

    fn item_ratings(
        &self,
        item_id: &eid!(Self::Item),
    ) -> Result<controller::ratings!(Self::User), Error> {
        self.item_by_id(item_id)?;

        let rows = ratings::table
            .filter(ratings::movie_id.eq(*item_id))
            .select((ratings::user_id, ratings::score))
            .load::<(i32, f64)>(&self.pg_conn)?;

        Ok(collapse_max(rows))
    }

    fn items_raters_count(&self) -> Result<HashMap<eid!(Self::Item), usize>, Error> {
        let pairs = ratings::table
            .select((ratings::movie_id, ratings::user_id))
            .distinct()
            .load::<(i32, i32)>(&self.pg_conn)?;

        let mut counts = HashMap::new();
        for (movie_id, _) in pairs {
            *counts.entry(movie_id).or_insert(0) += 1;
        }

        Ok(counts)
    }

    fn similarity_edges(&self, item_id: &eid!(Self::Item)) -> Result<edges!(Self::Item), Error> {
        let movie = self.item_by_id(item_id)?;

        let edges = MovieSimilarity::belonging_to(&movie)
            .load::<MovieSimilarity>(&self.pg_conn)?
            .into_iter()
            .map(|edge| (edge.target_id, edge.similarity))
            .collect();

        Ok(edges)
    }
}
