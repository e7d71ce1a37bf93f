// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod entity;
pub mod error;
pub mod lazy;
pub mod ratings;
pub mod searchby;

#[macro_export]
macro_rules! eid {
    ($e:ty) => {
        <$e as $crate::entity::Entity>::Id
    };
}

#[macro_export]
macro_rules! ratings {
    ($e:ty) => {
        $crate::Ratings<$crate::eid!($e)>
    }
}

#[macro_export]
macro_rules! rated_items {
    ($e:ty) => {
        $crate::RatedItems<$crate::eid!($e)>
    }
}

#[macro_export]
macro_rules! maped_items {
    ($u:ty => $v:ty) => {
        $crate::MapedItems<$crate::eid!($u), $crate::eid!($v)>
    };
}

#[macro_export]
macro_rules! edges {
    ($e:ty) => {
        $crate::Edges<$crate::eid!($e)>
    }
}

use anyhow::Error;
use std::collections::{HashMap, HashSet};

pub use entity::{Entity, ToTable};
pub use lazy::LazyUserChunks;
pub use searchby::SearchBy;

pub type Result<T> = std::result::Result<T, Error>;
pub type Ratings<I, Value = f64> = HashMap<I, Value>;
pub type RatedItems<I> = HashSet<I>;
pub type MapedItems<K, I> = HashMap<K, RatedItems<I>>;
pub type Edges<I, Value = f64> = Vec<(I, Value)>;

/// Read access to users, movies, ratings and the precomputed similarity
/// edges between movies.
pub trait Controller {
    type User: Entity;
    type Item: Entity;

    /// Get the user with the given id, fails with `NotFoundById` otherwise
    fn user_by_id(&self, id: &eid!(Self::User)) -> Result<Self::User>;

    /// Get users that matched the search criteria by id, name or custom (if implemented)
    fn users_by(&self, by: &SearchBy) -> Result<Vec<Self::User>>;

    /// Get the item with the given id, fails with `NotFoundById` otherwise
    fn item_by_id(&self, id: &eid!(Self::Item)) -> Result<Self::Item>;

    /// Get items that matched the search criteria by id, name or custom (if implemented)
    fn items_by(&self, by: &SearchBy) -> Result<Vec<Self::Item>>;

    /// Get the ids of every user except the specified one
    fn user_ids_except(&self, id: &eid!(Self::User)) -> Result<Vec<eid!(Self::User)>>;

    /// Get a chunk of user ids specified by certain offset and limit
    fn user_ids_offset_limit(&self, offset: usize, limit: usize)
        -> Result<Vec<eid!(Self::User)>>;

    /// Build an iterator that returns all user ids by chunks
    fn user_ids_by_chunks(&self, chunk_size: usize) -> LazyUserChunks<Self>
    where
        Self: Sized,
    {
        LazyUserChunks {
            curr_offset: 0,
            chunk_size,
            failed: false,
            controller: self,
        }
    }

    /// Get the set of items rated by the specified user
    fn rated_items(&self, user_id: &eid!(Self::User)) -> Result<rated_items!(Self::Item)>;

    /// Get the rated items of several users at once, i.e. maps User::Id => {Item::Id}
    #[allow(clippy::type_complexity)]
    fn users_rated_items(
        &self,
        user_ids: &[eid!(Self::User)],
    ) -> Result<maped_items!(Self::User => Self::Item)> {
        let mut maped_items = HashMap::new();
        for user_id in user_ids {
            maped_items.insert(user_id.clone(), self.rated_items(user_id)?);
        }

        Ok(maped_items)
    }

    /// Get the score a user gave to an item, the maximum if it was rated more than once
    fn rating_value(
        &self,
        user_id: &eid!(Self::User),
        item_id: &eid!(Self::Item),
    ) -> Result<Option<f64>>;

    /// Get the ratings for the specified user, one score per item
    fn user_ratings(&self, user_id: &eid!(Self::User)) -> Result<ratings!(Self::Item)> {
        let mut ratings = HashMap::new();
        for item_id in self.rated_items(user_id)? {
            if let Some(score) = self.rating_value(user_id, &item_id)? {
                ratings.insert(item_id, score);
            }
        }

        Ok(ratings)
    }

    /// Get the ratings an item received, one score per user
    fn item_ratings(&self, item_id: &eid!(Self::Item)) -> Result<ratings!(Self::User)>;

    /// Get how many distinct users rated each item, unrated items are left out
    fn items_raters_count(&self) -> Result<HashMap<eid!(Self::Item), usize>>;

    /// Get the precomputed similarity edges going out of the specified item
    fn similarity_edges(&self, item_id: &eid!(Self::Item)) -> Result<edges!(Self::Item)>;
}
