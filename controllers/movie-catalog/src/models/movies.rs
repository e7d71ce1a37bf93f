// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::movies;
use common_macros::hash_map;
use controller::Entity;
use std::collections::HashMap;

#[derive(Debug, Clone, Identifiable, Queryable)]
pub struct Movie {
    pub id: i32,
    pub name: String,
    pub imdb_id: i32,
}

impl Entity for Movie {
    type Id = i32;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> HashMap<String, String> {
        hash_map! {
            "name".into() => self.name.clone(),
            "imdb_id".into() => self.imdb_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[table_name = "movies"]
pub struct NewMovie<'a> {
    pub id: i32,
    pub name: &'a str,
    pub imdb_id: i32,
}
