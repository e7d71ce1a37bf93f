// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use common_macros::hash_map;
use controller::Entity;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub name: String,
    pub imdb_id: i32,
}

impl Movie {
    pub fn new(id: i32, name: &str, imdb_id: i32) -> Self {
        Self {
            id,
            name: name.into(),
            imdb_id,
        }
    }

    /// Movies only known through ratings or similarity edges
    pub fn anonymous(id: i32) -> Self {
        Self {
            id,
            name: format!("movie {}", id),
            imdb_id: id,
        }
    }
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
