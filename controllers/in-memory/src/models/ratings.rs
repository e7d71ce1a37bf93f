// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub user_id: i32,
    pub movie_id: i32,
    pub score: f64,
    pub comment: String,
}

impl Rating {
    pub fn new(user_id: i32, movie_id: i32, score: f64) -> Self {
        Self {
            user_id,
            movie_id,
            score,
            comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub source_id: i32,
    pub target_id: i32,
    pub similarity: f64,
}
