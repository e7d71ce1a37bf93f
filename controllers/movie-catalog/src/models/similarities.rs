// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use super::movies::Movie;
use crate::schema::movie_similarities;

// Directed edge, computed offline
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[belongs_to(Movie, foreign_key = "source_id")]
#[table_name = "movie_similarities"]
pub struct MovieSimilarity {
    pub id: i32,
    pub source_id: i32,
    pub target_id: i32,
    pub similarity: f64,
}

#[derive(Debug, Clone, Insertable)]
#[table_name = "movie_similarities"]
pub struct NewMovieSimilarity {
    pub source_id: i32,
    pub target_id: i32,
    pub similarity: f64,
}
