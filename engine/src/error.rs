// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, PartialEq, DError)]
pub enum ErrorKind {
    #[error("Rating of user({0}) on item({1}) is not a finite number")]
    NonFiniteScore(String, String),

    #[error("Similarity between item({0}) and item({1}) is not a finite number")]
    NonFiniteSimilarity(String, String),
}
