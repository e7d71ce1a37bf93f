// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;
use std::fmt::{self, Display};
use std::str::FromStr;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SearchBy {
    Id(String),
    Name(String),
    Custom(String, String),
}

impl SearchBy {
    pub fn id(id: impl ToString) -> Self {
        Self::Id(id.to_string())
    }

    pub fn name(name: &str) -> Self {
        Self::Name(name.into())
    }

    pub fn custom(key: &str, val: &str) -> Self {
        Self::Custom(key.into(), val.into())
    }

    /// Parse the id of a `SearchBy::Id`, an id that doesn't parse can't
    /// match any entity so it's reported as not found.
    pub fn parse_id<T: FromStr>(id: &str) -> Result<T, ErrorKind> {
        id.parse()
            .map_err(|_| ErrorKind::NotFoundById(id.to_owned()))
    }

    pub fn not_found(&self) -> ErrorKind {
        match self {
            SearchBy::Id(id) => ErrorKind::NotFoundById(id.clone()),
            SearchBy::Name(name) => ErrorKind::NotFoundByName(name.clone()),
            SearchBy::Custom(key, val) => ErrorKind::NotFoundByCustom(key.clone(), val.clone()),
        }
    }
}

impl Display for SearchBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBy::Id(id) => write!(f, "id({})", id),
            SearchBy::Name(name) => write!(f, "name({})", name),
            SearchBy::Custom(key, val) => write!(f, "{}({})", key, val),
        }
    }
}
