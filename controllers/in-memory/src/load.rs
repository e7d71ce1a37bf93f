// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Loaders for the csv dumps of the catalog, every file has a header line:
//!
//! - movies: `id,name,imdb_id`
//! - ratings: `user_id,movie_id,score[,comment]`
//! - similarities: `source_id,target_id,similarity`

use crate::{
    models::{movies::Movie, ratings::Rating},
    InMemoryController,
};
use anyhow::Error;
use controller::error::ErrorKind;
use csv::StringRecord;
use std::{io::Read, path::Path, str::FromStr};

fn field<T: FromStr>(record: &StringRecord, idx: usize, name: &str) -> Result<T, ErrorKind> {
    let line = record.position().map_or(0, |pos| pos.line());
    let raw = record
        .get(idx)
        .ok_or_else(|| ErrorKind::InvalidRecord(line, format!("missing {}", name)))?;

    raw.trim()
        .parse()
        .map_err(|_| ErrorKind::InvalidRecord(line, format!("invalid {} ({})", name, raw)))
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .from_reader(rdr)
}

impl InMemoryController {
    /// Load a whole catalog, movies and similarities are optional
    pub fn from_csv(
        movies: Option<&Path>,
        ratings: &Path,
        similarities: Option<&Path>,
    ) -> Result<Self, Error> {
        let mut controller = Self::new();

        if let Some(path) = movies {
            controller.load_movies(std::fs::File::open(path)?)?;
        }

        controller.load_ratings(std::fs::File::open(ratings)?)?;

        if let Some(path) = similarities {
            controller.load_similarities(std::fs::File::open(path)?)?;
        }

        Ok(controller)
    }

    pub fn load_movies<R: Read>(&mut self, rdr: R) -> Result<usize, Error> {
        let mut loaded = 0;
        for record in reader(rdr).records() {
            let record = record?;
            let id = field(&record, 0, "id")?;
            let name: String = field(&record, 1, "name")?;
            let imdb_id = field(&record, 2, "imdb_id")?;

            self.insert_movie(Movie::new(id, &name, imdb_id));
            loaded += 1;
        }

        log::debug!("Loaded {} movies", loaded);
        Ok(loaded)
    }

    pub fn load_ratings<R: Read>(&mut self, rdr: R) -> Result<usize, Error> {
        let mut loaded = 0;
        for record in reader(rdr).records() {
            let record = record?;
            let mut rating = Rating::new(
                field(&record, 0, "user_id")?,
                field(&record, 1, "movie_id")?,
                field(&record, 2, "score")?,
            );

            if let Some(comment) = record.get(3) {
                rating.comment = comment.to_owned();
            }

            self.push_rating(rating);
            loaded += 1;
        }

        log::debug!("Loaded {} ratings", loaded);
        Ok(loaded)
    }

    pub fn load_similarities<R: Read>(&mut self, rdr: R) -> Result<usize, Error> {
        let mut loaded = 0;
        for record in reader(rdr).records() {
            let record = record?;
            let source_id = field(&record, 0, "source_id")?;
            let target_id = field(&record, 1, "target_id")?;
            let similarity = field(&record, 2, "similarity")?;

            self.ensure_movie(source_id);
            self.ensure_movie(target_id);
            self.insert_similarity(source_id, target_id, similarity)?;
            loaded += 1;
        }

        log::debug!("Loaded {} similarity edges", loaded);
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use controller::Controller;

    #[test]
    fn load_small_catalog() -> Result<(), Error> {
        let mut controller = InMemoryController::new();

        let movies = "id,name,imdb_id\n1,Alien,12\n2,Aliens,13\n";
        let ratings = "user_id,movie_id,score,comment\n1,1,4.5,great\n1,2,3.0\n2,3,2.0,\n";
        let similarities = "source_id,target_id,similarity\n1,2,0.9\n";

        assert_eq!(controller.load_movies(movies.as_bytes())?, 2);
        assert_eq!(controller.load_ratings(ratings.as_bytes())?, 3);
        assert_eq!(controller.load_similarities(similarities.as_bytes())?, 1);

        assert_eq!(controller.item_by_id(&1)?.name, "Alien");
        assert_eq!(controller.item_by_id(&3)?.name, "movie 3");
        assert_eq!(controller.rating_value(&1, &1)?, Some(4.5));
        assert_eq!(controller.similarity_edges(&1)?, vec![(2, 0.9)]);

        Ok(())
    }

    #[test]
    fn malformed_score_is_reported() {
        let mut controller = InMemoryController::new();
        let ratings = "user_id,movie_id,score\n1,1,4.5\n1,2,great\n";

        let err = controller.load_ratings(ratings.as_bytes()).unwrap_err();
        let kind = err.downcast_ref::<ErrorKind>();

        assert_eq!(
            kind,
            Some(&ErrorKind::InvalidRecord(3, "invalid score (great)".into()))
        );
    }
}
