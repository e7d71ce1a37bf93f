// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use controller::error::ErrorKind;
use csv::StringRecord;
use diesel::pg::PgConnection;
use diesel::{insert_into, prelude::*};
use indicatif::ProgressIterator;
use movie_catalog::establish_connection;
use movie_catalog::models::{
    movies::NewMovie, ratings::NewRating, similarities::NewMovieSimilarity, users::NewUser,
};
use movie_catalog::schema::{movie_similarities, movies, ratings, users};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

// Short rows and unparsable values are reported with their line
fn field<T: FromStr>(record: &StringRecord, idx: usize, name: &str) -> Result<T, ErrorKind> {
    let line = record.position().map_or(0, |pos| pos.line());
    let raw = record
        .get(idx)
        .ok_or_else(|| ErrorKind::InvalidRecord(line, format!("missing {}", name)))?;

    raw.trim()
        .parse()
        .map_err(|_| ErrorKind::InvalidRecord(line, format!("invalid {} ({})", name, raw)))
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, Error> {
    let csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .from_path(path)?;

    Ok(csv)
}

fn insert_movies(conn: &PgConnection, dir: &Path) -> Result<(), Error> {
    let mut csv = reader(&dir.join("movies.csv"))?;

    println!("Collecting records for movies...");
    let records: Vec<_> = csv.records().collect::<Result<_, _>>()?;

    let mut movies = Vec::new();
    for record in records.iter().progress() {
        let id: i32 = field(record, 0, "id")?;
        let name = record.get(1).ok_or_else(|| {
            let line = record.position().map_or(0, |pos| pos.line());
            ErrorKind::InvalidRecord(line, "missing name".into())
        })?;
        let imdb_id: i32 = field(record, 2, "imdb_id")?;

        movies.push(NewMovie { id, name, imdb_id });
    }

    println!("Pushing movies by chunks");
    for chunk in movies.chunks(10_000).progress() {
        insert_into(movies::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

fn insert_ratings(conn: &PgConnection, dir: &Path) -> Result<(), Error> {
    let mut csv = reader(&dir.join("ratings.csv"))?;

    println!("Collecting records for ratings...");
    let records: Vec<_> = csv.records().collect::<Result<_, _>>()?;

    let mut user_ids = BTreeSet::new();
    let mut ratings = Vec::new();
    for record in records.iter().progress() {
        let user_id: i32 = field(record, 0, "user_id")?;
        let movie_id: i32 = field(record, 1, "movie_id")?;
        let score: f64 = field(record, 2, "score")?;
        let comment = record.get(3).unwrap_or("");

        user_ids.insert(user_id);
        ratings.push(NewRating {
            user_id,
            movie_id,
            score,
            comment,
        });
    }

    // Users are only known through their ratings
    let names: Vec<_> = user_ids
        .iter()
        .map(|id| (format!("user {}", id), format!("user{}@localhost", id)))
        .collect();

    let users: Vec<_> = user_ids
        .iter()
        .zip(names.iter())
        .map(|(id, (name, email))| NewUser {
            id: *id,
            name,
            email,
        })
        .collect();

    println!("Pushing users into the database");
    for chunk in users.chunks(10_000).progress() {
        insert_into(users::table).values(chunk).execute(conn)?;
    }

    println!("Pushing ratings by chunks");
    for chunk in ratings.chunks(10_000).progress() {
        insert_into(ratings::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

fn insert_similarities(conn: &PgConnection, dir: &Path) -> Result<(), Error> {
    let path = dir.join("similarities.csv");
    if !path.exists() {
        println!("No similarities found, skipping");
        return Ok(());
    }

    let mut csv = reader(&path)?;

    println!("Collecting records for similarities...");
    let records: Vec<_> = csv.records().collect::<Result<_, _>>()?;

    let mut edges = Vec::new();
    for record in records.iter().progress() {
        edges.push(NewMovieSimilarity {
            source_id: field(record, 0, "source_id")?,
            target_id: field(record, 1, "target_id")?,
            similarity: field(record, 2, "similarity")?,
        });
    }

    println!("Pushing similarities by chunks");
    for chunk in edges.chunks(10_000).progress() {
        insert_into(movie_similarities::table)
            .values(chunk)
            .execute(conn)?;
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let url = dotenv::var("DATABASE_URL")?;
    let conn = establish_connection(&url)?;

    let dir = std::env::args().nth(1).unwrap_or_else(|| "data".into());
    let dir = Path::new(&dir);

    conn.transaction::<_, Error, _>(|| {
        insert_movies(&conn, dir)?;
        insert_ratings(&conn, dir)?;
        insert_similarities(&conn, dir)
    })?;

    Ok(())
}
