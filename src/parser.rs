// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use controller::SearchBy;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::{char, digit1, space0},
    combinator::{map, map_res, opt},
    error::ErrorKind,
    sequence::{delimited, pair, preceded},
    Err, IResult,
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    QueryUser(SearchBy),
    QueryMovie(SearchBy),
    QueryRatings(SearchBy),
    SimilarUsers(SearchBy, Option<usize>),
    Recommend(SearchBy, Option<usize>),
    SimilarMovies(SearchBy, Option<usize>),
    Popular(Option<usize>),
    Score(SearchBy),
}

fn function_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

// Single quoted, no escapes
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till1(|c: char| c == '\''), char('\''))(input)
}

fn size(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

fn parens<'a, O, F>(inner: F) -> impl Fn(&'a str) -> IResult<&'a str, O>
where
    F: Fn(&'a str) -> IResult<&'a str, O>,
{
    delimited(char('('), inner, char(')'))
}

// `id(n)` or `name('x')`
fn index(input: &str) -> IResult<&str, SearchBy> {
    alt((
        map(preceded(tag("id"), parens(size)), SearchBy::id),
        map(preceded(tag("name"), parens(quoted)), SearchBy::name),
    ))(input)
}

// `(index)` or `(index, size)`
fn sized_index(input: &str) -> IResult<&str, (SearchBy, Option<usize>)> {
    parens(pair(index, opt(preceded(comma, size))))(input)
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    let (rest, function) = function_name(input)?;

    match function {
        "query_user" => map(parens(index), Statement::QueryUser)(rest),
        "query_movie" => map(parens(index), Statement::QueryMovie)(rest),
        "query_ratings" => map(parens(index), Statement::QueryRatings)(rest),
        "score" => map(parens(index), Statement::Score)(rest),

        "similar_users" => map(sized_index, |(by, k)| Statement::SimilarUsers(by, k))(rest),
        "recommend" => map(sized_index, |(by, n)| Statement::Recommend(by, n))(rest),
        "similar_movies" => map(sized_index, |(by, k)| Statement::SimilarMovies(by, k))(rest),
        "popular" => map(parens(opt(size)), Statement::Popular)(rest),

        _ => Err(Err::Error((input, ErrorKind::Tag))),
    }
}

pub fn parse_line(input: &str) -> Option<Statement> {
    let input = input.trim();
    let (rest, statement) = parse_statement(input).ok()?;

    if rest.trim_end_matches(';').is_empty() {
        Some(statement)
    } else {
        None
    }
}
