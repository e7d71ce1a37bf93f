// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod parser;

use anyhow::Error;
use clap::{App, Arg, ArgMatches};
use config::Config;
use controller::{eid, Controller, Entity, SearchBy, ToTable};
use engine::Engine;
use in_memory::InMemoryController;
use movie_catalog::MovieCatalogController;
use parser::Statement;
use simplelog::{LevelFilter, TermLogger, TerminalMode};
use std::path::Path;

macro_rules! prompt {
    ($ed:ident, $db:expr) => {{
        use rustyline::error::ReadlineError;

        let msg = if $db.is_empty() {
            format!("{}", PROMPT)
        } else {
            format!("({}) {}", $db, PROMPT)
        };

        match $ed.readline(&msg) {
            Ok(line) => {
                $ed.add_history_entry(line.as_str());
                Ok(line)
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                println!("Exiting...Good bye!");
                break;
            }

            Err(e) => Err(e),
        }
    }};
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";

fn print_help() {
    println!("Statements:");
    println!("query_user(<index>)                 Show a user");
    println!("query_movie(<index>)                Show a movie");
    println!("query_ratings(<index>)              Show the ratings of a user");
    println!("similar_users(<index>[, k])         Users sharing the most rated movies");
    println!("recommend(<index>[, n])             Recommended movies for a user");
    println!("similar_movies(<index>[, k])        Precomputed similar movies");
    println!("popular([n])                        Movies rated by the most users");
    println!("score(<index>)                      Mean score of a movie");
    println!("where <index> is id(<number>) or name('<name>')");
    println!();
    println!("h | help           Shows this help");
    println!("v | version        Shows the version");
    println!("q | quit           Quit");
}

fn find_user<C: Controller>(controller: &C, by: &SearchBy) -> Result<eid!(C::User), Error> {
    let users = controller.users_by(by)?;
    users
        .first()
        .map(|entity| entity.get_id())
        .ok_or_else(|| by.not_found().into())
}

fn find_item<C: Controller>(controller: &C, by: &SearchBy) -> Result<eid!(C::Item), Error> {
    let items = controller.items_by(by)?;
    items
        .first()
        .map(|entity| entity.get_id())
        .ok_or_else(|| by.not_found().into())
}

// Shows movies as "name (id)", falls back to the bare id for nameless items
fn movie_label<C: Controller>(controller: &C, id: &eid!(C::Item)) -> Result<String, Error> {
    let item = controller.item_by_id(id)?;
    let label = match item.get_data().get("name") {
        Some(name) => format!("{} ({})", name, id),
        None => id.to_string(),
    };

    Ok(label)
}

fn run_statement<C: Controller>(
    engine: &Engine<C>,
    controller: &C,
    statement: Statement,
) -> Result<(), Error> {
    let config = engine.config();

    match statement {
        Statement::QueryUser(by) => {
            for user in controller.users_by(&by)? {
                println!("{}", user.to_table());
            }
        }

        Statement::QueryMovie(by) => {
            for item in controller.items_by(&by)? {
                println!("{}", item.to_table());
            }
        }

        Statement::QueryRatings(by) => {
            let user_id = find_user(controller, &by)?;
            let ratings = controller.user_ratings(&user_id)?;

            if ratings.is_empty() {
                println!("No ratings found for id({})", user_id);
            } else {
                println!("{}", ratings.to_table());
            }
        }

        Statement::SimilarUsers(by, k) => {
            let user_id = find_user(controller, &by)?;
            let k = k.unwrap_or(config.engine.similar_users);
            let similar = engine.similar_users(&user_id, k)?;

            println!("{}", similar.to_table());
        }

        Statement::Recommend(by, n) => {
            let user_id = find_user(controller, &by)?;
            let n = n.unwrap_or(config.engine.recommendations);
            let similar = engine.similar_users(&user_id, config.engine.similar_users)?;
            let recommended = engine.recommend(&user_id, &similar, n)?;

            if recommended.is_empty() {
                println!("Nothing to recommend to id({})", user_id);
                return Ok(());
            }

            let labeled = recommended
                .iter()
                .map(|(id, interest)| movie_label(controller, id).map(|label| (label, interest)))
                .collect::<Result<Vec<_>, Error>>()?;

            println!("{}", labeled.to_table());
        }

        Statement::SimilarMovies(by, k) => {
            let item_id = find_item(controller, &by)?;
            let k = k.unwrap_or(config.engine.similar_movies);
            let similar = engine.similar_movies(&item_id, k)?;

            if similar.is_empty() {
                println!("No similar movies for id({})", item_id);
                return Ok(());
            }

            let labeled = similar
                .iter()
                .map(|id| movie_label(controller, id).map(|label| (label, "")))
                .collect::<Result<Vec<_>, Error>>()?;

            println!("{}", labeled.to_table());
        }

        Statement::Popular(n) => {
            let n = n.unwrap_or(config.engine.popular_movies);
            let labeled = engine
                .popular_movies(n)?
                .iter()
                .map(|(id, raters)| movie_label(controller, id).map(|label| (label, *raters)))
                .collect::<Result<Vec<_>, Error>>()?;

            println!("{}", labeled.to_table());
        }

        Statement::Score(by) => {
            let item_id = find_item(controller, &by)?;
            println!("Score of id({}) is {}", item_id, engine.movie_score(&item_id)?);
        }
    }

    Ok(())
}

fn catalog_prompt<C: Controller>(controller: C, config: &Config, name: &str) -> Result<(), Error> {
    let engine = Engine::with_controller(&controller, config);
    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let opt: String = prompt!(rl, name)?;

        match opt.trim() {
            "?" | "h" | "help" => print_help(),

            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(statement) => {
                    if let Err(e) = run_statement(&engine, &controller, statement) {
                        log::error!("{}", e);
                    }
                }

                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}

fn init_logger(matches: &ArgMatches) -> Result<(), Error> {
    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    TermLogger::init(level, simplelog::Config::default(), TerminalMode::Mixed)?;
    Ok(())
}

fn main() -> Result<(), Error> {
    let matches = App::new("movie-recommend")
        .version(VERSION)
        .about("Movie recommendations by similar users")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::with_name("database-url")
                .long("database-url")
                .takes_value(true)
                .help("Postgres url, DATABASE_URL is used otherwise"),
        )
        .arg(
            Arg::with_name("ratings")
                .long("ratings")
                .takes_value(true)
                .help("Work offline with a csv of ratings"),
        )
        .arg(
            Arg::with_name("movies")
                .long("movies")
                .takes_value(true)
                .requires("ratings")
                .help("Csv of movies, used along --ratings"),
        )
        .arg(
            Arg::with_name("similarities")
                .long("similarities")
                .takes_value(true)
                .requires("ratings")
                .help("Csv of movie similarities, used along --ratings"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase logging verbosity"),
        )
        .get_matches();

    init_logger(&matches)?;

    let config = match matches.value_of("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    println!("Welcome to movie-recommend {}", VERSION);
    println!("Type 'help' to list the statements");

    if let Some(ratings) = matches.value_of("ratings") {
        let controller = InMemoryController::from_csv(
            matches.value_of("movies").map(Path::new),
            Path::new(ratings),
            matches.value_of("similarities").map(Path::new),
        )?;

        catalog_prompt(controller, &config, "csv")
    } else {
        let controller = match matches.value_of("database-url") {
            Some(url) => MovieCatalogController::with_url(url)?,
            None => MovieCatalogController::new()?,
        };

        catalog_prompt(controller, &config, "postgres")
    }
}
