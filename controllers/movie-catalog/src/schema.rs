table! {
    movie_similarities (id) {
        id -> Int4,
        source_id -> Int4,
        target_id -> Int4,
        similarity -> Float8,
    }
}

table! {
    movies (id) {
        id -> Int4,
        name -> Varchar,
        imdb_id -> Int4,
    }
}

table! {
    ratings (id) {
        id -> Int4,
        user_id -> Int4,
        movie_id -> Int4,
        score -> Float8,
        comment -> Text,
    }
}

table! {
    users (id) {
        id -> Int4,
        name -> Varchar,
        email -> Varchar,
    }
}

joinable!(movie_similarities -> movies (source_id));
joinable!(ratings -> movies (movie_id));
joinable!(ratings -> users (user_id));

allow_tables_to_appear_in_same_query!(
    movie_similarities,
    movies,
    ratings,
    users,
);
