// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use config::{Config, EngineConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::Engine;
use in_memory::InMemoryController;
use rand::{thread_rng, Rng};

fn generate_catalog(users: i32, movies: i32, ratings_per_user: usize) -> InMemoryController {
    let mut rng = thread_rng();
    let mut rows = Vec::new();

    for user_id in 1..=users {
        for _ in 0..ratings_per_user {
            let movie_id = rng.gen_range(1, movies + 1);
            let score = rng.gen_range(1, 11) as f64 / 2.0;
            rows.push((user_id, movie_id, score));
        }
    }

    InMemoryController::from_ratings(rows)
}

fn config(partial_users_chunk_size: Option<usize>, parallel: bool) -> Config {
    Config {
        engine: EngineConfig {
            partial_users_chunk_size,
            parallel,
            ..Default::default()
        },
    }
}

fn similar_users_benchmark(c: &mut Criterion) {
    let controller = generate_catalog(2000, 1000, 50);

    let sequential = config(None, false);
    let parallel = config(None, true);
    let chunked = config(Some(500), true);

    let engine = Engine::with_controller(&controller, &sequential);
    c.bench_function("similar users (sequential)", |b| {
        b.iter(|| engine.similar_users(black_box(&1), 20))
    });

    let engine = Engine::with_controller(&controller, &parallel);
    c.bench_function("similar users (parallel)", |b| {
        b.iter(|| engine.similar_users(black_box(&1), 20))
    });

    let engine = Engine::with_controller(&controller, &chunked);
    c.bench_function("similar users (chunked)", |b| {
        b.iter(|| engine.similar_users(black_box(&1), 20))
    });
}

fn recommend_benchmark(c: &mut Criterion) {
    let controller = generate_catalog(2000, 1000, 50);
    let config = config(None, true);
    let engine = Engine::with_controller(&controller, &config);

    c.bench_function("recommend for user", |b| {
        b.iter(|| engine.recommend_for(black_box(&1)))
    });
}

criterion_group!(benches, similar_users_benchmark, recommend_benchmark);
criterion_main!(benches);
