// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// How many neighbours (K) are used to build recommendations
    pub similar_users: usize,
    /// How many movies (N) are recommended
    pub recommendations: usize,
    /// How many entries are shown as "similar movies"
    pub similar_movies: usize,
    /// Length of the popular movies list
    pub popular_movies: usize,
    /// Scan other users by chunks of this size, `None` loads all of them at once
    pub partial_users_chunk_size: Option<usize>,
    /// Compute shared counts with a thread pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similar_users: 20,
            recommendations: 10,
            similar_movies: 5,
            popular_movies: 100,
            partial_users_chunk_size: None,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: Self = toml::from_str(&contents)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    #[test]
    fn load_example_config() -> Result<(), Error> {
        let expected = Config {
            engine: EngineConfig {
                similar_users: 20,
                recommendations: 10,
                similar_movies: 5,
                popular_movies: 100,
                partial_users_chunk_size: Some(10000),
                parallel: true,
            },
        };

        let loaded = Config::load("example.toml")?;
        assert_eq!(expected, loaded);

        Ok(())
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() -> Result<(), Error> {
        let parsed: Config = toml::from_str("[engine]\nsimilar_users = 5\n")?;

        assert_eq!(parsed.engine.similar_users, 5);
        assert_eq!(parsed.engine.recommendations, 10);
        assert_eq!(parsed.engine.partial_users_chunk_size, None);
        assert!(!parsed.engine.parallel);

        let empty: Config = toml::from_str("")?;
        assert_eq!(empty, Config::default());

        Ok(())
    }
}
