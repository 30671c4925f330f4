//! Runtime configuration utilities for ddi-extractor.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the CoreNLP dependency-parsing server.
    pub corenlp_url: String,
    /// Per-request timeout for the parsing server, in seconds.
    pub corenlp_timeout_secs: u64,
    /// Sentences parsed concurrently while building a dataset.
    pub parse_concurrency: usize,
    /// Padded sequence length used when creating codemaps.
    pub max_len: usize,
    /// Width of the hashed classifier feature space.
    pub feature_dim: usize,
    /// Optimizer iteration cap for the logistic classifier.
    pub max_iterations: u64,
    /// Root folder for corpora and parsed datasets.
    pub data_dir: PathBuf,
    /// Root folder for trained models and index files.
    pub models_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let corenlp_url =
            env::var("CORENLP_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let models_dir = env::var("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./models"));

        std::fs::create_dir_all(&models_dir).context("creating models dir")?;

        Ok(Self {
            corenlp_url,
            corenlp_timeout_secs: env_or("CORENLP_TIMEOUT_SECS", 60),
            parse_concurrency: env_or("PARSE_CONCURRENCY", 1usize).max(1),
            max_len: env_or("MAX_LEN", 150),
            feature_dim: env_or("FEATURE_DIM", 2048usize).max(1),
            max_iterations: env_or("MAX_ITERATIONS", 100),
            data_dir,
            models_dir,
        })
    }

    /// Parser request timeout as a [`Duration`].
    pub fn corenlp_timeout(&self) -> Duration {
        Duration::from_secs(self.corenlp_timeout_secs)
    }

    /// Resolve a corpus or dataset path; bare names that do not exist in the
    /// working directory are looked up under the data directory.
    pub fn data_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.exists() || path.is_absolute() || path.components().count() > 1 {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// Resolve a model name to its base path; absolute or explicit relative
    /// paths are kept as given.
    pub fn model_path(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() || path.components().count() > 1 {
            path.to_path_buf()
        } else {
            self.models_dir.join(path)
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corenlp_url: "http://localhost:9000".to_string(),
            corenlp_timeout_secs: 60,
            parse_concurrency: 1,
            max_len: 150,
            feature_dim: 2048,
            max_iterations: 100,
            data_dir: PathBuf::from("./data"),
            models_dir: PathBuf::from("./models"),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
