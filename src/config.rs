//! Application-level configuration loading: storage backend selection, MongoDB settings and
//! the listening port.

use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_STORE_CONFIG_PATH";

/// Storage backend used to hold the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Non-persistent in-process store.
    #[default]
    Memory,
    /// MongoDB collection.
    Mongo,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

/// Connection settings for the MongoDB backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MongoSettings {
    /// Connection string.
    pub uri: String,
    /// Database holding the games collection.
    pub database: String,
    /// Collection name.
    pub collection: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".into(),
            database: "game_store".into(),
            collection: "games".into(),
        }
    }
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend selected at start-up.
    pub backend: StorageBackend,
    /// Preload the in-memory store with the sample catalog.
    pub seed: bool,
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// MongoDB settings, ignored by the memory backend.
    pub mongo: MongoSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            seed: true,
            port: 8080,
            mongo: MongoSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file(&resolve_config_path());
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Read `path`, falling back to defaults when the file is missing or invalid.
    pub fn from_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), backend = ?config.backend, "loaded config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `GAME_STORE_BACKEND`, `PORT`, `MONGO_URI`, `MONGO_DB` and `MONGO_COLLECTION`
    /// as returned by `lookup`. Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("GAME_STORE_BACKEND") {
            match value.parse() {
                Ok(backend) => self.backend = backend,
                Err(err) => warn!(error = %err, "ignoring GAME_STORE_BACKEND"),
            }
        }
        if let Some(value) = lookup("PORT") {
            match value.parse() {
                Ok(port) => self.port = port,
                Err(err) => warn!(error = %err, value = %value, "ignoring PORT"),
            }
        }
        if let Some(uri) = lookup("MONGO_URI") {
            self.mongo.uri = uri;
        }
        if let Some(database) = lookup("MONGO_DB") {
            self.mongo.database = database;
        }
        if let Some(collection) = lookup("MONGO_COLLECTION") {
            self.mongo.collection = collection;
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
