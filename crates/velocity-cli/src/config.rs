//! Configuration for the Velocity CLI and server.
//!
//! Provides the [`VelocityConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `VELOCITY_CONFIG` environment variable
//! 3. XDG default: `~/.config/velocity/config.toml`
//! 4. Built-in defaults

use std::path::PathBuf;

use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use velocity_core::{Error, Result};
use velocity_fts::FtsConfig;
use velocity_search::SearchConfig;

/// Prefix for config environment variables.
const ENV_PREFIX: &str = "VELOCITY";

/// Environment variable naming the config file.
const CONFIG_PATH_ENV: &str = "VELOCITY_CONFIG";

/// Environment variable consulted when `auth.jwt_secret` is unset.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for Velocity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Corpus location and shape.
    pub data: DataConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Token verification.
    pub auth: AuthConfig,

    /// Limits, timeouts, and fusion constants.
    pub search: SearchConfig,

    /// Keyword field boosts and index writer budget.
    pub fts: FtsConfig,
}

/// Corpus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the contractors JSON file.
    pub contractors_path: String,

    /// Required embedding length; 0 infers it from the first embedded record.
    pub embedding_dimension: usize,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,

    /// Host address to bind to.
    pub host: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Falls back to `JWT_SECRET`.
    pub jwt_secret: Option<String>,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            project_name: "velocity".to_string(),
            data: DataConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            search: SearchConfig::default(),
            fts: FtsConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            contractors_path: "data/contractors.json".to_string(),
            embedding_dimension: 0,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            host: "127.0.0.1".to_string(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl VelocityConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("data");
        env_opts.add_section("server");
        env_opts.add_section("auth");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        config.search.validate()?;
        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        explicit
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("velocity").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Every set leaf as a `VELOCITY_<SECTION>_<KEY>` pair.
    ///
    /// Unset options (e.g. `auth.jwt_secret`) are omitted.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let root = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        let mut pending = vec![(ENV_PREFIX.to_string(), &root)];
        while let Some((name, value)) = pending.pop() {
            match value {
                toml::Value::Table(table) => pending.extend(
                    table
                        .iter()
                        .rev()
                        .map(|(key, child)| (format!("{name}_{}", key.to_uppercase()), child)),
                ),
                leaf => vars.push((name, value_text(leaf))),
            }
        }
        Ok(vars)
    }

    // ------------------------------------------------------------------------
    // Derived settings
    // ------------------------------------------------------------------------

    /// Embedding length the corpus must satisfy, if pinned.
    pub fn expected_dimension(&self) -> Option<usize> {
        match self.data.embedding_dimension {
            0 => None,
            n => Some(n),
        }
    }

    /// The token signing secret from config or the `JWT_SECRET` variable.
    pub fn jwt_secret(&self) -> Result<String> {
        self.auth
            .jwt_secret
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(JWT_SECRET_ENV).ok().filter(|s| !s.is_empty()))
            .ok_or_else(|| {
                Error::config(format!(
                    "no JWT secret: set auth.jwt_secret or the {JWT_SECRET_ENV} environment variable"
                ))
            })
    }
}

// ============================================================================
// Value rendering
// ============================================================================

/// Plain-text form of a config value, shared by `config get` and `export`.
pub(crate) fn value_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
