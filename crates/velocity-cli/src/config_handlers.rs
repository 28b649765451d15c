//! `velocity config {path,get,set,init,export}` subcommands.

use std::path::{Path, PathBuf};

use velocity_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::{value_text, VelocityConfig};

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Takes the raw `--config` path since `path` and `init` must work before
/// any config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            let value = config_get(config_path, &key)?;
            println!("{value}");
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let path = config_set(config_path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = config_init(file.as_deref(), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            let config = VelocityConfig::load(config_path)?;
            for line in export_lines(&config, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = VelocityConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `velocity config init` to create it)");
    }
    Ok(())
}

/// Look up a dotted key in the effective configuration.
fn config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = VelocityConfig::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(value_text)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Write a dotted key into the config file, returning the file path.
///
/// The edited document must still deserialize into a valid configuration.
fn config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<PathBuf> {
    let path = VelocityConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `velocity config init` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    let typed = parse_value(value);
    let coerced = !typed.is_str();
    set_nested_value(&mut doc, key, typed)?;

    // Text that looks numeric or boolean may still belong in a string key.
    let updated = match doc.clone().try_into::<VelocityConfig>() {
        Ok(config) => config,
        Err(e) if coerced => {
            set_nested_value(&mut doc, key, toml::Value::String(value.to_string()))?;
            doc.clone()
                .try_into::<VelocityConfig>()
                .map_err(|_| Error::config(format!("Invalid value for '{key}': {e}")))?
        }
        Err(e) => return Err(Error::config(format!("Invalid value for '{key}': {e}"))),
    };
    updated.search.validate()?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Write a default configuration file, returning its path.
fn config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => VelocityConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    write_default(&path)?;
    Ok(path)
}

fn write_default(path: &Path) -> Result<()> {
    let toml_str = VelocityConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))
}

/// Render the configuration as `KEY=value` or `--env KEY=value` lines.
fn export_lines(config: &VelocityConfig, docker_env: bool) -> Result<Vec<String>> {
    let prefix = if docker_env { "--env " } else { "" };
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{prefix}{key}={value}"))
        .collect())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last().filter(|(last, _)| !last.is_empty()) else {
        return Err(Error::config("Empty key path"));
    };

    let mut current = root;
    for part in parents {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string into a TOML value: bool, then integer, then float, then string.
fn parse_value(s: &str) -> toml::Value {
    if let Ok(b) = s.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write_default(&path).unwrap();
        (dir, path)
    }

    // ------------------------------------------------------------------------
    // path / get
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        assert!(cmd_config_path(Some("/explicit/config.toml")).is_ok());
    }

    #[test]
    fn test_config_get_values() {
        let (_dir, path) = default_config_file();
        let path = path.to_str().unwrap();

        assert_eq!(config_get(Some(path), "project_name").unwrap(), "velocity");
        assert_eq!(config_get(Some(path), "server.port").unwrap(), "3001");
        assert_eq!(config_get(Some(path), "search.rrf.k").unwrap(), "60");
        assert_eq!(
            config_get(Some(path), "search.rrf.vector_weight").unwrap(),
            "0.6"
        );
    }

    #[test]
    fn test_config_get_missing_key() {
        let (_dir, path) = default_config_file();
        let err = config_get(Some(path.to_str().unwrap()), "nonexistent.key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    // ------------------------------------------------------------------------
    // set
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_set_nested_key() {
        let (_dir, path) = default_config_file();
        let path_str = path.to_str().unwrap();

        config_set(Some(path_str), "server.port", "8080").unwrap();
        config_set(Some(path_str), "search.rrf.keyword_weight", "0.5").unwrap();

        let config = VelocityConfig::load(Some(path_str)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.rrf.keyword_weight, 0.5);
    }

    #[test]
    fn test_config_set_creates_section() {
        let (_dir, path) = default_config_file();
        let path_str = path.to_str().unwrap();

        config_set(Some(path_str), "auth.jwt_secret", "s3cret").unwrap();

        let config = VelocityConfig::load(Some(path_str)).unwrap();
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_config_set_numeric_text_for_string_key() {
        let (_dir, path) = default_config_file();
        let path_str = path.to_str().unwrap();

        config_set(Some(path_str), "auth.jwt_secret", "123456").unwrap();
        config_set(Some(path_str), "project_name", "true").unwrap();

        let doc: toml::Value = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["auth"]["jwt_secret"].as_str(), Some("123456"));
        assert_eq!(doc["project_name"].as_str(), Some("true"));
    }

    #[test]
    fn test_config_set_numeric_key_stays_numeric() {
        let (_dir, path) = default_config_file();
        let path_str = path.to_str().unwrap();

        config_set(Some(path_str), "data.embedding_dimension", "384").unwrap();

        let doc: toml::Value = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["data"]["embedding_dimension"].as_integer(), Some(384));
    }

    #[test]
    fn test_config_set_rejects_wrong_type() {
        let (_dir, path) = default_config_file();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = config_set(Some(path.to_str().unwrap()), "server.port", "high").unwrap_err();
        assert!(err.to_string().contains("Invalid value"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_config_set_rejects_invalid_search() {
        let (_dir, path) = default_config_file();
        let result = config_set(Some(path.to_str().unwrap()), "search.max_limit", "0");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_set_missing_file() {
        let err = config_set(Some("/nonexistent/config.toml"), "key", "value").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    // ------------------------------------------------------------------------
    // init
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("velocity").join("config.toml");

        let created = config_init(Some(path.to_str().unwrap()), false).unwrap();
        assert_eq!(created, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_name"));
        assert!(content.contains("[server]"));
        assert!(content.contains("[search.rrf]"));
    }

    #[test]
    fn test_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = config_init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();

        config_init(Some(path.to_str().unwrap()), true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_name"));
    }

    // ------------------------------------------------------------------------
    // export
    // ------------------------------------------------------------------------

    #[test]
    fn test_export_lines() {
        let config = VelocityConfig::default();

        let plain = export_lines(&config, false).unwrap();
        assert!(plain.contains(&"VELOCITY_SERVER_PORT=3001".to_string()));

        let docker = export_lines(&config, true).unwrap();
        assert!(docker.iter().all(|l| l.starts_with("--env VELOCITY_")));
    }

    // ------------------------------------------------------------------------
    // Dotted-key helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_nested_value() {
        let val: toml::Value = toml::from_str("[server]\nport = 3000").unwrap();
        assert_eq!(
            get_nested_value(&val, "server.port"),
            Some(&toml::Value::Integer(3000))
        );
        assert!(get_nested_value(&val, "server.nonexistent").is_none());
        assert!(get_nested_value(&val, "server.port.deeper").is_none());
    }

    #[test]
    fn test_set_nested_value_creates_tables() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        set_nested_value(&mut val, "search.rrf.k", toml::Value::Float(30.0)).unwrap();
        assert_eq!(
            get_nested_value(&val, "search.rrf.k"),
            Some(&toml::Value::Float(30.0))
        );
    }

    #[test]
    fn test_set_nested_value_non_table() {
        let mut val: toml::Value = toml::from_str("port = 8080").unwrap();
        let result = set_nested_value(&mut val, "port.inner", toml::Value::Integer(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_nested_value_empty_key() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        assert!(set_nested_value(&mut val, "", toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("0.4"), toml::Value::Float(0.4));
        assert_eq!(
            parse_value("0.0.0.0"),
            toml::Value::String("0.0.0.0".to_string())
        );
    }
}
