// config.rs — Daemon configuration.
//
// DaemonConfig decides where the daemon listens and where it keeps its
// state. `for_project()` lays everything out under `.metas/` in the project
// root; an optional `.metas/daemon.toml` overrides individual keys, and CLI
// flags override the file.
//
// Example daemon.toml:
//
//   bind = "0.0.0.0:8080"
//   database = "/var/lib/metas/metas.db"
//   cors_permissive = true

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default listen address (the port the original web app served on).
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,

    /// SQLite database holding goal records.
    pub database: PathBuf,

    /// JSONL log of goal events.
    pub events_log: PathBuf,

    /// Allow cross-origin requests from any origin (for a separately served UI).
    pub cors_permissive: bool,
}

/// On-disk overrides; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind: Option<SocketAddr>,
    database: Option<PathBuf>,
    events_log: Option<PathBuf>,
    cors_permissive: Option<bool>,
}

impl DaemonConfig {
    /// Create a config with the standard `.metas/` layout for a project.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let metas_dir = project_root.as_ref().join(".metas");
        Self {
            bind: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000))),
            database: metas_dir.join("metas.db"),
            events_log: metas_dir.join("events.jsonl"),
            cors_permissive: false,
        }
    }

    /// Default config file location for a project.
    pub fn default_path(project_root: impl AsRef<Path>) -> PathBuf {
        project_root.as_ref().join(".metas").join("daemon.toml")
    }

    /// Load the project's config.
    ///
    /// An explicit `config_path` must exist. Without one, the default
    /// location is used if present, otherwise the built-in defaults apply.
    /// Relative paths in the file resolve against `project_root`.
    pub fn load(
        project_root: impl AsRef<Path>,
        config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let root = project_root.as_ref();
        let mut config = Self::for_project(root);

        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::default_path(root);
                if !default.exists() {
                    return Ok(config);
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        if let Some(bind) = file.bind {
            config.bind = bind;
        }
        if let Some(database) = file.database {
            config.database = root.join(database);
        }
        if let Some(events_log) = file.events_log {
            config.events_log = root.join(events_log);
        }
        if let Some(cors) = file.cors_permissive {
            config.cors_permissive = cors;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn for_project_uses_metas_dir() {
        let config = DaemonConfig::for_project("/srv/app");
        assert_eq!(config.database, PathBuf::from("/srv/app/.metas/metas.db"));
        assert_eq!(config.events_log, PathBuf::from("/srv/app/.metas/events.jsonl"));
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert!(!config.cors_permissive);
    }

    #[test]
    fn missing_default_file_means_defaults() {
        let dir = tempdir().unwrap();
        let config = DaemonConfig::load(dir.path(), None).unwrap();
        assert_eq!(config, DaemonConfig::for_project(dir.path()));
    }

    #[test]
    fn default_file_overrides_keys() {
        let dir = tempdir().unwrap();
        let path = DaemonConfig::default_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "bind = \"0.0.0.0:8080\"\ndatabase = \"data/goals.db\"\ncors_permissive = true\n",
        )
        .unwrap();

        let config = DaemonConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.database, dir.path().join("data/goals.db"));
        assert!(config.cors_permissive);
        // Untouched keys keep their defaults.
        assert_eq!(config.events_log, dir.path().join(".metas/events.jsonl"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("elsewhere.db");
        let path = dir.path().join("custom.toml");
        fs::write(&path, format!("database = {:?}\n", db.display().to_string())).unwrap();

        let config = DaemonConfig::load(dir.path(), Some(&path)).unwrap();
        assert_eq!(config.database, db);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = DaemonConfig::load(dir.path(), Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "port = 80\n").unwrap();

        let result = DaemonConfig::load(dir.path(), Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
