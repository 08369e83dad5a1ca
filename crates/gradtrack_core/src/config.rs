//! Runtime configuration: TOML file, then environment, then caller overrides.
//!
//! # Responsibility
//! - Pick the backend variant, data directory, gate secret and log settings.
//! - Derive every on-disk path from the data directory.
//!
//! # Invariants
//! - Missing settings fall back to defaults; unknown TOML keys are rejected.
//! - `log_dir` is always absolute once resolved.

use crate::auth::AUTH_MARKER_FILE_NAME;
use crate::logging::default_log_level;
use crate::repo::json_repo::STORAGE_FILE_NAME;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILE: &str = "gradtrack.toml";
pub const DEFAULT_DATA_DIR: &str = ".gradtrack";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DB_FILE_NAME: &str = "gradtrack.sqlite3";

pub const ENV_BACKEND: &str = "GRADTRACK_BACKEND";
pub const ENV_DATA_DIR: &str = "GRADTRACK_DATA_DIR";
pub const ENV_PASSWORD: &str = "GRADTRACK_PASSWORD";
pub const ENV_LOG_LEVEL: &str = "GRADTRACK_LOG_LEVEL";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidValue { key: &'static str, value: String },
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config file `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for `{key}`"),
            Self::CurrentDir(err) => write!(f, "cannot resolve current directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
            Self::CurrentDir(err) => Some(err),
        }
    }
}

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    #[default]
    Local,
    Table,
}

impl FromStr for BackendChoice {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "json" => Ok(Self::Local),
            "table" | "sqlite" | "remote" => Ok(Self::Table),
            _ => Err(ConfigError::InvalidValue {
                key: "backend",
                value: value.to_string(),
            }),
        }
    }
}

/// Shape of `gradtrack.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend: Option<BackendChoice>,
    pub data_dir: Option<PathBuf>,
    pub password: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendChoice,
    pub data_dir: PathBuf,
    pub password: String,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Loads `.env`, the config file and the process environment.
    ///
    /// An explicit `path` must exist. Without one, `gradtrack.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => read_file_config(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    read_file_config(default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::resolve(file, |key| std::env::var(key).ok(), &cwd)
    }

    /// Applies environment lookups over `file` and fills defaults.
    ///
    /// Relative directories are resolved against `base_dir`.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        base_dir: &Path,
    ) -> ConfigResult<Self> {
        let backend = match env(ENV_BACKEND) {
            Some(value) => value.parse()?,
            None => file.backend.unwrap_or_default(),
        };
        let data_dir = env(ENV_DATA_DIR)
            .map(PathBuf::from)
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let data_dir = absolutize(base_dir, data_dir);
        let password = env(ENV_PASSWORD)
            .or(file.password)
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
        let log_level = env(ENV_LOG_LEVEL)
            .or(file.log_level)
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = file
            .log_dir
            .map(|dir| absolutize(base_dir, dir))
            .unwrap_or_else(|| data_dir.join("logs"));

        Ok(Self {
            backend,
            data_dir,
            password,
            log_level,
            log_dir,
        })
    }

    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE_NAME)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn auth_marker_path(&self) -> PathBuf {
        self.data_dir.join(AUTH_MARKER_FILE_NAME)
    }
}

fn read_file_config(path: &Path) -> ConfigResult<FileConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FileConfig::from_toml_str(&raw, path)
}

fn absolutize(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, BackendChoice, ConfigError, FileConfig, ENV_BACKEND, ENV_PASSWORD};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_resolve_under_base_dir() {
        let config = AppConfig::resolve(FileConfig::default(), env_of(&[]), Path::new("/srv")).unwrap();
        assert_eq!(config.backend, BackendChoice::Local);
        assert_eq!(config.data_dir, PathBuf::from("/srv/.gradtrack"));
        assert_eq!(config.password, "admin");
        assert_eq!(config.log_dir, PathBuf::from("/srv/.gradtrack/logs"));
        assert_eq!(
            config.json_path(),
            PathBuf::from("/srv/.gradtrack/masters_applications.json")
        );
    }

    #[test]
    fn environment_overrides_file() {
        let file = FileConfig::from_toml_str(
            "backend = \"local\"\npassword = \"from-file\"\ndata_dir = \"/data\"\n",
            Path::new("gradtrack.toml"),
        )
        .unwrap();
        let config = AppConfig::resolve(
            file,
            env_of(&[(ENV_BACKEND, "sqlite"), (ENV_PASSWORD, "from-env")]),
            Path::new("/srv"),
        )
        .unwrap();

        assert_eq!(config.backend, BackendChoice::Table);
        assert_eq!(config.password, "from-env");
        assert_eq!(config.db_path(), PathBuf::from("/data/gradtrack.sqlite3"));
    }

    #[test]
    fn unknown_keys_and_bad_backend_are_rejected() {
        let err = FileConfig::from_toml_str("colour = \"red\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = AppConfig::resolve(
            FileConfig::default(),
            env_of(&[(ENV_BACKEND, "postgres")]),
            Path::new("/srv"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "backend", .. }));
    }
}
