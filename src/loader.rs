//! Loading configuration documents into the dynamic tree.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bind::{Bindable, Binder};
use crate::value::{normalize_keys, Mapping, Value};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("top-level configuration value must be a mapping")]
    RootNotMapping,
}

/// A loaded configuration document, ready to bind.
///
/// Format is chosen by file extension (`.json`, `.yaml`/`.yml`, `.toml`)
/// or explicitly via the `from_*` builder methods. The decoded tree is
/// case-normalized once at load time when case-insensitive matching is on,
/// and is immutable from then on.
///
/// ## Example
///
/// ```no_run
/// metacfg::bindable! {
///     #[derive(Debug, Default)]
///     struct ServerConfig {
///         host: String = "host,default=localhost",
///         port: u16 = "port,range=[1:65535],default=8080",
///     }
/// }
///
/// let config: ServerConfig = metacfg::Config::builder()
///     .ignore_case(true)
///     .load("server.yaml")?
///     .parse()?;
/// # Ok::<(), metacfg::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    binder: Binder,
    data: Mapping,
}

/// Builder carrying the binding configuration until a document is loaded.
#[derive(Debug, Clone, Default)]
#[must_use = "builders do nothing until a document is loaded"]
pub struct ConfigBuilder {
    binder: Binder,
}

impl Config {
    /// Creates a builder with the default configuration: case-insensitive
    /// matching, defaults applied, environment substitution on.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The decoded (and, in case-insensitive mode, normalized) tree.
    pub fn data(&self) -> &Mapping {
        &self.data
    }

    /// Binds the loaded tree into a fresh `T`.
    pub fn parse<T: Bindable + Default>(&self) -> Result<T, crate::BindError> {
        let mut target = T::default();
        self.binder.walk_root(&mut target, &self.data)?;
        Ok(target)
    }
}

impl ConfigBuilder {
    /// Sets whether key lookups ignore case. Defaults to `true`.
    pub fn ignore_case(mut self, enabled: bool) -> Self {
        self.binder = self.binder.ignore_case(enabled);
        self
    }

    /// Sets whether declared `default=` values apply. Defaults to `true`.
    pub fn use_defaults(mut self, enabled: bool) -> Self {
        self.binder = self.binder.use_defaults(enabled);
        self
    }

    /// Sets whether `${NAME}` environment placeholders are substituted.
    /// Defaults to `true`.
    pub fn use_env(mut self, enabled: bool) -> Self {
        self.binder = self.binder.use_env(enabled);
        self
    }

    /// Loads a configuration file, dispatching on its extension.
    pub fn load(self, path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let root = match ext.as_str() {
            "json" => decode_json(&text)?,
            "yaml" | "yml" => decode_yaml(&text)?,
            "toml" => decode_toml(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(ext)),
        };

        tracing::debug!(path = %path.display(), format = %ext, "loaded configuration file");
        Ok(self.finish(root))
    }

    /// Decodes a JSON document.
    pub fn from_json(self, text: &str) -> Result<Config, ConfigError> {
        Ok(self.finish(decode_json(text)?))
    }

    /// Decodes a YAML document.
    pub fn from_yaml(self, text: &str) -> Result<Config, ConfigError> {
        Ok(self.finish(decode_yaml(text)?))
    }

    /// Decodes a TOML document.
    pub fn from_toml(self, text: &str) -> Result<Config, ConfigError> {
        Ok(self.finish(decode_toml(text)?))
    }

    fn finish(self, root: Mapping) -> Config {
        let data = if self.binder.ignore_case {
            normalize_keys(&root)
        } else {
            root
        };
        Config {
            binder: self.binder,
            data,
        }
    }
}

/// One-call convenience: loads `path` with the default configuration and
/// binds it into `T`.
pub fn load<T: Bindable + Default>(path: impl AsRef<Path>) -> Result<T, crate::Error> {
    let config = Config::builder().load(path)?;
    Ok(config.parse()?)
}

fn decode_json(text: &str) -> Result<Mapping, ConfigError> {
    into_mapping(serde_json::from_str(text)?)
}

fn decode_yaml(text: &str) -> Result<Mapping, ConfigError> {
    into_mapping(serde_yaml::from_str(text)?)
}

fn decode_toml(text: &str) -> Result<Mapping, ConfigError> {
    into_mapping(Value::from(text.parse::<toml::Value>()?))
}

fn into_mapping(value: Value) -> Result<Mapping, ConfigError> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(ConfigError::RootNotMapping),
    }
}
