//! Server and compiler settings loaded from TOML.
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ```toml
//! port = 8585
//! data-path = "/var/lib/sky"
//! pid-path = "/var/run/skyd.pid"
//! nosync = false
//! max-dbs = 4096
//! max-readers = 126
//!
//! [compiler]
//! max-call-depth = 256
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use eql_compiler::{Compiler, DEFAULT_MAX_CALL_DEPTH, MAX_CALL_DEPTH_CEILING};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8585;
pub const DEFAULT_DATA_PATH: &str = "/var/lib/sky";
pub const DEFAULT_PID_PATH: &str = "/var/run/skyd.pid";
pub const DEFAULT_MAX_DBS: u32 = 4096;
pub const DEFAULT_MAX_READERS: u32 = 126;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub pid_path: PathBuf,
    pub nosync: bool,
    pub max_dbs: u32,
    pub max_readers: u32,
    pub compiler: CompilerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            pid_path: PathBuf::from(DEFAULT_PID_PATH),
            nosync: false,
            max_dbs: DEFAULT_MAX_DBS,
            max_readers: DEFAULT_MAX_READERS,
            compiler: CompilerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerConfig {
    pub max_call_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Config {
    /// Read TOML from `reader`, filling missing keys with defaults.
    pub fn decode(mut reader: impl Read) -> Result<Self, ConfigError> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|source| ConfigError::Io {
            path: PathBuf::from("<input>"),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".into()));
        }
        if self.max_dbs == 0 {
            return Err(ConfigError::Invalid("max-dbs must be non-zero".into()));
        }
        if self.max_readers == 0 {
            return Err(ConfigError::Invalid("max-readers must be non-zero".into()));
        }
        let depth = self.compiler.max_call_depth;
        if depth == 0 || depth > MAX_CALL_DEPTH_CEILING {
            return Err(ConfigError::Invalid(format!(
                "compiler.max-call-depth must be between 1 and {MAX_CALL_DEPTH_CEILING}, found {depth}"
            )));
        }
        Ok(())
    }

    /// A compiler using these settings.
    pub fn compiler(&self) -> Compiler {
        Compiler::new().with_max_call_depth(self.compiler.max_call_depth)
    }
}
