use serde::Deserialize;
use std::{fs, io, path::Path, time::Duration};

use generation_client::{InvalidTableName, TableName};

pub const CONFIG_ENV_VAR: &str = "GENERATION_INGEST_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "generation-ingest.toml";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://generation_data.db";
pub const DEFAULT_TABLE: &str = "wind_solar_data";
pub const DEFAULT_API_URL: &str =
    "https://data.elexon.co.uk/bmrs/api/v1/generation/actual/per-type/wind-and-solar";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Table(#[from] InvalidTableName),
}

/// SQLite location and table the pipeline appends to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
    pub table: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table: DEFAULT_TABLE.to_string(),
            max_connections: 1,
        }
    }
}

impl StoreConfig {
    pub fn table_name(&self) -> Result<TableName, InvalidTableName> {
        TableName::new(self.table.clone())
    }
}

/// Remote wind/solar endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Nominal width of one request window.
    pub window_days: u32,
    /// Pause after each window.
    pub pacing_ms: u64,
    /// Length of the trailing span ending today.
    pub lookback_years: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            pacing_ms: 500,
            lookback_years: 1,
        }
    }
}

impl PipelineConfig {
    pub fn window(&self) -> time::Duration {
        time::Duration::days(i64::from(self.window_days))
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub pipeline: PipelineConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Loads the file named by `GENERATION_INGEST_CONFIG`, else
    /// `generation-ingest.toml` if present, else the built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        use std::env;

        let cfg = match env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            Err(_) => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.window_days == 0 {
            return Err(ConfigError::Invalid("pipeline.window_days must be at least 1".into()));
        }
        if self.pipeline.lookback_years == 0 {
            return Err(ConfigError::Invalid("pipeline.lookback_years must be at least 1".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be at least 1".into()));
        }
        self.store.table_name()?;
        Ok(())
    }
}
