use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const CONFIG_DIRECTORY_NAME: &str = "murmur";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ENV_PREFIX: &str = "MURMUR_";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JWT_SECRET: &str = "murmur-development-secret-change-me";
pub const DEFAULT_TOKEN_TTL_DAYS: u64 = 7;
pub const DEFAULT_TOKEN_ISSUER: &str = "murmur";
pub const DEFAULT_TOKEN_AUDIENCE: &str = "murmur-users";
pub const DEFAULT_REVEAL_CADENCE_MS: u64 = 24;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        source: figment::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u64,
    #[serde(default = "default_token_issuer")]
    pub token_issuer: String,
    #[serde(default = "default_token_audience")]
    pub token_audience: String,
    #[serde(default)]
    pub secure_cookies: bool,
    /// Remote history API. Chat turns stay in process when unset.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_reveal_cadence_ms")]
    pub reveal_cadence_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            token_ttl_days: default_token_ttl_days(),
            token_issuer: default_token_issuer(),
            token_audience: default_token_audience(),
            secure_cookies: false,
            api_base: None,
            reveal_cadence_ms: default_reveal_cadence_ms(),
        }
    }
}

impl AppConfig {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(CONFIG_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".murmur"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Defaults, then the JSON file at `path` (skipped when missing), then `MURMUR_*` variables.
    pub fn figment(path: &Path) -> Figment {
        Self::file_figment(path).merge(Env::prefixed(ENV_PREFIX))
    }

    fn file_figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Json::file(path))
    }

    pub fn load(path: Option<PathBuf>) -> ConfigResult<Self> {
        let path = path.unwrap_or_else(Self::default_config_path);
        if !path.exists() {
            tracing::info!("config file not found at {:?}, using defaults", path);
        }

        let config = Self::from_figment(Self::figment(&path))?;
        if config.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("using the built-in token secret; set MURMUR_JWT_SECRET outside development");
        }
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> ConfigResult<Self> {
        figment
            .extract::<AppConfig>()
            .map(AppConfig::normalized)
            .context(ExtractSnafu {
                stage: "extract-config",
            })
    }

    pub fn normalized(mut self) -> Self {
        self.bind_address = non_blank_or(self.bind_address, default_bind_address);
        self.jwt_secret = non_blank_or(self.jwt_secret, default_jwt_secret);
        self.token_issuer = non_blank_or(self.token_issuer, default_token_issuer);
        self.token_audience = non_blank_or(self.token_audience, default_token_audience);
        self.api_base = self
            .api_base
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty());
        if self.token_ttl_days == 0 {
            self.token_ttl_days = default_token_ttl_days();
        }
        self.reveal_cadence_ms = self.reveal_cadence_ms.max(1);

        self
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn reveal_cadence(&self) -> Duration {
        Duration::from_millis(self.reveal_cadence_ms)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_days.saturating_mul(24 * 60 * 60))
    }
}

fn non_blank_or(value: String, default: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl_days() -> u64 {
    DEFAULT_TOKEN_TTL_DAYS
}

fn default_token_issuer() -> String {
    DEFAULT_TOKEN_ISSUER.to_string()
}

fn default_token_audience() -> String {
    DEFAULT_TOKEN_AUDIENCE.to_string()
}

fn default_reveal_cadence_ms() -> u64 {
    DEFAULT_REVEAL_CADENCE_MS
}
