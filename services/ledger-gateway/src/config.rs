use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable prefix, e.g. `LEDGER_GATEWAY_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "LEDGER_GATEWAY";

/// Config file looked up next to the binary unless `LEDGER_GATEWAY_CONFIG_FILE` is set
const DEFAULT_CONFIG_FILE: &str = "ledger-gateway";

/// Largest scale `rust_decimal` can represent
const MAX_DECIMAL_SCALE: u32 = 28;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub amount: AmountConfig,
    #[serde(default)]
    pub ledger: ledger_core::Config,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Limits on accepted transaction amounts.
///
/// Input policy only: the ledger sums any `Decimal` exactly.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AmountConfig {
    pub max_fraction_digits: u32,
    pub max_abs: Decimal,
}

impl Config {
    /// Defaults, then the optional config file, then `LEDGER_GATEWAY_*` variables
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = env::var(format!("{ENV_PREFIX}_CONFIG_FILE"))
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let config: Config = Self::defaults()?
            .add_source(File::with_name(&config_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("pagination.default_limit", 10)?
            .set_default("pagination.max_limit", 100)?
            .set_default("amount.max_fraction_digits", 8)?
            .set_default("amount.max_abs", "1000000000000")?
            .set_default("ledger.service_name", "ledger-gateway")?
            .set_default("ledger.service_version", env!("CARGO_PKG_VERSION"))?
            .set_default("ledger.actor.mailbox_capacity", 1024)
    }

    /// Reject combinations the handlers cannot serve
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port cannot be 0"));
        }

        if self.pagination.max_limit == 0 {
            return Err(invalid("pagination.max_limit must be positive"));
        }

        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            return Err(invalid(
                "pagination.default_limit must be between 1 and pagination.max_limit",
            ));
        }

        if self.amount.max_fraction_digits > MAX_DECIMAL_SCALE {
            return Err(invalid("amount.max_fraction_digits cannot exceed 28"));
        }

        if self.amount.max_abs <= Decimal::ZERO {
            return Err(invalid("amount.max_abs must be positive"));
        }

        self.ledger
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            amount: AmountConfig {
                max_fraction_digits: 8,
                max_abs: Decimal::from(1_000_000_000_000i64),
            },
            ledger: ledger_core::Config {
                service_name: "ledger-gateway".to_string(),
                service_version: env!("CARGO_PKG_VERSION").to_string(),
                ..ledger_core::Config::default()
            },
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Message(message.to_string())
}
