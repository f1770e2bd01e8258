use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub pricing: PricingConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the service that issues tokens.
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    /// Fraction, e.g. `0.18`.
    pub gst_rate: Decimal,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String { "₹".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub company_name: String,
    pub company_address: Option<String>,
    pub logo_path: PathBuf,
    pub image_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Layers `config/default`, `config/{RUN_MODE}`, `config/local`, then `QUOTEDESK__*` env vars.
    pub fn load_from(base: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| base.join("config").join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // e.g. QUOTEDESK__PRICING__GST_RATE=0.12
            .add_source(config::Environment::with_prefix("QUOTEDESK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
