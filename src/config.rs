use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

fn default_food_gst_rate() -> Decimal {
    dec!(5.0)
}

fn default_delivery_gst_rate() -> Decimal {
    dec!(18.0)
}

fn default_platform_gst_rate() -> Decimal {
    dec!(18.0)
}

fn default_gst_inclusive() -> bool {
    true
}

fn default_delivery_rider_cost() -> Decimal {
    dec!(30)
}

fn default_rider_flat_payout() -> Decimal {
    dec!(40)
}

fn default_max_payment_amount() -> Decimal {
    dec!(100000)
}

/// Pricing constants used by the order pricing engine and rider payroll.
///
/// TODO: `delivery_rider_cost` (30) and `rider_flat_payout` (40) disagree;
/// confirm with finance which one is the delivery-margin basis before
/// reconciling.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// GST rate applied to food line items (percent)
    #[serde(default = "default_food_gst_rate")]
    pub food_gst_rate: Decimal,

    /// GST rate applied to delivery charges (percent)
    #[serde(default = "default_delivery_gst_rate")]
    pub delivery_gst_rate: Decimal,

    /// GST rate applied to platform fees (percent)
    #[serde(default = "default_platform_gst_rate")]
    pub platform_gst_rate: Decimal,

    /// Whether listed prices already embed GST
    #[serde(default = "default_gst_inclusive")]
    pub gst_inclusive: bool,

    /// Per-delivery cost subtracted from the delivery fee when attributing
    /// platform margin
    #[serde(default = "default_delivery_rider_cost")]
    pub delivery_rider_cost: Decimal,

    /// Flat amount a rider earns per completed delivery
    #[serde(default = "default_rider_flat_payout")]
    pub rider_flat_payout: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            food_gst_rate: default_food_gst_rate(),
            delivery_gst_rate: default_delivery_gst_rate(),
            platform_gst_rate: default_platform_gst_rate(),
            gst_inclusive: default_gst_inclusive(),
            delivery_rider_cost: default_delivery_rider_cost(),
            rider_flat_payout: default_rider_flat_payout(),
        }
    }
}

/// Payment gateway configuration (hosted checkout with salted request signing)
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PaymentConfig {
    /// Merchant identifier issued by the gateway
    #[serde(default)]
    pub merchant_id: String,

    /// Salt key used for X-VERIFY request signing
    #[serde(default)]
    pub salt_key: String,

    /// Salt index paired with the salt key
    #[serde(default = "default_salt_index")]
    pub salt_index: u32,

    /// Gateway base URL
    #[serde(default)]
    pub host_url: String,

    /// Public base URL of this deployment, used to build callback and
    /// redirect URLs
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,

    /// Upper bound accepted for a single payment
    #[serde(default = "default_max_payment_amount")]
    pub max_amount: Decimal,
}

fn default_salt_index() -> u32 {
    1
}

fn default_app_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::new(),
            salt_key: String::new(),
            salt_index: default_salt_index(),
            host_url: String::new(),
            app_base_url: default_app_base_url(),
            max_amount: default_max_payment_amount(),
        }
    }
}

impl PaymentConfig {
    /// The gateway is optional in development; initiation fails loudly when
    /// credentials are missing.
    pub fn is_configured(&self) -> bool {
        !self.merchant_id.is_empty() && !self.salt_key.is_empty() && !self.host_url.is_empty()
    }
}

/// Application configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Host for the HTTP server
    pub host: String,

    /// Port for the HTTP server
    #[validate(range(min = 1))]
    pub port: u16,

    /// Runtime environment: development, staging, production
    pub environment: String,

    /// Log level: trace, debug, info, warn, error
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable text
    #[serde(default)]
    pub log_json: bool,

    /// Run migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Allowed CORS origin, or "*" in development
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub payment: PaymentConfig,
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://tiffin.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("auto_migrate", true)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    if app_config.is_production() && !app_config.payment.is_configured() {
        info!("Payment gateway credentials missing; online payments will be rejected");
    }

    info!("Configuration loaded successfully");
    Ok(app_config)
}

pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("tiffin_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter =
        EnvFilter::try_new(filter_directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_defaults_match_launch_rates() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.food_gst_rate, dec!(5.0));
        assert_eq!(pricing.delivery_gst_rate, dec!(18.0));
        assert!(pricing.gst_inclusive);
        // The two rider constants intentionally differ; see the TODO above.
        assert_ne!(pricing.delivery_rider_cost, pricing.rider_flat_payout);
    }

    #[test]
    fn unconfigured_gateway_is_detected() {
        let payment = PaymentConfig::default();
        assert!(!payment.is_configured());
    }
}
