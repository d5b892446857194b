//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VELVET_BASE_URL` - Public URL of the storefront (payment redirects)
//! - `VELVET_ADMIN_TOKEN` - Bearer token for admin endpoints
//!
//! ## Optional
//! - `VELVET_HOST` - Bind address (default: 127.0.0.1)
//! - `VELVET_PORT` - Listen port (default: 4000)
//! - `VELVET_SHIPPING_FEE` - Base delivery fee (default: 10)
//! - `VELVET_CATALOG_PATH` - JSON product catalog file
//! - `VELVET_COUPONS_PATH` - JSON coupon catalog file (default: built-ins)
//! - `STRIPE_SECRET_KEY` - Stripe API key; without it the offline payment
//!   provider is used and Stripe checkouts settle immediately (dev only)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use velvet_core::Money;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used for payment redirect targets
    pub base_url: String,
    /// Bearer token required by admin endpoints
    pub admin_token: SecretString,
    /// Base delivery fee charged on non-empty carts
    pub shipping_fee: Money,
    /// Product catalog JSON file
    pub catalog_path: Option<PathBuf>,
    /// Coupon catalog JSON file
    pub coupons_path: Option<PathBuf>,
    /// Stripe secret key; `None` selects the offline provider
    pub stripe_secret_key: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = optional("VELVET_HOST")
            .map_or(Ok(IpAddr::from([127, 0, 0, 1])), |raw| {
                raw.parse()
                    .map_err(|e| invalid("VELVET_HOST", &format!("{e}")))
            })?;
        let port = optional("VELVET_PORT").map_or(Ok(4000), |raw| {
            raw.parse()
                .map_err(|e| invalid("VELVET_PORT", &format!("{e}")))
        })?;
        let shipping_fee = optional("VELVET_SHIPPING_FEE")
            .map_or(Ok(Money::from_major(10)), |raw| {
                raw.parse::<Decimal>()
                    .map(Money::new)
                    .map_err(|e| invalid("VELVET_SHIPPING_FEE", &format!("{e}")))
            })?;

        Ok(Self {
            host,
            port,
            base_url: required("VELVET_BASE_URL")?,
            admin_token: SecretString::from(required("VELVET_ADMIN_TOKEN")?),
            shipping_fee,
            catalog_path: optional("VELVET_CATALOG_PATH").map(PathBuf::from),
            coupons_path: optional("VELVET_COUPONS_PATH").map(PathBuf::from),
            stripe_secret_key: optional("STRIPE_SECRET_KEY").map(SecretString::from),
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// A configuration suitable for in-process tests: loopback, port 0,
    /// fixed admin token, default shipping fee, offline payments.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_owned(),
            admin_token: SecretString::from("test-admin-token"),
            shipping_fee: Money::from_major(10),
            catalog_path: None,
            coupons_path: None,
            stripe_secret_key: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn invalid(name: &str, detail: &str) -> ConfigError {
    ConfigError::InvalidEnvVar(name.to_owned(), detail.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_has_loopback_defaults() {
        let config = ServerConfig::for_tests();
        assert_eq!(config.socket_addr().ip(), IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.shipping_fee, Money::from_major(10));
        assert!(config.stripe_secret_key.is_none());
    }
}
