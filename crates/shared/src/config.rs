//! Engine configuration management.

use serde::Deserialize;

use crate::types::AmortizationStrategy;

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Amortization processing configuration.
    #[serde(default)]
    pub amortization: AmortizationConfig,
}

/// Amortization processing configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmortizationConfig {
    /// Strategy applied when a loan does not carry its own.
    #[serde(default)]
    pub default_strategy: AmortizationStrategy,
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ACCRUE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
