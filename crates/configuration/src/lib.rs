// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_logging;
pub use settings::{AnalyticsSettings, Config, Logging, Portfolio};

/// Loads the application configuration from `config.toml` in the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads configuration from the given file (optional: defaults apply when it
/// is missing), overridden by `EQUITY__SECTION__KEY` environment variables,
/// and validates it.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("EQUITY")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("portfolio.symbols")
                .with_list_parse_key("analytics.volatility_windows")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.analytics.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsParams;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(AnalyticsParams::from(&config.analytics), AnalyticsParams::default());
        assert!(config.portfolio.symbols.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(config.analytics.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_override_defaults() {
        let config = parse(
            r#"
            [analytics]
            risk_free_rate = 0.05
            volatility_windows = [10, 30]

            [portfolio]
            symbols = ["AAPL", "MSFT"]
            "#,
        );
        let params = AnalyticsParams::from(&config.analytics);
        assert_eq!(params.risk_free_rate, 0.05);
        assert_eq!(params.volatility_windows, vec![10, 30]);
        assert_eq!(params.trading_days_per_year, 252);
        assert_eq!(config.portfolio.symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_validation_rejects_bad_windows_and_quantiles() {
        let unordered = parse("[analytics]\nvolatility_windows = [40, 20]");
        assert!(matches!(unordered.analytics.validate(), Err(ConfigError::ValidationError(_))));

        let inverted = parse("[analytics]\nlower_quantile = 0.9\nupper_quantile = 0.1");
        assert!(inverted.analytics.validate().is_err());

        let no_days = parse("[analytics]\ntrading_days_per_year = 0");
        assert!(no_days.analytics.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_from("does-not-exist.toml").unwrap();
        assert_eq!(config.analytics.min_period_days, 20);
    }
}
