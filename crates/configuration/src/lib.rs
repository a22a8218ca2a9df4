use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::SettingsOverrides;
pub use logging::init_logging;
pub use settings::{Account, ExposureSettings, LoggingSettings, NormalizationSettings};

/// Prefix of the environment variables that override file settings,
/// e.g. `JOURNAL__ACCOUNT__EQUITY=250000`.
const ENV_PREFIX: &str = "JOURNAL";

/// Loads the application configuration from an optional `config.toml` in the
/// working directory, overlaid with `JOURNAL__*` environment variables.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the configuration from an explicit file, which must exist.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    build(config::File::from(path.as_ref()).required(true))
}

fn build(file: impl config::Source + Send + Sync + 'static) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn loads_partial_file_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[account]\nequity = 50000\n\n[normalization]\ntarget_risk_pct = 0.5\n"
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.account.equity, dec!(50000));
        assert_eq!(config.normalization.target_risk_pct, dec!(0.5));
        assert_eq!(config.normalization.min_risk_amount, dec!(0.01));
        assert_eq!(config.exposure.bucket_count, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[exposure]\nbucket_count = 0\ntarget_exposure_pct = 400\n").unwrap();

        assert!(matches!(
            load_config_from(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(matches!(
            load_config_from("does-not-exist.toml"),
            Err(ConfigError::LoadError(_))
        ));
    }
}
