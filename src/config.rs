use std::str::FromStr;

use bigdecimal::{BigDecimal, Signed};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Header printed on receipts when the request leaves it blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgencyProfile {
    pub name: String,
    pub inn: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub rounding_step: BigDecimal,
    pub agency: AgencyProfile,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => 8080,
        };

        let rounding_step = match lookup("ROUNDING_STEP") {
            Some(value) => match BigDecimal::from_str(value.trim()) {
                Ok(step) if step.is_positive() => step,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "ROUNDING_STEP",
                        value,
                    })
                }
            },
            None => BigDecimal::from(100),
        };

        Ok(Self {
            database_url,
            host,
            port,
            rounding_step,
            agency: AgencyProfile {
                name: lookup("AGENCY_NAME").unwrap_or_default(),
                inn: lookup("AGENCY_INN").unwrap_or_default(),
                address: lookup("AGENCY_ADDRESS").unwrap_or_default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/agency")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.rounding_step, BigDecimal::from(100));
        assert_eq!(config.agency, AgencyProfile::default());
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(
            load(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/agency"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("ROUNDING_STEP", "10"),
            ("AGENCY_NAME", "ООО «Полис»"),
            ("AGENCY_INN", "7701234567"),
        ])
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.rounding_step, BigDecimal::from(10));
        assert_eq!(config.agency.name, "ООО «Полис»");
        assert_eq!(config.agency.inn, "7701234567");
        assert_eq!(config.agency.address, "");
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = load(&[("DATABASE_URL", "x"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value 'eighty'");

        for step in ["0", "-5", "abc"] {
            let err = load(&[("DATABASE_URL", "x"), ("ROUNDING_STEP", step)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "ROUNDING_STEP", .. }));
        }
    }
}
