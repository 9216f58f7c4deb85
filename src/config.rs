//! Process configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::generators::RenderConfig;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub render: RenderConfig,
    pub pandoc_binary: Option<PathBuf>,
    pub default_vat_rate: f64,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            render: RenderConfig::default(),
            pandoc_binary: None,
            default_vat_rate: 10.0,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset and blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut render = RenderConfig::default();
        if let Some(bin) = get("TYPST_BIN") {
            render.typst_binary = PathBuf::from(bin);
        }
        if let Some(paths) = get("TYPST_FONT_PATHS") {
            render.font_paths = env::split_paths(&paths).collect();
        }
        render.default_font = get("PDF_DEFAULT_FONT");
        render.timeout = parse::<u64>(get("RENDER_TIMEOUT_SECS"), "RENDER_TIMEOUT_SECS", "number of seconds")?
            .map(Duration::from_secs);

        let default_vat_rate =
            parse::<f64>(get("DEFAULT_VAT_RATE"), "DEFAULT_VAT_RATE", "percentage")?
                .unwrap_or(defaults.default_vat_rate);
        if !(0.0..=100.0).contains(&default_vat_rate) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_VAT_RATE",
                expected: "percentage",
                value: default_vat_rate.to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse(get("PORT"), "PORT", "port number")?.unwrap_or(defaults.port),
            render,
            pandoc_binary: get("PANDOC_BIN").map(PathBuf::from),
            default_vat_rate,
            max_upload_bytes: parse(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", "byte count")?
                .unwrap_or(defaults.max_upload_bytes),
        })
    }
}

fn parse<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value: v,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_vat_rate, 10.0);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.render.typst_binary, PathBuf::from("typst"));
        assert!(config.render.timeout.is_none());
        assert!(config.pandoc_binary.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("TYPST_FONT_PATHS", "/fonts/a:/fonts/b"),
            ("RENDER_TIMEOUT_SECS", "20"),
            ("PANDOC_BIN", "/usr/bin/pandoc"),
            ("DEFAULT_VAT_RATE", "8"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.render.font_paths.len(), 2);
        assert_eq!(config.render.timeout, Some(Duration::from_secs(20)));
        assert_eq!(config.default_vat_rate, 8.0);
        assert!(config.pandoc_binary.is_some());
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(config(&[("DEFAULT_VAT_RATE", "150")]).is_err());
    }
}
