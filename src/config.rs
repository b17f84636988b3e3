//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Listening host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins, comma-separated.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Directory holding the pre-built dashboard frontend.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    // === Upstream APIs ===
    /// WHO Global Health Observatory base URL.
    #[serde(default = "default_who_base_url")]
    pub who_base_url: String,

    /// World Bank v2 API base URL.
    #[serde(default = "default_world_bank_base_url")]
    pub world_bank_base_url: String,

    /// UNESCO Institute for Statistics base URL.
    #[serde(default = "default_unesco_base_url")]
    pub unesco_base_url: String,

    /// REST Countries base URL.
    #[serde(default = "default_rest_countries_base_url")]
    pub rest_countries_base_url: String,

    // === Fetch Parameters ===
    /// ISO-3166 alpha-3 country code to fetch indicators for.
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Per-request timeout for outbound fetches, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// First year of the default observation window.
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last year of the default observation window.
    #[serde(default = "default_end_year")]
    pub end_year: i32,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_who_base_url() -> String {
    "https://ghoapi.azureedge.net/api".to_string()
}

fn default_world_bank_base_url() -> String {
    "https://api.worldbank.org/v2".to_string()
}

fn default_unesco_base_url() -> String {
    "https://api.uis.unesco.org/api/public".to_string()
}

fn default_rest_countries_base_url() -> String {
    "https://restcountries.com/v3.1".to_string()
}

fn default_country_code() -> String {
    "UGA".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_start_year() -> i32 {
    2000
}

fn default_end_year() -> i32 {
    2023
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.country_code.is_empty() {
            return Err("COUNTRY_CODE must not be empty".to_string());
        }

        if !self.country_code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err("COUNTRY_CODE must be an ISO alpha code".to_string());
        }

        if self.start_year > self.end_year {
            return Err("START_YEAR must not exceed END_YEAR".to_string());
        }

        if self.http_timeout_secs == 0 {
            return Err("HTTP_TIMEOUT_SECS must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Allowed CORS origins as a list.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            static_dir: default_static_dir(),
            who_base_url: default_who_base_url(),
            world_bank_base_url: default_world_bank_base_url(),
            unesco_base_url: default_unesco_base_url(),
            rest_countries_base_url: default_rest_countries_base_url(),
            country_code: default_country_code(),
            http_timeout_secs: default_http_timeout_secs(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            rust_log: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.country_code, "UGA");
        assert_eq!(config.http_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_country_code() {
        let config = Config {
            country_code: "".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_year_range() {
        let config = Config {
            start_year: 2024,
            end_year: 2018,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cors_origins_split_and_trimmed() {
        let config = Config {
            cors_origins: "http://a.example, http://b.example ,".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.cors_origin_list(),
            vec!["http://a.example".to_string(), "http://b.example".to_string()]
        );
    }
}
