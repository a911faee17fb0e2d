use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cache: CacheConfig,
    pub carrier: CarrierConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Где хранить результаты поиска.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(ConfigError::Invalid {
                name: "CACHE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

// Настройки кеша результатов поиска
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    pub namespace: String,
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: None,
            namespace: "journeys".to_string(),
            ttl_seconds: 60,
        }
    }
}

// Настройки API перевозчика
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierConfig {
    pub base_url: String,
    pub currency: String,
    pub locale: String,
    pub timeout_seconds: u64,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: "https://brn-ybus-pubapi.sa.cz/restapi".to_string(),
            currency: "EUR".to_string(),
            locale: "cs".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

// Нулевой TTL Redis отвергает (`SET EX 0`), а в памяти запись истекала бы сразу
fn positive_ttl(secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name: "CACHE_TTL_SECONDS",
            value: secs.to_string(),
        });
    }
    Ok(secs)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let cache_defaults = CacheConfig::default();
        let carrier_defaults = CarrierConfig::default();

        let backend = match env::var("CACHE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => cache_defaults.backend,
        };
        let redis_url = env::var("REDIS_URL").ok();
        if backend == CacheBackend::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", 8000)?,
                rust_log: var_or("RUST_LOG", "journey_search=debug,tower_http=debug"),
            },
            cache: CacheConfig {
                backend,
                redis_url,
                namespace: var_or("CACHE_NAMESPACE", &cache_defaults.namespace),
                ttl_seconds: positive_ttl(parse_var("CACHE_TTL_SECONDS", cache_defaults.ttl_seconds)?)?,
            },
            carrier: CarrierConfig {
                base_url: var_or("CARRIER_BASE_URL", &carrier_defaults.base_url),
                currency: var_or("CARRIER_CURRENCY", &carrier_defaults.currency),
                locale: var_or("CARRIER_LOCALE", &carrier_defaults.locale),
                timeout_seconds: parse_var("CARRIER_TIMEOUT_SECONDS", carrier_defaults.timeout_seconds)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_are_case_insensitive() {
        assert_eq!("Redis".parse::<CacheBackend>().unwrap(), CacheBackend::Redis);
        assert_eq!(" memory ".parse::<CacheBackend>().unwrap(), CacheBackend::Memory);
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let err = "memcached".parse::<CacheBackend>().unwrap_err();
        assert!(err.to_string().contains("CACHE_BACKEND"));
    }

    #[test]
    fn default_ttl_is_one_minute() {
        assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(60));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = positive_ttl(0).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CACHE_TTL_SECONDS", .. }));
        assert_eq!(positive_ttl(60).unwrap(), 60);
    }
}
