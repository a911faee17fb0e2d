use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod key;
pub mod memory;
pub mod payload;
pub mod redis;

pub use key::derive_key;
pub use memory::InMemoryJourneyCache;
pub use payload::{decode_journeys, encode_journeys, PayloadError};
pub use self::redis::RedisJourneyCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(#[from] ::redis::RedisError),

    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Хранилище строк с временем жизни на каждый ключ.
///
/// Реализации должны быть безопасны для одновременного использования из
/// разных обработчиков запросов.
#[async_trait]
pub trait JourneyCache: Send + Sync {
    /// Возвращает значение по ключу или `None`, если записи нет или она истекла.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Записывает значение с заданным TTL, перезаписывая предыдущее.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}
