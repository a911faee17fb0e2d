use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

use super::{CacheError, JourneyCache};
use crate::redis_client::RedisClient;

/// Кеш результатов поиска поверх Redis: `GET` на чтение, `SET ... EX` на запись.
#[derive(Clone)]
pub struct RedisJourneyCache {
    redis: RedisClient,
}

impl RedisJourneyCache {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

/// Redis принимает TTL в целых секундах и отвергает ноль.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl JourneyCache for RedisJourneyCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.redis.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds(ttl)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_rounded_down_to_whole_seconds() {
        assert_eq!(ttl_seconds(Duration::from_secs(60)), 60);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 1);
    }

    #[test]
    fn sub_second_ttl_is_clamped_to_one_second() {
        assert_eq!(ttl_seconds(Duration::ZERO), 1);
        assert_eq!(ttl_seconds(Duration::from_millis(200)), 1);
    }
}
