use redis::{aio::MultiplexedConnection, Client};
use tracing::info;

/// Мультиплексированное соединение с Redis.
///
/// Клонирование дешёвое: все клоны используют одно соединение, поэтому клиент
/// можно раздавать конкурентным обработчикам без пула.
#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Redis connection established");
        Ok(RedisClient { conn })
    }
}
