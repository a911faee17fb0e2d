pub mod cache;
pub mod carrier;
pub mod config;
pub mod controllers;
pub mod models;
pub mod redis_client;
pub mod services;

use std::sync::Arc;
use tracing::info;

use cache::{InMemoryJourneyCache, JourneyCache, RedisJourneyCache};
use carrier::RegioJetClient;
use config::{CacheBackend, ConfigError};
use services::JourneySearchService;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub search: JourneySearchService,
    pub config: config::Config,
}

impl AppState {
    /// Собирает кеш и клиента перевозчика по настройкам и связывает их в сервис поиска.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let cache: Arc<dyn JourneyCache> = match config.cache.backend {
            CacheBackend::Redis => {
                let url = config
                    .cache
                    .redis_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("REDIS_URL"))?;
                let redis = redis_client::RedisClient::new(url).await?;
                Arc::new(RedisJourneyCache::new(redis))
            }
            CacheBackend::Memory => {
                info!("Using in-process journey cache");
                Arc::new(InMemoryJourneyCache::new())
            }
        };

        let carrier = Arc::new(RegioJetClient::from_config(&config.carrier)?);
        let search = JourneySearchService::from_config(cache, carrier, &config.cache);

        Ok(Arc::new(Self { search, config }))
    }
}
