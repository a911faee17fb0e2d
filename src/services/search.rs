//! search.rs
//!
//! Поиск рейсов по схеме cache-aside.
//!
//! 1.  По параметрам поиска строится ключ кеша.
//! 2.  Если в кеше есть корректная запись, она возвращается без обращения к перевозчику.
//!     Закешированный пустой список тоже считается попаданием.
//! 3.  Иначе (нет записи, кеш недоступен, данные испорчены) запрашиваем перевозчика,
//!     сохраняем результат с фиксированным TTL и возвращаем его.
//!
//! Кеш здесь только оптимизация: ошибки чтения и записи логируются и не
//! влияют на результат. Ошибки перевозчика, наоборот, отдаются вызывающему
//! и не кешируются. Повторов и блокировок нет: два одновременных промаха по
//! одному ключу оба сходят к перевозчику, последняя запись побеждает.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{decode_journeys, derive_key, encode_journeys, JourneyCache};
use crate::carrier::{CarrierAdapter, CarrierRequest, FetchError};
use crate::config::CacheConfig;
use crate::models::{Journey, SearchInput};

/// Ошибка поиска, которую видит клиент.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Перевозчик отверг запрос: неверная дата, неизвестный город, нет маршрутов.
    #[error("search rejected by carrier: {0}")]
    UpstreamRejected(#[source] FetchError),

    /// Перевозчик недоступен или прислал непонятный ответ.
    #[error("carrier unavailable: {0}")]
    UpstreamUnavailable(#[source] FetchError),
}

impl From<FetchError> for SearchError {
    fn from(err: FetchError) -> Self {
        if err.is_rejection() {
            SearchError::UpstreamRejected(err)
        } else {
            SearchError::UpstreamUnavailable(err)
        }
    }
}

/// Сервис поиска рейсов с кешем. Зависимости передаются при создании.
#[derive(Clone)]
pub struct JourneySearchService {
    cache: Arc<dyn JourneyCache>,
    carrier: Arc<dyn CarrierAdapter>,
    namespace: String,
    ttl: Duration,
}

impl JourneySearchService {
    pub fn new(
        cache: Arc<dyn JourneyCache>,
        carrier: Arc<dyn CarrierAdapter>,
        namespace: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            carrier,
            namespace: namespace.into(),
            ttl,
        }
    }

    pub fn from_config(
        cache: Arc<dyn JourneyCache>,
        carrier: Arc<dyn CarrierAdapter>,
        config: &CacheConfig,
    ) -> Self {
        Self::new(cache, carrier, config.namespace.clone(), config.ttl())
    }

    pub fn cache_key(&self, input: &SearchInput) -> String {
        derive_key(&self.namespace, input)
    }

    /// Ищет рейсы: сначала в кеше, при промахе у перевозчика.
    pub async fn search(&self, input: &SearchInput) -> Result<Vec<Journey>, SearchError> {
        let key = self.cache_key(input);

        if let Some(journeys) = self.lookup(&key).await {
            debug!("Cache hit for {} ({} journeys)", key, journeys.len());
            return Ok(journeys);
        }

        debug!("Cache miss for {}, querying carrier", key);
        let request = CarrierRequest::from(input);
        let records = self.carrier.fetch(&request).await.map_err(|e| {
            warn!("Carrier fetch failed for {}: {}", key, e);
            SearchError::from(e)
        })?;

        let journeys: Vec<Journey> = records.into_iter().map(Journey::from).collect();
        info!("Fetched {} journeys for {}", journeys.len(), key);

        self.store(&key, &journeys).await;
        Ok(journeys)
    }

    // Чтение из кеша; недоступный кеш и испорченные данные равносильны промаху
    async fn lookup(&self, key: &str) -> Option<Vec<Journey>> {
        let payload = match self.cache.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}, treating as miss: {}", key, e);
                return None;
            }
        };

        match decode_journeys(&payload) {
            Ok(journeys) => Some(journeys),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    // Запись best-effort: ошибка только логируется
    async fn store(&self, key: &str, journeys: &[Journey]) {
        let payload = match encode_journeys(journeys) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize journeys for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(key, &payload, self.ttl).await {
            warn!("Failed to cache journeys for {}: {}", key, e);
        }
    }
}
