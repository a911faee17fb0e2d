//! regiojet.rs
//!
//! Клиент публичного API RegioJet.
//!
//! 1.  **Справочник городов**: загружается один раз на экземпляр клиента и
//!     индексируется по slug названия и всех его синонимов, поэтому поиск
//!     не зависит от регистра и диакритики.
//! 2.  **Поиск маршрутов**: `routes/search/simple` на одну дату, цены в валюте
//!     из настроек (заголовок `X-Currency`).
//! 3.  **Разбор ответа**: ошибки перевозчика превращаются в [`FetchError`],
//!     маршруты в [`TripRecord`].

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{CarrierAdapter, CarrierRequest, FetchError};
use crate::cache::key::slugify_location;
use crate::config::CarrierConfig;
use crate::models::{Fare, TripRecord};

pub const CARRIER_NAME: &str = "REGIOJET";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

// --- Модели данных API перевозчика ---

/// Страна из справочника `consts/locations`.
#[derive(Debug, Deserialize)]
struct Country {
    #[serde(default)]
    cities: Vec<City>,
}

#[derive(Debug, Deserialize)]
struct City {
    id: u64,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Ответ `routes/search/simple`. При ошибке перевозчик присылает `message` вместо маршрутов.
#[derive(Debug, Deserialize)]
struct RouteSearchResponse {
    #[serde(default)]
    routes: Option<Vec<Route>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Route {
    departure_time: String,
    arrival_time: String,
    #[serde(default)]
    vehicle_types: Vec<String>,
    free_seats_count: u32,
    #[serde(default)]
    price_from: Option<f64>,
    bookable: bool,
}

/// Клиент для поиска рейсов RegioJet.
pub struct RegioJetClient {
    http_client: reqwest::Client,
    base_url: String,
    currency: String,
    locale: String,
    /// Slug названия или синонима города -> id города.
    locations: OnceCell<HashMap<String, u64>>,
}

impl RegioJetClient {
    /// Создает клиент с таймаутом HTTP-запросов из настроек.
    pub fn from_config(config: &CarrierConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self::with_client(http_client, config))
    }

    pub fn with_client(http_client: reqwest::Client, config: &CarrierConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            locale: config.locale.clone(),
            locations: OnceCell::new(),
        }
    }

    async fn locations(&self) -> Result<&HashMap<String, u64>, FetchError> {
        self.locations
            .get_or_try_init(|| self.load_locations())
            .await
    }

    async fn load_locations(&self) -> Result<HashMap<String, u64>, FetchError> {
        let url = format!("{}/consts/locations", self.base_url);
        let text = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let countries: Vec<Country> = serde_json::from_str(&text)
            .map_err(|e| FetchError::UnexpectedResponse(format!("locations: {}", e)))?;

        let locations = index_locations(countries);
        info!("Loaded {} RegioJet location names", locations.len());
        Ok(locations)
    }

    async fn search_routes(
        &self,
        from_id: u64,
        to_id: u64,
        date: NaiveDate,
    ) -> Result<RouteSearchResponse, FetchError> {
        let url = format!("{}/routes/search/simple", self.base_url);
        let params = [
            ("departureDate", date.format("%Y-%m-%d").to_string()),
            ("fromLocationId", from_id.to_string()),
            ("fromLocationType", "CITY".to_string()),
            ("locale", self.locale.clone()),
            ("tariffs", "REGULAR".to_string()),
            ("toLocationId", to_id.to_string()),
            ("toLocationType", "CITY".to_string()),
        ];

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .header("X-Currency", &self.currency)
            .send()
            .await?;

        // Ошибки валидации приходят с кодом 4xx и телом с `message`, их разбираем дальше.
        // 5xx означает сбой на стороне перевозчика, что бы ни было в теле.
        let status = response.status();
        if status.is_server_error() {
            return Err(FetchError::Status(status));
        }

        let text = response.text().await?;

        serde_json::from_str(&text)
            .map_err(|e| FetchError::UnexpectedResponse(format!("route search: {}", e)))
    }
}

fn index_locations(countries: Vec<Country>) -> HashMap<String, u64> {
    let mut locations = HashMap::new();
    for city in countries.into_iter().flat_map(|country| country.cities) {
        for name in std::iter::once(&city.name).chain(city.aliases.iter()) {
            let slug = slugify_location(name);
            if !slug.is_empty() {
                locations.insert(slug, city.id);
            }
        }
    }
    locations
}

fn resolve_location(locations: &HashMap<String, u64>, name: &str) -> Result<u64, FetchError> {
    locations
        .get(&slugify_location(name))
        .copied()
        .ok_or_else(|| FetchError::UnknownLocation(name.to_string()))
}

/// Проверяет ответ перевозчика и достает из него маршруты.
fn check_response(response: RouteSearchResponse) -> Result<Vec<Route>, FetchError> {
    if let Some(message) = response.message {
        if message.contains("departureDate.invalid") || message.contains("arrivalDate.invalid") {
            return Err(FetchError::InvalidDate);
        }
        return Err(FetchError::Rejected(message));
    }

    match response.routes {
        Some(routes) if !routes.is_empty() => Ok(routes),
        _ => Err(FetchError::NoRoutes),
    }
}

fn parse_time(value: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    DateTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|e| FetchError::UnexpectedResponse(format!("bad timestamp '{}': {}", value, e)))
}

fn parse_route(route: Route, request: &CarrierRequest, currency: &str) -> Result<TripRecord, FetchError> {
    let vehicle_type = route
        .vehicle_types
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::UnexpectedResponse("route without vehicle type".to_string()))?;

    let fare = if !route.bookable {
        Fare::SoldOut
    } else {
        let amount = route
            .price_from
            .ok_or_else(|| FetchError::UnexpectedResponse("bookable route without price".to_string()))?;
        Fare::price(amount, currency)
    };

    Ok(TripRecord {
        departure_datetime: parse_time(&route.departure_time)?,
        arrival_datetime: parse_time(&route.arrival_time)?,
        source: request.origin.clone(),
        destination: request.destination.clone(),
        vehicle_type,
        free_seats: route.free_seats_count,
        carrier: CARRIER_NAME.to_string(),
        fare,
    })
}

#[async_trait]
impl CarrierAdapter for RegioJetClient {
    async fn fetch(&self, request: &CarrierRequest) -> Result<Vec<TripRecord>, FetchError> {
        let locations = self.locations().await?;
        let from_id = resolve_location(locations, &request.origin)?;
        let to_id = resolve_location(locations, &request.destination)?;

        debug!(
            "Searching RegioJet routes {} ({}) -> {} ({}) on {}",
            request.origin, from_id, request.destination, to_id, request.date
        );

        let response = self.search_routes(from_id, to_id, request.date).await?;
        let routes = check_response(response)?;

        routes
            .into_iter()
            .map(|route| parse_route(route, request, &self.currency))
            .collect()
    }
}
