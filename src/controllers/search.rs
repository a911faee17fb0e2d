use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::models::{Journey, SearchInput};
use crate::services::SearchError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search_journeys))
}

// GET /api/search?origin=..&destination=..&departure=2024-06-01T08:00:00
#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub origin: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub destination: String,
    pub departure: NaiveDateTime,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl From<SearchQuery> for SearchInput {
    fn from(query: SearchQuery) -> Self {
        SearchInput::new(query.origin, query.destination, query.departure)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    success: bool,
    error: String,
}

fn to_api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiError { success: false, error: message.into() })).into_response()
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match self {
            SearchError::UpstreamRejected(_) => StatusCode::BAD_REQUEST,
            SearchError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        to_api_error(status, self.to_string())
    }
}

pub async fn search_journeys(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Journey>>, Response> {
    // Ошибки разбора параметров отдаем в том же формате, что и остальные
    let Query(params) = params.map_err(|e| to_api_error(StatusCode::BAD_REQUEST, e.body_text()))?;

    if let Err(e) = params.validate() {
        return Err(to_api_error(StatusCode::BAD_REQUEST, e.to_string()));
    }

    let input = SearchInput::from(params);
    match state.search.search(&input).await {
        Ok(journeys) => Ok(Json(journeys)),
        Err(e) => {
            tracing::error!("Search {} -> {} failed: {}", input.origin(), input.destination(), e);
            Err(e.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryJourneyCache;
    use crate::carrier::{CarrierAdapter, CarrierRequest, FetchError};
    use crate::config::{AppConfig, CacheConfig, CarrierConfig, Config};
    use crate::models::{Fare, TripRecord};
    use crate::services::JourneySearchService;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};

    struct StaticCarrier(Result<(), &'static str>);

    #[async_trait]
    impl CarrierAdapter for StaticCarrier {
        async fn fetch(&self, request: &CarrierRequest) -> Result<Vec<TripRecord>, FetchError> {
            match self.0 {
                Err("invalid date") => Err(FetchError::InvalidDate),
                Err(other) => Err(FetchError::UnexpectedResponse(other.to_string())),
                Ok(()) => Ok(vec![TripRecord {
                    departure_datetime: DateTime::parse_from_rfc3339("2024-06-01T08:00:00+02:00").unwrap(),
                    arrival_datetime: DateTime::parse_from_rfc3339("2024-06-01T10:30:00+02:00").unwrap(),
                    source: request.origin.clone(),
                    destination: request.destination.clone(),
                    vehicle_type: "BUS".to_string(),
                    free_seats: 2,
                    carrier: "REGIOJET".to_string(),
                    fare: Fare::price(9.0, "EUR"),
                }]),
            }
        }
    }

    fn state(carrier: StaticCarrier) -> Arc<AppState> {
        let config = Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                rust_log: "off".to_string(),
            },
            cache: CacheConfig::default(),
            carrier: CarrierConfig::default(),
        };
        let search = JourneySearchService::from_config(
            Arc::new(InMemoryJourneyCache::new()),
            Arc::new(carrier),
            &config.cache,
        );
        Arc::new(AppState { search, config })
    }

    fn query(origin: &str) -> Result<Query<SearchQuery>, QueryRejection> {
        Ok(Query(SearchQuery {
            origin: origin.to_string(),
            destination: "Brno".to_string(),
            departure: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }))
    }

    async fn error_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn returns_journeys_as_json() {
        let Json(journeys) = search_journeys(State(state(StaticCarrier(Ok(())))), query("Prague"))
            .await
            .unwrap();

        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].origin, "Prague");
    }

    #[tokio::test]
    async fn empty_origin_is_bad_request() {
        let response = search_journeys(State(state(StaticCarrier(Ok(())))), query(""))
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn whitespace_only_origin_is_bad_request() {
        let response = search_journeys(State(state(StaticCarrier(Ok(())))), query("   "))
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn malformed_departure_gets_json_error_body() {
        let uri: axum::http::Uri = "/search?origin=Prague&destination=Brno&departure=tomorrow"
            .parse()
            .unwrap();
        let params = Query::<SearchQuery>::try_from_uri(&uri);
        assert!(params.is_err());

        let response = search_journeys(State(state(StaticCarrier(Ok(())))), params)
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Failed to deserialize"));
    }

    #[tokio::test]
    async fn carrier_rejection_is_bad_request() {
        let response = search_journeys(State(state(StaticCarrier(Err("invalid date")))), query("Prague"))
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn carrier_outage_is_bad_gateway() {
        let response = search_journeys(State(state(StaticCarrier(Err("timeout")))), query("Prague"))
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
