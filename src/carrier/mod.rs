//! Адаптеры перевозчиков.
//!
//! Оркестратор поиска знает только о трейте [`CarrierAdapter`]: адаптер
//! получает нормализованный запрос и возвращает сырые записи рейсов
//! ([`TripRecord`]) либо [`FetchError`].

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{SearchInput, TripRecord};

pub mod regiojet;

pub use regiojet::RegioJetClient;

/// Запрос к перевозчику: названия городов без лишних пробелов и дата отправления.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierRequest {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

impl From<&SearchInput> for CarrierRequest {
    fn from(input: &SearchInput) -> Self {
        CarrierRequest {
            origin: input.origin().trim().to_string(),
            destination: input.destination().trim().to_string(),
            date: input.departure().date(),
        }
    }
}

/// Ошибки получения данных от перевозчика.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid departure date")]
    InvalidDate,

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("no routes in carrier response")]
    NoRoutes,

    #[error("carrier rejected the request: {0}")]
    Rejected(String),

    #[error("carrier responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("carrier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected carrier response: {0}")]
    UnexpectedResponse(String),
}

impl FetchError {
    /// `true`, если перевозчик отверг сам запрос; `false` для сетевых сбоев и мусора в ответе.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidDate
                | FetchError::UnknownLocation(_)
                | FetchError::NoRoutes
                | FetchError::Rejected(_)
        )
    }
}

#[async_trait]
pub trait CarrierAdapter: Send + Sync {
    async fn fetch(&self, request: &CarrierRequest) -> Result<Vec<TripRecord>, FetchError>;
}
