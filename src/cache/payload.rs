//! Формат данных, которые лежат в кеше под ключом поиска.
//!
//! Текущая версия (1) оборачивает список рейсов в конверт с номером схемы:
//! `{"version": 1, "journeys": [...]}`. Ранние развёртывания писали просто
//! массив рейсов, он читается как версия 0.
//!
//! Пустой список рейсов и испорченные данные различаются: первое это
//! `Ok(vec![])`, второе это `Err(PayloadError)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::Journey;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed cache payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported cache payload version {0}")]
    UnsupportedVersion(u64),

    #[error("cache payload is neither an envelope nor a journey list")]
    UnexpectedShape,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    journeys: &'a [Journey],
}

#[derive(Deserialize)]
struct Envelope {
    journeys: Vec<Journey>,
}

/// Сериализует рейсы в текущую версию формата.
pub fn encode_journeys(journeys: &[Journey]) -> Result<String, PayloadError> {
    let envelope = EnvelopeRef {
        version: SCHEMA_VERSION,
        journeys,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Читает рейсы из кеша. Любая ошибка означает, что запись надо считать промахом.
pub fn decode_journeys(payload: &str) -> Result<Vec<Journey>, PayloadError> {
    let value: Value = serde_json::from_str(payload)?;

    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(ref fields) => {
            let version = fields
                .get("version")
                .and_then(Value::as_u64)
                .ok_or(PayloadError::UnexpectedShape)?;
            if version != u64::from(SCHEMA_VERSION) {
                return Err(PayloadError::UnsupportedVersion(version));
            }
            let envelope: Envelope = serde_json::from_value(value)?;
            Ok(envelope.journeys)
        }
        _ => Err(PayloadError::UnexpectedShape),
    }
}
