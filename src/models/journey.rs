use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Маркер распроданного рейса в сериализованном виде.
pub const SOLD_OUT: &str = "sold_out";

/// Параметры поиска: откуда, куда и когда.
///
/// После создания не меняется, поэтому поля закрыты и доступны только на чтение.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchInput {
    origin: String,
    destination: String,
    departure: NaiveDateTime,
}

impl SearchInput {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: NaiveDateTime,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.departure
    }
}

/// Цена билета в валюте поиска.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// Тариф рейса: либо конкретная цена, либо "распродано".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FareRepr", into = "FareRepr")]
pub enum Fare {
    Price(Price),
    SoldOut,
}

impl Fare {
    pub fn price(amount: f64, currency: impl Into<String>) -> Self {
        Fare::Price(Price {
            amount,
            currency: currency.into(),
        })
    }

    pub fn is_sold_out(&self) -> bool {
        matches!(self, Fare::SoldOut)
    }
}

// Формат на проводе: объект {"amount", "currency"} или строка "sold_out".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FareRepr {
    Price(Price),
    Marker(String),
}

impl TryFrom<FareRepr> for Fare {
    type Error = String;

    fn try_from(repr: FareRepr) -> Result<Self, Self::Error> {
        match repr {
            FareRepr::Price(price) => Ok(Fare::Price(price)),
            FareRepr::Marker(marker) if marker == SOLD_OUT => Ok(Fare::SoldOut),
            FareRepr::Marker(other) => Err(format!("unknown fare marker: {}", other)),
        }
    }
}

impl From<Fare> for FareRepr {
    fn from(fare: Fare) -> Self {
        match fare {
            Fare::Price(price) => FareRepr::Price(price),
            Fare::SoldOut => FareRepr::Marker(SOLD_OUT.to_string()),
        }
    }
}

/// Найденный рейс в том виде, в котором он отдаётся клиенту и хранится в кеше.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<FixedOffset>,
    pub arrival: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub free_seats: u32,
    pub carrier: String,
    pub fare: Fare,
}

/// Сырая запись рейса, которую возвращает адаптер перевозчика.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub departure_datetime: DateTime<FixedOffset>,
    pub arrival_datetime: DateTime<FixedOffset>,
    pub source: String,
    pub destination: String,
    pub vehicle_type: String,
    pub free_seats: u32,
    pub carrier: String,
    pub fare: Fare,
}

// Только переименование полей, никакой логики.
impl From<TripRecord> for Journey {
    fn from(record: TripRecord) -> Self {
        Journey {
            origin: record.source,
            destination: record.destination,
            departure: record.departure_datetime,
            arrival: record.arrival_datetime,
            vehicle_type: record.vehicle_type,
            free_seats: record.free_seats,
            carrier: record.carrier,
            fare: record.fare,
        }
    }
}
