pub mod journey;

pub use journey::{Fare, Journey, Price, SearchInput, TripRecord, SOLD_OUT};
