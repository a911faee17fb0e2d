pub mod search;

pub use search::{JourneySearchService, SearchError};
