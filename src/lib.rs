pub mod cli;
pub mod clients;
pub mod codec;
pub mod config;
pub mod coordinates;
pub mod distance;
pub mod error;
pub mod fetcher;
pub mod geocoder;
pub mod ingest;
pub mod input;
pub mod job;
pub mod last_file;
pub mod metadata;
pub mod pool;
pub mod processor;
pub mod store;
pub mod walker;

pub use config::AppConfig;
pub use coordinates::{to_decimal_degrees, Coordinate};
pub use error::{AppError, CoordinateError, ItemError};
pub use metadata::{Extraction, Marker};
pub use pool::{FetchPool, ItemOutcome, ItemReport};
pub use store::{AddOutcome, DuplicatePolicy, MarkerStore, PendingDuplicate, Resolution, StoreHandle};
