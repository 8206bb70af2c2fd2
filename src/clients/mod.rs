pub mod http;
pub mod nominatim;
