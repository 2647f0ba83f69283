//! The territory providers.

mod fixed;
mod geo_api;

pub use fixed::FixedProvider;
pub use geo_api::GeoApiProvider;
