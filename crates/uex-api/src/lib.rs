//! Rust client for the UEX trading-data API
//!
//! UEX publishes commodity prices, terminal locations and star-system
//! geography for the Star Citizen trading community. Every endpoint is a
//! read-only `GET` parameterized through the query string.
//!
//! # Example
//!
//! ```no_run
//! use uex_api::{Endpoint, UexClient, Upstream};
//!
//! # async fn example() -> Result<(), uex_api::UpstreamError> {
//! let client = UexClient::new();
//! let url = client.endpoint_url(Endpoint::Cities);
//! let query = vec![("id_star_system".to_string(), "68".to_string())];
//! let cities = client.get(&url, &query, Endpoint::Cities.format()).await?;
//! println!("{:?}", cities);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - `GET /commodities`, `/commodities_prices`, `/commodities_prices_all`,
//!   `/commodities_raw_prices_all`
//! - `GET /cities`, `/terminals`, `/planets`, `/moons`, `/orbits`, `/space_stations`
//! - `GET /data_extract` (plain-text body)

mod client;
mod error;
mod types;

pub use client::{encode_query, UexClient, Upstream};
pub use error::{Result, UpstreamError};
pub use types::{Endpoint, Payload, QueryParams, ResponseFormat};
