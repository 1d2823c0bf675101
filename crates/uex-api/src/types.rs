//! Types for the UEX API

use serde::Serialize;
use serde_json::Value;

/// Query parameters in the order they were supplied
pub type QueryParams = Vec<(String, String)>;

/// How a response body is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
}

/// Decoded upstream response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// JSON form used for caching (text becomes a JSON string)
    pub fn into_value(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }

    /// Rebuild a payload from its cached JSON form. Text responses must have
    /// been cached as a JSON string; anything else is rejected.
    pub fn from_value(format: ResponseFormat, value: Value) -> Option<Self> {
        match format {
            ResponseFormat::Json => Some(Payload::Json(value)),
            ResponseFormat::Text => match value {
                Value::String(text) => Some(Payload::Text(text)),
                _ => None,
            },
        }
    }
}

/// Fixed UEX API paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DataExtract,
    Commodities,
    CommoditiesPrices,
    CommoditiesPricesAll,
    CommoditiesRawPricesAll,
    Cities,
    Terminals,
    Planets,
    Moons,
    Orbits,
    SpaceStations,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::DataExtract => "data_extract",
            Endpoint::Commodities => "commodities",
            Endpoint::CommoditiesPrices => "commodities_prices",
            Endpoint::CommoditiesPricesAll => "commodities_prices_all",
            Endpoint::CommoditiesRawPricesAll => "commodities_raw_prices_all",
            Endpoint::Cities => "cities",
            Endpoint::Terminals => "terminals",
            Endpoint::Planets => "planets",
            Endpoint::Moons => "moons",
            Endpoint::Orbits => "orbits",
            Endpoint::SpaceStations => "space_stations",
        }
    }

    /// The data extract is served as plain text; everything else is JSON
    pub fn format(&self) -> ResponseFormat {
        match self {
            Endpoint::DataExtract => ResponseFormat::Text,
            _ => ResponseFormat::Json,
        }
    }
}
