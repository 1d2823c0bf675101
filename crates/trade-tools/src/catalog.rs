//! The standard UEX tool catalogue

use std::sync::Arc;

use uex_api::Endpoint;

use crate::proxy::CachedFetchProxy;
use crate::schema::{ParameterKind, ToolDescriptor};
use crate::tool::UexQueryTool;

fn tool(
    proxy: &Arc<CachedFetchProxy>,
    base_url: &str,
    endpoint: Endpoint,
    descriptor: ToolDescriptor,
) -> UexQueryTool {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), endpoint.path());
    UexQueryTool::new(descriptor, url, endpoint.format(), proxy.clone())
}

/// Build every UEX-backed tool against `base_url`
pub fn uex_tools(proxy: Arc<CachedFetchProxy>, base_url: &str) -> Vec<UexQueryTool> {
    let p = &proxy;
    vec![
        tool(
            p,
            base_url,
            Endpoint::DataExtract,
            ToolDescriptor::new(
                "data_extract",
                "Obtain the top 30 commodities routes according to UEX. All values are estimated.",
            ),
        )
        .with_fixed_query("data", "commodities_routes"),
        tool(
            p,
            base_url,
            Endpoint::Commodities,
            ToolDescriptor::new(
                "get_commodities",
                "Fetch a list of all commodities including specifics like legality and market price.",
            ),
        ),
        tool(
            p,
            base_url,
            Endpoint::CommoditiesPricesAll,
            ToolDescriptor::new(
                "get_commodities_prices_all",
                "Fetch a list of all commodity prices and their terminal availability. USE AS A LAST RESORT.",
            ),
        ),
        tool(
            p,
            base_url,
            Endpoint::CommoditiesRawPricesAll,
            ToolDescriptor::new(
                "get_commodities_raw_prices_all",
                "Fetch a list of all raw commodity prices and their terminal availability.",
            ),
        ),
        tool(
            p,
            base_url,
            Endpoint::Terminals,
            ToolDescriptor::new(
                "get_all_terminals",
                "Fetch a list of all terminal information to help plan trade routes or find locations to sell.",
            ),
        ),
        tool(
            p,
            base_url,
            Endpoint::CommoditiesPrices,
            ToolDescriptor::new(
                "get_commodity_prices",
                "Fetch specific commodity prices using query parameters.",
            )
            .param("id_terminal", ParameterKind::String, "Comma-separated terminal IDs.")
            .param("id_commodity", ParameterKind::Integer, "Commodity ID.")
            .param("terminal_name", ParameterKind::String, "Terminal name.")
            .param("commodity_name", ParameterKind::String, "Commodity name.")
            .param("terminal_code", ParameterKind::String, "Terminal code.")
            .param("commodity_code", ParameterKind::String, "Commodity code."),
        ),
        tool(
            p,
            base_url,
            Endpoint::Cities,
            ToolDescriptor::new("get_cities", "Fetch a list of cities with optional filters.")
                .param("id_star_system", ParameterKind::Integer, "Star system ID.")
                .param("id_planet", ParameterKind::Integer, "Planet ID.")
                .param("id_orbit", ParameterKind::Integer, "Orbit ID.")
                .param("id_moon", ParameterKind::Integer, "Moon ID."),
        ),
        tool(
            p,
            base_url,
            Endpoint::Terminals,
            ToolDescriptor::new("get_terminals", "Fetch terminals using query parameters.")
                .param("id_star_system", ParameterKind::Integer, "Star system ID.")
                .param("id_planet", ParameterKind::Integer, "Planet ID.")
                .param("name", ParameterKind::String, "Terminal name."),
        ),
        tool(
            p,
            base_url,
            Endpoint::Planets,
            ToolDescriptor::new("get_planets", "Fetch planets with optional filters.")
                .param("id_star_system", ParameterKind::Integer, "Star system ID.")
                .param("id_faction", ParameterKind::Integer, "Faction ID.")
                .param("id_jurisdiction", ParameterKind::Integer, "Jurisdiction ID.")
                .param("is_lagrange", ParameterKind::Integer, "Filter for Lagrange points."),
        ),
        tool(
            p,
            base_url,
            Endpoint::Moons,
            ToolDescriptor::new("get_moons", "Fetch moons using query parameters.")
                .param("id_star_system", ParameterKind::Integer, "Star system ID.")
                .param("id_planet", ParameterKind::Integer, "Planet ID.")
                .param("id_faction", ParameterKind::Integer, "Faction ID.")
                .param("id_jurisdiction", ParameterKind::Integer, "Jurisdiction ID."),
        ),
        tool(
            p,
            base_url,
            Endpoint::Orbits,
            ToolDescriptor::new("get_orbits", "Fetch orbit data using query parameters.")
                .param("id_star_system", ParameterKind::Integer, "Star system ID.")
                .param("id_faction", ParameterKind::Integer, "Faction ID.")
                .param("id_jurisdiction", ParameterKind::Integer, "Jurisdiction ID.")
                .param("is_lagrange", ParameterKind::Integer, "Filter for Lagrange points."),
        ),
        tool(
            p,
            base_url,
            Endpoint::SpaceStations,
            ToolDescriptor::new(
                "get_space_stations",
                "Fetch space station data using query parameters.",
            )
            .param("id_star_system", ParameterKind::Integer, "Star system ID.")
            .param("id_planet", ParameterKind::Integer, "Planet ID.")
            .param("id_orbit", ParameterKind::Integer, "Orbit ID.")
            .param("id_moon", ParameterKind::Integer, "Moon ID.")
            .param("id_city", ParameterKind::Integer, "City ID.")
            .param("id_faction", ParameterKind::Integer, "Faction ID.")
            .param("id_jurisdiction", ParameterKind::Integer, "Jurisdiction ID."),
        ),
    ]
}
