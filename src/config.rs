// Board configuration: credentials from the environment, station tables fixed.

use log::warn;
use std::env;

use crate::error::{BoardError, Result};

pub const RAIL_ARRIVALS_URL: &str = "https://lapi.transitchicago.com/api/1.0/ttarrivals.aspx";
pub const COMMUTER_FEED_URL: &str = "https://gtfspublic.metrarr.com/gtfs/public/tripupdates";
pub const BUS_PREDICTIONS_URL: &str = "https://www.ctabustracker.com/bustime/api/v2/getpredictions";
pub const WEATHER_URL: &str = "https://www.meteosource.com/api/v1/free/point";

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusStop {
    pub id: String,
    pub name: String,
    pub routes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommuterFilter {
    pub route_id: String,
    pub stop_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rail_api_key: Option<String>,
    pub bus_api_key: Option<String>,
    pub commuter_api_token: Option<String>,
    pub weather_api_key: Option<String>,
    pub weather_place: String,
    /// Iteration order is fetch order, which breaks ties between equal times.
    pub rail_stations: Vec<Station>,
    pub bus_stops: Vec<BusStop>,
    pub commuter: CommuterFilter,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rail_api_key: None,
            bus_api_key: None,
            commuter_api_token: None,
            weather_api_key: None,
            weather_place: "chicago".to_string(),
            rail_stations: vec![
                station("40380", "Clark/Lake"),
                station("41700", "Washington/Wabash"),
                station("41660", "Lake"),
            ],
            bus_stops: vec![BusStop {
                id: "1423".to_string(),
                name: "State & Lake".to_string(),
                routes: vec!["2".to_string()],
            }],
            commuter: CommuterFilter {
                route_id: "ME".to_string(),
                stop_id: "MILLENNIUM".to_string(),
            },
            bind_addr: DEFAULT_BIND.to_string(),
        }
    }
}

fn station(id: &str, name: &str) -> Station {
    Station {
        id: id.to_string(),
        name: name.to_string(),
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                warn!("⚠️  {} is not set, that source will show no data", name);
            }
            value
        };

        Config {
            rail_api_key: read("CTA_API_KEY"),
            bus_api_key: read("CTA_BUS_API_KEY"),
            commuter_api_token: read("METRA_API_TOKEN"),
            weather_api_key: read("METEOSOURCE_API_KEY"),
            bind_addr: lookup("BOARD_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            ..Config::default()
        }
    }

    /// Short label drawn on the LED board for the bus row, e.g. `#2`.
    pub fn bus_label(&self) -> String {
        self.bus_stops
            .first()
            .and_then(|stop| stop.routes.first())
            .map(|route| format!("#{}", route))
            .unwrap_or_else(|| "#".to_string())
    }
}

pub fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    value.as_deref().ok_or(BoardError::MissingCredential(name))
}
