// CTA Bus Tracker predictions.
//
// Endpoint: https://www.ctabustracker.com/bustime/api/v2/getpredictions
//   ?key=..&stpid=<stop>&format=json
// Response: {"bustime-response": {"prd": [{"rt": "2", "des": "Hyde Park", "prdctdn": "DUE"}, ...]}}

use log::{debug, warn};
use serde_json::Value;

use crate::config::{self, BusStop, Config};
use crate::error::{BoardError, Result};
use crate::models::Arrival;
use crate::upstream::Upstream;

/// How a countdown string from the tracker reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Minutes(u32),
    /// Delayed with no estimate; not shown at all.
    Delayed,
}

pub fn parse_countdown(raw: &str) -> Option<Countdown> {
    match raw.trim() {
        "DUE" => Some(Countdown::Minutes(0)),
        "DLY" => Some(Countdown::Delayed),
        other => other.parse::<u32>().ok().map(Countdown::Minutes),
    }
}

/// Predictions for accepted routes at every configured stop, in stop order.
pub fn fetch_bus_arrivals(upstream: &dyn Upstream, config: &Config) -> Vec<Arrival> {
    let api_key = match config::require(&config.bus_api_key, "CTA_BUS_API_KEY") {
        Ok(key) => key,
        Err(e) => {
            warn!("⚠️  Skipping bus arrivals: {}", e);
            return Vec::new();
        }
    };

    let mut arrivals = Vec::new();

    for stop in &config.bus_stops {
        let result = upstream
            .get_json(
                config::BUS_PREDICTIONS_URL,
                &[("key", api_key), ("stpid", stop.id.as_str()), ("format", "json")],
            )
            .and_then(|json| parse_stop_predictions(&json, stop));

        match result {
            Ok(found) => {
                debug!("🚌 {} ({}): {} predictions", stop.name, stop.id, found.len());
                arrivals.extend(found);
            }
            Err(e) => warn!("⚠️  Could not fetch bus predictions for {} ({})", stop.name, e),
        }
    }

    arrivals
}

pub fn parse_stop_predictions(json: &Value, stop: &BusStop) -> Result<Vec<Arrival>> {
    let Some(response) = json.get("bustime-response") else {
        return Ok(Vec::new());
    };

    let predictions = match response.get("prd") {
        Some(Value::Array(predictions)) => predictions,
        Some(_) => return Err(BoardError::MalformedResponse("prd is not a list".to_string())),
        None => {
            if let Some(errors) = response.get("error") {
                debug!("Bus tracker reported for stop {}: {}", stop.id, errors);
            }
            return Ok(Vec::new());
        }
    };

    let arrivals = predictions
        .iter()
        .filter_map(|prediction| {
            let route = prediction["rt"].as_str()?;
            if !stop.routes.iter().any(|accepted| accepted == route) {
                return None;
            }

            let destination = prediction["des"].as_str().unwrap_or_default();
            let raw = prediction["prdctdn"].as_str().unwrap_or_default();

            match parse_countdown(raw) {
                Some(Countdown::Minutes(minutes)) => Some(Arrival::bus(route, &stop.name, destination, minutes)),
                Some(Countdown::Delayed) => None,
                None => {
                    warn!("⚠️  Skipping bus prediction with countdown {:?}", raw);
                    None
                }
            }
        })
        .collect();

    Ok(arrivals)
}
