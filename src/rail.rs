// CTA 'L' train arrivals (Train Tracker API, JSON output).
//
// Endpoint: https://lapi.transitchicago.com/api/1.0/ttarrivals.aspx
//   ?key=..&mapid=<station>&max=20&outputType=JSON
// Response: {"ctatt": {"eta": [{"arrT": "2025-01-15T08:05:00", "rt": "G", "destNm": "Harlem"}, ...]}}

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use log::{debug, warn};
use serde_json::Value;

use crate::clock::{self, Clock};
use crate::config::{self, Config, Station};
use crate::error::{BoardError, Result};
use crate::models::Arrival;
use crate::upstream::Upstream;

const MAX_RESULTS: &str = "20";
const ARRIVAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Arrivals for every configured station, in station order.
/// A station that fails is logged and skipped.
pub fn fetch_rail_arrivals(upstream: &dyn Upstream, config: &Config, clock: &dyn Clock) -> Vec<Arrival> {
    let api_key = match config::require(&config.rail_api_key, "CTA_API_KEY") {
        Ok(key) => key,
        Err(e) => {
            warn!("⚠️  Skipping rail arrivals: {}", e);
            return Vec::new();
        }
    };

    let now = clock.now();
    let mut arrivals = Vec::new();

    for station in &config.rail_stations {
        match fetch_station(upstream, api_key, station, now) {
            Ok(found) => {
                debug!("🚇 {} ({}): {} arrivals", station.name, station.id, found.len());
                arrivals.extend(found);
            }
            Err(e) => warn!("⚠️  Could not fetch rail arrivals for {} ({})", station.name, e),
        }
    }

    arrivals
}

fn fetch_station(upstream: &dyn Upstream, api_key: &str, station: &Station, now: DateTime<Tz>) -> Result<Vec<Arrival>> {
    let json = upstream.get_json(
        config::RAIL_ARRIVALS_URL,
        &[
            ("key", api_key),
            ("mapid", station.id.as_str()),
            ("max", MAX_RESULTS),
            ("outputType", "JSON"),
        ],
    )?;

    parse_station_arrivals(&json, &station.name, now)
}

/// Convert one station's response. A missing `ctatt` envelope is malformed;
/// a missing `eta` list just means nothing is scheduled.
pub fn parse_station_arrivals(json: &Value, station_name: &str, now: DateTime<Tz>) -> Result<Vec<Arrival>> {
    let envelope = json
        .get("ctatt")
        .ok_or_else(|| BoardError::MalformedResponse("Missing ctatt envelope".to_string()))?;

    let etas = match envelope.get("eta") {
        Some(Value::Array(etas)) => etas,
        Some(_) => return Err(BoardError::MalformedResponse("eta is not a list".to_string())),
        None => return Ok(Vec::new()),
    };

    let arrivals = etas
        .iter()
        .filter_map(|eta| {
            let (Some(arr_t), Some(route), Some(destination)) = (
                eta["arrT"].as_str(),
                eta["rt"].as_str(),
                eta["destNm"].as_str(),
            ) else {
                warn!("⚠️  Skipping incomplete rail prediction at {}", station_name);
                return None;
            };

            let Some(arrival_time) = parse_arrival_time(arr_t) else {
                warn!("⚠️  Skipping rail prediction with bad arrT {:?}", arr_t);
                return None;
            };

            let minutes = clock::minutes_away(arrival_time, now)?;
            Some(Arrival::rail(route, station_name, destination, minutes))
        })
        .collect();

    Ok(arrivals)
}

fn parse_arrival_time(arr_t: &str) -> Option<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(arr_t, ARRIVAL_TIME_FORMAT).ok()?;
    clock::localize(naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, CITY_TZ};
    use crate::upstream::fake::FakeUpstream;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Tz> {
        CITY_TZ.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap()
    }

    fn keyed_config() -> Config {
        Config {
            rail_api_key: Some("key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn converts_eta_entries() {
        let body = json!({"ctatt": {"eta": [
            {"arrT": "2025-01-15T08:05:00", "rt": "G", "destNm": "Harlem"},
            {"arrT": "2025-01-15T08:12:20", "rt": "Brn", "destNm": "Kimball"}
        ]}});

        let arrivals = parse_station_arrivals(&body, "Clark/Lake", now()).unwrap();

        assert_eq!(
            arrivals,
            vec![
                Arrival::rail("G", "Clark/Lake", "Harlem", 5),
                Arrival::rail("Brn", "Clark/Lake", "Kimball", 12),
            ]
        );
    }

    #[test]
    fn drops_departed_trains() {
        let body = json!({"ctatt": {"eta": [
            {"arrT": "2025-01-15T07:58:00", "rt": "G", "destNm": "Harlem"},
            {"arrT": "2025-01-15T08:00:10", "rt": "G", "destNm": "Harlem"}
        ]}});

        let arrivals = parse_station_arrivals(&body, "Lake", now()).unwrap();

        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].minutes_until_arrival, 0);
    }

    #[test]
    fn missing_eta_is_empty_and_missing_envelope_is_malformed() {
        let empty = parse_station_arrivals(&json!({"ctatt": {"errCd": "0"}}), "Lake", now());
        assert_eq!(empty, Ok(Vec::new()));

        let malformed = parse_station_arrivals(&json!({"error": "bad key"}), "Lake", now());
        assert!(matches!(malformed, Err(BoardError::MalformedResponse(_))));
    }

    #[test]
    fn skips_unparseable_entries() {
        let body = json!({"ctatt": {"eta": [
            {"arrT": "tomorrow", "rt": "G", "destNm": "Harlem"},
            {"rt": "G", "destNm": "Harlem"},
            {"arrT": "2025-01-15T08:03:00", "rt": "Pink", "destNm": "54th/Cermak"}
        ]}});

        let arrivals = parse_station_arrivals(&body, "Clark/Lake", now()).unwrap();

        assert_eq!(arrivals, vec![Arrival::rail("Pink", "Clark/Lake", "54th/Cermak", 3)]);
    }

    #[test]
    fn failing_station_does_not_abort_others() {
        let upstream = FakeUpstream::keyed_by("mapid")
            .with_json("40380", json!({"ctatt": {"eta": [
                {"arrT": "2025-01-15T08:04:00", "rt": "G", "destNm": "Harlem"}
            ]}}))
            .with_json("41700", json!({"unexpected": true}))
            .with_json("41660", json!({"ctatt": {"eta": [
                {"arrT": "2025-01-15T08:02:00", "rt": "G", "destNm": "Cottage Grove"}
            ]}}));
        let clock = FixedClock::new(now());

        let arrivals = fetch_rail_arrivals(&upstream, &keyed_config(), &clock);

        assert_eq!(upstream.call_count(), 3);
        assert_eq!(
            arrivals,
            vec![
                Arrival::rail("G", "Clark/Lake", "Harlem", 4),
                Arrival::rail("G", "Lake", "Cottage Grove", 2),
            ]
        );
    }

    #[test]
    fn missing_key_skips_network() {
        let upstream = FakeUpstream::keyed_by("mapid");
        let clock = FixedClock::new(now());

        assert!(fetch_rail_arrivals(&upstream, &Config::default(), &clock).is_empty());
        assert_eq!(upstream.call_count(), 0);
    }
}
