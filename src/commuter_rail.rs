// Metra departures from the GTFS-realtime trip-updates feed.
//
// Endpoint: https://gtfspublic.metrarr.com/gtfs/public/tripupdates?api_token=..
// Only one route at one stop is shown (Metra Electric at Millennium Station).

use chrono::DateTime;
use chrono_tz::Tz;
use gtfs_rt::FeedMessage;
use gtfs_rt::trip_update::StopTimeUpdate;
use log::{debug, warn};
use prost::Message;

use crate::clock::{self, Clock};
use crate::config::{self, CommuterFilter, Config};
use crate::error::{BoardError, Result};
use crate::models::Arrival;
use crate::upstream::Upstream;

/// Upcoming departures in feed order. Network and decode failures degrade to
/// an empty list so the board stays up.
pub fn fetch_commuter_arrivals(upstream: &dyn Upstream, config: &Config, clock: &dyn Clock) -> Vec<Arrival> {
    let token = match config::require(&config.commuter_api_token, "METRA_API_TOKEN") {
        Ok(token) => token,
        Err(e) => {
            warn!("⚠️  Skipping commuter rail arrivals: {}", e);
            return Vec::new();
        }
    };

    let now = clock.now();

    let result = upstream
        .get_bytes(config::COMMUTER_FEED_URL, &[("api_token", token)])
        .and_then(|body| decode_feed(&body))
        .map(|feed| collect_arrivals(&feed, &config.commuter, now));

    match result {
        Ok(arrivals) => {
            debug!("🚆 {} {} departures at {}", arrivals.len(), config.commuter.route_id, config.commuter.stop_id);
            arrivals
        }
        Err(e) => {
            warn!("⚠️  Could not fetch commuter rail arrivals ({})", e);
            Vec::new()
        }
    }
}

pub fn decode_feed(body: &[u8]) -> Result<FeedMessage> {
    FeedMessage::decode(body)
        .map_err(|e| BoardError::MalformedResponse(format!("Failed to decode trip updates feed: {}", e)))
}

pub fn collect_arrivals(feed: &FeedMessage, filter: &CommuterFilter, now: DateTime<Tz>) -> Vec<Arrival> {
    let mut arrivals = Vec::new();

    for entity in &feed.entity {
        let Some(trip_update) = &entity.trip_update else {
            continue;
        };

        if trip_update.trip.route_id.as_deref() != Some(filter.route_id.as_str()) {
            continue;
        }

        let trip_id = trip_update.trip.trip_id.as_deref().unwrap_or_default();

        for stop_update in &trip_update.stop_time_update {
            if stop_update.stop_id.as_deref() != Some(filter.stop_id.as_str()) {
                continue;
            }

            let Some(departs_at) = event_time(stop_update).and_then(clock::from_epoch) else {
                continue;
            };

            let Some(minutes) = clock::minutes_away(departs_at, now) else {
                continue;
            };

            match parse_train_number(trip_id, &filter.route_id) {
                Some(train) => arrivals.push(Arrival::commuter(&filter.route_id, &train, minutes)),
                None => warn!("⚠️  Skipping trip with unrecognised id {:?}", trip_id),
            }
        }
    }

    arrivals
}

// Departure is preferred. A zero timestamp is treated as unset.
fn event_time(stop_update: &StopTimeUpdate) -> Option<i64> {
    let departure = stop_update.departure.as_ref().and_then(|d| d.time);
    let arrival = stop_update.arrival.as_ref().and_then(|a| a.time);

    departure.filter(|t| *t != 0).or(arrival.filter(|t| *t != 0))
}

/// Numeric train designator embedded in a structured trip id:
/// `ME_ME320_V3_B` with route `ME` gives `320`. Anything else is `None`.
pub fn parse_train_number(trip_id: &str, route_id: &str) -> Option<String> {
    let segment = trip_id.split('_').nth(1)?;
    let number = segment.strip_prefix(route_id).unwrap_or(segment);

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(number.to_string())
}
