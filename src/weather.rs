// Current temperature from Meteosource, cached for ten minutes.
//
// Endpoint: https://www.meteosource.com/api/v1/free/point?place_id=chicago&sections=current&key=..
// The free tier allows 400 calls a day; a 600 s window keeps us near 144.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::config::{self, Config};
use crate::error::{BoardError, Result};
use crate::upstream::Upstream;

pub const FRESHNESS_WINDOW_SECS: i64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherSample {
    pub temperature_rounded: i32,
    pub captured_at: DateTime<Tz>,
}

/// Outcome of asking the cache for the temperature.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReading {
    /// Fetched during this call.
    Fresh(WeatherSample),
    /// Served from the cache inside the freshness window.
    Cached(WeatherSample),
    /// Refresh failed; the last good sample is still returned.
    Degraded { last: WeatherSample, error: BoardError },
    /// Refresh failed and nothing was ever fetched.
    Unavailable(BoardError),
}

impl WeatherReading {
    pub fn sample(&self) -> Option<&WeatherSample> {
        match self {
            WeatherReading::Fresh(sample)
            | WeatherReading::Cached(sample)
            | WeatherReading::Degraded { last: sample, .. } => Some(sample),
            WeatherReading::Unavailable(_) => None,
        }
    }

    pub fn temperature(&self) -> Option<i32> {
        self.sample().map(|s| s.temperature_rounded)
    }
}

pub trait TemperatureSource: Send + Sync {
    /// Current temperature in the source unit, unrounded.
    fn current_temperature(&self) -> Result<f64>;
}

pub struct Meteosource {
    upstream: Arc<dyn Upstream>,
    api_key: Option<String>,
    place_id: String,
}

impl Meteosource {
    pub fn new(upstream: Arc<dyn Upstream>, config: &Config) -> Self {
        Meteosource {
            upstream,
            api_key: config.weather_api_key.clone(),
            place_id: config.weather_place.clone(),
        }
    }
}

impl TemperatureSource for Meteosource {
    fn current_temperature(&self) -> Result<f64> {
        let api_key = config::require(&self.api_key, "METEOSOURCE_API_KEY")?;

        let json = self.upstream.get_json(
            config::WEATHER_URL,
            &[
                ("place_id", self.place_id.as_str()),
                ("sections", "current"),
                ("key", api_key),
            ],
        )?;

        json["current"]["temperature"]
            .as_f64()
            .ok_or_else(|| BoardError::MalformedResponse("Missing current.temperature".to_string()))
    }
}

/// Single-cell temperature cache. The lock is held across the upstream call
/// so concurrent callers inside the window never fetch twice.
pub struct WeatherCache {
    source: Box<dyn TemperatureSource>,
    clock: Arc<dyn Clock>,
    window: Duration,
    cell: Mutex<Option<WeatherSample>>,
}

impl WeatherCache {
    pub fn new(source: Box<dyn TemperatureSource>, clock: Arc<dyn Clock>) -> Self {
        WeatherCache {
            source,
            clock,
            window: Duration::seconds(FRESHNESS_WINDOW_SECS),
            cell: Mutex::new(None),
        }
    }

    pub fn current(&self) -> WeatherReading {
        let mut cell = match self.cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = self.clock.now();

        if let Some(sample) = *cell {
            if now - sample.captured_at < self.window {
                debug!("🌡️  Using cached temperature {}F", sample.temperature_rounded);
                return WeatherReading::Cached(sample);
            }
        }

        match self.source.current_temperature().and_then(round_temperature) {
            Ok(temperature_rounded) => {
                let sample = WeatherSample {
                    temperature_rounded,
                    captured_at: now,
                };
                *cell = Some(sample);
                info!("✓ Temperature refreshed: {}F", temperature_rounded);
                WeatherReading::Fresh(sample)
            }
            Err(error) => {
                warn!("⚠️  Could not refresh weather ({})", error);
                match *cell {
                    Some(last) => WeatherReading::Degraded { last, error },
                    None => WeatherReading::Unavailable(error),
                }
            }
        }
    }
}

fn round_temperature(value: f64) -> Result<i32> {
    if !value.is_finite() {
        return Err(BoardError::MalformedResponse(format!("Temperature is not a number: {}", value)));
    }
    Ok(value.round_ties_even() as i32)
}
