// The board service: one place that runs the fetchers, aggregates, and renders.
// The web server and the console loop are thin consumers of this.

use chrono::DateTime;
use chrono_tz::Tz;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aggregate::{self, FLAT_LIMIT, PER_LINE_LIMIT};
use crate::bitmap::{self, BoardFrame, PixelGrid};
use crate::bus;
use crate::clock::Clock;
use crate::commuter_rail;
use crate::config::Config;
use crate::models::Arrival;
use crate::rail;
use crate::upstream::Upstream;
use crate::weather::{Meteosource, WeatherCache, WeatherReading};

/// Data for the HTML dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct WebSnapshot {
    pub rail: BTreeMap<String, Vec<Arrival>>,
    pub commuter: Vec<Arrival>,
    pub bus: Vec<Arrival>,
}

/// Everything the server caches between refresh ticks.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub web: WebSnapshot,
    pub temperature: Option<i32>,
    pub grid: PixelGrid,
    pub refreshed_at: DateTime<Tz>,
}

pub struct Board {
    config: Config,
    upstream: Arc<dyn Upstream>,
    clock: Arc<dyn Clock>,
    weather: WeatherCache,
}

impl Board {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>, clock: Arc<dyn Clock>) -> Self {
        let source = Meteosource::new(upstream.clone(), &config);
        let weather = WeatherCache::new(Box::new(source), clock.clone());
        Self::with_weather(config, upstream, clock, weather)
    }

    pub fn with_weather(config: Config, upstream: Arc<dyn Upstream>, clock: Arc<dyn Clock>, weather: WeatherCache) -> Self {
        Board {
            config,
            upstream,
            clock,
            weather,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Next three trains per 'L' line across the configured stations.
    pub fn rail_lines(&self) -> BTreeMap<String, Vec<Arrival>> {
        let arrivals = rail::fetch_rail_arrivals(self.upstream.as_ref(), &self.config, self.clock.as_ref());
        aggregate::group_top_n(arrivals, PER_LINE_LIMIT)
    }

    pub fn commuter_departures(&self) -> Vec<Arrival> {
        let arrivals = commuter_rail::fetch_commuter_arrivals(self.upstream.as_ref(), &self.config, self.clock.as_ref());
        aggregate::flat_top_n(arrivals, FLAT_LIMIT)
    }

    pub fn bus_departures(&self) -> Vec<Arrival> {
        let arrivals = bus::fetch_bus_arrivals(self.upstream.as_ref(), &self.config);
        aggregate::flat_top_n(arrivals, FLAT_LIMIT)
    }

    pub fn weather(&self) -> WeatherReading {
        self.weather.current()
    }

    pub fn web_snapshot(&self) -> WebSnapshot {
        WebSnapshot {
            rail: self.rail_lines(),
            commuter: self.commuter_departures(),
            bus: self.bus_departures(),
        }
    }

    /// Fetch commuter rail, bus and weather and draw the LED board.
    pub fn led_grid(&self) -> PixelGrid {
        let commuter = self.commuter_departures();
        let bus = self.bus_departures();
        let temperature = self.weather().temperature();
        self.render(&commuter, &bus, temperature)
    }

    /// One full refresh: every source is fetched once and feeds both views.
    pub fn snapshot(&self) -> BoardSnapshot {
        let web = self.web_snapshot();
        let temperature = self.weather().temperature();
        let grid = self.render(&web.commuter, &web.bus, temperature);

        info!(
            "✓ Board refreshed: {} rail lines, {} commuter, {} bus, temperature {:?}",
            web.rail.len(),
            web.commuter.len(),
            web.bus.len(),
            temperature
        );

        BoardSnapshot {
            web,
            temperature,
            grid,
            refreshed_at: self.clock.now(),
        }
    }

    fn render(&self, commuter: &[Arrival], bus: &[Arrival], temperature: Option<i32>) -> PixelGrid {
        let bus_label = self.config.bus_label();
        bitmap::render_board(&BoardFrame {
            now: self.clock.now(),
            temperature,
            commuter_label: &self.config.commuter.route_id,
            commuter,
            bus_label: &bus_label,
            bus,
        })
    }
}
