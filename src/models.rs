// Normalized arrival model shared by the rail, commuter-rail and bus fetchers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Rail,
    CommuterRail,
    Bus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    pub source: Source,
    /// Line code (`G`, `Brn`), commuter route (`ME`) or bus route (`2`).
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<String>,
    #[serde(rename = "minutes")]
    pub minutes_until_arrival: u32,
}

impl Arrival {
    pub fn rail(line: &str, station: &str, destination: &str, minutes: u32) -> Self {
        Arrival {
            source: Source::Rail,
            label: line.to_string(),
            location: Some(station.to_string()),
            destination: Some(destination.to_string()),
            train: None,
            minutes_until_arrival: minutes,
        }
    }

    pub fn commuter(route: &str, train: &str, minutes: u32) -> Self {
        Arrival {
            source: Source::CommuterRail,
            label: route.to_string(),
            location: None,
            destination: None,
            train: Some(train.to_string()),
            minutes_until_arrival: minutes,
        }
    }

    pub fn bus(route: &str, stop: &str, destination: &str, minutes: u32) -> Self {
        Arrival {
            source: Source::Bus,
            label: route.to_string(),
            location: Some(stop.to_string()),
            destination: Some(destination.to_string()),
            train: None,
            minutes_until_arrival: minutes,
        }
    }

    /// Countdown text used by the web page: `Due` under a minute, else `N min`.
    pub fn display_time(&self) -> String {
        if self.minutes_until_arrival < 1 {
            "Due".to_string()
        } else {
            format!("{} min", self.minutes_until_arrival)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_time_marks_due() {
        assert_eq!(Arrival::bus("2", "State & Lake", "Hyde Park", 0).display_time(), "Due");
        assert_eq!(Arrival::bus("2", "State & Lake", "Hyde Park", 7).display_time(), "7 min");
    }

    #[test]
    fn commuter_serializes_without_location() {
        let json = serde_json::to_value(Arrival::commuter("ME", "320", 10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": "commuter-rail",
                "label": "ME",
                "train": "320",
                "minutes": 10
            })
        );
    }
}
