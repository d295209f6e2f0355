// Grouping and truncation of normalized arrivals for the two presentation paths.

use std::collections::BTreeMap;

use crate::models::Arrival;

pub const PER_LINE_LIMIT: usize = 3;
pub const FLAT_LIMIT: usize = 5;

/// Next `n` arrivals per line label, soonest first. Equal times keep fetch order.
pub fn group_top_n(arrivals: Vec<Arrival>, n: usize) -> BTreeMap<String, Vec<Arrival>> {
    let mut lines: BTreeMap<String, Vec<Arrival>> = BTreeMap::new();

    for arrival in arrivals {
        lines.entry(arrival.label.clone()).or_default().push(arrival);
    }

    for group in lines.values_mut() {
        group.sort_by_key(|a| a.minutes_until_arrival);
        group.truncate(n);
    }

    lines
}

/// Next `n` arrivals overall, soonest first. Equal times keep fetch order.
pub fn flat_top_n(mut arrivals: Vec<Arrival>, n: usize) -> Vec<Arrival> {
    arrivals.sort_by_key(|a| a.minutes_until_arrival);
    arrivals.truncate(n);
    arrivals
}
