use crate::filter::{airline_key, AirlineConstraint, CanonicalFilter, PriceBounds, StopConstraint};
use crate::search::{Flight, StopSelection, TimeOfDaySelection};

/// Departure window a flight's departure hour falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 04:59
    Evening,
}

impl TimeBand {
    /// `None` for hours outside `0..24`.
    pub fn classify(hour: u32) -> Option<Self> {
        match hour {
            5..=11 => Some(TimeBand::Morning),
            12..=16 => Some(TimeBand::Afternoon),
            17..=23 | 0..=4 => Some(TimeBand::Evening),
            _ => None,
        }
    }

    fn selected(self, selection: &TimeOfDaySelection) -> bool {
        match self {
            TimeBand::Morning => selection.morning,
            TimeBand::Afternoon => selection.afternoon,
            TimeBand::Evening => selection.evening,
        }
    }
}

/// Hour component of an `HH:MM` departure time.
pub fn departure_hour(time: &str) -> Option<u32> {
    let hour = time.split(':').next()?.trim();
    hour.parse().ok()
}

/// Keep the flights that pass every constraint present in `filter`.
pub fn apply_filters(flights: Vec<Flight>, filter: &CanonicalFilter) -> Vec<Flight> {
    let before = flights.len();
    let kept: Vec<Flight> = flights.into_iter().filter(|f| matches(f, filter)).collect();
    tracing::debug!(before, after = kept.len(), "applied flight filters");
    kept
}

/// Every present constraint must hold; absent ones pass.
pub fn matches(flight: &Flight, filter: &CanonicalFilter) -> bool {
    if let Some(bounds) = &filter.price {
        if !matches_price(flight, bounds) {
            return false;
        }
    }

    match &filter.airlines {
        Some(AirlineConstraint::AllowMap(map)) => {
            if !matches_airline_map(flight, map) {
                return false;
            }
        }
        Some(AirlineConstraint::AllowList(list)) => {
            if !matches_airline_list(flight, list) {
                return false;
            }
        }
        None => {}
    }

    match &filter.stops {
        Some(StopConstraint::Bands(selection)) => {
            if !matches_stop_bands(flight, selection) {
                return false;
            }
        }
        Some(StopConstraint::Legacy { direct_only, max_stops }) => {
            if !matches_legacy_stops(flight, *direct_only, *max_stops) {
                return false;
            }
        }
        None => {}
    }

    if let Some(selection) = &filter.departure {
        if !matches_departure(flight, selection) {
            return false;
        }
    }

    true
}

fn matches_price(flight: &Flight, bounds: &PriceBounds) -> bool {
    bounds.contains(flight.price)
}

fn matches_airline_map(flight: &Flight, map: &std::collections::HashMap<String, bool>) -> bool {
    if flight.airline.is_empty() {
        return false;
    }
    map.get(&airline_key(&flight.airline)).copied().unwrap_or(false)
}

fn matches_airline_list(flight: &Flight, list: &[String]) -> bool {
    !flight.airline.is_empty() && list.iter().any(|name| *name == flight.airline)
}

fn matches_stop_bands(flight: &Flight, selection: &StopSelection) -> bool {
    match flight.stops {
        0 => selection.direct,
        1 => selection.one_stop,
        _ => selection.multi_stop,
    }
}

fn matches_legacy_stops(flight: &Flight, direct_only: bool, max_stops: Option<i64>) -> bool {
    if direct_only {
        return flight.stops == 0;
    }
    match max_stops {
        Some(max) => i64::from(flight.stops) <= max,
        None => true,
    }
}

fn matches_departure(flight: &Flight, selection: &TimeOfDaySelection) -> bool {
    // unparseable departure times are kept
    match departure_hour(&flight.departure_time).and_then(TimeBand::classify) {
        Some(band) => band.selected(selection),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn flight(id: &str, airline: &str, price: f64, stops: u32, departure: &str) -> Flight {
        Flight {
            id: id.to_string(),
            airline: airline.to_string(),
            airline_code: String::new(),
            airline_logo: String::new(),
            flight_number: format!("{}100", id),
            departure_airport: "DEL".to_string(),
            arrival_airport: "BOM".to_string(),
            departure_date: "2023-12-01".to_string(),
            departure_time: departure.to_string(),
            arrival_time: String::new(),
            duration: String::new(),
            duration_minutes: None,
            stops,
            stop_locations: None,
            price,
            destination: None,
        }
    }

    fn ids(flights: &[Flight]) -> Vec<&str> {
        flights.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let flights = vec![
            flight("a", "Delta", 199.0, 0, "08:00"),
            flight("b", "Delta", 200.0, 0, "08:00"),
            flight("c", "Delta", 800.0, 0, "08:00"),
            flight("d", "Delta", 801.0, 0, "08:00"),
        ];
        let filter = CanonicalFilter {
            price: Some(PriceBounds { min: Some(200.0), max: Some(800.0) }),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["b", "c"]);
    }

    #[test]
    fn test_one_sided_price_bound() {
        let flights = vec![flight("a", "Delta", 100.0, 0, ""), flight("b", "Delta", 5000.0, 0, "")];
        let filter = CanonicalFilter {
            price: Some(PriceBounds { min: Some(1000.0), max: None }),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["b"]);
    }

    #[test]
    fn test_airline_map_uses_jetblue_key() {
        let flights = vec![flight("a", "JetBlue", 300.0, 0, "08:00")];

        let mut allow = HashMap::new();
        allow.insert("jetBlue".to_string(), true);
        let filter = CanonicalFilter {
            airlines: Some(AirlineConstraint::AllowMap(allow)),
            ..Default::default()
        };
        assert_eq!(apply_filters(flights.clone(), &filter).len(), 1);

        let mut allow = HashMap::new();
        allow.insert("jetblue".to_string(), true);
        let filter = CanonicalFilter {
            airlines: Some(AirlineConstraint::AllowMap(allow)),
            ..Default::default()
        };
        assert!(apply_filters(flights, &filter).is_empty());
    }

    #[test]
    fn test_airline_map_drops_absent_false_and_unnamed() {
        let flights = vec![
            flight("a", "Air India", 300.0, 0, ""),
            flight("b", "IndiGo", 300.0, 0, ""),
            flight("c", "Vistara", 300.0, 0, ""),
            flight("d", "", 300.0, 0, ""),
        ];
        let mut allow = HashMap::new();
        allow.insert("airindia".to_string(), true);
        allow.insert("indigo".to_string(), false);
        allow.insert("".to_string(), true);
        let filter = CanonicalFilter {
            airlines: Some(AirlineConstraint::AllowMap(allow)),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["a"]);
    }

    #[test]
    fn test_airline_list_is_exact() {
        let flights = vec![
            flight("a", "Delta", 300.0, 0, ""),
            flight("b", "delta", 300.0, 0, ""),
            flight("c", "United", 300.0, 0, ""),
        ];
        let filter = CanonicalFilter {
            airlines: Some(AirlineConstraint::AllowList(vec!["Delta".into(), "United".into()])),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["a", "c"]);
    }

    #[test]
    fn test_stop_bands() {
        let flights = vec![
            flight("direct", "Delta", 300.0, 0, ""),
            flight("one", "Delta", 300.0, 1, ""),
            flight("two", "Delta", 300.0, 2, ""),
            flight("three", "Delta", 300.0, 3, ""),
        ];
        let filter = CanonicalFilter {
            stops: Some(StopConstraint::Bands(StopSelection {
                direct: true,
                one_stop: false,
                multi_stop: true,
            })),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["direct", "two", "three"]);
    }

    #[test]
    fn test_legacy_stops() {
        let flights = vec![
            flight("direct", "Delta", 300.0, 0, ""),
            flight("one", "Delta", 300.0, 1, ""),
            flight("two", "Delta", 300.0, 2, ""),
        ];

        let direct_only = CanonicalFilter {
            stops: Some(StopConstraint::Legacy { direct_only: true, max_stops: Some(2) }),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights.clone(), &direct_only)), vec!["direct"]);

        let max_one = CanonicalFilter {
            stops: Some(StopConstraint::Legacy { direct_only: false, max_stops: Some(1) }),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights.clone(), &max_one)), vec!["direct", "one"]);

        let unbounded = CanonicalFilter {
            stops: Some(StopConstraint::Legacy { direct_only: false, max_stops: None }),
            ..Default::default()
        };
        assert_eq!(apply_filters(flights, &unbounded).len(), 3);
    }

    #[test]
    fn test_time_band_boundaries() {
        let band = |t: &str| departure_hour(t).and_then(TimeBand::classify);
        assert_eq!(band("04:59"), Some(TimeBand::Evening));
        assert_eq!(band("05:00"), Some(TimeBand::Morning));
        assert_eq!(band("11:59"), Some(TimeBand::Morning));
        assert_eq!(band("12:00"), Some(TimeBand::Afternoon));
        assert_eq!(band("16:59"), Some(TimeBand::Afternoon));
        assert_eq!(band("17:00"), Some(TimeBand::Evening));
        assert_eq!(band("00:15"), Some(TimeBand::Evening));
        assert_eq!(band("7:05"), Some(TimeBand::Morning));
        assert_eq!(band("25:00"), None);
        assert_eq!(band("soon"), None);
        assert_eq!(band(""), None);
    }

    #[test]
    fn test_departure_filter_fails_open() {
        let flights = vec![
            flight("morning", "Delta", 300.0, 0, "08:00"),
            flight("afternoon", "Delta", 300.0, 0, "13:45"),
            flight("evening", "Delta", 300.0, 0, "19:00"),
            flight("unknown", "Delta", 300.0, 0, ""),
        ];
        let filter = CanonicalFilter {
            departure: Some(TimeOfDaySelection { morning: false, afternoon: true, evening: false }),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["afternoon", "unknown"]);
    }

    #[test]
    fn test_predicates_compose_by_and() {
        let flights = vec![
            flight("a", "Delta", 300.0, 0, "08:00"),
            flight("b", "Delta", 300.0, 1, "08:00"),
            flight("c", "United", 300.0, 0, "08:00"),
            flight("d", "Delta", 900.0, 0, "08:00"),
        ];
        let filter = CanonicalFilter {
            price: Some(PriceBounds { min: None, max: Some(500.0) }),
            airlines: Some(AirlineConstraint::AllowList(vec!["Delta".into()])),
            stops: Some(StopConstraint::Legacy { direct_only: true, max_stops: None }),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(flights, &filter)), vec!["a"]);
    }
}
