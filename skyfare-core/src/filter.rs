use std::collections::HashMap;

use crate::search::{FlightSearchRequest, SortOption, StopSelection, TimeOfDaySelection};

/// Inclusive price window. A missing bound is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceBounds {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min.unwrap_or(f64::NEG_INFINITY) && price <= self.max.unwrap_or(f64::INFINITY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AirlineConstraint {
    /// Keyed by [`airline_key`]; a flight is kept only when its key maps to `true`.
    AllowMap(HashMap<String, bool>),
    /// Exact airline display names.
    AllowList(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopConstraint {
    Bands(StopSelection),
    Legacy {
        direct_only: bool,
        max_stops: Option<i64>,
    },
}

/// Search constraints with every dual-shape field resolved to one representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalFilter {
    pub price: Option<PriceBounds>,
    pub airlines: Option<AirlineConstraint>,
    pub stops: Option<StopConstraint>,
    pub departure: Option<TimeOfDaySelection>,
    pub sort_by: Option<SortOption>,
}

impl CanonicalFilter {
    pub fn from_request(req: &FlightSearchRequest) -> Self {
        let filter = Self {
            price: resolve_price(req),
            airlines: resolve_airlines(req),
            stops: resolve_stops(req),
            departure: req.departure_time,
            sort_by: req.sort_by,
        };
        tracing::debug!(?filter, "normalized flight filter");
        filter
    }

    pub fn is_unconstrained(&self) -> bool {
        self.price.is_none()
            && self.airlines.is_none()
            && self.stops.is_none()
            && self.departure.is_none()
    }
}

fn resolve_price(req: &FlightSearchRequest) -> Option<PriceBounds> {
    if let Some((min, max)) = req.price_range {
        // min > max is kept as is and simply matches nothing
        return Some(PriceBounds { min: Some(min), max: Some(max) });
    }
    if req.min_price.is_some() || req.max_price.is_some() {
        return Some(PriceBounds { min: req.min_price, max: req.max_price });
    }
    None
}

fn resolve_airlines(req: &FlightSearchRequest) -> Option<AirlineConstraint> {
    if let Some(map) = &req.airlines {
        return Some(AirlineConstraint::AllowMap(map.clone()));
    }
    match &req.airline_list {
        Some(list) if !list.is_empty() => Some(AirlineConstraint::AllowList(list.clone())),
        _ => None,
    }
}

fn resolve_stops(req: &FlightSearchRequest) -> Option<StopConstraint> {
    if let Some(selection) = req.stops {
        return Some(StopConstraint::Bands(selection));
    }
    if req.direct_only.is_some() || req.max_stops.is_some() {
        return Some(StopConstraint::Legacy {
            direct_only: req.direct_only.unwrap_or(false),
            max_stops: req.max_stops,
        });
    }
    None
}

/// Key used by the `airlines` allow-map: lower-cased with spaces removed.
///
/// `JetBlue` maps to `jetBlue`, not `jetblue`; existing clients send that key.
pub fn airline_key(name: &str) -> String {
    let key: String = name
        .chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect();
    if key == "jetblue" {
        "jetBlue".to_string()
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> FlightSearchRequest {
        serde_json::from_value(value).expect("request should deserialize")
    }

    #[test]
    fn test_airline_key() {
        assert_eq!(airline_key("Air India"), "airindia");
        assert_eq!(airline_key("AirAsia India"), "airasiaindia");
        assert_eq!(airline_key("Delta"), "delta");
        assert_eq!(airline_key("JetBlue"), "jetBlue");
        assert_eq!(airline_key("Jet Blue"), "jetBlue");
    }

    #[test]
    fn test_price_range_takes_precedence() {
        let filter = CanonicalFilter::from_request(&request(json!({
            "priceRange": [200, 800],
            "minPrice": 500,
            "maxPrice": 600
        })));
        assert_eq!(filter.price, Some(PriceBounds { min: Some(200.0), max: Some(800.0) }));
    }

    #[test]
    fn test_legacy_price_bounds() {
        let filter = CanonicalFilter::from_request(&request(json!({ "maxPrice": 600 })));
        assert_eq!(filter.price, Some(PriceBounds { min: None, max: Some(600.0) }));

        let filter = CanonicalFilter::from_request(&request(json!({
            "priceRange": [1, 2, 3],
            "minPrice": 250
        })));
        assert_eq!(filter.price, Some(PriceBounds { min: Some(250.0), max: None }));
    }

    #[test]
    fn test_inverted_range_is_not_rejected() {
        let filter = CanonicalFilter::from_request(&request(json!({ "priceRange": [900, 100] })));
        let bounds = filter.price.unwrap();
        assert!(!bounds.contains(500.0));
        assert!(!bounds.contains(900.0));
    }

    #[test]
    fn test_airline_map_wins_over_list() {
        let filter = CanonicalFilter::from_request(&request(json!({
            "airlines": { "delta": true },
            "airlineList": ["United"]
        })));
        match filter.airlines {
            Some(AirlineConstraint::AllowMap(map)) => {
                assert_eq!(map.get("delta"), Some(&true));
                assert_eq!(map.len(), 1);
            }
            other => panic!("expected allow-map, got {:?}", other),
        }
    }

    #[test]
    fn test_airline_list_fallback() {
        let filter = CanonicalFilter::from_request(&request(json!({
            "airlines": ["Delta"],
            "airlineList": ["United", "Spirit"]
        })));
        assert_eq!(
            filter.airlines,
            Some(AirlineConstraint::AllowList(vec!["United".into(), "Spirit".into()]))
        );

        let filter = CanonicalFilter::from_request(&request(json!({ "airlineList": [] })));
        assert_eq!(filter.airlines, None);
    }

    #[test]
    fn test_stop_triple_ignores_legacy_fields() {
        let filter = CanonicalFilter::from_request(&request(json!({
            "stops": { "direct": false, "oneStop": true, "multiStop": true },
            "directOnly": true,
            "maxStops": 0
        })));
        assert_eq!(
            filter.stops,
            Some(StopConstraint::Bands(StopSelection {
                direct: false,
                one_stop: true,
                multi_stop: true
            }))
        );
    }

    #[test]
    fn test_legacy_stops() {
        let filter = CanonicalFilter::from_request(&request(json!({ "maxStops": 1 })));
        assert_eq!(
            filter.stops,
            Some(StopConstraint::Legacy { direct_only: false, max_stops: Some(1) })
        );

        let filter = CanonicalFilter::from_request(&request(json!({})));
        assert_eq!(filter.stops, None);
        assert!(filter.is_unconstrained());
    }
}
