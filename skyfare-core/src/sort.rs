use std::cmp::Ordering;

use crate::search::{Flight, SortOption};

/// Return a sorted copy of `flights`. The sort is stable, so ties keep their
/// input order. `None` and `DurationLongToShort` return the flights unchanged.
pub fn sort_flights(flights: &[Flight], sort_by: Option<SortOption>) -> Vec<Flight> {
    let mut sorted = flights.to_vec();
    if let Some(option) = sort_by {
        sorted.sort_by(|a, b| compare(option, a, b));
    }
    sorted
}

fn compare(option: SortOption, a: &Flight, b: &Flight) -> Ordering {
    match option {
        SortOption::PriceLowToHigh => a.price.total_cmp(&b.price),
        SortOption::PriceHighToLow => b.price.total_cmp(&a.price),
        SortOption::DurationShortToLong => minutes(a).cmp(&minutes(b)),
        // accepted but has no ordering key
        SortOption::DurationLongToShort => Ordering::Equal,
        SortOption::DepartureSoonToLate => a.departure_time.cmp(&b.departure_time),
        SortOption::DepartureLateToSoon => b.departure_time.cmp(&a.departure_time),
    }
}

fn minutes(flight: &Flight) -> u32 {
    flight.duration_minutes.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(id: &str, price: f64, minutes: Option<u32>, departure: &str) -> Flight {
        Flight {
            id: id.to_string(),
            airline: "IndiGo".to_string(),
            airline_code: "6E".to_string(),
            airline_logo: String::new(),
            flight_number: format!("6E{}", id),
            departure_airport: "DEL".to_string(),
            arrival_airport: "BLR".to_string(),
            departure_date: "2023-12-15".to_string(),
            departure_time: departure.to_string(),
            arrival_time: String::new(),
            duration: String::new(),
            duration_minutes: minutes,
            stops: 0,
            stop_locations: None,
            price,
            destination: None,
        }
    }

    fn ids(flights: &[Flight]) -> Vec<&str> {
        flights.iter().map(|f| f.id.as_str()).collect()
    }

    fn fixture() -> Vec<Flight> {
        vec![
            flight("a", 6200.0, Some(165), "19:00"),
            flight("b", 5500.0, Some(135), "08:00"),
            flight("c", 7800.0, None, "13:45"),
            flight("d", 5500.0, Some(90), ""),
        ]
    }

    #[test]
    fn test_price_orderings() {
        let flights = fixture();
        assert_eq!(ids(&sort_flights(&flights, Some(SortOption::PriceLowToHigh))), vec!["b", "d", "a", "c"]);
        assert_eq!(ids(&sort_flights(&flights, Some(SortOption::PriceHighToLow))), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_duration_short_to_long_treats_missing_as_zero() {
        let flights = fixture();
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::DurationShortToLong))),
            vec!["c", "d", "b", "a"]
        );
    }

    #[test]
    fn test_duration_long_to_short_keeps_input_order() {
        let flights = fixture();
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::DurationLongToShort))),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_departure_orderings() {
        let flights = fixture();
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::DepartureSoonToLate))),
            vec!["d", "b", "c", "a"]
        );
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::DepartureLateToSoon))),
            vec!["a", "c", "b", "d"]
        );
    }

    #[test]
    fn test_no_sort_key_keeps_input_order() {
        let flights = fixture();
        assert_eq!(ids(&sort_flights(&flights, None)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let flights = fixture();
        let snapshot = flights.clone();
        let _ = sort_flights(&flights, Some(SortOption::PriceHighToLow));
        assert_eq!(flights, snapshot);
    }

    #[test]
    fn test_ties_are_stable() {
        let flights = vec![
            flight("first", 300.0, Some(60), "09:00"),
            flight("cheap", 100.0, Some(60), "09:00"),
            flight("second", 300.0, Some(60), "09:00"),
        ];
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::PriceLowToHigh))),
            vec!["cheap", "first", "second"]
        );
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::PriceHighToLow))),
            vec!["first", "second", "cheap"]
        );
        assert_eq!(
            ids(&sort_flights(&flights, Some(SortOption::DepartureLateToSoon))),
            vec!["first", "cheap", "second"]
        );
    }
}
