use std::sync::Arc;

use crate::filter::CanonicalFilter;
use crate::identity::AuthenticatedUser;
use crate::predicates::apply_filters;
use crate::repository::FlightSource;
use crate::search::{Flight, FlightSearchRequest};
use crate::sort::sort_flights;
use crate::CoreResult;

/// Filter and order an already fetched flight collection.
///
/// Without a request the collection is returned as is. Otherwise the request
/// is normalized, every present constraint is applied, and the survivors are
/// sorted when a sort key was given.
pub fn run_query(flights: Vec<Flight>, request: Option<&FlightSearchRequest>) -> Vec<Flight> {
    let Some(request) = request else {
        return flights;
    };

    let filter = CanonicalFilter::from_request(request);
    let filtered = if filter.is_unconstrained() {
        flights
    } else {
        apply_filters(flights, &filter)
    };

    match filter.sort_by {
        Some(option) => sort_flights(&filtered, Some(option)),
        None => filtered,
    }
}

/// Search entry point: fetches from the flight source, then runs the query.
#[derive(Clone)]
pub struct FlightSearch {
    source: Arc<dyn FlightSource>,
}

impl FlightSearch {
    pub fn new(source: Arc<dyn FlightSource>) -> Self {
        Self { source }
    }

    pub async fn search(
        &self,
        request: Option<&FlightSearchRequest>,
        caller: Option<&AuthenticatedUser>,
    ) -> CoreResult<Vec<Flight>> {
        let (origin, destination) = match request {
            Some(req) if req.applies_route_filter() => (req.from.as_deref(), req.to.as_deref()),
            _ => (None, None),
        };

        let flights = self.source.fetch_flights(origin, destination).await?;
        let fetched = flights.len();
        let results = run_query(flights, request);

        tracing::info!(
            caller = caller.map(|c| c.id.as_str()).unwrap_or("anonymous"),
            origin = origin.unwrap_or("*"),
            destination = destination.unwrap_or("*"),
            fetched,
            returned = results.len(),
            "flight search"
        );
        Ok(results)
    }
}
