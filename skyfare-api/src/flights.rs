use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use axum::extract::rejection::JsonRejection;
use serde_json::{Map, Value};
use skyfare_core::booking::{Booking, BookingRequest, City, TicketDetails};
use skyfare_core::identity::AuthenticatedUser;
use skyfare_core::{Flight, FlightSearchRequest};

use crate::error::AppError;
use crate::middleware::{optional_auth, require_auth};
use crate::state::AppState;

/// Lets an admin read another user's bookings through `GET /flights/bookings`.
pub const TARGET_USER_HEADER: &str = "x-user-id";

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/flights/public", get(public_flights))
        .route("/flights/cities/origin", get(origin_cities))
        .route("/flights/cities/destination", get(destination_cities));

    let search = Router::new()
        .route("/flights", get(search_by_query))
        .route("/flights/search", post(search_by_body))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let protected = Router::new()
        .route("/flights/booking", post(book_flight))
        .route("/flights/bookings", get(my_bookings))
        .route("/flights/bookings/{id}", get(bookings_by_user))
        .route("/flights/bookings/{id}/ticket", get(booking_ticket))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(search).merge(protected)
}

// ============================================================================
// Search
// ============================================================================

async fn public_flights(State(state): State<AppState>) -> Json<Vec<Flight>> {
    Json(state.public_flights.as_ref().clone())
}

async fn search_by_query(
    State(state): State<AppState>,
    Extension(caller): Extension<Option<AuthenticatedUser>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let request = if pairs.is_empty() {
        None
    } else {
        serde_json::from_value::<FlightSearchRequest>(query_to_json(pairs))
            .map(Some)
            .map_err(|e| AppError::ValidationError(e.to_string()))?
    };

    let flights = state.search.search(request.as_ref(), caller.as_ref()).await?;
    Ok(Json(flights))
}

async fn search_by_body(
    State(state): State<AppState>,
    Extension(caller): Extension<Option<AuthenticatedUser>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<Flight>>, AppError> {
    // an empty body searches everything
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else if !is_json_content(&headers) {
        return Err(AppError::ValidationError(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    } else {
        let Json(request) = Json::<Option<FlightSearchRequest>>::from_bytes(&body)?;
        request
    };

    let flights = state.search.search(request.as_ref(), caller.as_ref()).await?;
    Ok(Json(flights))
}

fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
}

/// Turn query pairs into the JSON shape of a search body.
///
/// Values that parse as JSON literals are taken as such (`maxStops=1`,
/// `priceRange=[200,500]`). `key[sub]=v` builds an object, `key[]=v` and
/// repeated keys build a list.
pub fn query_to_json(pairs: Vec<(String, String)>) -> Value {
    let mut root = Map::new();

    for (key, raw) in pairs {
        let value = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));

        match split_bracket_key(&key) {
            Some((base, "")) => match root.entry(base.to_string()).or_insert_with(|| Value::Array(Vec::new())) {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![other.take(), value]),
            },
            Some((base, sub)) => {
                let slot = root.entry(base.to_string()).or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(map) = slot {
                    map.insert(sub.to_string(), value);
                }
            }
            None => match root.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
                None => {
                    root.insert(key.clone(), value);
                }
            },
        }
    }

    Value::Object(root)
}

fn split_bracket_key(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    Some((&key[..open], inner))
}

// ============================================================================
// Cities
// ============================================================================

async fn origin_cities(State(state): State<AppState>) -> Result<Json<Vec<City>>, AppError> {
    Ok(Json(state.cities.list_cities().await?))
}

async fn destination_cities(State(state): State<AppState>) -> Result<Json<Vec<City>>, AppError> {
    Ok(Json(state.cities.list_cities().await?))
}

// ============================================================================
// Bookings
// ============================================================================

async fn book_flight(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(request) = body?;
    let booking = state.bookings.book(request, &caller).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn my_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let target = headers
        .get(TARGET_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    Ok(Json(state.bookings.user_bookings(&caller, target).await?))
}

async fn bookings_by_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.user_bookings(&caller, Some(&user_id)).await?))
}

async fn booking_ticket(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(booking_id): Path<String>,
) -> Result<Json<TicketDetails>, AppError> {
    Ok(Json(state.bookings.ticket(&caller, &booking_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_query_literals_and_strings() {
        let value = query_to_json(pairs(&[
            ("from", "DEL"),
            ("maxStops", "1"),
            ("directOnly", "true"),
            ("priceRange", "[200,500]"),
            ("departureDate", "2024-01-01"),
        ]));
        assert_eq!(
            value,
            json!({
                "from": "DEL",
                "maxStops": 1,
                "directOnly": true,
                "priceRange": [200, 500],
                "departureDate": "2024-01-01"
            })
        );
    }

    #[test]
    fn test_query_repeated_and_bracket_keys() {
        let value = query_to_json(pairs(&[
            ("airlineList", "Delta"),
            ("airlineList", "United"),
            ("airlines[delta]", "true"),
            ("airlines[spirit]", "false"),
            ("stops[direct]", "true"),
            ("tags[]", "a"),
        ]));
        assert_eq!(value["airlineList"], json!(["Delta", "United"]));
        assert_eq!(value["airlines"], json!({ "delta": true, "spirit": false }));
        assert_eq!(value["stops"], json!({ "direct": true }));
        assert_eq!(value["tags"], json!(["a"]));

        let request: FlightSearchRequest = serde_json::from_value(value).unwrap();
        assert_eq!(request.airline_list, Some(vec!["Delta".to_string(), "United".to_string()]));
        assert_eq!(request.stops.map(|s| s.direct), Some(true));
    }
}
