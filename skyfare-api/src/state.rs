use std::sync::Arc;

use skyfare_core::booking::BookingService;
use skyfare_core::identity::UserService;
use skyfare_core::repository::CityRepository;
use skyfare_core::{Flight, FlightSearch};
use skyfare_store::Repositories;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub allow_dev_tokens: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub search: FlightSearch,
    pub bookings: BookingService,
    pub users: UserService,
    pub cities: Arc<dyn CityRepository>,
    pub public_flights: Arc<Vec<Flight>>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(repos: Repositories, public_flights: Vec<Flight>, auth: AuthConfig) -> Self {
        Self {
            search: FlightSearch::new(repos.flights.clone()),
            bookings: BookingService::new(repos.flights, repos.bookings),
            users: UserService::new(repos.users),
            cities: repos.cities,
            public_flights: Arc::new(public_flights),
            auth,
        }
    }
}
