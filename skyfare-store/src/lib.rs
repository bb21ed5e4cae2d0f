pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod fixtures;
pub mod flight_repo;
pub mod memory;
pub mod user_repo;

use std::sync::Arc;

use skyfare_core::repository::{BookingRepository, CityRepository, FlightSource, UserRepository};

pub use app_config::Config;
pub use database::DbClient;

/// The repository set the service runs against.
#[derive(Clone)]
pub struct Repositories {
    pub flights: Arc<dyn FlightSource>,
    pub bookings: Arc<dyn BookingRepository>,
    pub cities: Arc<dyn CityRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Fixture flights plus one generated batch per configured seed route.
    pub fn in_memory(seed: &app_config::SeedConfig) -> Self {
        let mut flights = fixtures::public_flights();
        let mut rng = fixtures::seeded_rng(seed.rng_seed);
        for (from, to) in seed.parsed_routes() {
            flights.extend(fixtures::generate_flights(
                &from,
                &to,
                &seed.departure_date,
                seed.flights_per_route,
                &mut rng,
            ));
        }
        tracing::info!(flights = flights.len(), "Seeded in-memory flight store");

        Self {
            flights: Arc::new(memory::InMemoryFlights::new(flights)),
            bookings: Arc::new(memory::InMemoryBookings::default()),
            cities: Arc::new(memory::InMemoryCities::new(fixtures::indian_cities())),
            users: Arc::new(memory::InMemoryUsers::default()),
        }
    }

    pub fn postgres(db: &DbClient) -> Self {
        Self {
            flights: Arc::new(flight_repo::PostgresFlightRepository::new(db.pool.clone())),
            bookings: Arc::new(booking_repo::PostgresBookingRepository::new(db.pool.clone())),
            cities: Arc::new(flight_repo::PostgresCityRepository::new(db.pool.clone())),
            users: Arc::new(user_repo::PostgresUserRepository::new(db.pool.clone())),
        }
    }

    /// PostgreSQL when `database.url` is set, the in-memory store otherwise.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        match &config.database.url {
            Some(url) => {
                let db = DbClient::new(url, config.database.max_connections).await?;
                tracing::info!("Connected to PostgreSQL");
                if config.database.run_migrations {
                    db.migrate().await?;
                }
                Ok(Self::postgres(&db))
            }
            None => {
                tracing::warn!("No database.url configured, using the in-memory store");
                Ok(Self::in_memory(&config.seed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_seeding() {
        let seed = app_config::SeedConfig {
            routes: vec!["JFK-LAX".into()],
            flights_per_route: 4,
            departure_date: "2024-01-01".into(),
            rng_seed: 1,
        };
        let repos = Repositories::in_memory(&seed);

        assert_eq!(repos.flights.fetch_flights(None, None).await.unwrap().len(), 7);
        assert_eq!(repos.flights.fetch_flights(Some("JFK"), Some("LAX")).await.unwrap().len(), 4);
        assert_eq!(repos.cities.list_cities().await.unwrap().len(), 10);
        assert!(repos.users.find_all().await.unwrap().is_empty());
    }
}
