use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// No URL means the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Enables `POST /api/auth/token`. Never turn on outside development.
    #[serde(default)]
    pub allow_dev_tokens: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Demo data for the in-memory store.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// `ORIGIN-DESTINATION` pairs, e.g. `JFK-LAX`.
    pub routes: Vec<String>,
    pub flights_per_route: usize,
    pub departure_date: String,
    pub rng_seed: u64,
}

impl SeedConfig {
    pub fn parsed_routes(&self) -> Vec<(String, String)> {
        self.routes
            .iter()
            .filter_map(|route| {
                let (from, to) = route.split_once('-')?;
                let (from, to) = (from.trim(), to.trim());
                if from.is_empty() || to.is_empty() {
                    tracing::warn!("Ignoring malformed seed route: {}", route);
                    return None;
                }
                Some((from.to_uppercase(), to.to_uppercase()))
            })
            .collect()
    }
}

impl Config {
    /// Built-in defaults, overridable by every later source.
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.port", 3333)?
            .set_default("database.max_connections", 5)?
            .set_default("database.run_migrations", false)?
            .set_default("auth.jwt_secret", "super-secret-key")?
            .set_default("auth.jwt_expiration_seconds", 86400)?
            .set_default("auth.allow_dev_tokens", false)?
            .set_default(
                "cors.allowed_origins",
                vec!["http://localhost:3000", "http://localhost:5173"],
            )?
            .set_default("seed.routes", Vec::<String>::new())?
            .set_default("seed.flights_per_route", 10)?
            .set_default("seed.departure_date", "2023-12-01")?
            .set_default("seed.rng_seed", 42)
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::builder()?
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SKYFARE_AUTH__JWT_SECRET=...` sets `auth.jwt_secret`
            .add_source(
                config::Environment::with_prefix("SKYFARE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("seed.routes"),
            )
            .build()?;

        s.try_deserialize()
    }
}
