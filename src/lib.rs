#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod jwt;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

#[cfg(feature = "server")]
pub use server::{load_server_config, run};

#[cfg(feature = "server")]
mod server {
    use std::env;

    use actix_cors::Cors;
    use actix_web::{App, HttpServer, middleware, web};
    use config::{Config, ConfigError};

    use crate::db::{establish_connection_pool, run_pending_migrations};
    use crate::models::config::ServerConfig;
    use crate::repository::DieselRepository;
    use crate::routes;

    /// Loads `config/default.yaml`, the `config/{APP_ENV}.yaml` overrides
    /// (`local` by default) and `APP_*` environment variables.
    pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize::<ServerConfig>()
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        // Establish Diesel connection pool for the SQLite database.
        let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
            std::io::Error::other(format!("Failed to establish database connection: {e}"))
        })?;

        let applied = run_pending_migrations(&pool)
            .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;
        if applied > 0 {
            log::info!("Applied {applied} pending migration(s)");
        }

        let repo = DieselRepository::new(pool);
        let auth_config = server_config.auth();
        let bind_address = (server_config.address.clone(), server_config.port);

        log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .configure(routes::configure)
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(auth_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
