mod config;
mod error;
mod logging;
pub mod services;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use chrono::Duration;

use crate::adapters::api::{configure_routes, ApiState};
use crate::adapters::source::{EventSource, HttpSource, JsonFileSource};

pub use config::AppConfig;
pub use error::AppError;

use services::DashboardService;

pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let config = AppConfig::from_env()?;

    tracing::info!(
        events_url = config.events_url.as_deref().unwrap_or("-"),
        events_file = config.events_file.as_deref().unwrap_or("-"),
        target_timezone = %config.target_timezone,
        location_name = %config.location_name,
        http_bind = %config.http_bind,
        cache_ttl_seconds = config.cache_ttl_seconds,
        recent_events_limit = config.recent_events_limit,
        "application bootstrap initialized"
    );

    serve(config)
}

fn serve(config: AppConfig) -> Result<(), AppError> {
    let service = Arc::new(DashboardService::new(
        build_source(&config),
        config.target_timezone,
        Duration::seconds(config.cache_ttl_seconds as i64),
        config.recent_events_limit,
    ));
    let state = ApiState {
        service,
        location_name: config.location_name.clone(),
    };

    tracing::info!(bind = %config.http_bind, "http server starting");

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .wrap(Cors::permissive())
                    .app_data(web::Data::new(state.clone()))
                    .configure(configure_routes)
            })
            .bind(&config.http_bind)?
            .run()
            .await
        })
        .map_err(AppError::runtime)
}

fn build_source(config: &AppConfig) -> Box<dyn EventSource> {
    match (&config.events_url, &config.events_file) {
        (Some(url), _) => Box::new(HttpSource::new(url.clone())),
        (None, Some(path)) => Box::new(JsonFileSource::new(path.clone())),
        // AppConfig::from_lookup rejects the all-empty case.
        (None, None) => Box::new(JsonFileSource::new("./events.json")),
    }
}
