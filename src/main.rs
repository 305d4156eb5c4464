//! Roaming CDR service
//!
//! Synthesizes a year of call detail records for a fixed subscriber
//! population and serves usage reports (UDRs) derived from them.

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use roaming_api::{configure, query_config, AppState};
use roaming_core::AppConfig;
use roaming_db::create_storage;
use std::env;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` applies to the service
/// crates. `LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "roaming_cdr={0},roaming_api={0},roaming_services={0},roaming_db={0},actix_web=info,sqlx=warn",
            log_level
        ))
    });

    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing();

    info!("Starting Roaming CDR service v{}", env!("CARGO_PKG_VERSION"));

    let storage = create_storage(&config.database)
        .await
        .context("Failed to initialize record store")?;

    let state = web::Data::new(AppState::new(&storage, &config));

    let seeded = state
        .directory
        .seed_defaults()
        .await
        .context("Failed to seed subscriber directory")?;
    if seeded == 0 {
        info!("Subscriber directory already populated");
    }

    if config.generator.run_on_startup {
        let generation = state.clone();
        actix_web::rt::spawn(async move {
            match generation.generator.run_generation().await {
                Ok(stats) => info!(
                    "Startup generation stored {} CDRs in {} batches",
                    stats.records, stats.batches
                ),
                Err(e) => error!("Startup generation failed: {}", e),
            }
        });
    } else {
        warn!("Startup generation disabled; use POST /api/v1/cdr/generate");
    }

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origins.clone();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| cors_origins_inner.split(',').any(|allowed| allowed.trim() == o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(query_config())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(configure)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
