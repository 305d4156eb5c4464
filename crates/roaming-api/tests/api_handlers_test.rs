//! Integration tests for the HTTP API
//!
//! Runs the full route table against the in-memory storage backend.

use actix_web::{http::StatusCode, test, web, App};
use chrono::{Duration, TimeZone, Utc};
use roaming_api::{configure, query_config, AppState};
use roaming_core::{
    config::{
        AppConfig, DatabaseConfig, DirectoryConfig, GeneratorConfig, ReportsConfig,
        ServerConfig, StorageBackend,
    },
    models::{CallDirection, Cdr},
    traits::CdrRepository,
};
use roaming_db::Storage;
use serde_json::Value;

fn test_config(reports_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
            cors_origins: String::new(),
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 1,
            run_migrations: false,
        },
        generator: GeneratorConfig {
            window_months: 1,
            seed: Some(7),
            ..GeneratorConfig::default()
        },
        directory: DirectoryConfig::default(),
        reports: ReportsConfig {
            dir: reports_dir.to_string_lossy().into_owned(),
        },
    }
}

fn feb(day: u32, hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, day, hour, 0, 0).unwrap()
}

async fn seeded_storage() -> Storage {
    let storage = Storage::in_memory();
    storage
        .cdrs
        .append_batch(&[
            Cdr::new(
                CallDirection::Outgoing,
                "79991112233",
                "79992221122",
                feb(3, 10),
                feb(3, 10) + Duration::seconds(300),
            ),
            Cdr::new(
                CallDirection::Incoming,
                "79992221122",
                "79991112233",
                feb(4, 10),
                feb(4, 10) + Duration::seconds(120),
            ),
        ])
        .await
        .unwrap();
    storage
}

macro_rules! app {
    ($storage:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(&$storage, &$config)))
                .app_data(query_config())
                .configure(configure),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(Storage::in_memory(), test_config(dir.path()));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn test_usage_for_month() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(seeded_storage().await, test_config(dir.path()));

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/79991112233?month=2025-02")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["msisdn"], "79991112233");
    assert_eq!(body["outcomingCall"]["totalTime"], "00:05:00");
    assert_eq!(body["incomingCall"]["totalTime"], "00:02:00");
}

#[actix_rt::test]
async fn test_usage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(seeded_storage().await, test_config(dir.path()));

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/79991112233?month=not-a-month")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/79991112233?month=2024-06")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[actix_rt::test]
async fn test_all_usage() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(seeded_storage().await, test_config(dir.path()));

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/all?month=2025-02")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let usage = body.as_object().unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage["79991112233"]["outgoingSeconds"], 300);
    assert_eq!(usage["79992221122"]["incomingSeconds"], 120);

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/all?month=2024-01")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body.as_object().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_all_usage_requires_month() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(seeded_storage().await, test_config(dir.path()));

    let req = test::TestRequest::get().uri("/api/v1/udr/all").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_list_and_report_cdrs() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(seeded_storage().await, test_config(dir.path()));

    let req = test::TestRequest::get()
        .uri("/api/v1/cdr/79992221122?startDate=2025-02-01T00:00:00&endDate=2025-02-28T23:59:59")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let cdrs = body["data"].as_array().unwrap();
    assert_eq!(cdrs.len(), 2);
    assert_eq!(cdrs[0]["callType"], "01");

    let req = test::TestRequest::post()
        .uri("/api/v1/cdr/generate-report?msisdn=79991112233&startDate=2025-02-01T00:00:00&endDate=2025-02-28T23:59:59")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["records"], 2);

    let file_name = body["data"]["fileName"].as_str().unwrap();
    let content = std::fs::read_to_string(dir.path().join(file_name)).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[actix_rt::test]
async fn test_report_rejects_bad_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(seeded_storage().await, test_config(dir.path()));

    let req = test::TestRequest::post()
        .uri("/api/v1/cdr/generate-report?msisdn=79991112233&startDate=2025-02-01&endDate=2025-02-28T23:59:59")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_report_rejects_unsafe_input() {
    let dir = tempfile::tempdir().unwrap();
    let reports_dir = dir.path().join("reports");
    let app = app!(seeded_storage().await, test_config(&reports_dir));

    let req = test::TestRequest::post()
        .uri("/api/v1/cdr/generate-report?msisdn=..%2Fx&startDate=2025-02-01T00:00:00&endDate=2025-02-28T23:59:59")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let req = test::TestRequest::get()
        .uri("/api/v1/cdr/79991112233?startDate=%2B262142-12-31T23:59:59&endDate=%2B262142-12-31T23:59:59")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_generate_requires_subscribers() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(Storage::in_memory(), test_config(dir.path()));

    let req = test::TestRequest::post().uri("/api/v1/cdr/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "configuration_error");
}

#[actix_rt::test]
async fn test_seed_then_generate() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::in_memory();
    let config = test_config(dir.path());
    let state = AppState::new(&storage, &config);
    assert_eq!(state.directory.seed_defaults().await.unwrap(), 10);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(query_config())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/subscribers").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    let req = test::TestRequest::post().uri("/api/v1/cdr/generate").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let records = body["data"]["records"].as_i64().unwrap();
    assert!(records > 0);
    assert_eq!(storage.cdrs.count().await.unwrap(), records);
}
