//! HTTP handler tests for the API endpoints.
//!
//! Uses an in-memory SQLite database and a dispatcher with both channels
//! disabled, so handler semantics can be tested without any transport.

use axum_test::TestServer;
use blood_connect::alerts::{
    AlertDispatcher, ResponseRecorder, SeaOrmAuditLog, SeaOrmDonorDirectory,
};
use blood_connect::api::{alerts, donors, events, health, openapi};
use blood_connect::config::AppConfig;
use blood_connect::entity::{alert, donor_response};
use blood_connect::realtime::Broadcaster;
use blood_connect::AppResources;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, Statement};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Create a test database connection with all four tables.
async fn create_test_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    for ddl in [
        r#"CREATE TABLE donor (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NULL,
            blood_group TEXT NOT NULL,
            pincode TEXT NOT NULL,
            city TEXT NULL,
            available BOOLEAN NOT NULL DEFAULT 1,
            last_donation_at TEXT NULL,
            last_response_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );"#,
        r#"CREATE TABLE alert (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            blood_group TEXT NOT NULL,
            pincode TEXT NOT NULL,
            contact_phone TEXT NOT NULL,
            triggered_by INTEGER NOT NULL,
            used_fallback BOOLEAN NOT NULL DEFAULT 0,
            matched_count INTEGER NOT NULL,
            email_sent INTEGER NOT NULL,
            email_failed INTEGER NOT NULL,
            sms_sent INTEGER NOT NULL,
            sms_failed INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );"#,
        r#"CREATE TABLE donor_response (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            donor_id INTEGER NOT NULL,
            blood_group_acknowledged TEXT NOT NULL,
            responded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );"#,
        r#"CREATE TABLE notification_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            donor_email TEXT NOT NULL,
            channel TEXT NOT NULL,
            success BOOLEAN NOT NULL,
            error TEXT NULL,
            sent_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );"#,
    ] {
        db.execute(Statement::from_string(DbBackend::Sqlite, ddl))
            .await
            .expect("create table");
    }

    Arc::new(db)
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        database_url: "sqlite::memory:".to_string(),
        frontend_url: "https://blood-connect.example".to_string(),
        smtp: None,
        sms: None,
    })
}

async fn test_server() -> (TestServer, Arc<DatabaseConnection>) {
    let db = create_test_db().await;
    let directory = Arc::new(SeaOrmDonorDirectory::new(db.clone()));
    let audit = Arc::new(SeaOrmAuditLog::new(db.clone()));
    let broadcaster = Arc::new(Broadcaster::new());

    let dispatcher = Arc::new(AlertDispatcher::new(
        directory.clone(),
        None,
        None,
        audit,
        broadcaster.clone(),
    ));
    let recorder = Arc::new(ResponseRecorder::new(directory, db.clone()));

    let resources = AppResources {
        db: db.clone(),
        config: test_config(),
        dispatcher,
        recorder,
        broadcaster,
    };

    let (router, _api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api/alerts", alerts::router())
        .nest("/api/donors", donors::router())
        .routes(routes!(events::events))
        .routes(routes!(health::health))
        .layer(axum::Extension(resources))
        .split_for_parts();

    (TestServer::new(router).expect("test server"), db)
}

async fn register_donor(server: &TestServer, email: &str, blood_group: &str, pincode: &str) {
    let response = server
        .post("/api/donors/register")
        .json(&json!({
            "name": "Test Donor",
            "email": email,
            "blood_group": blood_group,
            "pincode": pincode,
        }))
        .await;
    assert_eq!(response.status_code(), 201);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn healthz_returns_ok() {
    let (server, _db) = test_server().await;
    let response = server.get("/healthz").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "ok");
}

// =============================================================================
// Emergency alert endpoint
// =============================================================================

#[tokio::test]
async fn emergency_with_no_donors_is_404() {
    let (server, _db) = test_server().await;
    let response = server
        .post("/api/alerts/emergency")
        .json(&json!({
            "blood_group": "O-",
            "pincode": "500001",
            "contact_phone": "9999999999",
            "triggered_by": 1,
        }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn emergency_with_unknown_blood_group_is_400() {
    let (server, _db) = test_server().await;
    let response = server
        .post("/api/alerts/emergency")
        .json(&json!({
            "blood_group": "Z+",
            "pincode": "500001",
            "contact_phone": "9999999999",
            "triggered_by": 1,
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn emergency_with_empty_pincode_is_400() {
    let (server, _db) = test_server().await;
    let response = server
        .post("/api/alerts/emergency")
        .json(&json!({
            "blood_group": "O-",
            "pincode": "",
            "contact_phone": "9999999999",
            "triggered_by": 1,
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn emergency_dispatch_writes_audit_row() {
    let (server, db) = test_server().await;
    register_donor(&server, "d1@x.com", "O-", "500001").await;

    let response = server
        .post("/api/alerts/emergency")
        .json(&json!({
            "blood_group": "O-",
            "pincode": "500001",
            "contact_phone": "9999999999",
            "triggered_by": 1,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let summary: Value = response.json();
    assert_eq!(summary["matched"], 1);
    assert_eq!(summary["used_fallback"], false);
    // Both channels are disabled in this harness, so no attempts are counted.
    assert_eq!(summary["email_sent"], 0);
    assert_eq!(summary["email_failed"], 0);

    let audit_rows = alert::Entity::find().all(db.as_ref()).await.unwrap();
    assert_eq!(audit_rows.len(), 1);
    assert_eq!(audit_rows[0].blood_group, "O-");
    assert_eq!(audit_rows[0].matched_count, 1);
    assert!(!audit_rows[0].used_fallback);
}

#[tokio::test]
async fn emergency_uses_fallback_when_region_has_no_match() {
    let (server, db) = test_server().await;
    register_donor(&server, "far@x.com", "O-", "110001").await;

    let response = server
        .post("/api/alerts/emergency")
        .json(&json!({
            "blood_group": "O-",
            "pincode": "500001",
            "contact_phone": "9999999999",
            "triggered_by": 1,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let summary: Value = response.json();
    assert_eq!(summary["used_fallback"], true);
    assert_eq!(summary["matched"], 1);

    let audit_rows = alert::Entity::find().all(db.as_ref()).await.unwrap();
    assert!(audit_rows[0].used_fallback);
}

// =============================================================================
// Response endpoint
// =============================================================================

#[tokio::test]
async fn respond_without_parameters_is_400() {
    let (server, _db) = test_server().await;
    let response = server.get("/api/alerts/respond").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn respond_is_neutral_for_unknown_and_known_donors() {
    let (server, db) = test_server().await;
    register_donor(&server, "donor@x.com", "O+", "500001").await;

    let known = server
        .get("/api/alerts/respond")
        .add_query_param("email", "donor@x.com")
        .add_query_param("blood_group", "O+")
        .await;
    let unknown = server
        .get("/api/alerts/respond")
        .add_query_param("email", "stranger@x.com")
        .add_query_param("blood_group", "O+")
        .await;

    // Identical status and body for both, so the endpoint cannot be used to
    // probe which emails are registered.
    assert_eq!(known.status_code(), 200);
    assert_eq!(unknown.status_code(), 200);
    assert_eq!(known.text(), unknown.text());

    // Only the known donor actually produced a row.
    let rows = donor_response::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

// =============================================================================
// Donor endpoints
// =============================================================================

#[tokio::test]
async fn duplicate_registration_is_409() {
    let (server, _db) = test_server().await;
    register_donor(&server, "donor@x.com", "A+", "500001").await;

    let response = server
        .post("/api/donors/register")
        .json(&json!({
            "name": "Someone Else",
            "email": "donor@x.com",
            "blood_group": "A+",
            "pincode": "500002",
        }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn search_returns_compatible_donors_exact_match_first() {
    let (server, _db) = test_server().await;
    register_donor(&server, "exact@x.com", "O+", "500001").await;
    register_donor(&server, "universal@x.com", "O-", "500001").await;
    // A+ cannot donate to an O+ patient and must not appear.
    register_donor(&server, "incompatible@x.com", "A+", "500001").await;

    let response = server
        .get("/api/donors/search")
        .add_query_param("blood_group", "O+")
        .await;
    assert_eq!(response.status_code(), 200);

    let matches: Vec<Value> = response.json();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["blood_group"], "O+");
    assert_eq!(matches[1]["blood_group"], "O-");
}

#[tokio::test]
async fn leaderboard_orders_by_response_count() {
    let (server, _db) = test_server().await;
    register_donor(&server, "often@x.com", "B+", "500001").await;
    register_donor(&server, "once@x.com", "B-", "500001").await;

    for _ in 0..3 {
        server
            .get("/api/alerts/respond")
            .add_query_param("email", "often@x.com")
            .add_query_param("blood_group", "B+")
            .await;
    }
    server
        .get("/api/alerts/respond")
        .add_query_param("email", "once@x.com")
        .add_query_param("blood_group", "B-")
        .await;

    let response = server.get("/api/donors/leaderboard").await;
    assert_eq!(response.status_code(), 200);

    let entries: Vec<Value> = response.json();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["responses"], 3);
    assert_eq!(entries[1]["responses"], 1);
}
