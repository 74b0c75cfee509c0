//! Tests for donor response recording against an in-memory database.

use blood_connect::alerts::{ResponseRecorder, SeaOrmDonorDirectory};
use blood_connect::entity::{donor, donor_response};
use blood_connect::error::ResponseError;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    EntityTrait, Statement,
};
use std::sync::Arc;
use time::OffsetDateTime;

/// Create a test database connection with the donor tables.
async fn create_test_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
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
    ))
    .await
    .expect("create donor table");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE donor_response (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            donor_id INTEGER NOT NULL,
            blood_group_acknowledged TEXT NOT NULL,
            responded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );"#,
    ))
    .await
    .expect("create donor_response table");

    Arc::new(db)
}

async fn insert_donor(db: &DatabaseConnection, email: &str, blood_group: &str) -> i32 {
    let model = donor::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set("Test Donor".to_string()),
        email: ActiveValue::Set(email.to_string()),
        phone: ActiveValue::Set(None),
        blood_group: ActiveValue::Set(blood_group.to_string()),
        pincode: ActiveValue::Set("500001".to_string()),
        city: ActiveValue::Set(None),
        available: ActiveValue::Set(true),
        last_donation_at: ActiveValue::Set(None),
        last_response_at: ActiveValue::Set(None),
        created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
    };
    model.insert(db).await.expect("insert donor").id
}

fn recorder(db: &Arc<DatabaseConnection>) -> ResponseRecorder {
    let directory = Arc::new(SeaOrmDonorDirectory::new(db.clone()));
    ResponseRecorder::new(directory, db.clone())
}

#[tokio::test]
async fn unknown_email_records_nothing() {
    let db = create_test_db().await;
    let recorder = recorder(&db);

    let err = recorder.record("nobody@x.com", "O+").await.unwrap_err();

    assert!(matches!(err, ResponseError::UnknownDonor));
    let rows = donor_response::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn missing_parameters_are_an_invalid_link() {
    let db = create_test_db().await;
    let recorder = recorder(&db);

    assert!(matches!(
        recorder.record("", "O+").await.unwrap_err(),
        ResponseError::InvalidLink
    ));
    assert!(matches!(
        recorder.record("donor@x.com", "  ").await.unwrap_err(),
        ResponseError::InvalidLink
    ));
}

#[tokio::test]
async fn response_is_recorded_and_profile_stamped() {
    let db = create_test_db().await;
    let donor_id = insert_donor(db.as_ref(), "donor@x.com", "O+").await;
    let recorder = recorder(&db);

    recorder.record("donor@x.com", "O+").await.unwrap();

    let rows = donor_response::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].donor_id, donor_id);
    assert_eq!(rows[0].blood_group_acknowledged, "O+");

    let profile = donor::Entity::find_by_id(donor_id)
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert!(profile.last_response_at.is_some());
}

#[tokio::test]
async fn repeated_responses_append_distinct_rows() {
    let db = create_test_db().await;
    insert_donor(db.as_ref(), "donor@x.com", "O+").await;
    let recorder = recorder(&db);

    recorder.record("donor@x.com", "O+").await.unwrap();
    recorder.record("donor@x.com", "O+").await.unwrap();

    let rows = donor_response::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].id, rows[1].id);
}

#[tokio::test]
async fn surrounding_whitespace_in_email_is_tolerated() {
    let db = create_test_db().await;
    insert_donor(db.as_ref(), "donor@x.com", "A-").await;
    let recorder = recorder(&db);

    recorder.record("  donor@x.com  ", "A-").await.unwrap();

    let rows = donor_response::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}
