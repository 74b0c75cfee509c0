//! Backend service for a blood-donation coordination platform.
//!
//! The core of the crate is the emergency alert broadcast pipeline: matching
//! donors by blood group and postal code, notifying them over email and SMS
//! with per-channel outcome accounting, and recording inbound donor
//! responses. The donor directory, search, and leaderboard endpoints are the
//! supporting surface around it.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::alerts::{AlertDispatcher, ResponseRecorder};
use crate::config::AppConfig;
use crate::realtime::Broadcaster;

pub mod alerts;
pub mod api;
pub mod compatibility;
pub mod config;
pub mod email_templates;
pub mod entity;
pub mod error;
pub mod realtime;

#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<AlertDispatcher>,
    pub recorder: Arc<ResponseRecorder>,
    pub broadcaster: Arc<Broadcaster>,
}
