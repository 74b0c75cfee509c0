use blood_connect::AppResources;
use blood_connect::alerts::{
    AlertDispatcher, EmailChannel, NotificationChannel, ResponseRecorder, SeaOrmAuditLog,
    SeaOrmDonorDirectory, SmsChannel,
};
use blood_connect::api::start_webserver;
use blood_connect::config::load_config_or_panic;
use blood_connect::realtime::Broadcaster;
use lettre::{AsyncSmtpTransport, Tokio1Executor, transport::smtp::authentication::Credentials};
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "blood_connect=info,hyper=warn,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install().expect("Failed to install `color_eyre::install`");

    initialize_tracing();

    // Load config
    let config = Arc::new(load_config_or_panic());

    let ring_provider = crypto::ring::default_provider();
    CryptoProvider::install_default(ring_provider).expect("Failed to install crypto provider");

    // Set up SeaORM database connection
    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to database"),
    );

    // Channels are all-or-nothing: a fully present config block enables the
    // channel, an absent one disables it entirely.
    let email_channel: Option<Arc<dyn NotificationChannel>> = match &config.smtp {
        Some(smtp) => {
            let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
            let mailer = Arc::new(
                AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.server)
                    .expect("Failed to build SMTP transport")
                    .port(smtp.port)
                    .credentials(creds)
                    .build(),
            );
            Some(Arc::new(EmailChannel::new(
                mailer,
                smtp,
                &config.frontend_url,
            )))
        }
        None => {
            tracing::warn!(
                name = "main.email_channel_disabled",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                message = "No smtp config block; email channel disabled"
            );
            None
        }
    };

    let sms_channel: Option<Arc<dyn NotificationChannel>> = match &config.sms {
        Some(sms) => Some(Arc::new(SmsChannel::new(sms.clone()))),
        None => {
            tracing::warn!(
                name = "main.sms_channel_disabled",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                message = "No sms config block; SMS channel disabled"
            );
            None
        }
    };

    let broadcaster = Arc::new(Broadcaster::new());
    let directory = Arc::new(SeaOrmDonorDirectory::new(db.clone()));
    let audit = Arc::new(SeaOrmAuditLog::new(db.clone()));

    let dispatcher = Arc::new(AlertDispatcher::new(
        directory.clone(),
        email_channel,
        sms_channel,
        audit,
        broadcaster.clone(),
    ));
    let recorder = Arc::new(ResponseRecorder::new(directory, db.clone()));

    let resources = AppResources {
        db,
        config,
        dispatcher,
        recorder,
        broadcaster,
    };

    start_webserver(resources).await?;
    Ok(())
}
