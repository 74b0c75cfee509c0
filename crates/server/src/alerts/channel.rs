//! Notification channels for alert delivery.
//!
//! Each channel wraps one third-party transport and maps its failures into
//! [`DeliveryError`] so the dispatcher never sees transport-specific error
//! types. Every send carries its own bounded timeout; one unreachable
//! service must not stall the whole broadcast.

use crate::alerts::dispatch::AlertCriteria;
use crate::config::{SmsConfig, SmtpConfig};
use crate::email_templates::EmergencyAlertEmailTemplate;
use crate::error::DeliveryError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Request;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use lettre::message::{MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde_json::json;
use std::sync::Arc;
use tokio::time::{Duration, timeout};
use url::Url;

/// The two independent notification transports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

/// One notification transport.
///
/// `target` is channel-specific: an email address for the email channel, an
/// E.164 phone number for SMS. Implementations build their own message body
/// from the criteria.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn channel(&self) -> Channel;

    async fn send(&self, target: &str, criteria: &AlertCriteria) -> Result<(), DeliveryError>;
}

/// Email channel backed by a pooled SMTP transport.
///
/// The transport's connection pool keeps one SMTP connection open across the
/// whole recipient loop instead of reconnecting per message; the pool is
/// drained when the transport is dropped.
pub struct EmailChannel {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    frontend_url: String,
    send_timeout: Duration,
}

impl EmailChannel {
    pub fn new(
        mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
        config: &SmtpConfig,
        frontend_url: &str,
    ) -> Self {
        Self {
            mailer,
            from: config.from.clone(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            send_timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Public response link embedded in the email body.
    fn respond_url(&self, email: &str, criteria: &AlertCriteria) -> Result<String, DeliveryError> {
        let mut url = Url::parse(&format!("{}/api/alerts/respond", self.frontend_url))
            .map_err(|e| DeliveryError::invalid_message(format!("bad frontend_url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("email", email)
            .append_pair("blood_group", criteria.blood_group.as_str());
        Ok(url.into())
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    #[tracing::instrument(skip_all, fields(blood_group = %criteria.blood_group))]
    async fn send(&self, target: &str, criteria: &AlertCriteria) -> Result<(), DeliveryError> {
        let template = EmergencyAlertEmailTemplate {
            blood_group: criteria.blood_group.to_string(),
            pincode: criteria.pincode.clone(),
            contact_phone: criteria.contact_phone.clone(),
            respond_url: self.respond_url(target, criteria)?,
        };

        let html_body = template
            .render_html()
            .map_err(|e| DeliveryError::invalid_message(format!("template render failed: {e}")))?;
        let text_body = template.render_text();

        let subject = format!(
            "Urgent: {} blood needed near {}",
            criteria.blood_group, criteria.pincode
        );

        let message = lettre::Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|e| DeliveryError::invalid_message(format!("bad from address: {e}")))?)
            .to(target
                .parse()
                .map_err(|e| DeliveryError::invalid_message(format!("bad to address: {e}")))?)
            .subject(subject)
            .header(lettre::message::header::MIME_VERSION_1_0)
            .message_id(None)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(lettre::message::header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(lettre::message::header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| DeliveryError::invalid_message(format!("message build failed: {e}")))?;

        match timeout(self.send_timeout, self.mailer.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DeliveryError {
                kind: crate::error::DeliveryErrorKind::Transport,
                transient: e.is_transient(),
                message: e.to_string(),
            }),
            Err(_) => Err(DeliveryError::timeout(self.send_timeout)),
        }
    }
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// SMS channel issuing one JSON POST per message to a third-party gateway.
pub struct SmsChannel {
    client: HttpsClient,
    config: SmsConfig,
}

impl SmsChannel {
    pub fn new(config: SmsConfig) -> Self {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .expect("ring provider supports the default TLS schemes")
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);
        Self { client, config }
    }

    fn message_endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/messages",
            self.config.gateway_url.trim_end_matches('/'),
            self.config.account_id
        )
    }

    fn auth_header(&self) -> String {
        let raw = format!("{}:{}", self.config.account_id, self.config.auth_token);
        format!("Basic {}", BASE64.encode(raw))
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    #[tracing::instrument(skip_all, fields(blood_group = %criteria.blood_group))]
    async fn send(&self, target: &str, criteria: &AlertCriteria) -> Result<(), DeliveryError> {
        let body = json!({
            "from": self.config.from_number,
            "to": target,
            "body": format!(
                "URGENT: {} blood needed near {}. If you can donate, call {}. - Blood-Connect",
                criteria.blood_group, criteria.pincode, criteria.contact_phone
            ),
        });

        let request = Request::post(self.message_endpoint())
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .map_err(|e| DeliveryError::invalid_message(format!("request build failed: {e}")))?;

        let send_timeout = Duration::from_secs(self.config.timeout_secs);
        let response = match timeout(send_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(DeliveryError::transport(e.to_string())),
            Err(_) => return Err(DeliveryError::timeout(send_timeout)),
        };

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            // 5xx and 429 are worth retrying in a future dispatch; other 4xx
            // responses mean the request itself is wrong.
            Err(DeliveryError {
                kind: crate::error::DeliveryErrorKind::Transport,
                transient: status.is_server_error() || status.as_u16() == 429,
                message: format!("gateway returned {status}"),
            })
        }
    }
}
