use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use showtime_config::{MailEnv, SmtpConfig, TargetConfig};
use showtime_models::{FilmPresence, ProbeReport};
use std::fmt::Write as _;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Mail settings missing: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),

    #[error("Invalid email address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivers one plaintext alert. Implementations never panic; the caller
/// only looks at whether the result is `Ok`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// STARTTLS SMTP relay (Brevo by default)
pub struct SmtpNotifier {
    settings: SmtpConfig,
    env: MailEnv,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpConfig, env: MailEnv) -> Self {
        Self { settings, env }
    }

    pub fn from_env(settings: SmtpConfig) -> Self {
        Self::new(settings, MailEnv::from_env())
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let (Some(username), Some(password), Some(from), Some(to)) = (
            self.env.username.as_deref(),
            self.env.password.as_deref(),
            self.env.from.as_deref(),
            self.env.recipient(),
        ) else {
            return Err(NotifyError::MissingSettings(self.env.missing()));
        };

        let message = Message::builder()
            .from(parse_mailbox(from)?)
            .to(parse_mailbox(to)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)?
            .port(self.settings.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(self.settings.timeout()))
            .build();

        transport.send(message).await?;
        info!("Alert sent to {} via {}:{}", to, self.settings.host, self.settings.port);
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let result = self.send(subject, body).await;
        if let Err(e) = &result {
            error!("Notification not sent: {}", e);
        }
        result
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

/// Subject and body of the "showtimes are open" alert
pub fn compose_alert(target: &TargetConfig, report: &ProbeReport, now: DateTime<Utc>) -> (String, String) {
    let subject = format!("🎬 {} : séances disponibles à {}", target.film_title, target.venue_name);

    let mut body = String::new();
    let _ = writeln!(body, "Des séances pour « {} » sont réservables à {}.", target.film_title, target.venue_name);
    let _ = writeln!(body);
    let _ = writeln!(body, "Page du cinéma : {}", target.venue_url);
    let _ = writeln!(
        body,
        "Page du film : {}",
        report.film_page_url.as_deref().unwrap_or(&target.film_url)
    );
    let _ = writeln!(body);
    let _ = writeln!(body, "Détection ({}) :", report.strategy);
    let _ = writeln!(body, "- film : {}", report.film_presence);
    let _ = writeln!(
        body,
        "- film trouvé sur la page du cinéma : {}",
        yes_no(report.film_presence == FilmPresence::Located)
    );
    let _ = writeln!(
        body,
        "- page du film détectée : {}",
        report.film_page_url.as_deref().unwrap_or("aucune")
    );
    if report.showtimes.is_empty() {
        let _ = writeln!(body, "- horaires : aucun relevé");
    } else {
        let _ = writeln!(body, "- horaires ({}) : {}", report.showtime_count, report.showtimes.join(", "));
    }
    let _ = writeln!(body, "- mot-clé de réservation : {}", yes_no(report.reservation_signal));
    if report.matched_responses > 0 {
        let _ = writeln!(body, "- réponses réseau pertinentes : {}", report.matched_responses);
    }
    let _ = writeln!(body, "- erreur : {}", report.error.as_deref().unwrap_or("aucune"));
    let _ = writeln!(body);
    let _ = writeln!(body, "Vérifié le {} UTC", now.format("%Y-%m-%d %H:%M:%S"));

    (subject, body)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "oui"
    } else {
        "non"
    }
}
