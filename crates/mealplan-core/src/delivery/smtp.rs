//! SMTP delivery using lettre.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info, warn};

use super::trait_def::{Delivery, DeliveryError, Email};

/// Port that speaks TLS from the first byte instead of upgrading with
/// STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (port 587).
    StartTls,
    /// TLS from the first byte (port 465).
    Tls,
    /// No encryption. Only for local relays such as MailDev.
    None,
}

impl SmtpSecurity {
    /// Implicit TLS on 465, STARTTLS everywhere else.
    pub fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            Self::Tls
        } else {
            Self::StartTls
        }
    }
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StartTls => "starttls",
            Self::Tls => "tls",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for SmtpSecurity {
    type Err = SmtpSecurityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "none" => Ok(Self::None),
            _ => Err(SmtpSecurityParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`SmtpSecurity`] string.
#[derive(Debug, Clone)]
pub struct SmtpSecurityParseError(pub String);

impl fmt::Display for SmtpSecurityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid SMTP security {:?} (expected starttls, tls, or none)", self.0)
    }
}

impl std::error::Error for SmtpSecurityParseError {}

/// SMTP server and account settings.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub security: SmtpSecurity,
    /// Sender address, also used as the login name.
    pub address: String,
    pub password: String,
    pub recipient: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

/// Build a lettre [`Message`] from an [`Email`].
pub fn build_message(email: &Email) -> Result<Message, DeliveryError> {
    let from = parse_mailbox(&email.from)?;
    let to = parse_mailbox(&email.to)?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())?;
    Ok(message)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|source| DeliveryError::Address {
        address: address.to_string(),
        source,
    })
}

/// [`Delivery`] over an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpDelivery {
    mailer: SmtpTransport,
    server: String,
    port: u16,
}

impl SmtpDelivery {
    /// Configure the transport. No connection is opened until the first
    /// [`Delivery::deliver`] call.
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let creds = Credentials::new(config.address.clone(), config.password.clone());
        let builder = match config.security {
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&config.server)?,
            SmtpSecurity::Tls => SmtpTransport::relay(&config.server)?,
            SmtpSecurity::None => {
                warn!(smtp_server = %config.server, "SMTP connection is unencrypted");
                SmtpTransport::builder_dangerous(&config.server)
            }
        };
        let mailer = builder
            .port(config.port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        info!(
            smtp_server = %config.server,
            smtp_port = config.port,
            security = %config.security,
            from = %config.address,
            "SMTP delivery initialized"
        );

        Ok(Self {
            mailer,
            server: config.server.clone(),
            port: config.port,
        })
    }
}

impl fmt::Debug for SmtpDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpDelivery")
            .field("server", &self.server)
            .field("port", &self.port)
            .finish()
    }
}

#[async_trait]
impl Delivery for SmtpDelivery {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn deliver(&self, email: &Email) -> Result<(), DeliveryError> {
        let message = build_message(email)?;
        let mailer = self.mailer.clone();

        // SmtpTransport blocks; keep it off the runtime thread.
        let result = tokio::task::spawn_blocking(move || mailer.send(&message)).await?;

        match result {
            Ok(_) => {
                info!(to = %email.to, "email sent");
                Ok(())
            }
            Err(e) => {
                error!(
                    error = %e,
                    smtp_server = %self.server,
                    to = %email.to,
                    "failed to send email via SMTP"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email {
            from: "planner@example.com".to_string(),
            to: "family@example.com".to_string(),
            subject: "Weekly Meal Plan".to_string(),
            body: "Monday: Congee".to_string(),
        }
    }

    #[test]
    fn build_message_sets_headers() {
        let message = build_message(&email()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: planner@example.com"));
        assert!(raw.contains("To: family@example.com"));
        assert!(raw.contains("Subject: Weekly Meal Plan"));
        assert!(raw.contains("Monday: Congee"));
    }

    #[test]
    fn build_message_rejects_bad_recipient() {
        let mut bad = email();
        bad.to = "not an address".to_string();
        let err = build_message(&bad).unwrap_err();
        assert!(
            matches!(err, DeliveryError::Address { ref address, .. } if address == "not an address"),
            "expected Address, got: {err}"
        );
    }

    #[test]
    fn config_debug_redacts_password() {
        let cfg = SmtpConfig {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            security: SmtpSecurity::StartTls,
            address: "planner@example.com".to_string(),
            password: "hunter2".to_string(),
            recipient: "family@example.com".to_string(),
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn security_defaults_by_port() {
        assert_eq!(SmtpSecurity::for_port(465), SmtpSecurity::Tls);
        assert_eq!(SmtpSecurity::for_port(587), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::for_port(25), SmtpSecurity::StartTls);
    }

    #[test]
    fn security_parses_case_insensitively() {
        assert_eq!("STARTTLS".parse::<SmtpSecurity>().unwrap(), SmtpSecurity::StartTls);
        assert_eq!("ssl".parse::<SmtpSecurity>().unwrap(), SmtpSecurity::Tls);
        assert_eq!("none".parse::<SmtpSecurity>().unwrap(), SmtpSecurity::None);
        assert!("plaintext".parse::<SmtpSecurity>().is_err());
    }

    #[test]
    fn new_does_not_connect() {
        let cfg = SmtpConfig {
            server: "smtp.invalid".to_string(),
            port: 587,
            security: SmtpSecurity::StartTls,
            address: "planner@example.com".to_string(),
            password: "pw".to_string(),
            recipient: "family@example.com".to_string(),
        };
        let delivery = SmtpDelivery::new(&cfg).unwrap();
        assert_eq!(delivery.name(), "smtp");
    }
}
