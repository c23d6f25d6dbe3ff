//! The `Delivery` trait -- where finished plans are sent.

use async_trait::async_trait;
use thiserror::Error;

/// A rendered plain-text email, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors from sending an email.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("could not build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP server rejected the login; check EMAIL_PASSWORD (Gmail needs an app password): {0}")]
    Auth(lettre::transport::smtp::Error),

    #[error("SMTP error: {0}")]
    Transport(lettre::transport::smtp::Error),

    #[error("email delivery task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    /// 530/534/535 replies mean the server refused our credentials.
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let is_auth = err.status().is_some_and(|code| {
            let code = code.to_string();
            matches!(code.as_str(), "530" | "534" | "535")
        });
        if is_auth {
            Self::Auth(err)
        } else {
            Self::Transport(err)
        }
    }
}

/// Sends one email. Object-safe so the orchestrator can hold a
/// `Box<dyn Delivery>`.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Short transport name for logs (e.g. "smtp").
    fn name(&self) -> &str;

    async fn deliver(&self, email: &Email) -> Result<(), DeliveryError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn Delivery) {}
};
