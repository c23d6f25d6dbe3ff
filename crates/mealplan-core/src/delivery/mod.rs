//! Delivering the finished plan.
//!
//! [`Delivery`] is the seam the orchestrator talks to; [`SmtpDelivery`]
//! sends a plain-text email through an authenticated SMTP relay.

pub mod smtp;
pub mod trait_def;

pub use smtp::{SmtpConfig, SmtpDelivery, SmtpSecurity, build_message};
pub use trait_def::{Delivery, DeliveryError, Email};
