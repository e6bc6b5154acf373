//! # Mail Core
//!
//! Core types and transport traits for the mailkit transactional
//! email/SMS abstraction.
//!
//! This crate provides the fundamental building blocks:
//! - [`MessageBuilder`] assembling validated, provider-ready email payloads
//! - [`SmsMessage`] for the SMS equivalent
//! - [`MailTransport`] / [`SmsTransport`] traits implemented by provider crates
//! - Common types for merge variables, attachments, templates, and errors
//!
//! Every builder operation is a pure, synchronous transform: validation
//! failures ([`BuildError`]) are raised before any network call, while
//! [`TransportError`] only occurs once a provider was actually contacted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mail_core::{MailTransport, MessageBuilder};
//!
//! let message = MessageBuilder::direct()
//!     .html("<p>Hi *|FNAME|*</p>")
//!     .subject("Welcome")
//!     .from("sender@example.org")
//!     .to("alice@example.org")
//!     .recipient_var("alice@example.org", "FNAME", "Alice")
//!     .build()?;
//!
//! // Any provider implements MailTransport
//! let records = client.send(&message).await?;
//! for r in records.iter().filter(|r| r.is_rejection()) {
//!     eprintln!("{} rejected: {:?}", r.email, r.reject_reason);
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod address;
mod attachment;
mod error;
mod merge;
mod message;
mod sms;
mod template;

pub use address::{PhoneNumber, Recipient, RecipientRole};
pub use attachment::{decode_base64, encoded_len, Attachment, MESSAGE_SIZE_LIMIT};
pub use error::{BuildError, TransportError};
pub use merge::{MergeLanguage, MergeVariable, RecipientVars};
pub use message::{DeliveryFlags, MessageBuilder, OutboundMessage, Sender};
pub use sms::{ConsentType, SmsMessage, SMS_TEXT_LIMIT};
pub use template::{TemplateDefinition, TemplateInfo, TemplateReference};

/// Fallback sender/recipient identity, typically sourced from configuration
/// at start-up and injected into builders. Builders never read the
/// environment themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderDefaults {
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub to_email: Option<String>,
    pub to_name: Option<String>,
}

/// Delivery status the provider reports per recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Queued,
    Scheduled,
    Rejected,
    Invalid,
}

/// One per-recipient entry of a send response.
///
/// A `rejected` or `invalid` status is not a transport failure: the call
/// succeeded and the remaining recipients may have been accepted. Callers
/// inspect each record and report rejections individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRecord {
    pub email: String,
    pub status: SendStatus,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl SendRecord {
    pub fn is_rejection(&self) -> bool {
        matches!(self.status, SendStatus::Rejected | SendStatus::Invalid)
    }
}

/// Per-recipient entry of an SMS send response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsRecord {
    #[serde(default)]
    pub to: Option<String>,
    pub status: SendStatus,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl SmsRecord {
    pub fn is_rejection(&self) -> bool {
        matches!(self.status, SendStatus::Rejected | SendStatus::Invalid)
    }
}

/// Outbound email transport implemented by provider crates.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message, direct or template-based, and return the
    /// per-recipient status list.
    async fn send(&self, message: &OutboundMessage) -> Result<Vec<SendRecord>, TransportError>;

    /// Create (or draft) a stored template usable by template sends.
    async fn create_template(
        &self,
        template: &TemplateDefinition,
    ) -> Result<TemplateInfo, TransportError>;
}

/// Outbound SMS transport implemented by provider crates.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send_sms(&self, message: &SmsMessage) -> Result<Vec<SmsRecord>, TransportError>;
}

/// Utility to create a pseudo id if a provider doesn't return one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}
