//! # mailkit
//!
//! A typed payload builder and client for the Mandrill (Mailchimp
//! Transactional) email and SMS API.
//!
//! ## Features
//!
//! - **Validated payloads**: recipient, merge-variable, attachment, and
//!   template rules enforced before anything touches the network
//! - **Direct, template, and SMS sends**: `messages/send`,
//!   `messages/send-template`, `templates/add`, and the v1.1 SMS endpoint
//! - **Type safety**: strongly typed messages and per-recipient responses
//!   instead of dictionary-shaped payloads
//! - **Comprehensive configuration**: environment-based configuration
//!   management with injected defaults
//! - **Observability**: structured logging and tracing support
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mailkit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = config.client();
//!
//!     let message = MessageBuilder::direct()
//!         .html("<p>Hello *|FNAME|*!</p>")
//!         .subject("Hello")
//!         .defaults(&config.defaults)
//!         .to("alice@example.org")
//!         .recipient_var("alice@example.org", "FNAME", "Alice")
//!         .build()?;
//!
//!     for record in client.send(&message).await? {
//!         println!("{}: {:?}", record.email, record.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Settings layer defaults, optional `config/*` files, and environment
//! variables. Both `MAILKIT_`-prefixed keys and the plain names an existing
//! deployment would already have (`MANDRILL_API_KEY`, `DEFAULT_FROM_EMAIL`,
//! ...) are honored:
//!
//! ```rust,ignore
//! use mailkit::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("sending as {:?}", config.defaults.from_email);
//! ```

pub mod config;

pub use config::*;

/// Common imports for mailkit usage
pub mod prelude {
    pub use crate::config::{AppConfig, LoggingConfig, MandrillConfig, SmsConfig};
    pub use mail_core::*;
    pub use mail_mandrill::MandrillClient;
}
