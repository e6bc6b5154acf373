use thiserror::Error;

/// Validation failures detected while assembling a payload.
///
/// Every variant is raised before any network call is attempted; a message
/// that fails to build is never partially constructed and sent.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Recipient address or role failed validation.
    #[error("invalid recipient {address:?}: {reason}")]
    InvalidRecipient {
        address: String,
        reason: &'static str,
    },
    /// Merge variable names may only contain ASCII letters, digits, and underscores.
    #[error("invalid merge variable name {name:?}: only [A-Za-z0-9_] is allowed")]
    InvalidMergeVariableName { name: String },
    /// The Base64-encoded message body would exceed the provider's size ceiling.
    #[error("message is {encoded} bytes after Base64 encoding, {overage} bytes over the {limit}-byte ceiling")]
    AttachmentSizeExceeded { encoded: u64, limit: u64, overage: u64 },
    /// Region overrides only work on templates authored with mailchimp merge tags.
    #[error("template {template:?} uses handlebars merge language; mc:edit region overrides require mailchimp tags")]
    RegionOverrideUnsupported { template: String },
    /// Phone number is not in E.164 form.
    #[error("{field} {value:?} is not E.164 (a `+` followed by 1-15 digits)")]
    InvalidPhoneFormat {
        field: &'static str,
        value: String,
    },
    /// SMS text exceeds the provider's character limit.
    #[error("sms text is {length} characters; the limit is {limit}")]
    MessageTooLong { length: usize, limit: usize },
    /// Consent tag is not one the provider recognizes.
    #[error("unknown consent type {value:?}; expected onetime, recurring, or recurring-no-confirm")]
    InvalidConsentType { value: String },
    /// A direct message needs an HTML or plain-text body.
    #[error("message needs at least one of an html or text body")]
    MissingContent,
    /// Sender identity was neither supplied nor available from defaults.
    #[error("message needs a from address (none supplied and no default configured)")]
    MissingSender,
    /// Recipient list resolved to empty.
    #[error("message needs at least one recipient")]
    NoRecipients,
}

/// Errors from the remote provider call itself.
///
/// Raised only after validation has passed and a network attempt was made.
/// None of these are retried here; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// Authentication/authorization error
    #[error("authentication error: {0}")]
    Auth(String),
    /// The configured per-call timeout elapsed
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Provider returned an error or an unparseable response
    #[error("provider error: {0}")]
    Provider(String),
    /// Unexpected error occurred
    #[error("unexpected: {0}")]
    Unexpected(String),
}
