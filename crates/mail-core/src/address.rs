use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// How a recipient receives the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    To,
    Cc,
    Bcc,
}

impl RecipientRole {
    /// Wire string expected by the provider's `to[].type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientRole::To => "to",
            RecipientRole::Cc => "cc",
            RecipientRole::Bcc => "bcc",
        }
    }
}

/// One addressee of an outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: String,
    pub display_name: Option<String>,
    pub role: RecipientRole,
}

impl Recipient {
    pub fn new(address: impl Into<String>, role: RecipientRole) -> Result<Self, BuildError> {
        let address = address.into();
        check_email(&address)?;
        Ok(Self {
            address,
            display_name: None,
            role,
        })
    }

    pub fn with_name(
        address: impl Into<String>,
        display_name: impl Into<String>,
        role: RecipientRole,
    ) -> Result<Self, BuildError> {
        let mut r = Self::new(address, role)?;
        r.display_name = Some(display_name.into());
        Ok(r)
    }

    /// Dedup key; duplicate `(address, role)` pairs are meaningless to the provider.
    pub(crate) fn key(&self) -> (&str, RecipientRole) {
        (self.address.as_str(), self.role)
    }
}

/// Shallow plausibility check, not an RFC 5321 parser. The provider performs
/// its own verification and reports per-recipient rejections.
pub(crate) fn check_email(address: &str) -> Result<(), BuildError> {
    let fail = |reason| BuildError::InvalidRecipient {
        address: address.to_string(),
        reason,
    };
    if address.chars().any(char::is_whitespace) {
        return Err(fail("contains whitespace"));
    }
    let (local, domain) = address.rsplit_once('@').ok_or_else(|| fail("missing @"))?;
    if local.is_empty() {
        return Err(fail("empty local part"));
    }
    if domain.is_empty() {
        return Err(fail("empty domain"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(fail("malformed domain"));
    }
    Ok(())
}

/// E.164 phone number: `+` followed by 1-15 digits, no separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse and validate. `field` names the input for error reporting
    /// (e.g. `"to_number"`).
    pub fn parse(field: &'static str, value: impl Into<String>) -> Result<Self, BuildError> {
        let value = value.into();
        let digits = match value.strip_prefix('+') {
            Some(rest) => rest,
            None => {
                return Err(BuildError::InvalidPhoneFormat { field, value });
            }
        };
        let ok = (1..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
        if !ok {
            return Err(BuildError::InvalidPhoneFormat { field, value });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
