use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::PhoneNumber;
use crate::error::BuildError;

/// Provider-enforced ceiling on SMS text length, in characters.
pub const SMS_TEXT_LIMIT: usize = 1600;

/// The recipient's opt-in status, required by some regulatory regimes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentType {
    #[default]
    #[serde(rename = "onetime")]
    Onetime,
    #[serde(rename = "recurring")]
    Recurring,
    #[serde(rename = "recurring-no-confirm")]
    RecurringNoConfirm,
}

impl ConsentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsentType::Onetime => "onetime",
            ConsentType::Recurring => "recurring",
            ConsentType::RecurringNoConfirm => "recurring-no-confirm",
        }
    }
}

impl FromStr for ConsentType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onetime" => Ok(ConsentType::Onetime),
            "recurring" => Ok(ConsentType::Recurring),
            "recurring-no-confirm" => Ok(ConsentType::RecurringNoConfirm),
            other => Err(BuildError::InvalidConsentType {
                value: other.to_string(),
            }),
        }
    }
}

/// A validated SMS, ready for the provider's send-sms endpoint. Like its
/// email counterpart, construction validates everything up front and the
/// value is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    text: String,
    to: PhoneNumber,
    from: PhoneNumber,
    consent: ConsentType,
    track_clicks: bool,
}

impl SmsMessage {
    pub fn build(
        text: impl Into<String>,
        to_number: &str,
        from_number: &str,
        consent: ConsentType,
        track_clicks: bool,
    ) -> Result<Self, BuildError> {
        let text = text.into();
        let length = text.chars().count();
        if length > SMS_TEXT_LIMIT {
            return Err(BuildError::MessageTooLong {
                length,
                limit: SMS_TEXT_LIMIT,
            });
        }
        Ok(Self {
            text,
            to: PhoneNumber::parse("to_number", to_number)?,
            from: PhoneNumber::parse("from_number", from_number)?,
            consent,
            track_clicks,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn to(&self) -> &PhoneNumber {
        &self.to
    }

    pub fn from(&self) -> &PhoneNumber {
        &self.from
    }

    pub fn consent(&self) -> ConsentType {
        self.consent
    }

    pub fn track_clicks(&self) -> bool {
        self.track_clicks
    }
}
