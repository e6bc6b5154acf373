use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::Recipient;
use crate::error::BuildError;

/// The tag syntax a message or stored template is authored in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeLanguage {
    /// The provider's native `*|VAR|*` / `mc:edit` syntax.
    #[default]
    #[serde(rename = "mailchimp")]
    MailchimpTags,
    /// `{{var}}` syntax.
    Handlebars,
}

impl MergeLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            MergeLanguage::MailchimpTags => "mailchimp",
            MergeLanguage::Handlebars => "handlebars",
        }
    }
}

/// A named placeholder substituted into message content at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeVariable {
    pub name: String,
    pub content: String,
}

impl MergeVariable {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Result<Self, BuildError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self {
            name,
            content: content.into(),
        })
    }
}

pub(crate) fn check_name(name: &str) -> Result<(), BuildError> {
    let ok = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !ok {
        return Err(BuildError::InvalidMergeVariableName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Merge variables scoped to a single recipient address. A recipient-scoped
/// variable shadows a same-named global for that recipient only; the
/// substitution itself happens provider-side, so both lists are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientVars {
    pub rcpt: String,
    pub vars: Vec<MergeVariable>,
}

/// Group `(rcpt, var)` pairs into per-recipient buckets, preserving first-seen
/// order of both addresses and variables.
///
/// Pairs addressed to someone outside `recipients` are kept: the provider
/// accepts them silently, and dropping caller-supplied data would hide bugs
/// worse than forwarding it. They are logged instead.
pub(crate) fn bucket_recipient_vars(
    pairs: Vec<(String, MergeVariable)>,
    recipients: &[Recipient],
) -> Vec<RecipientVars> {
    let mut buckets: Vec<RecipientVars> = Vec::new();
    for (rcpt, var) in pairs {
        match buckets.iter_mut().find(|b| b.rcpt == rcpt) {
            Some(bucket) => bucket.vars.push(var),
            None => {
                if !recipients.iter().any(|r| r.address == rcpt) {
                    warn!(rcpt = %rcpt, "recipient-scoped merge vars address no listed recipient");
                }
                buckets.push(RecipientVars {
                    rcpt,
                    vars: vec![var],
                });
            }
        }
    }
    buckets
}
