use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::address::{check_email, Recipient, RecipientRole};
use crate::attachment::{Attachment, MESSAGE_SIZE_LIMIT};
use crate::error::BuildError;
use crate::merge::{bucket_recipient_vars, check_name, MergeLanguage, MergeVariable, RecipientVars};
use crate::template::TemplateReference;
use crate::SenderDefaults;

/// Sender identity placed in the `From` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub email: String,
    pub name: Option<String>,
}

/// The flat bag of optional delivery options the provider accepts alongside
/// the message body. Unset options are omitted from the wire payload so the
/// account-level defaults apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryFlags {
    /// Extra SMTP headers, e.g. `Reply-To` or `X-*`.
    pub headers: BTreeMap<String, String>,
    pub important: Option<bool>,
    pub track_opens: Option<bool>,
    pub track_clicks: Option<bool>,
    pub auto_text: Option<bool>,
    pub auto_html: Option<bool>,
    pub inline_css: Option<bool>,
    pub preserve_recipients: Option<bool>,
    pub view_content_link: Option<bool>,
    pub tags: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    /// Schedule delivery for a future instant (UTC on the wire).
    pub send_at: Option<OffsetDateTime>,
}

/// A validated, provider-ready email. Constructed through [`MessageBuilder`]
/// only and immutable afterwards; one instance per send invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    html: Option<String>,
    text: Option<String>,
    subject: Option<String>,
    from: Sender,
    recipients: Vec<Recipient>,
    global_merge_vars: Vec<MergeVariable>,
    merge_vars: Vec<RecipientVars>,
    merge_language: MergeLanguage,
    attachments: Vec<Attachment>,
    images: Vec<Attachment>,
    template: Option<TemplateReference>,
    flags: DeliveryFlags,
}

impl OutboundMessage {
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn from(&self) -> &Sender {
        &self.from
    }

    /// All addressees, `to`/`cc`/`bcc` roles mixed, duplicates removed.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn global_merge_vars(&self) -> &[MergeVariable] {
        &self.global_merge_vars
    }

    /// Recipient-scoped variables, bucketed per address.
    pub fn merge_vars(&self) -> &[RecipientVars] {
        &self.merge_vars
    }

    pub fn merge_language(&self) -> MergeLanguage {
        self.merge_language
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn images(&self) -> &[Attachment] {
        &self.images
    }

    pub fn template(&self) -> Option<&TemplateReference> {
        self.template.as_ref()
    }

    pub fn flags(&self) -> &DeliveryFlags {
        &self.flags
    }
}

#[derive(Debug, Clone)]
struct RawRecipient {
    address: String,
    display_name: Option<String>,
    role: RecipientRole,
}

/// Assembles one [`OutboundMessage`], validating everything up front so a bad
/// message fails with a precise reason before any network call.
///
/// ```
/// use mail_core::{MessageBuilder, RecipientRole};
///
/// let msg = MessageBuilder::direct()
///     .html("<p>Hi *|FNAME|*</p>")
///     .subject("Welcome")
///     .from("sender@example.org")
///     .to("alice@example.org")
///     .recipient_var("alice@example.org", "FNAME", "Alice")
///     .build()
///     .unwrap();
/// assert_eq!(msg.recipients().len(), 1);
/// assert_eq!(msg.recipients()[0].role, RecipientRole::To);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    html: Option<String>,
    text: Option<String>,
    subject: Option<String>,
    from_email: Option<String>,
    from_name: Option<String>,
    recipients: Vec<RawRecipient>,
    global_vars: Vec<(String, String)>,
    recipient_vars: Vec<(String, String, String)>,
    merge_language: MergeLanguage,
    attachments: Vec<Attachment>,
    images: Vec<Attachment>,
    template: Option<TemplateReference>,
    flags: DeliveryFlags,
    defaults: SenderDefaults,
}

impl MessageBuilder {
    /// Start a direct message; an HTML or text body is required at build time.
    pub fn direct() -> Self {
        Self::default()
    }

    /// Start a message rendered from a stored template. Body content is
    /// optional because the template supplies it.
    pub fn with_template(template: TemplateReference) -> Self {
        Self {
            template: Some(template),
            ..Self::default()
        }
    }

    /// Fallback sender and recipient used when the caller supplies none.
    /// Injected explicitly so the builder never reads the environment.
    pub fn defaults(mut self, defaults: &SenderDefaults) -> Self {
        self.defaults = defaults.clone();
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn from(mut self, email: impl Into<String>) -> Self {
        self.from_email = Some(email.into());
        self
    }

    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    pub fn recipient(
        mut self,
        address: impl Into<String>,
        display_name: Option<String>,
        role: RecipientRole,
    ) -> Self {
        self.recipients.push(RawRecipient {
            address: address.into(),
            display_name,
            role,
        });
        self
    }

    pub fn to(self, address: impl Into<String>) -> Self {
        self.recipient(address, None, RecipientRole::To)
    }

    pub fn to_named(self, address: impl Into<String>, name: impl Into<String>) -> Self {
        self.recipient(address, Some(name.into()), RecipientRole::To)
    }

    pub fn cc(self, address: impl Into<String>) -> Self {
        self.recipient(address, None, RecipientRole::Cc)
    }

    pub fn bcc(self, address: impl Into<String>) -> Self {
        self.recipient(address, None, RecipientRole::Bcc)
    }

    /// A merge variable applied to every recipient unless shadowed by a
    /// recipient-scoped one of the same name.
    pub fn global_var(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.global_vars.push((name.into(), content.into()));
        self
    }

    /// A merge variable for one recipient address only.
    pub fn recipient_var(
        mut self,
        rcpt: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.recipient_vars
            .push((rcpt.into(), name.into(), content.into()));
        self
    }

    pub fn merge_language(mut self, language: MergeLanguage) -> Self {
        self.merge_language = language;
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Inline image, referenced from the HTML body as `cid:<file_name>`.
    pub fn image(mut self, image: Attachment) -> Self {
        self.images.push(image);
        self
    }

    /// Replace all delivery flags at once.
    pub fn flags(mut self, flags: DeliveryFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.headers.insert(name.into(), value.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.flags.tags.push(tag.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.metadata.insert(key.into(), value.into());
        self
    }

    pub fn send_at(mut self, at: OffsetDateTime) -> Self {
        self.flags.send_at = Some(at);
        self
    }

    pub fn important(mut self, important: bool) -> Self {
        self.flags.important = Some(important);
        self
    }

    pub fn track_opens(mut self, track: bool) -> Self {
        self.flags.track_opens = Some(track);
        self
    }

    pub fn track_clicks(mut self, track: bool) -> Self {
        self.flags.track_clicks = Some(track);
        self
    }

    /// Validate everything and freeze the message.
    pub fn build(self) -> Result<OutboundMessage, BuildError> {
        let from = self.resolve_sender()?;
        let recipients = self.resolve_recipients()?;

        if self.template.is_none() && self.html.is_none() && self.text.is_none() {
            return Err(BuildError::MissingContent);
        }

        if let Some(template) = &self.template {
            if !template.overridable_regions.is_empty()
                && self.merge_language == MergeLanguage::Handlebars
            {
                return Err(BuildError::RegionOverrideUnsupported {
                    template: template.template_name.clone(),
                });
            }
        }

        let mut global_merge_vars = Vec::with_capacity(self.global_vars.len());
        for (name, content) in self.global_vars {
            check_name(&name)?;
            global_merge_vars.push(MergeVariable { name, content });
        }
        let mut scoped = Vec::with_capacity(self.recipient_vars.len());
        for (rcpt, name, content) in self.recipient_vars {
            check_name(&name)?;
            scoped.push((rcpt, MergeVariable { name, content }));
        }
        let merge_vars = bucket_recipient_vars(scoped, &recipients);

        check_size_budget(
            &self.html,
            &self.text,
            &self.subject,
            &self.flags.headers,
            &self.attachments,
            &self.images,
        )?;

        Ok(OutboundMessage {
            html: self.html,
            text: self.text,
            subject: self.subject,
            from,
            recipients,
            global_merge_vars,
            merge_vars,
            merge_language: self.merge_language,
            attachments: self.attachments,
            images: self.images,
            template: self.template,
            flags: self.flags,
        })
    }

    fn resolve_sender(&self) -> Result<Sender, BuildError> {
        let email = self
            .from_email
            .clone()
            .or_else(|| self.defaults.from_email.clone())
            .ok_or(BuildError::MissingSender)?;
        check_email(&email)?;
        let name = self
            .from_name
            .clone()
            .or_else(|| self.defaults.from_name.clone());
        Ok(Sender { email, name })
    }

    fn resolve_recipients(&self) -> Result<Vec<Recipient>, BuildError> {
        let mut raw = self.recipients.clone();
        if raw.is_empty() {
            if let Some(address) = self.defaults.to_email.clone() {
                raw.push(RawRecipient {
                    address,
                    display_name: self.defaults.to_name.clone(),
                    role: RecipientRole::To,
                });
            }
        }
        if raw.is_empty() {
            return Err(BuildError::NoRecipients);
        }
        let mut recipients: Vec<Recipient> = Vec::with_capacity(raw.len());
        for r in raw {
            check_email(&r.address)?;
            let candidate = Recipient {
                address: r.address,
                display_name: r.display_name,
                role: r.role,
            };
            // First occurrence of an (address, role) pair wins.
            if !recipients.iter().any(|kept| kept.key() == candidate.key()) {
                recipients.push(candidate);
            }
        }
        Ok(recipients)
    }
}

fn check_size_budget(
    html: &Option<String>,
    text: &Option<String>,
    subject: &Option<String>,
    headers: &BTreeMap<String, String>,
    attachments: &[Attachment],
    images: &[Attachment],
) -> Result<(), BuildError> {
    let body: u64 = [html, text, subject]
        .iter()
        .filter_map(|part| part.as_ref())
        .map(|part| part.len() as u64)
        .sum();
    let header_bytes: u64 = headers
        .iter()
        .map(|(name, value)| (name.len() + value.len()) as u64)
        .sum();
    let encoded: u64 = attachments
        .iter()
        .chain(images)
        .map(Attachment::encoded_len)
        .sum::<u64>()
        + body
        + header_bytes;
    if encoded > MESSAGE_SIZE_LIMIT {
        return Err(BuildError::AttachmentSizeExceeded {
            encoded,
            limit: MESSAGE_SIZE_LIMIT,
            overage: encoded - MESSAGE_SIZE_LIMIT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> MessageBuilder {
        MessageBuilder::direct()
            .html("<p>Hello</p>")
            .subject("Test")
            .from("sender@example.org")
    }

    #[test]
    fn single_recipient_gets_role_to() {
        let msg = base().to("alice@example.org").build().unwrap();
        assert_eq!(msg.recipients().len(), 1);
        assert_eq!(msg.recipients()[0].address, "alice@example.org");
        assert_eq!(msg.recipients()[0].role, RecipientRole::To);
    }

    #[test]
    fn duplicate_address_role_pairs_collapse() {
        let msg = base()
            .to("alice@example.org")
            .to("alice@example.org")
            .cc("alice@example.org")
            .build()
            .unwrap();
        assert_eq!(msg.recipients().len(), 2);
        assert_eq!(msg.recipients()[0].role, RecipientRole::To);
        assert_eq!(msg.recipients()[1].role, RecipientRole::Cc);
    }

    #[test]
    fn direct_message_requires_a_body() {
        let err = MessageBuilder::direct()
            .from("sender@example.org")
            .to("alice@example.org")
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingContent));
    }

    #[test]
    fn template_message_needs_no_body() {
        let msg = MessageBuilder::with_template(TemplateReference::new("template1"))
            .from("sender@example.org")
            .to("alice@example.org")
            .build()
            .unwrap();
        assert_eq!(msg.template().unwrap().template_name, "template1");
    }

    #[test]
    fn defaults_fill_sender_and_recipient() {
        let defaults = SenderDefaults {
            from_email: Some("noreply@example.org".into()),
            from_name: Some("Demo Sender".into()),
            to_email: Some("fallback@example.org".into()),
            to_name: Some("Fallback".into()),
        };
        let msg = MessageBuilder::direct()
            .text("plain body")
            .defaults(&defaults)
            .build()
            .unwrap();
        assert_eq!(msg.from().email, "noreply@example.org");
        assert_eq!(msg.from().name.as_deref(), Some("Demo Sender"));
        assert_eq!(msg.recipients()[0].address, "fallback@example.org");
    }

    #[test]
    fn explicit_sender_beats_defaults() {
        let defaults = SenderDefaults {
            from_email: Some("noreply@example.org".into()),
            ..SenderDefaults::default()
        };
        let msg = base().defaults(&defaults).to("a@example.org").build().unwrap();
        assert_eq!(msg.from().email, "sender@example.org");
    }

    #[test]
    fn missing_sender_is_reported() {
        let err = MessageBuilder::direct()
            .html("<p>x</p>")
            .to("alice@example.org")
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingSender));
    }

    #[test]
    fn empty_recipient_list_is_reported() {
        let err = base().build().unwrap_err();
        assert!(matches!(err, BuildError::NoRecipients));
    }

    #[test]
    fn bad_merge_name_is_rejected() {
        let err = base()
            .to("alice@example.org")
            .global_var("first:name", "x")
            .build()
            .unwrap_err();
        assert!(
            matches!(err, BuildError::InvalidMergeVariableName { ref name } if name == "first:name")
        );
    }

    #[test]
    fn recipient_vars_are_bucketed() {
        let msg = base()
            .to("alice@example.org")
            .global_var("company_name", "Acme")
            .recipient_var("alice@example.org", "fname", "Alice")
            .recipient_var("alice@example.org", "account_id", "ACC-001")
            .build()
            .unwrap();
        assert_eq!(msg.global_merge_vars().len(), 1);
        assert_eq!(msg.merge_vars().len(), 1);
        assert_eq!(msg.merge_vars()[0].rcpt, "alice@example.org");
        assert_eq!(msg.merge_vars()[0].vars.len(), 2);
    }

    #[test]
    fn oversize_attachment_is_rejected_with_overage() {
        // ceil(18_750_001 / 3) * 4 = 25_000_004 encoded bytes.
        let big = Attachment::new("application/pdf", "big.pdf", vec![0u8; 18_750_001]);
        let err = MessageBuilder::direct()
            .text("x")
            .from("sender@example.org")
            .to("alice@example.org")
            .attachment(big)
            .build()
            .unwrap_err();
        match err {
            BuildError::AttachmentSizeExceeded { encoded, limit, overage } => {
                assert_eq!(limit, MESSAGE_SIZE_LIMIT);
                assert!(encoded > limit);
                assert_eq!(overage, encoded - limit);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn attachment_just_under_budget_is_accepted() {
        // ceil(18_749_990 / 3) * 4 = 24_999_988, leaving room for the body.
        let a = Attachment::new("application/pdf", "big.pdf", vec![0u8; 18_749_990]);
        let msg = MessageBuilder::direct()
            .text("x")
            .from("sender@example.org")
            .to("alice@example.org")
            .attachment(a)
            .build()
            .unwrap();
        assert_eq!(msg.attachments().len(), 1);
    }

    #[test]
    fn handlebars_template_rejects_region_overrides() {
        let tref = TemplateReference::new("template1").with_region("welcome_message", "<p>Hi</p>");
        let err = MessageBuilder::with_template(tref)
            .from("sender@example.org")
            .to("alice@example.org")
            .merge_language(MergeLanguage::Handlebars)
            .build()
            .unwrap_err();
        assert!(
            matches!(err, BuildError::RegionOverrideUnsupported { ref template } if template == "template1")
        );
    }

    #[test]
    fn mailchimp_template_allows_region_overrides() {
        let tref = TemplateReference::new("template1").with_region("welcome_message", "<p>Hi</p>");
        let msg = MessageBuilder::with_template(tref)
            .from("sender@example.org")
            .to("alice@example.org")
            .build()
            .unwrap();
        assert_eq!(msg.template().unwrap().overridable_regions.len(), 1);
    }

    #[test]
    fn handlebars_template_without_overrides_is_fine() {
        let msg = MessageBuilder::with_template(TemplateReference::new("template2"))
            .from("sender@example.org")
            .to("alice@example.org")
            .merge_language(MergeLanguage::Handlebars)
            .build()
            .unwrap();
        assert_eq!(msg.merge_language(), MergeLanguage::Handlebars);
    }

    #[test]
    fn bad_recipient_address_names_the_offender() {
        let err = base().to("not-an-address").build().unwrap_err();
        assert!(
            matches!(err, BuildError::InvalidRecipient { ref address, .. } if address == "not-an-address")
        );
    }
}
