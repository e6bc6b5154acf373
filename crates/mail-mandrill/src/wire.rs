//! Serde view of the provider's documented request schemas.
//!
//! Field names here are the wire contract; internal code works with the
//! typed aggregates from `mail_core` and only crosses into these shapes at
//! the transport boundary. Unset options are omitted entirely so the
//! account-level defaults apply.

use std::collections::BTreeMap;

use mail_core::{Attachment, MergeVariable, OutboundMessage, RecipientVars, SmsMessage, TemplateDefinition};
use serde::Serialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::UtcOffset;

/// `send_at` travels as `YYYY-MM-DD HH:MM:SS`, UTC.
const SEND_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Serialize)]
pub struct WireRecipient<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(rename = "type")]
    pub role: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WireVar<'a> {
    pub name: &'a str,
    pub content: &'a str,
}

impl<'a> From<&'a MergeVariable> for WireVar<'a> {
    fn from(v: &'a MergeVariable) -> Self {
        Self {
            name: &v.name,
            content: &v.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireRecipientVars<'a> {
    pub rcpt: &'a str,
    pub vars: Vec<WireVar<'a>>,
}

impl<'a> From<&'a RecipientVars> for WireRecipientVars<'a> {
    fn from(rv: &'a RecipientVars) -> Self {
        Self {
            rcpt: &rv.rcpt,
            vars: rv.vars.iter().map(WireVar::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireAttachment<'a> {
    #[serde(rename = "type")]
    pub mime_type: &'a str,
    pub name: &'a str,
    /// Base64 of the raw bytes.
    pub content: String,
}

impl<'a> From<&'a Attachment> for WireAttachment<'a> {
    fn from(a: &'a Attachment) -> Self {
        Self {
            mime_type: &a.mime_type,
            name: &a.file_name,
            content: a.to_base64(),
        }
    }
}

/// The `message` object shared by the send and send-template endpoints.
#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<&'a str>,
    pub from_email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<&'a str>,
    /// All roles in one list; each entry carries its own `type`.
    pub to: Vec<WireRecipient<'a>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_merge_vars: Vec<WireVar<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merge_vars: Vec<WireRecipientVars<'a>>,
    pub merge_language: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<WireAttachment<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<WireAttachment<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_recipients: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_content_link: Option<bool>,
}

impl<'a> WireMessage<'a> {
    pub fn from_message(msg: &'a OutboundMessage) -> Self {
        let flags = msg.flags();
        Self {
            html: msg.html(),
            text: msg.text(),
            subject: msg.subject(),
            from_email: &msg.from().email,
            from_name: msg.from().name.as_deref(),
            to: msg
                .recipients()
                .iter()
                .map(|r| WireRecipient {
                    email: &r.address,
                    name: r.display_name.as_deref(),
                    role: r.role.as_str(),
                })
                .collect(),
            headers: &flags.headers,
            global_merge_vars: msg.global_merge_vars().iter().map(WireVar::from).collect(),
            merge_vars: msg.merge_vars().iter().map(WireRecipientVars::from).collect(),
            merge_language: msg.merge_language().as_str(),
            attachments: msg.attachments().iter().map(WireAttachment::from).collect(),
            images: msg.images().iter().map(WireAttachment::from).collect(),
            tags: flags.tags.iter().map(String::as_str).collect(),
            metadata: &flags.metadata,
            send_at: flags
                .send_at
                .and_then(|at| at.to_offset(UtcOffset::UTC).format(&SEND_AT_FORMAT).ok()),
            important: flags.important,
            track_opens: flags.track_opens,
            track_clicks: flags.track_clicks,
            auto_text: flags.auto_text,
            auto_html: flags.auto_html,
            inline_css: flags.inline_css,
            preserve_recipients: flags.preserve_recipients,
            view_content_link: flags.view_content_link,
        }
    }
}

/// `POST /api/1.0/messages/send.json`
#[derive(Debug, Serialize)]
pub struct SendBody<'a> {
    pub key: &'a str,
    pub message: WireMessage<'a>,
}

/// `POST /api/1.0/messages/send-template.json`
#[derive(Debug, Serialize)]
pub struct SendTemplateBody<'a> {
    pub key: &'a str,
    pub template_name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub template_content: Vec<WireVar<'a>>,
    pub message: WireMessage<'a>,
}

/// `POST /api/1.0/templates/add.json`
#[derive(Debug, Serialize)]
pub struct AddTemplateBody<'a> {
    pub key: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<&'a str>,
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    pub publish: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<&'a str>,
}

impl<'a> AddTemplateBody<'a> {
    pub fn new(key: &'a str, template: &'a TemplateDefinition) -> Self {
        Self {
            key,
            name: &template.name,
            from_email: template.from_email.as_deref(),
            from_name: template.from_name.as_deref(),
            subject: template.subject.as_deref(),
            code: &template.code,
            text: template.text.as_deref(),
            publish: template.publish,
            labels: template.labels.iter().map(String::as_str).collect(),
        }
    }
}

/// `POST /api/1.1/messages/send-sms` (API 1.1; the SMS endpoint never made it
/// into the 1.0 surface).
#[derive(Debug, Serialize)]
pub struct SendSmsBody<'a> {
    pub key: &'a str,
    pub message: SmsEnvelope<'a>,
}

#[derive(Debug, Serialize)]
pub struct SmsEnvelope<'a> {
    pub sms: WireSms<'a>,
}

#[derive(Debug, Serialize)]
pub struct WireSms<'a> {
    pub text: &'a str,
    pub to: &'a str,
    pub from: &'a str,
    pub consent: &'static str,
    pub track_clicks: bool,
}

impl<'a> SendSmsBody<'a> {
    pub fn new(key: &'a str, sms: &'a SmsMessage) -> Self {
        Self {
            key,
            message: SmsEnvelope {
                sms: WireSms {
                    text: sms.text(),
                    to: sms.to().as_str(),
                    from: sms.from().as_str(),
                    consent: sms.consent().as_str(),
                    track_clicks: sms.track_clicks(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail_core::{ConsentType, MergeLanguage, MessageBuilder, TemplateReference};
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn single_recipient_merge_var_scenario() {
        let msg = MessageBuilder::direct()
            .html("<p>Hi {{fname}}</p>")
            .from("sender@example.org")
            .to("alice@example.org")
            .recipient_var("alice@example.org", "fname", "Alice")
            .merge_language(MergeLanguage::Handlebars)
            .build()
            .unwrap();
        let value = serde_json::to_value(WireMessage::from_message(&msg)).unwrap();
        assert_eq!(value["to"], json!([{"email": "alice@example.org", "type": "to"}]));
        assert_eq!(
            value["merge_vars"],
            json!([{"rcpt": "alice@example.org", "vars": [{"name": "fname", "content": "Alice"}]}])
        );
        assert_eq!(value["merge_language"], "handlebars");
        // Unset options must not leak account-default overrides.
        for absent in ["attachments", "images", "tags", "metadata", "headers", "send_at", "track_opens"] {
            assert!(value.get(absent).is_none(), "{absent} should be omitted");
        }
    }

    #[test]
    fn kitchen_sink_fields_serialize_under_provider_names() {
        let msg = MessageBuilder::direct()
            .html("<h1>Hello *|FNAME|*</h1>")
            .text("Hello *|FNAME|*")
            .subject("Features demo")
            .from("sender@example.org")
            .from_name("Demo Sender")
            .to_named("alice@example.org", "Alice")
            .cc("cc@example.org")
            .bcc("bcc@example.org")
            .header("Reply-To", "sender@example.org")
            .global_var("company_name", "Acme")
            .attachment(mail_core::Attachment::new("application/pdf", "sample.pdf", b"%PDF".to_vec()))
            .image(mail_core::Attachment::new("image/png", "logo", vec![1, 2, 3]))
            .tag("demo")
            .metadata("campaign", "demo")
            .send_at(datetime!(2030-01-02 03:04:05 UTC))
            .important(true)
            .track_opens(true)
            .track_clicks(true)
            .build()
            .unwrap();
        let value = serde_json::to_value(WireMessage::from_message(&msg)).unwrap();
        assert_eq!(value["from_email"], "sender@example.org");
        assert_eq!(value["from_name"], "Demo Sender");
        assert_eq!(value["to"][0]["name"], "Alice");
        assert_eq!(value["to"][1]["type"], "cc");
        assert_eq!(value["to"][2]["type"], "bcc");
        assert_eq!(value["headers"]["Reply-To"], "sender@example.org");
        assert_eq!(value["global_merge_vars"][0]["name"], "company_name");
        assert_eq!(value["merge_language"], "mailchimp");
        assert_eq!(value["attachments"][0]["type"], "application/pdf");
        assert_eq!(value["attachments"][0]["content"], "JVBERg==");
        assert_eq!(value["images"][0]["name"], "logo");
        assert_eq!(value["tags"], json!(["demo"]));
        assert_eq!(value["metadata"]["campaign"], "demo");
        assert_eq!(value["send_at"], "2030-01-02 03:04:05");
        assert_eq!(value["important"], true);
        assert_eq!(value["track_opens"], true);
        assert_eq!(value["track_clicks"], true);
    }

    #[test]
    fn template_body_nests_name_content_and_message() {
        let msg = MessageBuilder::with_template(
            TemplateReference::new("template1").with_region("welcome_message", "<p>Hi!</p>"),
        )
        .from("sender@example.org")
        .to("alice@example.org")
        .build()
        .unwrap();
        let tref = msg.template().unwrap();
        let body = SendTemplateBody {
            key: "key-123",
            template_name: &tref.template_name,
            template_content: tref
                .overridable_regions
                .iter()
                .map(|(name, content)| WireVar { name, content })
                .collect(),
            message: WireMessage::from_message(&msg),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["template_name"], "template1");
        assert_eq!(
            value["template_content"],
            json!([{"name": "welcome_message", "content": "<p>Hi!</p>"}])
        );
        assert_eq!(value["message"]["to"][0]["email"], "alice@example.org");
    }

    #[test]
    fn template_body_omits_empty_content_overrides() {
        let msg = MessageBuilder::with_template(TemplateReference::new("template2"))
            .from("sender@example.org")
            .to("alice@example.org")
            .build()
            .unwrap();
        let body = SendTemplateBody {
            key: "key-123",
            template_name: "template2",
            template_content: Vec::new(),
            message: WireMessage::from_message(&msg),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("template_content").is_none());
    }

    #[test]
    fn add_template_body_matches_schema() {
        let template = TemplateDefinition {
            name: "template1".into(),
            code: "<div mc:edit=\"welcome_message\"></div>".into(),
            subject: Some("Hello {{fname}}!".into()),
            text: Some("plain".into()),
            from_email: Some("sender@example.org".into()),
            from_name: Some("Demo Sender".into()),
            labels: vec!["demo".into(), "hello".into()],
            publish: false,
        };
        let value = serde_json::to_value(AddTemplateBody::new("key-123", &template)).unwrap();
        assert_eq!(value["key"], "key-123");
        assert_eq!(value["name"], "template1");
        assert_eq!(value["publish"], false);
        assert_eq!(value["labels"], json!(["demo", "hello"]));
        assert_eq!(value["code"], "<div mc:edit=\"welcome_message\"></div>");
    }

    #[test]
    fn sms_body_nests_message_sms() {
        let sms = SmsMessage::build(
            "Hello from mailkit",
            "+14155551234",
            "+14155550000",
            ConsentType::Onetime,
            false,
        )
        .unwrap();
        let value = serde_json::to_value(SendSmsBody::new("key-123", &sms)).unwrap();
        assert_eq!(
            value,
            json!({
                "key": "key-123",
                "message": {
                    "sms": {
                        "text": "Hello from mailkit",
                        "to": "+14155551234",
                        "from": "+14155550000",
                        "consent": "onetime",
                        "track_clicks": false
                    }
                }
            })
        );
    }
}
