use async_trait::async_trait;
use mail_core::{
    fallback_id, MailTransport, OutboundMessage, SendRecord, SmsMessage, SmsRecord, SmsTransport,
    TemplateDefinition, TemplateInfo, TransportError,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub mod wire;

const PROVIDER: &str = "mandrill";
const DEFAULT_BASE_URL: &str = "https://mandrillapp.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SEND_PATH: &str = "/api/1.0/messages/send.json";
const SEND_TEMPLATE_PATH: &str = "/api/1.0/messages/send-template.json";
const ADD_TEMPLATE_PATH: &str = "/api/1.0/templates/add.json";
const SEND_SMS_PATH: &str = "/api/1.1/messages/send-sms";

/// Mandrill REST client.
#[derive(Clone, Debug)]
pub struct MandrillClient {
    /// API key, sent in every request body.
    pub api_key: String,
    /// API base URL; override for testing/mocking.
    pub base_url: String,
    /// Applied to each outbound call.
    pub timeout: Duration,
    /// Optional custom HTTP client (behind feature).
    #[cfg(feature = "reqwest")]
    http: reqwest::Client,
}

impl MandrillClient {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url<S: Into<String>>(api_key: S, base_url: String) -> Self {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout<S: Into<String>>(api_key: S, base_url: String, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            base_url,
            timeout,
            #[cfg(feature = "reqwest")]
            http: reqwest::Client::new(),
        }
    }

    #[cfg(feature = "reqwest")]
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let res = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else {
                    TransportError::Http(e.to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body));
        }

        let raw = res
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|_| TransportError::Provider(format!("unexpected response shape: {raw}")))
    }
}

/// Error body the provider returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A bad key comes back as a generic 500 with `name = "Invalid_Key"`, so the
/// distinction has to be made from the body, not the status code.
fn classify_failure(status: u16, body: &str) -> TransportError {
    if let Ok(err) = serde_json::from_str::<ApiErrorBody>(body) {
        let detail = err.message.unwrap_or_else(|| body.to_string());
        if err.name.as_deref() == Some("Invalid_Key") {
            return TransportError::Auth(detail);
        }
        return TransportError::Provider(format!("HTTP {status}: {detail}"));
    }
    TransportError::Provider(format!("HTTP {status}: {body}"))
}

#[cfg(feature = "reqwest")]
fn ensure_ids(mut records: Vec<SendRecord>) -> Vec<SendRecord> {
    for record in &mut records {
        if record.id.is_none() {
            record.id = Some(fallback_id());
        }
    }
    records
}

#[async_trait]
impl MailTransport for MandrillClient {
    async fn send(&self, message: &OutboundMessage) -> Result<Vec<SendRecord>, TransportError> {
        #[cfg(not(feature = "reqwest"))]
        {
            let _ = message;
            return Err(TransportError::Unexpected("reqwest feature disabled".into()));
        }
        #[cfg(feature = "reqwest")]
        {
            debug!(
                provider = PROVIDER,
                recipients = message.recipients().len(),
                template = message.template().map(|t| t.template_name.as_str()),
                "sending message"
            );
            let records: Vec<SendRecord> = match message.template() {
                Some(tref) => {
                    let body = wire::SendTemplateBody {
                        key: &self.api_key,
                        template_name: &tref.template_name,
                        template_content: tref
                            .overridable_regions
                            .iter()
                            .map(|(name, content)| wire::WireVar { name, content })
                            .collect(),
                        message: wire::WireMessage::from_message(message),
                    };
                    self.post_json(SEND_TEMPLATE_PATH, &body).await?
                }
                None => {
                    let body = wire::SendBody {
                        key: &self.api_key,
                        message: wire::WireMessage::from_message(message),
                    };
                    self.post_json(SEND_PATH, &body).await?
                }
            };
            Ok(ensure_ids(records))
        }
    }

    async fn create_template(
        &self,
        template: &TemplateDefinition,
    ) -> Result<TemplateInfo, TransportError> {
        #[cfg(not(feature = "reqwest"))]
        {
            let _ = template;
            return Err(TransportError::Unexpected("reqwest feature disabled".into()));
        }
        #[cfg(feature = "reqwest")]
        {
            debug!(provider = PROVIDER, name = %template.name, "creating template");
            let body = wire::AddTemplateBody::new(&self.api_key, template);
            self.post_json(ADD_TEMPLATE_PATH, &body).await
        }
    }
}

#[async_trait]
impl SmsTransport for MandrillClient {
    async fn send_sms(&self, message: &SmsMessage) -> Result<Vec<SmsRecord>, TransportError> {
        #[cfg(not(feature = "reqwest"))]
        {
            let _ = message;
            return Err(TransportError::Unexpected("reqwest feature disabled".into()));
        }
        #[cfg(feature = "reqwest")]
        {
            debug!(provider = PROVIDER, to = %message.to(), "sending sms");
            let body = wire::SendSmsBody::new(&self.api_key, message);
            self.post_json(SEND_SMS_PATH, &body).await
        }
    }
}
