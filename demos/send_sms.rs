//! Send an SMS through the v1.1 send-sms endpoint.
use mailkit::prelude::*;

use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging.level);
    if config.mandrill.api_key.is_empty() {
        eprintln!("MANDRILL_API_KEY is not set; nothing will be sent");
        std::process::exit(1);
    }

    let to = arg_or_config("--to", config.sms.to_phone.as_deref(), "SMS_TO_PHONE");
    let from = arg_or_config("--from", config.sms.from_phone.as_deref(), "SMS_FROM_PHONE");
    let text = arg_or("--text", "Hello from mailkit! This is a test message.");
    let consent: ConsentType = config.sms.consent.parse()?;

    let sms = SmsMessage::build(text, &to, &from, consent, false)?;
    let client = config.client();
    for record in client.send_sms(&sms).await? {
        let to = record.to.as_deref().unwrap_or("(unknown)");
        match &record.reject_reason {
            Some(reason) => println!("{to}: {:?} ({reason})", record.status),
            None => println!("{to}: {:?}", record.status),
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn arg_or(flag: &str, default: &str) -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(idx) = args.iter().position(|a| a == flag) {
        if idx + 1 < args.len() {
            return args[idx + 1].clone();
        }
    }
    default.to_string()
}

fn arg_or_config(flag: &str, configured: Option<&str>, key: &str) -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(idx) = args.iter().position(|a| a == flag) {
        if idx + 1 < args.len() {
            return args[idx + 1].clone();
        }
    }
    configured
        .map(str::to_string)
        .unwrap_or_else(|| panic!("missing {flag} (arg {flag} or config key {key})"))
}
