//! Send a direct email, with merge variables resolved per recipient.
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

    let to = arg_or_default("--to", config.defaults.to_email.as_deref());
    let message = MessageBuilder::direct()
        .html("<h1>Hello *|FNAME|*!</h1><p>Greetings from *|COMPANY|*.</p>")
        .text("Hello *|FNAME|*! Greetings from *|COMPANY|*.")
        .subject("Hello from mailkit")
        .defaults(&config.defaults)
        .to(to.as_str())
        .global_var("COMPANY", "Mailkit Demo Co")
        .recipient_var(to.as_str(), "FNAME", "Friend")
        .header("Reply-To", config.defaults.from_email.clone().unwrap_or_default())
        .tag("demo")
        .tag("direct")
        .track_opens(true)
        .track_clicks(true)
        .build()?;

    let client = config.client();
    let records = client.send(&message).await?;
    for record in &records {
        match &record.reject_reason {
            Some(reason) => println!("{}: {:?} ({reason})", record.email, record.status),
            None => println!("{}: {:?}", record.email, record.status),
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

fn arg_or_default(flag: &str, default: Option<&str>) -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(idx) = args.iter().position(|a| a == flag) {
        if idx + 1 < args.len() {
            return args[idx + 1].clone();
        }
    }
    default
        .map(str::to_string)
        .unwrap_or_else(|| panic!("missing {flag} (and no configured default)"))
}
