//! Create a stored template (if needed) and send through it, overriding one
//! mc:edit region for this send only.
use mailkit::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging.level);
    if config.mandrill.api_key.is_empty() {
        eprintln!("MANDRILL_API_KEY is not set; nothing will be sent");
        std::process::exit(1);
    }
    let client = config.client();

    let template = TemplateDefinition {
        name: "mailkit-welcome".into(),
        code: concat!(
            "<h1>Hello *|FNAME|*!</h1>",
            "<div mc:edit=\"welcome_message\"><p>Welcome aboard.</p></div>",
            "<p>Your account: *|ACCOUNT_ID|*</p>"
        )
        .into(),
        subject: Some("Hello *|FNAME|*!".into()),
        text: Some("Hello from the mailkit welcome template.".into()),
        from_email: config.defaults.from_email.clone(),
        from_name: config.defaults.from_name.clone(),
        labels: vec!["demo".into(), "welcome".into()],
        publish: false,
    };
    match client.create_template(&template).await {
        Ok(info) => println!("created template {} (slug {})", info.name, info.slug),
        // Creating an existing template fails; reuse the stored one.
        Err(err) => tracing::warn!(%err, "template not created, assuming it already exists"),
    }

    let to = config
        .defaults
        .to_email
        .clone()
        .expect("DEFAULT_TO_EMAIL must be configured for this demo");
    let message = MessageBuilder::with_template(
        TemplateReference::new("mailkit-welcome")
            .with_region("welcome_message", "<p>Thanks for joining <strong>*|COMPANY|*</strong>!</p>"),
    )
    .subject("Welcome, *|FNAME|*")
    .defaults(&config.defaults)
    .to(to.as_str())
    .global_var("COMPANY", "Mailkit Demo Co")
    .recipient_var(to.as_str(), "FNAME", "Friend")
    .recipient_var(to.as_str(), "ACCOUNT_ID", "ACC-001")
    .tag("onboarding")
    .build()?;

    for record in client.send(&message).await? {
        println!("{}: {:?}", record.email, record.status);
        if let Some(id) = &record.id {
            println!("  message id: {id}");
        }
        if let Some(reason) = &record.reject_reason {
            println!("  reject reason: {reason}");
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
