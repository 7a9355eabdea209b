/// SMTP settings for the notification mailer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host (e.g. `smtp.gmail.com`).
    pub host: String,
    /// Relay username.
    pub username: String,
    /// Relay password or app token.
    pub password: String,
    /// Sender mailbox, `Name <address>` or a bare address.
    pub from: String,
}

/// Server configuration read from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, `BIND_ADDR` (default `0.0.0.0:5005`).
    pub bind_addr: String,
    /// MongoDB connection string, `MONGODB_URI`.
    pub mongodb_uri: String,
    /// Database name, `MONGODB_DATABASE`.
    pub mongodb_database: String,
    /// reCAPTCHA server-side secret, `RECAPTCHA_SECRET_KEY`.
    pub recaptcha_secret: String,
    /// Recipient for application notifications, `SEND_EMAIL_TO`. Unset
    /// disables the notification mail.
    pub notify_email_to: Option<String>,
    /// Outgoing mail settings; `None` unless all four `SMTP_*` vars are
    /// set.
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    /// Build the config from environment variables, with local-dev
    /// defaults for everything but the mail settings.
    pub fn from_env() -> Self {
        let smtp = match (
            std::env::var("SMTP_HOST"),
            std::env::var("SMTP_USERNAME"),
            std::env::var("SMTP_PASSWORD"),
            std::env::var("SMTP_FROM"),
        ) {
            (Ok(host), Ok(username), Ok(password), Ok(from)) => Some(SmtpConfig {
                host,
                username,
                password,
                from,
            }),
            _ => None,
        };

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5005".to_string()),
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_database: std::env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "studylane".to_string()),
            recaptcha_secret: std::env::var("RECAPTCHA_SECRET_KEY").unwrap_or_default(),
            notify_email_to: std::env::var("SEND_EMAIL_TO").ok(),
            smtp,
        }
    }
}
