use std::sync::Arc;

use studylane::captcha::{CaptchaVerifier, RecaptchaVerifier};
use studylane::config::AppConfig;
use studylane::mailer::{Mailer, NoopMailer, SmtpMailer};
use studylane::routes;
use studylane::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studylane=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting StudyLane server...");

    let config = AppConfig::from_env();

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = mongo_client.database(&config.mongodb_database);

    tracing::info!("Connected to MongoDB at {}", config.mongodb_uri);

    let captcha: Arc<dyn CaptchaVerifier> =
        Arc::new(RecaptchaVerifier::new(config.recaptcha_secret.clone()));

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(
            SmtpMailer::new(
                &smtp.host,
                smtp.username.clone(),
                smtp.password.clone(),
                &smtp.from,
            )
            .expect("Failed to initialize SMTP mailer"),
        ),
        None => {
            tracing::info!("SMTP not configured, notification emails are disabled");
            Arc::new(NoopMailer)
        }
    };

    let state = AppState::new(&db, captcha, mailer, config.notify_email_to.clone());
    let app = routes::router(state);

    // Start the server
    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
