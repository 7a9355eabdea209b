use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use studylane::captcha::CaptchaVerifier;
use studylane::error::AppError;
use studylane::mailer::{Mailer, OutgoingEmail};
use studylane::routes;
use studylane::state::AppState;

/// The only captcha token the stub verifier accepts.
pub const TEST_CAPTCHA_TOKEN: &str = "test-captcha-token";

/// Verifier that compares against a fixed token instead of calling Google.
pub struct StubCaptcha;

#[async_trait]
impl CaptchaVerifier for StubCaptcha {
    async fn verify(&self, token: &str) -> Result<bool, AppError> {
        Ok(token == TEST_CAPTCHA_TOKEN)
    }
}

/// Mailer that records messages instead of delivering them.
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Holds the running MongoDB container and the application router.
///
/// The container is kept alive for as long as this struct lives. When
/// dropped, it is stopped and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: axum::Router,
    pub mailer: Arc<RecordingMailer>,
}

impl TestEnv {
    /// Spin up MongoDB and build the router against a fresh database.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");
        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let mongo_db = mongo_client.database("studylane_test");

        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(vec![]),
        });

        let state = AppState::new(
            &mongo_db,
            Arc::new(StubCaptcha),
            mailer.clone(),
            Some("admissions@studylane.test".to_string()),
        );
        let router = routes::router(state);

        Self {
            _mongo: mongo_container,
            router,
            mailer,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Helper: create a blog category via the API and return its id.
    pub async fn create_category(
        &self,
        server: &axum_test::TestServer,
        name: &str,
        slug: &str,
    ) -> String {
        let response = server
            .post("/blogs/categories")
            .json(&serde_json::json!({ "name": name, "slug": slug }))
            .await;
        let body: serde_json::Value = response.json();
        body["data"]["_id"]["$oid"]
            .as_str()
            .expect("created category carries an id")
            .to_string()
    }

    /// Helper: create a minimal publishable blog under one category slug.
    pub async fn create_blog(
        &self,
        server: &axum_test::TestServer,
        blog_url: &str,
        category_slug: &str,
    ) -> axum_test::TestResponse {
        server
            .post("/blogs")
            .json(&serde_json::json!({
                "title": format!("Post {blog_url}"),
                "blogURL": blog_url,
                "categories": [category_slug],
                "img": "https://cdn.studylane.test/cover.jpg",
                "date": "2025-03-01",
                "author": "Editorial Team",
                "summary": "A short summary.",
                "mainContent": "<p>Body copy.</p>"
            }))
            .await
    }

    /// Helper: submit an expo registration with the given identity fields.
    pub async fn create_expo_registration(
        &self,
        server: &axum_test::TestServer,
        full_name: &str,
        email: &str,
    ) -> axum_test::TestResponse {
        server
            .post("/expoRegistration")
            .json(&serde_json::json!({
                "fullName": full_name,
                "email": email,
                "citizenship": "Nepal",
                "studyDestinations": ["Australia"],
                "consentToTerms": true
            }))
            .await
    }

    /// Helper: wait for the spawned notification-email task to run.
    pub async fn wait_for_mail(&self) {
        for _ in 0..50 {
            if !self.mailer.sent.lock().unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    }
}
