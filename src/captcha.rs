//! Google reCAPTCHA verification for the public application form.

use async_trait::async_trait;

use crate::error::AppError;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Verifies a client-supplied captcha token.
///
/// This trait allows stubbing the verification call in tests.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Returns whether the token passed verification. `Err` means the
    /// verification service itself could not be reached.
    async fn verify(&self, token: &str) -> Result<bool, AppError>;
}

#[derive(serde::Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

/// Live verifier backed by Google's siteverify endpoint.
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret,
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, AppError> {
        let response = self
            .client
            .post(SITEVERIFY_URL)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|_| AppError::Internal("Error verifying reCAPTCHA".into()))?;

        let body: SiteverifyResponse = response
            .json()
            .await
            .map_err(|_| AppError::Internal("Error verifying reCAPTCHA".into()))?;

        Ok(body.success)
    }
}
