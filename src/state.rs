use std::sync::Arc;

use crate::captcha::CaptchaVerifier;
use crate::db::application_repository::{ApplicationRepository, MongoApplicationRepository};
use crate::db::blog_repository::{BlogRepository, MongoBlogRepository};
use crate::db::category_repository::{CategoryRepository, MongoCategoryRepository};
use crate::db::enquiry_repository::{EnquiryRepository, MongoEnquiryRepository};
use crate::db::event_repository::{EventRepository, MongoEventRepository};
use crate::db::expo_repository::{ExpoRepository, MongoExpoRepository};
use crate::db::feedback_repository::{FeedbackRepository, MongoFeedbackRepository};
use crate::db::modal_repository::{ModalRepository, MongoModalRepository};
use crate::db::newsletter_repository::{MongoNewsletterRepository, NewsletterRepository};
use crate::db::university_repository::{MongoUniversityRepository, UniversityRepository};
use crate::db::welcome_modal_repository::{MongoWelcomeModalRepository, WelcomeModalRepository};
use crate::mailer::Mailer;

/// Shared handler state: one repository per collection plus the outbound
/// service clients.
#[derive(Clone)]
pub struct AppState {
    pub blog_repo: Arc<dyn BlogRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub university_repo: Arc<dyn UniversityRepository>,
    pub enquiry_repo: Arc<dyn EnquiryRepository>,
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub expo_repo: Arc<dyn ExpoRepository>,
    pub feedback_repo: Arc<dyn FeedbackRepository>,
    pub newsletter_repo: Arc<dyn NewsletterRepository>,
    pub modal_repo: Arc<dyn ModalRepository>,
    pub welcome_modal_repo: Arc<dyn WelcomeModalRepository>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub mailer: Arc<dyn Mailer>,
    pub notify_email_to: Option<String>,
}

impl AppState {
    /// Wire every repository to the given database.
    pub fn new(
        db: &mongodb::Database,
        captcha: Arc<dyn CaptchaVerifier>,
        mailer: Arc<dyn Mailer>,
        notify_email_to: Option<String>,
    ) -> Self {
        Self {
            blog_repo: Arc::new(MongoBlogRepository::new(db)),
            category_repo: Arc::new(MongoCategoryRepository::new(db)),
            event_repo: Arc::new(MongoEventRepository::new(db)),
            university_repo: Arc::new(MongoUniversityRepository::new(db)),
            enquiry_repo: Arc::new(MongoEnquiryRepository::new(db)),
            application_repo: Arc::new(MongoApplicationRepository::new(db)),
            expo_repo: Arc::new(MongoExpoRepository::new(db)),
            feedback_repo: Arc::new(MongoFeedbackRepository::new(db)),
            newsletter_repo: Arc::new(MongoNewsletterRepository::new(db)),
            modal_repo: Arc::new(MongoModalRepository::new(db)),
            welcome_modal_repo: Arc::new(MongoWelcomeModalRepository::new(db)),
            captcha,
            mailer,
            notify_email_to,
        }
    }
}
