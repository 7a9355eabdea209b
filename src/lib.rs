pub mod api {
    pub mod applications;
    pub mod blogs;
    pub mod categories;
    pub mod enquiries;
    pub mod errors;
    pub mod events;
    pub mod expo;
    pub mod exports;
    pub mod feedback;
    pub mod modal;
    pub mod newsletter;
    pub mod universities;
    pub mod welcome_modal;
}
pub mod db {
    pub mod application_repository;
    pub mod blog_repository;
    pub mod category_repository;
    pub mod enquiry_repository;
    pub mod event_repository;
    pub mod expo_repository;
    pub mod feedback_repository;
    pub mod modal_repository;
    pub mod newsletter_repository;
    pub mod query;
    pub mod university_repository;
    pub mod welcome_modal_repository;
}
pub mod models {
    pub mod blog;
    pub mod event;
    pub mod expo;
    pub mod feedback;
    pub mod lead;
    pub mod site;
    pub mod time;
    pub mod university;
}
pub mod captcha;
pub mod config;
pub mod error;
pub mod export;
pub mod mailer;
pub mod pagination;
pub mod routes;
pub mod slug;
pub mod state;
