use axum::response::Html;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

async fn home() -> Html<&'static str> {
    Html("<h1>StudyLane API</h1><p>The server is up and running.</p>")
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        // Blog categories come before the blog slug capture
        .route(
            "/blogs/categories",
            post(api::categories::create_category_handler).get(api::categories::list_categories_handler),
        )
        .route(
            "/blogs/categories/used",
            get(api::categories::used_categories_handler),
        )
        .route(
            "/blogs/categories/{id}",
            patch(api::categories::update_category_handler)
                .delete(api::categories::delete_category_handler),
        )
        .route(
            "/blogs/check-url/{blogURL}",
            get(api::blogs::check_blog_url_handler),
        )
        .route("/blogs/latest/{limit}", get(api::blogs::latest_blogs_handler))
        .route(
            "/blogs/category/{slug}",
            get(api::blogs::blogs_by_category_handler),
        )
        .route("/blogs/trash", get(api::blogs::trash_handler))
        .route(
            "/blogs",
            post(api::blogs::create_blog_handler).get(api::blogs::list_blogs_handler),
        )
        .route(
            "/blogs/{blogURL}",
            get(api::blogs::get_blog_handler)
                .patch(api::blogs::update_blog_handler)
                .delete(api::blogs::delete_blog_handler),
        )
        // Events
        .route(
            "/events",
            post(api::events::create_event_handler).get(api::events::list_events_handler),
        )
        .route(
            "/events/url/{eventURL}",
            get(api::events::get_event_by_url_handler),
        )
        .route(
            "/events/check-url/{eventURL}",
            get(api::events::check_event_url_handler),
        )
        .route(
            "/events/{id}",
            get(api::events::get_event_handler)
                .patch(api::events::update_event_handler)
                .delete(api::events::delete_event_handler),
        )
        // Universities
        .route(
            "/universities",
            post(api::universities::create_university_handler)
                .get(api::universities::list_universities_handler),
        )
        .route(
            "/universities/countries",
            get(api::universities::list_countries_handler),
        )
        .route(
            "/universities/country/{country}",
            get(api::universities::universities_by_country_handler),
        )
        .route(
            "/universities/check-url/{universityUrl}",
            get(api::universities::check_university_url_handler),
        )
        .route(
            "/universities/{universityUrl}",
            get(api::universities::get_university_handler)
                .patch(api::universities::update_university_handler)
                .delete(api::universities::delete_university_handler),
        )
        // Lead capture
        .route("/enquire", post(api::enquiries::create_enquiry_handler))
        .route("/enquiries", get(api::enquiries::list_enquiries_handler))
        .route(
            "/enquiries/{id}",
            patch(api::enquiries::update_enquiry_handler),
        )
        .route("/apply", post(api::applications::create_application_handler))
        .route(
            "/applications",
            get(api::applications::list_applications_handler),
        )
        .route(
            "/applications/{id}",
            patch(api::applications::update_application_handler),
        )
        .route(
            "/expoRegistration",
            post(api::expo::create_expo_handler).get(api::expo::list_expo_handler),
        )
        .route(
            "/expoRegistration/export",
            get(api::exports::export_expo_handler),
        )
        .route(
            "/expoRegistration/export/separateByEvents",
            get(api::exports::export_expo_by_event_handler),
        )
        .route("/expoRegistration/{id}", patch(api::expo::update_expo_handler))
        .route(
            "/live-feedback",
            post(api::feedback::create_feedback_handler).get(api::feedback::list_feedback_handler),
        )
        .route(
            "/live-feedback/{id}",
            patch(api::feedback::update_feedback_handler),
        )
        .route(
            "/newsletter",
            post(api::newsletter::subscribe_handler).get(api::newsletter::list_subscribers_handler),
        )
        .route(
            "/modal-registration",
            post(api::modal::create_modal_registration_handler)
                .get(api::modal::list_modal_registrations_handler),
        )
        .route(
            "/welcome-modal",
            get(api::welcome_modal::get_welcome_modal_handler)
                .put(api::welcome_modal::upsert_welcome_modal_handler),
        )
        // Exports
        .route("/export/enquires", get(api::exports::export_enquiries_handler))
        .route(
            "/export/applications",
            get(api::exports::export_applications_handler),
        )
        .route(
            "/export/newsletter",
            get(api::exports::export_newsletter_handler),
        )
        .route(
            "/export/live-feedback",
            get(api::exports::export_feedback_handler),
        )
        .route(
            "/export/modal-registrations",
            get(api::exports::export_modal_registrations_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
