use axum::response::IntoResponse;

use crate::db::expo_repository::ExpoFilter;
use crate::error::AppError;
use crate::export::{
    build_workbook, build_zip, format_cell_datetime, sanitize_filename_part, today_label,
    XLSX_CONTENT_TYPE, ZIP_CONTENT_TYPE,
};
use crate::models::expo::ExpoRegistration;
use crate::models::feedback::LiveFeedback;
use crate::models::lead::{Application, Enquiry, NoteEntry, StatusEntry};
use crate::models::site::{ModalRegistration, NewsletterSubscriber};

use super::expo::ExpoFilterQuery;
use super::modal::RegistrationListQuery;
use super::newsletter::SubscriberListQuery;

fn attachment_response(
    content_type: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> axum::response::Response {
    (
        [
            (axum::http::header::CONTENT_TYPE, content_type.to_string()),
            (
                axum::http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

/// Flatten appended notes into one readable cell, oldest first.
fn notes_cell(notes: &[NoteEntry]) -> String {
    notes
        .iter()
        .map(|entry| match &entry.author {
            Some(author) => format!(
                "{} - {} ({})",
                entry.note,
                author,
                format_cell_datetime(&entry.timestamp)
            ),
            None => format!("{} ({})", entry.note, format_cell_datetime(&entry.timestamp)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_cell(entries: &[StatusEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} ({})",
                entry.status,
                format_cell_datetime(&entry.timestamp)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Filename date label from the optional range filter, falling back to
/// today's date.
fn range_label(from: Option<&str>, to: Option<&str>) -> String {
    match (from, to) {
        (Some(from), Some(to)) => format!(
            "from_{}_to_{}",
            sanitize_filename_part(from),
            sanitize_filename_part(to)
        ),
        (Some(from), None) => format!("from_{}", sanitize_filename_part(from)),
        (None, Some(to)) => format!("to_{}", sanitize_filename_part(to)),
        (None, None) => today_label(),
    }
}

fn enquiry_row(enquiry: &Enquiry) -> Vec<String> {
    vec![
        enquiry.subject.clone(),
        enquiry.email.clone(),
        enquiry.message.clone(),
        format_cell_datetime(&enquiry.created_at),
        notes_cell(&enquiry.notes),
        status_cell(&enquiry.status),
    ]
}

fn application_row(application: &Application) -> Vec<String> {
    vec![
        application.name.clone().unwrap_or_default(),
        application.email.clone(),
        application.phone_number.clone().unwrap_or_default(),
        application.study_destination.clone().unwrap_or_default(),
        application.study_year.clone().unwrap_or_default(),
        application.study_intake.clone().unwrap_or_default(),
    ]
}

fn subscriber_row(subscriber: &NewsletterSubscriber) -> Vec<String> {
    vec![
        subscriber.email.clone(),
        format_cell_datetime(&subscriber.created_at),
    ]
}

fn feedback_row(feedback: &LiveFeedback) -> Vec<String> {
    vec![
        feedback.name.clone().unwrap_or_default(),
        feedback.email.clone(),
        feedback.feedback.clone(),
        format_cell_datetime(&feedback.created_at),
        notes_cell(&feedback.notes),
        status_cell(&feedback.status),
    ]
}

fn modal_registration_row(registration: &ModalRegistration) -> Vec<String> {
    vec![
        registration.name.clone(),
        registration.phone.clone(),
        registration.email.clone(),
        registration.interested_course.clone().unwrap_or_default(),
        registration.country.clone().unwrap_or_default(),
        format_cell_datetime(&registration.created_at),
    ]
}

const EXPO_COLUMNS: &[(&str, f64)] = &[
    ("Full Name", 22.0),
    ("Email", 28.0),
    ("Country Code", 12.0),
    ("Phone Number", 16.0),
    ("Citizenship", 16.0),
    ("Residence", 16.0),
    ("Study Destinations", 24.0),
    ("Other Study Destination", 22.0),
    ("Preferred Study Level", 20.0),
    ("Other Study Level", 18.0),
    ("Academic History", 40.0),
    ("English Test", 14.0),
    ("English Score", 13.0),
    ("No English Cert", 14.0),
    ("Work Experience", 15.0),
    ("Work Details", 30.0),
    ("Event Source Link", 26.0),
    ("Event Id", 24.0),
    ("Event Source Name", 24.0),
    ("Referral Code", 14.0),
    ("Additional Info", 30.0),
    ("Consent To Terms", 15.0),
    ("Highlight", 10.0),
    ("Mark As Read", 12.0),
    ("Notes", 32.0),
    ("Status", 26.0),
    ("Created At", 18.0),
];

fn expo_row(registration: &ExpoRegistration) -> Vec<String> {
    let academic_history = registration
        .academic_history
        .iter()
        .map(|record| {
            [
                record.qualification.as_deref(),
                record.subject.as_deref(),
                record.institution.as_deref(),
                record.year.as_deref(),
                record.grade.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ")
        })
        .collect::<Vec<_>>()
        .join("; ");
    let additional_info = registration
        .additional_info
        .iter()
        .map(|entry| format!("{}: {}", entry.label, entry.value))
        .collect::<Vec<_>>()
        .join("; ");

    vec![
        registration.full_name.clone(),
        registration.email.clone(),
        registration.country_code.clone().unwrap_or_default(),
        registration.phone_number.clone().unwrap_or_default(),
        registration.citizenship.clone(),
        registration.residence.clone().unwrap_or_default(),
        registration.study_destinations.join(", "),
        registration
            .other_study_destination
            .clone()
            .unwrap_or_default(),
        registration.preferred_study_level.clone().unwrap_or_default(),
        registration.other_study_level.clone().unwrap_or_default(),
        academic_history,
        registration.english_test.clone().unwrap_or_default(),
        registration.english_score.clone().unwrap_or_default(),
        yes_no(registration.no_english_cert),
        registration.work_experience.clone(),
        registration.work_details.clone().unwrap_or_default(),
        registration.event_source_link.clone().unwrap_or_default(),
        registration.event_id.clone().unwrap_or_default(),
        registration.event_source_name.clone().unwrap_or_default(),
        registration.referral_code.clone().unwrap_or_default(),
        additional_info,
        yes_no(registration.consent_to_terms),
        yes_no(registration.highlight),
        yes_no(registration.mark_as_read),
        notes_cell(&registration.notes),
        status_cell(&registration.status),
        format_cell_datetime(&registration.created_at),
    ]
}

/// Filename for the filtered expo export, encoding the active filters.
fn expo_export_filename(query: &ExpoFilterQuery, filter: &ExpoFilter) -> String {
    let mut parts = vec!["ExpoRegistrations".to_string()];
    if query.from.is_some() || query.to.is_some() {
        parts.push(range_label(query.from.as_deref(), query.to.as_deref()));
    }
    if let Some(event_id) = &filter.event_id {
        parts.push(format!("event_{}", sanitize_filename_part(event_id)));
    }
    if filter.highlight == Some(true) {
        parts.push("highlighted".to_string());
    }
    if filter.mark_as_read == Some(false) {
        parts.push("unread".to_string());
    }
    if let Some(destination) = &filter.study_destination {
        parts.push(format!("dest_{}", sanitize_filename_part(destination)));
    }

    if parts.len() == 1 {
        format!("ExpoRegistrations_{}.xlsx", today_label())
    } else {
        format!("{}.xlsx", parts.join("_"))
    }
}

/// Group registrations by the event they came from. Falls back from the
/// source name to the event id, then to a catch-all bucket for direct
/// signups. First-seen order is kept.
fn group_by_event(
    registrations: Vec<ExpoRegistration>,
) -> Vec<(String, Vec<ExpoRegistration>)> {
    let mut groups: Vec<(String, Vec<ExpoRegistration>)> = Vec::new();
    for registration in registrations {
        let key = registration
            .event_source_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                registration
                    .event_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
            })
            .unwrap_or_else(|| "direct".to_string());
        match groups.iter_mut().find(|(name, _)| *name == key) {
            Some((_, members)) => members.push(registration),
            None => groups.push((key, vec![registration])),
        }
    }
    groups
}

/// Axum handler for `GET /export/enquires`.
pub async fn export_enquiries_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::response::Response, AppError> {
    let enquiries = state.enquiry_repo.list_all_for_export().await?;
    if enquiries.is_empty() {
        return Err(AppError::NotFound("No enquiries found".into()));
    }

    let rows: Vec<Vec<String>> = enquiries.iter().map(enquiry_row).collect();
    let bytes = build_workbook(
        "Enquiries",
        &[
            ("Subject", 24.0),
            ("Email", 28.0),
            ("Message", 50.0),
            ("Created At", 18.0),
            ("Notes", 32.0),
            ("Status", 26.0),
        ],
        &rows,
    )?;

    let filename = format!("enquiries_{}.xlsx", today_label());
    Ok(attachment_response(XLSX_CONTENT_TYPE, &filename, bytes))
}

/// Axum handler for `GET /export/applications`.
pub async fn export_applications_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::response::Response, AppError> {
    let applications = state.application_repo.list_all_for_export().await?;
    if applications.is_empty() {
        return Err(AppError::NotFound("No applications found".into()));
    }

    let rows: Vec<Vec<String>> = applications.iter().map(application_row).collect();
    let bytes = build_workbook(
        "Applications",
        &[
            ("Name", 22.0),
            ("Email", 28.0),
            ("Phone Number", 16.0),
            ("Study Destination", 20.0),
            ("Study Year", 12.0),
            ("Study Intake", 13.0),
        ],
        &rows,
    )?;

    Ok(attachment_response(
        XLSX_CONTENT_TYPE,
        "Applications.xlsx",
        bytes,
    ))
}

/// Axum handler for `GET /export/newsletter`.
pub async fn export_newsletter_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<SubscriberListQuery>,
) -> Result<axum::response::Response, AppError> {
    let range = crate::db::query::created_at_range(query.from.as_deref(), query.to.as_deref())?;
    let subscribers = state.newsletter_repo.list(range).await?;
    if subscribers.is_empty() {
        return Err(AppError::NotFound("No subscribers found".into()));
    }

    let rows: Vec<Vec<String>> = subscribers.iter().map(subscriber_row).collect();
    let bytes = build_workbook(
        "Newsletter Subscribers",
        &[("Email", 32.0), ("Created At", 22.0)],
        &rows,
    )?;

    let filename = format!(
        "Newsletter_{}.xlsx",
        range_label(query.from.as_deref(), query.to.as_deref())
    );
    Ok(attachment_response(XLSX_CONTENT_TYPE, &filename, bytes))
}

/// Axum handler for `GET /export/live-feedback`.
pub async fn export_feedback_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::response::Response, AppError> {
    let feedback = state.feedback_repo.list_all().await?;
    if feedback.is_empty() {
        return Err(AppError::NotFound("No feedback found".into()));
    }

    let rows: Vec<Vec<String>> = feedback.iter().map(feedback_row).collect();
    let bytes = build_workbook(
        "Live Feedback",
        &[
            ("Name", 22.0),
            ("Email", 28.0),
            ("Feedback", 60.0),
            ("Created At", 18.0),
            ("Notes", 32.0),
            ("Status", 26.0),
        ],
        &rows,
    )?;

    let filename = format!("LiveFeedback_{}.xlsx", today_label());
    Ok(attachment_response(XLSX_CONTENT_TYPE, &filename, bytes))
}

/// Axum handler for `GET /export/modal-registrations`.
pub async fn export_modal_registrations_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<RegistrationListQuery>,
) -> Result<axum::response::Response, AppError> {
    let range = crate::db::query::created_at_range(query.from.as_deref(), query.to.as_deref())?;
    let registrations = state.modal_repo.list(range).await?;
    if registrations.is_empty() {
        return Err(AppError::NotFound("No registrations found".into()));
    }

    let rows: Vec<Vec<String>> = registrations.iter().map(modal_registration_row).collect();
    let bytes = build_workbook(
        "Modal Registrations",
        &[
            ("Name", 22.0),
            ("Phone", 18.0),
            ("Email", 28.0),
            ("Interested Course", 24.0),
            ("Country", 14.0),
            ("Created At", 18.0),
        ],
        &rows,
    )?;

    let filename = format!(
        "ModalRegistrations_{}.xlsx",
        range_label(query.from.as_deref(), query.to.as_deref())
    );
    Ok(attachment_response(XLSX_CONTENT_TYPE, &filename, bytes))
}

/// Axum handler for `GET /expoRegistration/export`. Documents that make
/// it into the workbook are marked as read afterwards.
pub async fn export_expo_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<ExpoFilterQuery>,
) -> Result<axum::response::Response, AppError> {
    let filter = query.to_filter()?;
    let registrations = state.expo_repo.find_filtered(&filter).await?;
    if registrations.is_empty() {
        return Err(AppError::NotFound("No expo registrations found".into()));
    }

    let rows: Vec<Vec<String>> = registrations.iter().map(expo_row).collect();
    let bytes = build_workbook("Expo Registrations", EXPO_COLUMNS, &rows)?;

    // The download is already built; a failed read-marking should not
    // take it down
    let ids: Vec<_> = registrations.iter().filter_map(|r| r.id).collect();
    if let Err(e) = state.expo_repo.mark_read(&ids).await {
        tracing::error!("Failed to mark exported registrations as read: {e}");
    }

    let filename = expo_export_filename(&query, &filter);
    Ok(attachment_response(XLSX_CONTENT_TYPE, &filename, bytes))
}

/// Axum handler for `GET /expoRegistration/export/separateByEvents`. One
/// workbook per event source, bundled into a zip.
pub async fn export_expo_by_event_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<ExpoFilterQuery>,
) -> Result<axum::response::Response, AppError> {
    let filter = ExpoFilter {
        created_range: crate::db::query::created_at_range(
            query.from.as_deref(),
            query.to.as_deref(),
        )?,
        ..Default::default()
    };
    let registrations = state.expo_repo.find_filtered(&filter).await?;
    if registrations.is_empty() {
        return Err(AppError::NotFound("No expo registrations found".into()));
    }

    let mut files = Vec::new();
    for (group, members) in group_by_event(registrations) {
        let rows: Vec<Vec<String>> = members.iter().map(expo_row).collect();
        let bytes = build_workbook("Registrations", EXPO_COLUMNS, &rows)?;
        files.push((format!("{}.xlsx", sanitize_filename_part(&group)), bytes));
    }
    let bytes = build_zip(&files)?;

    let filename = format!("ExpoRegistrations_byEvent_{}.zip", today_label());
    Ok(attachment_response(ZIP_CONTENT_TYPE, &filename, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_registration(
        name: &str,
        event_source_name: Option<&str>,
        event_id: Option<&str>,
    ) -> ExpoRegistration {
        ExpoRegistration {
            id: None,
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            country_code: None,
            phone_number: None,
            citizenship: "Sri Lankan".to_string(),
            residence: None,
            study_destinations: vec!["Australia".to_string()],
            other_study_destination: None,
            preferred_study_level: None,
            other_study_level: None,
            academic_history: vec![],
            english_test: None,
            english_score: None,
            no_english_cert: false,
            work_experience: "No".to_string(),
            work_details: None,
            event_source_link: None,
            event_id: event_id.map(str::to_string),
            event_source_name: event_source_name.map(str::to_string),
            referral_code: None,
            additional_info: vec![],
            consent_to_terms: true,
            highlight: false,
            mark_as_read: false,
            notes: vec![],
            status: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expo_row_matches_column_count() {
        let row = expo_row(&make_registration("Nimal", Some("Colombo Expo"), None));
        assert_eq!(row.len(), EXPO_COLUMNS.len());
        assert_eq!(row[0], "Nimal");
        assert_eq!(row[6], "Australia");
        assert_eq!(row[21], "Yes");
    }

    #[test]
    fn test_notes_cell_includes_author_and_date() {
        let stamp = Utc.with_ymd_and_hms(2025, 3, 7, 16, 5, 0).unwrap();
        let cell = notes_cell(&[
            NoteEntry {
                note: "Left a voicemail".to_string(),
                timestamp: stamp,
                author: None,
            },
            NoteEntry {
                note: "Booked a call".to_string(),
                timestamp: stamp,
                author: Some("Priya".to_string()),
            },
        ]);
        assert_eq!(
            cell,
            "Left a voicemail (07/03/2025, 16:05), Booked a call - Priya (07/03/2025, 16:05)"
        );
    }

    #[test]
    fn test_range_label_variants() {
        assert_eq!(
            range_label(Some("2025-01-01"), Some("2025-02-01")),
            "from_2025-01-01_to_2025-02-01"
        );
        assert_eq!(range_label(Some("2025-01-01"), None), "from_2025-01-01");
        assert_eq!(range_label(None, Some("2025-02-01")), "to_2025-02-01");
        assert_eq!(range_label(None, None), today_label());
    }

    #[test]
    fn test_expo_export_filename_encodes_filters() {
        let query = ExpoFilterQuery {
            from: Some("2025-01-01".to_string()),
            to: Some("2025-02-01".to_string()),
            event_id: Some("663a1f2b9d1e4c0012345678".to_string()),
            highlight: Some("true".to_string()),
            mark_as_read: Some("false".to_string()),
            study_destination: Some("New Zealand".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(
            expo_export_filename(&query, &filter),
            "ExpoRegistrations_from_2025-01-01_to_2025-02-01_event_663a1f2b9d1e4c0012345678_highlighted_unread_dest_New_Zealand.xlsx"
        );

        let bare = ExpoFilterQuery::default();
        let filter = bare.to_filter().unwrap();
        assert_eq!(
            expo_export_filename(&bare, &filter),
            format!("ExpoRegistrations_{}.xlsx", today_label())
        );
    }

    #[test]
    fn test_group_by_event_fallback_chain() {
        let groups = group_by_event(vec![
            make_registration("Amara", Some("Colombo Expo"), Some("abc")),
            make_registration("Bimal", None, Some("abc")),
            make_registration("Chamari", None, None),
            make_registration("Dilan", Some("Colombo Expo"), None),
        ]);
        let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Colombo Expo", "abc", "direct"]);
        assert_eq!(groups[0].1.len(), 2);
    }
}
