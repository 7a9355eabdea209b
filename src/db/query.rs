//! Query fragments shared across repositories.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mongodb::bson::{doc, Document};

use crate::error::AppError;
use crate::models::lead::AdminPatch;
use crate::pagination::SortDir;

/// Build a `createdAt` range filter from optional `from`/`to` query values.
/// Dates are `YYYY-MM-DD` (RFC 3339 also accepted); `to` is extended to the
/// end of its day so the bound is inclusive.
pub fn created_at_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Option<Document>, AppError> {
    let mut range = Document::new();
    if let Some(raw) = from.map(str::trim).filter(|v| !v.is_empty()) {
        let start = parse_day_start(raw)?;
        range.insert("$gte", mongodb::bson::DateTime::from_chrono(start));
    }
    if let Some(raw) = to.map(str::trim).filter(|v| !v.is_empty()) {
        let end = parse_day_end(raw)?;
        range.insert("$lte", mongodb::bson::DateTime::from_chrono(end));
    }
    if range.is_empty() {
        Ok(None)
    } else {
        Ok(Some(range))
    }
}

fn parse_date(raw: &str) -> Result<DateOrInstant, AppError> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateOrInstant::Day(day));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(DateOrInstant::Instant(instant.with_timezone(&Utc)));
    }
    Err(AppError::BadRequest(format!(
        "Invalid date '{raw}', expected YYYY-MM-DD"
    )))
}

enum DateOrInstant {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

fn parse_day_start(raw: &str) -> Result<DateTime<Utc>, AppError> {
    match parse_date(raw)? {
        DateOrInstant::Day(day) => Ok(Utc.from_utc_datetime(
            &day.and_hms_opt(0, 0, 0)
                .ok_or_else(|| AppError::Internal("invalid day start".into()))?,
        )),
        DateOrInstant::Instant(instant) => Ok(instant),
    }
}

fn parse_day_end(raw: &str) -> Result<DateTime<Utc>, AppError> {
    match parse_date(raw)? {
        DateOrInstant::Day(day) => Ok(Utc.from_utc_datetime(
            &day.and_hms_milli_opt(23, 59, 59, 999)
                .ok_or_else(|| AppError::Internal("invalid day end".into()))?,
        )),
        DateOrInstant::Instant(instant) => Ok(instant),
    }
}

/// Sort stage over `createdAt`, with `_id` as tie-breaker so page slices
/// stay stable.
pub fn created_at_sort(dir: SortDir) -> Document {
    doc! { "createdAt": dir.bson_order(), "_id": dir.bson_order() }
}

/// Translate an [`AdminPatch`] into a MongoDB update document. Returns
/// `None` when the patch carries nothing.
pub fn admin_patch_update(patch: &AdminPatch) -> Option<Document> {
    if patch.is_empty() {
        return None;
    }

    let mut set = Document::new();
    if let Some(mark_as_read) = patch.mark_as_read {
        set.insert("markAsRead", mark_as_read);
    }
    if let Some(highlight) = patch.highlight {
        set.insert("highlight", highlight);
    }

    let mut push = Document::new();
    if let Some(note) = &patch.note {
        let mut entry = doc! {
            "note": &note.note,
            "timestamp": mongodb::bson::DateTime::from_chrono(note.timestamp),
        };
        if let Some(author) = &note.author {
            entry.insert("author", author);
        }
        push.insert("notes", entry);
    }
    if let Some(status) = &patch.status {
        push.insert(
            "status",
            doc! {
                "status": &status.status,
                "timestamp": mongodb::bson::DateTime::from_chrono(status.timestamp),
            },
        );
    }

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !push.is_empty() {
        update.insert("$push", push);
    }
    Some(update)
}
