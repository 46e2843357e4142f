//! Formatting and pre-flight validation helpers

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;

/// Maximum caption length accepted by Instagram
pub const MAX_CAPTION_LENGTH: usize = 2200;

/// Maximum number of hashtags per post
pub const MAX_HASHTAGS: usize = 30;

/// Maximum length of a single hashtag
pub const MAX_HASHTAG_LENGTH: usize = 100;

/// Maximum span of an analytics date range, in days
pub const MAX_DATE_RANGE_DAYS: i64 = 365;

/// Media extensions the backend accepts for upload
pub const ALLOWED_MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "mp4", "mov"];

/// Caption preview length used by activity feeds and the calendar
pub const CAPTION_PREVIEW_LENGTH: usize = 50;

/// Format a count the way the dashboard cards show it
///
/// `1500` becomes `1.5K`, `2_500_000` becomes `2.5M`, values under a
/// thousand are printed as-is.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Format an engagement rate percentage
#[must_use]
pub fn format_engagement_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}

/// Shorten a caption for list views, appending `...` when cut
#[must_use]
pub fn truncate_caption(caption: &str, max_chars: usize) -> String {
    if caption.chars().count() > max_chars {
        let head: String = caption.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        caption.to_string()
    }
}

/// Validate a caption and return it trimmed
///
/// # Errors
///
/// Returns a validation error if the caption is blank or too long.
pub fn validate_caption(caption: &str) -> Result<String> {
    let trimmed = caption.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("caption", "Caption cannot be empty"));
    }
    if caption.chars().count() > MAX_CAPTION_LENGTH {
        return Err(Error::validation(
            "caption",
            format!("Caption too long. Maximum {MAX_CAPTION_LENGTH} characters allowed"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalize and validate hashtags, stripping a leading `#`
///
/// Empty entries are dropped.
///
/// # Errors
///
/// Returns a validation error for too many tags or a malformed tag.
pub fn normalize_hashtags<S: AsRef<str>>(hashtags: &[S]) -> Result<Vec<String>> {
    if hashtags.len() > MAX_HASHTAGS {
        return Err(Error::validation(
            "hashtags",
            format!("Maximum {MAX_HASHTAGS} hashtags allowed"),
        ));
    }

    let mut normalized = Vec::with_capacity(hashtags.len());
    for tag in hashtags {
        let clean = tag.as_ref().trim().trim_start_matches('#');
        if clean.is_empty() {
            continue;
        }
        if clean.chars().count() > MAX_HASHTAG_LENGTH {
            return Err(Error::validation(
                "hashtags",
                format!("Hashtag too long: #{clean}"),
            ));
        }
        if !clean.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::validation(
                "hashtags",
                format!("Invalid hashtag format: #{clean}"),
            ));
        }
        normalized.push(clean.to_string());
    }
    Ok(normalized)
}

/// Ensure a scheduled time lies strictly after `now`
///
/// # Errors
///
/// Returns a validation error for a past or present time.
pub fn validate_future_time(scheduled_for: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if scheduled_for <= now {
        return Err(Error::validation(
            "scheduled_for",
            "Scheduled time must be in the future",
        ));
    }
    Ok(())
}

/// Check a media filename against the accepted extensions
///
/// # Errors
///
/// Returns a validation error for a missing or unsupported extension.
pub fn validate_media_file(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_MEDIA_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(Error::validation(
            "file",
            format!(
                "Unsupported file format: .{extension}. Allowed formats: {}",
                ALLOWED_MEDIA_EXTENSIONS.join(", ")
            ),
        ))
    }
}

/// Guess the MIME type for an upload from its extension
#[must_use]
pub fn media_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Validate an Instagram handle and return it lowercased
///
/// # Errors
///
/// Returns a validation error when the handle breaks Instagram's rules.
pub fn validate_instagram_username(username: &str) -> Result<String> {
    if username.is_empty() {
        return Err(Error::validation("username", "Username is required"));
    }
    if username.chars().count() > 30
        || !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(Error::validation(
            "username",
            "Invalid username format. Use only letters, numbers, periods, and underscores",
        ));
    }
    if username.starts_with('.') || username.ends_with('.') {
        return Err(Error::validation(
            "username",
            "Username cannot start or end with a period",
        ));
    }
    if username.contains("..") {
        return Err(Error::validation(
            "username",
            "Username cannot contain consecutive periods",
        ));
    }
    Ok(username.to_ascii_lowercase())
}

/// Validate an analytics date range
///
/// # Errors
///
/// Returns a validation error if the range is inverted or spans more than a year.
pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(Error::validation(
                "date_range",
                "Start date cannot be after end date",
            ));
        }
        if (end - start).num_days() > MAX_DATE_RANGE_DAYS {
            return Err(Error::validation(
                "date_range",
                format!("Date range cannot exceed {MAX_DATE_RANGE_DAYS} days"),
            ));
        }
    }
    Ok(())
}
