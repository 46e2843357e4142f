//! Client-side filtering for the list pages and the calendar view

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use instadmin_core::types::{
    AccountId, Calendar, CalendarEntry, InstagramAccount, Post, PostStatus, PostType,
    ScheduleStatus, ScheduledPost, ScheduledPostStats,
};
use instadmin_core::utils::{CAPTION_PREVIEW_LENGTH, truncate_caption};
use instadmin_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Status selector from a page's dropdown: everything, or one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<S> {
    /// No restriction
    All,
    /// Only entries with this status
    Only(S),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        Self::All
    }
}

impl<S: fmt::Display> StatusFilter<S> {
    /// Whether `status` passes, comparing string forms
    pub fn matches(&self, status: &S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted.to_string() == status.to_string(),
        }
    }
}

impl<S> FromStr for StatusFilter<S>
where
    S: FromStr<Err = Error>,
{
    type Err = Error;

    /// `"all"` (or an empty string) selects everything
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            trimmed.parse().map(Self::Only)
        }
    }
}

impl<S: fmt::Display> fmt::Display for StatusFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day
    pub start: NaiveDate,
    /// Last day
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting inverted or over-long ones
    ///
    /// # Errors
    ///
    /// Returns a validation error if `start > end` or the range exceeds a year.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        instadmin_core::utils::validate_date_range(Some(start), Some(end))?;
        Ok(Self { start, end })
    }

    /// Whether the UTC day of `at` lies in the range
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start <= day && day <= self.end
    }
}

/// Which side of "now" a scheduled post falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleWindow {
    /// Any time
    #[default]
    All,
    /// Scheduled after the given instant
    Upcoming(DateTime<Utc>),
    /// Scheduled at or before the given instant
    Past(DateTime<Utc>),
}

impl ScheduleWindow {
    fn matches(self, at: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming(now) => at > now,
            Self::Past(now) => at <= now,
        }
    }
}

/// Filters of the scheduled posts page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduledFilter {
    /// Status dropdown
    pub status: StatusFilter<ScheduleStatus>,
    /// Account selector
    pub account_id: Option<AccountId>,
    /// Upcoming/past toggle
    pub window: ScheduleWindow,
}

/// Filters of the posts page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Status dropdown
    pub status: StatusFilter<PostStatus>,
    /// Post type dropdown
    pub post_type: StatusFilter<PostType>,
    /// Account selector
    pub account_id: Option<AccountId>,
    /// Caption search box
    pub search: Option<String>,
    /// Creation date range
    pub date_range: Option<DateRange>,
}

/// Connection state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountActivity {
    /// Connected and syncing
    Active,
    /// Disconnected
    Inactive,
}

impl fmt::Display for AccountActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        })
    }
}

impl FromStr for AccountActivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(Error::validation(
                "AccountActivity",
                format!("unknown value '{other}'"),
            )),
        }
    }
}

/// Filters of the accounts page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    /// Active/inactive dropdown
    pub activity: StatusFilter<AccountActivity>,
    /// Username search box
    pub search: Option<String>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

/// Scheduled posts passing every filter, in input order
#[must_use]
pub fn filter_scheduled<'a>(posts: &'a [ScheduledPost], filter: &ScheduledFilter) -> Vec<&'a ScheduledPost> {
    posts
        .iter()
        .filter(|post| filter.status.matches(&post.status))
        .filter(|post| filter.account_id.is_none_or(|id| post.account_id == id))
        .filter(|post| filter.window.matches(post.scheduled_for))
        .collect()
}

/// Posts passing every filter, in input order
#[must_use]
pub fn filter_posts<'a>(posts: &'a [Post], filter: &PostFilter) -> Vec<&'a Post> {
    let search = search_term(filter.search.as_deref());

    posts
        .iter()
        .filter(|post| filter.status.matches(&post.status))
        .filter(|post| filter.post_type.matches(&post.post_type))
        .filter(|post| filter.account_id.is_none_or(|id| post.account_id == id))
        .filter(|post| {
            search.is_none_or(|term| {
                post.caption
                    .as_deref()
                    .is_some_and(|caption| contains_ignore_case(caption, term))
            })
        })
        .filter(|post| {
            filter
                .date_range
                .is_none_or(|range| range.contains(post.created_at))
        })
        .collect()
}

/// Accounts passing every filter, in input order
#[must_use]
pub fn filter_accounts<'a>(
    accounts: &'a [InstagramAccount],
    filter: &AccountFilter,
) -> Vec<&'a InstagramAccount> {
    let search = search_term(filter.search.as_deref());

    accounts
        .iter()
        .filter(|account| {
            let activity = if account.is_active {
                AccountActivity::Active
            } else {
                AccountActivity::Inactive
            };
            filter.activity.matches(&activity)
        })
        .filter(|account| {
            search.is_none_or(|term| {
                contains_ignore_case(&account.username, term)
                    || account
                        .full_name
                        .as_deref()
                        .is_some_and(|name| contains_ignore_case(name, term))
            })
        })
        .collect()
}

/// Group a month's scheduled posts by day for the calendar view
///
/// Entries within a day are ordered by time. Account handles are not
/// known here; see [`label_accounts`].
#[must_use]
pub fn group_by_day(posts: &[ScheduledPost], year: i32, month: u32) -> Calendar {
    let mut in_month: Vec<&ScheduledPost> = posts
        .iter()
        .filter(|post| post.scheduled_for.year() == year && post.scheduled_for.month() == month)
        .collect();
    in_month.sort_by_key(|post| post.scheduled_for);

    let mut calendar = Calendar::new();
    for post in in_month {
        calendar
            .entry(post.scheduled_for.day())
            .or_default()
            .push(CalendarEntry {
                id: post.id,
                time: post.scheduled_for.format("%H:%M").to_string(),
                caption: post
                    .caption
                    .as_deref()
                    .map(|caption| truncate_caption(caption, CAPTION_PREVIEW_LENGTH)),
                status: post.status,
                account_username: None,
            });
    }
    calendar
}

/// Fill in account handles for calendar entries built from `posts`
pub fn label_accounts(calendar: &mut Calendar, posts: &[ScheduledPost], accounts: &[InstagramAccount]) {
    for entry in calendar.values_mut().flatten() {
        let username = posts
            .iter()
            .find(|post| post.id == entry.id)
            .and_then(|post| accounts.iter().find(|account| account.id == post.account_id))
            .map(|account| account.username.clone());
        if username.is_some() {
            entry.account_username = username;
        }
    }
}

/// Counts by status, in the shape of the backend's overview
#[must_use]
pub fn scheduled_summary(posts: &[ScheduledPost]) -> ScheduledPostStats {
    let count = |status: ScheduleStatus| {
        posts.iter().filter(|post| post.status == status).count() as u64
    };

    ScheduledPostStats {
        total_scheduled: posts.len() as u64,
        pending: count(ScheduleStatus::Pending),
        published: count(ScheduleStatus::Published),
        failed: count(ScheduleStatus::Failed),
        cancelled: count(ScheduleStatus::Cancelled),
    }
}
