//! Terminal output: aligned tables, or pretty JSON with `--json`

use chrono::{DateTime, Utc};
use instadmin_core::context_error::Result;
use instadmin_core::types::{
    AccountActionResponse, AccountInsights, AccountStats, ActionResponse, Admin, Analytics,
    Calendar, ContentInsights, DashboardStats, HealthStatus, InstagramAccount, InstagramAuthUrl,
    Media, PerformanceMetrics, Post, PostAnalytics, PostStats, PublishResponse, RecentActivity,
    ScheduledPost, ScheduledPostStats,
};
use instadmin_core::utils::{
    CAPTION_PREVIEW_LENGTH, format_engagement_rate, format_number, truncate_caption,
};
use serde::Serialize;
use std::io::{self, Write};

/// Human-readable rendering of a response
pub(crate) trait Render {
    fn render(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Where command results go
#[derive(Debug, Clone, Copy)]
pub(crate) struct Output {
    json: bool,
}

impl Output {
    pub(crate) const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Whether `--json` was given
    pub(crate) const fn is_json(self) -> bool {
        self.json
    }

    /// Print a value to stdout
    pub(crate) fn emit<T: Serialize + Render + ?Sized>(self, value: &T) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write(&mut out, value)
    }

    fn write<T: Serialize + Render + ?Sized>(self, out: &mut dyn Write, value: &T) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        } else {
            value.render(out)?;
        }
        Ok(())
    }

    /// Print a document as-is, whatever the output mode
    pub(crate) fn raw(self, text: String) -> Result<()> {
        Self::new(false).emit(&Text(text))
    }

    /// Print a status line, wrapped as `{"message": ...}` in JSON mode
    pub(crate) fn message(self, message: &str) -> Result<()> {
        self.emit(&Message { message })
    }
}

#[derive(Serialize)]
struct Message<'a> {
    message: &'a str,
}

impl Render for Message<'_> {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.message)
    }
}

/// Raw text such as a CSV export
#[derive(Serialize)]
#[serde(transparent)]
struct Text(String);

impl Render for Text {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{}", self.0)?;
        if !self.0.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }
}

fn time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn maybe_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), time)
}

fn preview(caption: Option<&str>) -> String {
    caption.map_or_else(String::new, |caption| {
        truncate_caption(&caption.replace('\n', " "), CAPTION_PREVIEW_LENGTH)
    })
}

fn field(out: &mut dyn Write, label: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "{:<18} {value}", format!("{label}:"))
}

impl Render for Admin {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Email", &self.email)?;
        field(out, "Name", self.full_name.as_deref().unwrap_or("-"))?;
        field(out, "Superuser", self.is_superuser)?;
        field(out, "Active", self.is_active)?;
        field(out, "Last login", maybe_time(self.last_login))
    }
}

impl Render for [Admin] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:>5}  {:<32} {:<24} {:<10} LAST LOGIN",
            "ID", "EMAIL", "NAME", "ROLE"
        )?;
        for admin in self {
            writeln!(
                out,
                "{:>5}  {:<32} {:<24} {:<10} {}",
                admin.id,
                admin.email,
                admin.full_name.as_deref().unwrap_or("-"),
                if admin.is_superuser { "superuser" } else { "admin" },
                maybe_time(admin.last_login),
            )?;
        }
        Ok(())
    }
}

impl Render for [InstagramAccount] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:>5}  {:<24} {:>10} {:>10} {:>6}  {:<8} LAST SYNC",
            "ID", "USERNAME", "FOLLOWERS", "FOLLOWING", "POSTS", "STATUS"
        )?;
        for account in self {
            writeln!(
                out,
                "{:>5}  {:<24} {:>10} {:>10} {:>6}  {:<8} {}",
                account.id,
                format!("@{}", account.username),
                format_number(account.followers_count),
                format_number(account.following_count),
                account.posts_count,
                if account.is_active { "active" } else { "inactive" },
                maybe_time(account.last_sync),
            )?;
        }
        Ok(())
    }
}

impl Render for InstagramAccount {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "ID", self.id)?;
        field(out, "Username", format!("@{}", self.username))?;
        field(out, "Name", self.full_name.as_deref().unwrap_or("-"))?;
        field(out, "Bio", self.bio.as_deref().unwrap_or("-"))?;
        field(out, "Instagram ID", &self.instagram_user_id)?;
        field(out, "Followers", format_number(self.followers_count))?;
        field(out, "Following", format_number(self.following_count))?;
        field(out, "Posts", self.posts_count)?;
        field(out, "Business", self.is_business_account)?;
        field(out, "Active", self.is_active)?;
        field(out, "Last sync", maybe_time(self.last_sync))?;
        field(out, "Connected", time(self.created_at))
    }
}

impl Render for AccountStats {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Account", format!("@{} ({})", self.username, self.account_id))?;
        field(out, "Followers", format_number(self.followers_count))?;
        field(out, "Posts", self.posts_count)?;
        field(out, "Engagement", format_engagement_rate(self.engagement_rate))?;
        field(out, "Last post", maybe_time(self.last_post_date))
    }
}

impl Render for AccountActionResponse {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.message)?;
        if let Some(account) = &self.account {
            writeln!(out)?;
            account.render(out)?;
        }
        Ok(())
    }
}

impl Render for ActionResponse {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.message)?;
        for (key, value) in &self.details {
            match value {
                serde_json::Value::String(text) => field(out, key, text)?,
                other => field(out, key, other)?,
            }
        }
        Ok(())
    }
}

impl Render for InstagramAuthUrl {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Open this URL to connect an account:")?;
        writeln!(out, "{}", self.auth_url)?;
        field(out, "State", &self.state)
    }
}

impl Render for [Post] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:>5} {:>7}  {:<6} {:<9} {:>7} {:>8}  {:<16} CAPTION",
            "ID", "ACCOUNT", "TYPE", "STATUS", "LIKES", "COMMENTS", "PUBLISHED"
        )?;
        for post in self {
            writeln!(
                out,
                "{:>5} {:>7}  {:<6} {:<9} {:>7} {:>8}  {:<16} {}",
                post.id,
                post.account_id,
                post.post_type,
                post.status,
                format_number(post.likes_count),
                format_number(post.comments_count),
                maybe_time(post.published_at),
                preview(post.caption.as_deref()),
            )?;
        }
        Ok(())
    }
}

impl Render for Post {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "ID", self.id)?;
        field(out, "Account", self.account_id)?;
        field(out, "Type", self.post_type)?;
        field(out, "Status", self.status)?;
        field(out, "Caption", self.caption.as_deref().unwrap_or("-"))?;
        if let Some(hashtags) = self.hashtags.as_ref().filter(|tags| !tags.is_empty()) {
            let tags: Vec<String> = hashtags.iter().map(|tag| format!("#{tag}")).collect();
            field(out, "Hashtags", tags.join(" "))?;
        }
        if let Some(location) = &self.location_name {
            field(out, "Location", location)?;
        }
        field(out, "Likes", format_number(self.likes_count))?;
        field(out, "Comments", format_number(self.comments_count))?;
        field(out, "Impressions", format_number(self.impressions))?;
        field(out, "Reach", format_number(self.reach))?;
        field(out, "Instagram ID", self.instagram_post_id.as_deref().unwrap_or("-"))?;
        field(out, "Published", maybe_time(self.published_at))?;
        field(out, "Created", time(self.created_at))
    }
}

impl Render for PublishResponse {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.message)?;
        if let Some(id) = &self.instagram_post_id {
            field(out, "Instagram ID", id)?;
        }
        Ok(())
    }
}

impl Render for PostAnalytics {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Post", self.post_id)?;
        field(out, "Likes", format_number(self.likes_count))?;
        field(out, "Comments", format_number(self.comments_count))?;
        field(out, "Shares", format_number(self.shares_count))?;
        field(out, "Impressions", format_number(self.impressions))?;
        field(out, "Reach", format_number(self.reach))?;
        field(out, "Engagement", format_engagement_rate(self.engagement_rate))?;
        field(out, "Posted", time(self.posted_at))
    }
}

impl Render for PostStats {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Total posts", self.total_posts)?;
        field(out, "Published", self.published_posts)?;
        field(out, "Drafts", self.draft_posts)?;
        field(out, "Failed", self.failed_posts)?;
        field(out, "Likes", format_number(self.total_likes))?;
        field(out, "Comments", format_number(self.total_comments))?;
        field(out, "Engagement", format_engagement_rate(self.engagement_rate))
    }
}

impl Render for [Media] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:>5}  {:<8} {:<10} {:>10}  {:<30} ALT TEXT",
            "ID", "TYPE", "STATUS", "SIZE", "FILE"
        )?;
        for media in self {
            writeln!(
                out,
                "{:>5}  {:<8} {:<10} {:>10}  {:<30} {}",
                media.id,
                media.media_type,
                media.status,
                format_number(media.file_size),
                truncate_caption(&media.original_filename, 27),
                media.alt_text.as_deref().unwrap_or(""),
            )?;
        }
        Ok(())
    }
}

impl Render for Media {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "ID", self.id)?;
        field(out, "File", &self.original_filename)?;
        field(out, "Stored as", &self.file_path)?;
        field(out, "Type", format!("{} ({})", self.media_type, self.mime_type))?;
        field(out, "Status", self.status)?;
        field(out, "Size", format!("{} bytes", self.file_size))?;
        if let (Some(width), Some(height)) = (self.width, self.height) {
            field(out, "Dimensions", format!("{width}x{height}"))?;
        }
        if let Some(duration) = self.duration {
            field(out, "Duration", format!("{duration}s"))?;
        }
        field(out, "Alt text", self.alt_text.as_deref().unwrap_or("-"))?;
        field(out, "Post", self.post_id.map_or_else(|| "-".to_string(), |id| id.to_string()))?;
        field(out, "Uploaded", time(self.created_at))
    }
}

impl Render for [ScheduledPost] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:>5} {:>7}  {:<16} {:<10} {:<6} {:>7}  CAPTION",
            "ID", "ACCOUNT", "SCHEDULED FOR", "STATUS", "TYPE", "RETRIES"
        )?;
        for scheduled in self {
            writeln!(
                out,
                "{:>5} {:>7}  {:<16} {:<10} {:<6} {:>7}  {}",
                scheduled.id,
                scheduled.account_id,
                time(scheduled.scheduled_for),
                scheduled.status,
                scheduled.post_type,
                format!("{}/{}", scheduled.retry_count, scheduled.max_retries),
                preview(scheduled.caption.as_deref()),
            )?;
        }
        Ok(())
    }
}

impl Render for ScheduledPost {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "ID", self.id)?;
        field(out, "Account", self.account_id)?;
        field(out, "Scheduled for", time(self.scheduled_for))?;
        field(out, "Status", self.status)?;
        field(out, "Type", self.post_type)?;
        field(out, "Caption", self.caption.as_deref().unwrap_or("-"))?;
        field(
            out,
            "Retries",
            format!("{} used, {} left", self.retry_count, self.retries_remaining()),
        )?;
        if let Some(error) = &self.last_error {
            field(out, "Last error", error)?;
        }
        if let Some(post_id) = self.published_post_id {
            field(out, "Published post", post_id)?;
        }
        field(out, "Published", maybe_time(self.published_at))?;
        field(out, "Created", time(self.created_at))
    }
}

impl Render for ScheduledPostStats {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Total", self.total_scheduled)?;
        field(out, "Pending", self.pending)?;
        field(out, "Published", self.published)?;
        field(out, "Failed", self.failed)?;
        field(out, "Cancelled", self.cancelled)
    }
}

impl Render for Calendar {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "Nothing scheduled");
        }
        for (day, entries) in self {
            writeln!(out, "Day {day}")?;
            for entry in entries {
                let account = entry
                    .account_username
                    .as_ref()
                    .map(|username| format!(" @{username}"))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "  {} {:<10} #{}{account}  {}",
                    entry.time,
                    entry.status,
                    entry.id,
                    entry.caption.as_deref().unwrap_or(""),
                )?;
            }
        }
        Ok(())
    }
}

impl Render for [Analytics] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:<10} {:>7} {:>10} {:>8} {:>8} {:>12} {:>10}",
            "DATE", "ACCOUNT", "FOLLOWERS", "LIKES", "COMMENTS", "IMPRESSIONS", "REACH"
        )?;
        for row in self {
            writeln!(
                out,
                "{:<10} {:>7} {:>10} {:>8} {:>8} {:>12} {:>10}",
                row.date,
                row.account_id,
                format_number(row.followers_count),
                format_number(row.total_likes),
                format_number(row.total_comments),
                format_number(row.total_impressions),
                format_number(row.total_reach),
            )?;
        }
        Ok(())
    }
}

impl Render for AccountInsights {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Account", format!("@{} ({})", self.username, self.account_id))?;
        if !self.engagement_by_post_type.is_empty() {
            writeln!(out, "Engagement by post type:")?;
            for (post_type, rate) in &self.engagement_by_post_type {
                writeln!(out, "  {post_type:<8} {}", format_engagement_rate(*rate))?;
            }
        }
        if !self.best_posting_times.is_empty() {
            writeln!(out, "Best posting times:")?;
            for (slot, score) in &self.best_posting_times {
                writeln!(out, "  {slot:<8} {score}")?;
            }
        }
        field(out, "Growth points", self.followers_growth.len())?;
        field(out, "Hashtags tracked", self.hashtag_performance.len())
    }
}

impl Render for DashboardStats {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(
            out,
            "Accounts",
            format!("{} ({} active)", self.total_accounts, self.active_accounts),
        )?;
        field(out, "Followers", format_number(self.total_followers))?;
        field(out, "Posts", format_number(self.total_posts))?;
        field(out, "Scheduled", self.scheduled_posts)?;
        field(out, "Engagement", format_engagement_rate(self.engagement_rate))?;
        if !self.top_performing_accounts.is_empty() {
            writeln!(out, "Top accounts:")?;
            for account in &self.top_performing_accounts {
                writeln!(
                    out,
                    "  @{:<22} {:>8} followers  {}",
                    account.username,
                    format_number(account.followers_count),
                    format_engagement_rate(account.engagement_rate),
                )?;
            }
        }
        Ok(())
    }
}

impl Render for RecentActivity {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Recent posts:")?;
        for post in &self.recent_posts {
            writeln!(
                out,
                "  {} @{} {} likes  {}",
                maybe_time(post.published_at),
                post.account_username,
                format_number(post.likes_count),
                preview(post.caption.as_deref()),
            )?;
        }
        writeln!(out, "Upcoming:")?;
        for scheduled in &self.upcoming_scheduled {
            writeln!(
                out,
                "  {} @{} [{}]  {}",
                time(scheduled.scheduled_for),
                scheduled.account_username,
                scheduled.status,
                preview(scheduled.caption.as_deref()),
            )?;
        }
        writeln!(out, "Newly connected:")?;
        for account in &self.recent_accounts {
            writeln!(
                out,
                "  {} @{} {} followers",
                time(account.connected_at),
                account.username,
                format_number(account.followers_count),
            )?;
        }
        Ok(())
    }
}

impl Render for PerformanceMetrics {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Period", format!("{} days", self.period_days))?;
        field(out, "Posts", self.total_posts)?;
        field(out, "Likes", format_number(self.total_likes))?;
        field(out, "Comments", format_number(self.total_comments))?;
        field(out, "Impressions", format_number(self.total_impressions))?;
        field(out, "Reach", format_number(self.total_reach))?;
        field(out, "Avg engagement", format_engagement_rate(self.avg_engagement_rate))?;
        if !self.daily_performance.is_empty() {
            writeln!(out, "{:<10} {:>6} {:>8} {:>9} {:>12}", "DATE", "POSTS", "LIKES", "COMMENTS", "IMPRESSIONS")?;
            for day in &self.daily_performance {
                writeln!(
                    out,
                    "{:<10} {:>6} {:>8} {:>9} {:>12}",
                    day.date,
                    day.posts_count,
                    format_number(day.likes),
                    format_number(day.comments),
                    format_number(day.impressions),
                )?;
            }
        }
        Ok(())
    }
}

impl Render for ContentInsights {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Posts analyzed", self.total_analyzed_posts)?;
        for (post_type, performance) in &self.post_type_performance {
            field(out, post_type, performance)?;
        }
        field(out, "Top hashtags", self.top_hashtags.len())?;
        field(out, "Best hours", self.best_posting_hours.len())
    }
}

impl Render for HealthStatus {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        field(out, "Status", &self.status)?;
        field(out, "Service", self.service.as_deref().unwrap_or("-"))?;
        field(out, "Checked", maybe_time(self.timestamp))
    }
}
