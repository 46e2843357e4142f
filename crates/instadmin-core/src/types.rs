//! Data types mirrored from the admin API payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Admin identifier type
pub type AdminId = i64;

/// Connected Instagram account identifier type
pub type AccountId = i64;

/// Post identifier type
pub type PostId = i64;

/// Scheduled post identifier type
pub type ScheduledPostId = i64;

/// Media identifier type
pub type MediaId = i64;

/// Timestamp (de)serialization that tolerates the backend's naive UTC datetimes.
///
/// The API emits `2024-03-15T14:25:30` without an offset for most columns; those
/// are interpreted as UTC. RFC 3339 values are accepted as-is.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parse a timestamp string into UTC
    #[must_use]
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// Serialize as RFC 3339
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    /// Deserialize from RFC 3339 or naive UTC
    ///
    /// # Errors
    ///
    /// Fails when the string is not a recognised timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    /// Optional variant of the timestamp helpers
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional timestamp as RFC 3339 or null
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional timestamp
        ///
        /// # Errors
        ///
        /// Fails when a present string is not a recognised timestamp.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map_or(Ok(None), |raw| {
                super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
            })
        }
    }
}

/// Declares a lowercase wire enum with `Display`/`FromStr` so that page filters
/// can compare on the string form.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All variants in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire representation
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::Error::validation(
                        stringify!($name),
                        format!("unknown value '{other}'"),
                    )),
                }
            }
        }
    };
}

wire_enum! {
    /// Instagram post format
    PostType {
        /// Regular feed post
        Feed => "feed",
        /// 24-hour story
        Story => "story",
        /// Short video reel
        Reel => "reel",
    }
}

wire_enum! {
    /// Lifecycle state of a post
    PostStatus {
        /// Not yet published
        Draft => "draft",
        /// Live on Instagram
        Published => "published",
        /// Withdrawn
        Archived => "archived",
    }
}

wire_enum! {
    /// Lifecycle state of a scheduled post
    ScheduleStatus {
        /// Waiting for its publication time
        Pending => "pending",
        /// Being published by the backend worker
        Processing => "processing",
        /// Published successfully
        Published => "published",
        /// Publication failed after retries
        Failed => "failed",
        /// Cancelled by an admin
        Cancelled => "cancelled",
    }
}

wire_enum! {
    /// Kind of uploaded media
    MediaType {
        /// Still image
        Image => "image",
        /// Video clip
        Video => "video",
        /// Multi-item carousel
        Carousel => "carousel",
    }
}

wire_enum! {
    /// Processing state of uploaded media
    MediaStatus {
        /// Stored, not processed
        Uploaded => "uploaded",
        /// Being processed
        Processing => "processing",
        /// Ready to attach to a post
        Ready => "ready",
        /// Processing failed
        Failed => "failed",
    }
}

impl Default for PostType {
    fn default() -> Self {
        Self::Feed
    }
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// An authenticated dashboard operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// Admin ID
    pub id: AdminId,
    /// Login email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Whether the admin may log in
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Whether the admin can manage other admins
    #[serde(default)]
    pub is_superuser: bool,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last successful login
    #[serde(default, with = "timestamp::option")]
    pub last_login: Option<DateTime<Utc>>,
}

/// Bearer token issued by `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque access token
    pub access_token: String,
    /// Token scheme, normally `bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds, when the backend reports it
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Credentials for the password login form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Admin email, sent as the `username` form field
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminCreate {
    /// Login email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Initial password
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

/// Payload for `PUT /admin/me`
///
/// The backend requires the email on every update but only applies the
/// name and password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminUpdate {
    /// Current login email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// New password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
}

impl AdminUpdate {
    /// Whether the update changes anything
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.password.is_none()
    }
}

/// A connected Instagram account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramAccount {
    /// Local account ID
    pub id: AccountId,
    /// Instagram handle
    pub username: String,
    /// Profile display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Profile bio
    #[serde(default)]
    pub bio: Option<String>,
    /// Instagram-side user ID
    pub instagram_user_id: String,
    /// Avatar URL
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    /// Follower count
    #[serde(default)]
    pub followers_count: u64,
    /// Following count
    #[serde(default)]
    pub following_count: u64,
    /// Number of posts on the profile
    #[serde(default)]
    pub posts_count: u64,
    /// Whether the account is connected
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Whether this is a business profile
    #[serde(default)]
    pub is_business_account: bool,
    /// Last successful data sync
    #[serde(default, with = "timestamp::option")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Connection time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Granted Graph API permissions
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Partial update for an account
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InstagramAccountUpdate {
    /// New handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 30))]
    pub username: Option<String>,
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// New bio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Activate or deactivate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// OAuth authorization URL handed out by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramAuthUrl {
    /// URL the operator opens to grant access
    pub auth_url: String,
    /// Anti-forgery state echoed back on callback
    pub state: String,
}

/// Code/state pair exchanged at `POST /instagram/auth/callback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramTokenExchange {
    /// Authorization code
    pub code: String,
    /// State from [`InstagramAuthUrl`]
    pub state: String,
}

/// Per-account summary from `GET /instagram/accounts/{id}/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStats {
    /// Account ID
    pub account_id: AccountId,
    /// Instagram handle
    pub username: String,
    /// Follower count
    #[serde(default)]
    pub followers_count: u64,
    /// Post count
    #[serde(default)]
    pub posts_count: u64,
    /// Engagement rate in percent
    #[serde(default)]
    pub engagement_rate: f64,
    /// Most recent publication
    #[serde(default, with = "timestamp::option")]
    pub last_post_date: Option<DateTime<Utc>>,
}

/// Acknowledgement returned by account actions (sync, callback)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountActionResponse {
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// Updated account, when returned
    #[serde(default)]
    pub account: Option<InstagramAccount>,
}

/// Generic acknowledgement for delete/sync/execute style endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// Any additional fields the endpoint returned
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// A post managed through the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID
    pub id: PostId,
    /// Owning account
    pub account_id: AccountId,
    /// Caption text
    #[serde(default)]
    pub caption: Option<String>,
    /// Hashtags without the leading `#`
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    /// Post format
    #[serde(default)]
    pub post_type: PostType,
    /// Location ID
    #[serde(default)]
    pub location_id: Option<String>,
    /// Location name
    #[serde(default)]
    pub location_name: Option<String>,
    /// Instagram-side media ID once published
    #[serde(default)]
    pub instagram_post_id: Option<String>,
    /// Lifecycle state
    pub status: PostStatus,
    /// Like count
    #[serde(default)]
    pub likes_count: u64,
    /// Comment count
    #[serde(default)]
    pub comments_count: u64,
    /// Share count
    #[serde(default)]
    pub shares_count: u64,
    /// Impressions
    #[serde(default)]
    pub impressions: u64,
    /// Reach
    #[serde(default)]
    pub reach: u64,
    /// Publication time
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last modification
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /posts`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostCreate {
    /// Owning account
    pub account_id: AccountId,
    /// Caption text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2200, message = "Caption too long. Maximum 2200 characters allowed"))]
    pub caption: Option<String>,
    /// Hashtags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "Maximum 30 hashtags allowed"))]
    pub hashtags: Option<Vec<String>>,
    /// Post format
    #[serde(default)]
    pub post_type: PostType,
    /// Location ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Location name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// IDs of previously uploaded media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_files: Option<Vec<MediaId>>,
}

/// Partial update for a post
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostUpdate {
    /// Caption text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2200, message = "Caption too long. Maximum 2200 characters allowed"))]
    pub caption: Option<String>,
    /// Hashtags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "Maximum 30 hashtags allowed"))]
    pub hashtags: Option<Vec<String>>,
    /// Location ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Location name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Lifecycle state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// Result of `POST /posts/{id}/publish`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// Instagram-side media ID
    #[serde(default)]
    pub instagram_post_id: Option<String>,
}

/// Engagement numbers for a single post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalytics {
    /// Post ID
    pub post_id: PostId,
    /// Likes
    #[serde(default)]
    pub likes_count: u64,
    /// Comments
    #[serde(default)]
    pub comments_count: u64,
    /// Shares
    #[serde(default)]
    pub shares_count: u64,
    /// Impressions
    #[serde(default)]
    pub impressions: u64,
    /// Reach
    #[serde(default)]
    pub reach: u64,
    /// Engagement rate in percent
    #[serde(default)]
    pub engagement_rate: f64,
    /// Publication time
    #[serde(with = "timestamp")]
    pub posted_at: DateTime<Utc>,
}

/// Aggregate post counters from `GET /posts/stats/overview`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostStats {
    /// All posts
    pub total_posts: u64,
    /// Published posts
    pub published_posts: u64,
    /// Drafts
    pub draft_posts: u64,
    /// Failed posts
    pub failed_posts: u64,
    /// Likes across posts
    pub total_likes: u64,
    /// Comments across posts
    pub total_comments: u64,
    /// Engagement rate in percent
    pub engagement_rate: f64,
}

/// An uploaded media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Media ID
    pub id: MediaId,
    /// Post the media is attached to
    #[serde(default)]
    pub post_id: Option<PostId>,
    /// Stored filename
    pub filename: String,
    /// Name of the uploaded file
    pub original_filename: String,
    /// Storage path on the backend
    pub file_path: String,
    /// Size in bytes
    pub file_size: u64,
    /// MIME type
    pub mime_type: String,
    /// Kind of media
    pub media_type: MediaType,
    /// Processing state
    pub status: MediaStatus,
    /// Accessibility text
    #[serde(default)]
    pub alt_text: Option<String>,
    /// Position within a carousel
    #[serde(default)]
    pub order_index: u32,
    /// Pixel width
    #[serde(default)]
    pub width: Option<u32>,
    /// Pixel height
    #[serde(default)]
    pub height: Option<u32>,
    /// Video duration in seconds
    #[serde(default)]
    pub duration: Option<u32>,
    /// Instagram-side media ID
    #[serde(default)]
    pub instagram_media_id: Option<String>,
    /// Thumbnail path
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    /// Upload time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Partial update for media metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpdate {
    /// Accessibility text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Position within a carousel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
}

/// A post queued for future publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPost {
    /// Scheduled post ID
    pub id: ScheduledPostId,
    /// Target account
    pub account_id: AccountId,
    /// Caption text
    #[serde(default)]
    pub caption: Option<String>,
    /// Hashtags
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    /// Post format
    #[serde(default)]
    pub post_type: PostType,
    /// Location ID
    #[serde(default)]
    pub location_id: Option<String>,
    /// Location name
    #[serde(default)]
    pub location_name: Option<String>,
    /// Publication time
    #[serde(with = "timestamp")]
    pub scheduled_for: DateTime<Utc>,
    /// Lifecycle state
    pub status: ScheduleStatus,
    /// Publication attempts so far
    #[serde(default)]
    pub retry_count: u32,
    /// Attempts allowed before the post is marked failed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Error from the last attempt
    #[serde(default)]
    pub last_error: Option<String>,
    /// Resulting post, once published
    #[serde(default)]
    pub published_post_id: Option<PostId>,
    /// Instagram-side media ID, once published
    #[serde(default)]
    pub instagram_post_id: Option<String>,
    /// Publication time
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    /// Backend worker task handling the publication
    #[serde(default, rename = "celery_task_id")]
    pub task_id: Option<String>,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Media file paths
    #[serde(default)]
    pub media_files: Option<Vec<String>>,
}

impl ScheduledPost {
    /// Whether the backend may still attempt publication
    #[must_use]
    pub const fn retries_remaining(&self) -> u32 {
        self.max_retries.saturating_sub(self.retry_count)
    }
}

/// Payload for `POST /scheduled`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduledPostCreate {
    /// Target account
    pub account_id: AccountId,
    /// Publication time
    #[serde(with = "timestamp")]
    pub scheduled_for: DateTime<Utc>,
    /// Caption text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2200, message = "Caption too long. Maximum 2200 characters allowed"))]
    pub caption: Option<String>,
    /// Hashtags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "Maximum 30 hashtags allowed"))]
    pub hashtags: Option<Vec<String>>,
    /// Post format
    #[serde(default)]
    pub post_type: PostType,
    /// Location ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Location name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Media file paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_files: Option<Vec<String>>,
}

/// Partial update for a scheduled post
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ScheduledPostUpdate {
    /// Caption text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2200, message = "Caption too long. Maximum 2200 characters allowed"))]
    pub caption: Option<String>,
    /// Hashtags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "Maximum 30 hashtags allowed"))]
    pub hashtags: Option<Vec<String>>,
    /// New publication time
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Lifecycle state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
    /// Location ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Location name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// Scheduled post counters by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPostStats {
    /// All scheduled posts
    pub total_scheduled: u64,
    /// Waiting
    pub pending: u64,
    /// Published
    pub published: u64,
    /// Failed
    pub failed: u64,
    /// Cancelled
    pub cancelled: u64,
}

/// One entry of the monthly calendar view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Scheduled post ID
    pub id: ScheduledPostId,
    /// Time of day, `HH:MM`
    pub time: String,
    /// Caption preview
    #[serde(default)]
    pub caption: Option<String>,
    /// Lifecycle state
    pub status: ScheduleStatus,
    /// Target account handle
    #[serde(default)]
    pub account_username: Option<String>,
}

/// Calendar keyed by day of month
pub type Calendar = BTreeMap<u32, Vec<CalendarEntry>>;

/// Daily analytics snapshot of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Snapshot ID
    pub id: i64,
    /// Account ID
    pub account_id: AccountId,
    /// Snapshot date
    pub date: NaiveDate,
    /// Followers
    #[serde(default)]
    pub followers_count: u64,
    /// Following
    #[serde(default)]
    pub following_count: u64,
    /// Posts
    #[serde(default)]
    pub posts_count: u64,
    /// Profile views
    #[serde(default)]
    pub profile_views: u64,
    /// Website clicks
    #[serde(default)]
    pub website_clicks: u64,
    /// Likes
    #[serde(default)]
    pub total_likes: u64,
    /// Comments
    #[serde(default)]
    pub total_comments: u64,
    /// Shares
    #[serde(default)]
    pub total_shares: u64,
    /// Impressions
    #[serde(default)]
    pub total_impressions: u64,
    /// Reach
    #[serde(default)]
    pub total_reach: u64,
    /// Story impressions
    #[serde(default)]
    pub story_impressions: u64,
    /// Story reach
    #[serde(default)]
    pub story_reach: u64,
    /// Engagement breakdown
    #[serde(default)]
    pub engagement_rate: Option<serde_json::Value>,
    /// Audience breakdown
    #[serde(default)]
    pub audience_demographics: Option<serde_json::Value>,
    /// Best posts of the day
    #[serde(default)]
    pub top_posts: Option<Vec<serde_json::Value>>,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Insights from `GET /analytics/insights/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInsights {
    /// Account ID
    pub account_id: AccountId,
    /// Instagram handle
    pub username: String,
    /// Follower counts over time
    #[serde(default)]
    pub followers_growth: Vec<serde_json::Value>,
    /// Engagement rate per post format
    #[serde(default)]
    pub engagement_by_post_type: BTreeMap<String, f64>,
    /// Engagement by hour of day
    #[serde(default)]
    pub best_posting_times: BTreeMap<String, i64>,
    /// Hashtag statistics
    #[serde(default)]
    pub hashtag_performance: Vec<serde_json::Value>,
}

/// Account entry in the dashboard leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAccount {
    /// Account ID
    pub id: AccountId,
    /// Instagram handle
    pub username: String,
    /// Followers
    #[serde(default)]
    pub followers_count: u64,
    /// Published posts with reach
    #[serde(default)]
    pub posts_count: u64,
    /// Engagement rate in percent
    #[serde(default)]
    pub engagement_rate: f64,
}

/// Headline numbers from `GET /dashboard/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Connected accounts
    pub total_accounts: u64,
    /// Active accounts
    pub active_accounts: u64,
    /// Followers across accounts
    pub total_followers: u64,
    /// Published posts
    pub total_posts: u64,
    /// Pending scheduled posts
    pub scheduled_posts: u64,
    /// Engagement rate in percent
    pub engagement_rate: f64,
    /// Top accounts by engagement
    #[serde(default)]
    pub top_performing_accounts: Vec<TopAccount>,
}

/// Recently published post in the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPost {
    /// Post ID
    pub id: PostId,
    /// Caption preview
    #[serde(default)]
    pub caption: Option<String>,
    /// Account handle
    pub account_username: String,
    /// Publication time
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    /// Likes
    #[serde(default)]
    pub likes_count: u64,
    /// Comments
    #[serde(default)]
    pub comments_count: u64,
}

/// Upcoming scheduled post in the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingScheduled {
    /// Scheduled post ID
    pub id: ScheduledPostId,
    /// Caption preview
    #[serde(default)]
    pub caption: Option<String>,
    /// Account handle
    pub account_username: String,
    /// Publication time
    #[serde(with = "timestamp")]
    pub scheduled_for: DateTime<Utc>,
    /// Lifecycle state
    pub status: ScheduleStatus,
}

/// Recently connected account in the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentAccount {
    /// Account ID
    pub id: AccountId,
    /// Instagram handle
    pub username: String,
    /// Followers
    #[serde(default)]
    pub followers_count: u64,
    /// Connection time
    #[serde(with = "timestamp")]
    pub connected_at: DateTime<Utc>,
}

/// Payload of `GET /dashboard/recent-activity`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    /// Recently published posts
    #[serde(default)]
    pub recent_posts: Vec<RecentPost>,
    /// Posts due within the next week
    #[serde(default)]
    pub upcoming_scheduled: Vec<UpcomingScheduled>,
    /// Recently connected accounts
    #[serde(default)]
    pub recent_accounts: Vec<RecentAccount>,
}

/// One day of the performance chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPerformance {
    /// Day, `YYYY-MM-DD`
    pub date: String,
    /// Posts published that day
    #[serde(default)]
    pub posts_count: u64,
    /// Likes
    #[serde(default)]
    pub likes: u64,
    /// Comments
    #[serde(default)]
    pub comments: u64,
    /// Impressions
    #[serde(default)]
    pub impressions: u64,
}

/// Payload of `GET /dashboard/performance-metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Window length in days
    pub period_days: u32,
    /// Posts in the window
    #[serde(default)]
    pub total_posts: u64,
    /// Likes
    #[serde(default)]
    pub total_likes: u64,
    /// Comments
    #[serde(default)]
    pub total_comments: u64,
    /// Impressions
    #[serde(default)]
    pub total_impressions: u64,
    /// Reach
    #[serde(default)]
    pub total_reach: u64,
    /// Average engagement rate in percent
    #[serde(default)]
    pub avg_engagement_rate: f64,
    /// Last seven days, oldest first
    #[serde(default)]
    pub daily_performance: Vec<DailyPerformance>,
}

/// Payload of `GET /dashboard/content-insights`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentInsights {
    /// Aggregates per post format
    #[serde(default)]
    pub post_type_performance: BTreeMap<String, serde_json::Value>,
    /// Most used hashtags
    #[serde(default)]
    pub top_hashtags: Vec<serde_json::Value>,
    /// Hours with the best engagement
    #[serde(default)]
    pub best_posting_hours: Vec<serde_json::Value>,
    /// Posts considered
    #[serde(default)]
    pub total_analyzed_posts: u64,
}

/// Payload of `GET /dashboard/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` when the backend is up
    pub status: String,
    /// Server time
    #[serde(default, with = "timestamp::option")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Service name
    #[serde(default)]
    pub service: Option<String>,
}

/// Query for `GET /instagram/accounts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountQuery {
    /// Only list connected accounts (backend default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_only: Option<bool>,
}

/// Query for `GET /posts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostQuery {
    /// Restrict to an account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    /// Restrict to a status
    #[serde(rename = "status_filter", skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    /// Page size (backend caps at 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Page offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query for `GET /scheduled`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledQuery {
    /// Restrict to an account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    /// Restrict to a status
    #[serde(rename = "status_filter", skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Page offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query for `GET /media`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaQuery {
    /// Restrict to a media kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Page offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query for `GET /analytics` and the per-account analytics endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    /// Restrict to an account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    /// First day, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Maximum rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

wire_enum! {
    /// Export format for `GET /analytics/export/{id}`
    ExportFormat {
        /// JSON document
        Json => "json",
        /// CSV table
        Csv => "csv",
    }
}

const fn default_true() -> bool {
    true
}

fn default_token_type() -> String {
    "bearer".to_string()
}

const fn default_max_retries() -> u32 {
    3
}
