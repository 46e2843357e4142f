//! instadmin command line
//!
//! Drives the Instagram admin API from a terminal: log in once, then manage
//! connected accounts, posts, media, scheduled posts and analytics.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod commands;
mod output;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use instadmin_client::{ApiClient, Session};
use instadmin_core::context_error::{ContextError, Result, ResultExt};
use instadmin_core::types::{
    AccountId, AdminId, ExportFormat, MediaId, MediaType, PostId, PostStatus, PostType, ScheduleStatus,
    ScheduledPostId,
};
use instadmin_core::{Config, Error};
use instadmin_dashboard::StatusFilter;
use instadmin_dashboard::filters::AccountActivity;
use output::Output;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// Command line interface for the Instagram admin API
#[derive(Parser)]
#[command(
    name = "instadmin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manage Instagram accounts through the admin API",
    long_about = "Log in to the admin API once, then manage connected Instagram accounts, posts, media, scheduled posts and analytics from the terminal."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Admin email or username
        #[arg(short, long, env = "INSTADMIN_USERNAME")]
        username: String,

        /// Password
        #[arg(short, long, env = "INSTADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show the logged-in admin
    Whoami,

    /// Manage admin accounts
    Admin {
        /// Admin subcommand
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Manage connected Instagram accounts
    Accounts {
        /// Account subcommand
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Manage posts
    Posts {
        /// Post subcommand
        #[command(subcommand)]
        action: PostCommands,
    },

    /// Manage uploaded media
    Media {
        /// Media subcommand
        #[command(subcommand)]
        action: MediaCommands,
    },

    /// Manage scheduled posts
    Scheduled {
        /// Scheduled post subcommand
        #[command(subcommand)]
        action: ScheduledCommands,
    },

    /// Account analytics
    Analytics {
        /// Analytics subcommand
        #[command(subcommand)]
        action: AnalyticsCommands,
    },

    /// Dashboard overview
    Dashboard {
        /// Dashboard subcommand
        #[command(subcommand)]
        action: DashboardCommands,
    },

    /// Show the resolved configuration
    Config,
}

/// Admin commands
#[derive(Subcommand)]
enum AdminCommands {
    /// Change your display name or password
    Update {
        /// New display name
        #[arg(long)]
        full_name: Option<String>,

        /// New password
        #[arg(long, env = "INSTADMIN_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List every admin (superusers only)
    List,

    /// Delete another admin (superusers only)
    Delete {
        /// Admin ID
        id: AdminId,
    },
}

/// Account commands
#[derive(Subcommand)]
enum AccountCommands {
    /// List connected accounts
    List {
        /// Ask the API for active accounts only
        #[arg(long)]
        active_only: bool,

        /// Connection state (all, active, inactive)
        #[arg(long, default_value = "all")]
        status: StatusFilter<AccountActivity>,

        /// Username search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one account
    Show {
        /// Account ID
        id: AccountId,
    },

    /// Refresh profile data from Instagram
    Sync {
        /// Account ID
        id: AccountId,
    },

    /// Edit account details
    Update {
        /// Account ID
        id: AccountId,

        /// New username
        #[arg(long)]
        username: Option<String>,

        /// New display name
        #[arg(long)]
        full_name: Option<String>,

        /// New bio
        #[arg(long)]
        bio: Option<String>,

        /// Enable or disable the account
        #[arg(long)]
        active: Option<bool>,
    },

    /// Disconnect an account
    Delete {
        /// Account ID
        id: AccountId,
    },

    /// Print the Instagram authorization URL for connecting an account
    ConnectUrl,

    /// Show account statistics
    Stats {
        /// Account ID
        id: AccountId,
    },
}

/// Fields shared by post and scheduled post creation
#[derive(Args)]
struct ContentArgs {
    /// Caption text
    #[arg(long)]
    caption: Option<String>,

    /// Hashtag, repeatable (with or without `#`)
    #[arg(long = "hashtag", value_name = "TAG")]
    hashtags: Vec<String>,

    /// Post format
    #[arg(long = "type", default_value = "feed")]
    post_type: PostType,

    /// Location ID
    #[arg(long)]
    location_id: Option<String>,

    /// Location name
    #[arg(long)]
    location_name: Option<String>,
}

/// Post commands
#[derive(Subcommand)]
enum PostCommands {
    /// List posts
    List {
        /// Restrict to an account
        #[arg(short, long)]
        account: Option<AccountId>,

        /// Status (all, draft, published, archived)
        #[arg(long, default_value = "all")]
        status: StatusFilter<PostStatus>,

        /// Post type (all, feed, story, reel)
        #[arg(long = "type", default_value = "all")]
        post_type: StatusFilter<PostType>,

        /// Caption search
        #[arg(short, long)]
        search: Option<String>,

        /// Created on or after (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Created on or before (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Page offset
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one post
    Show {
        /// Post ID
        id: PostId,
    },

    /// Create a draft post
    Create {
        /// Target account
        #[arg(short, long)]
        account: AccountId,

        #[command(flatten)]
        content: ContentArgs,

        /// Uploaded media ID, repeatable
        #[arg(long = "media", value_name = "MEDIA_ID")]
        media: Vec<MediaId>,
    },

    /// Edit a post
    Update {
        /// Post ID
        id: PostId,

        /// New caption
        #[arg(long)]
        caption: Option<String>,

        /// Replacement hashtags, repeatable
        #[arg(long = "hashtag", value_name = "TAG")]
        hashtags: Vec<String>,

        /// New location name
        #[arg(long)]
        location_name: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<PostStatus>,
    },

    /// Publish a draft to Instagram now
    Publish {
        /// Post ID
        id: PostId,
    },

    /// Delete a post
    Delete {
        /// Post ID
        id: PostId,
    },

    /// Show engagement numbers of a post
    Analytics {
        /// Post ID
        id: PostId,
    },

    /// Show post totals
    Stats {
        /// Restrict to an account
        #[arg(short, long)]
        account: Option<AccountId>,
    },
}

/// Media commands
#[derive(Subcommand)]
enum MediaCommands {
    /// List uploaded media
    List {
        /// Media type (image, video, carousel)
        #[arg(long = "type")]
        media_type: Option<MediaType>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Page offset
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Upload an image or video
    Upload {
        /// File to upload
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Accessibility text
        #[arg(long)]
        alt_text: Option<String>,
    },

    /// Show one media item
    Show {
        /// Media ID
        id: MediaId,
    },

    /// Edit media details
    Update {
        /// Media ID
        id: MediaId,

        /// New accessibility text
        #[arg(long)]
        alt_text: Option<String>,

        /// Position within a carousel
        #[arg(long)]
        order: Option<u32>,
    },

    /// Delete a media item
    Delete {
        /// Media ID
        id: MediaId,
    },
}

/// Scheduled post commands
#[derive(Subcommand)]
enum ScheduledCommands {
    /// List scheduled posts
    List {
        /// Restrict to an account
        #[arg(short, long)]
        account: Option<AccountId>,

        /// Status (all, pending, processing, published, failed, cancelled)
        #[arg(long, default_value = "all")]
        status: StatusFilter<ScheduleStatus>,

        /// Only posts still ahead
        #[arg(long, conflicts_with = "past")]
        upcoming: bool,

        /// Only posts whose time has passed
        #[arg(long)]
        past: bool,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Page offset
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one scheduled post
    Show {
        /// Scheduled post ID
        id: ScheduledPostId,
    },

    /// Schedule a post
    Create {
        /// Target account
        #[arg(short, long)]
        account: AccountId,

        /// Publication time, RFC 3339 (e.g. 2025-03-01T18:00:00Z)
        #[arg(long, value_name = "TIME")]
        at: DateTime<Utc>,

        #[command(flatten)]
        content: ContentArgs,

        /// Media file path on the server, repeatable
        #[arg(long = "media", value_name = "PATH")]
        media: Vec<String>,
    },

    /// Edit a scheduled post
    Update {
        /// Scheduled post ID
        id: ScheduledPostId,

        /// New publication time, RFC 3339
        #[arg(long, value_name = "TIME")]
        at: Option<DateTime<Utc>>,

        /// New caption
        #[arg(long)]
        caption: Option<String>,

        /// Replacement hashtags, repeatable
        #[arg(long = "hashtag", value_name = "TAG")]
        hashtags: Vec<String>,

        /// New location name
        #[arg(long)]
        location_name: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<ScheduleStatus>,
    },

    /// Cancel a scheduled post
    #[command(visible_alias = "delete")]
    Cancel {
        /// Scheduled post ID
        id: ScheduledPostId,
    },

    /// Publish a pending post now
    Execute {
        /// Scheduled post ID
        id: ScheduledPostId,
    },

    /// Show a month of scheduled posts by day
    Calendar {
        /// Year (defaults to the current one)
        #[arg(long)]
        year: Option<i32>,

        /// Month 1-12 (defaults to the current one)
        #[arg(long)]
        month: Option<u32>,

        /// Restrict to an account
        #[arg(short, long)]
        account: Option<AccountId>,

        /// Build the calendar from the post list, labelled with account names
        #[arg(long)]
        local: bool,
    },

    /// Show scheduled post counts by status
    Stats {
        /// Restrict to an account
        #[arg(short, long)]
        account: Option<AccountId>,

        /// Count from the post list instead of the server totals
        #[arg(long)]
        local: bool,
    },
}

/// Analytics commands
#[derive(Subcommand)]
enum AnalyticsCommands {
    /// List analytics snapshots
    List {
        /// Restrict to an account
        #[arg(short, long)]
        account: Option<AccountId>,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Maximum rows
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show recent snapshots of one account
    Account {
        /// Account ID
        id: AccountId,

        /// Days to look back
        #[arg(long)]
        days: Option<u32>,
    },

    /// Fetch fresh analytics from Instagram
    Sync {
        /// Account ID
        id: AccountId,
    },

    /// Show derived insights of one account
    Insights {
        /// Account ID
        id: AccountId,

        /// Days to look back
        #[arg(long)]
        days: Option<u32>,
    },

    /// Delete every stored snapshot of one account
    Purge {
        /// Account ID
        id: AccountId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Export analytics of one account
    Export {
        /// Account ID
        id: AccountId,

        /// Export format (json, csv)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Dashboard commands
#[derive(Subcommand)]
enum DashboardCommands {
    /// Headline numbers
    Stats,

    /// Recent posts, upcoming posts and new accounts
    Activity,

    /// Performance over a period
    Metrics {
        /// Days to look back
        #[arg(long)]
        days: Option<u32>,
    },

    /// Content performance by type, hashtag and hour
    Insights,

    /// API health check
    Health,

    /// Keep refreshing the headline numbers until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_session_expiry(&e) => {
            eprintln!("session expired, run `instadmin login`");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Whether the command failed because the stored session was rejected
fn is_session_expiry(err: &ContextError) -> bool {
    err.core_error().is_some_and(Error::is_unauthorized)
}

/// Load configuration, set up logging and the client, then dispatch
///
/// # Errors
///
/// Returns the first failure of the selected command
async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    instadmin_core::init_logging(&config.logging)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api.root_url(),
        token_file = %config.session.token_file.display(),
        "instadmin starting"
    );

    let session = Session::from_config(&config.session);
    let client = ApiClient::new(&config.api, session)?;
    let output = Output::new(cli.json);

    if !matches!(cli.command, Commands::Login { .. } | Commands::Config) {
        restore_session(&client).await?;
    }

    match cli.command {
        Commands::Login { username, password } => {
            commands::login(client, output, &username, &password).await
        }
        Commands::Logout => commands::logout(client, output).await,
        Commands::Whoami => commands::whoami(client, output).await,
        Commands::Admin { action } => commands::admin(&client, output, action).await,
        Commands::Accounts { action } => commands::accounts(&client, output, action).await,
        Commands::Posts { action } => commands::posts(&client, output, action).await,
        Commands::Media { action } => commands::media(&client, output, action).await,
        Commands::Scheduled { action } => commands::scheduled(&client, output, action).await,
        Commands::Analytics { action } => commands::analytics(&client, output, action).await,
        Commands::Dashboard { action } => {
            commands::dashboard(client, &config, output, action).await
        }
        Commands::Config => commands::show_config(&config, output),
    }
}

/// Load configuration from the given file or the default locations
///
/// # Errors
///
/// Returns error if the configuration cannot be read or parsed
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        Config::load_from(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    } else {
        Config::load().with_context(|| "Failed to load configuration")
    }
}

/// Pick up the token stored by `instadmin login`
///
/// # Errors
///
/// Returns error if the token file exists but cannot be read
async fn restore_session(client: &ApiClient) -> Result<()> {
    if !client
        .session()
        .restore()
        .await
        .with_context(|| "Failed to read stored session")?
    {
        debug!("No stored session, requests go out unauthenticated");
    }
    Ok(())
}
