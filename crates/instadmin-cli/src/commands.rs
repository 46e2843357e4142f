//! Subcommand handlers

use crate::output::Output;
use crate::{
    AccountCommands, AdminCommands, AnalyticsCommands, ContentArgs, DashboardCommands, MediaCommands,
    PostCommands, ScheduledCommands,
};
use chrono::{Datelike, Utc};
use instadmin_client::{ApiClient, SessionEvent};
use instadmin_core::context_error::{Result, ResultExt};
use instadmin_core::types::{
    AccountQuery, AdminUpdate, AnalyticsQuery, InstagramAccountUpdate, MediaQuery, MediaUpdate, PostCreate,
    PostQuery, PostUpdate, ScheduledPostCreate, ScheduledPostUpdate, ScheduledQuery,
};
use instadmin_core::utils::normalize_hashtags;
use instadmin_core::{Config, Error, context_error};
use instadmin_dashboard::filters::{
    AccountFilter, PostFilter, ScheduleWindow, ScheduledFilter, filter_accounts, filter_posts,
    filter_scheduled, group_by_day, label_accounts, scheduled_summary,
};
use instadmin_dashboard::{AuthProvider, DashboardContext, DateRange, StatusFilter};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

fn hashtags(tags: &[String]) -> Result<Option<Vec<String>>> {
    if tags.is_empty() {
        Ok(None)
    } else {
        Ok(Some(normalize_hashtags(tags)?))
    }
}

const fn only<S: Copy>(filter: &StatusFilter<S>) -> Option<S> {
    match filter {
        StatusFilter::All => None,
        StatusFilter::Only(status) => Some(*status),
    }
}

pub(crate) async fn login(
    client: ApiClient,
    output: Output,
    username: &str,
    password: &str,
) -> Result<()> {
    let auth = AuthProvider::new(client);
    let admin = auth.login(username, password).await?;
    output.message(&format!("Logged in as {}", admin.email))
}

pub(crate) async fn logout(client: ApiClient, output: Output) -> Result<()> {
    AuthProvider::new(client)
        .logout()
        .await
        .with_context(|| "Failed to remove stored session")?;
    output.message("Logged out")
}

pub(crate) async fn whoami(client: ApiClient, output: Output) -> Result<()> {
    let auth = AuthProvider::new(client);
    match auth.initialize().await? {
        Some(admin) => output.emit(&admin),
        None => Err(Error::Unauthorized.into()),
    }
}

pub(crate) async fn admin(client: &ApiClient, output: Output, action: AdminCommands) -> Result<()> {
    match action {
        AdminCommands::Update {
            full_name,
            password,
        } => {
            if full_name.is_none() && password.is_none() {
                return Err(context_error!("Nothing to update, pass --full-name or --password"));
            }
            let current = client.me().await?;
            let update = AdminUpdate {
                email: current.email,
                full_name,
                password,
            };
            output.emit(&client.update_me(&update).await?)
        }
        AdminCommands::List => output.emit(client.list_admins().await?.as_slice()),
        AdminCommands::Delete { id } => {
            info!(admin_id = id, "Deleting admin");
            output.emit(&client.delete_admin(id).await?)
        }
    }
}

pub(crate) async fn accounts(client: &ApiClient, output: Output, action: AccountCommands) -> Result<()> {
    match action {
        AccountCommands::List {
            active_only,
            status,
            search,
        } => {
            let query = AccountQuery {
                active_only: active_only.then_some(true),
            };
            let accounts = client.list_accounts(&query).await?;
            let filter = AccountFilter {
                activity: status,
                search,
            };
            let shown: Vec<_> = filter_accounts(&accounts, &filter).into_iter().cloned().collect();
            output.emit(shown.as_slice())
        }
        AccountCommands::Show { id } => output.emit(&client.get_account(id).await?),
        AccountCommands::Sync { id } => {
            info!(account_id = id, "Syncing account");
            output.emit(&client.sync_account(id).await?)
        }
        AccountCommands::Update {
            id,
            username,
            full_name,
            bio,
            active,
        } => {
            let update = InstagramAccountUpdate {
                username,
                full_name,
                bio,
                is_active: active,
            };
            if update.username.is_none()
                && update.full_name.is_none()
                && update.bio.is_none()
                && update.is_active.is_none()
            {
                return Err(context_error!("Nothing to update, pass at least one field"));
            }
            output.emit(&client.update_account(id, &update).await?)
        }
        AccountCommands::Delete { id } => output.emit(&client.delete_account(id).await?),
        AccountCommands::ConnectUrl => output.emit(&client.instagram_auth_url().await?),
        AccountCommands::Stats { id } => output.emit(&client.account_stats(id).await?),
    }
}

pub(crate) async fn posts(client: &ApiClient, output: Output, action: PostCommands) -> Result<()> {
    match action {
        PostCommands::List {
            account,
            status,
            post_type,
            search,
            from,
            to,
            limit,
            offset,
        } => {
            let date_range = match (from, to) {
                (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
                _ => None,
            };
            let query = PostQuery {
                account_id: account,
                status: only(&status),
                limit,
                offset,
            };
            let posts = client.list_posts(&query).await?;
            let filter = PostFilter {
                status,
                post_type,
                account_id: account,
                search,
                date_range,
            };
            let shown: Vec<_> = filter_posts(&posts, &filter).into_iter().cloned().collect();
            output.emit(shown.as_slice())
        }
        PostCommands::Show { id } => output.emit(&client.get_post(id).await?),
        PostCommands::Create {
            account,
            content,
            media,
        } => {
            let ContentArgs {
                caption,
                hashtags: tags,
                post_type,
                location_id,
                location_name,
            } = content;
            let post = PostCreate {
                account_id: account,
                caption,
                hashtags: hashtags(&tags)?,
                post_type,
                location_id,
                location_name,
                media_files: (!media.is_empty()).then_some(media),
            };
            output.emit(&client.create_post(&post).await?)
        }
        PostCommands::Update {
            id,
            caption,
            hashtags: tags,
            location_name,
            status,
        } => {
            let update = PostUpdate {
                caption,
                hashtags: hashtags(&tags)?,
                location_name,
                status,
                ..PostUpdate::default()
            };
            output.emit(&client.update_post(id, &update).await?)
        }
        PostCommands::Publish { id } => {
            info!(post_id = id, "Publishing post");
            output.emit(&client.publish_post(id).await?)
        }
        PostCommands::Delete { id } => output.emit(&client.delete_post(id).await?),
        PostCommands::Analytics { id } => output.emit(&client.post_analytics(id).await?),
        PostCommands::Stats { account } => output.emit(&client.post_stats(account).await?),
    }
}

pub(crate) async fn media(client: &ApiClient, output: Output, action: MediaCommands) -> Result<()> {
    match action {
        MediaCommands::List {
            media_type,
            limit,
            offset,
        } => {
            let query = MediaQuery {
                media_type,
                limit,
                offset,
            };
            output.emit(client.list_media(&query).await?.as_slice())
        }
        MediaCommands::Upload { file, alt_text } => {
            info!(file = %file.display(), "Uploading media");
            let media = client
                .upload_media(&file, alt_text.as_deref())
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            output.emit(&media)
        }
        MediaCommands::Show { id } => output.emit(&client.get_media(id).await?),
        MediaCommands::Update {
            id,
            alt_text,
            order,
        } => {
            let update = MediaUpdate {
                alt_text,
                order_index: order,
            };
            output.emit(&client.update_media(id, &update).await?)
        }
        MediaCommands::Delete { id } => output.emit(&client.delete_media(id).await?),
    }
}

pub(crate) async fn scheduled(
    client: &ApiClient,
    output: Output,
    action: ScheduledCommands,
) -> Result<()> {
    match action {
        ScheduledCommands::List {
            account,
            status,
            upcoming,
            past,
            limit,
            offset,
        } => {
            let query = ScheduledQuery {
                account_id: account,
                status: only(&status),
                limit,
                offset,
            };
            let posts = client.list_scheduled(&query).await?;
            let now = Utc::now();
            let window = if upcoming {
                ScheduleWindow::Upcoming(now)
            } else if past {
                ScheduleWindow::Past(now)
            } else {
                ScheduleWindow::All
            };
            let filter = ScheduledFilter {
                status,
                account_id: account,
                window,
            };
            let shown: Vec<_> = filter_scheduled(&posts, &filter).into_iter().cloned().collect();
            output.emit(shown.as_slice())
        }
        ScheduledCommands::Show { id } => output.emit(&client.get_scheduled(id).await?),
        ScheduledCommands::Create {
            account,
            at,
            content,
            media,
        } => {
            let ContentArgs {
                caption,
                hashtags: tags,
                post_type,
                location_id,
                location_name,
            } = content;
            let scheduled = ScheduledPostCreate {
                account_id: account,
                scheduled_for: at,
                caption,
                hashtags: hashtags(&tags)?,
                post_type,
                location_id,
                location_name,
                media_files: (!media.is_empty()).then_some(media),
            };
            output.emit(&client.create_scheduled(&scheduled).await?)
        }
        ScheduledCommands::Update {
            id,
            at,
            caption,
            hashtags: tags,
            location_name,
            status,
        } => {
            let update = ScheduledPostUpdate {
                scheduled_for: at,
                caption,
                hashtags: hashtags(&tags)?,
                location_name,
                status,
                ..ScheduledPostUpdate::default()
            };
            output.emit(&client.update_scheduled(id, &update).await?)
        }
        ScheduledCommands::Cancel { id } => output.emit(&client.cancel_scheduled(id).await?),
        ScheduledCommands::Execute { id } => {
            info!(scheduled_id = id, "Publishing scheduled post now");
            output.emit(&client.execute_scheduled(id).await?)
        }
        ScheduledCommands::Calendar {
            year,
            month,
            account,
            local,
        } => {
            let today = Utc::now();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());

            let calendar = if local {
                let query = ScheduledQuery {
                    account_id: account,
                    ..ScheduledQuery::default()
                };
                let account_query = AccountQuery::default();
                let (posts, accounts) = tokio::try_join!(
                    client.list_scheduled(&query),
                    client.list_accounts(&account_query),
                )?;
                let mut calendar = group_by_day(&posts, year, month);
                label_accounts(&mut calendar, &posts, &accounts);
                calendar
            } else {
                client.scheduled_calendar(year, month, account).await?
            };
            output.emit(&calendar)
        }
        ScheduledCommands::Stats { account, local } => {
            let stats = if local {
                let query = ScheduledQuery {
                    account_id: account,
                    ..ScheduledQuery::default()
                };
                scheduled_summary(&client.list_scheduled(&query).await?)
            } else {
                client.scheduled_stats(account).await?
            };
            output.emit(&stats)
        }
    }
}

pub(crate) async fn analytics(
    client: &ApiClient,
    output: Output,
    action: AnalyticsCommands,
) -> Result<()> {
    match action {
        AnalyticsCommands::List {
            account,
            from,
            to,
            limit,
        } => {
            let query = AnalyticsQuery {
                account_id: account,
                start_date: from,
                end_date: to,
                limit,
            };
            output.emit(client.list_analytics(&query).await?.as_slice())
        }
        AnalyticsCommands::Account { id, days } => {
            output.emit(client.account_analytics(id, days).await?.as_slice())
        }
        AnalyticsCommands::Sync { id } => output.emit(&client.sync_analytics(id).await?),
        AnalyticsCommands::Insights { id, days } => {
            output.emit(&client.account_insights(id, days).await?)
        }
        AnalyticsCommands::Purge { id, yes } => {
            if !yes {
                return Err(context_error!(
                    "Refusing to delete analytics of account {} without --yes",
                    id
                ));
            }
            info!(account_id = id, "Deleting account analytics");
            output.emit(&client.delete_account_analytics(id).await?)
        }
        AnalyticsCommands::Export {
            id,
            format,
            from,
            to,
            output: path,
        } => {
            let query = AnalyticsQuery {
                start_date: from,
                end_date: to,
                ..AnalyticsQuery::default()
            };
            let document = client.export_analytics(id, format, &query).await?;
            match path {
                Some(path) => {
                    tokio::fs::write(&path, document.as_bytes())
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    output.message(&format!(
                        "Wrote {} export ({} bytes) to {}",
                        format,
                        document.len(),
                        path.display()
                    ))
                }
                None => output.raw(document),
            }
        }
    }
}

pub(crate) async fn dashboard(
    client: ApiClient,
    config: &Config,
    output: Output,
    action: DashboardCommands,
) -> Result<()> {
    let ctx = DashboardContext::new(client, config.dashboard.clone());

    match action {
        DashboardCommands::Stats => output.emit(&ctx.stats().await?),
        DashboardCommands::Activity => output.emit(&ctx.client().recent_activity().await?),
        DashboardCommands::Metrics { days } => {
            output.emit(&ctx.client().performance_metrics(days).await?)
        }
        DashboardCommands::Insights => output.emit(&ctx.client().content_insights().await?),
        DashboardCommands::Health => output.emit(&ctx.client().health().await?),
        DashboardCommands::Watch => watch(&ctx, output).await,
    }
}

/// Print the configuration in effect, after file, environment and flags
pub(crate) fn show_config(config: &Config, output: Output) -> Result<()> {
    let text = if output.is_json() {
        serde_json::to_string_pretty(config)?
    } else {
        toml::to_string_pretty(config)
            .map_err(|e| context_error!("Failed to serialize configuration: {}", e))?
    };
    output.raw(text)
}

/// Print the headline numbers on every refresh until Ctrl+C or the session ends
async fn watch(ctx: &DashboardContext, output: Output) -> Result<()> {
    let mut events = ctx.client().session().subscribe();
    output.emit(&ctx.stats().await?)?;

    ctx.start_polling();
    let every = ctx.config().stats_refresh();
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl+C: {e}");
                }
                info!("Stopping dashboard watch");
                break Ok(());
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Expired { .. } | SessionEvent::LoggedOut) => {
                    break Err(Error::Unauthorized.into());
                }
                Ok(SessionEvent::LoggedIn) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break Ok(()),
            },
            _ = ticker.tick() => {
                if let Some(stats) = ctx.cached_stats() {
                    println!();
                    if let Err(e) = output.emit(&stats) {
                        break Err(e);
                    }
                }
            }
        }
    };

    ctx.stop_polling();
    result
}
