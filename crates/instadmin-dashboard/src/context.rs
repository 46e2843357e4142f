//! Dashboard-wide state: headline stats, the account list, the selected
//! account and the filters derived from it

use crate::filters::{DateRange, PostFilter, ScheduledFilter, StatusFilter};
use crate::query::{Poller, QueryCache, QueryKey};
use futures::FutureExt;
use futures::future::BoxFuture;
use instadmin_client::ApiClient;
use instadmin_core::config::DashboardConfig;
use instadmin_core::types::{AccountId, AccountQuery, DashboardStats, InstagramAccount, PostType};
use instadmin_core::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache key of `GET /dashboard/stats`
#[must_use]
pub fn stats_key() -> QueryKey {
    QueryKey::from("dashboard/stats")
}

/// Cache key of `GET /instagram/accounts`
#[must_use]
pub fn accounts_key() -> QueryKey {
    QueryKey::from("instagram/accounts")
}

/// Filters shared by every dashboard page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    /// Account the pages are scoped to
    pub account_id: Option<AccountId>,
    /// Date range the pages are scoped to
    pub date_range: Option<DateRange>,
    /// Post type the pages are scoped to
    pub post_type: StatusFilter<PostType>,
}

#[derive(Debug, Default)]
struct Selection {
    account: Option<InstagramAccount>,
    filter: DashboardFilter,
}

#[derive(Debug)]
struct ContextInner {
    client: ApiClient,
    cache: QueryCache,
    config: DashboardConfig,
    selection: RwLock<Selection>,
    pollers: Mutex<Vec<Poller>>,
}

/// Shared dashboard state
///
/// Cloning is cheap; clones share the cache, selection and pollers.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    inner: Arc<ContextInner>,
}

impl DashboardContext {
    /// Create a context with its own cache
    #[must_use]
    pub fn new(client: ApiClient, config: DashboardConfig) -> Self {
        Self::with_cache(client, QueryCache::new(), config)
    }

    /// Create a context over an existing cache
    #[must_use]
    pub fn with_cache(client: ApiClient, cache: QueryCache, config: DashboardConfig) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                client,
                cache,
                config,
                selection: RwLock::new(Selection::default()),
                pollers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Client used for fetches
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Refresh settings
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Cache holding the dashboard queries
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Headline numbers, served from cache while fresh
    ///
    /// # Errors
    ///
    /// Returns the API error when a fetch is needed and fails.
    pub async fn stats(&self) -> Result<DashboardStats> {
        self.fetch_stats(self.inner.config.stale_time()).await
    }

    /// Connected accounts, served from cache while fresh
    ///
    /// Loading the list also reconciles the selected account.
    ///
    /// # Errors
    ///
    /// Returns the API error when a fetch is needed and fails.
    pub async fn accounts(&self) -> Result<Vec<InstagramAccount>> {
        self.fetch_accounts(self.inner.config.stale_time()).await
    }

    async fn fetch_stats(&self, stale_time: Duration) -> Result<DashboardStats> {
        let client = self.inner.client.clone();
        self.inner
            .cache
            .fetch(&stats_key(), stale_time, move || async move {
                client.dashboard_stats().await
            })
            .await
    }

    async fn fetch_accounts(&self, stale_time: Duration) -> Result<Vec<InstagramAccount>> {
        let client = self.inner.client.clone();
        let accounts: Vec<InstagramAccount> = self
            .inner
            .cache
            .fetch(&accounts_key(), stale_time, move || async move {
                client.list_accounts(&AccountQuery::default()).await
            })
            .await?;
        self.reconcile_selection(&accounts);
        Ok(accounts)
    }

    /// Last loaded stats, even if stale
    #[must_use]
    pub fn cached_stats(&self) -> Option<DashboardStats> {
        self.inner.cache.get(&stats_key())
    }

    /// Last loaded accounts, even if stale
    #[must_use]
    pub fn cached_accounts(&self) -> Option<Vec<InstagramAccount>> {
        self.inner.cache.get(&accounts_key())
    }

    /// Currently selected account
    #[must_use]
    pub fn selected_account(&self) -> Option<InstagramAccount> {
        self.inner.selection.read().account.clone()
    }

    /// Current filters
    #[must_use]
    pub fn filter(&self) -> DashboardFilter {
        self.inner.selection.read().filter.clone()
    }

    /// Select an account, or none to show every account
    pub fn select_account(&self, account: Option<&InstagramAccount>) {
        let account_id = account.map(|account| account.id);
        {
            let mut selection = self.inner.selection.write();
            selection.account = account.cloned();
            selection.filter.account_id = account_id;
        }
        debug!(?account_id, "Selected account");
    }

    /// Scope the pages to a date range
    pub fn set_date_range(&self, range: Option<DateRange>) {
        self.inner.selection.write().filter.date_range = range;
    }

    /// Scope the pages to a post type
    pub fn set_post_type(&self, post_type: StatusFilter<PostType>) {
        self.inner.selection.write().filter.post_type = post_type;
    }

    /// Posts page filter seeded from the dashboard filter
    #[must_use]
    pub fn post_filter(&self) -> PostFilter {
        let filter = self.filter();
        PostFilter {
            account_id: filter.account_id,
            post_type: filter.post_type,
            date_range: filter.date_range,
            ..PostFilter::default()
        }
    }

    /// Scheduled page filter seeded from the dashboard filter
    #[must_use]
    pub fn scheduled_filter(&self) -> ScheduledFilter {
        ScheduledFilter {
            account_id: self.filter().account_id,
            ..ScheduledFilter::default()
        }
    }

    /// Keep the selection pointing at a listed account
    ///
    /// With nothing selected, or a selection that is no longer listed, the
    /// first account is picked. A still-listed selection is refreshed.
    fn reconcile_selection(&self, accounts: &[InstagramAccount]) {
        let mut selection = self.inner.selection.write();
        let current = selection
            .account
            .as_ref()
            .and_then(|selected| accounts.iter().find(|account| account.id == selected.id));

        let next = current.or_else(|| accounts.first()).cloned();
        if next.as_ref().map(|a| a.id) != selection.account.as_ref().map(|a| a.id) {
            debug!(account_id = ?next.as_ref().map(|a| a.id), "Auto-selected account");
        }
        selection.filter.account_id = next.as_ref().map(|account| account.id);
        selection.account = next;
    }

    /// Mark both queries stale so the next read refetches
    pub fn refresh(&self) {
        self.inner.cache.invalidate(&stats_key());
        self.inner.cache.invalidate(&accounts_key());
    }

    /// Refetch both queries now
    ///
    /// # Errors
    ///
    /// Returns the first fetch error.
    pub async fn reload(&self) -> Result<(DashboardStats, Vec<InstagramAccount>)> {
        self.refresh();
        tokio::try_join!(self.stats(), self.accounts())
    }

    /// Start refetching stats and accounts on their configured intervals
    ///
    /// Calling this while already polling does nothing.
    pub fn start_polling(&self) {
        let mut pollers = self.inner.pollers.lock();
        if !pollers.is_empty() {
            return;
        }

        pollers.push(self.spawn_poller("dashboard-stats", self.inner.config.stats_refresh(), |ctx| {
            async move { ctx.fetch_stats(Duration::ZERO).await.map(drop) }.boxed()
        }));
        pollers.push(self.spawn_poller(
            "dashboard-accounts",
            self.inner.config.accounts_refresh(),
            |ctx| async move { ctx.fetch_accounts(Duration::ZERO).await.map(drop) }.boxed(),
        ));
        info!(
            stats_every = ?self.inner.config.stats_refresh(),
            accounts_every = ?self.inner.config.accounts_refresh(),
            "Dashboard polling started"
        );
    }

    fn spawn_poller<F>(&self, name: &str, interval: Duration, refetch: F) -> Poller
    where
        F: Fn(Self) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
    {
        let weak: Weak<ContextInner> = Arc::downgrade(&self.inner);
        let refetch = Arc::new(refetch);
        let poller_name = name.to_string();

        Poller::spawn(name, interval, move || {
            let weak = weak.clone();
            let refetch = Arc::clone(&refetch);
            let poller_name = poller_name.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match refetch(Self { inner }).await {
                    Ok(()) => {}
                    Err(Error::Unauthorized) => debug!(poller = %poller_name, "Refetch skipped, session expired"),
                    Err(e) => warn!(poller = %poller_name, "Refetch failed: {e}"),
                }
            }
        })
    }

    /// Stop both pollers
    pub fn stop_polling(&self) {
        let pollers: Vec<Poller> = self.inner.pollers.lock().drain(..).collect();
        for poller in &pollers {
            poller.stop();
        }
        if !pollers.is_empty() {
            info!("Dashboard polling stopped");
        }
    }

    /// Whether pollers are running
    #[must_use]
    pub fn is_polling(&self) -> bool {
        !self.inner.pollers.lock().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use instadmin_client::Session;
    use instadmin_core::config::ApiConfig;
    use pretty_assertions::assert_eq;

    fn context() -> DashboardContext {
        let client = ApiClient::new(&ApiConfig::default(), Session::in_memory()).unwrap();
        DashboardContext::new(client, DashboardConfig::default())
    }

    fn account(id: AccountId, username: &str) -> InstagramAccount {
        InstagramAccount {
            id,
            username: username.to_string(),
            full_name: None,
            bio: None,
            instagram_user_id: id.to_string(),
            profile_picture_url: None,
            followers_count: 100,
            following_count: 10,
            posts_count: 5,
            is_active: true,
            is_business_account: true,
            last_sync: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            permissions: None,
        }
    }

    #[test]
    fn test_select_account_sets_and_clears_filter() {
        let ctx = context();
        let bakery = account(4, "bakery");

        ctx.select_account(Some(&bakery));
        assert_eq!(ctx.filter().account_id, Some(4));
        assert_eq!(ctx.selected_account().map(|a| a.username), Some("bakery".to_string()));

        ctx.select_account(None);
        assert_eq!(ctx.filter().account_id, None);
        assert!(ctx.selected_account().is_none());
    }

    #[test]
    fn test_reconcile_auto_selects_first() {
        let ctx = context();
        ctx.reconcile_selection(&[account(1, "first"), account(2, "second")]);
        assert_eq!(ctx.filter().account_id, Some(1));

        // An existing selection is kept and refreshed
        ctx.select_account(Some(&account(2, "second")));
        let mut renamed = account(2, "second.renamed");
        renamed.followers_count = 999;
        ctx.reconcile_selection(&[account(1, "first"), renamed]);
        let selected = ctx.selected_account().unwrap();
        assert_eq!((selected.id, selected.followers_count), (2, 999));
    }

    #[test]
    fn test_reconcile_falls_back_when_selection_disappears() {
        let ctx = context();
        ctx.select_account(Some(&account(9, "gone")));

        ctx.reconcile_selection(&[account(3, "third")]);
        assert_eq!(ctx.filter().account_id, Some(3));

        ctx.reconcile_selection(&[]);
        assert_eq!(ctx.filter().account_id, None);
        assert!(ctx.selected_account().is_none());
    }

    #[test]
    fn test_page_filters_follow_dashboard_filter() {
        let ctx = context();
        ctx.select_account(Some(&account(5, "five")));
        ctx.set_post_type(StatusFilter::Only(PostType::Reel));

        let posts = ctx.post_filter();
        assert_eq!(posts.account_id, Some(5));
        assert_eq!(posts.post_type, StatusFilter::Only(PostType::Reel));
        assert_eq!(ctx.scheduled_filter().account_id, Some(5));
    }

    #[test]
    fn test_refresh_marks_queries_stale() {
        let ctx = context();
        ctx.cache().set(&stats_key(), &DashboardStats::default()).unwrap();
        ctx.cache().set(&accounts_key(), &vec![account(1, "a")]).unwrap();

        ctx.refresh();

        let stale = DashboardConfig::default().stale_time();
        assert!(!ctx.cache().is_fresh(&stats_key(), stale));
        assert!(!ctx.cache().is_fresh(&accounts_key(), stale));
        assert!(ctx.cached_stats().is_some());
        assert_eq!(ctx.cached_accounts().map(|a| a.len()), Some(1));
    }
}
