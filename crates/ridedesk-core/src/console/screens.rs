// ── Screen queries ──
//
// One observer constructor per console screen. Keys come from
// `crate::keys`; options match how each screen behaves (paged lists keep
// the previous page on screen while the next one loads, detail views
// wait for an id, notifications poll).

use futures::future::{BoxFuture, FutureExt};

use ridedesk_api::models::{
    CommissionHistory, DashboardStats, Driver, DriverRequest, EntityId, Notification, Page,
    PromoCode, Ride, Service, User, UserDetails, Vehicle,
};
use ridedesk_api::{ApiClient, Error};

use super::Console;
use crate::keys;
use crate::query::{QueryKey, QueryObserver, QueryOptions, QueryResult};

/// Data that knows where it sits in a paged listing.
pub trait Paginated {
    fn total_pages(&self) -> u32;
}

impl<T> Paginated for Page<T> {
    fn total_pages(&self) -> u32 {
        self.total_pages
    }
}

impl Paginated for CommissionHistory {
    fn total_pages(&self) -> u32 {
        self.rides.total_pages
    }
}

type PageFetch<D> = fn(ApiClient, u32) -> BoxFuture<'static, Result<D, Error>>;

// ── PagedQuery ───────────────────────────────────────────────────────

/// An observer over one paged listing that can move between pages.
pub struct PagedQuery<D> {
    api: ApiClient,
    key: fn(u32) -> QueryKey,
    fetch: PageFetch<D>,
    page: u32,
    observer: QueryObserver<D>,
}

impl<D: Paginated + Send + Sync + 'static> PagedQuery<D> {
    fn new(
        console: &Console,
        key: fn(u32) -> QueryKey,
        fetch: PageFetch<D>,
        page: u32,
        options: QueryOptions,
    ) -> Self {
        let page = page.max(1);
        let api = console.api().clone();
        let observer = console.queries().observe(
            key(page),
            {
                let api = api.clone();
                move || fetch(api.clone(), page)
            },
            options,
        );
        Self {
            api,
            key,
            fetch,
            page,
            observer,
        }
    }

    /// Current 1-based page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page == self.page {
            return;
        }
        self.page = page;
        let api = self.api.clone();
        let fetch = self.fetch;
        self.observer
            .set_key((self.key)(page), move || fetch(api.clone(), page));
    }

    /// Move forward if the last known page count allows it.
    pub fn next_page(&mut self) -> bool {
        let has_next = self
            .result()
            .data
            .is_some_and(|d| self.page < d.total_pages());
        if has_next {
            self.set_page(self.page + 1);
        }
        has_next
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.set_page(self.page - 1);
        true
    }

    pub fn result(&self) -> QueryResult<D> {
        self.observer.result()
    }

    pub fn observer(&self) -> &QueryObserver<D> {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut QueryObserver<D> {
        &mut self.observer
    }
}

impl<D> std::fmt::Debug for PagedQuery<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedQuery")
            .field("page", &self.page)
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}

// ── Console screens ──────────────────────────────────────────────────

fn paged_list() -> QueryOptions {
    QueryOptions::default().keep_previous_data()
}

impl Console {
    pub fn dashboard_stats(&self) -> QueryObserver<DashboardStats> {
        let api = self.api().clone();
        self.queries().observe(
            keys::dashboard_stats(),
            move || {
                let api = api.clone();
                async move { api.dashboard_stats().await }
            },
            QueryOptions::default(),
        )
    }

    pub fn drivers(&self, page: u32) -> PagedQuery<Page<Driver>> {
        PagedQuery::new(
            self,
            keys::drivers,
            |api, page| async move { api.list_drivers(page).await }.boxed(),
            page,
            paged_list(),
        )
    }

    /// Driver detail. Pass `None` until an id is selected.
    pub fn driver(&self, id: Option<&EntityId>) -> QueryObserver<Driver> {
        let id = id.cloned();
        let key = keys::driver(id.as_ref().unwrap_or(&EntityId::from("")));
        let api = self.api().clone();
        let enabled = id.is_some();
        self.queries().observe(
            key,
            move || {
                let api = api.clone();
                let id = id.clone().unwrap_or_else(|| EntityId::from(""));
                async move { api.get_driver(&id).await }
            },
            QueryOptions::default().enabled(enabled),
        )
    }

    pub fn driver_requests(&self, page: u32) -> PagedQuery<Page<DriverRequest>> {
        PagedQuery::new(
            self,
            keys::driver_requests,
            |api, page| async move { api.list_driver_requests(page).await }.boxed(),
            page,
            paged_list(),
        )
    }

    pub fn taxis(&self, page: u32) -> PagedQuery<Page<Vehicle>> {
        PagedQuery::new(
            self,
            keys::taxis,
            |api, page| async move { api.list_vehicles(page).await }.boxed(),
            page,
            QueryOptions::default(),
        )
    }

    pub fn services(&self, page: u32) -> PagedQuery<Page<Service>> {
        PagedQuery::new(
            self,
            keys::services,
            |api, page| async move { api.list_services(page).await }.boxed(),
            page,
            QueryOptions::default(),
        )
    }

    /// Service picker for the vehicle form. Only fetches while `open`.
    pub fn services_list(&self, open: bool) -> QueryObserver<Vec<Service>> {
        let api = self.api().clone();
        self.queries().observe(
            keys::services_list(),
            move || {
                let api = api.clone();
                async move { api.list_services(1).await.map(|page| page.items) }
            },
            QueryOptions::default().enabled(open),
        )
    }

    pub fn rides(&self, page: u32) -> PagedQuery<Page<Ride>> {
        PagedQuery::new(
            self,
            keys::rides,
            |api, page| async move { api.list_rides(page).await }.boxed(),
            page,
            paged_list(),
        )
    }

    pub fn promo_codes(&self, page: u32) -> PagedQuery<Page<PromoCode>> {
        PagedQuery::new(
            self,
            keys::promo_codes,
            |api, page| async move { api.list_promo_codes(page).await }.boxed(),
            page,
            paged_list(),
        )
    }

    pub fn commissions(&self, page: u32) -> PagedQuery<CommissionHistory> {
        PagedQuery::new(
            self,
            keys::commissions,
            |api, page| async move { api.commission_history(page).await }.boxed(),
            page,
            paged_list(),
        )
    }

    pub fn users(&self, page: u32) -> PagedQuery<Page<User>> {
        PagedQuery::new(
            self,
            keys::users,
            |api, page| async move { api.list_users(page).await }.boxed(),
            page,
            paged_list(),
        )
    }

    /// User detail. Pass `None` until an id is selected.
    pub fn user(&self, id: Option<&EntityId>) -> QueryObserver<UserDetails> {
        let id = id.cloned();
        let key = keys::user(id.as_ref().unwrap_or(&EntityId::from("")));
        let api = self.api().clone();
        let enabled = id.is_some();
        self.queries().observe(
            key,
            move || {
                let api = api.clone();
                let id = id.clone().unwrap_or_else(|| EntityId::from(""));
                async move { api.get_user(&id).await }
            },
            QueryOptions::default().enabled(enabled),
        )
    }

    /// The notification inbox, kept fresh by polling.
    pub fn notifications(&self) -> QueryObserver<Page<Notification>> {
        let api = self.api().clone();
        let config = self.config();
        self.queries().observe(
            keys::notifications(),
            move || {
                let api = api.clone();
                async move { api.list_notifications(1).await }
            },
            QueryOptions::default()
                .stale_time(config.notification_stale_time)
                .refetch_interval(config.notification_poll),
        )
    }
}
