use std::collections::BTreeSet;
use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::IdentityVerifier;
use crate::config::AppConfig;
use crate::database::memory::{
    InMemoryContactStore, InMemoryGuestbookStore, InMemoryPostStore, InMemoryStatsStore,
};
use crate::database::postgres::{
    PostgresContactStore, PostgresGuestbookStore, PostgresPostStore, PostgresStatsStore,
};
use crate::database::repository::{
    ContactRepository, GuestbookRepository, PostRepository, StatsRepository,
};
use crate::database::{ContactStore, GuestbookStore, PostStore, StatsStore};

/// One storage adapter per resource
#[derive(Clone)]
pub struct Stores {
    pub posts: Arc<dyn PostStore>,
    pub guestbook: Arc<dyn GuestbookStore>,
    pub contact: Arc<dyn ContactStore>,
    pub stats: Arc<dyn StatsStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            posts: Arc::new(PostgresPostStore::new(pool.clone())),
            guestbook: Arc::new(PostgresGuestbookStore::new(pool.clone())),
            contact: Arc::new(PostgresContactStore::new(pool.clone())),
            stats: Arc::new(PostgresStatsStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            posts: Arc::new(InMemoryPostStore::new()),
            guestbook: Arc::new(InMemoryGuestbookStore::new()),
            contact: Arc::new(InMemoryContactStore::new()),
            stats: Arc::new(InMemoryStatsStore::new()),
        }
    }
}

/// Shared handler state, built once at start-up
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub posts: PostRepository,
    pub guestbook: GuestbookRepository,
    pub contact: ContactRepository,
    pub stats: StatsRepository,
}

impl AppState {
    pub fn new(config: AppConfig, verifier: Arc<dyn IdentityVerifier>, stores: Stores) -> Self {
        let limits = &config.limits;
        let providers: BTreeSet<String> = limits.guestbook_providers.iter().cloned().collect();

        let posts = PostRepository::new(stores.posts);
        let guestbook =
            GuestbookRepository::new(stores.guestbook, providers, limits.guestbook_daily_limit);
        let contact = ContactRepository::new(
            stores.contact,
            limits.contact_daily_limit,
            limits.contact_retention_days,
        );
        let stats = StatsRepository::new(stores.stats, limits.stats_retention_days);

        Self {
            config: Arc::new(config),
            verifier,
            posts,
            guestbook,
            contact,
            stats,
        }
    }
}
