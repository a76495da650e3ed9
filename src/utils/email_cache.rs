use std::time::Duration;

use moka::future::Cache;

use crate::store::{StoreResult, UserStore};

/// Registered emails known to be TAKEN.
///
/// A hit lets registration reject a duplicate without touching the store.
/// A miss proves nothing; the unique index stays the source of truth.
#[derive(Clone)]
pub struct EmailCache {
    taken: Cache<String, bool>,
}

impl Default for EmailCache {
    fn default() -> Self {
        Self::new(100_000, Duration::from_secs(86_400)) // 24h TTL
    }
}

impl EmailCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            taken: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Mark a single email as taken
    pub async fn mark_taken(&self, email: &str) {
        self.taken.insert(email.to_lowercase(), true).await;
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.taken
            .get(&email.to_lowercase())
            .await
            .unwrap_or(false)
    }

    /// Called when an account is deleted or changes its email.
    pub async fn forget(&self, email: &str) {
        self.taken.invalidate(&email.to_lowercase()).await;
    }

    async fn batch_mark(&self, emails: &[String]) {
        let futures: Vec<_> = emails
            .iter()
            .map(|e| self.taken.insert(e.to_lowercase(), true))
            .collect();

        futures::future::join_all(futures).await;
    }

    /// Loads every registered email, `batch_size` inserts at a time.
    pub async fn warmup(&self, users: &dyn UserStore, batch_size: usize) -> StoreResult<usize> {
        let emails = users.emails().await?;

        for batch in emails.chunks(batch_size.max(1)) {
            self.batch_mark(batch).await;
        }

        log::info!("Email cache warmup complete: {} registered users", emails.len());

        Ok(emails.len())
    }
}
