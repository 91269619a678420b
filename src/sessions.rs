// src/sessions.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::auth::{generate_opaque_token, hash_token};
use crate::view::AppointmentsView;

struct StoredView {
    view: AppointmentsView,
    expires_at: DateTime<Utc>,
}

/// In-process store of per-page view sessions, keyed by the hash of the
/// opaque id handed to the page. Expired entries are dropped lazily.
#[derive(Clone, Default)]
pub struct ViewSessionStore {
    inner: Arc<Mutex<HashMap<String, StoredView>>>,
}

impl ViewSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a freshly activated view and returns the opaque id for the page.
    pub async fn insert(&self, view: AppointmentsView, ttl_minutes: i64) -> String {
        let view_id = generate_opaque_token();
        let now = Utc::now();

        let mut inner = self.inner.lock().await;
        inner.retain(|_, stored| stored.expires_at > now);
        inner.insert(
            hash_token(&view_id),
            StoredView {
                view,
                expires_at: now + Duration::minutes(ttl_minutes),
            },
        );
        view_id
    }

    /// Runs `f` against the live view behind `view_id`. None when the id is
    /// unknown or the session has expired.
    pub async fn with_view<R>(
        &self,
        view_id: &str,
        f: impl FnOnce(&mut AppointmentsView) -> R,
    ) -> Option<R> {
        let key = hash_token(view_id);
        let mut inner = self.inner.lock().await;
        match inner.get_mut(&key) {
            Some(stored) if stored.expires_at > Utc::now() => Some(f(&mut stored.view)),
            Some(_) => {
                inner.remove(&key);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_access() {
        let store = ViewSessionStore::new();
        let view_id = store.insert(AppointmentsView::default(), 30).await;

        let seen = store
            .with_view(&view_id, |view| view.partitions().upcoming.len())
            .await;
        assert_eq!(seen, Some(0));
    }

    #[tokio::test]
    async fn test_unknown_id_is_rejected() {
        let store = ViewSessionStore::new();
        assert!(store.with_view("not-a-view-id", |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_view_is_dropped() {
        let store = ViewSessionStore::new();
        let view_id = store.insert(AppointmentsView::default(), -1).await;

        assert!(store.with_view(&view_id, |_| ()).await.is_none());
        // A second access still misses; the entry is gone, not just hidden.
        assert!(store.with_view(&view_id, |_| ()).await.is_none());
    }
}
