//! Per-user permission-string cache with conditional refresh.
//!
//! Every lookup revalidates against the source using the stored entity tag;
//! the cache only saves re-transferring unchanged sets. Failures are never
//! papered over with the previously cached set.
//!
//! Refreshes are single-flight per user: a caller that arrives while another
//! refresh for the same user is running waits for it and shares its outcome
//! instead of issuing a second request.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::source::{FetchResult, PermissionSourceError, PermissionStringSource};
use super::string::PermissionString;
use crate::metrics;

/// Cached permission strings of one user. Replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionStringCacheEntry {
    pub user_id: Uuid,
    pub strings: Arc<HashSet<PermissionString>>,
    pub etag: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

type RefreshOutcome = Result<Arc<PermissionStringCacheEntry>, PermissionSourceError>;

#[derive(Default)]
struct SlotState {
    entry: Option<Arc<PermissionStringCacheEntry>>,
    last_outcome: Option<RefreshOutcome>,
}

#[derive(Default)]
struct UserSlot {
    /// Bumped every time a refresh finishes, under `state`'s lock.
    completed: AtomicU64,
    state: Mutex<SlotState>,
}

pub struct PermissionStringCache {
    source: Arc<dyn PermissionStringSource>,
    slots: RwLock<HashMap<Uuid, Arc<UserSlot>>>,
}

impl PermissionStringCache {
    pub fn new(source: Arc<dyn PermissionStringSource>) -> Self {
        Self {
            source,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Current permission strings of `user_id`.
    pub async fn get(
        &self,
        user_id: Uuid,
    ) -> Result<Arc<HashSet<PermissionString>>, PermissionSourceError> {
        Ok(Arc::clone(&self.get_entry(user_id).await?.strings))
    }

    /// Current cache entry of `user_id`, refreshing it first.
    pub async fn get_entry(&self, user_id: Uuid) -> RefreshOutcome {
        let slot = self.slot(user_id).await;

        let observed = slot.completed.load(Ordering::Acquire);
        let mut state = slot.state.lock().await;

        // A refresh completed while we were queued on the lock: it was in flight
        // when we arrived, so its outcome is ours too.
        if slot.completed.load(Ordering::Acquire) != observed {
            if let Some(outcome) = &state.last_outcome {
                tracing::trace!(%user_id, "Sharing in-flight permission refresh");
                return outcome.clone();
            }
        }

        let outcome = self.refresh(user_id, state.entry.clone()).await;
        if let Ok(entry) = &outcome {
            state.entry = Some(Arc::clone(entry));
        }
        state.last_outcome = Some(outcome.clone());
        slot.completed.fetch_add(1, Ordering::AcqRel);

        outcome
    }

    /// Forget the cached set of `user_id`; the next lookup fetches unconditionally.
    pub async fn invalidate(&self, user_id: Uuid) {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(&user_id).cloned()
        };
        if let Some(slot) = slot {
            let mut state = slot.state.lock().await;
            state.entry = None;
            state.last_outcome = None;
            tracing::debug!(%user_id, "Invalidated cached permission strings");
        }
    }

    /// Number of users the cache has seen.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    async fn slot(&self, user_id: Uuid) -> Arc<UserSlot> {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(&user_id) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(user_id).or_default())
    }

    async fn refresh(
        &self,
        user_id: Uuid,
        current: Option<Arc<PermissionStringCacheEntry>>,
    ) -> RefreshOutcome {
        let etag = current.as_ref().and_then(|e| e.etag.as_deref());

        match self.source.fetch(user_id, etag).await {
            Ok(FetchResult::NotModified) => {
                metrics::PERMISSION_FETCHES_TOTAL
                    .with_label_values(&["not_modified"])
                    .inc();
                match current {
                    Some(entry) => {
                        tracing::debug!(%user_id, "Permission strings not modified");
                        Ok(entry)
                    }
                    // Nothing to revalidate against.
                    None => Err(PermissionSourceError::UnexpectedStatus(304)),
                }
            }
            Ok(FetchResult::Fresh { strings, etag }) => {
                metrics::PERMISSION_FETCHES_TOTAL
                    .with_label_values(&["fresh"])
                    .inc();
                tracing::debug!(
                    %user_id,
                    count = strings.len(),
                    etag = etag.as_deref().unwrap_or(""),
                    "Replacing cached permission strings"
                );
                Ok(Arc::new(PermissionStringCacheEntry {
                    user_id,
                    strings: Arc::new(strings),
                    etag,
                    fetched_at: Utc::now(),
                }))
            }
            Err(e) => {
                metrics::PERMISSION_FETCHES_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                tracing::warn!(%user_id, error = %e, "Permission string fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Source scripted with a queue of responses; records every request's etag.
    struct ScriptedSource {
        responses: std::sync::Mutex<Vec<Result<FetchResult, PermissionSourceError>>>,
        seen_etags: std::sync::Mutex<Vec<Option<String>>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(mut responses: Vec<Result<FetchResult, PermissionSourceError>>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: std::sync::Mutex::new(responses),
                seen_etags: std::sync::Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(0),
            })
        }

        fn with_delay(mut self: Arc<Self>, delay: Duration) -> Arc<Self> {
            Arc::get_mut(&mut self).unwrap().delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PermissionStringSource for ScriptedSource {
        async fn fetch(
            &self,
            _user_id: Uuid,
            etag: Option<&str>,
        ) -> Result<FetchResult, PermissionSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_etags
                .lock()
                .unwrap()
                .push(etag.map(|s| s.to_string()));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(PermissionSourceError::UnexpectedStatus(500)))
        }
    }

    fn fresh(strings: &[PermissionString], etag: &str) -> Result<FetchResult, PermissionSourceError> {
        Ok(FetchResult::Fresh {
            strings: strings.iter().cloned().collect(),
            etag: Some(etag.to_string()),
        })
    }

    #[tokio::test]
    async fn first_lookup_is_unconditional_and_later_ones_send_etag() {
        let grant = PermissionString::right("CCE_INVENTORY_VIEW");
        let source = ScriptedSource::new(vec![
            fresh(&[grant.clone()], "\"v1\""),
            Ok(FetchResult::NotModified),
        ]);
        let cache = PermissionStringCache::new(source.clone());
        let user = Uuid::new_v4();

        let first = cache.get(user).await.unwrap();
        let second = cache.get(user).await.unwrap();

        assert_eq!(first, second);
        assert!(first.contains(&grant));
        assert_eq!(
            *source.seen_etags.lock().unwrap(),
            vec![None, Some("\"v1\"".to_string())]
        );
    }

    #[tokio::test]
    async fn not_modified_keeps_entry_untouched() {
        let source = ScriptedSource::new(vec![
            fresh(&[PermissionString::right("A")], "\"v1\""),
            Ok(FetchResult::NotModified),
            Ok(FetchResult::NotModified),
        ]);
        let cache = PermissionStringCache::new(source.clone());
        let user = Uuid::new_v4();

        let before = cache.get_entry(user).await.unwrap();
        let after = cache.get_entry(user).await.unwrap();
        let again = cache.get_entry(user).await.unwrap();

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.fetched_at, before.fetched_at);
        assert_eq!(again.strings, before.strings);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn fresh_response_replaces_entry_wholesale() {
        let source = ScriptedSource::new(vec![
            fresh(&[PermissionString::right("A")], "\"v1\""),
            fresh(&[PermissionString::right("B")], "\"v2\""),
        ]);
        let cache = PermissionStringCache::new(source);
        let user = Uuid::new_v4();

        cache.get(user).await.unwrap();
        let entry = cache.get_entry(user).await.unwrap();

        assert_eq!(entry.etag.as_deref(), Some("\"v2\""));
        assert_eq!(entry.strings.len(), 1);
        assert!(entry.strings.contains(&PermissionString::right("B")));
    }

    #[tokio::test]
    async fn failures_propagate_instead_of_serving_stale_set() {
        let source = ScriptedSource::new(vec![
            fresh(&[PermissionString::right("A")], "\"v1\""),
            Err(PermissionSourceError::Transport("connection reset".into())),
        ]);
        let cache = PermissionStringCache::new(source);
        let user = Uuid::new_v4();

        cache.get(user).await.unwrap();
        let err = cache.get(user).await.unwrap_err();
        assert!(matches!(err, PermissionSourceError::Transport(_)));
    }

    #[tokio::test]
    async fn concurrent_cold_lookups_share_one_fetch() {
        let source = ScriptedSource::new(vec![fresh(
            &[PermissionString::right("CCE_INVENTORY_VIEW")],
            "\"v1\"",
        )])
        .with_delay(Duration::from_millis(50));
        let cache = PermissionStringCache::new(source.clone());
        let user = Uuid::new_v4();

        let (a, b) = tokio::join!(cache.get(user), cache.get(user));

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[tokio::test]
    async fn concurrent_lookups_share_a_failure() {
        let source = ScriptedSource::new(vec![Err(PermissionSourceError::UnexpectedStatus(503))])
            .with_delay(Duration::from_millis(50));
        let cache = PermissionStringCache::new(source.clone());
        let user = Uuid::new_v4();

        let (a, b) = tokio::join!(cache.get(user), cache.get(user));

        assert_eq!(source.calls(), 1);
        assert_eq!(a.unwrap_err(), PermissionSourceError::UnexpectedStatus(503));
        assert_eq!(b.unwrap_err(), PermissionSourceError::UnexpectedStatus(503));
    }

    #[tokio::test]
    async fn different_users_fetch_independently() {
        let source = ScriptedSource::new(vec![
            fresh(&[PermissionString::right("A")], "\"a\""),
            fresh(&[PermissionString::right("B")], "\"b\""),
        ])
        .with_delay(Duration::from_millis(20));
        let cache = PermissionStringCache::new(source.clone());

        let (a, b) = tokio::join!(cache.get(Uuid::new_v4()), cache.get(Uuid::new_v4()));

        assert_eq!(source.calls(), 2);
        assert_ne!(a.unwrap(), b.unwrap());
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn invalidate_forces_unconditional_fetch() {
        let source = ScriptedSource::new(vec![
            fresh(&[PermissionString::right("A")], "\"v1\""),
            fresh(&[PermissionString::right("A")], "\"v2\""),
        ]);
        let cache = PermissionStringCache::new(source.clone());
        let user = Uuid::new_v4();

        cache.get(user).await.unwrap();
        cache.invalidate(user).await;
        cache.get(user).await.unwrap();

        assert_eq!(*source.seen_etags.lock().unwrap(), vec![None, None]);
    }
}
