//! Fetch-or-use-cached synchronization core
//!
//! `DataSyncStore` is the single source of truth for server-derived data
//! consumed by independent console views. Views declare what they need as
//! a (kind, key) pair and never issue network calls themselves.
//!
//! The one concurrency contract that matters: at most one outstanding
//! fetch per slot. A call that finds a fetch already in flight for its
//! exact key attaches to that flight instead of issuing a duplicate
//! request, and resolves with the same outcome. Fetches for distinct
//! slots run fully concurrently with no mutual ordering.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::StoreError;
use crate::models::{
    AppPatch, AppSummary, CalibrationResult, ClusterPlacement, InterferenceResult,
    ProfilingResult, ResourceValue,
};

use super::key::{PlacementVariant, ResourceKind, SlotKey};
use super::slot::{FlightState, SlotState, SlotView};

/// Snapshot of the store's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Calls answered from the cache with no network I/O.
    pub cache_hits: u64,
    /// Network requests issued.
    pub fetches: u64,
    /// Calls that attached to a fetch already in flight.
    pub joined_flights: u64,
    /// Fetches that failed and reverted their slot to absent.
    pub failures: u64,
}

#[derive(Default)]
struct StatsInner {
    cache_hits: AtomicU64,
    fetches: AtomicU64,
    joined_flights: AtomicU64,
    failures: AtomicU64,
}

/// How a call enters the slot state machine.
enum Claim {
    /// Slot is present; no network I/O.
    Hit(Arc<ResourceValue>),
    /// A fetch is already in flight for this exact slot.
    Join(watch::Receiver<FlightState>),
    /// This call owns the fetch and must publish the outcome.
    Own(watch::Sender<FlightState>),
}

/// Payload a fetch produced, before it is written into the slot.
enum Fetched {
    Value(ResourceValue),
    /// App payloads are partial; the write phase merges them over
    /// whatever the slot already holds.
    AppPatch(AppPatch),
}

/// In-memory cache of server resources with single-flight fetching.
///
/// Pass the store by reference to every view that needs it; it is not a
/// global. All methods take `&self` and the store is `Send + Sync`.
pub struct DataSyncStore {
    api: ApiClient,
    slots: DashMap<SlotKey, SlotState>,
    version: watch::Sender<u64>,
    stats: StatsInner,
}

impl DataSyncStore {
    /// Create a store backed by the given API client.
    pub fn new(api: ApiClient) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            api,
            slots: DashMap::new(),
            version,
            stats: StatsInner::default(),
        }
    }

    /// Cached value for a slot, or the not-yet-loaded sentinel.
    ///
    /// A slot whose first fetch is still in flight reads as not loaded;
    /// a detail refetch over a partial app record keeps the previous
    /// value visible.
    pub fn get(&self, slot: &SlotKey) -> SlotView {
        match self.slots.get(slot) {
            Some(state) => match &*state {
                SlotState::Present { value, fetched_at } => SlotView::Loaded {
                    value: value.clone(),
                    fetched_at: *fetched_at,
                },
                SlotState::Fetching {
                    prev: Some((value, fetched_at)),
                    ..
                } => SlotView::Loaded {
                    value: value.clone(),
                    fetched_at: *fetched_at,
                },
                SlotState::Fetching { prev: None, .. } => SlotView::NotLoaded,
            },
            None => SlotView::NotLoaded,
        }
    }

    /// Resolve a slot, fetching it if it is not cached.
    ///
    /// Present slot: resolves immediately with no network I/O. Absent
    /// slot: issues exactly one request and stores the decoded record.
    /// Slot with a fetch in flight: attaches to that flight. On failure
    /// the slot reverts to absent and a later call retries.
    pub async fn ensure(&self, slot: SlotKey) -> Result<Arc<ResourceValue>, StoreError> {
        self.ensure_inner(slot, false).await
    }

    /// App record with detail fields, merged over anything a list fetch
    /// already populated.
    ///
    /// Fetches when the slot is absent or the cached record is still
    /// partial; the detail payload is merged field-wise so list-known
    /// fields survive.
    pub async fn app(&self, app_id: &str) -> Result<AppSummary, StoreError> {
        let value = self.ensure_inner(SlotKey::app(app_id), true).await?;
        value
            .as_app()
            .cloned()
            .ok_or(StoreError::KindMismatch { expected: "app" })
    }

    /// Calibration curve for one app.
    pub async fn calibration(&self, app_id: &str) -> Result<CalibrationResult, StoreError> {
        let value = self.ensure(SlotKey::calibration(app_id)).await?;
        value.as_calibration().cloned().ok_or(StoreError::KindMismatch {
            expected: "calibration",
        })
    }

    /// Profiling curves for one service of an app.
    pub async fn profiling(
        &self,
        app_id: &str,
        service: &str,
    ) -> Result<ProfilingResult, StoreError> {
        let value = self.ensure(SlotKey::profiling(app_id, service)).await?;
        value.as_profiling().cloned().ok_or(StoreError::KindMismatch {
            expected: "profiling",
        })
    }

    /// Interference scores for one service of an app.
    pub async fn interference(
        &self,
        app_id: &str,
        service: &str,
    ) -> Result<InterferenceResult, StoreError> {
        let value = self.ensure(SlotKey::interference(app_id, service)).await?;
        value.as_interference().cloned().ok_or(StoreError::KindMismatch {
            expected: "interference",
        })
    }

    /// Cluster placement snapshot, current or recommended.
    pub async fn placement(
        &self,
        variant: PlacementVariant,
    ) -> Result<ClusterPlacement, StoreError> {
        let value = self.ensure(SlotKey::placement(variant)).await?;
        value.as_placement().cloned().ok_or(StoreError::KindMismatch {
            expected: "placement",
        })
    }

    /// Fetch the full app collection and merge each record into its slot.
    ///
    /// Field-wise shallow merge: fields the payload carries win, fields
    /// known from an earlier detail fetch survive. Returns the merged
    /// inventory ordered by app id.
    pub async fn list_apps(&self) -> Result<Vec<(String, AppSummary)>, StoreError> {
        self.stats.fetches.fetch_add(1, Ordering::Relaxed);
        debug!("fetching app collection");

        let listing = match self.api.apps().await {
            Ok(listing) => listing,
            Err(err) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "app list fetch failed");
                return Err(err);
            }
        };

        let mut inventory = Vec::with_capacity(listing.len());
        for (app_id, patch) in listing {
            let merged = self.merge_app_slot(SlotKey::app(&app_id), &patch);
            inventory.push((app_id, merged));
        }
        self.bump_version();

        Ok(inventory)
    }

    /// Drop a present slot so the next `ensure` refetches it.
    ///
    /// Returns whether anything was dropped. A slot with a fetch in
    /// flight is left untouched: the flight runs to completion and writes
    /// its result.
    pub fn invalidate(&self, slot: &SlotKey) -> bool {
        if let Entry::Occupied(entry) = self.slots.entry(slot.clone()) {
            if matches!(entry.get(), SlotState::Present { .. }) {
                entry.remove();
                self.bump_version();
                return true;
            }
        }
        false
    }

    /// Receiver over the cache version counter.
    ///
    /// The counter is bumped on every successful write, so a view can
    /// re-read whatever slots it depends on whenever the value changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Snapshot of the store's counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            fetches: self.stats.fetches.load(Ordering::Relaxed),
            joined_flights: self.stats.joined_flights.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
        }
    }

    async fn ensure_inner(
        &self,
        slot: SlotKey,
        refetch_partial_app: bool,
    ) -> Result<Arc<ResourceValue>, StoreError> {
        match self.claim(&slot, refetch_partial_app) {
            Claim::Hit(value) => {
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                debug!(slot = %slot, "cache hit");
                Ok(value)
            }
            Claim::Join(rx) => {
                self.stats.joined_flights.fetch_add(1, Ordering::Relaxed);
                debug!(slot = %slot, "attaching to in-flight fetch");
                self.await_flight(&slot, rx).await
            }
            Claim::Own(tx) => {
                self.stats.fetches.fetch_add(1, Ordering::Relaxed);
                debug!(slot = %slot, "issuing fetch");
                self.drive_flight(&slot, tx).await
            }
        }
    }

    /// Decide in a single slot-map operation whether this call hits the
    /// cache, joins an existing flight, or owns a new one. No guard is
    /// held once this returns.
    fn claim(&self, slot: &SlotKey, refetch_partial_app: bool) -> Claim {
        enum Occupied {
            Hit(Arc<ResourceValue>),
            Join(watch::Receiver<FlightState>),
            Refetch(Arc<ResourceValue>, chrono::DateTime<Utc>),
        }

        match self.slots.entry(slot.clone()) {
            Entry::Occupied(mut entry) => {
                let action = match entry.get() {
                    SlotState::Present { value, fetched_at } => {
                        let partial = refetch_partial_app
                            && value.as_app().is_some_and(|app| !app.has_detail());
                        if partial {
                            Occupied::Refetch(value.clone(), *fetched_at)
                        } else {
                            Occupied::Hit(value.clone())
                        }
                    }
                    SlotState::Fetching { done, .. } => Occupied::Join(done.clone()),
                };

                match action {
                    Occupied::Hit(value) => Claim::Hit(value),
                    Occupied::Join(rx) => Claim::Join(rx),
                    Occupied::Refetch(value, fetched_at) => {
                        let (tx, rx) = watch::channel(FlightState::Pending);
                        entry.insert(SlotState::Fetching {
                            done: rx,
                            prev: Some((value, fetched_at)),
                        });
                        Claim::Own(tx)
                    }
                }
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(FlightState::Pending);
                entry.insert(SlotState::Fetching {
                    done: rx,
                    prev: None,
                });
                Claim::Own(tx)
            }
        }
    }

    /// Wait for the flight this call attached to and share its outcome.
    async fn await_flight(
        &self,
        slot: &SlotKey,
        mut rx: watch::Receiver<FlightState>,
    ) -> Result<Arc<ResourceValue>, StoreError> {
        let outcome = rx
            .wait_for(|state| matches!(state, FlightState::Done(_)))
            .await;

        match outcome {
            Ok(state) => match &*state {
                FlightState::Done(Ok(value)) => Ok(value.clone()),
                FlightState::Done(Err(reason)) => Err(StoreError::FlightFailed {
                    slot: slot.to_string(),
                    reason: reason.clone(),
                }),
                // wait_for only yields once Done is observed
                FlightState::Pending => Err(StoreError::FlightFailed {
                    slot: slot.to_string(),
                    reason: "fetch completed without an outcome".to_string(),
                }),
            },
            Err(_) => Err(StoreError::FlightFailed {
                slot: slot.to_string(),
                reason: "fetch abandoned before completing".to_string(),
            }),
        }
    }

    /// Run the fetch this call owns, write the slot, publish the outcome.
    async fn drive_flight(
        &self,
        slot: &SlotKey,
        tx: watch::Sender<FlightState>,
    ) -> Result<Arc<ResourceValue>, StoreError> {
        match self.fetch_value(slot).await {
            Ok(fetched) => {
                let value = match fetched {
                    Fetched::Value(value) => Arc::new(value),
                    Fetched::AppPatch(patch) => {
                        // Merge over what the slot holds right now; a
                        // concurrent list fetch may have updated it since
                        // the flight started.
                        let base = self.current_app_snapshot(slot);
                        Arc::new(ResourceValue::App(base.merged(&patch)))
                    }
                };
                self.slots.insert(
                    slot.clone(),
                    SlotState::Present {
                        value: value.clone(),
                        fetched_at: Utc::now(),
                    },
                );
                self.bump_version();
                let _ = tx.send(FlightState::Done(Ok(value.clone())));
                Ok(value)
            }
            Err(err) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(slot = %slot, error = %err, "fetch failed; slot reverts to absent");
                self.revert_slot(slot);
                let _ = tx.send(FlightState::Done(Err(err.to_string())));
                Err(err)
            }
        }
    }

    async fn fetch_value(&self, slot: &SlotKey) -> Result<Fetched, StoreError> {
        match slot.kind {
            ResourceKind::App => self.api.app(&slot.key).await.map(Fetched::AppPatch),
            ResourceKind::Calibration => self
                .api
                .calibration(&slot.key)
                .await
                .map(|r| Fetched::Value(ResourceValue::Calibration(r))),
            ResourceKind::Profiling => {
                let (app_id, service) = slot.split_composite().ok_or_else(|| {
                    StoreError::InvalidKey {
                        slot: slot.to_string(),
                    }
                })?;
                self.api
                    .profiling(app_id, service)
                    .await
                    .map(|r| Fetched::Value(ResourceValue::Profiling(r)))
            }
            ResourceKind::Interference => {
                let (app_id, service) = slot.split_composite().ok_or_else(|| {
                    StoreError::InvalidKey {
                        slot: slot.to_string(),
                    }
                })?;
                self.api
                    .interference(app_id, service)
                    .await
                    .map(|r| Fetched::Value(ResourceValue::Interference(r)))
            }
            ResourceKind::Placement => {
                let variant =
                    PlacementVariant::from_key(&slot.key).ok_or_else(|| StoreError::InvalidKey {
                        slot: slot.to_string(),
                    })?;
                self.api
                    .placement(variant)
                    .await
                    .map(|r| Fetched::Value(ResourceValue::Placement(r)))
            }
        }
    }

    /// App record the slot holds at this instant, for write-time merging.
    fn current_app_snapshot(&self, slot: &SlotKey) -> AppSummary {
        match self.slots.get(slot) {
            Some(state) => {
                let value = match &*state {
                    SlotState::Present { value, .. } => Some(value.clone()),
                    SlotState::Fetching {
                        prev: Some((value, _)),
                        ..
                    } => Some(value.clone()),
                    SlotState::Fetching { prev: None, .. } => None,
                };
                value
                    .as_deref()
                    .and_then(ResourceValue::as_app)
                    .cloned()
                    .unwrap_or_default()
            }
            None => AppSummary::default(),
        }
    }

    /// After a failed flight, restore what was cached before it started,
    /// or drop the entry so the slot reads as absent again.
    fn revert_slot(&self, slot: &SlotKey) {
        if let Entry::Occupied(mut entry) = self.slots.entry(slot.clone()) {
            let restored = match entry.get_mut() {
                SlotState::Fetching {
                    prev: Some((value, fetched_at)),
                    ..
                } => Some((value.clone(), *fetched_at)),
                _ => None,
            };
            match restored {
                Some((value, fetched_at)) => {
                    entry.insert(SlotState::Present { value, fetched_at });
                }
                None => {
                    entry.remove();
                }
            }
        }
    }

    /// Merge a list payload into one app slot and return the result.
    fn merge_app_slot(&self, slot: SlotKey, patch: &AppPatch) -> AppSummary {
        match self.slots.entry(slot) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                SlotState::Present { value, fetched_at } => {
                    let base = value.as_app().cloned().unwrap_or_default();
                    let merged = base.merged(patch);
                    *value = Arc::new(ResourceValue::App(merged.clone()));
                    *fetched_at = Utc::now();
                    merged
                }
                SlotState::Fetching { prev, .. } => {
                    // Keep the listing visible while the detail flight is
                    // outstanding; the flight merges over this at write
                    // time.
                    let base = prev
                        .as_ref()
                        .and_then(|(value, _)| value.as_app().cloned())
                        .unwrap_or_default();
                    let merged = base.merged(patch);
                    *prev = Some((Arc::new(ResourceValue::App(merged.clone())), Utc::now()));
                    merged
                }
            },
            Entry::Vacant(entry) => {
                let merged = AppSummary::default().merged(patch);
                entry.insert(SlotState::Present {
                    value: Arc::new(ResourceValue::App(merged.clone())),
                    fetched_at: Utc::now(),
                });
                merged
            }
        }
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
