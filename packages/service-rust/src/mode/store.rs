//! Process-wide mock/live flag.
//!
//! [`ModeStore`] keeps the current mode in a single `ArcSwap<ModeState>`, so
//! every read sees one fully published state and a concurrent `set_mode`
//! can never be observed half-applied.
//!
//! Resolution order on each read:
//! 1. an administrative override set via [`ModeStore::set_mode`] wins;
//! 2. otherwise the configured [`ModeProbe`] is consulted (bounded by a timeout);
//! 3. if the probe fails, the last known mode is returned unchanged.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use backoffice_core::Mode;
use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::probe::{ModeProbe, ProbeError};
use crate::storage::KeyValueStore;

/// Where the current mode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    /// Construction-time default; no probe answer or override yet.
    Initial,
    /// The external probe.
    Probe,
    /// An administrator pinned it.
    Override,
}

/// Snapshot published atomically on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeState {
    pub mode: Mode,
    pub source: ModeSource,
}

struct PersistedOverride {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

/// Single source of truth for the data mode.
pub struct ModeStore {
    state: ArcSwap<ModeState>,
    probe: Option<Arc<dyn ModeProbe>>,
    probe_timeout: Duration,
    changes: watch::Sender<Mode>,
    persisted: Option<PersistedOverride>,
    /// Serializes override changes so the persisted value matches the published one.
    transitions: Mutex<()>,
}

impl ModeStore {
    /// Creates a store that reports `initial` until an override or probe says otherwise.
    #[must_use]
    pub fn new(initial: Mode) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            state: ArcSwap::from_pointee(ModeState {
                mode: initial,
                source: ModeSource::Initial,
            }),
            probe: None,
            probe_timeout: Duration::from_secs(2),
            changes: tx,
            persisted: None,
            transitions: Mutex::new(()),
        }
    }

    /// Creates a store pinned to `mode` by an override. Used where the mode
    /// must not drift, e.g. tests.
    #[must_use]
    pub fn fixed(mode: Mode) -> Self {
        let store = Self::new(mode);
        store.state.store(Arc::new(ModeState {
            mode,
            source: ModeSource::Override,
        }));
        store
    }

    /// Attaches an external probe consulted whenever no override is pinned.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ModeProbe>, timeout: Duration) -> Self {
        self.probe = Some(probe);
        self.probe_timeout = timeout;
        self
    }

    /// Persists overrides under `key` and restores a previously persisted one.
    ///
    /// An unreadable or unrecognized persisted value is logged and ignored.
    #[must_use]
    pub fn with_persistence(
        mut self,
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        match store.get(&key) {
            Ok(Some(raw)) => match raw.parse::<Mode>() {
                Ok(mode) => {
                    info!(mode = %mode, key = %key, "restored persisted mode override");
                    self.state.store(Arc::new(ModeState {
                        mode,
                        source: ModeSource::Override,
                    }));
                    self.changes.send_replace(mode);
                }
                Err(e) => warn!(key = %key, error = %e, "ignoring unrecognized persisted mode"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "could not read persisted mode override"),
        }
        self.persisted = Some(PersistedOverride { store, key });
        self
    }

    /// Resolves the mode for one logical operation.
    ///
    /// Never fails: probe errors and timeouts fall back to the last known mode.
    pub async fn resolve(&self) -> Mode {
        let current = **self.state.load();
        if current.source == ModeSource::Override {
            return current.mode;
        }
        let Some(probe) = &self.probe else {
            return current.mode;
        };

        match tokio::time::timeout(self.probe_timeout, probe.probe()).await {
            Ok(Ok(mode)) => self.observe_probe(mode),
            Ok(Err(e)) => self.probe_failed(&e, current.mode),
            Err(_elapsed) => {
                let timeout_ms = u64::try_from(self.probe_timeout.as_millis()).unwrap_or(u64::MAX);
                self.probe_failed(&ProbeError::Timeout { timeout_ms }, current.mode)
            }
        }
    }

    /// `true` when the resolved mode is [`Mode::Mock`].
    pub async fn is_mock_mode(&self) -> bool {
        self.resolve().await.is_mock()
    }

    /// Last published mode, without consulting the probe.
    #[must_use]
    pub fn current(&self) -> Mode {
        self.state.load().mode
    }

    /// Last published state, including its source.
    #[must_use]
    pub fn state(&self) -> ModeState {
        **self.state.load()
    }

    /// Pins the mode. Visible to every read that starts after this returns.
    pub fn set_mode(&self, mode: Mode) {
        let _transition = self.transitions.lock();
        let previous = self.state.swap(Arc::new(ModeState {
            mode,
            source: ModeSource::Override,
        }));
        self.persist(Some(mode));
        if previous.mode == mode {
            debug!(mode = %mode, "mode override pinned without change");
        } else {
            self.announce(previous.mode, mode, "override");
        }
    }

    /// Drops the override so the probe decides again. The mode itself is
    /// unchanged until the next successful probe.
    pub fn clear_override(&self) {
        let source = if self.probe.is_some() {
            ModeSource::Probe
        } else {
            ModeSource::Initial
        };
        let _transition = self.transitions.lock();
        self.state.rcu(|cur| {
            Arc::new(ModeState {
                mode: cur.mode,
                source,
            })
        });
        self.persist(None);
        debug!("mode override cleared");
    }

    /// Receiver notified on every effective mode change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Mode> {
        self.changes.subscribe()
    }

    fn observe_probe(&self, mode: Mode) -> Mode {
        // An override pinned while the probe was in flight takes precedence.
        let previous = self.state.rcu(|cur| {
            if cur.source == ModeSource::Override {
                Arc::clone(cur)
            } else {
                Arc::new(ModeState {
                    mode,
                    source: ModeSource::Probe,
                })
            }
        });
        if previous.source != ModeSource::Override && previous.mode != mode {
            self.announce(previous.mode, mode, "probe");
        }
        self.state.load().mode
    }

    fn probe_failed(&self, error: &ProbeError, fallback: Mode) -> Mode {
        counter!("backoffice_mode_probe_failures_total").increment(1);
        warn!(error = %error, fallback = %fallback, "mode probe failed; keeping last known mode");
        // Re-read so an override pinned during the failed probe is honoured.
        let latest = self.state.load();
        if latest.source == ModeSource::Override {
            latest.mode
        } else {
            fallback
        }
    }

    fn announce(&self, from: Mode, to: Mode, source: &'static str) {
        counter!("backoffice_mode_switches_total", "source" => source).increment(1);
        info!(from = %from, to = %to, source, "data mode changed");
        self.changes.send_replace(to);
    }

    fn persist(&self, mode: Option<Mode>) {
        let Some(persisted) = &self.persisted else {
            return;
        };
        let result = match mode {
            Some(mode) => persisted.store.set(&persisted.key, mode.as_str()),
            None => persisted.store.remove(&persisted.key),
        };
        if let Err(e) = result {
            warn!(key = %persisted.key, error = %e, "could not persist mode override");
        }
    }
}

impl std::fmt::Debug for ModeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeStore")
            .field("state", &self.state())
            .field("has_probe", &self.probe.is_some())
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::storage::{FileStore, MemoryStore};

    /// Probe whose answer the test controls.
    struct ScriptedProbe {
        answer: Mutex<Result<Mode, String>>,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(answer: Result<Mode, String>) -> Arc<Self> {
            Arc::new(Self {
                answer: Mutex::new(answer),
                calls: AtomicUsize::new(0),
            })
        }

        fn set(&self, answer: Result<Mode, String>) {
            *self.answer.lock() = answer;
        }
    }

    #[async_trait]
    impl ModeProbe for ScriptedProbe {
        async fn probe(&self) -> Result<Mode, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.lock().clone().map_err(ProbeError::Unreachable)
        }
    }

    /// Probe that never answers.
    struct HangingProbe;

    #[async_trait]
    impl ModeProbe for HangingProbe {
        async fn probe(&self) -> Result<Mode, ProbeError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn set_mode_is_immediately_visible() {
        let store = ModeStore::new(Mode::Mock);
        store.set_mode(Mode::Live);
        assert!(!store.is_mock_mode().await);
        store.set_mode(Mode::Mock);
        assert!(store.is_mock_mode().await);
    }

    #[tokio::test]
    async fn initial_mode_without_probe() {
        let store = ModeStore::new(Mode::Live);
        assert_eq!(store.resolve().await, Mode::Live);
        assert_eq!(store.state().source, ModeSource::Initial);
    }

    #[tokio::test]
    async fn probe_answer_is_adopted() {
        let probe = ScriptedProbe::new(Ok(Mode::Live));
        let store = ModeStore::new(Mode::Mock).with_probe(probe.clone(), Duration::from_secs(1));

        assert_eq!(store.resolve().await, Mode::Live);
        assert_eq!(store.state().source, ModeSource::Probe);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn probe_failure_keeps_last_known_mode() {
        let probe = ScriptedProbe::new(Ok(Mode::Live));
        let store = ModeStore::new(Mode::Mock).with_probe(probe.clone(), Duration::from_secs(1));
        assert_eq!(store.resolve().await, Mode::Live);

        probe.set(Err("flag service down".to_string()));
        assert_eq!(store.resolve().await, Mode::Live);
        assert_eq!(store.current(), Mode::Live);
    }

    #[tokio::test]
    async fn probe_failure_before_any_answer_keeps_initial() {
        let probe = ScriptedProbe::new(Err("unreachable".to_string()));
        let store = ModeStore::new(Mode::Mock).with_probe(probe, Duration::from_secs(1));
        assert_eq!(store.resolve().await, Mode::Mock);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_timeout_falls_back() {
        let store =
            ModeStore::new(Mode::Live).with_probe(Arc::new(HangingProbe), Duration::from_millis(50));
        assert_eq!(store.resolve().await, Mode::Live);
    }

    #[tokio::test]
    async fn override_beats_probe_until_cleared() {
        let probe = ScriptedProbe::new(Ok(Mode::Live));
        let store = ModeStore::new(Mode::Live).with_probe(probe.clone(), Duration::from_secs(1));

        store.set_mode(Mode::Mock);
        assert_eq!(store.resolve().await, Mode::Mock);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

        store.clear_override();
        assert_eq!(store.resolve().await, Mode::Live);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = ModeStore::new(Mode::Mock);
        let mut rx = store.subscribe();

        store.set_mode(Mode::Live);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Mode::Live);
    }

    #[tokio::test]
    async fn override_survives_restart_through_store() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let store = ModeStore::new(Mode::Mock).with_persistence(kv.clone(), "app:mode");
            store.set_mode(Mode::Live);
        }
        let restored = ModeStore::new(Mode::Mock).with_persistence(kv.clone(), "app:mode");
        assert_eq!(restored.current(), Mode::Live);
        assert_eq!(restored.state().source, ModeSource::Override);

        restored.clear_override();
        assert!(kv.get("app:mode").unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_persisted_override_is_ignored() {
        let kv = Arc::new(MemoryStore::new());
        kv.set("app:mode", "banana").unwrap();
        let store = ModeStore::new(Mode::Mock).with_persistence(kv, "app:mode");
        assert_eq!(store.current(), Mode::Mock);
        assert_eq!(store.state().source, ModeSource::Initial);
    }

    #[test]
    fn concurrent_overrides_persist_the_published_mode() {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let store = Arc::new(ModeStore::new(Mode::Mock).with_persistence(kv.clone(), "app:mode"));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        store.set_mode(if (t + i) % 2 == 0 { Mode::Live } else { Mode::Mock });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let persisted = kv.get("app:mode").unwrap().unwrap();
        assert_eq!(persisted, store.current().as_str());
        let restored = ModeStore::new(Mode::Mock).with_persistence(kv, "app:mode");
        assert_eq!(restored.current(), store.current());
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_torn_state() {
        let store = Arc::new(ModeStore::new(Mode::Mock));
        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..500 {
                    store.set_mode(if i % 2 == 0 { Mode::Live } else { Mode::Mock });
                    tokio::task::yield_now().await;
                }
            })
        };
        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    // The only Initial state ever published is (Mock, Initial).
                    let state = store.state();
                    if state.source == ModeSource::Initial {
                        assert_eq!(state.mode, Mode::Mock);
                    }
                    let resolved = store.resolve().await;
                    assert!(matches!(resolved, Mode::Mock | Mode::Live));
                }
            }));
        }
        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
    }
}
