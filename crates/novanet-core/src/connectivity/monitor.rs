//! Connectivity monitor service.
//!
//! Owns the `ConnectivityState`. Only the monitor mutates it: platform
//! signals (debounced online/offline, immediate quality changes) and the
//! periodic liveness probe. Everyone else reads `current()` or subscribes.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::probe::LivenessProbe;
use super::state::{ConnectivityState, EffectiveType};
use crate::config::ConnectivityConfig;
use crate::control::CancelToken;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Events from the host platform (OS network manager, embedding app, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformSignal {
    Online,
    Offline,
    QualityChanged {
        effective_type: EffectiveType,
        downlink_mbps: Option<f64>,
        rtt_ms: Option<u64>,
    },
}

type Listener = Arc<dyn Fn(&ConnectivityState) + Send + Sync>;

/// Lock order: `state`, then `listeners` or `delivery`. `delivery` is held
/// while listeners run so every listener sees changes in the order they
/// were applied.
struct Shared {
    config: ConnectivityConfig,
    state: Mutex<ConnectivityState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    delivery: Mutex<()>,
    next_id: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Explicitly constructed connectivity service. Clones share one state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    shared: Arc<Shared>,
}

impl ConnectivityMonitor {
    /// `initially_online` is the platform's view at construction time.
    pub fn new(config: ConnectivityConfig, initially_online: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(ConnectivityState::new(initially_online)),
                listeners: Mutex::new(Vec::new()),
                delivery: Mutex::new(()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn current(&self) -> ConnectivityState {
        lock(&self.shared.state).clone()
    }

    pub fn is_online(&self) -> bool {
        lock(&self.shared.state).online
    }

    /// Register `listener`. It is called synchronously with the current state
    /// before this returns, then on every change.
    ///
    /// Listeners may read the monitor but must not subscribe from inside
    /// the callback.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ConnectivityState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);
        let (snapshot, _delivery) = {
            let state = lock(&self.shared.state);
            lock(&self.shared.listeners).push((id, Arc::clone(&listener)));
            (state.clone(), lock(&self.shared.delivery))
        };
        listener(&snapshot);
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.shared.listeners);
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.listeners).len()
    }

    /// Start the event loop with a periodic liveness probe.
    pub fn start<P: LivenessProbe>(&self, probe: P) -> MonitorHandle {
        let probe: Arc<dyn LivenessProbe> = Arc::new(probe);
        self.spawn(Some(probe))
    }

    /// Start the event loop driven by platform signals only.
    pub fn start_passive(&self) -> MonitorHandle {
        self.spawn(None)
    }

    fn spawn(&self, probe: Option<Arc<dyn LivenessProbe>>) -> MonitorHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancelToken::new();
        let mut tasks = vec![tokio::spawn(signal_loop(self.clone(), rx, shutdown.clone()))];
        if let Some(probe) = probe {
            tasks.push(tokio::spawn(probe_loop(self.clone(), probe, shutdown.clone())));
        }
        tracing::info!(
            debounce_ms = self.shared.config.debounce_ms,
            probe_interval_secs = self.shared.config.probe_interval_secs,
            probing = tasks.len() > 1,
            "connectivity monitor started"
        );
        MonitorHandle {
            signals: tx,
            shutdown,
            tasks,
        }
    }

    /// Apply `f` to the state; notify listeners if anything but `last_checked` changed.
    fn update(&self, f: impl FnOnce(&mut ConnectivityState)) -> bool {
        let (snapshot, listeners, _delivery) = {
            let mut state = lock(&self.shared.state);
            let before = state.clone();
            f(&mut state);
            if state.same_signal(&before) {
                return false;
            }
            let listeners: Vec<Listener> = lock(&self.shared.listeners)
                .iter()
                .map(|(_, l)| Arc::clone(l))
                .collect();
            (state.clone(), listeners, lock(&self.shared.delivery))
        };
        tracing::info!(
            online = snapshot.online,
            effective_type = %snapshot.effective_type,
            rtt_ms = ?snapshot.rtt_ms,
            "connectivity changed"
        );
        for listener in listeners {
            listener(&snapshot);
        }
        true
    }

    fn set_online(&self, online: bool) -> bool {
        self.update(|s| {
            s.online = online;
            s.last_checked = Utc::now();
        })
    }

    fn set_quality(&self, effective_type: EffectiveType, downlink_mbps: Option<f64>, rtt_ms: Option<u64>) -> bool {
        self.update(|s| {
            s.effective_type = effective_type;
            s.downlink_mbps = downlink_mbps;
            s.rtt_ms = rtt_ms;
        })
    }

    fn record_probe_success(&self, rtt: Duration) -> bool {
        self.update(|s| {
            s.online = true;
            s.rtt_ms = Some(rtt.as_millis() as u64);
            s.effective_type = EffectiveType::from_rtt(rtt);
            s.last_checked = Utc::now();
        })
    }

    fn record_probe_failure(&self) -> bool {
        self.update(|s| {
            s.online = false;
            s.last_checked = Utc::now();
        })
    }
}

/// Running monitor loop. Dropping it without `shutdown` leaves the loop
/// running until the runtime stops.
pub struct MonitorHandle {
    signals: mpsc::UnboundedSender<PlatformSignal>,
    shutdown: CancelToken,
    tasks: Vec<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Feed a platform signal into the loop. Ignored after shutdown.
    pub fn signal(&self, signal: PlatformSignal) {
        let _ = self.signals.send(signal);
    }

    /// Sender for platform integrations running elsewhere.
    pub fn sender(&self) -> mpsc::UnboundedSender<PlatformSignal> {
        self.signals.clone()
    }

    /// Stop the loop (aborting an in-flight probe) and wait for it to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("connectivity task ended abnormally: {}", e);
            }
        }
        tracing::info!("connectivity monitor stopped");
    }
}

async fn signal_loop(
    monitor: ConnectivityMonitor,
    mut rx: mpsc::UnboundedReceiver<PlatformSignal>,
    shutdown: CancelToken,
) {
    let window = monitor.shared.config.debounce();
    let mut pending: Option<bool> = None;
    let debounce = tokio::time::sleep(window);
    tokio::pin!(debounce);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            signal = rx.recv() => match signal {
                None => break,
                Some(PlatformSignal::Online) => {
                    pending = Some(true);
                    debounce.as_mut().reset(Instant::now() + window);
                }
                Some(PlatformSignal::Offline) => {
                    pending = Some(false);
                    debounce.as_mut().reset(Instant::now() + window);
                }
                Some(PlatformSignal::QualityChanged { effective_type, downlink_mbps, rtt_ms }) => {
                    monitor.set_quality(effective_type, downlink_mbps, rtt_ms);
                }
            },
            _ = &mut debounce, if pending.is_some() => {
                if let Some(online) = pending.take() {
                    tracing::debug!(online, "platform signal settled");
                    monitor.set_online(online);
                }
            }
        }
    }
}

async fn probe_loop(monitor: ConnectivityMonitor, probe: Arc<dyn LivenessProbe>, shutdown: CancelToken) {
    let mut ticker = tokio::time::interval(monitor.shared.config.probe_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let result = {
            let probe = Arc::clone(&probe);
            let cancel = shutdown.clone();
            tokio::task::spawn_blocking(move || probe.probe(&cancel)).await
        };
        match result {
            Ok(Ok(rtt)) => {
                tracing::debug!(rtt_ms = rtt.as_millis() as u64, "liveness probe ok");
                monitor.record_probe_success(rtt);
            }
            Ok(Err(_)) if shutdown.is_cancelled() => break,
            Ok(Err(e)) => {
                tracing::warn!("liveness probe failed: {}", e);
                monitor.record_probe_failure();
            }
            Err(e) => tracing::warn!("liveness probe task failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestError;

    fn config() -> ConnectivityConfig {
        ConnectivityConfig {
            probe_url: "http://127.0.0.1:9/".to_string(),
            probe_interval_secs: 3600,
            probe_timeout_ms: 100,
            debounce_ms: 1_000,
        }
    }

    fn recorder(monitor: &ConnectivityMonitor) -> (SubscriptionId, Arc<Mutex<Vec<ConnectivityState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = monitor.subscribe(move |s| sink.lock().unwrap().push(s.clone()));
        (id, seen)
    }

    struct FixedProbe(Result<Duration, ()>);

    impl LivenessProbe for FixedProbe {
        fn probe(&self, _cancel: &CancelToken) -> Result<Duration, RequestError> {
            self.0.map_err(|_| RequestError::Timeout { after_ms: 100 })
        }
    }

    #[test]
    fn subscriber_gets_initial_state_synchronously() {
        for online in [true, false] {
            let monitor = ConnectivityMonitor::new(config(), online);
            let (_, seen) = recorder(&monitor);
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].online, online);
        }
    }

    #[test]
    fn changes_notify_and_unsubscribe_stops_them() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let (id, seen) = recorder(&monitor);
        assert!(monitor.set_online(false));
        assert!(!monitor.set_online(false), "no change, no notification");
        assert_eq!(seen.lock().unwrap().len(), 2);

        assert!(monitor.unsubscribe(id));
        assert!(!monitor.unsubscribe(id));
        monitor.set_online(true);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(monitor.subscriber_count(), 0);
    }

    #[test]
    fn concurrent_change_reaches_new_subscriber() {
        for _ in 0..2_000 {
            let monitor = ConnectivityMonitor::new(config(), true);
            let start = Arc::new(std::sync::Barrier::new(2));
            let writer = {
                let monitor = monitor.clone();
                let start = Arc::clone(&start);
                std::thread::spawn(move || {
                    start.wait();
                    monitor.set_online(false);
                })
            };
            start.wait();
            let (_, seen) = recorder(&monitor);
            writer.join().unwrap();

            let last = seen.lock().unwrap().last().cloned().unwrap();
            assert_eq!(last.online, monitor.current().online);
        }
    }

    #[test]
    fn concurrent_changes_are_delivered_in_order() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let (_, seen) = recorder(&monitor);
        let writers: Vec<_> = (0..4u64)
            .map(|t| {
                let monitor = monitor.clone();
                std::thread::spawn(move || {
                    for i in 0..250u64 {
                        monitor.record_probe_success(Duration::from_millis(t * 1_000 + i));
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().unwrap().rtt_ms, monitor.current().rtt_ms);
        for t in 0..4u64 {
            let own: Vec<u64> = seen
                .iter()
                .filter_map(|s| s.rtt_ms)
                .filter(|ms| ms / 1_000 == t)
                .collect();
            assert!(own.windows(2).all(|w| w[0] < w[1]), "writer {t} out of order");
        }
    }

    #[test]
    fn probe_results_update_quality() {
        let monitor = ConnectivityMonitor::new(config(), false);
        monitor.record_probe_success(Duration::from_millis(300));
        let s = monitor.current();
        assert!(s.online);
        assert_eq!(s.rtt_ms, Some(300));
        assert_eq!(s.effective_type, EffectiveType::ThreeG);
        monitor.record_probe_failure();
        assert!(!monitor.is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn flapping_inside_window_is_suppressed() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let (_, seen) = recorder(&monitor);
        let handle = monitor.start_passive();

        handle.signal(PlatformSignal::Offline);
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.signal(PlatformSignal::Online);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(monitor.is_online());
        assert_eq!(seen.lock().unwrap().len(), 1, "only the initial state");
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn offline_applies_after_debounce_window() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let (_, seen) = recorder(&monitor);
        let handle = monitor.start_passive();

        handle.signal(PlatformSignal::Offline);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(monitor.is_online(), "still inside the window");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!monitor.is_online());
        assert_eq!(seen.lock().unwrap().len(), 2);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn quality_signal_applies_immediately() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let handle = monitor.start_passive();
        handle.signal(PlatformSignal::QualityChanged {
            effective_type: EffectiveType::TwoG,
            downlink_mbps: Some(0.25),
            rtt_ms: Some(1500),
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        let s = monitor.current();
        assert_eq!(s.effective_type, EffectiveType::TwoG);
        assert_eq!(s.downlink_mbps, Some(0.25));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn failing_probe_marks_offline() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.subscribe(move |s| {
            let _ = tx.send(s.clone());
        });
        let handle = monitor.start(FixedProbe(Err(())));

        let offline = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(s) = rx.recv().await {
                if !s.online {
                    return s;
                }
            }
            panic!("channel closed");
        })
        .await
        .expect("probe should report offline");
        assert!(!offline.online);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn successful_probe_marks_online_with_rtt() {
        let monitor = ConnectivityMonitor::new(config(), false);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.subscribe(move |s| {
            let _ = tx.send(s.clone());
        });
        let handle = monitor.start(FixedProbe(Ok(Duration::from_millis(40))));

        let online = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(s) = rx.recv().await {
                if s.online {
                    return s;
                }
            }
            panic!("channel closed");
        })
        .await
        .expect("probe should report online");
        assert_eq!(online.rtt_ms, Some(40));
        assert_eq!(online.effective_type, EffectiveType::FourG);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn signals_after_shutdown_are_ignored() {
        let monitor = ConnectivityMonitor::new(config(), true);
        let handle = monitor.start_passive();
        let sender = handle.sender();
        handle.shutdown().await;
        let _ = sender.send(PlatformSignal::Offline);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(monitor.is_online());
    }
}
