//! Background polling loop and callback registry

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, ReentrantMutex};

use super::sampler::StateSampler;
use super::snapshot::{diff, DeviceSnapshot, EventKind};
use crate::error::{Result, SdkError};

pub type EventCallback = Arc<dyn Fn(EventKind) + Send + Sync>;

/// Handle returned by [`EventLoop::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Polling,
}

struct Callbacks {
    entries: Mutex<Vec<(CallbackId, EventCallback)>>,
    // Held for a whole delivery; unregister takes it so that no callback
    // runs after unregister returns. Reentrant so callbacks may unregister.
    delivery: ReentrantMutex<()>,
}

impl Callbacks {
    fn is_registered(&self, id: CallbackId) -> bool {
        self.entries.lock().iter().any(|(existing, _)| *existing == id)
    }

    /// Deliver unless the sending worker has been stopped
    fn deliver(&self, events: &[EventKind], stopped: &AtomicBool) {
        let _delivery = self.delivery.lock();
        if stopped.load(Ordering::SeqCst) {
            return;
        }
        let targets: Vec<(CallbackId, EventCallback)> = self
            .entries
            .lock()
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        for event in events {
            for (id, callback) in &targets {
                if self.is_registered(*id) {
                    callback(*event);
                }
            }
        }
    }
}

struct Worker {
    stopped: Arc<AtomicBool>,
    stop: mpsc::Sender<()>,
    done: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

/// Background poller that turns state differences into callbacks
///
/// The loop is idle until the first callback is registered. Registering it
/// takes the baseline sample on the caller's thread and starts the worker;
/// unregistering the last callback stops the worker and waits for it up to
/// the stop timeout.
pub struct EventLoop {
    sampler: Arc<dyn StateSampler>,
    interval: Duration,
    stop_timeout: Duration,
    callbacks: Arc<Callbacks>,
    worker: Mutex<Option<Worker>>,
    next_id: AtomicU64,
    span: tracing::Span,
}

impl EventLoop {
    pub fn new(sampler: Arc<dyn StateSampler>, interval: Duration, stop_timeout: Duration) -> Self {
        Self {
            sampler,
            interval,
            stop_timeout,
            callbacks: Arc::new(Callbacks {
                entries: Mutex::new(Vec::new()),
                delivery: ReentrantMutex::new(()),
            }),
            worker: Mutex::new(None),
            next_id: AtomicU64::new(1),
            span: tracing::Span::none(),
        }
    }

    /// Run the worker inside `span`
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn state(&self) -> LoopState {
        if self.worker.lock().is_some() {
            LoopState::Polling
        } else {
            LoopState::Idle
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.entries.lock().len()
    }

    /// Add a callback, starting the loop if it was idle
    ///
    /// Fails without registering anything when the baseline sample fails.
    pub fn register(&self, callback: EventCallback) -> Result<CallbackId> {
        let mut worker = self.worker.lock();
        if worker.is_none() {
            let baseline = self.sampler.sample()?;
            *worker = Some(self.spawn(baseline)?);
        }

        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.entries.lock().push((id, callback));
        Ok(id)
    }

    /// Remove a callback; returns whether it was registered
    ///
    /// Removing the last one stops the loop.
    pub fn unregister(&self, id: CallbackId) -> bool {
        let (removed, now_empty) = {
            let _delivery = self.callbacks.delivery.lock();
            let mut entries = self.callbacks.entries.lock();
            let before = entries.len();
            entries.retain(|(existing, _)| *existing != id);
            (entries.len() != before, entries.is_empty())
        };

        if removed && now_empty {
            self.stop_if_unused();
        }
        removed
    }

    fn stop_if_unused(&self) {
        let mut slot = self.worker.lock();
        if !self.callbacks.entries.lock().is_empty() {
            return;
        }
        if let Some(worker) = slot.take() {
            self.stop_worker(worker);
        }
    }

    fn stop_worker(&self, worker: Worker) {
        // A worker that outlives the timeout must not deliver once this returns.
        {
            let _delivery = self.callbacks.delivery.lock();
            worker.stopped.store(true, Ordering::SeqCst);
        }
        let _ = worker.stop.send(());

        // Unregistered from inside a callback: the worker exits on its own
        // once this delivery returns.
        if worker.handle.thread().id() == thread::current().id() {
            return;
        }

        match worker.done.recv_timeout(self.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    tracing::warn!("polling worker panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout = ?self.stop_timeout,
                    "polling worker did not stop in time, detaching it"
                );
            }
        }
    }

    fn spawn(&self, baseline: DeviceSnapshot) -> Result<Worker> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let sampler = Arc::clone(&self.sampler);
        let callbacks = Arc::clone(&self.callbacks);
        let interval = self.interval;
        let span = self.span.clone();

        let handle = thread::Builder::new()
            .name("bravia-events".to_string())
            .spawn(move || {
                let _entered = span.enter();
                poll(sampler.as_ref(), &callbacks, baseline, interval, &stop_rx, &flag);
                let _ = done_tx.send(());
            })
            .map_err(|e| SdkError::EventLoop(format!("failed to start polling worker: {}", e)))?;

        Ok(Worker {
            stopped,
            stop: stop_tx,
            done: done_rx,
            handle,
        })
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.callbacks.entries.lock().clear();
        if let Some(worker) = self.worker.lock().take() {
            self.stop_worker(worker);
        }
    }
}

fn poll(
    sampler: &dyn StateSampler,
    callbacks: &Callbacks,
    mut baseline: DeviceSnapshot,
    interval: Duration,
    stop: &mpsc::Receiver<()>,
    stopped: &AtomicBool,
) {
    tracing::info!(?interval, "event loop started");

    let mut next_tick = Instant::now() + interval;
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match stop.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        next_tick = Instant::now() + interval;

        let sample = sampler.sample();
        if stopped.load(Ordering::SeqCst) {
            tracing::debug!("worker stopped during a sample, dropping the tick");
            break;
        }
        match sample {
            Ok(snapshot) => {
                let events = diff(&baseline, &snapshot);
                if !events.is_empty() {
                    tracing::debug!(?events, "device state changed");
                    callbacks.deliver(&events, stopped);
                }
                baseline = snapshot;
            }
            Err(e) => {
                tracing::warn!(error = %e, "polling tick failed, keeping previous state");
            }
        }
    }

    tracing::info!("event loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(Mutex<VecDeque<Result<DeviceSnapshot>>>);

    impl StateSampler for Scripted {
        fn sample(&self) -> Result<DeviceSnapshot> {
            self.0
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(SdkError::EventLoop("script exhausted".to_string())))
        }
    }

    #[test]
    fn test_failed_baseline_does_not_start() {
        let sampler = Arc::new(Scripted(Mutex::new(VecDeque::new())));
        let events = EventLoop::new(sampler, Duration::from_millis(10), Duration::from_secs(1));

        assert!(events.register(Arc::new(|_: EventKind| {})).is_err());
        assert_eq!(events.state(), LoopState::Idle);
        assert_eq!(events.callback_count(), 0);
    }

    #[test]
    fn test_unknown_id_is_not_removed() {
        let sampler = Arc::new(Scripted(Mutex::new(VecDeque::from(vec![Ok(DeviceSnapshot::default())]))));
        let events = EventLoop::new(sampler, Duration::from_millis(10), Duration::from_secs(1));

        let id = events.register(Arc::new(|_: EventKind| {})).unwrap();
        assert!(!events.unregister(CallbackId(999)));
        assert_eq!(events.state(), LoopState::Polling);
        assert!(events.unregister(id));
        assert_eq!(events.state(), LoopState::Idle);
    }
}
