use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Length of one countdown step
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One elapsed second, tagged with the generation of the tick handle that produced it
    Tick(u64),
    /// Nothing arrived within the frame interval
    Frame,
    /// The input source is gone; no further keys will arrive
    Closed,
}

/// Source of app events (keyboard, resize, ticks)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("terminal event read failed: {e}");
                    let _ = key_tx.send(AppEvent::Closed);
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Sender feeding the same queue, for the tick thread
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the frame interval and returns the next event, Frame on
    /// timeout, or Closed once every sender is gone
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => AppEvent::Frame,
            Err(RecvTimeoutError::Disconnected) => AppEvent::Closed,
        }
    }
}

/// Starts the periodic countdown source. The returned handle owns the source:
/// dropping it stops further ticks.
pub trait TickScheduler {
    type Handle;

    fn start(&mut self, generation: u64) -> Self::Handle;
}

/// Sends `AppEvent::Tick` into the event queue from a background thread
pub struct ThreadTickScheduler {
    tx: Sender<AppEvent>,
    interval: Duration,
}

impl ThreadTickScheduler {
    pub fn new(tx: Sender<AppEvent>, interval: Duration) -> Self {
        Self { tx, interval }
    }
}

impl TickScheduler for ThreadTickScheduler {
    type Handle = TickHandle;

    fn start(&mut self, generation: u64) -> TickHandle {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tx = self.tx.clone();
        let interval = self.interval;

        let join = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(AppEvent::Tick(generation)).is_err() {
                        break;
                    }
                }
                // Handle dropped (or an explicit stop)
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        TickHandle {
            stop: Some(stop_tx),
            join: Some(join),
        }
    }
}

/// Owned periodic tick thread. Cancelled on drop.
#[derive(Debug)]
pub struct TickHandle {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        // Closing the channel wakes the thread immediately
        self.stop.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::warn!("tick thread panicked");
            }
        }
    }
}

/// Scheduler that never fires on its own; tests drive ticks by hand and
/// inspect how many handles are alive.
#[derive(Debug, Default, Clone)]
pub struct ManualTickScheduler {
    live: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles acquired and not yet released
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Total number of handles ever acquired
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl TickScheduler for ManualTickScheduler {
    type Handle = ManualTickHandle;

    fn start(&mut self, generation: u64) -> ManualTickHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
        ManualTickHandle {
            generation,
            live: Arc::clone(&self.live),
        }
    }
}

#[derive(Debug)]
pub struct ManualTickHandle {
    pub generation: u64,
    live: Arc<AtomicUsize>,
}

impl Drop for ManualTickHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_frame_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Frame
        let ev = runner.step();
        match ev {
            AppEvent::Frame => {}
            _ => panic!("expected Frame on timeout"),
        }
    }

    #[test]
    fn step_returns_closed_when_source_disconnects() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(250));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            AppEvent::Closed => {}
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Tick(3)).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            AppEvent::Tick(3) => {}
            other => panic!("expected Tick(3), got {other:?}"),
        }
    }

    #[test]
    fn thread_scheduler_sends_tagged_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = ThreadTickScheduler::new(tx, Duration::from_millis(5));
        let handle = scheduler.start(7);

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(AppEvent::Tick(7)) => {}
            other => panic!("expected Tick(7), got {other:?}"),
        }
        drop(handle);
    }

    #[test]
    fn dropping_handle_stops_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = ThreadTickScheduler::new(tx, Duration::from_millis(5));
        let handle = scheduler.start(1);
        let _ = rx.recv_timeout(Duration::from_secs(2));

        // Drop joins the thread, so nothing is sent afterwards
        drop(handle);
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn manual_scheduler_tracks_live_handles() {
        let mut scheduler = ManualTickScheduler::new();
        let a = scheduler.start(1);
        let b = scheduler.start(2);
        assert_eq!(scheduler.live_handles(), 2);
        assert_eq!(a.generation, 1);
        drop(a);
        drop(b);
        assert_eq!(scheduler.live_handles(), 0);
        assert_eq!(scheduler.started(), 2);
    }
}
