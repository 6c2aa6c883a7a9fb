//! Request timing: a bounded rolling latency window and the fairing that
//! feeds it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use tracing::info;

/// How many recent request durations the window keeps.
pub const WINDOW_CAPACITY: usize = 100;

/// Bounded rolling window of request durations.
///
/// Append, trim, and mean happen under one lock acquisition, so the window
/// never exceeds its capacity no matter how requests interleave.
#[derive(Debug)]
pub struct LatencyWindow {
    durations: Mutex<VecDeque<Duration>>,
    capacity: usize,
}

impl LatencyWindow {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "latency window needs a nonzero capacity");
        Self {
            durations: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record one duration, evicting the oldest entries past capacity, and
    /// return the mean of the resulting window.
    pub fn record(&self, duration: Duration) -> Duration {
        let mut window = self.durations.lock();
        window.push_back(duration);
        while window.len() > self.capacity {
            window.pop_front();
        }
        let total: Duration = window.iter().sum();
        total / window.len() as u32
    }

    /// Mean of the current window, if anything has been recorded.
    pub fn mean(&self) -> Option<Duration> {
        let window = self.durations.lock();
        if window.is_empty() {
            return None;
        }
        let total: Duration = window.iter().sum();
        Some(total / window.len() as u32)
    }

    pub fn len(&self) -> usize {
        self.durations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}

/// Stashed in request-local state by `on_request`.
#[derive(Debug, Clone, Copy)]
struct StartTime(Option<Instant>);

/// Fairing that times every request and logs one line per response with the
/// rolling mean. Purely observational: it never alters the response, and a
/// request that somehow missed `on_request` is skipped rather than failed.
#[derive(Debug, Default)]
pub struct RequestTimer {
    window: LatencyWindow,
}

#[rocket::async_trait]
impl Fairing for RequestTimer {
    fn info(&self) -> Info {
        Info {
            name: "Request latency log",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut Data<'_>) {
        request.local_cache(|| StartTime(Some(Instant::now())));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let StartTime(started) = *request.local_cache(|| StartTime(None));
        if let Some(started) = started {
            let duration = started.elapsed();
            let mean = self.window.record(duration);
            info!(
                "{} {} -> {} in {:.3}ms (rolling mean {:.3}ms over {} requests)",
                request.method(),
                request.uri().path(),
                response.status().code,
                duration.as_secs_f64() * 1e3,
                mean.as_secs_f64() * 1e3,
                self.window.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn record_returns_the_window_mean() {
        let window = LatencyWindow::new(10);
        window.record(Duration::from_millis(10));
        window.record(Duration::from_millis(20));
        let mean = window.record(Duration::from_millis(30));
        assert_eq!(mean, Duration::from_millis(20));
        assert_eq!(window.mean(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let window = LatencyWindow::default();
        for _ in 0..150 {
            window.record(Duration::from_millis(1));
        }
        assert_eq!(window.len(), WINDOW_CAPACITY);
    }

    #[test]
    fn oldest_entries_are_evicted_first() {
        let window = LatencyWindow::new(2);
        window.record(Duration::from_millis(10));
        window.record(Duration::from_millis(20));
        let mean = window.record(Duration::from_millis(30));
        assert_eq!(mean, Duration::from_millis(25));
    }

    #[test]
    fn empty_window_has_no_mean() {
        let window = LatencyWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.mean(), None);
    }

    #[test]
    fn concurrent_records_stay_bounded() {
        let window = Arc::new(LatencyWindow::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let window = Arc::clone(&window);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    window.record(Duration::from_micros(250));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(window.len(), WINDOW_CAPACITY);
    }
}
