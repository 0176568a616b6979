//! Progress reporting for render workers.
//!
//! Workers talk to a [`ProgressSink`]: a named-entry registry with one entry
//! per worker. [`ProgressBoard`] is the terminal implementation; updates are
//! posted fire-and-forget through a channel so the render threads never
//! stall on drawing, and a background ticker applies them to the
//! mutex-guarded registry and redraws `indicatif` bars. ETA comes from a
//! fixed-window moving average of (elapsed, progress-delta) records.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::warn;

/// Window size for the throughput moving average.
const AVERAGE_WINDOW: usize = 10;

/// How long the ticker waits for an update before redrawing on its own.
const TICK_TIMEOUT: Duration = Duration::from_millis(100);

/// Sink for worker progress updates.
///
/// `add` registers a named entry with its value range; `update` reports the
/// current value for a label. Implementations must tolerate updates for
/// unregistered labels (benign no-op) and being a complete no-op: a headless
/// render must produce identical pixels.
pub trait ProgressSink: Sync {
    /// Register a progress entry covering `[min, max]`.
    fn add(&self, label: &str, min: u64, max: u64);

    /// Report the current value for a registered entry.
    fn update(&self, label: &str, current: u64);
}

/// Sink that ignores everything, for headless operation.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn add(&self, _label: &str, _min: u64, _max: u64) {}
    fn update(&self, _label: &str, _current: u64) {}
}

/// One throughput observation: how much progress in how much time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateRecord {
    /// Wall time elapsed since the previous update
    pub elapsed: Duration,
    /// Progress gained since the previous update (clamped at zero)
    pub delta: u64,
}

/// Fixed-window moving average over [`UpdateRecord`]s.
///
/// A ring buffer of the last `AVERAGE_WINDOW` observations, recomputed on
/// every update.
#[derive(Debug, Default)]
pub struct MovingAverage {
    window: Vec<UpdateRecord>,
    index: usize,
}

impl MovingAverage {
    /// Create an empty average.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an observation, evicting the oldest once the window is full.
    pub fn update(&mut self, record: UpdateRecord) {
        if self.window.len() < AVERAGE_WINDOW {
            self.window.push(record);
        } else {
            self.window[self.index] = record;
        }
        self.index = (self.index + 1) % AVERAGE_WINDOW;
    }

    /// Average over the currently held observations, `None` when empty.
    pub fn average(&self) -> Option<UpdateRecord> {
        if self.window.is_empty() {
            return None;
        }

        let count = self.window.len() as u32;
        let elapsed: Duration = self.window.iter().map(|r| r.elapsed).sum();
        let delta: u64 = self.window.iter().map(|r| r.delta).sum();
        Some(UpdateRecord {
            elapsed: elapsed / count,
            delta: delta / u64::from(count),
        })
    }

    /// Estimated seconds per unit of progress over the window.
    ///
    /// `None` while the average speed is zero, which callers must surface
    /// as "ETA unknown" rather than dividing by it.
    pub fn seconds_per_unit(&self) -> Option<f64> {
        let total_delta: u64 = self.window.iter().map(|r| r.delta).sum();
        if total_delta == 0 {
            return None;
        }
        let total_elapsed: Duration = self.window.iter().map(|r| r.elapsed).sum();
        Some(total_elapsed.as_secs_f64() / total_delta as f64)
    }
}

/// Registry entry for one worker's progress.
struct Entry {
    label: String,
    min: u64,
    max: u64,
    current: u64,
    last_update: Instant,
    history: MovingAverage,
    bar: ProgressBar,
}

impl Entry {
    fn new(label: String, min: u64, max: u64, bar: ProgressBar) -> Self {
        Self {
            label,
            min,
            max,
            current: min,
            last_update: Instant::now(),
            history: MovingAverage::new(),
            bar,
        }
    }

    /// Apply a reported value: clamp it into range, record the throughput
    /// observation, and redraw the bar with a fresh ETA.
    fn apply(&mut self, value: u64) {
        let previous = self.current;
        self.current = value.clamp(self.min, self.max);

        let now = Instant::now();
        let elapsed = now - self.last_update;
        self.last_update = now;

        self.history.update(UpdateRecord {
            elapsed,
            delta: self.current.saturating_sub(previous),
        });

        self.bar.set_position(self.current - self.min);
        if self.current == self.max {
            self.bar.finish_with_message("done");
        } else {
            self.bar.set_message(match self.eta() {
                Some(eta) => format!("eta {:.1}s", eta.as_secs_f64()),
                None => "eta ?".to_string(),
            });
        }
    }

    /// Estimated time to completion from the moving average.
    fn eta(&self) -> Option<Duration> {
        let remaining = self.max - self.current;
        let per_unit = self.history.seconds_per_unit()?;
        Some(Duration::from_secs_f64(per_unit * remaining as f64))
    }
}

/// Terminal progress board: one `indicatif` bar per registered worker.
pub struct ProgressBoard {
    entries: Arc<Mutex<Vec<Entry>>>,
    multi: MultiProgress,
    tx: Option<Sender<(String, u64)>>,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressBoard {
    /// Create a board drawing to stderr.
    pub fn new() -> Self {
        Self::with_draw_target(MultiProgress::new())
    }

    /// Create a board that draws nowhere, for tests and headless runs that
    /// still want the registry semantics.
    pub fn hidden() -> Self {
        Self::with_draw_target(MultiProgress::with_draw_target(
            ProgressDrawTarget::hidden(),
        ))
    }

    fn with_draw_target(multi: MultiProgress) -> Self {
        let entries: Arc<Mutex<Vec<Entry>>> = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel::<(String, u64)>();

        let ticker_entries = Arc::clone(&entries);
        let ticker = thread::spawn(move || loop {
            match rx.recv_timeout(TICK_TIMEOUT) {
                Ok((label, value)) => {
                    let mut entries = match ticker_entries.lock() {
                        Ok(entries) => entries,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    // Updates for labels never registered are benign no-ops.
                    if let Some(entry) = entries.iter_mut().find(|e| e.label == label) {
                        entry.apply(value);
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            entries,
            multi,
            tx: Some(tx),
            ticker: Some(ticker),
        }
    }

    /// Drain pending updates and stop the ticker thread.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Closing the channel lets the ticker drain remaining updates and exit.
        drop(self.tx.take());
        if let Some(ticker) = self.ticker.take() {
            if ticker.join().is_err() {
                warn!("progress ticker thread panicked");
            }
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:>10} [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressBoard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ProgressSink for ProgressBoard {
    fn add(&self, label: &str, min: u64, max: u64) {
        let bar = self
            .multi
            .add(ProgressBar::new(max.saturating_sub(min)));
        bar.set_style(Self::bar_style());
        bar.set_prefix(label.to_string());

        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push(Entry::new(label.to_string(), min, max, bar));
    }

    fn update(&self, label: &str, current: u64) {
        // Fire-and-forget: an unbounded channel send never blocks the
        // render thread, and a closed channel just drops the update.
        if let Some(tx) = &self.tx {
            let _ = tx.send((label.to_string(), current));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(millis: u64, delta: u64) -> UpdateRecord {
        UpdateRecord {
            elapsed: Duration::from_millis(millis),
            delta,
        }
    }

    #[test]
    fn moving_average_over_partial_window() {
        let mut avg = MovingAverage::new();
        assert_eq!(avg.average(), None);

        avg.update(record(100, 2));
        avg.update(record(300, 4));
        let mean = avg.average().unwrap();
        assert_eq!(mean.elapsed, Duration::from_millis(200));
        assert_eq!(mean.delta, 3);
    }

    #[test]
    fn moving_average_evicts_oldest() {
        let mut avg = MovingAverage::new();
        // Fill the window with slow records, then push fast ones until the
        // slow ones are fully evicted.
        for _ in 0..AVERAGE_WINDOW {
            avg.update(record(1000, 1));
        }
        for _ in 0..AVERAGE_WINDOW {
            avg.update(record(10, 1));
        }
        let per_unit = avg.seconds_per_unit().unwrap();
        assert!((per_unit - 0.010).abs() < 1e-9);
    }

    #[test]
    fn zero_speed_yields_unknown_eta() {
        let mut avg = MovingAverage::new();
        avg.update(record(500, 0));
        avg.update(record(500, 0));
        assert_eq!(avg.seconds_per_unit(), None);

        let entry_eta = {
            let mut entry = Entry::new("idle".to_string(), 0, 10, ProgressBar::hidden());
            entry.apply(0);
            entry.eta()
        };
        assert_eq!(entry_eta, None);
    }

    #[test]
    fn entry_eta_reflects_throughput() {
        let mut entry = Entry::new("steady".to_string(), 0, 100, ProgressBar::hidden());
        entry.history.update(record(100, 10));
        entry.current = 50;
        // 10 units per 100ms → 50 remaining ≈ 500ms
        let eta = entry.eta().unwrap();
        assert!((eta.as_secs_f64() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn entry_clamps_reported_values() {
        let mut entry = Entry::new("clamped".to_string(), 5, 10, ProgressBar::hidden());
        entry.apply(2);
        assert_eq!(entry.current, 5);
        entry.apply(99);
        assert_eq!(entry.current, 10);
    }

    #[test]
    fn unknown_label_update_is_a_noop() {
        let board = ProgressBoard::hidden();
        board.add("worker 0", 0, 4);
        board.update("worker 7", 3);
        board.update("worker 0", 2);
        board.finish();
    }

    #[test]
    fn updates_are_applied_after_finish() {
        let board = ProgressBoard::hidden();
        board.add("worker 0", 0, 4);
        for i in 1..=4 {
            board.update("worker 0", i);
        }
        // finish drains the channel before joining the ticker
        let entries = Arc::clone(&board.entries);
        board.finish();
        let entries = entries.lock().unwrap();
        assert_eq!(entries[0].current, 4);
    }
}
