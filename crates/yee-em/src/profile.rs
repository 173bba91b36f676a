//! Timing and memory hooks.
//!
//! The engine reports named timing spans and memory deltas to a [`Profiler`].
//! Reporting can never fail a run.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

pub trait Profiler {
    fn start(&mut self, name: &str);
    fn stop(&mut self, name: &str);
    fn add_memory(&mut self, label: &str, bytes: usize);
    fn remove_memory(&mut self, label: &str, bytes: usize);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProfiler;

impl Profiler for NullProfiler {
    fn start(&mut self, _name: &str) {}
    fn stop(&mut self, _name: &str) {}
    fn add_memory(&mut self, _label: &str, _bytes: usize) {}
    fn remove_memory(&mut self, _label: &str, _bytes: usize) {}
}

/// Accumulates wall time per span name and tracks live and peak bytes.
#[derive(Debug, Clone, Default)]
pub struct RunProfile {
    open: HashMap<String, Instant>,
    timings: BTreeMap<String, Duration>,
    memory: BTreeMap<String, usize>,
    live_bytes: usize,
    peak_bytes: usize,
}

impl RunProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time spent in spans named `name`.
    pub fn total(&self, name: &str) -> Duration {
        self.timings.get(name).copied().unwrap_or_default()
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }

    /// Bytes currently attributed to `label`.
    pub fn bytes(&self, label: &str) -> usize {
        self.memory.get(label).copied().unwrap_or(0)
    }

    pub fn timings(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.timings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// One line per span, then the memory high-water mark.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (name, elapsed) in &self.timings {
            out.push_str(&format!("  {name}: {:.6} s\n", elapsed.as_secs_f64()));
        }
        out.push_str(&format!(
            "  memory: live={} B peak={} B\n",
            self.live_bytes, self.peak_bytes
        ));
        out
    }
}

impl Profiler for RunProfile {
    fn start(&mut self, name: &str) {
        self.open.insert(name.to_string(), Instant::now());
    }

    fn stop(&mut self, name: &str) {
        // A stop without a start is ignored.
        if let Some(started) = self.open.remove(name) {
            *self.timings.entry(name.to_string()).or_default() += started.elapsed();
        }
    }

    fn add_memory(&mut self, label: &str, bytes: usize) {
        *self.memory.entry(label.to_string()).or_default() += bytes;
        self.live_bytes += bytes;
        self.peak_bytes = self.peak_bytes.max(self.live_bytes);
    }

    fn remove_memory(&mut self, label: &str, bytes: usize) {
        let entry = self.memory.entry(label.to_string()).or_default();
        *entry = entry.saturating_sub(bytes);
        self.live_bytes = self.live_bytes.saturating_sub(bytes);
    }
}
