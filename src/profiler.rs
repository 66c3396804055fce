// profiler.rs
// Scoped wall-clock timing of the run loops, active with the `profiling` feature

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cumulative time and entry count per named section.
#[derive(Debug, Default)]
pub struct Profiler {
    pub timings: HashMap<&'static str, Duration>,
    pub calls: HashMap<&'static str, u64>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&mut self, guard: &ProfilerGuard) {
        self.record(guard.name, guard.start.elapsed());
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        *self.timings.entry(name).or_default() += elapsed;
        *self.calls.entry(name).or_default() += 1;
    }

    /// Sections ordered by total time, longest first.
    pub fn report_sorted(&self) -> Vec<(&'static str, Duration, u64)> {
        let mut v: Vec<_> = self
            .timings
            .iter()
            .map(|(n, d)| (*n, *d, self.calls.get(n).copied().unwrap_or(0)))
            .collect();
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    }

    pub fn clear(&mut self) {
        self.timings.clear();
        self.calls.clear();
    }

    pub fn log_and_clear(&mut self) {
        for (name, total, calls) in self.report_sorted() {
            log::info!("{:<24} {:>12?} over {} calls", name, total, calls);
        }
        self.clear();
    }
}

pub struct ProfilerGuard {
    name: &'static str,
    start: Instant,
}

/// Start a profiling section. The guard updates the global profiler when
/// dropped.
pub fn start(name: &'static str) -> ProfilerGuard {
    ProfilerGuard {
        name,
        start: Instant::now(),
    }
}

#[cfg(feature = "profiling")]
impl Drop for ProfilerGuard {
    fn drop(&mut self) {
        crate::PROFILER.lock().finish(self);
    }
}

/// Profile the enclosing scope when the `profiling` feature is enabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _guard = $crate::profiler::start($name);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_orders_by_total_time() {
        let mut profiler = Profiler::new();
        profiler.record("step", Duration::from_millis(3));
        profiler.record("sample", Duration::from_millis(10));
        profiler.record("step", Duration::from_millis(4));

        let report = profiler.report_sorted();
        assert_eq!(report[0], ("sample", Duration::from_millis(10), 1));
        assert_eq!(report[1], ("step", Duration::from_millis(7), 2));

        profiler.log_and_clear();
        assert!(profiler.report_sorted().is_empty());
    }

    #[test]
    fn guard_measures_elapsed_time() {
        let guard = start("guarded");
        let mut profiler = Profiler::new();
        profiler.finish(&guard);
        assert_eq!(profiler.calls["guarded"], 1);
    }
}
