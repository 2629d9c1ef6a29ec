use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Caller-owned record of what one or more pipeline calls did.
///
/// The pipeline only ever appends to it; nothing in the crate reads it
/// back, so its contents never influence a result.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    label: &'static str,
    timings: BTreeMap<&'static str, Duration>,
    counters: BTreeMap<&'static str, u64>,
}

/// Wall-clock timer for one stage, closed with [`Diagnostics::stop`].
#[must_use]
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl Diagnostics {
    /// Create a new diagnostics context.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    pub fn init_diagnostics() -> Self {
        Self::new("identifiability diagnostics")
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn start(&self, stage: &'static str) -> StageTimer {
        StageTimer {
            stage,
            started: Instant::now(),
        }
    }

    // Durations of repeated stages accumulate.
    pub fn stop(&mut self, timer: StageTimer) {
        self.append_timing(timer.stage, timer.started.elapsed());
    }

    pub fn append_timing(&mut self, stage: &'static str, elapsed: Duration) {
        *self.timings.entry(stage).or_default() += elapsed;
    }

    pub fn append_counter(&mut self, key: &'static str, amount: u64) {
        *self.counters.entry(key).or_default() += amount;
    }

    /// Overwrites a counter, for gauges such as the last basis size.
    pub fn set_counter(&mut self, key: &'static str, value: u64) {
        self.counters.insert(key, value);
    }

    pub fn timing(&self, stage: &str) -> Option<Duration> {
        self.timings.get(stage).copied()
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn timings(&self) -> &BTreeMap<&'static str, Duration> {
        &self.timings
    }

    pub fn counters(&self) -> &BTreeMap<&'static str, u64> {
        &self.counters
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty() && self.counters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timings_accumulate() {
        let mut diagnostics = Diagnostics::init_diagnostics();
        assert!(diagnostics.is_empty());
        diagnostics.append_timing("groebner", Duration::from_millis(3));
        diagnostics.append_timing("groebner", Duration::from_millis(4));
        assert_eq!(diagnostics.timing("groebner"), Some(Duration::from_millis(7)));

        let timer = diagnostics.start("sample");
        diagnostics.stop(timer);
        assert!(diagnostics.timing("sample").is_some());
        assert_eq!(diagnostics.timing("reduce"), None);
    }

    #[test]
    fn test_counters() {
        let mut diagnostics = Diagnostics::new("test");
        diagnostics.append_counter("sample_attempts", 1);
        diagnostics.append_counter("sample_attempts", 2);
        diagnostics.set_counter("basis_size", 5);
        diagnostics.set_counter("basis_size", 4);
        assert_eq!(diagnostics.counter("sample_attempts"), 3);
        assert_eq!(diagnostics.counter("basis_size"), 4);
        assert_eq!(diagnostics.counter("missing"), 0);
    }
}
