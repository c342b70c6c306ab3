use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Snapshot handed to a [`Monitor`] after each temperature step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub n_steps: usize,
    pub temperature: f64,
    pub happiness: i64,
    pub best_happiness: i64,
    pub max_happiness: usize,
    pub accepted: usize,
    pub n_iter: usize,
    pub done_iter: u64,
    pub total_iter: u64,
}

impl StepReport {
    pub fn acceptance_ratio(&self) -> f64 {
        if self.n_iter == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.n_iter as f64
    }

    pub fn percent_done(&self) -> f64 {
        if self.total_iter == 0 {
            return 100.0;
        }
        100.0 * self.done_iter as f64 / self.total_iter as f64
    }
}

/// Hooks the annealer calls between temperature steps.
pub trait Monitor {
    fn on_step(&mut self, _report: &StepReport) {}

    /// Checked before every temperature step; `true` ends the run early.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Monitor for () {}

/// Shared stop switch, e.g. flipped from a Ctrl+C handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Monitor for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.is_set()
    }
}

/// Progress lines through `tracing`, every `every` steps and on the last one.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    label: String,
    every: usize,
    cancel: Option<CancelFlag>,
}

pub const DEFAULT_PROGRESS_EVERY: usize = 500;

impl LogMonitor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            every: DEFAULT_PROGRESS_EVERY,
            cancel: None,
        }
    }

    pub fn every(mut self, every: usize) -> Self {
        self.every = every.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn due(&self, r: &StepReport) -> bool {
        r.step % self.every == 0 || r.step + 1 == r.n_steps
    }
}

impl Monitor for LogMonitor {
    fn on_step(&mut self, r: &StepReport) {
        if !self.due(r) {
            return;
        }
        tracing::debug!(
            partition = %self.label,
            step = r.step,
            temperature = r.temperature,
            happiness = r.happiness,
            best = r.best_happiness,
            max = r.max_happiness,
            acceptance = r.acceptance_ratio(),
            "{:5.1}% done",
            r.percent_done()
        );
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());

        let log = LogMonitor::new("F").with_cancel(other);
        assert!(log.is_cancelled());
        assert!(!LogMonitor::new("M").is_cancelled());
    }

    fn step(step: usize, n_steps: usize) -> StepReport {
        StepReport {
            step,
            n_steps,
            temperature: 1.0,
            happiness: 0,
            best_happiness: 0,
            max_happiness: 0,
            accepted: 0,
            n_iter: 1,
            done_iter: 0,
            total_iter: 0,
        }
    }

    #[test]
    fn log_monitor_throttles_to_every_nth_and_last_step() {
        let log = LogMonitor::new("F").every(3);
        let due: Vec<usize> = (0..8).filter(|&s| log.due(&step(s, 8))).collect();
        assert_eq!(due, [0, 3, 6, 7]);

        let chatty = LogMonitor::new("F").every(0);
        assert!((0..4).all(|s| chatty.due(&step(s, 4))));

        let quiet = LogMonitor::new("M");
        let due: Vec<usize> = (0..1200).filter(|&s| quiet.due(&step(s, 1200))).collect();
        assert_eq!(due, [0, 500, 1000, 1199]);
    }

    #[test]
    fn report_ratios() {
        let r = StepReport {
            step: 0,
            n_steps: 2,
            temperature: 1.0,
            happiness: 0,
            best_happiness: 0,
            max_happiness: 0,
            accepted: 30,
            n_iter: 120,
            done_iter: 120,
            total_iter: 240,
        };
        assert_eq!(r.acceptance_ratio(), 0.25);
        assert_eq!(r.percent_done(), 50.0);
    }
}
