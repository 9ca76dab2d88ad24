//! Progress reporting for batch downloads.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

/// Receives `(completed, total)` after every finished day.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Logs progress at info level every `step_percent` percent.
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    step_percent: usize,
    last_step: AtomicUsize,
}

impl LogProgress {
    pub fn new(label: impl Into<String>, step_percent: usize) -> Self {
        Self {
            label: label.into(),
            step_percent: step_percent.clamp(1, 100),
            last_step: AtomicUsize::new(0),
        }
    }

    /// Returns the percentage to log, if this update crosses a step.
    fn crossed_step(&self, completed: usize, total: usize) -> Option<usize> {
        if total == 0 {
            return None;
        }
        let percent = completed * 100 / total;
        let step = percent / self.step_percent;
        let previous = self.last_step.fetch_max(step, Ordering::Relaxed);
        (step > previous).then_some(percent)
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        if let Some(percent) = self.crossed_step(completed, total) {
            info!(
                label = %self.label,
                completed,
                total,
                percent,
                "Download progress"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |done: usize, total: usize| seen.lock().unwrap().push((done, total));
        observer.on_progress(1, 3);
        observer.on_progress(2, 3);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn test_log_progress_steps() {
        let progress = LogProgress::new("rain", 25);
        let logged: Vec<_> = (1..=10)
            .filter_map(|done| progress.crossed_step(done, 10))
            .collect();
        assert_eq!(logged, vec![30, 50, 80, 100]);
    }

    #[test]
    fn test_log_progress_empty_total() {
        let progress = LogProgress::new("rain", 10);
        assert_eq!(progress.crossed_step(0, 0), None);
    }
}
