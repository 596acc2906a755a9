//! Progress reporting and cooperative cancellation.
//!
//! The [`ProgressReporter`] trait is polled by the orchestrator once per
//! committed unit. [`LogProgress`] mirrors progress to the `log` facade and
//! never cancels; [`CancelAfter`] stops a run after a fixed number of commits.

/// Receives progress updates and may ask a run to stop.
pub trait ProgressReporter {
    /// Announces a new stage of the run.
    fn report_stage(&mut self, text: &str);

    /// Sets the number of steps the current stage will take.
    fn set_max_progress(&mut self, _max: usize) {}

    /// Names the item currently being worked on.
    fn set_title(&mut self, _title: &str) {}

    /// Marks one step done.
    fn advance(&mut self);

    /// Returns `false` to cancel the run after the current unit.
    fn keep_going(&mut self) -> bool;
}

/// Writes progress to the log.
#[derive(Debug, Default)]
pub struct LogProgress {
    done: usize,
    max: usize,
}

impl LogProgress {
    /// Creates a reporter with no steps done.
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps completed so far.
    pub fn done(&self) -> usize {
        self.done
    }
}

impl ProgressReporter for LogProgress {
    fn report_stage(&mut self, text: &str) {
        log::info!("{text}");
    }

    fn set_max_progress(&mut self, max: usize) {
        self.max = max;
        self.done = 0;
    }

    fn set_title(&mut self, title: &str) {
        log::debug!("[{}/{}] {title}", self.done + 1, self.max);
    }

    fn advance(&mut self) {
        self.done += 1;
    }

    fn keep_going(&mut self) -> bool {
        true
    }
}

/// Asks the run to stop once `limit` steps are done.
#[derive(Debug)]
pub struct CancelAfter {
    limit: usize,
    done: usize,
}

impl CancelAfter {
    /// Cancels after `limit` advances.
    pub fn new(limit: usize) -> Self {
        Self { limit, done: 0 }
    }
}

impl ProgressReporter for CancelAfter {
    fn report_stage(&mut self, _text: &str) {}

    fn advance(&mut self) {
        self.done += 1;
    }

    fn keep_going(&mut self) -> bool {
        self.done < self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_progress_counts_and_continues() {
        let mut p = LogProgress::new();
        p.report_stage("placing");
        p.set_max_progress(3);
        p.set_title("U1");
        p.advance();
        p.advance();
        assert_eq!(p.done(), 2);
        assert!(p.keep_going());
        p.set_max_progress(5);
        assert_eq!(p.done(), 0);
    }

    #[test]
    fn cancel_after_limit() {
        let mut p = CancelAfter::new(2);
        assert!(p.keep_going());
        p.advance();
        assert!(p.keep_going());
        p.advance();
        assert!(!p.keep_going());
    }

    #[test]
    fn defaults_are_no_ops() {
        let mut p = CancelAfter::new(0);
        p.set_max_progress(10);
        p.set_title("ignored");
        assert!(!p.keep_going());
    }
}
