/// Processed/total counters for a single auto-lighting run.
///
/// The value is threaded through a run explicitly and dropped when the run
/// ends, so `processed` never exceeds `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    processed: usize,
    total: usize,
}

/// Snapshot handed to progress listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressReport {
    pub processed: usize,
    pub total: usize,
    pub fraction: f32,
    /// Set once `processed` reaches `total`; the host can drop its indicator.
    pub complete: bool,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self { processed: 0, total }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Counts one more processed item, saturating at `total`.
    pub fn advance(&mut self) -> ProgressReport {
        self.processed = (self.processed + 1).min(self.total);
        self.report()
    }

    pub fn report(&self) -> ProgressReport {
        report_progress(self.processed, self.total)
    }
}

/// Fraction of `total` covered by `processed`, in `[0, 1]`.
///
/// An empty run (`total == 0`) is reported as already complete.
pub fn report_progress(processed: usize, total: usize) -> ProgressReport {
    if total == 0 {
        return ProgressReport {
            processed,
            total,
            fraction: 1.0,
            complete: true,
        };
    }

    let fraction = (processed as f32 / total as f32).clamp(0.0, 1.0);
    ProgressReport {
        processed,
        total,
        fraction,
        complete: processed >= total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_reports_zero() {
        let report = report_progress(0, 12);
        assert_eq!(report.fraction, 0.0);
        assert!(!report.complete);
    }

    #[test]
    fn test_full_run_signals_completion() {
        let report = report_progress(7, 7);
        assert_eq!(report.fraction, 1.0);
        assert!(report.complete);
    }

    #[test]
    fn test_partial_fraction() {
        let report = report_progress(1, 4);
        assert!((report.fraction - 0.25).abs() < f32::EPSILON);
        assert!(!report.complete);
    }

    #[test]
    fn test_empty_total_does_not_divide_by_zero() {
        let report = report_progress(0, 0);
        assert_eq!(report.fraction, 1.0);
        assert!(report.complete);
    }

    #[test]
    fn test_advance_saturates_at_total() {
        let mut progress = Progress::new(2);
        progress.advance();
        let last = progress.advance();
        assert!(last.complete);

        let past_end = progress.advance();
        assert_eq!(past_end.processed, 2);
        assert_eq!(progress.processed(), progress.total());
    }
}
