//! Progress reporting for long-running pipeline stages.
//!
//! Mirrors the teacher's habit of logging stage transitions and counts
//! rather than a dedicated progress-bar dependency: every line carries a
//! stage name, a count, and (once enough samples exist) an items/sec-based
//! ETA, all at `info`/`debug` level so they land on stderr by default.

use std::time::Instant;

/// Tracks elapsed time and item counts for one pipeline stage, emitting
/// periodic `tracing` progress lines.
pub struct StageProgress {
    stage: &'static str,
    started: Instant,
    last_reported: usize,
    report_every: usize,
}

impl StageProgress {
    #[must_use]
    pub fn start(stage: &'static str) -> Self {
        tracing::info!(stage, "starting");
        Self {
            stage,
            started: Instant::now(),
            last_reported: 0,
            report_every: 50_000,
        }
    }

    /// Reports progress if at least `report_every` new items have been
    /// processed since the last report.
    pub fn tick(&mut self, processed: usize) {
        if processed < self.last_reported + self.report_every {
            return;
        }
        self.last_reported = processed;
        let elapsed = self.started.elapsed().as_secs_f64();
        #[allow(clippy::cast_precision_loss)]
        let rate = if elapsed > 0.0 {
            processed as f64 / elapsed
        } else {
            0.0
        };
        tracing::info!(
            stage = self.stage,
            processed,
            items_per_sec = rate,
            "progress"
        );
    }

    /// Reports stage completion.
    pub fn finish(&self, total: usize) {
        let elapsed = self.started.elapsed().as_secs_f64();
        tracing::info!(
            stage = self.stage,
            total,
            elapsed_secs = elapsed,
            "finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_does_not_panic_with_zero_elapsed() {
        let mut progress = StageProgress::start("test-stage");
        progress.tick(0);
        progress.tick(100_000);
        progress.finish(100_000);
    }
}
