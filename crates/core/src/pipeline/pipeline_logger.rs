use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for batch orchestration events.
///
/// Decouples use cases from specific output mechanisms (log crate, test
/// recorders) so each caller can observe batch behavior without changing
/// the orchestration code.
pub trait PipelineLogger: Send {
    /// Report that item `current` of `total` is about to be processed.
    fn progress(&mut self, current: usize, total: usize, item: &str);

    /// Record how long a named stage took for one item.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. segment count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Report a per-item failure that did not stop the batch.
    fn warn(&mut self, message: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize, _item: &str) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}

/// Logger that forwards events to the `log` facade and keeps per-stage
/// timings and metrics for a summary report at the end of the batch.
pub struct StdoutPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    total_items: usize,
    warnings: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            total_items: 0,
            warnings: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() && self.warnings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let items = self.total_items;
        let mut lines = Vec::new();

        lines.push(format!(
            "Batch summary ({items} files, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:8.1}ms  total {total_ms:9.0}ms  ({} files)",
                durations.len()
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            let avg = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            lines.push(format!("  {name}: avg {avg:.1}"));
        }

        if !self.warnings.is_empty() {
            lines.push(format!("  Failed: {}", self.warnings.len()));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize, item: &str) {
        self.total_items = total;
        log::info!("Processing file {current}/{total}: {item}");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
        log::warn!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10, "a.mp3");
        logger.timing("transcribe", 5.0);
        logger.metric("segments", 3.0);
        logger.info("hello");
        logger.warn("oops");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new();
        logger.timing("transcribe", 200.0);
        logger.timing("transcribe", 300.0);

        let values = logger.timings_for("transcribe").unwrap();
        assert_eq!(values.len(), 2);
        assert!((values[0] - 200.0).abs() < f64::EPSILON);
        assert!((values[1] - 300.0).abs() < f64::EPSILON);
        assert!(logger.timings_for("missing").is_none());
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = StdoutPipelineLogger::new();
        logger.metric("segments", 3.0);
        logger.metric("segments", 4.0);

        let values = logger.metrics_for("segments").unwrap();
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        assert!((avg - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_includes_timing_and_metrics() {
        let mut logger = StdoutPipelineLogger::new();
        logger.progress(1, 2, "a.mp3");
        logger.timing("transcribe", 20.0);
        logger.metric("segments", 3.0);
        logger.metric("segments", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Batch summary (2 files"));
        assert!(summary.contains("transcribe"));
        assert!(summary.contains("segments: avg 3.5"));
        assert!(!summary.contains("Failed"));
    }

    #[test]
    fn test_summary_counts_failures() {
        let mut logger = StdoutPipelineLogger::new();
        logger.warn("b.mp3 failed");
        logger.warn("c.mp3 failed");

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Failed: 2"));
        assert_eq!(logger.warnings().len(), 2);
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new();
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_total() {
        let mut logger = StdoutPipelineLogger::new();
        for i in 1..=3 {
            logger.progress(i, 3, "x.wav");
        }
        assert_eq!(logger.total_items, 3);
    }
}
