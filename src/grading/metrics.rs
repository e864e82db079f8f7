//! Prometheus metrics for the grading pipeline.

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};

/// Counters and histograms shared by the validator, grader, and runtime.
#[derive(Debug)]
pub struct GradingMetrics {
    records_validated: IntCounter,
    validation_failures: IntCounterVec,
    blocks_graded: IntCounterVec,
    grading_duration: Histogram,
}

impl GradingMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let records_validated = IntCounter::new(
            "oracle_records_validated_total",
            "Ledger entries that passed record validation",
        )?;
        let validation_failures = IntCounterVec::new(
            Opts::new(
                "oracle_validation_failures_total",
                "Ledger entries rejected by record validation, by reason",
            ),
            &["reason"],
        )?;
        let blocks_graded = IntCounterVec::new(
            Opts::new(
                "oracle_blocks_graded_total",
                "Blocks run through the grading pipeline, by final state",
            ),
            &["state"],
        )?;
        let grading_duration = Histogram::with_opts(HistogramOpts::new(
            "oracle_grading_duration_seconds",
            "Wall time of one block grading transaction",
        ))?;

        registry.register(Box::new(records_validated.clone()))?;
        registry.register(Box::new(validation_failures.clone()))?;
        registry.register(Box::new(blocks_graded.clone()))?;
        registry.register(Box::new(grading_duration.clone()))?;

        Ok(Self {
            records_validated,
            validation_failures,
            blocks_graded,
            grading_duration,
        })
    }

    pub fn increment_records_validated(&self) {
        self.records_validated.inc();
    }

    pub fn increment_validation_failures(&self, reason: &str) {
        self.validation_failures.with_label_values(&[reason]).inc();
    }

    pub fn increment_blocks_graded(&self, state: &str) {
        self.blocks_graded.with_label_values(&[state]).inc();
    }

    pub fn observe_grading_duration(&self, seconds: f64) {
        self.grading_duration.observe(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        let registry = Registry::new();
        let metrics = GradingMetrics::new(&registry).unwrap();

        metrics.increment_records_validated();
        metrics.increment_validation_failures("height");
        metrics.increment_blocks_graded("graded");
        metrics.observe_grading_duration(0.5);

        // Double registration against the same registry is an error.
        assert!(GradingMetrics::new(&registry).is_err());
    }
}
