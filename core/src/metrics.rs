// core/src/metrics.rs
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Operation counters for the JSON/Python surface. The engine itself never
/// reads them.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    operations: IntCounterVec,
    warnings: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let operations = IntCounterVec::new(
            Opts::new("gpxify_operations_total", "Engine operations by outcome"),
            &["operation", "outcome"],
        )?;
        let warnings = IntCounterVec::new(
            Opts::new("gpxify_warnings_total", "Data quality warnings attached to results"),
            &["operation"],
        )?;
        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(warnings.clone()))?;
        Ok(Self { registry, operations, warnings })
    }

    pub fn record(&self, operation: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.operations.with_label_values(&[operation, outcome]).inc();
    }

    pub fn record_warnings(&self, operation: &str, count: usize) {
        if count > 0 {
            self.warnings.with_label_values(&[operation]).inc_by(count as u64);
        }
    }

    pub fn operations_total(&self, operation: &str, outcome: &str) -> u64 {
        self.operations.with_label_values(&[operation, outcome]).get()
    }

    pub fn warnings_total(&self, operation: &str) -> u64 {
        self.warnings.with_label_values(&[operation]).get()
    }

    /// Prometheus text exposition of every counter.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
