//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::{Duration, Instant};

/// Process-wide metrics registry
pub struct Metrics {
    registry: Registry,

    // Submission pipeline
    pub tx_submitted: IntCounter,
    pub tx_confirmed: IntCounter,
    pub tx_already_confirmed: IntCounter,
    pub tx_failed: IntCounter,

    // State reader, labelled by outcome: found / absent / error
    pub account_fetches: IntCounterVec,

    // Histograms
    pub submit_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let tx_submitted = IntCounter::with_opts(Opts::new(
            "staking_tx_submitted_total",
            "Transactions broadcast to the network",
        ))?;

        let tx_confirmed = IntCounter::with_opts(Opts::new(
            "staking_tx_confirmed_total",
            "Transactions confirmed at confirmed commitment",
        ))?;

        let tx_already_confirmed = IntCounter::with_opts(Opts::new(
            "staking_tx_already_confirmed_total",
            "Raw submissions skipped because the signature was already confirmed",
        ))?;

        let tx_failed = IntCounter::with_opts(Opts::new(
            "staking_tx_failed_total",
            "Transactions that failed to broadcast or confirm",
        ))?;

        let account_fetches = IntCounterVec::new(
            Opts::new("staking_account_fetches_total", "Program account reads"),
            &["account", "outcome"],
        )?;

        let submit_latency = Histogram::with_opts(
            HistogramOpts::new(
                "staking_submit_latency_seconds",
                "Broadcast to confirmation latency",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(tx_submitted.clone()))?;
        registry.register(Box::new(tx_confirmed.clone()))?;
        registry.register(Box::new(tx_already_confirmed.clone()))?;
        registry.register(Box::new(tx_failed.clone()))?;
        registry.register(Box::new(account_fetches.clone()))?;
        registry.register(Box::new(submit_latency.clone()))?;

        Ok(Self {
            registry,
            tx_submitted,
            tx_confirmed,
            tx_already_confirmed,
            tx_failed,
            account_fetches,
            submit_latency,
        })
    }

    /// Record a state reader outcome
    pub fn record_fetch(&self, account: &str, outcome: &str) {
        self.account_fetches
            .with_label_values(&[account, outcome])
            .inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather_text(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record the elapsed time into `histogram` and return it
    pub fn observe_duration(&self, histogram: &Histogram) -> Duration {
        let elapsed = self.start.elapsed();
        histogram.observe(elapsed.as_secs_f64());
        elapsed
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
