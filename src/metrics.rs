//! In-process statistics for the prediction service.

use crate::types::prediction::RiskLevel;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for served predictions
pub struct PredictionMetrics {
    /// Total successful predictions
    pub predictions_total: AtomicU64,
    /// Total failed prediction attempts
    pub failures_total: AtomicU64,
    /// Predictions by risk level
    by_risk_level: RwLock<HashMap<String, u64>>,
    /// Handler latencies (in microseconds)
    latencies_us: RwLock<Vec<u64>>,
    /// Disease probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for throughput calculation
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions_total: AtomicU64::new(0),
            failures_total: AtomicU64::new(0),
            by_risk_level: RwLock::new(HashMap::new()),
            latencies_us: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one successful prediction
    pub fn record_prediction(&self, latency: Duration, probability: f64, risk_level: RiskLevel) {
        self.predictions_total.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut latencies) = self.latencies_us.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only the most recent samples
            if latencies.len() > 10_000 {
                latencies.drain(0..5_000);
            }
        }

        if let Ok(mut by_level) = self.by_risk_level.write() {
            *by_level.entry(risk_level.as_str().to_string()).or_insert(0) += 1;
        }

        let bucket = (probability * 10.0).min(9.0).max(0.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a failed prediction attempt
    pub fn record_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency statistics over the retained samples
    pub fn get_latency_stats(&self) -> LatencyStats {
        let latencies = self.latencies_us.read().unwrap();
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = latencies.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Predictions per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_total.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_by_risk_level(&self) -> HashMap<String, u64> {
        self.by_risk_level.read().unwrap().clone()
    }

    pub fn get_probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Log a summary of everything recorded so far
    pub fn print_summary(&self) {
        let predictions = self.predictions_total.load(Ordering::Relaxed);
        let failures = self.failures_total.load(Ordering::Relaxed);
        let latency = self.get_latency_stats();
        let by_level = self.get_by_risk_level();
        let distribution = self.get_probability_distribution();

        info!(
            predictions = predictions,
            failures = failures,
            throughput = format!("{:.1}/s", self.get_throughput()),
            "Prediction service metrics"
        );
        info!(
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            p99_us = latency.p99_us,
            "Prediction latency (us)"
        );
        for (level, count) in &by_level {
            let pct = if predictions > 0 {
                (*count as f64 / predictions as f64) * 100.0
            } else {
                0.0
            };
            info!(risk_level = %level, count = count, pct = format!("{:.1}%", pct), "Risk level tally");
        }
        let total: u64 = distribution.iter().sum();
        if total > 0 {
            for (i, &count) in distribution.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                info!(
                    bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                    count = count,
                    "Probability bucket"
                );
            }
        }
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that logs a metrics summary while serving
pub struct MetricsReporter {
    metrics: std::sync::Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Run the periodic reporting loop
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick fires immediately; skip it so startup stays quiet
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
