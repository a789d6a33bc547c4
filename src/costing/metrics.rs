// Performance Metrics for the costing engine
//
// Counts analyses, price adjustments and saves, and flags analyses that run
// slower than expected.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use utoipa::ToSchema;

/// Performance threshold for slow analyses (100ms)
const SLOW_OPERATION_THRESHOLD_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    analyses: AtomicU64,
    total_analysis_time_us: AtomicU64,
    slow_analyses: AtomicU64,

    adjustments: AtomicU64,
    saves: AtomicU64,
    failed_saves: AtomicU64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Start timing an analysis; the duration is recorded when the timer drops
    pub fn start_analysis(&self) -> OperationTimer {
        OperationTimer {
            start: Instant::now(),
            metrics: self.clone(),
        }
    }

    fn record_analysis(&self, duration: Duration) {
        self.inner.analyses.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_analysis_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if duration.as_millis() as u64 > SLOW_OPERATION_THRESHOLD_MS {
            self.inner.slow_analyses.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow cost analysis: {}ms", duration.as_millis());
        }
    }

    pub fn record_adjustment(&self) {
        self.inner.adjustments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save(&self, success: bool) {
        if success {
            self.inner.saves.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.failed_saves.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Average analysis time in milliseconds
    pub fn avg_analysis_time_ms(&self) -> f64 {
        let count = self.inner.analyses.load(Ordering::Relaxed);
        let total_us = self.inner.total_analysis_time_us.load(Ordering::Relaxed);

        if count == 0 {
            0.0
        } else {
            (total_us as f64 / count as f64) / 1000.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            analyses: self.inner.analyses.load(Ordering::Relaxed),
            avg_analysis_time_ms: self.avg_analysis_time_ms(),
            slow_analyses: self.inner.slow_analyses.load(Ordering::Relaxed),
            adjustments: self.inner.adjustments.load(Ordering::Relaxed),
            saves: self.inner.saves.load(Ordering::Relaxed),
            failed_saves: self.inner.failed_saves.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            "Costing metrics: {} analyses (avg {:.2}ms, {} slow), {} adjustments, {} saves, {} failed saves",
            summary.analyses,
            summary.avg_analysis_time_ms,
            summary.slow_analyses,
            summary.adjustments,
            summary.saves,
            summary.failed_saves,
        );
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer for one analysis run
pub struct OperationTimer {
    start: Instant,
    metrics: PerformanceMetrics,
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.metrics.record_analysis(self.start.elapsed());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricsSummary {
    pub analyses: u64,
    pub avg_analysis_time_ms: f64,
    pub slow_analyses: u64,
    pub adjustments: u64,
    pub saves: u64,
    pub failed_saves: u64,
}
