//! Adaptive batch-size optimizer (spec §4.12): scales batch size and
//! worker concurrency up when throughput is healthy, down otherwise.

use serde::{Deserialize, Serialize};

pub const MIN_BATCH_SIZE: u32 = 10;
pub const MAX_BATCH_SIZE: u32 = 1000;
pub const MIN_CONCURRENCY: u32 = 1;
pub const MAX_CONCURRENCY: u32 = 50;

const STEP_FRACTION: f64 = 0.25;
const SCALE_UP_DURATION_FRACTION: f64 = 0.6;
const SCALE_UP_ERROR_RATE: f64 = 0.02;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecentPerformance {
    pub avg_duration_seconds: f64,
    pub error_rate: f64,
    pub sample_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, base_backoff_ms: 1_000, max_backoff_ms: 30_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub max_concurrency: u32,
    pub retry_config: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSizeDecision {
    pub optimized_batch_size: u32,
    pub concurrency: ConcurrencyConfig,
}

/// `(processing_type, target_latency_seconds, current_batch_size)` plus
/// recent performance → `(optimized_batch_size, concurrency_config)`
/// (spec §4.12). With no performance samples yet, holds steady.
pub fn optimize_batch_size(
    target_latency_seconds: f64,
    current_batch_size: u32,
    current_concurrency: u32,
    recent: Option<RecentPerformance>,
) -> BatchSizeDecision {
    let current = current_batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
    let concurrency = current_concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);

    let Some(perf) = recent.filter(|p| p.sample_count > 0) else {
        return BatchSizeDecision {
            optimized_batch_size: current,
            concurrency: ConcurrencyConfig { max_concurrency: concurrency, retry_config: RetryConfig::default() },
        };
    };

    let healthy = perf.avg_duration_seconds < SCALE_UP_DURATION_FRACTION * target_latency_seconds
        && perf.error_rate < SCALE_UP_ERROR_RATE;

    let step = ((current as f64) * STEP_FRACTION).round().max(1.0) as u32;
    let next_size =
        if healthy { current.saturating_add(step) } else { current.saturating_sub(step) };
    let next_concurrency =
        if healthy { concurrency.saturating_add(1) } else { concurrency.saturating_sub(1) };

    BatchSizeDecision {
        optimized_batch_size: next_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE),
        concurrency: ConcurrencyConfig {
            max_concurrency: next_concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY),
            retry_config: RetryConfig::default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_up_when_fast_and_low_error() {
        let decision = optimize_batch_size(
            100.0,
            100,
            5,
            Some(RecentPerformance { avg_duration_seconds: 50.0, error_rate: 0.0, sample_count: 20 }),
        );
        assert!(decision.optimized_batch_size > 100);
        assert_eq!(decision.concurrency.max_concurrency, 6);
    }

    #[test]
    fn scales_down_when_slow() {
        let decision = optimize_batch_size(
            100.0,
            100,
            5,
            Some(RecentPerformance { avg_duration_seconds: 90.0, error_rate: 0.0, sample_count: 20 }),
        );
        assert!(decision.optimized_batch_size < 100);
    }

    #[test]
    fn scales_down_when_error_rate_high_even_if_fast() {
        let decision = optimize_batch_size(
            100.0,
            100,
            5,
            Some(RecentPerformance { avg_duration_seconds: 10.0, error_rate: 0.10, sample_count: 20 }),
        );
        assert!(decision.optimized_batch_size < 100);
    }

    #[test]
    fn clamps_to_bounds() {
        let decision = optimize_batch_size(
            100.0,
            MAX_BATCH_SIZE,
            MAX_CONCURRENCY,
            Some(RecentPerformance { avg_duration_seconds: 1.0, error_rate: 0.0, sample_count: 5 }),
        );
        assert_eq!(decision.optimized_batch_size, MAX_BATCH_SIZE);
        assert_eq!(decision.concurrency.max_concurrency, MAX_CONCURRENCY);
    }

    #[test]
    fn no_samples_yet_holds_steady() {
        let decision = optimize_batch_size(100.0, 200, 10, None);
        assert_eq!(decision.optimized_batch_size, 200);
        assert_eq!(decision.concurrency.max_concurrency, 10);
    }
}
