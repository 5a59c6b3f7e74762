use std::fmt;

use tokio::time::Instant;

/// Latency figures for one reporting window, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub qps: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    NoResponses { elapsed_secs: f64 },
    Summary(WindowSummary),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::NoResponses { elapsed_secs } => {
                write!(f, "No responses in last {elapsed_secs:.2}s")
            }
            Report::Summary(s) => write!(
                f,
                "QPS: {:.1}, avg: {:.1}ms, min: {:.1}ms, max: {:.1}ms, p95: {:.1}ms",
                s.qps,
                s.avg * 1000.0,
                s.min * 1000.0,
                s.max * 1000.0,
                s.p95 * 1000.0,
            ),
        }
    }
}

/// Accumulates per-cycle latency samples and summarizes them window by
/// window. Samples are append-only; the report cursors slice out whatever
/// arrived since the previous report.
#[derive(Debug)]
pub struct Stats {
    latencies: Vec<f64>,
    failed_cycles: u64,
    last_report: Instant,
    last_count: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            latencies: Vec::new(),
            failed_cycles: 0,
            last_report: Instant::now(),
            last_count: 0,
        }
    }

    /// Appends one sample, in seconds. No validation.
    pub fn record(&mut self, latency_secs: f64) {
        self.latencies.push(latency_secs);
    }

    /// Failed cycles never count toward throughput; only tallied.
    pub fn record_failure(&mut self) {
        self.failed_cycles += 1;
    }

    pub fn failed_cycles(&self) -> u64 {
        self.failed_cycles
    }

    pub fn sample_count(&self) -> usize {
        self.latencies.len()
    }

    /// Summarizes the samples recorded since the previous report. Returns
    /// `None` when called again within a second; the cursors are only
    /// advanced on a non-`None` return, so early polls cannot lose samples.
    pub fn report(&mut self) -> Option<Report> {
        let now = Instant::now();
        let elapsed = (now - self.last_report).as_secs_f64();
        if elapsed < 1.0 {
            return None;
        }

        let window_count = self.latencies.len() - self.last_count;
        self.last_count = self.latencies.len();
        self.last_report = now;

        if window_count == 0 {
            return Some(Report::NoResponses {
                elapsed_secs: elapsed,
            });
        }

        let window = &self.latencies[self.latencies.len() - window_count..];
        let avg = window.iter().sum::<f64>() / window.len() as f64;
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let p95 = if window.len() >= 20 {
            twenty_quantile_p95(window)
        } else {
            // Below 20 samples the 95th percentile approximates to the mean.
            // Kept as-is for output compatibility across implementations.
            avg
        };

        Some(Report::Summary(WindowSummary {
            qps: window_count as f64 / elapsed,
            avg,
            min,
            max,
            p95,
        }))
    }
}

/// Cut point 18 of a 20-quantile split (exclusive method): sort, then
/// interpolate around rank 19 * (len + 1) / 20.
fn twenty_quantile_p95(window: &[f64]) -> f64 {
    const N: usize = 20;
    const I: usize = N - 1;

    let mut sorted = window.to_vec();
    sorted.sort_by(f64::total_cmp);

    let ld = sorted.len();
    let m = ld + 1;
    let mut j = I * m / N;
    let mut delta = I * m % N;
    if j < 1 {
        j = 1;
        delta = 0;
    } else if j > ld - 1 {
        j = ld - 1;
        delta = N;
    }

    (sorted[j - 1] * (N - delta) as f64 + sorted[j] * delta as f64) / N as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn it_returns_none_before_one_second() {
        let mut stats = Stats::new();
        stats.record(0.005);

        tokio::time::advance(Duration::from_millis(900)).await;

        assert!(stats.report().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn it_reports_no_responses_with_elapsed() {
        let mut stats = Stats::new();

        tokio::time::advance(Duration::from_millis(1500)).await;

        let report = stats.report().expect("report after 1.5s");
        assert_eq!("No responses in last 1.50s", report.to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn it_qps_is_window_count_over_elapsed() {
        let mut stats = Stats::new();
        for _ in 0..7 {
            stats.record(0.010);
        }

        tokio::time::advance(Duration::from_secs(2)).await;

        match stats.report() {
            Some(Report::Summary(s)) => assert_eq!(3.5, s.qps),
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn it_small_window_p95_falls_back_to_mean() {
        let mut stats = Stats::new();
        for i in 1..=10 {
            stats.record(i as f64 / 1000.0);
        }

        tokio::time::advance(Duration::from_secs(1)).await;

        match stats.report() {
            Some(Report::Summary(s)) => assert_eq!(s.avg, s.p95),
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn it_large_window_p95_is_the_eighteenth_cut_point() {
        let mut stats = Stats::new();
        // recorded out of order; the quantile split sorts its own copy
        for i in (1..=20).rev() {
            stats.record(i as f64);
        }

        tokio::time::advance(Duration::from_secs(1)).await;

        match stats.report() {
            Some(Report::Summary(s)) => {
                // rank 19 * 21 / 20 = 19 rem 19: (19 * 1 + 20 * 19) / 20
                assert_eq!(399.0 / 20.0, s.p95);
                assert_eq!(1.0, s.min);
                assert_eq!(20.0, s.max);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn it_formats_the_summary_line() {
        let mut stats = Stats::new();
        for i in 1..=4 {
            stats.record(i as f64 / 1000.0);
        }

        tokio::time::advance(Duration::from_secs(1)).await;

        let line = stats.report().expect("summary").to_string();
        insta::assert_snapshot!(line, @"QPS: 4.0, avg: 2.5ms, min: 1.0ms, max: 4.0ms, p95: 2.5ms");
    }

    #[tokio::test(start_paused = true)]
    async fn it_never_rolls_the_cursor_back() {
        let mut stats = Stats::new();
        stats.record(0.010);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(stats.report().is_some());

        // recorded between two report calls; the early poll must neither
        // report it nor drop it from the next window
        stats.record(0.020);
        assert!(stats.report().is_none());

        tokio::time::advance(Duration::from_secs(1)).await;
        match stats.report() {
            Some(Report::Summary(s)) => {
                assert_eq!(1.0, s.qps);
                assert_eq!(0.020, s.min);
                assert_eq!(0.020, s.max);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn it_keeps_failures_out_of_the_window() {
        let mut stats = Stats::new();
        stats.record_failure();
        stats.record_failure();

        tokio::time::advance(Duration::from_secs(1)).await;

        assert_eq!(2, stats.failed_cycles());
        match stats.report() {
            Some(Report::NoResponses { .. }) => {}
            other => panic!("expected no-responses notice, got {other:?}"),
        }
    }
}
