//! Metrics collection and Prometheus integration service.

use prometheus::{Counter, CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::{Duration, Instant};

/// Application metrics collector for Prometheus integration
#[derive(Clone)]
pub struct AppMetrics {
    pub registry: Registry,
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    /// Generation outcomes by entry point (http / rpc) and result
    pub generation_requests_total: CounterVec,
    /// Rate-limit denials by scope (ip / user)
    pub rate_limited_total: CounterVec,
    /// Usage log writes that failed and were swallowed
    pub usage_log_failures_total: Counter,
    /// Entries removed by the retention sweep
    pub retention_deleted_total: Counter,
    pub app_uptime_seconds: Gauge,
    pub start_time: Instant,
}

impl AppMetrics {
    /// Create a new metrics collector with default Prometheus metrics
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // HTTP request counter by method, status, and route
        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "status", "route"],
        )?;

        // HTTP request duration histogram
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?;

        let generation_requests_total = CounterVec::new(
            Opts::new(
                "generation_requests_total",
                "Generation requests by entry point and outcome",
            ),
            &["entry_point", "outcome"],
        )?;

        let rate_limited_total = CounterVec::new(
            Opts::new("rate_limited_total", "Requests denied by a rate limiter"),
            &["scope"],
        )?;

        let usage_log_failures_total = Counter::new(
            "usage_log_failures_total",
            "Usage log writes that failed and were swallowed",
        )?;

        let retention_deleted_total = Counter::new(
            "retention_deleted_total",
            "Usage log entries removed by the retention sweep",
        )?;

        let app_uptime_seconds = Gauge::new("app_uptime_seconds", "Application uptime in seconds")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(generation_requests_total.clone()))?;
        registry.register(Box::new(rate_limited_total.clone()))?;
        registry.register(Box::new(usage_log_failures_total.clone()))?;
        registry.register(Box::new(retention_deleted_total.clone()))?;
        registry.register(Box::new(app_uptime_seconds.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            generation_requests_total,
            rate_limited_total,
            usage_log_failures_total,
            retention_deleted_total,
            app_uptime_seconds,
            start_time: Instant::now(),
        })
    }

    /// Record an HTTP request with method, route, status, and duration
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        if route == "/metrics" {
            // Don't record metrics for the metrics endpoint itself to avoid noise
            return;
        }

        self.http_requests_total
            .with_label_values(&[method, &status.to_string(), route])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    /// Update the application uptime gauge
    pub fn update_uptime(&self) {
        let uptime = self.start_time.elapsed().as_secs_f64();
        self.app_uptime_seconds.set(uptime);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = AppMetrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_record_request_skips_metrics_route() {
        let metrics = AppMetrics::new().unwrap();
        metrics.record_request("GET", "/metrics", 200, Duration::from_millis(1));
        metrics.record_request("POST", "/generate", 200, Duration::from_millis(5));

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("/generate"));
        assert!(!rendered.contains("route=\"/metrics\""));
    }
}
