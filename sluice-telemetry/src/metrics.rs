//! ## sluice-telemetry::metrics
//! **Prometheus registry for queue and transfer activity**

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    pub events_pushed: prometheus::Counter,
    pub events_popped: prometheus::Counter,
    pub transfers_rejected: prometheus::Counter,
    pub request_latency: prometheus::Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let events_pushed = Counter::new("sluice_events_pushed_total", "Events queued")?;
        let events_popped = Counter::new("sluice_events_popped_total", "Events dequeued")?;
        let transfers_rejected = Counter::new(
            "sluice_transfers_rejected_total",
            "Transfers refused by a resource bound",
        )?;

        let request_latency = Histogram::with_opts(
            HistogramOpts::new(
                "sluice_request_latency_seconds",
                "Time from queuing a request to receiving its reply",
            )
            .buckets(vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2, 1e-1]),
        )?;

        registry.register(Box::new(events_pushed.clone()))?;
        registry.register(Box::new(events_popped.clone()))?;
        registry.register(Box::new(transfers_rejected.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;

        Ok(Self {
            registry,
            events_pushed,
            events_popped,
            transfers_rejected,
            request_latency,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    #[inline]
    pub fn inc_pushed(&self) {
        self.events_pushed.inc();
    }

    #[inline]
    pub fn inc_popped(&self) {
        self.events_popped.inc();
    }

    #[inline]
    pub fn inc_rejected(&self) {
        self.transfers_rejected.inc();
    }

    #[inline]
    pub fn observe_latency(&self, seconds: f64) {
        self.request_latency.observe(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_appear_in_exposition() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.inc_pushed();
        metrics.inc_pushed();
        metrics.inc_popped();
        metrics.inc_rejected();
        metrics.observe_latency(0.000_5);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("sluice_events_pushed_total 2"));
        assert!(text.contains("sluice_events_popped_total 1"));
        assert!(text.contains("sluice_transfers_rejected_total 1"));
        assert!(text.contains("sluice_request_latency_seconds_count 1"));
    }

    #[test]
    fn recorders_are_independent() {
        let first = MetricsRecorder::new().unwrap();
        let second = MetricsRecorder::new().unwrap();
        first.inc_pushed();
        assert_eq!(second.events_pushed.get(), 0.0);
    }
}
