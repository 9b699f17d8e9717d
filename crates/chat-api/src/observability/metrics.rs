//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const KNOWN_ROUTES: [&str; 3] = ["/updates", "/healthcheck", "/metrics"];

#[derive(Debug)]
struct ChatMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    updates_total: IntCounterVec,
    update_duration_seconds: HistogramVec,
    replies_total: IntCounter,
    deliveries_total: IntCounterVec,
}

static CHAT_METRICS: OnceLock<Option<ChatMetrics>> = OnceLock::new();

/// Result of handing one reply to the messaging gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeliveryOutcome {
    Delivered,
    Failed,
}

impl DeliveryOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();
            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, path: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let route = route_label(path);
    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Record one chat update handled by the storefront.
pub(crate) fn observe_update(kind: &str, replies: usize, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    metrics.updates_total.with_label_values(&[kind]).inc();

    metrics
        .update_duration_seconds
        .with_label_values(&[kind])
        .observe(duration_seconds);

    metrics
        .replies_total
        .inc_by(u64::try_from(replies).unwrap_or(u64::MAX));
}

/// Record the outcome of one reply delivery.
pub(crate) fn observe_delivery(outcome: DeliveryOutcome) {
    if let Some(metrics) = metrics() {
        metrics
            .deliveries_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static ChatMetrics> {
    CHAT_METRICS.get_or_init(build_metrics).as_ref()
}

fn build_metrics() -> Option<ChatMetrics> {
    match try_build_metrics() {
        Ok(metrics) => Some(metrics),
        Err(source) => {
            error!("failed to build metrics registry: {source}");

            None
        }
    }
}

fn try_build_metrics() -> Result<ChatMetrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new(
            "grocer_chat_http_requests_total",
            "Total HTTP requests partitioned by method, route, status class, and status code.",
        ),
        &["method", "route", "status_class", "status_code"],
    )?;

    let request_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "grocer_chat_http_request_duration_seconds",
            "HTTP request duration in seconds partitioned by method and route.",
        )
        .buckets(vec![
            0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "route"],
    )?;

    let requests_in_flight = IntGauge::with_opts(Opts::new(
        "grocer_chat_http_requests_in_flight",
        "Current number of in-flight HTTP requests.",
    ))?;

    let updates_total = IntCounterVec::new(
        Opts::new(
            "grocer_chat_updates_total",
            "Chat updates handled, partitioned by message kind.",
        ),
        &["kind"],
    )?;

    let update_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "grocer_chat_update_duration_seconds",
            "Time spent handling one chat update, reply delivery included.",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["kind"],
    )?;

    let replies_total = IntCounter::new(
        "grocer_chat_replies_total",
        "Replies produced by the storefront.",
    )?;

    let deliveries_total = IntCounterVec::new(
        Opts::new(
            "grocer_chat_deliveries_total",
            "Reply deliveries to the messaging gateway, partitioned by outcome.",
        ),
        &["outcome"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration_seconds.clone()))?;
    registry.register(Box::new(requests_in_flight.clone()))?;
    registry.register(Box::new(updates_total.clone()))?;
    registry.register(Box::new(update_duration_seconds.clone()))?;
    registry.register(Box::new(replies_total.clone()))?;
    registry.register(Box::new(deliveries_total.clone()))?;

    Ok(ChatMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        updates_total,
        update_duration_seconds,
        replies_total,
        deliveries_total,
    })
}

fn route_label(path: &str) -> &'static str {
    KNOWN_ROUTES
        .into_iter()
        .find(|route| *route == path)
        .unwrap_or("other")
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
