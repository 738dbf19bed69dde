//! Observability wiring for the catalog service.
//!
//! # Purpose
//! Sets up structured logging, optional OTLP trace export, W3C trace context
//! propagation, and the Prometheus recorder with its `/metrics` listener.
//!
//! # Notes
//! Initialization is guarded by `OnceLock` so tests can call it repeatedly.
use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static SUBSCRIBER_INIT: OnceLock<()> = OnceLock::new();
static PROPAGATOR_INIT: OnceLock<()> = OnceLock::new();

/// Optional resource attributes: (environment variable, attribute key).
const RESOURCE_ENV: [(&str, &str); 2] = [
    ("DEPLOYMENT_ENVIRONMENT", "deployment.environment"),
    ("CLOUD_REGION", "cloud.region"),
];

/// Install logging, tracing and the metrics recorder.
///
/// Logging honours `RUST_LOG` and falls back to `info`. Spans are exported over
/// OTLP only when an exporter can be built.
pub fn init_observability(service_name: &str) -> anyhow::Result<PrometheusHandle> {
    SUBSCRIBER_INIT.get_or_init(|| {
        install_propagator();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        match build_tracer_provider(service_name) {
            Some(provider) => {
                let tracer = provider.tracer(service_name.to_string());
                let _ = registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init();
            }
            None => {
                let _ = registry.try_init();
            }
        }
    });

    install_metrics_recorder()
}

fn install_propagator() {
    PROPAGATOR_INIT.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());
    });
}

fn build_tracer_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    let resource = Resource::builder_empty()
        .with_attributes(resource_attributes(service_name))
        .build();
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn resource_attributes(service_name: &str) -> Vec<KeyValue> {
    let mut attrs = vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ];
    if let Ok(value) =
        std::env::var("CATALOG_SERVICE_INSTANCE_ID").or_else(|_| std::env::var("HOSTNAME"))
    {
        attrs.push(KeyValue::new("service.instance.id", value));
    }
    attrs.extend(RESOURCE_ENV.iter().filter_map(|(var, key)| {
        std::env::var(var)
            .ok()
            .map(|value| KeyValue::new(*key, value))
    }));
    attrs
}

/// Extract the caller's W3C trace context so request spans join its trace.
pub fn trace_context_from_headers(headers: &axum::http::HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|prop| prop.extract(&HeaderMapExtractor(headers)))
}

struct HeaderMapExtractor<'a>(&'a axum::http::HeaderMap);

impl Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn install_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install metrics recorder")?;
    describe_metrics();
    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

fn describe_metrics() {
    metrics::describe_gauge!("catalog_cars_total", "Number of cars in the catalog");
    metrics::describe_counter!(
        "catalog_cache_hits_total",
        "Catalog reads answered from the response cache"
    );
    metrics::describe_counter!(
        "catalog_cache_misses_total",
        "Catalog reads that had to be computed"
    );
    metrics::describe_counter!(
        "catalog_cache_evictions_total",
        "Cached responses dropped to stay under the entry cap"
    );
    metrics::describe_counter!(
        "catalog_cache_invalidations_total",
        "Cache invalidations triggered by catalog writes"
    );
}

/// Serve the Prometheus scrape endpoint on `addr` until the task is dropped.
pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "metrics listening");
    serve_metrics_with_listener(handle, listener, std::future::pending()).await
}

pub async fn serve_metrics_with_listener<F>(
    handle: PrometheusHandle,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}
