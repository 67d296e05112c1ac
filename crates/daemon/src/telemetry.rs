//! Logging and optional OpenTelemetry export
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default `queueless=info,tower_http=info`)
//! - `QUEUELESS_LOG_FORMAT`: `pretty` or `json`, overrides `[log] format`
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g. http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: service name (default: queueless)

use crate::config::LogSettings;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "queueless=info,tower_http=info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps background log writers alive; flush with `shutdown`
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
    #[cfg(feature = "telemetry")]
    tracer_provider: Option<opentelemetry_sdk::trace::TracerProvider>,
}

impl TelemetryGuard {
    pub fn shutdown(self) {
        #[cfg(feature = "telemetry")]
        if let Some(provider) = &self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("OpenTelemetry shutdown failed: {e}");
            }
        }
    }
}

/// Install the global subscriber
pub fn init(settings: &LogSettings) -> Result<TelemetryGuard> {
    let format = std::env::var("QUEUELESS_LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    match format.as_str() {
        // Production: JSON structured logging
        "json" => layers.push(fmt::layer().json().boxed()),
        // Development: pretty formatting with colors
        _ => layers.push(fmt::layer().pretty().boxed()),
    }

    let file_guard = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "queueless.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    #[cfg(feature = "telemetry")]
    let tracer_provider = match otel_layer()? {
        Some((layer, provider)) => {
            layers.push(layer);
            Some(provider)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    #[cfg(not(feature = "telemetry"))]
    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        tracing::warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
        tracing::warn!("Rebuild with: cargo build --features telemetry");
    }

    Ok(TelemetryGuard {
        _file_guard: file_guard,
        #[cfg(feature = "telemetry")]
        tracer_provider,
    })
}

#[cfg(feature = "telemetry")]
fn otel_layer() -> Result<Option<(BoxedLayer, opentelemetry_sdk::trace::TracerProvider)>> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};

    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };
    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "queueless".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to build OTLP exporter")?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider.clone());

    let layer = tracing_opentelemetry::layer().with_tracer(tracer).boxed();
    Ok(Some((layer, provider)))
}
