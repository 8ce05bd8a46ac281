//! Shared `OpenTelemetry` metrics initialisation.
//!
//! Compiled only when the `metrics` Cargo feature is enabled. Sets up the
//! OTLP exporter for traces and metrics so the daemon can ship telemetry to
//! a collector alongside its regular logs.

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

/// Errors from telemetry pipeline initialisation.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to build an OTLP exporter.
    #[error("failed to build OTLP exporter: {0}")]
    ExporterBuild(#[from] opentelemetry_otlp::ExporterBuildError),

    /// Failed during `OTel` SDK shutdown or flush.
    #[error("OpenTelemetry SDK error: {0}")]
    Sdk(#[from] opentelemetry_sdk::error::OTelSdkError),
}

/// Handle that keeps the `OpenTelemetry` providers alive.
///
/// Dropping the guard does not shut the providers down; call
/// [`MetricsGuard::shutdown`] for a graceful flush before exiting.
pub struct MetricsGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl MetricsGuard {
    /// Gracefully shut down both providers, flushing buffered telemetry.
    ///
    /// # Errors
    ///
    /// Returns an error if either provider fails to shut down cleanly.
    pub fn shutdown(self) -> Result<(), MetricsError> {
        self.tracer_provider.shutdown()?;
        self.meter_provider.shutdown()?;
        Ok(())
    }
}

/// Initialise the `OpenTelemetry` OTLP pipeline for traces and metrics.
///
/// * `endpoint` -- OTLP receiver URL, e.g. `"http://localhost:4317"` (gRPC).
///
/// The returned [`MetricsGuard`] must live for the lifetime of the process;
/// call [`MetricsGuard::shutdown`] before exit.
///
/// # Errors
///
/// Returns [`MetricsError`] if the OTLP exporters cannot be constructed.
pub fn init_metrics(endpoint: &str) -> Result<MetricsGuard, MetricsError> {
    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .build();

    global::set_meter_provider(meter_provider.clone());

    Ok(MetricsGuard {
        tracer_provider,
        meter_provider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn init_metrics_does_not_panic() {
        // A dummy endpoint is enough: the pipeline only fails at send-time,
        // which never happens in tests without a collector.
        let guard = init_metrics("http://localhost:4317").unwrap();
        guard.shutdown().unwrap();
    }
}
