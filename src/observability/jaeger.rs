//! Jaeger backend adapter: OTLP over gRPC to the agent.

use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;

use crate::observability::config::{TracerConfig, ENVIRONMENT_KEY};
use crate::observability::sampler::build_sampler;
use crate::observability::TracerError;

const DEFAULT_AGENT_PORT: &str = "4317";

pub(crate) fn init(config: &TracerConfig) -> Result<SdkTracerProvider, TracerError> {
    let port = if config.agent_port.is_empty() {
        DEFAULT_AGENT_PORT
    } else {
        &config.agent_port
    };
    let endpoint = format!("http://{}:{}", config.agent_host, port);

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .map_err(|e| {
            tracing::error!(
                tracer = "jaeger",
                endpoint = %endpoint,
                error = %e,
                "Error when initializing span exporter"
            );
            TracerError::Exporter(e.to_string())
        })?;

    let resource = Resource::builder()
        .with_attribute(KeyValue::new(SERVICE_NAME, config.service_name.clone()))
        .with_attribute(KeyValue::new(
            ENVIRONMENT_KEY,
            config.environment().to_string(),
        ))
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(build_sampler(config.sampler, &config.sampler_value))
        .with_resource(resource)
        .build())
}
