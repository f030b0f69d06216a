use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "lingora_translation_cache_hit_total",
            Unit::Count,
            "Message tree resolutions served from the in-memory cache."
        );
        describe_counter!(
            "lingora_translation_cache_miss_total",
            Unit::Count,
            "Message cache lookups that found no fresh entry."
        );
        describe_counter!(
            "lingora_translation_cache_invalidate_total",
            Unit::Count,
            "Explicit message cache invalidations (single locale or all)."
        );
        describe_counter!(
            "lingora_translation_store_error_total",
            Unit::Count,
            "Resolutions that fell back to bundles because the store failed."
        );
        describe_counter!(
            "lingora_translation_bundle_fallback_total",
            Unit::Count,
            "Resolutions that used the default locale's bundle."
        );
        describe_histogram!(
            "lingora_translation_resolve_ms",
            Unit::Milliseconds,
            "Latency of building a message tree on a cache miss."
        );
    });
}
