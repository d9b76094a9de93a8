//! Tracing setup.

use crate::config::TelemetryConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,chorus_engine=debug,chorus_llm=debug";

/// Install the global tracing subscriber.
///
/// Starts from `RUST_LOG` when set, otherwise from the default
/// directives, then forces the configured noisy targets off so transport
/// and HTTP internals stay quiet. Safe to call more than once; later
/// calls are no-ops.
pub fn init_tracing(config: &TelemetryConfig) {
    let mut filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_DIRECTIVES),
    };
    for target in &config.quiet_targets {
        match format!("{target}=off").parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => tracing::debug!(%target, %e, "skipping unparseable quiet target"),
        }
    }

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
