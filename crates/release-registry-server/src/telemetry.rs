//! Log output for the server process

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Parse a filter such as `warn,release_registry_store=debug`
///
/// An unparsable filter is reported on stderr, since no subscriber exists yet,
/// and replaced by `info`.
fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?} ({}), logging at info", directives, e);
        EnvFilter::new("info")
    })
}

/// Install the global subscriber
///
/// `RUST_LOG` reaches this through `logging.level`; the environment is not
/// consulted again here.
pub fn init(logging: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(filter(&logging.level));
    let lines = fmt::layer()
        .with_target(logging.include_target)
        .with_thread_ids(logging.include_thread_ids);

    if logging.json_format {
        registry.with(lines.json().with_span_list(false)).init();
    } else {
        registry.with(lines).init();
    }
}
