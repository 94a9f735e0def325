use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,hridayai=debug";

/// Install the global subscriber. Logs go to stderr so stdout stays free
/// for the chat transcript.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
