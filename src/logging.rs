//! Tracing subscriber setup for the `kanban` binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "kanban_sync=debug,info" } else { "warn" }
}

/// Install a stderr subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool, json: bool) {
    let make_filter = || {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if json {
        let _ = tracing_subscriber::fmt()
            .json()
            .with_env_filter(make_filter())
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(make_filter())
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
