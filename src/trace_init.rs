//! Opt-in structured logging. Without the `trace` feature every `tracing`
//! call compiles away and [`init_tracing`] does nothing.

use std::path::Path;

/// File the subscriber appends to inside the log directory.
pub const TRACE_FILE: &str = "lattice-tagger-trace.jsonl";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "lattice_tagger=debug";

/// Install a JSON-lines subscriber writing decode spans to
/// `log_dir/`[`TRACE_FILE`]. Only the first call on a process takes effect.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) {
    use std::sync::Once;

    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, TRACE_FILE));
        // Dropping the guard stops the writer thread.
        std::mem::forget(guard);

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        // A subscriber installed by the host application wins.
        let _ = tracing_subscriber::fmt()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(filter)
            .try_init();
    });
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path) {}
