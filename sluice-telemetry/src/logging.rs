//! ## sluice-telemetry::logging
//! **Structured logging through `tracing`**
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to every target.
//! Thread names are included since producers and managers run on named OS threads.

use tracing::{debug_span, Level};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Panics if one is already installed.
    pub fn init(level: &str) {
        fmt()
            .with_env_filter(Self::filter(level))
            .with_thread_names(true)
            .init()
    }

    /// Like [`init`](Self::init) but reports an already-installed subscriber instead of
    /// panicking.
    pub fn try_init(level: &str) -> Result<(), TryInitError> {
        use tracing_subscriber::util::SubscriberInitExt;

        fmt()
            .with_env_filter(Self::filter(level))
            .with_thread_names(true)
            .finish()
            .try_init()
    }

    fn filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }

    /// Records a transfer outcome against a resource.
    #[inline]
    pub fn log_transfer(resource: &str, system: &dyn std::fmt::Display, delta: i32, accepted: bool) {
        let span = debug_span!("transfer", resource, system = %system);
        let _entered = span.enter();

        if accepted {
            tracing::event!(Level::DEBUG, delta, "transfer applied");
        } else {
            tracing::event!(Level::DEBUG, delta, "transfer rejected");
        }
    }
}
