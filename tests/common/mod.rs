//! Shared setup for integration tests.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Guard for one-time setup.
static TEST_SETUP: Once = Once::new();

/// Installs a log subscriber once per test binary.
///
/// Filter with `RUST_LOG` (e.g. `RUST_LOG=arborea=trace`). Defaults to
/// debug events of this crate.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arborea=debug"));
        // Another harness may have installed a global subscriber already.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer().with_target(true))
            .with(env_filter)
            .try_init();
    });
}
