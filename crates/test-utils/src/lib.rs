//! Shared fixtures for the `splitscript` integration tests: temp projects,
//! a scripted process backend and an in-memory listener loader.

pub mod builders;
pub mod fake_backend;
pub mod fake_loader;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

pub use builders::{Project, ProjectBuilder};
pub use fake_backend::{BackendCall, FakeProcessBackend};
pub use fake_loader::InMemoryLoader;

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Install a per-test captured subscriber once per binary.
///
/// Output only shows for failing tests; `RUST_LOG=splitscript=debug` widens it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("splitscript=info,warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}

/// Await `f`, panicking if it outlives [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step exceeded {TEST_TIMEOUT:?}"),
    }
}
