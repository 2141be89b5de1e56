use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for integration tests.
///
/// Wrapped in a `Once` block so the global subscriber is set exactly one
/// time, even when tests run in parallel. Unit tests inside the crate use
/// `tracing_test::traced_test` instead, which installs its own global
/// subscriber, so the two must not be mixed in one test binary.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Returns true when the current process runs as root (UID 0).
/// Permission-sensitive tests are skipped in that case, since root can read
/// anything regardless of mode bits.
#[cfg(any(test, doctest))]
#[inline]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: libc call has no side effects; used for testing only.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
