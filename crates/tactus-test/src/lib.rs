//! Testing harness for tactus gesture recognition.
//!
//! ```
//! use tactus_test::Harness;
//!
//! let mut harness = Harness::new();
//! harness
//!     .register("tap", Harness::ROOT)
//!     .tap(1, 10.0, 10.0, Harness::ROOT)
//!     .assert_emitted(&["tap"]);
//! ```

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

mod harness;

pub use harness::Harness;

/// Install a `tracing` subscriber for tests.
///
/// Honors `RUST_LOG`, defaulting to `tactus=debug`. Output goes through the
/// test writer so it is captured per test. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tactus=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
