//! `bookshelf-observability` — process-wide logging bootstrap.

mod tracing_setup;

pub use tracing_setup::{init, init_with_default};
