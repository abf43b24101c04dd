//! Observability - structured logging setup.

mod logging;

pub use logging::{LoggingConfig, init_tracing};
