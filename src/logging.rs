//! Tracing setup for hosts embedding idaview.
//!
//! The library itself only emits events. A host that wants to see them
//! calls one of the initializers once; `RUST_LOG` selects the filter.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::core::AddressWidthMode;

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber with human-readable output.
///
/// Later calls, including to [`init_tracing_json`], are ignored.
pub fn init_tracing() {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter())
            .with(layer)
            .init();
        info!(width = %AddressWidthMode::ACTIVE, "idaview tracing initialized");
    });
}

/// Same as [`init_tracing`] with one JSON object per event.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_current_span(true);
        tracing_subscriber::registry()
            .with(env_filter())
            .with(layer)
            .init();
        info!(width = %AddressWidthMode::ACTIVE, json = true, "idaview tracing initialized");
    });
}

/// Log levels accepted from Python
#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[cfg(feature = "python-ext")]
#[pyo3::prelude::pymethods]
impl LogLevel {
    fn __str__(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyfunction]
#[pyo3(signature = (json=false))]
pub fn init_logging(json: bool) {
    if json {
        init_tracing_json();
    } else {
        init_tracing();
    }
}

/// Emit a Python message through the Rust subscriber.
#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyfunction]
pub fn log_message(level: LogLevel, message: &str) {
    match level {
        LogLevel::Trace => tracing::trace!(target: "idaview::python", "{message}"),
        LogLevel::Debug => tracing::debug!(target: "idaview::python", "{message}"),
        LogLevel::Info => tracing::info!(target: "idaview::python", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "idaview::python", "{message}"),
        LogLevel::Error => tracing::error!(target: "idaview::python", "{message}"),
    }
}

/// Enter a `debug` span for the rest of the enclosing block.
#[macro_export]
macro_rules! span_trace {
    ($name:expr $(, $($field:tt)*)?) => {
        let _span_guard = tracing::debug_span!($name $(, $($field)*)?).entered();
    };
}

/// Log a rejected input at `warn`, with optional leading fields, and
/// evaluate to the error.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let err = $err;
        tracing::warn!(error = %err, "rejected input");
        err
    }};
    ($err:expr, $($field:tt)+) => {{
        let err = $err;
        tracing::warn!($($field)+, error = %err, "rejected input");
        err
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarshalError;
    use tracing::trace;

    #[test]
    fn test_init_tracing_once() {
        init_tracing();
        init_tracing();
        init_tracing_json();
    }

    #[test]
    fn test_span_macro_scopes_block() {
        init_tracing();
        {
            span_trace!("member_walk", count = 3);
            trace!("inside span");
        }
        span_trace!("no_fields");
    }

    #[test]
    fn test_log_error_passes_error_through() {
        init_tracing();
        let err = log_error!(MarshalError::NullPointer { record: "op_t" });
        assert!(matches!(err, MarshalError::NullPointer { record: "op_t" }));
        let record = "struc_t";
        let err = log_error!(MarshalError::Config("bad".to_string()), record, needed = 4);
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
