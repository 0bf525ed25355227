/*!
 * Structured Tracing
 * Subscriber setup and timed operation spans using the tracing crate
 *
 * `log` records emitted by the scheduling policies are bridged into the
 * same subscriber.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Set to `1` or `true` for JSON output
pub const ENV_TRACE_JSON: &str = "SPOS_TRACE_JSON";

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SPOS_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns false when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Timed span around a kernel operation such as boot or a bounded run
pub struct OperationSpan {
    span: Span,
    start: Instant,
    id: u64,
}

impl OperationSpan {
    pub fn new(operation: &str) -> Self {
        let id = NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed);

        let span = span!(
            Level::DEBUG,
            "operation",
            id,
            operation,
            duration_us = tracing::field::Empty,
        );
        span.in_scope(|| debug!(operation, id, "operation started"));

        Self {
            span,
            start: Instant::now(),
            id,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run `f` inside the span
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    /// Record the elapsed time and close the span
    pub fn finish(self) -> u128 {
        let elapsed = self.start.elapsed().as_micros();
        self.span.record("duration_us", elapsed as u64);
        self.span
            .in_scope(|| debug!(duration_us = elapsed as u64, "operation finished"));
        elapsed
    }
}

#[inline]
pub fn span_operation(name: &str) -> OperationSpan {
    OperationSpan::new(name)
}
