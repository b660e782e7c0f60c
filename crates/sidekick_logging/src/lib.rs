#![deny(missing_docs)]
//! Logging macros for the sidekick workspace.
//!
//! Standard output carries the host protocol (`OMNIBOX_RESULTS:`, `LUA:`,
//! `STATUS:` and `ai_response` lines), so nothing in this crate ever writes
//! there. The macros only forward to the `log` facade; the binary decides
//! where records end up.

/// Fine-grained tracing, e.g. per-rule omnibox decisions.
#[macro_export]
macro_rules! sidekick_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Lifecycle events: settings loaded, conversion done, input closed.
#[macro_export]
macro_rules! sidekick_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Per-message detail, such as discarded input lines and emitted replies.
#[macro_export]
macro_rules! sidekick_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Recoverable trouble: a failed conversion, a stopped worker.
#[macro_export]
macro_rules! sidekick_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// The host can no longer be reached.
#[macro_export]
macro_rules! sidekick_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Installs a stderr logger for tests, keeping stdout free for protocol
/// assertions.
///
/// Safe to call from every test; only the first call installs a logger.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
