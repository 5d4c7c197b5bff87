#![deny(missing_docs)]
//! Logging shared by the wordlens crates.
//!
//! Records are emitted through the `wl_*` macros. Every logger built from
//! [`workspace_config`] keeps only records whose target starts with
//! [`TARGET_PREFIX`], so reqwest/hyper chatter stays out of the session.

use simplelog::ConfigBuilder;

/// Module-path prefix of every wordlens crate.
pub const TARGET_PREFIX: &str = "wordlens";

/// Logger configuration that admits wordlens targets only.
pub fn workspace_config() -> ConfigBuilder {
    let mut builder = ConfigBuilder::new();
    builder.add_filter_allow_str(TARGET_PREFIX);
    builder
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! wl_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! wl_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! wl_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! wl_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! wl_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let config = workspace_config().build();

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
