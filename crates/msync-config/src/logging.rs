//! Structured logging for the two peer roles plus reconciliation, in the
//! shape of component-scoped macros rather than ad hoc `tracing::info!`
//! calls scattered through the crates.

/// Component identifiers, attached to every log record for filtering.
pub struct Component;

impl Component {
    pub const SOURCE: &'static str = "SOURCE";
    pub const TARGET: &'static str = "TARGET";
    pub const RECONCILE: &'static str = "RECONCILE";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Initialize the global tracing subscriber. Call once at binary startup;
/// `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

#[macro_export]
macro_rules! log_source_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "SOURCE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_source_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "SOURCE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_source_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "SOURCE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_target_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "TARGET", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_target_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "TARGET", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_target_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "TARGET", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_reconcile_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "RECONCILE", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_reconcile_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "RECONCILE", $($key = $value,)* $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_constants_match_their_names() {
        assert_eq!(Component::SOURCE, "SOURCE");
        assert_eq!(Component::TARGET, "TARGET");
        assert_eq!(Component::RECONCILE, "RECONCILE");
    }
}
