use tracing_subscriber::{
    fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Log filter for the gdl crates; `RUST_LOG` takes precedence when set.
pub fn get_log_env(log_level: String) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("gdl={},gdl_api={}", log_level, log_level))
    })
}

pub fn init_global_logger(log_level: String) {
    let filter = get_log_env(log_level);
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().pretty().with_span_events(FmtSpan::NONE));

    if let Err(err) = subscriber.try_init() {
        // a global subscriber was already installed, e.g. by another test
        tracing::debug!("Global logger already initialised: {}", err);
    }
}

pub fn global_info_logger() {
    init_global_logger("INFO".to_string())
}

pub fn global_debug_logger() {
    init_global_logger("DEBUG".to_string())
}

pub fn global_trace_logger() {
    init_global_logger("TRACE".to_string())
}
