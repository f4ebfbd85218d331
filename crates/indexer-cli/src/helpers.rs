//! Helper functions for CLI operations

/// Default log filter: the requested level, or `debug` when DEBUG is set
pub fn log_filter(log_level: &str, debug: bool) -> String {
    if debug {
        "debug".to_string()
    } else {
        log_level.to_string()
    }
}
