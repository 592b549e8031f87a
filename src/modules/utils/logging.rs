use env_logger::{Builder, WriteStyle};
use log::{error, info, warn, LevelFilter};
use std::fs::OpenOptions;

/// Initialize logging to an append-only log file
pub fn initialize_logging(
    log_file: &str,
    level: LevelFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    Builder::new()
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;

    info!("Logging system initialized");
    Ok(())
}

/// Mask all but the edges of a sensitive value
fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured log line for a register/login event
pub fn log_auth_event(event_type: &str, username: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Auth event: type={}, user={}, success=true, timestamp={}, details={:?}",
            event_type,
            format_sensitive(username),
            timestamp,
            details
        );
    } else {
        warn!(
            "Auth event: type={}, user={}, success=false, timestamp={}, details={:?}",
            event_type,
            format_sensitive(username),
            timestamp,
            details
        );
    }
}

/// Transform failures point at the environment, not the user
pub fn log_internal_fault(operation: &str, username: &str, fault: &dyn std::error::Error) {
    error!(
        "Internal fault: op={}, user={}, error={}",
        operation,
        format_sensitive(username),
        fault
    );
}

/// Store file load/save outcome
pub fn log_store_operation(operation: &str, path: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            "Store operation: op={}, path={}, success=true, details={:?}",
            operation, path, details
        );
    } else {
        error!(
            "Store operation: op={}, path={}, success=false, details={:?}",
            operation, path, details
        );
    }
}
