use std::time::{Duration, Instant};

use tracing::{info, warn};
use youtrack_domain::Result;

pub const TARGET: &str = "youtrack_macro::telemetry";

pub fn timed<T>(op: &str, key: Option<&str>, operation: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let result = operation();
    match &result {
        Ok(_) => emit_success(op, key, started.elapsed()),
        Err(error) => emit_failure(op, key, started.elapsed(), &error.to_string()),
    }
    result
}

pub fn emit_success(op: &str, key: Option<&str>, elapsed: Duration) {
    info!(
        target: TARGET,
        op,
        key = key.unwrap_or("-"),
        status = "ok",
        duration_ms = duration_ms(elapsed),
        "operation finished"
    );
}

pub fn emit_failure(op: &str, key: Option<&str>, elapsed: Duration, error: &str) {
    warn!(
        target: TARGET,
        op,
        key = key.unwrap_or("-"),
        status = "error",
        duration_ms = duration_ms(elapsed),
        error,
        "operation failed"
    );
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
