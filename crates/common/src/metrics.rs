use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static PHOTOS_STORED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "clientes_photos_stored_total",
        "Total photo files written to the upload directory"
    )
    .expect("register photos_stored_total")
});

pub static PHOTOS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "clientes_photos_deleted_total",
        "Total photo files removed from the upload directory"
    )
    .expect("register photos_deleted_total")
});

pub static PLACEHOLDER_SERVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "clientes_placeholder_served_total",
        "Total photo loads answered with the placeholder image"
    )
    .expect("register placeholder_served_total")
});

pub static CLIENTE_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "clientes_operations_total",
        "Cliente operations by kind and outcome",
        &["operation", "outcome"]
    )
    .expect("register operations_total")
});

/// Record one cliente operation outcome (`ok` / `error`).
pub fn record_operation(operation: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    CLIENTE_OPERATIONS_TOTAL.with_label_values(&[operation, outcome]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_include_touched_counters() {
        PHOTOS_STORED_TOTAL.inc();
        record_operation("create", true);
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("clientes_photos_stored_total"));
        assert!(body.contains("clientes_operations_total"));
    }
}
