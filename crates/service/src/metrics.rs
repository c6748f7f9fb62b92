use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::errors::ServiceError;

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "blog_repo_operations_total",
        "Store operations by kind and outcome",
        &["op", "outcome"]
    )
    .expect("register operations_total")
});

/// Count one finished store operation.
pub fn record<T>(op: &str, res: &Result<T, ServiceError>) {
    let outcome = match res {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    OPERATIONS_TOTAL.with_label_values(&[op, outcome]).inc();
}

pub fn operation_count(op: &str, outcome: &str) -> u64 {
    OPERATIONS_TOTAL.with_label_values(&[op, outcome]).get()
}

/// Render the default registry in Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_outcomes_by_kind() {
        let before_ok = operation_count("metrics_test", "ok");
        let before_nf = operation_count("metrics_test", "not_found");
        record::<()>("metrics_test", &Ok(()));
        record::<()>("metrics_test", &Err(ServiceError::not_found("blog")));
        assert_eq!(operation_count("metrics_test", "ok"), before_ok + 1);
        assert_eq!(operation_count("metrics_test", "not_found"), before_nf + 1);

        let text = encode_metrics().expect("encode");
        assert!(text.contains("blog_repo_operations_total"));
    }
}
